//! A single logical remote operation.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::version::ApiVersion;

/// One remote operation: method name, positional arguments and keyword options.
///
/// A command is built once and then only read. It has no setters; the
/// builder methods consume `self`, so a command placed in a batch can never
/// change underneath it.
///
/// On the wire a command is `{"method": name, "params": [args, options]}`.
/// The optional [`ApiVersion`] tag is not serialized per command; the batch
/// checks that it agrees with the batch-level version instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
	method: String,
	args: Vec<Value>,
	options: Map<String, Value>,
	version: Option<ApiVersion>,
}

impl Command {
	/// Creates a command with no arguments or options.
	pub fn new(method: impl Into<String>) -> Self {
		Self {
			method: method.into(),
			args: Vec::new(),
			options: Map::new(),
			version: None,
		}
	}

	/// Appends a positional argument.
	pub fn arg(mut self, value: impl Into<Value>) -> Self {
		self.args.push(value.into());
		self
	}

	/// Appends several positional arguments.
	pub fn args<I, V>(mut self, values: I) -> Self
	where
		I: IntoIterator<Item = V>,
		V: Into<Value>,
	{
		self.args.extend(values.into_iter().map(Into::into));
		self
	}

	/// Sets a keyword option, replacing any previous value for `key`.
	pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.options.insert(key.into(), value.into());
		self
	}

	/// Tags the command with the API version it was written against.
	pub fn with_version(mut self, version: ApiVersion) -> Self {
		self.version = Some(version);
		self
	}

	pub fn method(&self) -> &str {
		&self.method
	}

	pub fn positional(&self) -> &[Value] {
		&self.args
	}

	pub fn options(&self) -> &Map<String, Value> {
		&self.options
	}

	pub fn version(&self) -> Option<&ApiVersion> {
		self.version.as_ref()
	}

	/// Short human-readable label, e.g. `user_show("alice")`.
	pub fn label(&self) -> String {
		let args: Vec<String> = self.args.iter().map(Value::to_string).collect();
		format!("{}({})", self.method, args.join(", "))
	}
}

impl Serialize for Command {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut state = serializer.serialize_struct("Command", 2)?;
		state.serialize_field("method", &self.method)?;
		state.serialize_field("params", &(&self.args, &self.options))?;
		state.end()
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn serializes_args_and_options_as_params_pair() {
		let command = Command::new("user_show").arg("alice").option("all", true);

		assert_eq!(
			serde_json::to_value(&command).unwrap(),
			json!({"method": "user_show", "params": [["alice"], {"all": true}]})
		);
	}

	#[test]
	fn empty_command_still_sends_both_params_halves() {
		let command = Command::new("ping");
		assert_eq!(serde_json::to_value(&command).unwrap(), json!({"method": "ping", "params": [[], {}]}));
	}

	#[test]
	fn version_tag_is_not_serialized() {
		let command = Command::new("user_find").with_version("2.100".parse().unwrap());
		let value = serde_json::to_value(&command).unwrap();
		assert!(value.get("version").is_none());
		assert_eq!(command.version().map(ApiVersion::as_str), Some("2.100"));
	}

	#[test]
	fn later_option_replaces_earlier() {
		let command = Command::new("user_find").option("sizelimit", 10).option("sizelimit", 20);
		assert_eq!(command.options()["sizelimit"], 20);
	}

	#[test]
	fn label_lists_positional_arguments() {
		let command = Command::new("user_del").args(["alice", "bob"]);
		assert_eq!(command.label(), r#"user_del("alice", "bob")"#);
	}
}
