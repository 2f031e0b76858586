//! Typed builders for the commands list pages issue.
//!
//! Commands are named `{entity}_{verb}` (`user_show`, `hbacrule_enable`).
//! Each builder implements [`Method`], so it can be passed to
//! [`BatchClient::call`](idm_runtime::BatchClient::call) or turned into a
//! plain [`Command`] for a batch.

use idm_runtime::{Command, Method};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::entity::{EntityKey, EntityStatus};

/// One directory entry as returned by `*_show` and `*_find`.
///
/// Attribute values are lists on the wire; a few flags come back as plain
/// booleans.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Entry(pub Map<String, Value>);

impl Entry {
	pub fn get(&self, attr: &str) -> Option<&Value> {
		self.0.get(attr)
	}

	/// First value of a multi-valued string attribute.
	pub fn first(&self, attr: &str) -> Option<&str> {
		match self.0.get(attr)? {
			Value::Array(values) => values.first().and_then(Value::as_str),
			Value::String(value) => Some(value),
			_ => None,
		}
	}

	/// All string values of an attribute.
	pub fn values(&self, attr: &str) -> Vec<&str> {
		match self.0.get(attr) {
			Some(Value::Array(values)) => values.iter().filter_map(Value::as_str).collect(),
			Some(Value::String(value)) => vec![value.as_str()],
			_ => Vec::new(),
		}
	}

	/// Enabled/disabled status from `nsaccountlock` (users) or
	/// `ipaenabledflag` (rules).
	pub fn status(&self) -> EntityStatus {
		if let Some(locked) = self.0.get("nsaccountlock") {
			return flag(locked).map_or(EntityStatus::Unknown, EntityStatus::from_disabled);
		}
		if let Some(enabled) = self.0.get("ipaenabledflag") {
			return flag(enabled).map_or(EntityStatus::Unknown, |on| EntityStatus::from_disabled(!on));
		}
		EntityStatus::Unknown
	}
}

fn flag(value: &Value) -> Option<bool> {
	let value = match value {
		Value::Array(values) => values.first()?,
		other => other,
	};
	match value {
		Value::Bool(b) => Some(*b),
		Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
		Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
		_ => None,
	}
}

/// `{entity}_show` for one key.
#[derive(Debug, Clone)]
pub struct Show<K> {
	pub entity: String,
	pub key: K,
	pub all: bool,
}

impl<K: EntityKey> Show<K> {
	pub fn new(entity: impl Into<String>, key: K) -> Self {
		Self {
			entity: entity.into(),
			key,
			all: false,
		}
	}

	/// Requests every attribute instead of the default set.
	pub fn all(mut self) -> Self {
		self.all = true;
		self
	}
}

impl Show<String> {
	pub fn user(uid: impl Into<String>) -> Self {
		Self::new("user", uid.into())
	}
}

impl<K: EntityKey> Method for Show<K> {
	type Output = Entry;

	fn into_command(self) -> Command {
		let command = Command::new(format!("{}_show", self.entity)).args(self.key.to_args());
		if self.all { command.option("all", true) } else { command }
	}
}

/// `{entity}_find` with a free-text criterion.
#[derive(Debug, Clone)]
pub struct Find {
	pub entity: String,
	pub criteria: String,
	pub size_limit: Option<u32>,
	pub pkey_only: bool,
}

impl Find {
	pub fn new(entity: impl Into<String>) -> Self {
		Self {
			entity: entity.into(),
			criteria: String::new(),
			size_limit: None,
			pkey_only: false,
		}
	}

	pub fn users() -> Self {
		Self::new("user")
	}

	pub fn criteria(mut self, criteria: impl Into<String>) -> Self {
		self.criteria = criteria.into();
		self
	}

	pub fn size_limit(mut self, limit: u32) -> Self {
		self.size_limit = Some(limit);
		self
	}

	/// Returns primary keys only, as list pages do before paging.
	pub fn pkey_only(mut self) -> Self {
		self.pkey_only = true;
		self
	}
}

impl Method for Find {
	type Output = Vec<Entry>;

	fn into_command(self) -> Command {
		let mut command = Command::new(format!("{}_find", self.entity)).arg(self.criteria);
		if let Some(limit) = self.size_limit {
			command = command.option("sizelimit", limit);
		}
		if self.pkey_only {
			command = command.option("pkey_only", true);
		}
		command
	}
}

macro_rules! key_method {
	($(#[$doc:meta])* $name:ident, $verb:literal, $user:ident) => {
		$(#[$doc])*
		#[derive(Debug, Clone)]
		pub struct $name<K> {
			pub entity: String,
			pub key: K,
		}

		impl<K: EntityKey> $name<K> {
			pub fn new(entity: impl Into<String>, key: K) -> Self {
				Self {
					entity: entity.into(),
					key,
				}
			}
		}

		impl $name<String> {
			pub fn $user(uid: impl Into<String>) -> Self {
				Self::new("user", uid.into())
			}
		}

		impl<K: EntityKey> Method for $name<K> {
			type Output = Value;

			fn into_command(self) -> Command {
				Command::new(format!("{}_{}", self.entity, $verb)).args(self.key.to_args())
			}
		}
	};
}

key_method!(
	/// `{entity}_del` for one key.
	Delete, "del", user
);
key_method!(
	/// `{entity}_enable` for one key.
	Enable, "enable", user
);
key_method!(
	/// `{entity}_disable` for one key.
	Disable, "disable", user
);

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn params(command: &Command) -> Value {
		serde_json::to_value(command).unwrap()["params"].clone()
	}

	#[test]
	fn show_builds_entity_command() {
		let command = Show::user("alice").all().into_command();
		assert_eq!(command.method(), "user_show");
		assert_eq!(params(&command), json!([["alice"], {"all": true}]));
	}

	#[test]
	fn nested_keys_become_positional_args() {
		let key = ("example.test".to_string(), "www".to_string());
		let command = Delete::new("dnsrecord", key).into_command();
		assert_eq!(command.method(), "dnsrecord_del");
		assert_eq!(params(&command), json!([["example.test", "www"], {}]));
	}

	#[test]
	fn find_carries_options() {
		let command = Find::users().criteria("al").size_limit(50).pkey_only().into_command();
		assert_eq!(command.method(), "user_find");
		assert_eq!(params(&command), json!([["al"], {"sizelimit": 50, "pkey_only": true}]));
	}

	#[test]
	fn verbs_name_the_method() {
		assert_eq!(Enable::user("bob").into_command().method(), "user_enable");
		assert_eq!(Disable::new("hbacrule", "allow_all".to_string()).into_command().method(), "hbacrule_disable");
	}

	#[test]
	fn entry_reads_list_attributes_and_status() {
		let user: Entry = serde_json::from_value(json!({
			"uid": ["alice"],
			"mail": ["alice@example.test", "a@example.test"],
			"nsaccountlock": false
		}))
		.unwrap();
		assert_eq!(user.first("uid"), Some("alice"));
		assert_eq!(user.values("mail").len(), 2);
		assert_eq!(user.status(), EntityStatus::Enabled);

		let rule: Entry = serde_json::from_value(json!({"cn": ["allow_all"], "ipaenabledflag": ["FALSE"]})).unwrap();
		assert_eq!(rule.status(), EntityStatus::Disabled);

		let group: Entry = serde_json::from_value(json!({"cn": ["admins"]})).unwrap();
		assert_eq!(group.status(), EntityStatus::Unknown);
	}
}
