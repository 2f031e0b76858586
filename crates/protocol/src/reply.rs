//! Success payload of one command.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What the server returns for a command that succeeded.
///
/// `result` is method specific and stays opaque here; [`Reply::decode`]
/// turns it into a typed value when the caller knows the method's shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reply {
	/// Method-specific payload (an entry, a list of entries, a status object).
	#[serde(default)]
	pub result: Value,
	/// Primary key(s) the command acted on.
	#[serde(default, skip_serializing_if = "Value::is_null")]
	pub value: Value,
	/// Server-rendered one-line summary, e.g. `Deleted user "alice"`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub summary: Option<String>,
}

impl Reply {
	pub fn new(result: Value) -> Self {
		Self {
			result,
			..Default::default()
		}
	}

	/// Deserializes `result` into `T`.
	pub fn decode<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
		T::deserialize(&self.result)
	}

	/// Consumes the reply, deserializing `result` into `T`.
	pub fn into_decoded<T: DeserializeOwned>(self) -> serde_json::Result<T> {
		serde_json::from_value(self.result)
	}
}
