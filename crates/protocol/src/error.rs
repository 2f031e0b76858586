//! Structured application errors reported by the server.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Well-known server error codes.
pub mod codes {
	/// Generic server-side failure without a more specific code.
	pub const UNKNOWN: i64 = 902;
	/// The named entry does not exist.
	pub const NOT_FOUND: i64 = 4001;
	/// An entry with the same primary key already exists.
	pub const DUPLICATE_ENTRY: i64 = 4002;
	/// Enable requested on an entry that is already enabled.
	pub const ALREADY_ACTIVE: i64 = 4202;
	/// Disable requested on an entry that is already disabled.
	pub const ALREADY_INACTIVE: i64 = 4203;
}

/// Error descriptor for one failed command, or for a failed batch call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandError {
	/// Numeric error code from the server's error table.
	pub code: i64,
	/// Error class name (e.g. `"NotFound"`), when the server sends one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Human-readable message.
	pub message: String,
}

impl CommandError {
	pub fn new(code: i64, message: impl Into<String>) -> Self {
		Self {
			code,
			name: None,
			message: message.into(),
		}
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn is_not_found(&self) -> bool {
		self.code == codes::NOT_FOUND
	}

	pub fn is_duplicate(&self) -> bool {
		self.code == codes::DUPLICATE_ENTRY
	}

	/// Returns true if the entry already had the status an enable/disable asked for.
	pub fn is_already_in_state(&self) -> bool {
		matches!(self.code, codes::ALREADY_ACTIVE | codes::ALREADY_INACTIVE)
	}
}

impl fmt::Display for CommandError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.name {
			Some(name) => write!(f, "{name} ({}): {}", self.code, self.message),
			None => write!(f, "error {}: {}", self.code, self.message),
		}
	}
}

impl std::error::Error for CommandError {}
