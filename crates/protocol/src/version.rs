//! Protocol version tag shared by every command of a batch.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// API version the client speaks unless told otherwise.
pub const DEFAULT_API_VERSION: &str = "2.251";

/// Server API version in `major.minor` form (e.g. `"2.251"`).
///
/// One batch carries exactly one version; commands may carry their own tag
/// only to assert that they agree with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApiVersion(String);

impl ApiVersion {
	/// Returns the version as sent on the wire.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Default for ApiVersion {
	fn default() -> Self {
		Self(DEFAULT_API_VERSION.to_string())
	}
}

impl fmt::Display for ApiVersion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl FromStr for ApiVersion {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let s = s.trim();
		let (major, minor) = s.split_once('.').ok_or_else(|| format!("invalid API version '{s}': expected MAJOR.MINOR"))?;
		if major.parse::<u32>().is_err() || minor.parse::<u32>().is_err() {
			return Err(format!("invalid API version '{s}': expected MAJOR.MINOR"));
		}
		Ok(Self(s.to_string()))
	}
}

impl TryFrom<String> for ApiVersion {
	type Error = String;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

impl From<ApiVersion> for String {
	fn from(version: ApiVersion) -> Self {
		version.0
	}
}
