//! Batch request and response envelopes.
//!
//! A [`BatchRequest`] is validated when it is built: it is never empty and
//! every command tagged with a version agrees with the batch version. The
//! response side decodes each element into a [`CommandResult`] so callers
//! branch on `Ok`/`Err` instead of probing for an `error` key.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::CommandResult;
use crate::command::Command;
use crate::error::{CommandError, codes};
use crate::reply::Reply;
use crate::version::ApiVersion;

/// Method name of the envelope call that carries the other commands.
pub const BATCH_METHOD: &str = "batch";

/// Reasons a set of commands cannot form a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidBatch {
	/// No commands were given.
	Empty,
	/// A command is tagged with a version other than the batch version.
	MixedVersions {
		index: usize,
		expected: ApiVersion,
		found: ApiVersion,
	},
}

impl fmt::Display for InvalidBatch {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			InvalidBatch::Empty => f.write_str("batch must contain at least one command"),
			InvalidBatch::MixedVersions { index, expected, found } => {
				write!(f, "command {index} is tagged with API version {found}, batch uses {expected}")
			}
		}
	}
}

impl std::error::Error for InvalidBatch {}

/// Ordered commands sharing one protocol version.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRequest {
	commands: Vec<Command>,
	version: ApiVersion,
}

impl BatchRequest {
	/// Validates and builds a batch.
	pub fn new(version: ApiVersion, commands: Vec<Command>) -> Result<Self, InvalidBatch> {
		if commands.is_empty() {
			return Err(InvalidBatch::Empty);
		}

		if let Some((index, found)) = commands
			.iter()
			.enumerate()
			.find_map(|(index, command)| command.version().filter(|v| **v != version).map(|v| (index, v.clone())))
		{
			return Err(InvalidBatch::MixedVersions {
				index,
				expected: version,
				found,
			});
		}

		Ok(Self { commands, version })
	}

	pub fn commands(&self) -> &[Command] {
		&self.commands
	}

	pub fn version(&self) -> &ApiVersion {
		&self.version
	}

	pub fn len(&self) -> usize {
		self.commands.len()
	}

	/// Always false for a constructed batch.
	pub fn is_empty(&self) -> bool {
		self.commands.is_empty()
	}

	/// Wraps the batch in the JSON-RPC envelope sent to the server.
	pub fn envelope(&self, id: u32) -> RequestEnvelope<'_> {
		RequestEnvelope {
			method: BATCH_METHOD,
			params: (&self.commands, VersionOption { version: &self.version }),
			id,
		}
	}
}

/// `{"method": "batch", "params": [[commands], {"version"}], "id"}`.
#[derive(Debug, Serialize)]
pub struct RequestEnvelope<'a> {
	pub method: &'static str,
	pub params: (&'a [Command], VersionOption<'a>),
	pub id: u32,
}

/// Keyword half of the batch envelope's params.
#[derive(Debug, Serialize)]
pub struct VersionOption<'a> {
	pub version: &'a ApiVersion,
}

/// Top-level response body.
///
/// `error` is non-null only when the batch call itself failed; in that case
/// `result` carries nothing usable.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEnvelope {
	#[serde(default)]
	pub result: Option<BatchResult>,
	#[serde(default)]
	pub error: Option<CommandError>,
	#[serde(default)]
	pub id: Option<Value>,
	#[serde(default)]
	pub principal: Option<String>,
	#[serde(default)]
	pub version: Option<String>,
}

/// `result` object of a batch response.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchResult {
	/// Number of results the server claims to have produced.
	#[serde(default)]
	pub count: Option<usize>,
	#[serde(default)]
	pub results: Vec<ResultElement>,
}

/// One decoded element of `results`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawElement")]
pub struct ResultElement(pub CommandResult<Reply>);

impl ResultElement {
	pub fn into_result(self) -> CommandResult<Reply> {
		self.0
	}
}

/// Element as the server sends it.
///
/// Errors come in two forms: a structured `{"code", "message", "name"}`
/// object, or a bare message string with `error_code`/`error_name` siblings.
#[derive(Deserialize)]
struct RawElement {
	#[serde(default)]
	result: Value,
	#[serde(default)]
	value: Value,
	#[serde(default)]
	summary: Option<String>,
	#[serde(default)]
	error: Option<RawError>,
	#[serde(default)]
	error_code: Option<i64>,
	#[serde(default)]
	error_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawError {
	Structured {
		code: i64,
		message: String,
		#[serde(default)]
		name: Option<String>,
	},
	Message(String),
}

impl From<RawElement> for ResultElement {
	fn from(raw: RawElement) -> Self {
		let outcome = match raw.error {
			Some(RawError::Structured { code, message, name }) => Err(CommandError {
				code,
				name: name.or(raw.error_name),
				message,
			}),
			Some(RawError::Message(message)) => Err(CommandError {
				code: raw.error_code.unwrap_or(codes::UNKNOWN),
				name: raw.error_name,
				message,
			}),
			None => Ok(Reply {
				result: raw.result,
				value: raw.value,
				summary: raw.summary,
			}),
		};
		ResultElement(outcome)
	}
}
