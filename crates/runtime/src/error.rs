//! Error types for the batch runtime.
//!
//! Everything here is fatal to a whole batch. Failures of individual
//! commands are not errors at this level: they arrive as `Err` entries in
//! the [`BatchResponse`](crate::BatchResponse).

use idm_protocol::{ApiVersion, CommandError, InvalidBatch};
use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that fail a batch as a whole.
#[derive(Debug, Error)]
pub enum Error {
	/// `execute` was called with no commands.
	#[error("batch must contain at least one command")]
	EmptyBatch,

	/// A command carries a version tag that differs from the batch version.
	#[error("command {index} is tagged with API version {found}, batch uses {expected}")]
	MixedVersions {
		index: usize,
		expected: ApiVersion,
		found: ApiVersion,
	},

	/// Network-level failure (connect, TLS, timeout, body read).
	#[error("HTTP transport error: {0}")]
	Http(#[from] reqwest::Error),

	/// Server answered with a non-success status.
	#[error("server returned HTTP {status}: {body}")]
	Status { status: u16, body: String },

	/// Transport failure not covered by the HTTP variants.
	#[error("Transport error: {0}")]
	Transport(String),

	/// Response body is not valid JSON or not a batch envelope.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// The server rejected the batch call itself.
	#[error("batch call failed: {0}")]
	Rpc(CommandError),

	/// Number of results differs from number of commands sent.
	#[error("response has {actual} results for {expected} commands")]
	LengthMismatch { expected: usize, actual: usize },

	/// Response parsed but violates the protocol in some other way.
	#[error("Malformed response: {0}")]
	MalformedResponse(String),

	/// Transport could not be configured.
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),
}

impl From<InvalidBatch> for Error {
	fn from(err: InvalidBatch) -> Self {
		match err {
			InvalidBatch::Empty => Error::EmptyBatch,
			InvalidBatch::MixedVersions { index, expected, found } => Error::MixedVersions { index, expected, found },
		}
	}
}

impl Error {
	/// Returns true if the request was refused before reaching the transport.
	pub fn is_invalid_request(&self) -> bool {
		matches!(self, Error::EmptyBatch | Error::MixedVersions { .. })
	}

	/// Returns true if the server replied but the reply broke the protocol.
	pub fn is_protocol(&self) -> bool {
		matches!(self, Error::Json(_) | Error::LengthMismatch { .. } | Error::MalformedResponse(_))
	}

	/// Returns true if this is a timeout error.
	pub fn is_timeout(&self) -> bool {
		match self {
			Error::Http(err) => err.is_timeout(),
			Error::Status { status, .. } => *status == 408 || *status == 504,
			_ => false,
		}
	}

	/// Returns the server error if the batch call itself was rejected.
	pub fn rpc_error(&self) -> Option<&CommandError> {
		match self {
			Error::Rpc(err) => Some(err),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn invalid_batch_maps_to_request_errors() {
		let err: Error = InvalidBatch::Empty.into();
		assert!(matches!(err, Error::EmptyBatch));
		assert!(err.is_invalid_request());

		let err: Error = InvalidBatch::MixedVersions {
			index: 1,
			expected: ApiVersion::default(),
			found: "2.1".parse().unwrap(),
		}
		.into();
		assert_eq!(err.to_string(), "command 1 is tagged with API version 2.1, batch uses 2.251");
	}

	#[test]
	fn protocol_classification() {
		assert!(Error::LengthMismatch { expected: 2, actual: 1 }.is_protocol());
		assert!(Error::MalformedResponse("x".into()).is_protocol());
		assert!(!Error::Status { status: 500, body: String::new() }.is_protocol());
		assert!(!Error::Rpc(CommandError::new(909, "bad version")).is_protocol());
	}

	#[test]
	fn gateway_timeouts_count_as_timeouts() {
		assert!(Error::Status { status: 504, body: String::new() }.is_timeout());
		assert!(!Error::Status { status: 500, body: String::new() }.is_timeout());
	}

	#[test]
	fn rpc_error_accessor() {
		let err = Error::Rpc(CommandError::new(909, "bad version").with_name("VersionError"));
		assert_eq!(err.rpc_error().map(|e| e.code), Some(909));
		assert!(Error::EmptyBatch.rpc_error().is_none());
	}
}
