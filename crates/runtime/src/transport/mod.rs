//! Transport layer: moves one JSON request body to the server and returns
//! the JSON response body.
//!
//! The batch client builds envelopes and validates replies; a transport only
//! carries bytes. Authentication, cookies and base URL belong to whoever
//! configures the transport.

#[cfg(test)]
mod tests;

mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::error::Result;

pub use http::{HttpTransport, HttpTransportConfig, JSON_ENDPOINT_PATH};

/// Boxed future returned by [`Transport::call`].
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<Value>> + Send + 'a>>;

/// Single request/response round trip.
///
/// Implementations must fail the whole call (network error, non-success
/// status, unparsable body) rather than return a partial body.
pub trait Transport: Send + Sync {
	/// Sends `body` and resolves to the parsed response body.
	fn call(&self, body: Value) -> TransportFuture<'_>;
}
