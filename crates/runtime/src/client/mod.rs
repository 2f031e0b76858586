//! Batch client: N logical commands, one round trip.
//!
//! # Message Flow
//!
//! 1. Caller hands an ordered list of [`Command`]s to [`BatchClient::execute`]
//! 2. The list is validated into a [`BatchRequest`] (non-empty, one version)
//! 3. A unique request ID is assigned and the envelope goes out via the transport
//! 4. The response envelope is checked: top-level error, `count`, length
//! 5. Only then are the per-command results exposed, in request order
//!
//! A failing command never affects its neighbours. A failing round trip
//! fails the whole batch and no partial results are produced.


mod response;

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use idm_protocol::{ApiVersion, BatchRequest, Command, CommandResult, ResponseEnvelope, ResultElement};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::transport::Transport;

pub use response::BatchResponse;

/// Client-side settings shared by every batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
	/// Version stamped on every batch this client builds.
	pub version: ApiVersion,
}

/// A remote method with a known result shape.
///
/// Implementors turn themselves into a fully parameterized [`Command`] and
/// name the type the command's `result` payload decodes into.
pub trait Method {
	type Output: DeserializeOwned;

	fn into_command(self) -> Command;
}

/// Packs commands into batch calls and demultiplexes the replies.
///
/// The client holds no per-batch state between calls; a caller may resubmit
/// the same [`BatchRequest`] with [`BatchClient::submit`] to retry it.
pub struct BatchClient {
	transport: Arc<dyn Transport>,
	version: ApiVersion,
	/// Sequential request ID counter.
	last_id: AtomicU32,
}

impl BatchClient {
	pub fn new(transport: impl Transport + 'static, config: ClientConfig) -> Self {
		Self::with_shared(Arc::new(transport), config)
	}

	/// Builds a client over a transport that is shared with other owners.
	pub fn with_shared(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
		Self {
			transport,
			version: config.version,
			last_id: AtomicU32::new(0),
		}
	}

	pub fn version(&self) -> &ApiVersion {
		&self.version
	}

	/// Validates `commands` into a batch stamped with this client's version.
	pub fn prepare(&self, commands: Vec<Command>) -> Result<BatchRequest> {
		Ok(BatchRequest::new(self.version.clone(), commands)?)
	}

	/// Executes `commands` as one round trip.
	///
	/// On success the response holds exactly one result per command, in the
	/// same order.
	pub async fn execute(&self, commands: Vec<Command>) -> Result<BatchResponse> {
		let request = self.prepare(commands)?;
		self.submit(&request).await
	}

	/// Sends an already validated batch.
	pub async fn submit(&self, request: &BatchRequest) -> Result<BatchResponse> {
		let id = self.last_id.fetch_add(1, Ordering::SeqCst);
		let body = serde_json::to_value(request.envelope(id))?;

		debug!(target: "idm.rpc", id, commands = request.len(), version = %request.version(), "submitting batch");

		let raw = self.transport.call(body).await.inspect_err(|e| {
			warn!(target: "idm.rpc", id, error = %e, "batch transport failed");
		})?;

		let response = decode_response(id, request.len(), raw)?;
		debug!(
			target: "idm.rpc",
			id,
			succeeded = response.success_count(),
			failed = response.failure_count(),
			"batch settled"
		);
		Ok(response)
	}

	/// Executes one command through the batch path and unwraps its result.
	pub async fn execute_single(&self, command: Command) -> Result<CommandResult> {
		let response = self.execute(vec![command]).await?;
		response
			.into_results()
			.pop()
			.ok_or(Error::LengthMismatch { expected: 1, actual: 0 })
	}

	/// Executes a typed method and decodes its payload.
	///
	/// A payload that does not match `M::Output` is a protocol violation and
	/// fails the call; an application error comes back as `Ok(Err(_))`.
	pub async fn call<M: Method>(&self, method: M) -> Result<CommandResult<M::Output>> {
		let command = method.into_command();
		let label = command.label();
		match self.execute_single(command).await? {
			Ok(reply) => reply
				.into_decoded()
				.map(Ok)
				.map_err(|e| Error::MalformedResponse(format!("{label}: unexpected result shape: {e}"))),
			Err(err) => Ok(Err(err)),
		}
	}
}

/// Checks a raw response body against the request it answers.
fn decode_response(id: u32, expected: usize, raw: serde_json::Value) -> Result<BatchResponse> {
	let envelope: ResponseEnvelope = serde_json::from_value(raw)?;

	if let Some(err) = envelope.error {
		warn!(target: "idm.rpc", id, code = err.code, message = %err.message, "batch rejected by server");
		return Err(Error::Rpc(err));
	}

	let batch = envelope
		.result
		.ok_or_else(|| Error::MalformedResponse("response has neither result nor error".to_string()))?;

	let actual = batch.results.len();
	if let Some(count) = batch.count.filter(|count| *count != actual) {
		return Err(Error::MalformedResponse(format!("count {count} disagrees with {actual} results")));
	}
	if actual != expected {
		warn!(target: "idm.rpc", id, expected, actual, "result count mismatch");
		return Err(Error::LengthMismatch { expected, actual });
	}

	let results = batch.results.into_iter().map(ResultElement::into_result).collect();
	Ok(BatchResponse::new(results, envelope.principal, envelope.version))
}
