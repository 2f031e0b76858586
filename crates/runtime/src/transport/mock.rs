//! Scripted in-memory transport.
//!
//! Replies are served first from the queue of scripted responses, then from
//! the handler if one is installed. Every request body is recorded so tests
//! can assert on what went over the wire.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Value, json};

use super::{Transport, TransportFuture};
use crate::error::{Error, Result};

type Handler = Arc<dyn Fn(&Value) -> Result<Value> + Send + Sync>;

/// In-memory [`Transport`] for tests.
#[derive(Default)]
pub struct MockTransport {
	scripted: Mutex<VecDeque<Result<Value>>>,
	handler: Option<Handler>,
	requests: Mutex<Vec<Value>>,
}

impl MockTransport {
	pub fn new() -> Self {
		Self::default()
	}

	/// Answers every unscripted request with `handler(request_body)`.
	pub fn with_handler<F>(handler: F) -> Self
	where
		F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
	{
		Self {
			handler: Some(Arc::new(handler)),
			..Self::default()
		}
	}

	/// Queues a raw response body.
	pub fn push_body(&self, body: Value) {
		self.scripted.lock().push_back(Ok(body));
	}

	/// Queues a transport failure.
	pub fn push_error(&self, error: Error) {
		self.scripted.lock().push_back(Err(error));
	}

	/// Request bodies received so far, oldest first.
	pub fn requests(&self) -> Vec<Value> {
		self.requests.lock().clone()
	}

	pub fn request_count(&self) -> usize {
		self.requests.lock().len()
	}

	fn respond(&self, body: &Value) -> Result<Value> {
		if let Some(next) = self.scripted.lock().pop_front() {
			return next;
		}
		match &self.handler {
			Some(handler) => handler(body),
			None => Err(Error::Transport("mock transport has no scripted response".to_string())),
		}
	}
}

impl Transport for MockTransport {
	fn call(&self, body: Value) -> TransportFuture<'_> {
		let reply = self.respond(&body);
		self.requests.lock().push(body);
		Box::pin(async move { reply })
	}
}

/// Builds a successful batch response body around per-command elements.
pub fn batch_body(results: Vec<Value>) -> Value {
	json!({
		"result": {"count": results.len(), "results": results},
		"error": null,
		"id": 0,
		"principal": "admin@EXAMPLE.TEST",
		"version": "4.12.2"
	})
}

/// Per-command success element.
pub fn ok_element(result: Value, value: impl Into<Value>) -> Value {
	json!({"result": result, "value": value.into(), "summary": null, "error": null})
}

/// Per-command failure element.
pub fn error_element(code: i64, name: &str, message: &str) -> Value {
	json!({"error": {"code": code, "name": name, "message": message}})
}

/// Commands of a batch request body as `(method, args, options)`.
pub fn batched_commands(request: &Value) -> Vec<(String, Vec<Value>, Value)> {
	request["params"][0]
		.as_array()
		.map(|commands| {
			commands
				.iter()
				.map(|command| {
					let method = command["method"].as_str().unwrap_or_default().to_string();
					let args = command["params"][0].as_array().cloned().unwrap_or_default();
					let options = command["params"][1].clone();
					(method, args, options)
				})
				.collect()
		})
		.unwrap_or_default()
}
