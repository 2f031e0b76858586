use idm_protocol::{CommandError, CommandResult, Reply};
use serde::de::DeserializeOwned;

/// Per-command outcomes of one batch, in request order.
///
/// Only produced after the length check passed, so `len()` always equals the
/// number of commands sent.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResponse {
	results: Vec<CommandResult>,
	principal: Option<String>,
	server_version: Option<String>,
}

impl BatchResponse {
	pub(crate) fn new(results: Vec<CommandResult>, principal: Option<String>, server_version: Option<String>) -> Self {
		Self {
			results,
			principal,
			server_version,
		}
	}

	pub fn len(&self) -> usize {
		self.results.len()
	}

	pub fn is_empty(&self) -> bool {
		self.results.is_empty()
	}

	/// Result of command `index`.
	pub fn get(&self, index: usize) -> Option<&CommandResult> {
		self.results.get(index)
	}

	pub fn iter(&self) -> std::slice::Iter<'_, CommandResult> {
		self.results.iter()
	}

	pub fn into_results(self) -> Vec<CommandResult> {
		self.results
	}

	/// Decodes the payload of command `index` into `T`.
	///
	/// Returns `None` when `index` is out of range. The inner `Err` keeps the
	/// application error; a shape mismatch surfaces as the outer
	/// `serde_json::Error`.
	pub fn decode<T: DeserializeOwned>(&self, index: usize) -> Option<serde_json::Result<CommandResult<T>>> {
		self.results.get(index).map(|result| match result {
			Ok(reply) => reply.decode().map(Ok),
			Err(err) => Ok(Err(err.clone())),
		})
	}

	pub fn success_count(&self) -> usize {
		self.results.iter().filter(|r| r.is_ok()).count()
	}

	pub fn failure_count(&self) -> usize {
		self.results.len() - self.success_count()
	}

	/// Failed commands with their indices.
	pub fn failures(&self) -> impl Iterator<Item = (usize, &CommandError)> {
		self.results
			.iter()
			.enumerate()
			.filter_map(|(index, result)| result.as_ref().err().map(|err| (index, err)))
	}

	/// Successful commands with their indices.
	pub fn successes(&self) -> impl Iterator<Item = (usize, &Reply)> {
		self.results
			.iter()
			.enumerate()
			.filter_map(|(index, result)| result.as_ref().ok().map(|reply| (index, reply)))
	}

	/// Kerberos principal the server executed the batch as.
	pub fn principal(&self) -> Option<&str> {
		self.principal.as_deref()
	}

	/// Server software version reported alongside the results.
	pub fn server_version(&self) -> Option<&str> {
		self.server_version.as_deref()
	}
}

impl IntoIterator for BatchResponse {
	type Item = CommandResult;
	type IntoIter = std::vec::IntoIter<CommandResult>;

	fn into_iter(self) -> Self::IntoIter {
		self.results.into_iter()
	}
}

impl<'a> IntoIterator for &'a BatchResponse {
	type Item = &'a CommandResult;
	type IntoIter = std::slice::Iter<'a, CommandResult>;

	fn into_iter(self) -> Self::IntoIter {
		self.results.iter()
	}
}
