//! Bulk delete/enable/disable over a set of selected entities.
//!
//! One command per entity goes into a single batch, so each entity gets its
//! own success or failure and one bad key never blocks the others.

use std::fmt;

use idm_runtime::{BatchClient, BatchResponse, Command, CommandError, Method};
use tracing::{debug, info};

use crate::entity::{EntityKey, EntityStatus};
use crate::error::{Error, Result};
use crate::methods::{Delete, Disable, Enable};
use crate::selection::SelectionTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BulkAction {
	Delete,
	Enable,
	Disable,
}

impl BulkAction {
	pub fn command<K: EntityKey>(self, entity: &str, key: &K) -> Command {
		let key = key.clone();
		match self {
			BulkAction::Delete => Delete::new(entity, key).into_command(),
			BulkAction::Enable => Enable::new(entity, key).into_command(),
			BulkAction::Disable => Disable::new(entity, key).into_command(),
		}
	}

	/// One command per key, in key order.
	pub fn commands<K: EntityKey>(self, entity: &str, keys: &[K]) -> Vec<Command> {
		keys.iter().map(|key| self.command(entity, key)).collect()
	}

	pub fn past_tense(self) -> &'static str {
		match self {
			BulkAction::Delete => "deleted",
			BulkAction::Enable => "enabled",
			BulkAction::Disable => "disabled",
		}
	}

	/// Status a successful action leaves the entity in.
	pub fn resulting_status(self) -> Option<EntityStatus> {
		match self {
			BulkAction::Delete => None,
			BulkAction::Enable => Some(EntityStatus::Enabled),
			BulkAction::Disable => Some(EntityStatus::Disabled),
		}
	}
}

impl fmt::Display for BulkAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			BulkAction::Delete => "delete",
			BulkAction::Enable => "enable",
			BulkAction::Disable => "disable",
		})
	}
}

/// Per-entity result of a bulk action whose batch reached the server.
#[derive(Debug, Clone)]
pub struct BulkOutcome<K> {
	pub action: BulkAction,
	pub succeeded: Vec<K>,
	pub failed: Vec<(K, CommandError)>,
}

impl<K: EntityKey> BulkOutcome<K> {
	/// Pairs `keys` with the batch results in request order.
	///
	/// Enabling an already enabled entity (or the reverse) counts as a
	/// success: the entity ends up in the requested state.
	pub fn from_response(action: BulkAction, keys: Vec<K>, response: BatchResponse) -> Self {
		let mut succeeded = Vec::new();
		let mut failed = Vec::new();
		for (key, result) in keys.into_iter().zip(response) {
			match result {
				Ok(_) => succeeded.push(key),
				Err(err) if action != BulkAction::Delete && err.is_already_in_state() => succeeded.push(key),
				Err(err) => {
					debug!(target: "idm.bulk", key = ?key, error = %err, "{action} failed");
					failed.push((key, err));
				}
			}
		}
		Self { action, succeeded, failed }
	}

	pub fn total(&self) -> usize {
		self.succeeded.len() + self.failed.len()
	}

	pub fn is_complete(&self) -> bool {
		self.failed.is_empty()
	}

	/// One-line report, e.g. `3 of 5 deleted; 2 failed: bob, carol`.
	pub fn summary(&self) -> String {
		let verb = self.action.past_tense();
		if self.failed.is_empty() {
			return format!("{} {verb}", self.succeeded.len());
		}
		let names: Vec<String> = self.failed.iter().map(|(key, _)| key.label()).collect();
		format!(
			"{} of {} {verb}; {} failed: {}",
			self.succeeded.len(),
			self.total(),
			self.failed.len(),
			names.join(", ")
		)
	}

	/// Reconciles a page's selection with the outcome.
	///
	/// After a delete the selection is cleared, since its members may no
	/// longer exist. After enable/disable the selection stays and the
	/// succeeded entities take their new status.
	pub fn apply_to(&self, selection: &mut SelectionTracker<K>) {
		match self.action.resulting_status() {
			None => selection.clear(),
			Some(status) => {
				for key in &self.succeeded {
					selection.set_status(key, status);
				}
			}
		}
	}
}

/// Runs `action` on `keys` of `entity` as one batch.
pub async fn run_bulk<K: EntityKey>(client: &BatchClient, entity: &str, action: BulkAction, keys: Vec<K>) -> Result<BulkOutcome<K>> {
	if keys.is_empty() {
		return Err(Error::NothingSelected);
	}
	let response = client.execute(action.commands(entity, &keys)).await?;
	let outcome = BulkOutcome::from_response(action, keys, response);
	info!(target: "idm.bulk", entity, %action, ok = outcome.succeeded.len(), failed = outcome.failed.len(), "bulk action settled");
	Ok(outcome)
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use idm_runtime::transport::mock::{batch_body, batched_commands, error_element, ok_element};
	use idm_runtime::{ClientConfig, MockTransport};
	use serde_json::{Value, json};

	use super::*;
	use crate::entity::Row;

	fn keys(ids: &[&str]) -> Vec<String> {
		ids.iter().map(|id| id.to_string()).collect()
	}

	/// Users `alice`, `dave` and `erin` exist, `dave` already enabled;
	/// everyone else is missing.
	fn directory(request: &Value) -> idm_runtime::Result<Value> {
		let elements = batched_commands(request)
			.into_iter()
			.map(|(method, args, _)| {
				let uid = args.first().and_then(Value::as_str).unwrap_or_default().to_string();
				match (method.as_str(), uid.as_str()) {
					("user_enable", "dave") => error_element(4202, "AlreadyActive", "This entry is already enabled"),
					(_, "alice" | "dave" | "erin") => ok_element(json!(true), uid.as_str()),
					_ => error_element(4001, "NotFound", &format!("{uid}: user not found")),
				}
			})
			.collect();
		Ok(batch_body(elements))
	}

	fn client() -> (BatchClient, Arc<MockTransport>) {
		let transport = Arc::new(MockTransport::with_handler(directory));
		(BatchClient::with_shared(transport.clone(), ClientConfig::default()), transport)
	}

	#[test]
	fn commands_follow_key_order() {
		let commands = BulkAction::Disable.commands("user", &keys(&["b", "a"]));
		assert_eq!(commands.len(), 2);
		assert_eq!(commands[0].method(), "user_disable");
		assert_eq!(commands[0].positional(), &[json!("b")]);
		assert_eq!(commands[1].positional(), &[json!("a")]);
	}

	#[tokio::test]
	async fn partial_delete_reports_each_failure() {
		let (client, transport) = client();

		let outcome = run_bulk(&client, "user", BulkAction::Delete, keys(&["alice", "bob", "dave", "carol", "erin"]))
			.await
			.unwrap();

		assert_eq!(transport.request_count(), 1);
		assert_eq!(outcome.succeeded, keys(&["alice", "dave", "erin"]));
		assert_eq!(outcome.failed.len(), 2);
		assert!(outcome.failed.iter().all(|(_, err)| err.is_not_found()));
		assert_eq!(outcome.summary(), "3 of 5 deleted; 2 failed: bob, carol");
	}

	#[tokio::test]
	async fn complete_outcome_has_short_summary() {
		let (client, _) = client();
		let outcome = run_bulk(&client, "user", BulkAction::Disable, keys(&["alice", "erin"])).await.unwrap();
		assert!(outcome.is_complete());
		assert_eq!(outcome.summary(), "2 disabled");
	}

	#[tokio::test]
	async fn already_enabled_counts_as_success() {
		let (client, _) = client();
		let outcome = run_bulk(&client, "user", BulkAction::Enable, keys(&["dave"])).await.unwrap();
		assert_eq!(outcome.succeeded, keys(&["dave"]));
	}

	#[tokio::test]
	async fn empty_selection_sends_nothing() {
		let (client, transport) = client();
		let err = run_bulk::<String>(&client, "user", BulkAction::Delete, Vec::new()).await.unwrap_err();
		assert!(matches!(err, Error::NothingSelected));
		assert_eq!(transport.request_count(), 0);
	}

	#[tokio::test]
	async fn delete_outcome_clears_selection() {
		let (client, _) = client();
		let mut selection = SelectionTracker::new();
		selection.show_page(keys(&["alice", "bob"]).into_iter().map(Row::new), 2);
		selection.select_all_on_page();

		let ids: Vec<String> = selection.selected_ids().cloned().collect();
		let outcome = run_bulk(&client, "user", BulkAction::Delete, ids).await.unwrap();
		outcome.apply_to(&mut selection);
		assert!(selection.is_empty());
		assert_eq!(selection.anchor(), None);
	}

	#[tokio::test]
	async fn disable_outcome_updates_statuses() {
		let (client, _) = client();
		let mut selection = SelectionTracker::new();
		selection.show_page(
			keys(&["alice", "erin"]).into_iter().map(|id| Row::new(id).with_status(EntityStatus::Enabled)),
			2,
		);
		selection.select_all_on_page();
		assert!(selection.can_disable());

		let ids: Vec<String> = selection.selected_ids().cloned().collect();
		let outcome = run_bulk(&client, "user", BulkAction::Disable, ids).await.unwrap();
		outcome.apply_to(&mut selection);

		assert_eq!(selection.selected_count(), 2);
		assert!(selection.can_enable());
		assert!(!selection.can_disable());
	}
}
