//! Page controller state for one entity list.

use idm_runtime::{BatchClient, BatchResponse, Command};
use tracing::{debug, info};

use crate::bulk::{BulkAction, BulkOutcome};
use crate::entity::{EntityKey, SelectableEntity};
use crate::error::{Error, Result};
use crate::gate::{ActionGate, Ticket};
use crate::selection::SelectionTracker;
use crate::toolbar::Toolbar;

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Selection, paging position and in-flight bulk action of one list page.
///
/// A bulk action runs in three steps so the event loop never holds the page
/// across an await: [`begin_bulk`](Self::begin_bulk) snapshots the selection,
/// [`PendingBulk::execute`] talks to the server, and
/// [`finish_bulk`](Self::finish_bulk) applies the outcome unless the page was
/// [`unmount`](Self::unmount)ed in the meantime.
#[derive(Debug)]
pub struct ListPage<K> {
	entity: String,
	selection: SelectionTracker<K>,
	gate: ActionGate,
	page: usize,
	page_size: usize,
}

/// Bulk action admitted by the page, not yet sent.
#[derive(Debug)]
pub struct PendingBulk<K> {
	entity: String,
	action: BulkAction,
	keys: Vec<K>,
	ticket: Ticket,
}

/// Bulk action whose batch settled, one way or the other.
#[derive(Debug)]
pub struct FinishedBulk<K> {
	action: BulkAction,
	keys: Vec<K>,
	ticket: Ticket,
	result: idm_runtime::Result<BatchResponse>,
}

impl<K: EntityKey> ListPage<K> {
	pub fn new(entity: impl Into<String>) -> Self {
		Self {
			entity: entity.into(),
			selection: SelectionTracker::new(),
			gate: ActionGate::new(),
			page: 1,
			page_size: DEFAULT_PAGE_SIZE,
		}
	}

	pub fn entity(&self) -> &str {
		&self.entity
	}

	pub fn selection(&self) -> &SelectionTracker<K> {
		&self.selection
	}

	/// Gesture target for row clicks and the header checkbox.
	pub fn selection_mut(&mut self) -> &mut SelectionTracker<K> {
		&mut self.selection
	}

	/// 1-based page number.
	pub fn page(&self) -> usize {
		self.page
	}

	pub fn page_size(&self) -> usize {
		self.page_size
	}

	/// Shows page `page` with its rows and the table-wide selectable count.
	pub fn show_page<E>(&mut self, page: usize, rows: impl IntoIterator<Item = E>, total_selectable: usize)
	where
		E: SelectableEntity<Id = K>,
	{
		if page != self.page {
			self.selection.invalidate_anchor();
		}
		self.page = page;
		self.selection.show_page(rows, total_selectable);
	}

	/// Changes the page size. The caller reloads rows afterwards.
	pub fn set_page_size(&mut self, page_size: usize) {
		if page_size != self.page_size {
			self.selection.invalidate_anchor();
			self.page_size = page_size.max(1);
		}
	}

	pub fn is_busy(&self) -> bool {
		self.gate.is_busy()
	}

	pub fn toolbar(&self) -> Toolbar {
		Toolbar::new(&self.selection, self.is_busy())
	}

	/// Admits `action` over the current selection.
	pub fn begin_bulk(&self, action: BulkAction) -> Result<PendingBulk<K>> {
		if self.selection.is_empty() {
			return Err(Error::NothingSelected);
		}
		if self.is_busy() {
			return Err(Error::Busy);
		}
		if !self.toolbar().allows(action) {
			return Err(Error::Unavailable { action });
		}
		let ticket = self.gate.begin().ok_or(Error::Busy)?;
		Ok(PendingBulk {
			entity: self.entity.clone(),
			action,
			keys: self.selection.selected_ids().cloned().collect(),
			ticket,
		})
	}

	/// Applies a settled bulk action.
	///
	/// Returns `Ok(None)` when the page was unmounted after the action began;
	/// the result is dropped without touching the selection. A failed batch
	/// leaves the selection as it was.
	pub fn finish_bulk(&mut self, finished: FinishedBulk<K>) -> Result<Option<BulkOutcome<K>>> {
		let FinishedBulk {
			action,
			keys,
			ticket,
			result,
		} = finished;
		if !self.gate.accepts(&ticket) {
			debug!(target: "idm.bulk", entity = %self.entity, %action, "discarding result for unmounted page");
			return Ok(None);
		}

		let outcome = BulkOutcome::from_response(action, keys, result?);
		outcome.apply_to(&mut self.selection);
		info!(target: "idm.bulk", entity = %self.entity, summary = %outcome.summary(), "bulk action applied");
		Ok(Some(outcome))
	}

	/// Begins, executes and finishes `action` in one go.
	pub async fn run_bulk(&mut self, client: &BatchClient, action: BulkAction) -> Result<Option<BulkOutcome<K>>> {
		let pending = self.begin_bulk(action)?;
		let finished = pending.execute(client).await;
		self.finish_bulk(finished)
	}

	/// Page left the screen: stale results are dropped and the selection
	/// starts over on the next mount.
	pub fn unmount(&mut self) {
		self.gate.invalidate();
		self.selection.clear();
	}
}

impl<K: EntityKey> PendingBulk<K> {
	pub fn action(&self) -> BulkAction {
		self.action
	}

	/// Keys in the order their commands are sent.
	pub fn keys(&self) -> &[K] {
		&self.keys
	}

	pub fn commands(&self) -> Vec<Command> {
		self.action.commands(&self.entity, &self.keys)
	}

	pub async fn execute(self, client: &BatchClient) -> FinishedBulk<K> {
		let result = client.execute(self.commands()).await;
		FinishedBulk {
			action: self.action,
			keys: self.keys,
			ticket: self.ticket,
			result,
		}
	}
}
