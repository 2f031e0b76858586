//! One bulk action in flight per page, and stale results dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[derive(Debug, Default)]
struct GateState {
	busy: AtomicBool,
	generation: AtomicU64,
}

/// Admission control for a page's bulk actions.
///
/// [`begin`](Self::begin) hands out at most one [`Ticket`] at a time; the
/// toolbar keeps its buttons disabled while one exists. Leaving the page
/// calls [`invalidate`](Self::invalidate), after which results carried by
/// older tickets are no longer [`accepted`](Self::accepts).
#[derive(Debug, Clone, Default)]
pub struct ActionGate {
	state: Arc<GateState>,
}

/// Proof that a bulk action was admitted. Dropping it frees the gate.
#[derive(Debug)]
pub struct Ticket {
	generation: u64,
	state: Arc<GateState>,
}

impl ActionGate {
	pub fn new() -> Self {
		Self::default()
	}

	/// Admits a new action, or `None` while another is outstanding.
	pub fn begin(&self) -> Option<Ticket> {
		self.state
			.busy
			.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
			.ok()?;
		Some(Ticket {
			generation: self.state.generation.load(Ordering::Acquire),
			state: Arc::clone(&self.state),
		})
	}

	pub fn is_busy(&self) -> bool {
		self.state.busy.load(Ordering::Acquire)
	}

	/// Marks every outstanding ticket as stale.
	pub fn invalidate(&self) {
		self.state.generation.fetch_add(1, Ordering::AcqRel);
	}

	/// Whether the result carried by `ticket` may still be applied.
	pub fn accepts(&self, ticket: &Ticket) -> bool {
		Arc::ptr_eq(&self.state, &ticket.state) && ticket.generation == self.state.generation.load(Ordering::Acquire)
	}
}

impl Drop for Ticket {
	fn drop(&mut self) {
		self.state.busy.store(false, Ordering::Release);
	}
}
