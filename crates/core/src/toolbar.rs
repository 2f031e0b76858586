use std::hash::Hash;

use crate::bulk::BulkAction;
use crate::selection::{HeaderCheckbox, SelectionTracker};

/// Everything a list toolbar renders, read off one selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toolbar {
	pub header: HeaderCheckbox,
	pub selected: usize,
	pub on_page: usize,
	pub off_page: usize,
	/// A bulk action is in flight; every action button is disabled.
	pub busy: bool,
	pub delete: bool,
	pub enable: bool,
	pub disable: bool,
}

impl Toolbar {
	pub fn new<K: Clone + Eq + Hash>(selection: &SelectionTracker<K>, busy: bool) -> Self {
		Self {
			header: selection.header(),
			selected: selection.selected_count(),
			on_page: selection.selected_on_page(),
			off_page: selection.selected_off_page(),
			busy,
			delete: !busy && selection.can_delete(),
			enable: !busy && selection.can_enable(),
			disable: !busy && selection.can_disable(),
		}
	}

	pub fn allows(&self, action: BulkAction) -> bool {
		match action {
			BulkAction::Delete => self.delete,
			BulkAction::Enable => self.enable,
			BulkAction::Disable => self.disable,
		}
	}

	/// Selection count label shown next to the buttons.
	pub fn label(&self) -> String {
		match (self.selected, self.off_page) {
			(0, _) => "No items selected".to_string(),
			(n, 0) => format!("{n} selected on this page"),
			(n, off) => format!("{n} selected ({} on this page, {off} on other pages)", self.on_page),
		}
	}
}
