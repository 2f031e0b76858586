//! Cross-page selection for paginated list pages.
//!
//! [`SelectionTracker`] stores selected identifiers, not row positions, so a
//! selection survives paging, re-sorting and page-size changes. The page
//! controller feeds it the rows currently on screen with
//! [`SelectionTracker::set_rows`] and the number of selectable entities in
//! the whole result set with [`SelectionTracker::set_total_selectable`];
//! everything else (tri-state header, per-page counts, toolbar enablement)
//! is derived.


use std::hash::Hash;

use indexmap::IndexMap;
use tracing::trace;

use crate::entity::{EntityStatus, SelectableEntity};

/// Aggregate selection state relative to the page and the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
	/// Nothing selected.
	Empty,
	/// Some, but not every selectable row on this page.
	Partial,
	/// Every selectable row on the current page, not the whole table.
	AllPage,
	/// Every selectable entity in the result set.
	AllTable,
}

/// Tri-state header checkbox of the list table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderCheckbox {
	Unchecked,
	Indeterminate,
	Checked,
}

#[derive(Debug, Clone)]
struct VisibleRow<K> {
	id: K,
	selectable: bool,
	status: EntityStatus,
}

/// Selected entity ids of one list page, independent of pagination.
///
/// Ids are kept in selection order; bulk actions are issued in that order.
#[derive(Debug, Clone)]
pub struct SelectionTracker<K> {
	selected: IndexMap<K, EntityStatus>,
	rows: Vec<VisibleRow<K>>,
	total_selectable: usize,
	anchor: Option<usize>,
}

impl<K> Default for SelectionTracker<K> {
	fn default() -> Self {
		Self {
			selected: IndexMap::new(),
			rows: Vec::new(),
			total_selectable: 0,
			anchor: None,
		}
	}
}

impl<K: Clone + Eq + Hash> SelectionTracker<K> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces the visible rows, in render order.
	///
	/// The range anchor is dropped whenever the id sequence changes (new
	/// page, new sort, new page size). Statuses of selected ids that are
	/// visible again are refreshed, and a selected id that is now shown as
	/// non-selectable is dropped from the selection.
	pub fn set_rows<E>(&mut self, rows: impl IntoIterator<Item = E>)
	where
		E: SelectableEntity<Id = K>,
	{
		self.set_rows_with(rows, |row| row.is_selectable());
	}

	/// Like [`set_rows`](Self::set_rows), with an explicit selectability predicate.
	pub fn set_rows_with<E, F>(&mut self, rows: impl IntoIterator<Item = E>, is_selectable: F)
	where
		E: SelectableEntity<Id = K>,
		F: Fn(&E) -> bool,
	{
		let rows: Vec<VisibleRow<K>> = rows
			.into_iter()
			.map(|row| VisibleRow {
				selectable: is_selectable(&row),
				status: row.status(),
				id: row.id(),
			})
			.collect();

		let same_shape = rows.len() == self.rows.len() && rows.iter().zip(&self.rows).all(|(new, old)| new.id == old.id);
		if !same_shape {
			self.anchor = None;
		}

		for row in &rows {
			if !row.selectable {
				self.selected.shift_remove(&row.id);
			} else if let Some(status) = self.selected.get_mut(&row.id) {
				*status = row.status;
			}
		}

		self.rows = rows;
		trace!(target: "idm.selection", rows = self.rows.len(), selected = self.selected.len(), "rows replaced");
	}

	/// Number of selectable entities in the whole result set.
	pub fn set_total_selectable(&mut self, total: usize) {
		self.total_selectable = total;
	}

	/// Convenience for a page load: rows plus the table-wide selectable count.
	pub fn show_page<E>(&mut self, rows: impl IntoIterator<Item = E>, total_selectable: usize)
	where
		E: SelectableEntity<Id = K>,
	{
		self.set_rows(rows);
		self.set_total_selectable(total_selectable);
	}

	/// Selects a visible, selectable row by id. Returns whether anything changed.
	///
	/// Ids that are not on the current page, or are non-selectable, are ignored.
	pub fn select_row(&mut self, id: &K) -> bool {
		let Some(index) = self.position(id).filter(|&index| self.is_row_selectable(index)) else {
			return false;
		};
		self.anchor = Some(index);
		self.apply(index, true)
	}

	/// Deselects an id. Off-page ids may be deselected too.
	pub fn deselect_row(&mut self, id: &K) -> bool {
		if let Some(index) = self.position(id).filter(|&index| self.is_row_selectable(index)) {
			self.anchor = Some(index);
		}
		self.selected.shift_remove(id).is_some()
	}

	/// Flips the row at `index`, moving the anchor there.
	///
	/// Non-selectable rows are left alone and keep the anchor where it was.
	pub fn toggle_row(&mut self, index: usize) -> bool {
		let Some(row) = self.rows.get(index).filter(|row| row.selectable) else {
			return false;
		};
		let select = !self.selected.contains_key(&row.id);
		self.anchor = Some(index);
		self.apply(index, select)
	}

	/// Row click gesture.
	///
	/// A plain click toggles the row. A shift-click applies the clicked row's
	/// new state to every selectable row between the anchor and the clicked
	/// row; without an anchor it degrades to a plain click. Clicks on
	/// non-selectable rows do nothing.
	pub fn click_row(&mut self, index: usize, shift: bool) -> bool {
		let Some(row) = self.rows.get(index).filter(|row| row.selectable) else {
			return false;
		};
		match (shift, self.anchor) {
			(true, Some(anchor)) => {
				let select = !self.selected.contains_key(&row.id);
				self.select_range(anchor, index, select)
			}
			_ => self.toggle_row(index),
		}
	}

	/// Applies `select` to every selectable row between `from` and `to`
	/// inclusive, in either direction. Indices past the last row are
	/// clamped. The anchor moves to `to`.
	pub fn select_range(&mut self, from: usize, to: usize, select: bool) -> bool {
		let Some(last) = self.rows.len().checked_sub(1) else {
			return false;
		};
		let (from, to) = (from.min(last), to.min(last));
		let (lo, hi) = if from <= to { (from, to) } else { (to, from) };

		let mut changed = false;
		for index in lo..=hi {
			changed |= self.apply(index, select);
		}
		self.anchor = Some(to);
		trace!(target: "idm.selection", lo, hi, select, "range applied");
		changed
	}

	/// Selects every selectable row on the current page. Off-page
	/// selections are kept.
	pub fn select_all_on_page(&mut self) -> bool {
		let mut changed = false;
		for index in 0..self.rows.len() {
			changed |= self.apply(index, true);
		}
		changed
	}

	pub fn deselect_all_on_page(&mut self) -> bool {
		let mut changed = false;
		for index in 0..self.rows.len() {
			changed |= self.apply(index, false);
		}
		changed
	}

	/// Selects every entity of the result set.
	///
	/// The caller fetches the table's entities; non-selectable ones are
	/// skipped, and so is any id currently shown as non-selectable.
	pub fn select_all_in_table<E>(&mut self, entities: impl IntoIterator<Item = E>)
	where
		E: SelectableEntity<Id = K>,
	{
		let before = self.selected.len();
		for entity in entities.into_iter().filter(|e| e.is_selectable()) {
			let id = entity.id();
			if self.rows.iter().any(|row| row.id == id && !row.selectable) {
				continue;
			}
			self.selected.entry(id).or_insert(entity.status());
		}
		trace!(target: "idm.selection", added = self.selected.len() - before, "selected whole table");
	}

	/// Selects every id in `ids`, which the caller guarantees to be
	/// selectable. Statuses come from the visible rows where known.
	pub fn select_all_ids(&mut self, ids: impl IntoIterator<Item = K>) {
		for id in ids {
			let status = match self.rows.iter().find(|row| row.id == id) {
				Some(row) if !row.selectable => continue,
				Some(row) => row.status,
				None => EntityStatus::Unknown,
			};
			self.selected.entry(id).or_insert(status);
		}
	}

	/// Empties the selection. Idempotent.
	pub fn clear(&mut self) {
		if !self.selected.is_empty() {
			trace!(target: "idm.selection", cleared = self.selected.len(), "selection cleared");
		}
		self.selected.clear();
		self.anchor = None;
	}

	pub fn invalidate_anchor(&mut self) {
		self.anchor = None;
	}

	/// Header checkbox gesture.
	///
	/// Checked clears everything; otherwise a fully selected page is
	/// deselected and any other page is selected in full.
	pub fn toggle_header(&mut self) -> bool {
		match self.header() {
			HeaderCheckbox::Checked => {
				let changed = !self.selected.is_empty();
				self.clear();
				changed
			}
			_ if self.page_fully_selected() => self.deselect_all_on_page(),
			_ => self.select_all_on_page(),
		}
	}

	/// Records a new status for a selected id, e.g. after it was enabled.
	pub fn set_status(&mut self, id: &K, status: EntityStatus) {
		if let Some(current) = self.selected.get_mut(id) {
			*current = status;
		}
		if let Some(row) = self.rows.iter_mut().find(|row| &row.id == id) {
			row.status = status;
		}
	}

	/// Drops the given ids from the selection.
	pub fn remove_ids<'a>(&mut self, ids: impl IntoIterator<Item = &'a K>)
	where
		K: 'a,
	{
		for id in ids {
			self.selected.shift_remove(id);
		}
	}

	pub fn is_selected(&self, id: &K) -> bool {
		self.selected.contains_key(id)
	}

	pub fn is_row_selected(&self, index: usize) -> bool {
		self.rows.get(index).is_some_and(|row| self.selected.contains_key(&row.id))
	}

	pub fn is_row_selectable(&self, index: usize) -> bool {
		self.rows.get(index).is_some_and(|row| row.selectable)
	}

	/// Selected ids in selection order.
	pub fn selected_ids(&self) -> impl Iterator<Item = &K> {
		self.selected.keys()
	}

	pub fn selected_count(&self) -> usize {
		self.selected.len()
	}

	pub fn is_empty(&self) -> bool {
		self.selected.is_empty()
	}

	/// Selected rows among those currently visible.
	pub fn selected_on_page(&self) -> usize {
		self.rows.iter().filter(|row| self.selected.contains_key(&row.id)).count()
	}

	/// Selected ids that are not on the current page.
	pub fn selected_off_page(&self) -> usize {
		self.selected.len().saturating_sub(self.selected_on_page())
	}

	pub fn page_selectable(&self) -> usize {
		self.rows.iter().filter(|row| row.selectable).count()
	}

	/// Table-wide selectable count, never below what the page itself shows.
	pub fn total_selectable(&self) -> usize {
		self.total_selectable.max(self.page_selectable())
	}

	pub fn anchor(&self) -> Option<usize> {
		self.anchor
	}

	pub fn state(&self) -> SelectionState {
		if self.selected.is_empty() {
			SelectionState::Empty
		} else if self.selected.len() >= self.total_selectable() && self.page_selectable_all_selected() {
			SelectionState::AllTable
		} else if self.page_fully_selected() {
			SelectionState::AllPage
		} else {
			SelectionState::Partial
		}
	}

	/// Header checkbox: checked only when the whole table is selected.
	pub fn header(&self) -> HeaderCheckbox {
		match self.state() {
			SelectionState::Empty => HeaderCheckbox::Unchecked,
			SelectionState::AllTable => HeaderCheckbox::Checked,
			SelectionState::Partial | SelectionState::AllPage => HeaderCheckbox::Indeterminate,
		}
	}

	/// The status every selected entity shares, if any.
	///
	/// `None` for an empty selection, a mix of statuses, or any unknown status.
	pub fn uniform_status(&self) -> Option<EntityStatus> {
		let mut statuses = self.selected.values();
		let first = *statuses.next()?;
		if first == EntityStatus::Unknown || statuses.any(|s| *s != first) {
			return None;
		}
		Some(first)
	}

	pub fn can_delete(&self) -> bool {
		!self.selected.is_empty()
	}

	/// Enable needs a non-empty selection of uniformly disabled entities.
	pub fn can_enable(&self) -> bool {
		self.uniform_status() == Some(EntityStatus::Disabled)
	}

	/// Disable needs a non-empty selection of uniformly enabled entities.
	pub fn can_disable(&self) -> bool {
		self.uniform_status() == Some(EntityStatus::Enabled)
	}

	fn page_fully_selected(&self) -> bool {
		self.page_selectable() > 0 && self.page_selectable_all_selected()
	}

	/// True for a page with no selectable rows.
	fn page_selectable_all_selected(&self) -> bool {
		self.rows
			.iter()
			.filter(|row| row.selectable)
			.all(|row| self.selected.contains_key(&row.id))
	}

	fn position(&self, id: &K) -> Option<usize> {
		self.rows.iter().position(|row| &row.id == id)
	}

	fn apply(&mut self, index: usize, select: bool) -> bool {
		let Some(row) = self.rows.get(index) else {
			return false;
		};
		if !row.selectable {
			return false;
		}
		if select {
			if self.selected.contains_key(&row.id) {
				return false;
			}
			self.selected.insert(row.id.clone(), row.status);
			true
		} else {
			self.selected.shift_remove(&row.id).is_some()
		}
	}
}
