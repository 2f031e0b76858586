//! Rows a list page can select, and how their identifiers reach the wire.

use std::fmt;
use std::hash::Hash;

use serde_json::Value;

/// Pre-action status relevant to enable/disable bulk actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntityStatus {
	Enabled,
	Disabled,
	/// Entity has no enable flag, or its status was never loaded.
	#[default]
	Unknown,
}

impl EntityStatus {
	/// Maps an "is disabled" flag to a status.
	pub fn from_disabled(disabled: bool) -> Self {
		if disabled { EntityStatus::Disabled } else { EntityStatus::Enabled }
	}
}

/// A record shown as one row of a list page.
pub trait SelectableEntity {
	type Id: Clone + Eq + Hash;

	/// Stable identifier, independent of the row's position.
	fn id(&self) -> Self::Id;

	/// Whether the row may take part in bulk actions.
	///
	/// Business rules go here, e.g. the signed-in account cannot be deleted.
	fn is_selectable(&self) -> bool {
		true
	}

	fn status(&self) -> EntityStatus {
		EntityStatus::Unknown
	}
}

impl<E: SelectableEntity + ?Sized> SelectableEntity for &E {
	type Id = E::Id;

	fn id(&self) -> Self::Id {
		(**self).id()
	}

	fn is_selectable(&self) -> bool {
		(**self).is_selectable()
	}

	fn status(&self) -> EntityStatus {
		(**self).status()
	}
}

/// Plain row for pages that do not have a richer entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<K> {
	pub id: K,
	pub selectable: bool,
	pub status: EntityStatus,
}

impl<K> Row<K> {
	pub fn new(id: K) -> Self {
		Self {
			id,
			selectable: true,
			status: EntityStatus::Unknown,
		}
	}

	pub fn locked(mut self) -> Self {
		self.selectable = false;
		self
	}

	pub fn with_status(mut self, status: EntityStatus) -> Self {
		self.status = status;
		self
	}
}

impl<K: Clone + Eq + Hash> SelectableEntity for Row<K> {
	type Id = K;

	fn id(&self) -> K {
		self.id.clone()
	}

	fn is_selectable(&self) -> bool {
		self.selectable
	}

	fn status(&self) -> EntityStatus {
		self.status
	}
}

/// Identifier that can address an entity in a command.
///
/// Simple entities are keyed by one string; nested ones (a rule inside a
/// container, a record inside a zone) by a tuple of strings, sent as
/// consecutive positional arguments.
pub trait EntityKey: Clone + Eq + Hash + fmt::Debug {
	fn to_args(&self) -> Vec<Value>;

	/// Human-readable form used in outcome summaries.
	fn label(&self) -> String;
}

impl EntityKey for String {
	fn to_args(&self) -> Vec<Value> {
		vec![Value::String(self.clone())]
	}

	fn label(&self) -> String {
		self.clone()
	}
}

impl EntityKey for (String, String) {
	fn to_args(&self) -> Vec<Value> {
		vec![Value::String(self.0.clone()), Value::String(self.1.clone())]
	}

	fn label(&self) -> String {
		format!("{}/{}", self.0, self.1)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn row_defaults_to_selectable_with_unknown_status() {
		let row = Row::new("alice".to_string());
		assert!(row.is_selectable());
		assert_eq!(row.status(), EntityStatus::Unknown);
		assert!(!row.clone().locked().is_selectable());
	}

	#[test]
	fn references_forward_to_entity() {
		let row = Row::new(7u32).with_status(EntityStatus::Disabled);
		let by_ref = &row;
		assert_eq!(by_ref.id(), 7);
		assert_eq!(SelectableEntity::status(&by_ref), EntityStatus::Disabled);
	}

	#[test]
	fn tuple_keys_expand_to_positional_args() {
		let key = ("example.test".to_string(), "www".to_string());
		assert_eq!(key.to_args(), vec![Value::from("example.test"), Value::from("www")]);
		assert_eq!(key.label(), "example.test/www");
	}
}
