//! List-page core for the identity-management console.
//!
//! A list page owns a [`ListPage`]: the [`SelectionTracker`] that survives
//! pagination, the tri-state header and toolbar derived from it, and an
//! [`ActionGate`] that admits one bulk action at a time. Bulk actions turn
//! the selection into one batch of per-entity commands through
//! [`idm_runtime::BatchClient`].
//!
//! ```text
//! gestures ─► SelectionTracker ─► Toolbar
//!                   │
//!                   ▼ selected ids
//!             BulkAction ─► BatchClient ─► BulkOutcome ─► SelectionTracker
//! ```

pub mod bulk;
pub mod entity;
pub mod error;
pub mod gate;
pub mod methods;
pub mod page;
pub mod selection;
pub mod toolbar;

pub use bulk::{BulkAction, BulkOutcome, run_bulk};
pub use entity::{EntityKey, EntityStatus, Row, SelectableEntity};
pub use error::{Error, Result};
pub use gate::{ActionGate, Ticket};
pub use methods::{Delete, Disable, Enable, Entry, Find, Show};
pub use page::{DEFAULT_PAGE_SIZE, FinishedBulk, ListPage, PendingBulk};
pub use selection::{HeaderCheckbox, SelectionState, SelectionTracker};
pub use toolbar::Toolbar;

pub use idm_runtime::{BatchClient, BatchResponse, ClientConfig, Command, CommandError, CommandResult, Reply};
