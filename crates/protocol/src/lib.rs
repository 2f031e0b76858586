//! Wire types for the identity-management batch JSON-RPC protocol.
//!
//! This crate contains the serde-serializable types exchanged with the
//! server's JSON endpoint when several logical commands travel in one
//! `batch` call. These types are the "protocol layer": the shapes of data
//! as they appear on the wire.
//!
//! # Wire shape
//!
//! ```text
//! request:  {"method": "batch", "params": [[{"method", "params": [args, options]}, ...], {"version"}], "id"}
//! response: {"result": {"count", "results": [{"result", "value", "summary", "error"}, ...]}, "error", "id"}
//! ```
//!
//! Types in this crate are:
//! - **Pure data**: no I/O, no transport concerns
//! - **Ordered**: result `i` always belongs to command `i`
//! - **Typed**: per-command outcomes are [`CommandResult`] values, not
//!   objects probed for an `error` key
//!
//! Correlation, submission and length validation live in `idm-runtime`.

pub mod batch;
pub mod command;
pub mod error;
pub mod reply;
pub mod version;

pub use batch::{BatchRequest, BatchResult, InvalidBatch, RequestEnvelope, ResponseEnvelope, ResultElement};
pub use command::Command;
pub use error::{CommandError, codes};
pub use reply::Reply;
pub use version::{ApiVersion, DEFAULT_API_VERSION};

/// Outcome of one command inside a batch.
///
/// `Ok` carries the success payload, `Err` the structured application error.
/// Exactly one of the two exists for every command that reached the server.
pub type CommandResult<T = Reply> = std::result::Result<T, CommandError>;
