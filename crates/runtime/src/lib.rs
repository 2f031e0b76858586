//! Batch runtime for the identity-management console.
//!
//! This crate turns lists of independent commands into single JSON-RPC
//! round trips:
//!
//! - **Transport**: one POST per batch over HTTP (or an in-memory mock)
//! - **Client**: envelope building, request IDs, response validation
//! - **Response**: ordered per-command `Ok`/`Err` outcomes
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │   idm-core   │  Selection tracking, bulk actions
//! └──────┬───────┘
//!        │ Vec<Command>
//! ┌──────▼───────┐
//! │  idm-runtime │  This crate
//! │  ┌────────┐  │
//! │  │ Client │  │  Batch envelope + result correlation
//! │  └────────┘  │
//! │  ┌────────┐  │
//! │  │ Trans  │  │  HTTP POST / mock
//! │  └────────┘  │
//! └──────────────┘
//! ```
//!
//! # Failure model
//!
//! Transport failures, top-level server errors and length mismatches are
//! [`Error`]s and fail the whole batch. Per-command failures are `Err`
//! entries inside [`BatchResponse`] and never abort sibling commands. No
//! retries are attempted.

pub mod client;
pub mod error;
pub mod transport;

pub use client::{BatchClient, BatchResponse, ClientConfig, Method};
pub use error::{Error, Result};
#[cfg(any(test, feature = "mock"))]
pub use transport::mock::MockTransport;
pub use transport::{HttpTransport, HttpTransportConfig, JSON_ENDPOINT_PATH, Transport, TransportFuture};

pub use idm_protocol::{ApiVersion, Command, CommandError, CommandResult, Reply};
