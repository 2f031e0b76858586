use thiserror::Error;

use crate::bulk::BulkAction;

/// Errors raised by list-page operations.
#[derive(Debug, Error)]
pub enum Error {
	/// The batch itself failed; the selection was left as it was.
	#[error(transparent)]
	Runtime(#[from] idm_runtime::Error),

	#[error("a bulk action is already in progress")]
	Busy,

	#[error("nothing is selected")]
	NothingSelected,

	#[error("cannot {action} the current selection")]
	Unavailable { action: BulkAction },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
	/// Whether the batch never got a usable answer from the server.
	pub fn is_transport(&self) -> bool {
		matches!(self, Error::Runtime(_))
	}
}
