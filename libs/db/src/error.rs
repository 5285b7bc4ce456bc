//! Error taxonomy for the storage engine.
//!
//! Every fallible path in the crate returns [`Result`]; nothing is retried
//! internally. A failed write transaction rolls back and leaves the on-disk
//! state unchanged.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The requested node, edge, or interned name does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A vector's length is inconsistent with the dim pinned for its tag,
    /// or a byte length is not a multiple of 4.
    #[error("vector dim mismatch: {0}")]
    DimMismatch(String),

    /// A decoder detected truncation, an unknown tag, or trailing bytes.
    #[error("corrupt encoding: {0}")]
    CorruptEncoding(&'static str),

    /// Operation on a transaction that was already committed or aborted.
    #[error("transaction already committed or aborted")]
    TxnClosed,

    /// Any error surfaced by the underlying store.
    #[error("storage backend: {0}")]
    Backend(String),
}

impl From<rocksdb::Error> for Error {
    fn from(err: rocksdb::Error) -> Self {
        Error::Backend(err.to_string())
    }
}
