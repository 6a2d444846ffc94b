//! Errors surfaced to callers of the library core.
//!
//! Only foreground failures live here. A corrupt library file on startup and
//! a failed save are logged by the store and never reach the caller.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LibraryError {
    /// Input violates a prompt invariant (e.g. a blank name).
    #[error("invalid prompt: {0}")]
    Validation(String),
    /// Import text is not a well-formed library record.
    #[error("could not parse library: {0}")]
    Parse(String),
    /// The library could not be serialized for export.
    #[error("could not serialize library: {0}")]
    Serialize(String),
}

pub type LibraryResult<T> = Result<T, LibraryError>;
