//! Domain errors raised by the persistence layer. The UI collapses most of
//! them into one friendly hint per operation, but keeping them typed lets the
//! logs and tests tell a rejected write apart from a broken database.

use thiserror::Error;

use crate::models::BookField;

#[derive(Debug, Error)]
pub enum InventoryError {
    /// SQLite refused the write because a column constraint failed (duplicate
    /// id or title, id outside the 4-digit range, negative quantity, or a
    /// value of the wrong type).
    #[error("book rejected by the store: {0}")]
    Rejected(#[source] rusqlite::Error),

    /// Any other SQLite failure.
    #[error("database error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// A numeric field was typed with something that is not an integer.
    #[error("{field} must be a whole number, got '{value}'")]
    InvalidNumber { field: BookField, value: String },

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("no book with id {0}")]
    NotFound(i64),
}

pub type Result<T> = std::result::Result<T, InventoryError>;
