//! Errors raised by the storage layer.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// A row with the same primary key already exists
    #[error("duplicate key '{key}' in table '{table}'")]
    Conflict { table: String, key: String },

    /// The table has been shut down
    #[error("table '{table}' is closed")]
    Closed { table: String },
}

impl StorageError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::Conflict { .. })
    }
}
