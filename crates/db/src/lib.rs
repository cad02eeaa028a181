//! Storage primitives for shelf.
//!
//! [`Table`] is a keyed, uniqueness-enforcing row store guarded by an async
//! lock. It is opened at process start and closed at shutdown; every call
//! after [`Table::close`] fails with [`StorageError::Closed`].

pub mod error;
pub mod table;

pub use error::StorageError;
pub use table::Table;
