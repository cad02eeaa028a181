//! Persistence contract for books and its table-backed implementation.

use async_trait::async_trait;
use shelf_db::{StorageError, Table};

use super::models::{Book, BookFields, BookPatch};

/// Storage collaborator the book handler depends on.
///
/// Uniqueness of the ISBN is enforced here: `insert` fails with
/// [`StorageError::Conflict`] when the key is taken.
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn insert(&self, book: Book) -> Result<Book, StorageError>;

    /// Every stored book, ordered by ISBN
    async fn list_all(&self) -> Result<Vec<Book>, StorageError>;

    async fn find_by_id(&self, isbn: &str) -> Result<Option<Book>, StorageError>;

    /// Overwrite the mutable fields of an existing book in one step
    async fn replace(&self, isbn: &str, fields: BookFields) -> Result<Option<Book>, StorageError>;

    /// Apply a sparse patch to the stored book in the same step that reads it
    async fn patch(&self, isbn: &str, patch: BookPatch) -> Result<Option<Book>, StorageError>;

    /// `true` if a book was removed
    async fn remove(&self, isbn: &str) -> Result<bool, StorageError>;

    /// Release the backing storage at shutdown
    async fn close(&self) {}
}

pub struct TableBookStore {
    table: Table<Book>,
}

impl TableBookStore {
    pub const TABLE: &'static str = "books";

    pub fn new() -> Self {
        Self {
            table: Table::new(Self::TABLE),
        }
    }
}

impl Default for TableBookStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookStore for TableBookStore {
    async fn insert(&self, book: Book) -> Result<Book, StorageError> {
        self.table.insert(book.isbn.clone(), book).await
    }

    async fn list_all(&self) -> Result<Vec<Book>, StorageError> {
        self.table.scan().await
    }

    async fn find_by_id(&self, isbn: &str) -> Result<Option<Book>, StorageError> {
        self.table.get(isbn).await
    }

    async fn replace(&self, isbn: &str, fields: BookFields) -> Result<Option<Book>, StorageError> {
        self.table
            .update(isbn, move |book| book.replace_fields(fields))
            .await
    }

    async fn patch(&self, isbn: &str, patch: BookPatch) -> Result<Option<Book>, StorageError> {
        self.table
            .update(isbn, move |book| {
                let fields = patch.apply(book.fields());
                book.replace_fields(fields);
            })
            .await
    }

    async fn remove(&self, isbn: &str) -> Result<bool, StorageError> {
        self.table.remove(isbn).await
    }

    async fn close(&self) {
        self.table.close().await;
    }
}
