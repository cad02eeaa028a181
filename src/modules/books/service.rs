//! Book operations: validate input, call the store, and classify outcomes.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use shelf_db::StorageError;
use shelf_schema::{validate, Schema, UpdatePolicy};

use super::error::BookError;
use super::models::{Book, BookFields, BookPatch};
use super::schema::BookSchemas;
use super::store::BookStore;

pub struct BookService {
    store: Arc<dyn BookStore>,
    schemas: BookSchemas,
}

impl BookService {
    pub fn new(store: Arc<dyn BookStore>, policy: UpdatePolicy) -> Self {
        Self {
            store,
            schemas: BookSchemas::new(policy),
        }
    }

    pub fn update_policy(&self) -> UpdatePolicy {
        self.schemas.policy
    }

    pub fn store(&self) -> &Arc<dyn BookStore> {
        &self.store
    }

    pub async fn create(&self, payload: &Value) -> Result<Book, BookError> {
        let book: Book = checked(payload, &self.schemas.create)?;
        let isbn = book.isbn.clone();

        let book = self.store.insert(book).await.map_err(|e| match e {
            StorageError::Conflict { .. } => BookError::Conflict(isbn),
            other => BookError::Storage(other),
        })?;

        tracing::info!(module = "books", isbn = %book.isbn, "book created");
        Ok(book)
    }

    pub async fn list(&self) -> Result<Vec<Book>, BookError> {
        Ok(self.store.list_all().await?)
    }

    pub async fn get(&self, isbn: &str) -> Result<Book, BookError> {
        self.store
            .find_by_id(isbn)
            .await?
            .ok_or_else(|| BookError::NotFound(isbn.to_string()))
    }

    /// Validation runs before any lookup, so a bad payload never reaches the
    /// store even when the ISBN does not exist.
    pub async fn update(&self, isbn: &str, payload: &Value) -> Result<Book, BookError> {
        let updated = match self.schemas.policy {
            UpdatePolicy::Replace => {
                let fields: BookFields = checked(payload, &self.schemas.update)?;
                self.store.replace(isbn, fields).await?
            }
            UpdatePolicy::Merge => {
                let patch: BookPatch = checked(payload, &self.schemas.update)?;
                self.store.patch(isbn, patch).await?
            }
        };
        let book = updated.ok_or_else(|| BookError::NotFound(isbn.to_string()))?;

        tracing::info!(module = "books", isbn = %book.isbn, policy = ?self.schemas.policy, "book updated");
        Ok(book)
    }

    pub async fn delete(&self, isbn: &str) -> Result<(), BookError> {
        if !self.store.remove(isbn).await? {
            return Err(BookError::NotFound(isbn.to_string()));
        }
        tracing::info!(module = "books", isbn, "book deleted");
        Ok(())
    }
}

/// Validate `payload` against `schema`, then read it into `T`.
fn checked<T: DeserializeOwned>(payload: &Value, schema: &Schema) -> Result<T, BookError> {
    validate(payload, schema)
        .into_result()
        .map_err(BookError::Validation)?;
    serde_json::from_value(payload.clone()).map_err(|e| BookError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::store::TableBookStore;
    use crate::modules::books::test_support::{sample_book, sample_payload, update_payload};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Barrier;

    fn service(policy: UpdatePolicy) -> BookService {
        BookService::new(Arc::new(TableBookStore::new()), policy)
    }

    /// Store that counts calls and fails every one of them
    #[derive(Default)]
    struct CountingStore {
        calls: AtomicUsize,
    }

    impl CountingStore {
        fn fail(&self) -> StorageError {
            self.calls.fetch_add(1, Ordering::SeqCst);
            StorageError::Closed {
                table: "books".to_string(),
            }
        }
    }

    #[async_trait]
    impl BookStore for CountingStore {
        async fn insert(&self, _book: Book) -> Result<Book, StorageError> {
            Err(self.fail())
        }
        async fn list_all(&self) -> Result<Vec<Book>, StorageError> {
            Err(self.fail())
        }
        async fn find_by_id(&self, _isbn: &str) -> Result<Option<Book>, StorageError> {
            Err(self.fail())
        }
        async fn replace(&self, _isbn: &str, _f: BookFields) -> Result<Option<Book>, StorageError> {
            Err(self.fail())
        }
        async fn patch(&self, _isbn: &str, _p: BookPatch) -> Result<Option<Book>, StorageError> {
            Err(self.fail())
        }
        async fn remove(&self, _isbn: &str) -> Result<bool, StorageError> {
            Err(self.fail())
        }
    }

    #[tokio::test]
    async fn create_then_get_returns_equal_book() {
        let svc = service(UpdatePolicy::Replace);
        let created = svc.create(&sample_payload("32794782")).await.unwrap();
        assert_eq!(created, sample_book("32794782"));
        assert_eq!(svc.get("32794782").await.unwrap(), created);
    }

    #[tokio::test]
    async fn duplicate_create_conflicts_and_keeps_original() {
        let svc = service(UpdatePolicy::Replace);
        svc.create(&sample_payload("1")).await.unwrap();

        let mut second = sample_payload("1");
        second["title"] = json!("Impostor");
        let err = svc.create(&second).await.unwrap_err();
        assert!(matches!(err, BookError::Conflict(ref isbn) if isbn == "1"));
        assert_eq!(svc.get("1").await.unwrap(), sample_book("1"));
    }

    #[tokio::test]
    async fn invalid_create_is_rejected_before_storage() {
        let store = Arc::new(CountingStore::default());
        let svc = BookService::new(store.clone(), UpdatePolicy::Replace);

        let mut payload = sample_payload("1");
        payload["pages"] = json!(-5);
        let err = svc.create(&payload).await.unwrap_err();
        assert!(matches!(err, BookError::Validation(ref v) if v.len() == 1));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found_for_get_update_delete() {
        let svc = service(UpdatePolicy::Replace);
        assert!(matches!(svc.get("999").await, Err(BookError::NotFound(_))));
        assert!(matches!(
            svc.update("999", &update_payload("x")).await,
            Err(BookError::NotFound(_))
        ));
        assert!(matches!(svc.delete("999").await, Err(BookError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_replaces_fields_and_keeps_isbn() {
        let svc = service(UpdatePolicy::Replace);
        svc.create(&sample_payload("1")).await.unwrap();

        let updated = svc.update("1", &update_payload("UPDATED BOOK")).await.unwrap();
        assert_eq!(updated.isbn, "1");
        assert_eq!(updated.title, "UPDATED BOOK");
        assert_eq!(updated.amazon_url, "https://taco.com");
        assert_eq!(svc.get("1").await.unwrap(), updated);
    }

    #[tokio::test]
    async fn update_with_isbn_or_unknown_field_never_reaches_store() {
        let store = Arc::new(CountingStore::default());
        let svc = BookService::new(store.clone(), UpdatePolicy::Replace);

        let mut payload = update_payload("UPDATED BOOK");
        payload["isbn"] = json!("32794782");
        payload["badField"] = json!("DO NOT ADD ME!");

        let err = svc.update("1", &payload).await.unwrap_err();
        match err {
            BookError::Validation(violations) => {
                let codes: Vec<_> = violations.iter().map(|v| v.rule.code()).collect();
                assert_eq!(codes, vec!["unknown_field", "immutable_field"]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn replace_policy_rejects_partial_payload() {
        let svc = service(UpdatePolicy::Replace);
        svc.create(&sample_payload("1")).await.unwrap();

        let err = svc.update("1", &json!({"title": "X"})).await.unwrap_err();
        assert!(matches!(err, BookError::Validation(ref v) if v.len() == 6));
        assert_eq!(svc.get("1").await.unwrap(), sample_book("1"));
    }

    #[tokio::test]
    async fn merge_policy_applies_sparse_patch() {
        let svc = service(UpdatePolicy::Merge);
        svc.create(&sample_payload("1")).await.unwrap();

        let updated = svc.update("1", &json!({"title": "X", "pages": 10})).await.unwrap();
        let mut expected = sample_book("1");
        expected.title = "X".to_string();
        expected.pages = 10;
        assert_eq!(updated, expected);

        assert!(matches!(
            svc.update("1", &json!({"isbn": "2"})).await,
            Err(BookError::Validation(_))
        ));
        assert!(matches!(
            svc.update("999", &json!({"title": "X"})).await,
            Err(BookError::NotFound(_))
        ));
    }

    /// Table-backed store whose reads wait until two callers have read
    struct RendezvousStore {
        inner: TableBookStore,
        readers: Barrier,
    }

    #[async_trait]
    impl BookStore for RendezvousStore {
        async fn insert(&self, book: Book) -> Result<Book, StorageError> {
            self.inner.insert(book).await
        }
        async fn list_all(&self) -> Result<Vec<Book>, StorageError> {
            self.inner.list_all().await
        }
        async fn find_by_id(&self, isbn: &str) -> Result<Option<Book>, StorageError> {
            let found = self.inner.find_by_id(isbn).await;
            self.readers.wait().await;
            found
        }
        async fn replace(&self, isbn: &str, f: BookFields) -> Result<Option<Book>, StorageError> {
            self.inner.replace(isbn, f).await
        }
        async fn patch(&self, isbn: &str, p: BookPatch) -> Result<Option<Book>, StorageError> {
            self.inner.patch(isbn, p).await
        }
        async fn remove(&self, isbn: &str) -> Result<bool, StorageError> {
            self.inner.remove(isbn).await
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_merges_on_different_fields_both_land() {
        let store = Arc::new(RendezvousStore {
            inner: TableBookStore::new(),
            readers: Barrier::new(2),
        });
        store.insert(sample_book("1")).await.unwrap();
        let svc = Arc::new(BookService::new(store.clone(), UpdatePolicy::Merge));

        let title = tokio::spawn({
            let svc = svc.clone();
            async move { svc.update("1", &json!({"title": "T2"})).await }
        });
        let author = tokio::spawn({
            let svc = svc.clone();
            async move { svc.update("1", &json!({"author": "A2"})).await }
        });
        title.await.unwrap().unwrap();
        author.await.unwrap().unwrap();

        let stored = store.inner.find_by_id("1").await.unwrap().unwrap();
        assert_eq!(stored.title, "T2");
        assert_eq!(stored.author, "A2");
    }

    #[tokio::test]
    async fn delete_is_not_idempotent() {
        let svc = service(UpdatePolicy::Replace);
        svc.create(&sample_payload("1")).await.unwrap();

        svc.delete("1").await.unwrap();
        assert!(matches!(svc.delete("1").await, Err(BookError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_tracks_creates_and_deletes() {
        let svc = service(UpdatePolicy::Replace);
        svc.create(&sample_payload("b")).await.unwrap();
        svc.create(&sample_payload("a")).await.unwrap();
        let before = svc.list().await.unwrap().len();

        svc.create(&sample_payload("c")).await.unwrap();
        assert_eq!(svc.list().await.unwrap().len(), before + 1);
        svc.delete("c").await.unwrap();

        let isbns: Vec<_> = svc.list().await.unwrap().into_iter().map(|b| b.isbn).collect();
        assert_eq!(isbns, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn storage_failures_propagate() {
        let store = Arc::new(CountingStore::default());
        let svc = BookService::new(store.clone(), UpdatePolicy::Replace);

        assert!(matches!(svc.list().await, Err(BookError::Storage(_))));
        assert!(matches!(
            svc.create(&sample_payload("1")).await,
            Err(BookError::Storage(_))
        ));
        assert!(matches!(svc.delete("1").await, Err(BookError::Storage(_))));
        assert_eq!(store.calls.load(Ordering::SeqCst), 3);
    }
}
