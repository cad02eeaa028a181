use std::collections::BTreeMap;

use tokio::sync::RwLock;

use crate::error::StorageError;

struct State<V> {
    rows: BTreeMap<String, V>,
    open: bool,
}

/// A table of rows of type `V` keyed by a unique string primary key.
///
/// Rows are kept in key order so scans are stable. Writes take the lock
/// exclusively, which makes each single-row write atomic with respect to
/// concurrent readers and writers.
pub struct Table<V> {
    name: String,
    state: RwLock<State<V>>,
}

impl<V: Clone> Table<V> {
    /// Open an empty table
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        tracing::debug!(target: "shelf-db", table = %name, "table opened");
        Self {
            name,
            state: RwLock::new(State {
                rows: BTreeMap::new(),
                open: true,
            }),
        }
    }

    fn closed(&self) -> StorageError {
        StorageError::Closed {
            table: self.name.clone(),
        }
    }

    /// Insert a new row, failing if the key is already taken
    pub async fn insert(&self, key: impl Into<String>, row: V) -> Result<V, StorageError> {
        let key = key.into();
        let mut state = self.state.write().await;
        if !state.open {
            return Err(self.closed());
        }
        if state.rows.contains_key(&key) {
            return Err(StorageError::Conflict {
                table: self.name.clone(),
                key,
            });
        }
        tracing::debug!(target: "shelf-db", table = %self.name, %key, "row inserted");
        state.rows.insert(key, row.clone());
        Ok(row)
    }

    /// All rows in key order
    pub async fn scan(&self) -> Result<Vec<V>, StorageError> {
        let state = self.state.read().await;
        if !state.open {
            return Err(self.closed());
        }
        Ok(state.rows.values().cloned().collect())
    }

    pub async fn get(&self, key: &str) -> Result<Option<V>, StorageError> {
        let state = self.state.read().await;
        if !state.open {
            return Err(self.closed());
        }
        Ok(state.rows.get(key).cloned())
    }

    /// Apply `apply` to the row under `key` and return the new row, or `None`
    /// if no such row exists. The key itself never changes.
    pub async fn update<F>(&self, key: &str, apply: F) -> Result<Option<V>, StorageError>
    where
        F: FnOnce(&mut V),
    {
        let mut state = self.state.write().await;
        if !state.open {
            return Err(self.closed());
        }
        let Some(row) = state.rows.get_mut(key) else {
            return Ok(None);
        };
        apply(row);
        tracing::debug!(target: "shelf-db", table = %self.name, key, "row updated");
        Ok(Some(row.clone()))
    }

    /// Delete the row under `key`; `false` if there was none
    pub async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let mut state = self.state.write().await;
        if !state.open {
            return Err(self.closed());
        }
        let removed = state.rows.remove(key).is_some();
        if removed {
            tracing::debug!(target: "shelf-db", table = %self.name, key, "row removed");
        }
        Ok(removed)
    }

    /// Drop all rows and refuse further access
    pub async fn close(&self) {
        let mut state = self.state.write().await;
        state.rows.clear();
        state.open = false;
        tracing::debug!(target: "shelf-db", table = %self.name, "table closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_enforces_unique_keys() {
        let table = Table::new("things");
        table.insert("a", 1).await.unwrap();

        let err = table.insert("a", 2).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(table.get("a").await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn scan_is_key_ordered() {
        let table = Table::new("things");
        for key in ["c", "a", "b"] {
            table.insert(key, key.to_uppercase()).await.unwrap();
        }
        assert_eq!(table.scan().await.unwrap(), vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn update_only_touches_existing_rows() {
        let table = Table::new("things");
        table.insert("a", 1).await.unwrap();

        assert_eq!(table.update("a", |v| *v += 10).await.unwrap(), Some(11));
        assert_eq!(table.update("missing", |v| *v += 10).await.unwrap(), None);
        assert_eq!(table.scan().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn remove_reports_whether_row_existed() {
        let table = Table::new("things");
        table.insert("a", 1).await.unwrap();

        assert!(table.remove("a").await.unwrap());
        assert!(!table.remove("a").await.unwrap());
        assert_eq!(table.scan().await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn closed_table_rejects_every_operation() {
        let table = Table::new("things");
        table.insert("a", 1).await.unwrap();
        table.close().await;

        let closed = StorageError::Closed {
            table: "things".to_string(),
        };
        assert_eq!(table.get("a").await.unwrap_err(), closed);
        assert_eq!(table.scan().await.unwrap_err(), closed);
        assert_eq!(table.insert("b", 2).await.unwrap_err(), closed);
        assert_eq!(table.remove("a").await.unwrap_err(), closed);
        assert_eq!(table.update("a", |v| *v += 1).await.unwrap_err(), closed);
    }
}
