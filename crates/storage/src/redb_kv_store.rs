// Path: crates/storage/src/redb_kv_store.rs

use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;
use tmpop_api::storage::KeyValueStore;
use tmpop_types::error::StoreError;

/// Single table; keys are opaque application keys such as `tmpop:last-block`.
const VALUES: TableDefinition<&[u8], &[u8]> = TableDefinition::new("VALUES");

fn backend<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// A durable `KeyValueStore` backed by a redb database file.
///
/// Every `set_value` and `delete_value` runs in its own write transaction and
/// is durable once it returns.
#[derive(Clone)]
pub struct RedbKvStore {
    db: Arc<Database>,
}

impl RedbKvStore {
    /// Opens the database at `path`, creating it and its table if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = Database::create(path.as_ref()).map_err(backend)?;

        // Ensure the table exists so reads never hit a missing table.
        {
            let w = db.begin_write().map_err(backend)?;
            w.open_table(VALUES).map_err(backend)?;
            w.commit().map_err(backend)?;
        }

        tracing::info!(target: "storage", path = %path.as_ref().display(), "opened redb key/value store");
        Ok(Self { db: Arc::new(db) })
    }
}

impl KeyValueStore for RedbKvStore {
    fn get_value(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let r = self.db.begin_read().map_err(backend)?;
        let t = r.open_table(VALUES).map_err(backend)?;
        let value = t.get(key).map_err(backend)?.map(|v| v.value().to_vec());
        Ok(value)
    }

    fn set_value(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let w = self.db.begin_write().map_err(backend)?;
        {
            let mut t = w.open_table(VALUES).map_err(backend)?;
            t.insert(key, value).map_err(backend)?;
        }
        w.commit().map_err(backend)
    }

    fn delete_value(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let w = self.db.begin_write().map_err(backend)?;
        let previous = {
            let mut t = w.open_table(VALUES).map_err(backend)?;
            let removed = t.remove(key).map_err(backend)?;
            removed.map(|v| v.value().to_vec())
        };
        w.commit().map_err(backend)?;
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tmpop.redb");
        {
            let store = RedbKvStore::open(&path).unwrap();
            store.set_value(b"a", b"1").unwrap();
            store.set_value(b"b", b"2").unwrap();
            assert_eq!(store.delete_value(b"b").unwrap(), Some(b"2".to_vec()));
        }
        let store = RedbKvStore::open(&path).unwrap();
        assert_eq!(store.get_value(b"a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.get_value(b"b").unwrap(), None);
        assert_eq!(store.delete_value(b"missing").unwrap(), None);
    }
}
