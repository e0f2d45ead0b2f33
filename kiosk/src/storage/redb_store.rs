//! redb-backed local store
//!
//! One table, `local_kv`: key → string value. Every `set` is its own
//! committed write transaction.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, TableDefinition};

use super::LocalStore;
use crate::error::LocalStoreError;

const KV_TABLE: TableDefinition<&str, &str> = TableDefinition::new("local_kv");

#[derive(Clone)]
pub struct RedbLocalStore {
    db: Arc<Database>,
}

impl std::fmt::Debug for RedbLocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbLocalStore").finish_non_exhaustive()
    }
}

impl RedbLocalStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LocalStoreError> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, LocalStoreError> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> Result<Self, LocalStoreError> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(KV_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }
}

impl LocalStore for RedbLocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(KV_TABLE)?;
        Ok(table.get(key)?.map(|guard| guard.value().to_string()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(KV_TABLE)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), LocalStoreError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(KV_TABLE)?;
            table.remove(key)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
