//! Database initialization and the alias storage contract
//!
//! This module handles the setup of the embedded redb database and
//! implements the three alias-keyed operations the handlers rely on.

use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::sync::Arc;

use crate::alias::AliasGenerator;
use crate::error::{Result, StorageError};
use crate::model::UrlRecord;

/// Main table for storing URL mappings
///
/// Key: alias as string
/// Value: JSON-serialized UrlRecord as string
///
/// Example:
/// - Key: "abc123"
/// - Value: '{"id":1,"alias":"abc123","url":"https://example.com",...}'
///
/// redb keys are unique, so the key doubles as the alias index and as the
/// uniqueness constraint.
pub const TABLE_URLS: TableDefinition<&str, &str> = TableDefinition::new("urls_v1");

/// Sequence table used to assign mapping ids
///
/// The counter only ever grows, so ids of deleted mappings are never handed out again.
pub const TABLE_SEQ: TableDefinition<&str, u64> = TableDefinition::new("url_seq_v1");

const URL_SEQ_KEY: &str = "urls";

/// Persistence contract between the HTTP layer and a storage backend
///
/// All operations are keyed by alias and run as a single transaction each.
pub trait Storage: Send + Sync {
    /// Inserts a new mapping and returns its id
    ///
    /// Fails with [`StorageError::AliasExists`] when the alias is taken.
    fn save_url(&self, target_url: &str, alias: &str) -> Result<u64>;

    /// Resolves an alias to its target URL
    fn get_url(&self, alias: &str) -> Result<String>;

    /// Removes the mapping for an alias
    fn delete_url(&self, alias: &str) -> Result<()>;
}

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    /// Alias source for save requests that do not bring their own
    pub generator: Arc<AliasGenerator>,
}

/// Initializes the embedded database and creates required tables
///
/// Safe to run on every start: opening a table that already exists is a no-op.
///
/// # Example
///
/// ```no_run
/// # use short_url::database::init_db;
/// let db = init_db("data.db").expect("Failed to initialize database");
/// ```
pub fn init_db(db_path: &str) -> Result<Database> {
    const OP: &str = "storage.init_db";

    let db = Database::create(db_path).map_err(StorageError::unavailable(OP))?;

    let write_txn = db.begin_write().map_err(StorageError::unavailable(OP))?;
    {
        write_txn
            .open_table(TABLE_URLS)
            .map_err(StorageError::unavailable(OP))?;
        write_txn
            .open_table(TABLE_SEQ)
            .map_err(StorageError::unavailable(OP))?;
    }
    write_txn.commit().map_err(StorageError::unavailable(OP))?;

    Ok(db)
}

/// [`Storage`] backed by a redb database file
pub struct RedbStorage {
    db: Database,
}

impl RedbStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Opens (or creates) the database at `db_path` with all tables in place
    pub fn open(db_path: &str) -> Result<Self> {
        init_db(db_path).map(Self::new)
    }
}

impl Storage for RedbStorage {
    fn save_url(&self, target_url: &str, alias: &str) -> Result<u64> {
        const OP: &str = "storage.save_url";

        // redb serializes write transactions, so the insert below sees every
        // committed alias and no other writer can slip in between.
        let write_txn = self.db.begin_write().map_err(StorageError::unavailable(OP))?;
        let saved = {
            let mut urls = write_txn
                .open_table(TABLE_URLS)
                .map_err(StorageError::unavailable(OP))?;
            let mut seq = write_txn
                .open_table(TABLE_SEQ)
                .map_err(StorageError::unavailable(OP))?;

            let id = seq
                .get(URL_SEQ_KEY)
                .map_err(StorageError::unavailable(OP))?
                .map(|guard| guard.value())
                .unwrap_or(0)
                + 1;

            let record = UrlRecord {
                id,
                alias: alias.to_string(),
                url: target_url.to_string(),
                created_at: Utc::now(),
            };
            let record_json = serde_json::to_string(&record).map_err(StorageError::unavailable(OP))?;

            let displaced = urls
                .insert(alias, record_json.as_str())
                .map_err(StorageError::unavailable(OP))?;

            if displaced.is_some() {
                None
            } else {
                seq.insert(URL_SEQ_KEY, id)
                    .map_err(StorageError::unavailable(OP))?;
                Some(id)
            }
        };

        match saved {
            Some(id) => {
                write_txn.commit().map_err(StorageError::unavailable(OP))?;
                Ok(id)
            }
            None => {
                // Roll back so the displaced mapping stays as it was
                write_txn.abort().map_err(StorageError::unavailable(OP))?;
                Err(StorageError::AliasExists)
            }
        }
    }

    fn get_url(&self, alias: &str) -> Result<String> {
        const OP: &str = "storage.get_url";

        let read_txn = self.db.begin_read().map_err(StorageError::unavailable(OP))?;
        let urls = read_txn
            .open_table(TABLE_URLS)
            .map_err(StorageError::unavailable(OP))?;

        let value = urls
            .get(alias)
            .map_err(StorageError::unavailable(OP))?
            .ok_or(StorageError::AliasNotFound)?;

        let record: UrlRecord =
            serde_json::from_str(value.value()).map_err(StorageError::unavailable(OP))?;

        Ok(record.url)
    }

    fn delete_url(&self, alias: &str) -> Result<()> {
        const OP: &str = "storage.delete_url";

        let write_txn = self.db.begin_write().map_err(StorageError::unavailable(OP))?;
        let removed = {
            let mut urls = write_txn
                .open_table(TABLE_URLS)
                .map_err(StorageError::unavailable(OP))?;
            let removed = urls
                .remove(alias)
                .map_err(StorageError::unavailable(OP))?
                .is_some();
            removed
        };

        if !removed {
            write_txn.abort().map_err(StorageError::unavailable(OP))?;
            return Err(StorageError::AliasNotFound);
        }

        write_txn.commit().map_err(StorageError::unavailable(OP))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn temp_storage() -> (RedbStorage, NamedTempFile) {
        let temp_db = NamedTempFile::new().unwrap();
        let storage = RedbStorage::open(temp_db.path().to_str().unwrap()).unwrap();
        (storage, temp_db)
    }

    #[test]
    fn save_then_get_round_trips() {
        let (storage, _temp_db) = temp_storage();

        let url = "https://example.com/some/long/path?q=1#frag";
        storage.save_url(url, "abc123").unwrap();

        assert_eq!(storage.get_url("abc123").unwrap(), url);
    }

    #[test]
    fn get_missing_alias_is_not_found() {
        let (storage, _temp_db) = temp_storage();

        assert!(matches!(storage.get_url("nope"), Err(StorageError::AliasNotFound)));
    }

    #[test]
    fn duplicate_alias_keeps_first_mapping() {
        let (storage, _temp_db) = temp_storage();

        storage.save_url("https://example.com/first", "dup").unwrap();
        let second = storage.save_url("https://example.com/second", "dup");

        assert!(matches!(second, Err(StorageError::AliasExists)));
        assert_eq!(storage.get_url("dup").unwrap(), "https://example.com/first");
    }

    #[test]
    fn delete_twice_reports_not_found() {
        let (storage, _temp_db) = temp_storage();

        storage.save_url("https://example.com", "gone").unwrap();

        assert!(storage.delete_url("gone").is_ok());
        assert!(matches!(storage.delete_url("gone"), Err(StorageError::AliasNotFound)));
        assert!(matches!(storage.get_url("gone"), Err(StorageError::AliasNotFound)));
    }

    #[test]
    fn delete_missing_alias_is_not_found() {
        let (storage, _temp_db) = temp_storage();

        assert!(matches!(storage.delete_url("never"), Err(StorageError::AliasNotFound)));
    }

    #[test]
    fn ids_increase_and_are_not_reused() {
        let (storage, _temp_db) = temp_storage();

        let first = storage.save_url("https://example.com/1", "one").unwrap();
        let second = storage.save_url("https://example.com/2", "two").unwrap();
        assert!(second > first);

        // A rejected insert must not burn or reuse an id
        storage.save_url("https://example.com/x", "two").unwrap_err();

        storage.delete_url("two").unwrap();
        let third = storage.save_url("https://example.com/3", "two").unwrap();
        assert_eq!(third, second + 1);
    }

    #[test]
    fn deleted_alias_can_be_reused() {
        let (storage, _temp_db) = temp_storage();

        storage.save_url("https://example.com/old", "reuse").unwrap();
        storage.delete_url("reuse").unwrap();
        storage.save_url("https://example.com/new", "reuse").unwrap();

        assert_eq!(storage.get_url("reuse").unwrap(), "https://example.com/new");
    }

    #[test]
    fn init_db_is_idempotent() {
        let temp_db = NamedTempFile::new().unwrap();
        let path = temp_db.path().to_str().unwrap();

        {
            let storage = RedbStorage::open(path).unwrap();
            storage.save_url("https://example.com", "kept").unwrap();
        }

        let storage = RedbStorage::open(path).unwrap();
        assert_eq!(storage.get_url("kept").unwrap(), "https://example.com");
    }
}
