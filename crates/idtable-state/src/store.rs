//! StateTable — redb-backed persistence for the `UserIdentity` relation.
//!
//! Provides the four table operations: `define_schema`, guarded `insert`,
//! upserting `replace` and point `get`. Values are JSON-serialized
//! [`UserRecord`]s in redb's `&[u8]` value column. The store supports both
//! on-disk and in-memory backends (the latter for testing).

use std::path::Path;
use std::sync::Arc;

use redb::{
    Database, ReadOnlyTable, ReadTransaction, ReadableDatabase, ReadableTable, TableDefinition,
    TableError, WriteTransaction,
};
use tracing::{debug, info};

use crate::error::{StateError, StateResult};
use crate::tables::*;
use crate::types::*;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Thread-safe handle to the `UserIdentity` table.
#[derive(Clone)]
pub struct StateTable {
    db: Arc<Database>,
}

impl StateTable {
    /// Open (or create) a persistent store at the given path.
    ///
    /// Opening never defines the schema; a fresh file is uninitialized
    /// until [`StateTable::define_schema`] runs.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        debug!(?path, "state table opened");
        Ok(Self { db: Arc::new(db) })
    }

    /// Create an ephemeral in-memory store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        debug!("in-memory state table opened");
        Ok(Self { db: Arc::new(db) })
    }

    /// Release this handle. The database closes once every clone is gone.
    pub fn close(self) {
        let others = Arc::strong_count(&self.db) - 1;
        drop(self.db);
        info!(others, "state table closed");
    }

    // ── Schema ─────────────────────────────────────────────────────

    /// Create the `UserIdentity` relation and record its descriptor.
    ///
    /// Fails with [`StateError::Schema`] if the relation already exists.
    pub fn define_schema(&self) -> StateResult<SchemaDescriptor> {
        let schema = SchemaDescriptor::user_identity();
        let value = serde_json::to_vec(&schema).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut meta = txn.open_table(SCHEMA_META).map_err(map_err!(Schema))?;
            let exists = meta
                .get(USER_IDENTITY_NAME)
                .map_err(map_err!(Read))?
                .is_some();
            if exists {
                return Err(StateError::Schema(format!(
                    "relation {USER_IDENTITY_NAME} already exists"
                )));
            }
            meta.insert(USER_IDENTITY_NAME, value.as_slice())
                .map_err(map_err!(Schema))?;
        }
        // Opening a table in a write transaction creates it.
        txn.open_table(USER_IDENTITY).map_err(map_err!(Schema))?;
        txn.commit().map_err(map_err!(Transaction))?;
        info!(relation = USER_IDENTITY_NAME, "schema defined");
        Ok(schema)
    }

    /// The descriptor written by `define_schema`.
    pub fn schema(&self) -> StateResult<SchemaDescriptor> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let meta = open_existing(&txn, SCHEMA_META)?.ok_or(StateError::Uninitialized)?;
        match meta.get(USER_IDENTITY_NAME).map_err(map_err!(Read))? {
            Some(guard) => serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize)),
            None => Err(StateError::Uninitialized),
        }
    }

    /// Whether `define_schema` has run on this store.
    pub fn is_defined(&self) -> StateResult<bool> {
        match self.schema() {
            Ok(_) => Ok(true),
            Err(StateError::Uninitialized) => Ok(false),
            Err(e) => Err(e),
        }
    }

    // ── Records ────────────────────────────────────────────────────

    /// Insert a record only if `user` is absent.
    ///
    /// The check and the insert share one write transaction, so concurrent
    /// inserts of the same key produce exactly one success.
    pub fn insert(&self, user: &str, status: &str) -> StateResult<()> {
        let value = encode_record(user, status)?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        require_schema(&txn)?;
        {
            let mut table = txn.open_table(USER_IDENTITY).map_err(map_err!(Table))?;
            let exists = table.get(user).map_err(map_err!(Read))?.is_some();
            if exists {
                return Err(StateError::DuplicateKey(user.to_string()));
            }
            table
                .insert(user, value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%user, "record inserted");
        Ok(())
    }

    /// Remove any record for `user` and insert `(user, status)`.
    ///
    /// Both steps run in one write transaction: either the new record is
    /// committed or the previous one is left untouched. Returns true if a
    /// record existed before.
    pub fn replace(&self, user: &str, status: &str) -> StateResult<bool> {
        let value = encode_record(user, status)?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        require_schema(&txn)?;
        let existed;
        {
            let mut table = txn.open_table(USER_IDENTITY).map_err(map_err!(Table))?;
            existed = table.remove(user).map_err(map_err!(Write))?.is_some();
            table
                .insert(user, value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%user, existed, "record replaced");
        Ok(existed)
    }

    /// Point lookup of the status stored for `user`.
    pub fn get(&self, user: &str) -> StateResult<String> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = open_existing(&txn, USER_IDENTITY)?.ok_or(StateError::Uninitialized)?;
        match table.get(user).map_err(map_err!(Read))? {
            Some(guard) => {
                let record: UserRecord =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(record.status)
            }
            None => Err(StateError::NotFound(user.to_string())),
        }
    }
}

fn encode_record(user: &str, status: &str) -> StateResult<Vec<u8>> {
    if user.is_empty() {
        return Err(StateError::InvalidKey);
    }
    serde_json::to_vec(&UserRecord::new(user, status)).map_err(map_err!(Serialize))
}

/// Fail with `Uninitialized` unless the schema descriptor is present.
///
/// Nothing opened here outlives the call, so an aborted transaction leaves
/// no trace of the metadata table.
fn require_schema(txn: &WriteTransaction) -> StateResult<()> {
    let meta = txn.open_table(SCHEMA_META).map_err(map_err!(Table))?;
    let defined = meta
        .get(USER_IDENTITY_NAME)
        .map_err(map_err!(Read))?
        .is_some();
    if defined {
        Ok(())
    } else {
        Err(StateError::Uninitialized)
    }
}

/// Open a table for reading, or `None` if it was never created.
fn open_existing<K, V>(
    txn: &ReadTransaction,
    definition: TableDefinition<'_, K, V>,
) -> StateResult<Option<ReadOnlyTable<K, V>>>
where
    K: redb::Key + 'static,
    V: redb::Value + 'static,
{
    match txn.open_table(definition) {
        Ok(table) => Ok(Some(table)),
        Err(TableError::TableDoesNotExist(_)) => Ok(None),
        Err(e) => Err(StateError::Table(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    fn defined_store() -> StateTable {
        let store = StateTable::open_in_memory().unwrap();
        store.define_schema().unwrap();
        store
    }

    // ── Schema ─────────────────────────────────────────────────────

    #[test]
    fn fresh_store_is_undefined() {
        let store = StateTable::open_in_memory().unwrap();
        assert!(!store.is_defined().unwrap());
        assert!(matches!(store.schema(), Err(StateError::Uninitialized)));
    }

    #[test]
    fn define_schema_records_descriptor() {
        let store = StateTable::open_in_memory().unwrap();
        let schema = store.define_schema().unwrap();

        assert!(store.is_defined().unwrap());
        assert_eq!(store.schema().unwrap(), schema);
        assert_eq!(schema, SchemaDescriptor::user_identity());
    }

    #[test]
    fn define_schema_twice_is_an_error() {
        let store = defined_store();
        let err = store.define_schema().unwrap_err();
        assert!(matches!(err, StateError::Schema(_)), "got {err:?}");
    }

    #[test]
    fn operations_before_schema_fail() {
        let store = StateTable::open_in_memory().unwrap();

        assert!(matches!(store.insert("alice", "true"), Err(StateError::Uninitialized)));
        assert!(matches!(store.replace("alice", "x"), Err(StateError::Uninitialized)));
        assert!(matches!(store.get("alice"), Err(StateError::Uninitialized)));
        // The failed writes must not have provisioned anything.
        assert!(!store.is_defined().unwrap());
        store.define_schema().unwrap();
    }

    // ── Insert ─────────────────────────────────────────────────────

    #[test]
    fn insert_and_get() {
        let store = defined_store();
        store.insert("alice", "true").unwrap();
        assert_eq!(store.get("alice").unwrap(), "true");
    }

    #[test]
    fn insert_duplicate_keeps_original() {
        let store = defined_store();
        store.insert("alice", "true").unwrap();

        let err = store.insert("alice", "other").unwrap_err();
        assert!(matches!(err, StateError::DuplicateKey(ref u) if u == "alice"));
        assert_eq!(store.get("alice").unwrap(), "true");
    }

    #[test]
    fn insert_empty_user_rejected() {
        let store = defined_store();
        assert!(matches!(store.insert("", "true"), Err(StateError::InvalidKey)));
        assert!(matches!(store.replace("", "x"), Err(StateError::InvalidKey)));
    }

    #[test]
    fn get_missing_is_not_found() {
        let store = defined_store();
        let err = store.get("nobody").unwrap_err();
        assert!(matches!(err, StateError::NotFound(ref u) if u == "nobody"));
    }

    // ── Replace ────────────────────────────────────────────────────

    #[test]
    fn replace_overwrites_existing() {
        let store = defined_store();
        store.insert("alice", "true").unwrap();

        assert!(store.replace("alice", "suspended").unwrap());
        assert_eq!(store.get("alice").unwrap(), "suspended");
    }

    #[test]
    fn replace_absent_key_upserts() {
        let store = defined_store();
        assert!(!store.replace("bob", "active").unwrap());
        assert_eq!(store.get("bob").unwrap(), "active");
    }

    #[test]
    fn insert_after_replace_is_still_guarded() {
        let store = defined_store();
        store.replace("carol", "active").unwrap();
        assert!(matches!(
            store.insert("carol", "true"),
            Err(StateError::DuplicateKey(_))
        ));
    }

    #[test]
    fn replace_leaves_other_keys_alone() {
        let store = defined_store();
        store.insert("alice", "true").unwrap();
        store.insert("bob", "true").unwrap();

        store.replace("alice", "gone").unwrap();
        assert_eq!(store.get("bob").unwrap(), "true");
    }

    // ── Concurrency ────────────────────────────────────────────────

    #[test]
    fn concurrent_inserts_single_winner() {
        let store = defined_store();
        let threads = 8;
        let barrier = Arc::new(Barrier::new(threads));

        let handles: Vec<_> = (0..threads)
            .map(|i| {
                let store = store.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    store.insert("dave", &format!("status-{i}"))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let wins = results.iter().filter(|r| r.is_ok()).count();
        let dups = results
            .iter()
            .filter(|r| matches!(r, Err(StateError::DuplicateKey(_))))
            .count();
        assert_eq!(wins, 1);
        assert_eq!(dups, threads - 1);
        assert!(store.get("dave").unwrap().starts_with("status-"));
    }

    #[test]
    fn concurrent_schema_definition_single_winner() {
        let store = StateTable::open_in_memory().unwrap();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || store.define_schema())
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|r| r.is_ok())
            .count();
        assert_eq!(wins, 1);
    }

    // ── Persistence (on-disk) ──────────────────────────────────────

    #[test]
    fn persistence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.redb");

        {
            let store = StateTable::open(&db_path).unwrap();
            store.define_schema().unwrap();
            store.insert("alice", "true").unwrap();
            store.replace("bob", "active").unwrap();
            store.close();
        }

        // Reopen the same database file.
        let store = StateTable::open(&db_path).unwrap();
        assert!(store.is_defined().unwrap());
        assert_eq!(store.get("alice").unwrap(), "true");
        assert_eq!(store.get("bob").unwrap(), "active");
        assert!(matches!(store.define_schema(), Err(StateError::Schema(_))));
    }
}
