//! SQLite-backed key-value store.
//!
//! Mirrors an extension's local storage area: a handful of keys, each
//! holding one JSON document. Maps keyed by page URL are rewritten whole on
//! every save, so the latest write for a URL wins.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::schema::SCHEMA_SQL;
use crate::storage::Storage;
use crate::types::*;
use csslens_claude::{DesignTokens, StructureAnalysis};
use csslens_core::{normalize_page_url, Error, Result};

/// Key-value store over a single SQLite table.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the store.
    ///
    /// `db_dir` is the directory (e.g., `data/store/`). The file will be `db_dir/csslens.db`.
    pub fn open(db_dir: impl AsRef<Path>) -> Result<Self> {
        let db_dir = db_dir.as_ref();
        std::fs::create_dir_all(db_dir)?;
        let db_path = db_dir.join("csslens.db");

        let conn = Connection::open(&db_path).map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        Self::init_schema(&conn)?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        info!(
            "SqliteStore initialized: {} keys, path={}",
            store.count_keys()?,
            db_dir.display()
        );
        Ok(store)
    }

    /// In-memory store, lost on drop.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::Database(e.to_string()))?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))
    }

    pub fn count_keys(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(count as usize)
    }

    // ---------------------------------------------------------------
    // Raw key access
    // ---------------------------------------------------------------

    fn read_raw(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.prepare_cached("SELECT value FROM kv WHERE key = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![key], |row| row.get(0))
            .optional()
            .map_err(|e| Error::Database(e.to_string()))
    }

    fn write_raw(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.prepare_cached(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![key, value, now_millis()])
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    /// Read and decode the JSON document under `key`.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let conn = self.conn.lock();
        match Self::read_raw(&conn, key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Encode `value` as JSON and store it under `key`.
    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        let conn = self.conn.lock();
        Self::write_raw(&conn, key, &raw)
    }

    /// Remove `key`. Returns whether it existed.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let n = conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(n > 0)
    }

    /// Read-modify-write of the document under `key` while holding the connection.
    fn update_json<T, R>(&self, key: &str, f: impl FnOnce(&mut T) -> R) -> Result<R>
    where
        T: DeserializeOwned + Serialize + Default,
    {
        let conn = self.conn.lock();
        let mut doc: T = match Self::read_raw(&conn, key)? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => T::default(),
        };
        let out = f(&mut doc);
        Self::write_raw(&conn, key, &serde_json::to_string(&doc)?)?;
        Ok(out)
    }
}

impl Storage for SqliteStore {
    fn api_key(&self) -> Result<Option<String>> {
        Ok(self
            .get_json::<String>(keys::API_KEY)?
            .filter(|k| !k.trim().is_empty()))
    }

    fn set_api_key(&self, key: &str) -> Result<()> {
        self.set_json(keys::API_KEY, &key.trim())?;
        info!("API key updated");
        Ok(())
    }

    fn clear_api_key(&self) -> Result<bool> {
        self.remove(keys::API_KEY)
    }

    fn save_design(&self, url: &str, tokens: &DesignTokens) -> Result<SavedDesign> {
        let url = normalize_page_url(url);
        let saved = SavedDesign {
            tokens: tokens.clone(),
            saved_at: now_millis(),
        };
        self.update_json::<DesignMap, _>(keys::DESIGNS, |designs| {
            designs.insert(url.clone(), saved.clone());
        })?;
        debug!("Saved design for {}", url);
        Ok(saved)
    }

    fn design(&self, url: &str) -> Result<Option<SavedDesign>> {
        let mut designs = self.designs()?;
        Ok(designs.remove(&normalize_page_url(url)))
    }

    fn designs(&self) -> Result<DesignMap> {
        Ok(self.get_json(keys::DESIGNS)?.unwrap_or_default())
    }

    fn save_structure(&self, url: &str, structure: &StructureAnalysis) -> Result<SavedStructure> {
        let url = normalize_page_url(url);
        let saved = SavedStructure {
            structure: structure.clone(),
            saved_at: now_millis(),
        };
        self.update_json::<StructureMap, _>(keys::STRUCTURES, |structures| {
            structures.insert(url.clone(), saved.clone());
        })?;
        debug!("Saved structure analysis for {}", url);
        Ok(saved)
    }

    fn structure(&self, url: &str) -> Result<Option<SavedStructure>> {
        let mut structures = self.structures()?;
        Ok(structures.remove(&normalize_page_url(url)))
    }

    fn structures(&self) -> Result<StructureMap> {
        Ok(self.get_json(keys::STRUCTURES)?.unwrap_or_default())
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (SqliteStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn tokens(primary: &str) -> DesignTokens {
        let mut tokens = DesignTokens::default();
        tokens.colors.primary = Some(primary.to_string());
        tokens
    }

    #[test]
    fn test_api_key_roundtrip() {
        let (store, _dir) = test_store();
        assert!(store.api_key().unwrap().is_none());

        store.set_api_key(" sk-ant-test ").unwrap();
        assert_eq!(store.api_key().unwrap().as_deref(), Some("sk-ant-test"));

        assert!(store.clear_api_key().unwrap());
        assert!(store.api_key().unwrap().is_none());
    }

    #[test]
    fn test_blank_api_key_is_absent() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set_api_key("   ").unwrap();
        assert!(store.api_key().unwrap().is_none());
    }

    #[test]
    fn test_latest_design_wins() {
        let (store, _dir) = test_store();
        store.save_design("https://example.com/", &tokens("#111")).unwrap();
        store.save_design("https://example.com/", &tokens("#222")).unwrap();

        let designs = store.designs().unwrap();
        assert_eq!(designs.len(), 1);
        let saved = store.design("https://example.com/").unwrap().unwrap();
        assert_eq!(saved.tokens.colors.primary.as_deref(), Some("#222"));
    }

    #[test]
    fn test_design_keyed_by_normalized_url() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.save_design("https://example.com/docs#top", &tokens("#111")).unwrap();

        assert!(store.design("https://example.com/docs").unwrap().is_some());
        assert!(store.designs().unwrap().contains_key("https://example.com/docs"));
    }

    #[test]
    fn test_structures_separate_keyspace() {
        let store = SqliteStore::open_in_memory().unwrap();
        let analysis = StructureAnalysis {
            components: vec!["card".into()],
            layout: Some("grid".into()),
            ..Default::default()
        };
        store.save_structure("https://example.com/", &analysis).unwrap();

        assert!(store.designs().unwrap().is_empty());
        let saved = store.structure("https://example.com/").unwrap().unwrap();
        assert_eq!(saved.structure, analysis);
        assert!(saved.saved_at > 0);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = SqliteStore::open(dir.path()).unwrap();
            store.set_api_key("sk-ant-persist").unwrap();
            store.save_design("https://example.com/", &tokens("#333")).unwrap();
        }
        let store = SqliteStore::open(dir.path()).unwrap();
        assert_eq!(store.api_key().unwrap().as_deref(), Some("sk-ant-persist"));
        assert_eq!(store.count_keys().unwrap(), 2);
    }

    #[test]
    fn test_open_over_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("store");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = SqliteStore::open(&blocker).err().unwrap();
        assert!(matches!(err, Error::Io(_)));
    }
}
