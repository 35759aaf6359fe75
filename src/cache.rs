//! SQLite-backed local cache: the single map slot, persisted node inputs,
//! and the key-value settings table.
//!
//! The map slot is last-write-wins and holds at most one record. Freshness
//! is evaluated at read time only; an expired record is evicted by the read
//! that discovers it. Node inputs and settings live independently of map
//! freshness so user-entered labels and hints survive regenerations.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

use crate::types::{GeneratedMap, NodeInput, UserPreferences};

/// Default freshness window for the cached map.
pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

const PREFERENCES_KEY: &str = "preferences";
const ONBOARDING_KEY: &str = "onboarding_complete";

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache lock poisoned")]
    Poisoned,
    #[error("task join error: {0}")]
    Join(String),
    #[error("serialization error: {0}")]
    Serde(String),
}

/// Local cache operations shared by the engine's callers.
#[async_trait]
pub trait MapCache: Send + Sync {
    /// Replace the cached map. Any previous record is discarded.
    async fn store_map(&self, map: &GeneratedMap) -> Result<(), CacheError>;
    /// Return the cached map if present and fresh; evicts an expired record.
    async fn load_map(&self) -> Result<Option<GeneratedMap>, CacheError>;
    /// Replace the persisted node-input list.
    async fn store_node_inputs(&self, inputs: &[NodeInput]) -> Result<(), CacheError>;
    /// Return persisted node inputs in their stored order.
    async fn load_node_inputs(&self) -> Result<Vec<NodeInput>, CacheError>;
    /// Erase maps, node inputs, and settings in one transaction.
    async fn clear_all(&self) -> Result<(), CacheError>;
}

#[derive(Clone)]
pub struct SqliteMapStore {
    path: PathBuf,
    conn: Arc<Mutex<Connection>>,
    freshness_window: Duration,
}

impl SqliteMapStore {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(&path)?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;\
             PRAGMA synchronous=NORMAL;\
             CREATE TABLE IF NOT EXISTS map_cache (\
               slot INTEGER PRIMARY KEY CHECK (slot = 0),\
               payload TEXT NOT NULL,\
               cached_at INTEGER NOT NULL\
             );\
             CREATE TABLE IF NOT EXISTS node_inputs (\
               ordinal INTEGER PRIMARY KEY,\
               node_id TEXT NOT NULL UNIQUE,\
               label TEXT NOT NULL,\
               custom_label TEXT,\
               user_hint TEXT\
             );\
             CREATE TABLE IF NOT EXISTS settings (\
               key TEXT PRIMARY KEY,\
               value TEXT NOT NULL\
             );",
        )?;

        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
            freshness_window: FRESHNESS_WINDOW,
        })
    }

    /// Override the freshness window (tests use short windows).
    pub fn with_freshness_window(mut self, window: Duration) -> Self {
        self.freshness_window = window;
        self
    }

    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("KOROMAP_DB_PATH") {
            return PathBuf::from(path);
        }
        PathBuf::from(".koromap.sqlite")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_conn<F, R>(&self, f: F) -> Result<R, CacheError>
    where
        F: FnOnce(&mut Connection) -> Result<R, CacheError>,
    {
        let mut guard = self.conn.lock().map_err(|_| CacheError::Poisoned)?;
        f(&mut guard)
    }

    async fn run_blocking<F, R>(&self, f: F) -> Result<R, CacheError>
    where
        F: FnOnce(&SqliteMapStore) -> Result<R, CacheError> + Send + 'static,
        R: Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| CacheError::Join(e.to_string()))?
    }

    /// True iff a fresh map is currently cached. Evicts like `load_map`.
    pub async fn is_fresh(&self) -> Result<bool, CacheError> {
        Ok(self.load_map().await?.is_some())
    }

    /// Stored preferences, or the defaults when none were saved or the
    /// stored value fails to parse.
    pub async fn load_preferences(&self) -> Result<UserPreferences, CacheError> {
        self.run_blocking(|store| {
            store.with_conn(|conn| {
                let raw = get_setting(conn, PREFERENCES_KEY)?;
                Ok(raw
                    .and_then(|v| serde_json::from_str(&v).ok())
                    .unwrap_or_default())
            })
        })
        .await
    }

    pub async fn store_preferences(&self, prefs: &UserPreferences) -> Result<(), CacheError> {
        let value =
            serde_json::to_string(prefs).map_err(|e| CacheError::Serde(e.to_string()))?;
        self.run_blocking(move |store| {
            store.with_conn(|conn| put_setting(conn, PREFERENCES_KEY, &value))
        })
        .await
    }

    pub async fn onboarding_complete(&self) -> Result<bool, CacheError> {
        self.run_blocking(|store| {
            store.with_conn(|conn| {
                Ok(get_setting(conn, ONBOARDING_KEY)?.as_deref() == Some("true"))
            })
        })
        .await
    }

    pub async fn set_onboarding_complete(&self, complete: bool) -> Result<(), CacheError> {
        self.run_blocking(move |store| {
            store.with_conn(|conn| {
                put_setting(conn, ONBOARDING_KEY, if complete { "true" } else { "false" })
            })
        })
        .await
    }
}

fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>, CacheError> {
    let value = conn
        .query_row(
            "SELECT value FROM settings WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(value)
}

fn put_setting(conn: &Connection, key: &str, value: &str) -> Result<(), CacheError> {
    conn.execute(
        "INSERT INTO settings (key, value) VALUES (?1, ?2)\
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

#[async_trait]
impl MapCache for SqliteMapStore {
    async fn store_map(&self, map: &GeneratedMap) -> Result<(), CacheError> {
        let payload =
            serde_json::to_string(map).map_err(|e| CacheError::Serde(e.to_string()))?;
        self.run_blocking(move |store| {
            store.with_conn(|conn| {
                conn.execute(
                    "INSERT INTO map_cache (slot, payload, cached_at) VALUES (0, ?1, ?2)\
                     ON CONFLICT(slot) DO UPDATE SET \
                        payload = excluded.payload,\
                        cached_at = excluded.cached_at",
                    params![payload, now_epoch_ms()],
                )?;
                Ok(())
            })
        })
        .await
    }

    async fn load_map(&self) -> Result<Option<GeneratedMap>, CacheError> {
        let window_ms = self.freshness_window.as_millis() as i64;
        self.run_blocking(move |store| {
            store.with_conn(|conn| {
                let row = conn
                    .query_row(
                        "SELECT payload, cached_at FROM map_cache WHERE slot = 0",
                        [],
                        |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
                    )
                    .optional()?;

                let (payload, cached_at) = match row {
                    Some(row) => row,
                    None => return Ok(None),
                };

                if now_epoch_ms().saturating_sub(cached_at) > window_ms {
                    debug!(cached_at, "evicting stale cached map");
                    conn.execute("DELETE FROM map_cache WHERE slot = 0", [])?;
                    return Ok(None);
                }

                let map = serde_json::from_str(&payload)
                    .map_err(|e| CacheError::Serde(e.to_string()))?;
                Ok(Some(map))
            })
        })
        .await
    }

    async fn store_node_inputs(&self, inputs: &[NodeInput]) -> Result<(), CacheError> {
        let inputs = inputs.to_vec();
        self.run_blocking(move |store| {
            store.with_conn(|conn| {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM node_inputs", [])?;
                for (ordinal, input) in inputs.iter().enumerate() {
                    tx.execute(
                        "INSERT INTO node_inputs\
                         (ordinal, node_id, label, custom_label, user_hint)\
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                        params![
                            ordinal as i64,
                            input.id,
                            input.label,
                            input.custom_label,
                            input.user_hint.map(|h| h.as_str()),
                        ],
                    )?;
                }
                tx.commit()?;
                Ok(())
            })
        })
        .await
    }

    async fn load_node_inputs(&self) -> Result<Vec<NodeInput>, CacheError> {
        self.run_blocking(|store| {
            store.with_conn(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT node_id, label, custom_label, user_hint \
                     FROM node_inputs ORDER BY ordinal",
                )?;
                let mut rows = stmt.query([])?;
                let mut inputs = Vec::new();
                while let Some(row) = rows.next()? {
                    inputs.push(NodeInput {
                        id: row.get(0)?,
                        label: row.get(1)?,
                        custom_label: row.get(2)?,
                        user_hint: row
                            .get::<_, Option<String>>(3)?
                            .as_deref()
                            .and_then(crate::types::DistanceBucket::from_str),
                    });
                }
                Ok(inputs)
            })
        })
        .await
    }

    async fn clear_all(&self) -> Result<(), CacheError> {
        self.run_blocking(|store| {
            store.with_conn(|conn| {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM map_cache", [])?;
                tx.execute("DELETE FROM node_inputs", [])?;
                tx.execute("DELETE FROM settings", [])?;
                tx.commit()?;
                Ok(())
            })
        })
        .await
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
