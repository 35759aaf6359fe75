//! SQLite-backed account/preference store.
//!
//! This is the collaborator the engine consults for per-user preferences.
//! `set` uses last-write-wins merge on individual fields: absent patch
//! fields keep their stored value, present fields overwrite it.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::{PreferencePatch, UserPreferences, ALLOWED_MAX_NODES};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("store lock poisoned")]
    Poisoned,
    #[error("task join error: {0}")]
    Join(String),
    #[error("serialization error: {0}")]
    Serde(String),
    #[error("invalid preference: {0}")]
    InvalidPreference(String),
}

/// One stored account row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub user_id: String,
    pub facebook_connected: bool,
    pub preferences: UserPreferences,
    pub created_at: i64,
    pub last_login_at: i64,
}

/// Per-user preference access with field-wise last-write-wins merge.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Stored preferences for a user, or `None` for an unknown user.
    async fn get(&self, user_id: &str) -> Result<Option<UserPreferences>, StoreError>;
    /// Merge a patch into the user's preferences (creating the account with
    /// defaults first if needed) and return the merged record.
    async fn set(&self, user_id: &str, patch: PreferencePatch)
        -> Result<UserPreferences, StoreError>;
}

#[derive(Clone)]
pub struct SqlitePreferenceStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePreferenceStore {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path: PathBuf = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(&path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;\
             PRAGMA synchronous=NORMAL;\
             CREATE TABLE IF NOT EXISTS accounts (\
               user_id TEXT PRIMARY KEY,\
               facebook_connected INTEGER NOT NULL DEFAULT 0,\
               preferences TEXT NOT NULL,\
               created_at INTEGER NOT NULL,\
               last_login_at INTEGER NOT NULL\
             );",
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn with_conn<F, R>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&Connection) -> Result<R, StoreError>,
    {
        let guard = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        f(&guard)
    }

    async fn run_blocking<F, R>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&SqlitePreferenceStore) -> Result<R, StoreError> + Send + 'static,
        R: Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| StoreError::Join(e.to_string()))?
    }

    /// Create an account with default preferences. No-op if it exists.
    pub async fn create_account(&self, user_id: &str) -> Result<AccountRecord, StoreError> {
        let user_id = user_id.to_string();
        self.run_blocking(move |store| {
            store.with_conn(|conn| {
                let now = now_epoch();
                let prefs = serde_json::to_string(&UserPreferences::default())
                    .map_err(|e| StoreError::Serde(e.to_string()))?;
                conn.execute(
                    "INSERT INTO accounts\
                     (user_id, facebook_connected, preferences, created_at, last_login_at)\
                     VALUES (?1, 0, ?2, ?3, ?3)\
                     ON CONFLICT(user_id) DO NOTHING",
                    params![user_id, prefs, now],
                )?;
                load_account(conn, &user_id)?.ok_or_else(|| {
                    StoreError::Serde("account row missing after insert".to_string())
                })
            })
        })
        .await
    }

    pub async fn account(&self, user_id: &str) -> Result<Option<AccountRecord>, StoreError> {
        let user_id = user_id.to_string();
        self.run_blocking(move |store| store.with_conn(|conn| load_account(conn, &user_id)))
            .await
    }

    /// Update `last_login_at` to now.
    pub async fn touch_login(&self, user_id: &str) -> Result<(), StoreError> {
        let user_id = user_id.to_string();
        self.run_blocking(move |store| {
            store.with_conn(|conn| {
                conn.execute(
                    "UPDATE accounts SET last_login_at = ?1 WHERE user_id = ?2",
                    params![now_epoch(), user_id],
                )?;
                Ok(())
            })
        })
        .await
    }

    pub async fn set_facebook_connected(
        &self,
        user_id: &str,
        connected: bool,
    ) -> Result<(), StoreError> {
        let user_id = user_id.to_string();
        self.run_blocking(move |store| {
            store.with_conn(|conn| {
                conn.execute(
                    "UPDATE accounts SET facebook_connected = ?1 WHERE user_id = ?2",
                    params![connected as i64, user_id],
                )?;
                Ok(())
            })
        })
        .await
    }
}

fn load_account(conn: &Connection, user_id: &str) -> Result<Option<AccountRecord>, StoreError> {
    let row = conn
        .query_row(
            "SELECT user_id, facebook_connected, preferences, created_at, last_login_at \
             FROM accounts WHERE user_id = ?1",
            params![user_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((user_id, connected, prefs, created_at, last_login_at)) => {
            let preferences = serde_json::from_str(&prefs)
                .map_err(|e| StoreError::Serde(e.to_string()))?;
            Ok(Some(AccountRecord {
                user_id,
                facebook_connected: connected != 0,
                preferences,
                created_at,
                last_login_at,
            }))
        }
        None => Ok(None),
    }
}

fn validate(patch: &PreferencePatch) -> Result<(), StoreError> {
    if let Some(max_nodes) = patch.max_nodes {
        if !ALLOWED_MAX_NODES.contains(&max_nodes) {
            return Err(StoreError::InvalidPreference(format!(
                "maxNodes must be one of {ALLOWED_MAX_NODES:?}, got {max_nodes}"
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl PreferenceStore for SqlitePreferenceStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserPreferences>, StoreError> {
        Ok(self.account(user_id).await?.map(|a| a.preferences))
    }

    async fn set(
        &self,
        user_id: &str,
        patch: PreferencePatch,
    ) -> Result<UserPreferences, StoreError> {
        validate(&patch)?;
        let user_id = user_id.to_string();
        self.run_blocking(move |store| {
            store.with_conn(|conn| {
                let current = load_account(conn, &user_id)?
                    .map(|a| a.preferences)
                    .unwrap_or_default();
                let merged = current.merged(patch);
                let prefs = serde_json::to_string(&merged)
                    .map_err(|e| StoreError::Serde(e.to_string()))?;
                let now = now_epoch();
                conn.execute(
                    "INSERT INTO accounts\
                     (user_id, facebook_connected, preferences, created_at, last_login_at)\
                     VALUES (?1, 0, ?2, ?3, ?3)\
                     ON CONFLICT(user_id) DO UPDATE SET preferences = excluded.preferences",
                    params![user_id, prefs, now],
                )?;
                Ok(merged)
            })
        })
        .await
    }
}

fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
