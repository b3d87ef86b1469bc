//! SQLite-backed token store
//!
//! One row per integration in `authorization_records`. Connections come from
//! an r2d2 pool and every statement runs on the blocking thread pool.

use std::path::{Path, PathBuf};
use std::time::Duration;

use amocrm_core::TokenStore;
use amocrm_domain::{AmoError, AuthorizationRecord, Result, StorageConfig};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::task;
use tracing::{debug, info};

use crate::errors::into_domain;

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS authorization_records (
    app_name      TEXT PRIMARY KEY NOT NULL,
    refresh_token TEXT NOT NULL,
    expires_at    TEXT NOT NULL,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);
";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// [`TokenStore`] persisted in a SQLite file
#[derive(Debug, Clone)]
pub struct SqliteTokenStore {
    pool: Pool<SqliteConnectionManager>,
    path: PathBuf,
}

impl SqliteTokenStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    ///
    /// # Errors
    /// Returns `AmoError::Storage` if the file cannot be opened or the schema
    /// cannot be created.
    pub fn open(path: impl AsRef<Path>, pool_size: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let manager = SqliteConnectionManager::file(&path).with_init(|conn| {
            conn.busy_timeout(BUSY_TIMEOUT)?;
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                row.get::<_, String>(0)
            })?;
            Ok(())
        });

        let pool = Pool::builder().max_size(pool_size.max(1)).build(manager).map_err(into_domain)?;

        {
            let conn = pool.get().map_err(into_domain)?;
            conn.execute_batch(SCHEMA_SQL).map_err(into_domain)?;
        }

        info!(db_path = %path.display(), pool_size, "token store opened");
        Ok(Self { pool, path })
    }

    /// # Errors
    /// Same as [`Self::open`].
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        Self::open(&config.path, config.pool_size)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        task::spawn_blocking(move || {
            let conn = pool.get().map_err(into_domain)?;
            f(&conn)
        })
        .await
        .map_err(into_domain)?
    }
}

#[async_trait]
impl TokenStore for SqliteTokenStore {
    async fn get(&self, app_name: &str) -> Result<Option<AuthorizationRecord>> {
        let app_name = app_name.to_owned();
        self.with_connection(move |conn| {
            let row = conn
                .query_row(
                    "SELECT app_name, refresh_token, expires_at
                     FROM authorization_records WHERE app_name = ?1",
                    params![&app_name],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                        ))
                    },
                )
                .optional()
                .map_err(into_domain)?;

            row.map(|(app_name, refresh_token, expires_at)| {
                Ok(AuthorizationRecord::new(app_name, refresh_token, parse_timestamp(&expires_at)?))
            })
            .transpose()
        })
        .await
    }

    async fn upsert(
        &self,
        app_name: &str,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let app_name = app_name.to_owned();
        let refresh_token = refresh_token.to_owned();
        self.with_connection(move |conn| {
            let now = Utc::now().to_rfc3339();
            conn.execute(
                "INSERT INTO authorization_records
                     (app_name, refresh_token, expires_at, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)
                 ON CONFLICT(app_name) DO UPDATE SET
                     refresh_token = excluded.refresh_token,
                     expires_at = excluded.expires_at,
                     updated_at = excluded.updated_at",
                params![&app_name, &refresh_token, expires_at.to_rfc3339(), now],
            )
            .map_err(into_domain)?;
            debug!(app_name = %app_name, %expires_at, "authorization record upserted");
            Ok(())
        })
        .await
    }

    async fn create(&self, record: &AuthorizationRecord) -> Result<()> {
        let record = record.clone();
        self.with_connection(move |conn| {
            let now = Utc::now().to_rfc3339();
            conn.execute(
                "INSERT INTO authorization_records
                     (app_name, refresh_token, expires_at, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![&record.app_name, &record.refresh_token, record.expires_at.to_rfc3339(), now],
            )
            .map_err(|err| match into_domain(err) {
                AmoError::Storage(msg) if msg.contains("unique constraint") => AmoError::Storage(
                    format!("authorization record '{}' already exists", record.app_name),
                ),
                other => other,
            })?;
            debug!(app_name = %record.app_name, "authorization record created");
            Ok(())
        })
        .await
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| AmoError::Storage(format!("invalid stored timestamp '{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration as ChronoDuration, SubsecRound};
    use tempfile::TempDir;

    use super::*;

    fn store() -> (TempDir, SqliteTokenStore) {
        let dir = TempDir::new().unwrap();
        let store = SqliteTokenStore::open(dir.path().join("tokens.db"), 2).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn missing_record_is_none() {
        let (_dir, store) = store();
        assert!(store.get("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_then_get_round_trips_expiry() {
        let (_dir, store) = store();
        let expires_at = (Utc::now() + ChronoDuration::hours(1)).trunc_subsecs(6);
        store.create(&AuthorizationRecord::new("main", "r-1", expires_at)).await.unwrap();

        let record = store.get("main").await.unwrap().unwrap();
        assert_eq!(record.refresh_token, "r-1");
        assert_eq!(record.expires_at, expires_at);
    }

    #[tokio::test]
    async fn duplicate_create_is_a_storage_error() {
        let (_dir, store) = store();
        let record = AuthorizationRecord::new("main", "r-1", Utc::now());
        store.create(&record).await.unwrap();

        let err = store.create(&record).await.unwrap_err();
        assert!(matches!(err, AmoError::Storage(ref msg) if msg.contains("already exists")));
    }

    #[tokio::test]
    async fn upsert_overwrites_by_key() {
        let (_dir, store) = store();
        store.upsert("main", "r-1", Utc::now()).await.unwrap();
        store.upsert("main", "r-2", Utc::now()).await.unwrap();
        store.upsert("other", "x-1", Utc::now()).await.unwrap();

        assert_eq!(store.get("main").await.unwrap().unwrap().refresh_token, "r-2");
        assert_eq!(store.get("other").await.unwrap().unwrap().refresh_token, "x-1");
    }

    #[test]
    fn invalid_timestamps_are_storage_errors() {
        assert!(matches!(parse_timestamp("yesterday"), Err(AmoError::Storage(_))));
    }
}
