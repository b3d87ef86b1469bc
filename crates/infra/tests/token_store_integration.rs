//! Integration tests for `SqliteTokenStore` persistence
//!
//! **Infrastructure:** real SQLite file in a tempdir, reopened between steps.

use std::sync::Arc;

use amocrm_core::TokenStore;
use amocrm_domain::{AmoError, AuthorizationRecord, StorageConfig};
use amocrm_infra::SqliteTokenStore;
use chrono::{Duration, SubsecRound, Utc};
use tempfile::TempDir;

#[tokio::test]
async fn records_survive_reopening_the_database() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let config =
        StorageConfig { path: dir.path().join("tokens.db").display().to_string(), pool_size: 2 };
    let expires_at = (Utc::now() + Duration::days(1)).trunc_subsecs(0);

    {
        let store = SqliteTokenStore::from_config(&config)?;
        store.create(&AuthorizationRecord::new("crm-sync", "refresh-1", expires_at)).await?;
    }

    let store = SqliteTokenStore::from_config(&config)?;
    let record = store.get("crm-sync").await?.expect("record should persist");
    assert_eq!(record.refresh_token, "refresh-1");
    assert_eq!(record.expires_at, expires_at);

    let err = store
        .create(&AuthorizationRecord::new("crm-sync", "refresh-x", expires_at))
        .await
        .unwrap_err();
    assert!(matches!(err, AmoError::Storage(_)));
    Ok(())
}

#[tokio::test]
async fn concurrent_upserts_keep_one_row_per_app() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let store = Arc::new(SqliteTokenStore::open(dir.path().join("tokens.db"), 4)?);

    let writes = (0..8).map(|n| {
        let store = Arc::clone(&store);
        async move { store.upsert("crm-sync", &format!("refresh-{n}"), Utc::now()).await }
    });
    for result in futures::future::join_all(writes).await {
        result?;
    }

    let record = store.get("crm-sync").await?.expect("record should exist");
    assert!(record.refresh_token.starts_with("refresh-"));
    assert!(store.get("other-app").await?.is_none());
    Ok(())
}
