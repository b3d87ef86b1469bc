//! In-memory token store for tests and short-lived processes

use std::collections::HashMap;

use amocrm_core::TokenStore;
use amocrm_domain::{AmoError, AuthorizationRecord, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

/// [`TokenStore`] that forgets everything when dropped
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    records: RwLock<HashMap<String, AuthorizationRecord>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `records`.
    pub fn with_records(records: impl IntoIterator<Item = AuthorizationRecord>) -> Self {
        let records = records.into_iter().map(|r| (r.app_name.clone(), r)).collect();
        Self { records: RwLock::new(records) }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, app_name: &str) -> Result<Option<AuthorizationRecord>> {
        Ok(self.records.read().get(app_name).cloned())
    }

    async fn upsert(
        &self,
        app_name: &str,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        self.records.write().insert(
            app_name.to_owned(),
            AuthorizationRecord::new(app_name, refresh_token, expires_at),
        );
        Ok(())
    }

    async fn create(&self, record: &AuthorizationRecord) -> Result<()> {
        let mut records = self.records.write();
        if records.contains_key(&record.app_name) {
            return Err(AmoError::Storage(format!(
                "authorization record '{}' already exists",
                record.app_name
            )));
        }
        records.insert(record.app_name.clone(), record.clone());
        Ok(())
    }
}
