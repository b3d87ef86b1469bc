//! Shared test helpers for `amocrm-core` integration tests.
//!
//! In-memory fakes for the core ports so that lifecycle and pagination tests
//! run without sockets or disk.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use amocrm_core::{
    ApiRequest, AuthManager, GrantClient, RenewalSettings, RequestExecutor, ResponseBody,
    TokenStore,
};
use amocrm_domain::{AmoError, AuthorizationRecord, GrantRequest, GrantType, Result, TokenGrant};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde_json::{json, Value};

pub const APP: &str = "test-app";

pub type TestManager = AuthManager<FakeGrantClient, FakeTokenStore>;

/// Token store backed by a `HashMap`, with call counters.
#[derive(Default)]
pub struct FakeTokenStore {
    records: Mutex<HashMap<String, AuthorizationRecord>>,
    failure: Mutex<Option<AmoError>>,
    pub creates: AtomicUsize,
    pub upserts: AtomicUsize,
}

impl FakeTokenStore {
    pub fn with_record(record: AuthorizationRecord) -> Self {
        let store = Self::default();
        store.records.lock().insert(record.app_name.clone(), record);
        store
    }

    pub fn record(&self, app_name: &str) -> Option<AuthorizationRecord> {
        self.records.lock().get(app_name).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn fail_with(&self, err: Option<AmoError>) {
        *self.failure.lock() = err;
    }

    fn check(&self) -> Result<()> {
        self.failure.lock().clone().map_or(Ok(()), Err)
    }
}

#[async_trait]
impl TokenStore for FakeTokenStore {
    async fn get(&self, app_name: &str) -> Result<Option<AuthorizationRecord>> {
        self.check()?;
        Ok(self.record(app_name))
    }

    async fn upsert(
        &self,
        app_name: &str,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        self.check()?;
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.records.lock().insert(
            app_name.to_owned(),
            AuthorizationRecord::new(app_name, refresh_token, expires_at),
        );
        Ok(())
    }

    async fn create(&self, record: &AuthorizationRecord) -> Result<()> {
        self.check()?;
        let mut records = self.records.lock();
        if records.contains_key(&record.app_name) {
            return Err(AmoError::Storage(format!("record '{}' already exists", record.app_name)));
        }
        self.creates.fetch_add(1, Ordering::SeqCst);
        records.insert(record.app_name.clone(), record.clone());
        Ok(())
    }
}

/// Token endpoint fake issuing `access-{n}` / `refresh-{n}` pairs.
pub struct FakeGrantClient {
    expires_in: AtomicI64,
    issued: AtomicUsize,
    pub code_grants: AtomicUsize,
    pub refresh_grants: AtomicUsize,
    failure: Mutex<Option<AmoError>>,
    delay: Mutex<Option<StdDuration>>,
    seen_refresh_tokens: Mutex<Vec<String>>,
}

impl Default for FakeGrantClient {
    fn default() -> Self {
        Self::with_expires_in(86_400)
    }
}

impl FakeGrantClient {
    pub fn with_expires_in(expires_in: i64) -> Self {
        Self {
            expires_in: AtomicI64::new(expires_in),
            issued: AtomicUsize::new(0),
            code_grants: AtomicUsize::new(0),
            refresh_grants: AtomicUsize::new(0),
            failure: Mutex::new(None),
            delay: Mutex::new(None),
            seen_refresh_tokens: Mutex::new(Vec::new()),
        }
    }

    pub fn set_expires_in(&self, expires_in: i64) {
        self.expires_in.store(expires_in, Ordering::SeqCst);
    }

    pub fn fail_with(&self, err: Option<AmoError>) {
        *self.failure.lock() = err;
    }

    pub fn set_delay(&self, delay: Option<StdDuration>) {
        *self.delay.lock() = delay;
    }

    pub fn code_grants(&self) -> usize {
        self.code_grants.load(Ordering::SeqCst)
    }

    pub fn refresh_grants(&self) -> usize {
        self.refresh_grants.load(Ordering::SeqCst)
    }

    pub fn total_grants(&self) -> usize {
        self.code_grants() + self.refresh_grants()
    }

    pub fn seen_refresh_tokens(&self) -> Vec<String> {
        self.seen_refresh_tokens.lock().clone()
    }
}

#[async_trait]
impl GrantClient for FakeGrantClient {
    async fn exchange(&self, request: &GrantRequest) -> Result<TokenGrant> {
        match request.grant_type() {
            GrantType::AuthorizationCode => self.code_grants.fetch_add(1, Ordering::SeqCst),
            GrantType::RefreshToken => self.refresh_grants.fetch_add(1, Ordering::SeqCst),
        };
        if let GrantRequest::RefreshToken { refresh_token } = request {
            self.seen_refresh_tokens.lock().push(refresh_token.clone());
        }

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.failure.lock().clone();
        if let Some(err) = failure {
            return Err(err);
        }

        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(TokenGrant {
            token_type: "Bearer".into(),
            expires_in: self.expires_in.load(Ordering::SeqCst),
            access_token: format!("access-{n}"),
            refresh_token: format!("refresh-{n}"),
        })
    }
}

pub fn settings() -> RenewalSettings {
    RenewalSettings {
        interval: StdDuration::from_secs(60),
        refresh_threshold: Duration::minutes(5),
        expiry_margin: Duration::minutes(1),
    }
}

pub fn manager(grant: &Arc<FakeGrantClient>, store: &Arc<FakeTokenStore>) -> Arc<TestManager> {
    Arc::new(AuthManager::new(Arc::clone(grant), Arc::clone(store), APP, settings()))
}

pub fn record_expiring_in(offset: Duration) -> AuthorizationRecord {
    AuthorizationRecord::new(APP, "stored-refresh", Utc::now() + offset)
}

/// Executor replaying scripted responses and recording every request.
#[derive(Default)]
pub struct FakeExecutor {
    responses: Mutex<VecDeque<Result<ResponseBody>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeExecutor {
    pub fn new(responses: impl IntoIterator<Item = Result<ResponseBody>>) -> Self {
        Self { responses: Mutex::new(responses.into_iter().collect()), requests: Mutex::default() }
    }

    pub fn pages(bodies: impl IntoIterator<Item = Value>) -> Self {
        Self::new(bodies.into_iter().map(|body| Ok(ResponseBody::Json(body.to_string()))))
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl RequestExecutor for FakeExecutor {
    async fn execute_raw(&self, request: &ApiRequest) -> Result<ResponseBody> {
        self.requests.lock().push(request.clone());
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(AmoError::Internal("no scripted response left".into())))
    }
}

/// A page of `{"id": n}` items under `_embedded.leads`.
pub fn leads_page(page: u32, ids: &[u64], next: Option<&str>) -> Value {
    let mut links = json!({ "self": { "href": format!("https://example.amocrm.ru/api/v4/leads?page={page}") } });
    if let Some(next) = next {
        links["next"] = json!({ "href": next });
    }
    json!({
        "_page": page,
        "_links": links,
        "_embedded": { "leads": ids.iter().map(|id| json!({ "id": id })).collect::<Vec<_>>() },
    })
}
