//! Grant state machine of `AuthManager`

mod support;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use amocrm_core::RenewalOutcome;
use amocrm_domain::{AmoError, AuthState};
use chrono::{Duration, Utc};
use support::{manager, record_expiring_in, FakeGrantClient, FakeTokenStore, APP};

fn assert_close(actual: chrono::DateTime<Utc>, expected: chrono::DateTime<Utc>) {
    let delta = (actual - expected).num_seconds().abs();
    assert!(delta <= 5, "expected {expected}, got {actual} (delta {delta}s)");
}

#[tokio::test]
async fn first_open_exchanges_code_and_creates_one_record() {
    let grant = Arc::new(FakeGrantClient::default());
    let store = Arc::new(FakeTokenStore::default());
    let auth = manager(&grant, &store);

    auth.open(Some("install-code")).await.unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(store.creates.load(Ordering::SeqCst), 1);
    assert_eq!(grant.code_grants(), 1);
    assert_eq!(grant.refresh_grants(), 0);

    let record = store.record(APP).unwrap();
    assert_eq!(record.refresh_token, "refresh-1");
    assert_close(record.expires_at, Utc::now() + Duration::seconds(86_400) - Duration::minutes(1));

    assert_eq!(auth.access_token().await.unwrap().as_str(), "access-1");
    assert_eq!(auth.state(), AuthState::Authorized);
    assert!(auth.health().is_healthy());
}

#[tokio::test]
async fn open_with_expired_record_refreshes_once_and_never_uses_code() {
    let grant = Arc::new(FakeGrantClient::default());
    let store = Arc::new(FakeTokenStore::with_record(record_expiring_in(Duration::hours(-2))));
    let auth = manager(&grant, &store);

    auth.open(Some("ignored-code")).await.unwrap();

    assert_eq!(grant.refresh_grants(), 1);
    assert_eq!(grant.code_grants(), 0);
    assert_eq!(grant.seen_refresh_tokens(), vec!["stored-refresh".to_owned()]);

    let record = store.record(APP).unwrap();
    assert_eq!(record.refresh_token, "refresh-1", "rotated refresh token is persisted");
    assert!(record.expires_at > Utc::now());
    assert_eq!(auth.access_token().await.unwrap().as_str(), "access-1");
}

#[tokio::test]
async fn open_without_record_or_code_is_an_auth_error() {
    let grant = Arc::new(FakeGrantClient::default());
    let store = Arc::new(FakeTokenStore::default());
    let auth = manager(&grant, &store);

    let err = auth.open(None).await.unwrap_err();

    assert!(matches!(err, AmoError::Auth(_)), "got {err:?}");
    assert_eq!(grant.total_grants(), 0);
    assert_eq!(auth.state(), AuthState::Uninitialized);
    assert!(matches!(auth.access_token().await, Err(AmoError::NotAuthenticated(_))));
}

#[tokio::test]
async fn failed_open_leaves_nothing_half_initialised() {
    let grant = Arc::new(FakeGrantClient::default());
    grant.fail_with(Some(AmoError::Transport("connection refused".into())));
    let store = Arc::new(FakeTokenStore::default());
    let auth = manager(&grant, &store);

    let err = auth.open(Some("code")).await.unwrap_err();

    assert!(matches!(err, AmoError::Auth(ref msg) if msg.contains("connection refused")));
    assert_eq!(store.len(), 0);
    assert!(!auth.is_authenticated().await);
    assert_eq!(auth.health().consecutive_failures, 1);
}

#[tokio::test]
async fn storage_failure_during_open_is_surfaced_as_auth_error() {
    let grant = Arc::new(FakeGrantClient::default());
    let store = Arc::new(FakeTokenStore::default());
    store.fail_with(Some(AmoError::Storage("disk full".into())));
    let auth = manager(&grant, &store);

    let err = auth.open(Some("code")).await.unwrap_err();

    assert!(matches!(err, AmoError::Auth(ref msg) if msg.contains("disk full")));
    assert!(!auth.is_authenticated().await);
}

#[tokio::test]
async fn tick_outside_refresh_window_makes_no_calls() {
    let grant = Arc::new(FakeGrantClient::default());
    let store = Arc::new(FakeTokenStore::default());
    let auth = manager(&grant, &store);
    auth.open(Some("code")).await.unwrap();
    let before = grant.total_grants();

    let outcome = auth.renew_if_due().await.unwrap();

    assert_eq!(outcome, RenewalOutcome::NotDue);
    assert_eq!(grant.total_grants(), before);
}

#[tokio::test]
async fn tick_inside_refresh_window_refreshes_once_and_persists_expiry() {
    let grant = Arc::new(FakeGrantClient::default());
    let store = Arc::new(FakeTokenStore::with_record(record_expiring_in(Duration::hours(1))));
    let auth = manager(&grant, &store);
    auth.open(None).await.unwrap();
    assert_eq!(grant.refresh_grants(), 1);

    // Simulate the token getting close to expiry.
    let near = record_expiring_in(Duration::minutes(4));
    store_upsert(&store, &near).await;
    grant.set_expires_in(7_200);

    let outcome = auth.renew_if_due().await.unwrap();

    assert_eq!(outcome, RenewalOutcome::Refreshed);
    assert_eq!(grant.refresh_grants(), 2);
    let record = store.record(APP).unwrap();
    assert_eq!(record.refresh_token, "refresh-2");
    assert_close(record.expires_at, Utc::now() + Duration::seconds(7_200) - Duration::minutes(1));
    assert_eq!(auth.access_token().await.unwrap().as_str(), "access-2");
}

async fn store_upsert(store: &FakeTokenStore, record: &amocrm_domain::AuthorizationRecord) {
    use amocrm_core::TokenStore;
    store.upsert(&record.app_name, &record.refresh_token, record.expires_at).await.unwrap();
}

#[tokio::test]
async fn tick_before_open_is_skipped() {
    let grant = Arc::new(FakeGrantClient::default());
    let store = Arc::new(FakeTokenStore::with_record(record_expiring_in(Duration::minutes(-1))));
    let auth = manager(&grant, &store);

    assert_eq!(auth.renew_if_due().await.unwrap(), RenewalOutcome::Skipped);
    assert_eq!(grant.total_grants(), 0);
}

#[tokio::test]
async fn provider_rejection_moves_to_auth_failed_and_suspends_ticks() {
    let grant = Arc::new(FakeGrantClient::with_expires_in(120));
    let store = Arc::new(FakeTokenStore::default());
    let auth = manager(&grant, &store);
    auth.open(Some("code")).await.unwrap();

    grant.fail_with(Some(AmoError::Auth("refresh token revoked".into())));
    let err = auth.renew_if_due().await.unwrap_err();
    assert!(matches!(err, AmoError::Auth(_)));

    let health = auth.health();
    assert_eq!(health.state, AuthState::AuthFailed);
    assert_eq!(health.consecutive_failures, 1);
    assert!(health.last_error.unwrap().contains("revoked"));
    assert!(!auth.health().is_healthy());

    // The previously published token is still served.
    assert_eq!(auth.access_token().await.unwrap().as_str(), "access-1");

    let calls = grant.total_grants();
    assert_eq!(auth.renew_if_due().await.unwrap(), RenewalOutcome::Skipped);
    assert_eq!(grant.total_grants(), calls);
}

#[tokio::test]
async fn transient_failure_keeps_state_and_counts_failures() {
    let grant = Arc::new(FakeGrantClient::with_expires_in(120));
    let store = Arc::new(FakeTokenStore::default());
    let auth = manager(&grant, &store);
    auth.open(Some("code")).await.unwrap();

    grant.fail_with(Some(AmoError::Transport("timed out".into())));
    assert!(auth.renew_if_due().await.is_err());
    assert!(auth.renew_if_due().await.is_err());

    let health = auth.health();
    assert_eq!(health.state, AuthState::Authorized);
    assert_eq!(health.consecutive_failures, 2);

    grant.fail_with(None);
    assert_eq!(auth.renew_if_due().await.unwrap(), RenewalOutcome::Refreshed);
    assert_eq!(auth.health().consecutive_failures, 0);
    assert!(auth.health().last_error.is_none());
}

#[tokio::test]
async fn reauthorize_recovers_from_auth_failed() {
    let grant = Arc::new(FakeGrantClient::with_expires_in(120));
    let store = Arc::new(FakeTokenStore::default());
    let auth = manager(&grant, &store);
    auth.open(Some("code")).await.unwrap();

    grant.fail_with(Some(AmoError::Auth("invalid_grant".into())));
    let _ = auth.renew_if_due().await;
    assert_eq!(auth.state(), AuthState::AuthFailed);

    grant.fail_with(None);
    grant.set_expires_in(86_400);
    auth.reauthorize("fresh-code").await.unwrap();

    assert_eq!(auth.state(), AuthState::Authorized);
    assert_eq!(grant.code_grants(), 2);
    assert_eq!(store.len(), 1);
    let record = store.record(APP).unwrap();
    assert_eq!(record.refresh_token, "refresh-2");
    assert_eq!(auth.access_token().await.unwrap().as_str(), "access-2");
}

#[tokio::test]
async fn state_transitions_are_observable() {
    let grant = Arc::new(FakeGrantClient::default());
    let store = Arc::new(FakeTokenStore::default());
    let auth = manager(&grant, &store);
    let mut rx = auth.subscribe();
    assert_eq!(*rx.borrow_and_update(), AuthState::Uninitialized);

    auth.open(Some("code")).await.unwrap();

    assert!(rx.has_changed().unwrap());
    assert_eq!(*rx.borrow_and_update(), AuthState::Authorized);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn readers_never_observe_a_torn_token() {
    let grant = Arc::new(FakeGrantClient::with_expires_in(120));
    let store = Arc::new(FakeTokenStore::default());
    let auth = manager(&grant, &store);
    auth.open(Some("code")).await.unwrap();
    grant.set_delay(Some(StdDuration::from_millis(20)));

    let refresher = {
        let auth = Arc::clone(&auth);
        tokio::spawn(async move {
            for _ in 0..5 {
                auth.renew_if_due().await.unwrap();
            }
        })
    };

    let readers = (0..8).map(|_| {
        let auth = Arc::clone(&auth);
        tokio::spawn(async move {
            let mut seen = Vec::new();
            for _ in 0..200 {
                seen.push(auth.access_token().await.unwrap());
                tokio::task::yield_now().await;
            }
            seen
        })
    });
    let results = futures::future::join_all(readers).await;
    refresher.await.unwrap();

    let valid: Vec<String> = (1..=6).map(|n| format!("access-{n}")).collect();
    for token in results.into_iter().flat_map(Result::unwrap) {
        assert!(valid.iter().any(|v| v == token.as_str()), "unexpected token value");
    }
    assert_eq!(auth.access_token().await.unwrap().as_str(), "access-6");
}

#[tokio::test]
async fn concurrent_ticks_refresh_only_once() {
    let grant = Arc::new(FakeGrantClient::default());
    let store = Arc::new(FakeTokenStore::with_record(record_expiring_in(Duration::hours(1))));
    let auth = manager(&grant, &store);
    auth.open(None).await.unwrap();
    store_upsert(&store, &record_expiring_in(Duration::minutes(1))).await;
    grant.set_delay(Some(StdDuration::from_millis(10)));

    let (a, b) = tokio::join!(auth.renew_if_due(), auth.renew_if_due());

    let outcomes = [a.unwrap(), b.unwrap()];
    assert!(outcomes.contains(&RenewalOutcome::Refreshed));
    assert!(outcomes.contains(&RenewalOutcome::NotDue));
    assert_eq!(grant.refresh_grants(), 2, "one for open, one for the ticks");
}
