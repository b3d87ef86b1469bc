//! Background renewal task under paused tokio time

mod support;

use std::sync::Arc;
use std::time::Duration;

use amocrm_domain::{AmoError, AuthState};
use support::{manager, FakeGrantClient, FakeTokenStore, TestManager};
use tokio_test::{assert_err, assert_ok};

async fn opened(expires_in: i64) -> (Arc<FakeGrantClient>, Arc<TestManager>) {
    let grant = Arc::new(FakeGrantClient::with_expires_in(expires_in));
    let store = Arc::new(FakeTokenStore::default());
    let auth = manager(&grant, &store);
    auth.open(Some("code")).await.unwrap();
    (grant, auth)
}

#[tokio::test(start_paused = true)]
async fn due_token_is_refreshed_on_every_tick() {
    // 120s lifetime minus the 60s margin is always inside the 5 minute window.
    let (grant, auth) = opened(120).await;
    let handle = auth.start_renewal().unwrap();

    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(grant.refresh_grants(), 1);

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(grant.refresh_grants(), 3);
    assert_eq!(auth.access_token().await.unwrap().as_str(), "access-4");

    assert_ok!(handle.stop().await);
}

#[tokio::test(start_paused = true)]
async fn ticks_outside_window_issue_no_grants() {
    let (grant, auth) = opened(86_400).await;
    let handle = auth.start_renewal().unwrap();

    tokio::time::sleep(Duration::from_secs(600)).await;

    assert_eq!(grant.total_grants(), 1, "only the initial code grant");
    assert_ok!(handle.stop().await);
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_the_loop() {
    let (grant, auth) = opened(120).await;
    let handle = auth.start_renewal().unwrap();
    assert!(handle.is_running());

    assert_ok!(handle.stop().await);
    tokio::time::sleep(Duration::from_secs(600)).await;

    assert_eq!(grant.refresh_grants(), 0);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_cancels_the_loop() {
    let (grant, auth) = opened(120).await;
    drop(auth.start_renewal().unwrap());

    tokio::time::sleep(Duration::from_secs(600)).await;

    assert_eq!(grant.refresh_grants(), 0);
}

#[tokio::test(start_paused = true)]
async fn second_start_is_rejected_while_running() {
    let (_grant, auth) = opened(86_400).await;
    let handle = auth.start_renewal().unwrap();

    let err = assert_err!(auth.start_renewal());
    assert!(matches!(err, AmoError::InvalidInput(_)));

    assert_ok!(handle.stop().await);
    let restarted = auth.start_renewal().unwrap();
    restarted.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn transient_failures_do_not_stop_the_loop() {
    let (grant, auth) = opened(120).await;
    let handle = auth.start_renewal().unwrap();

    grant.fail_with(Some(AmoError::Transport("connection reset".into())));
    tokio::time::sleep(Duration::from_secs(121)).await;
    assert_eq!(auth.health().consecutive_failures, 2);
    assert_eq!(auth.state(), AuthState::Authorized);

    grant.fail_with(None);
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(auth.health().consecutive_failures, 0);
    assert_eq!(grant.refresh_grants(), 3);
    assert!(handle.is_running());

    assert_ok!(handle.stop().await);
}

#[tokio::test(start_paused = true)]
async fn rejected_refresh_suspends_ticks_until_reauthorized() {
    let (grant, auth) = opened(120).await;
    let handle = auth.start_renewal().unwrap();

    grant.fail_with(Some(AmoError::Auth("invalid_grant".into())));
    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(auth.state(), AuthState::AuthFailed);
    let calls = grant.total_grants();

    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(grant.total_grants(), calls, "no grants while AuthFailed");
    assert_eq!(auth.health().consecutive_failures, 1);

    grant.fail_with(None);
    auth.reauthorize("new-code").await.unwrap();
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(auth.state(), AuthState::Authorized);
    assert!(grant.refresh_grants() > 1, "ticks resume after re-authorization");

    assert_ok!(handle.stop().await);
}

#[tokio::test(start_paused = true)]
async fn stop_interrupts_a_grant_in_flight() {
    let (grant, auth) = opened(120).await;
    let handle = auth.start_renewal().unwrap();

    grant.set_delay(Some(Duration::from_secs(30)));
    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(grant.refresh_grants(), 1);
    assert_eq!(auth.state(), AuthState::Refreshing);

    assert_ok!(handle.stop().await);
    assert_eq!(auth.state(), AuthState::Authorized);
    assert_eq!(auth.access_token().await.unwrap().as_str(), "access-1");

    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(grant.refresh_grants(), 1);
}

#[tokio::test(start_paused = true)]
async fn out_of_range_lifetime_keeps_the_loop_alive() {
    let (grant, auth) = opened(120).await;
    let handle = auth.start_renewal().unwrap();

    grant.set_expires_in(i64::MAX);
    tokio::time::sleep(Duration::from_secs(61)).await;

    let health = auth.health();
    assert_eq!(health.state, AuthState::Authorized);
    assert_eq!(health.consecutive_failures, 1);
    assert!(health.last_error.is_some_and(|e| e.contains("out of range")));
    assert!(handle.is_running());
    assert_eq!(auth.access_token().await.unwrap().as_str(), "access-1");

    grant.set_expires_in(120);
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(auth.health().consecutive_failures, 0);
    assert_eq!(grant.refresh_grants(), 2);

    assert_ok!(handle.stop().await);
}
