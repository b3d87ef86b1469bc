//! Background renewal task
//!
//! The task calls [`AuthManager::renew_if_due`] on a fixed interval until it
//! is cancelled through its [`RenewalHandle`]. Failed ticks are logged and
//! the next tick tries again. Cancellation also interrupts a tick whose grant
//! is still in flight.

use std::sync::Arc;
use std::time::Duration;

use amocrm_domain::{AmoError, Result};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::manager::{AuthManager, RenewalOutcome};
use super::ports::{GrantClient, TokenStore};

const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to a running renewal task
///
/// Dropping the handle cancels the task without waiting for it.
#[derive(Debug)]
pub struct RenewalHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl RenewalHandle {
    /// Cancel the task and wait for it to finish
    ///
    /// # Errors
    /// Returns `AmoError::Internal` if the task does not stop within five
    /// seconds or terminated abnormally.
    pub async fn stop(mut self) -> Result<()> {
        self.cancel.cancel();

        if let Some(task) = self.task.take() {
            tokio::time::timeout(STOP_TIMEOUT, task)
                .await
                .map_err(|_| {
                    AmoError::Internal(format!(
                        "renewal task did not stop within {}s",
                        STOP_TIMEOUT.as_secs()
                    ))
                })?
                .map_err(|e| AmoError::Internal(format!("renewal task failed: {e}")))?;
        }

        info!("token renewal task stopped");
        Ok(())
    }

    /// Whether the task is still running
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for RenewalHandle {
    fn drop(&mut self) {
        if !self.cancel.is_cancelled() {
            warn!("renewal handle dropped while running; cancelling");
            self.cancel.cancel();
        }
    }
}

impl<G, S> AuthManager<G, S>
where
    G: GrantClient + ?Sized + 'static,
    S: TokenStore + ?Sized + 'static,
{
    /// Spawn the background renewal task
    ///
    /// # Errors
    /// Returns `AmoError::InvalidInput` if a renewal task started from this
    /// manager is still running.
    pub fn start_renewal(self: &Arc<Self>) -> Result<RenewalHandle> {
        let cancel = {
            let mut slot = self.renewal.lock();
            if slot.as_ref().is_some_and(|token| !token.is_cancelled()) {
                return Err(AmoError::InvalidInput(format!(
                    "renewal task for '{}' is already running",
                    self.app_name()
                )));
            }
            let cancel = CancellationToken::new();
            *slot = Some(cancel.clone());
            cancel
        };

        let manager = Arc::clone(self);
        let loop_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            manager.renewal_loop(loop_cancel).await;
        });

        Ok(RenewalHandle { cancel, task: Some(task) })
    }

    async fn renewal_loop(self: Arc<Self>, cancel: CancellationToken) {
        let interval = self.settings().interval;
        info!(
            app_name = %self.app_name(),
            interval_secs = interval.as_secs(),
            "token renewal task started"
        );

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!(app_name = %self.app_name(), "token renewal task cancelled");
                    break;
                }
                () = tokio::time::sleep(interval) => {
                    let outcome = tokio::select! {
                        () = cancel.cancelled() => {
                            warn!(
                                app_name = %self.app_name(),
                                "token renewal task cancelled during a grant"
                            );
                            self.abandon_tick();
                            break;
                        }
                        outcome = self.renew_if_due() => outcome,
                    };
                    match outcome {
                        Ok(RenewalOutcome::Refreshed) => {}
                        Ok(outcome) => {
                            debug!(app_name = %self.app_name(), ?outcome, "renewal tick finished");
                        }
                        Err(err) => {
                            error!(
                                app_name = %self.app_name(),
                                error = %err,
                                "renewal tick failed; retrying on next tick"
                            );
                        }
                    }
                }
            }
        }
    }
}
