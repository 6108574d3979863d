//! The member polling loop and its start/stop lifecycle.
//!
//! [`MonitoringEngine`] owns at most one background task. The task walks
//! the roster, resolves every due member through the [`StrategyChain`],
//! and writes the result back to the store. Cancellation is cooperative:
//! the task checks its token between members and races it against every
//! sleep and lookup, and no write is issued once the token has fired.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use clanwatch_core::roster::{PlayerStatus, RosterStore, StoreError};
use futures::FutureExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::cadence::CheckCadence;
use crate::chain::StrategyChain;
use crate::config::MonitorConfig;
use crate::source::SourceKind;

/// Errors that abort a single monitoring pass. The loop logs them and
/// backs off; they never escape the task.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// The roster could not be listed.
    #[error("Roster store error: {0}")]
    Store(#[from] StoreError),

    /// A pass panicked.
    #[error("Monitoring pass panicked")]
    PassPanicked,
}

/// Result of an on-demand check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub status: PlayerStatus,
    pub source: SourceKind,
    /// Whether the store accepted the write. `false` if the member is not
    /// on the roster or the store failed.
    pub persisted: bool,
}

/// Handle to the spawned polling task.
struct RunningLoop {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Drives periodic status checks for every roster member.
///
/// Created once at startup and shared behind an `Arc` with the chat
/// front end, which calls [`force_check`](Self::force_check) after adding
/// a member.
pub struct MonitoringEngine {
    store: Arc<dyn RosterStore>,
    chain: Arc<StrategyChain>,
    config: MonitorConfig,
    running: Mutex<Option<RunningLoop>>,
}

impl MonitoringEngine {
    pub fn new(store: Arc<dyn RosterStore>, chain: StrategyChain, config: MonitorConfig) -> Self {
        Self {
            store,
            chain: Arc::new(chain),
            config,
            running: Mutex::new(None),
        }
    }

    /// Spawn the polling loop. Does nothing if it is already running.
    pub async fn start(&self) {
        let mut running = self.running.lock().await;
        if let Some(current) = running.as_ref() {
            if !current.handle.is_finished() {
                tracing::debug!("Monitoring already running");
                return;
            }
        }

        let cancel = CancellationToken::new();
        let store = Arc::clone(&self.store);
        let chain = Arc::clone(&self.chain);
        let config = self.config.clone();
        let loop_cancel = cancel.clone();

        let handle = tokio::spawn(async move {
            tracing::info!(
                check_interval_secs = config.check_interval.as_secs(),
                "Monitoring loop started",
            );
            run_loop(store.as_ref(), &chain, &config, &loop_cancel).await;
            tracing::info!("Monitoring loop exited");
        });

        *running = Some(RunningLoop { cancel, handle });
    }

    /// Cancel the loop and wait for it to exit.
    ///
    /// Waits up to `stop_timeout` for a clean exit, then aborts the task.
    /// Either way no status write happens after this returns.
    pub async fn stop(&self) {
        let Some(RunningLoop { cancel, mut handle }) = self.running.lock().await.take() else {
            return;
        };

        tracing::info!("Stopping monitoring loop");
        cancel.cancel();

        if tokio::time::timeout(self.config.stop_timeout, &mut handle)
            .await
            .is_err()
        {
            tracing::warn!(
                timeout_secs = self.config.stop_timeout.as_secs(),
                "Monitoring loop did not stop in time, aborting",
            );
            handle.abort();
            let _ = handle.await;
        }
    }

    pub async fn is_running(&self) -> bool {
        self.running
            .lock()
            .await
            .as_ref()
            .is_some_and(|r| !r.handle.is_finished())
    }

    /// Check one member immediately, ignoring cadence, and persist the
    /// result. Store failures are logged and reported via
    /// [`CheckOutcome::persisted`].
    pub async fn force_check(&self, username: &str) -> CheckOutcome {
        let resolved = self.chain.resolve(username).await;
        let persisted = persist(self.store.as_ref(), &resolved.status, resolved.source).await;
        CheckOutcome {
            status: resolved.status,
            source: resolved.source,
            persisted,
        }
    }
}

/// Write a status, logging the outcome. Returns whether it was stored.
async fn persist(store: &dyn RosterStore, status: &PlayerStatus, source: SourceKind) -> bool {
    match store
        .update_status(&status.username, status.rank, status.is_online)
        .await
    {
        Ok(true) => {
            tracing::info!(
                username = %status.username,
                rank = %status.rank,
                is_online = status.is_online,
                source = source.as_str(),
                "Member status updated",
            );
            true
        }
        Ok(false) => {
            tracing::debug!(
                username = %status.username,
                "Member no longer on roster, status dropped",
            );
            false
        }
        Err(e) => {
            tracing::warn!(
                username = %status.username,
                error = %e,
                "Failed to store member status",
            );
            false
        }
    }
}

/// Poll until cancelled. Each pass is isolated: errors and panics are
/// logged and followed by the error backoff.
async fn run_loop(
    store: &dyn RosterStore,
    chain: &StrategyChain,
    config: &MonitorConfig,
    cancel: &CancellationToken,
) {
    let mut cadence = CheckCadence::new(config.check_interval);

    while !cancel.is_cancelled() {
        let outcome = AssertUnwindSafe(run_pass(store, chain, config, &mut cadence, cancel))
            .catch_unwind()
            .await
            .unwrap_or(Err(MonitorError::PassPanicked));

        let pause = match outcome {
            Ok(checked) => {
                tracing::debug!(checked, "Monitoring pass complete");
                cadence
                    .until_next_due(Instant::now())
                    .unwrap_or(config.check_interval)
                    .min(config.check_interval)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    backoff_secs = config.error_backoff.as_secs(),
                    "Monitoring pass failed",
                );
                config.error_backoff
            }
        };

        if !sleep_or_cancel(pause, cancel).await {
            break;
        }
    }
}

/// One walk over the roster snapshot. Returns how many members were
/// checked.
async fn run_pass(
    store: &dyn RosterStore,
    chain: &StrategyChain,
    config: &MonitorConfig,
    cadence: &mut CheckCadence,
    cancel: &CancellationToken,
) -> Result<usize, MonitorError> {
    let members = store.list_members().await?;
    cadence.retain(members.iter().map(|m| m.username.as_str()));

    let mut checked = 0;
    for member in &members {
        if cancel.is_cancelled() {
            break;
        }
        if !cadence.is_due(&member.username, Instant::now()) {
            continue;
        }

        let check = AssertUnwindSafe(chain.resolve(&member.username)).catch_unwind();
        let resolved = tokio::select! {
            _ = cancel.cancelled() => break,
            resolved = check => resolved,
        };
        if cancel.is_cancelled() {
            break;
        }

        cadence.mark(&member.username, Instant::now());
        match resolved {
            Ok(resolved) => {
                persist(store, &resolved.status, resolved.source).await;
                checked += 1;
            }
            Err(_) => {
                tracing::error!(username = %member.username, "Status check panicked");
            }
        }

        if !sleep_or_cancel(config.request_pacing, cancel).await {
            break;
        }
    }

    Ok(checked)
}

/// Sleep for `duration`. Returns `false` if cancelled first.
async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}
