//! Periodic inactive-account cleanup.
//!
//! # Responsibilities
//! - Tick on a fixed period and run one cleanup cycle per tick
//! - Bound each storage call with the cycle timeout
//! - Contain failures: log them, never retry within the period, never stop
//!
//! # Design Decisions
//! - Cancellation is observed only between cycles; a running cycle finishes
//! - The first cycle fires one full period after start

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::MaintenanceConfig;
use crate::observability::metrics;
use crate::storage::AccountStore;

/// Position of the runner in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    Scheduled,
    Running,
    Stopped,
}

/// Result of one cleanup cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaintenanceOutcome {
    Succeeded { deleted: u64 },
    Failed { reason: String },
}

impl MaintenanceOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, MaintenanceOutcome::Succeeded { .. })
    }

    fn label(&self) -> &'static str {
        match self {
            MaintenanceOutcome::Succeeded { .. } => "success",
            MaintenanceOutcome::Failed { .. } => "failure",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MaintenanceSettings {
    pub interval: Duration,
    pub cycle_timeout: Duration,
}

impl From<&MaintenanceConfig> for MaintenanceSettings {
    fn from(config: &MaintenanceConfig) -> Self {
        Self {
            interval: config.interval(),
            cycle_timeout: config.cycle_timeout(),
        }
    }
}

pub struct MaintenanceRunner {
    store: Arc<dyn AccountStore>,
    settings: MaintenanceSettings,
    stop: CancellationToken,
    state: watch::Sender<RunnerState>,
}

impl MaintenanceRunner {
    /// `stop` ends the loop at the next tick boundary; pass a child of the
    /// process shutdown token so a shutdown also ends the loop.
    pub fn new(store: Arc<dyn AccountStore>, settings: MaintenanceSettings, stop: CancellationToken) -> Self {
        let (state, _) = watch::channel(RunnerState::Idle);
        Self {
            store,
            settings,
            stop,
            state,
        }
    }

    /// Halt future scheduling. A cycle already running is not interrupted.
    pub fn stop(&self) {
        self.stop.cancel();
    }

    pub fn state(&self) -> RunnerState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<RunnerState> {
        self.state.subscribe()
    }

    pub async fn run(&self) {
        let period = self.settings.interval;
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(interval_secs = period.as_secs(), "Maintenance loop started");

        loop {
            self.state.send_replace(RunnerState::Scheduled);
            tokio::select! {
                biased;
                _ = self.stop.cancelled() => break,
                _ = ticker.tick() => {}
            }

            self.state.send_replace(RunnerState::Running);
            self.run_cycle().await;
            self.state.send_replace(RunnerState::Idle);
        }

        self.state.send_replace(RunnerState::Stopped);
        tracing::info!("Maintenance loop stopped");
    }

    /// Run a single cleanup cycle and log its outcome.
    pub async fn run_cycle(&self) -> MaintenanceOutcome {
        let timeout = self.settings.cycle_timeout;
        let outcome = match time::timeout(timeout, self.store.delete_inactive_accounts()).await {
            Ok(Ok(deleted)) => MaintenanceOutcome::Succeeded { deleted },
            Ok(Err(e)) => MaintenanceOutcome::Failed {
                reason: e.to_string(),
            },
            Err(_) => MaintenanceOutcome::Failed {
                reason: format!("timed out after {}s", timeout.as_secs()),
            },
        };

        match &outcome {
            MaintenanceOutcome::Succeeded { deleted } => {
                tracing::info!(deleted = *deleted, "Inactive accounts deleted");
            }
            MaintenanceOutcome::Failed { reason } => {
                tracing::error!(error = %reason, "Error deleting inactive accounts");
            }
        }
        metrics::record_maintenance_cycle(outcome.label());

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    /// Store that replays scripted results and records when it was called.
    struct ScriptedStore {
        results: Mutex<VecDeque<Result<u64, String>>>,
        calls: Mutex<Vec<Instant>>,
        delay: Duration,
    }

    impl ScriptedStore {
        fn new(results: Vec<Result<u64, String>>, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                results: Mutex::new(results.into()),
                calls: Mutex::new(Vec::new()),
                delay,
            })
        }

        fn calls(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AccountStore for ScriptedStore {
        async fn delete_inactive_accounts(&self) -> Result<u64, StorageError> {
            self.calls.lock().unwrap().push(Instant::now());
            time::sleep(self.delay).await;
            let next = self.results.lock().unwrap().pop_front().unwrap_or(Ok(0));
            next.map_err(|reason| StorageError::Database(sqlx::Error::Protocol(reason)))
        }
    }

    fn runner(store: Arc<ScriptedStore>, stop: CancellationToken) -> Arc<MaintenanceRunner> {
        Arc::new(MaintenanceRunner::new(
            store,
            MaintenanceSettings {
                interval: DAY,
                cycle_timeout: Duration::from_secs(60),
            },
            stop,
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn failed_cycle_keeps_schedule() {
        let store = ScriptedStore::new(vec![Err("connection reset".into()), Ok(3)], Duration::ZERO);
        let stop = CancellationToken::new();
        let runner = runner(store.clone(), stop.clone());
        let started = Instant::now();

        let task = tokio::spawn({
            let runner = runner.clone();
            async move { runner.run().await }
        });

        time::sleep(DAY * 2 + Duration::from_secs(1)).await;
        stop.cancel();
        task.await.unwrap();

        let calls = store.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0] - started, DAY);
        assert_eq!(calls[1] - calls[0], DAY);
        assert_eq!(runner.state(), RunnerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn outcomes_reflect_store_results() {
        let store = ScriptedStore::new(vec![Err("boom".into()), Ok(7)], Duration::ZERO);
        let runner = runner(store, CancellationToken::new());

        let first = runner.run_cycle().await;
        assert!(!first.is_success());
        assert!(matches!(first, MaintenanceOutcome::Failed { ref reason } if reason.contains("boom")));

        assert_eq!(runner.run_cycle().await, MaintenanceOutcome::Succeeded { deleted: 7 });
    }

    #[tokio::test(start_paused = true)]
    async fn slow_store_is_bounded_by_cycle_timeout() {
        let store = ScriptedStore::new(vec![Ok(1)], Duration::from_secs(120));
        let runner = runner(store, CancellationToken::new());

        let outcome = runner.run_cycle().await;
        assert_eq!(
            outcome,
            MaintenanceOutcome::Failed {
                reason: "timed out after 60s".into()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stop_does_not_interrupt_running_cycle() {
        let store = ScriptedStore::new(vec![Ok(2)], Duration::from_secs(30));
        let runner = runner(store.clone(), CancellationToken::new());
        let mut state = runner.subscribe();

        let task = tokio::spawn({
            let runner = runner.clone();
            async move { runner.run().await }
        });

        state.wait_for(|s| *s == RunnerState::Running).await.unwrap();
        runner.stop();
        assert_eq!(runner.state(), RunnerState::Running);

        task.await.unwrap();
        assert_eq!(store.calls().len(), 1);
        assert_eq!(runner.state(), RunnerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_before_first_tick_runs_nothing() {
        let store = ScriptedStore::new(vec![], Duration::ZERO);
        let stop = CancellationToken::new();
        let runner = runner(store.clone(), stop.clone());

        stop.cancel();
        runner.run().await;

        assert!(store.calls().is_empty());
        assert_eq!(runner.state(), RunnerState::Stopped);
    }
}
