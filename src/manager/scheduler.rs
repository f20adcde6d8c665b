//! Interval-driven probing loop

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval, MissedTickBehavior};

use super::{Manager, ProbeOutcome};

/// Background probing loop with graceful shutdown
pub struct Scheduler {
    manager: Arc<Manager>,
    interval: Duration,
    /// Shutdown signal sender
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl Scheduler {
    /// Fails if `interval` is zero
    pub fn new(manager: Arc<Manager>, interval: Duration) -> Result<Self, SchedulerError> {
        if interval.is_zero() {
            return Err(SchedulerError::ZeroInterval);
        }
        Ok(Self {
            manager,
            interval,
            shutdown_tx: None,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }

    /// Spawn the loop. The first round starts immediately.
    pub fn start(&mut self) -> JoinHandle<()> {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        self.shutdown_tx = Some(shutdown_tx);

        tokio::spawn(run_loop(
            Arc::clone(&self.manager),
            self.interval,
            shutdown_rx,
        ))
    }

    /// Signal the loop to stop. In-flight probes still finish; await the
    /// handle returned by [`start`](Self::start) to wait for them.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }
    }
}

/// Probe every service now and then at each tick of `period`
///
/// Rounds are started on the tick regardless of whether the previous one has
/// finished; services still busy from an earlier round are skipped. Returns
/// once `shutdown` fires (or its sender is dropped) and all in-flight probes
/// have completed.
pub async fn run_loop(manager: Arc<Manager>, period: Duration, mut shutdown: mpsc::Receiver<()>) {
    if period.is_zero() {
        tracing::error!("Scheduler not started: {}", SchedulerError::ZeroInterval);
        return;
    }
    tracing::info!("Scheduler started with interval {:?}", period);

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut in_flight: JoinSet<ProbeOutcome> = JoinSet::new();
    let mut skipped = 0usize;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if skipped > 0 {
                    tracing::warn!(skipped, "Probes skipped since last round, previous probes still running");
                    skipped = 0;
                }
                manager.spawn_round(&mut in_flight);
            }
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                match joined {
                    Ok(ProbeOutcome::Skipped) => skipped += 1,
                    Ok(ProbeOutcome::Probed { .. }) => {}
                    Err(e) => tracing::error!(error = %e, "Probe task failed"),
                }
            }
            _ = shutdown.recv() => {
                tracing::info!("Scheduler shutting down");
                break;
            }
        }
    }

    if !in_flight.is_empty() {
        tracing::info!(pending = in_flight.len(), "Waiting for in-flight probes");
    }
    while let Some(joined) = in_flight.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "Probe task failed");
        }
    }

    tracing::info!("Scheduler stopped");
}

/// Scheduler errors
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("probing interval must be greater than zero")]
    ZeroInterval,
}
