//! Scripted probers and recording alerters for tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use crate::alert::{AlertError, AlertEvent, Alerter};
use crate::probe::{ProbeError, Prober, ProberConfig};
use crate::status::Status;

/// Returns statuses from a script, repeating the last one once exhausted
///
/// Messages are `"<STATUS> #<call>"` so a status/message pair can be traced
/// back to the probe that produced it.
pub struct ScriptedProber {
    script: Mutex<VecDeque<Status>>,
    last: Mutex<Status>,
    calls: Arc<AtomicUsize>,
    gate: Option<Arc<Semaphore>>,
    fail_init: bool,
}

impl ScriptedProber {
    pub fn new(script: Vec<Status>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(Status::Ok),
            calls: Arc::new(AtomicUsize::new(0)),
            gate: None,
            fail_init: false,
        }
    }

    /// Share a call counter with the test
    pub fn with_counter(mut self, calls: Arc<AtomicUsize>) -> Self {
        self.calls = calls;
        self
    }

    /// Every probe waits for (and consumes) one permit before returning
    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    fn init(&mut self, _config: ProberConfig) -> Result<(), ProbeError> {
        if self.fail_init {
            return Err(ProbeError::Setup("scripted failure".to_string()));
        }
        Ok(())
    }

    async fn probe(&self) -> (Status, String) {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        let status = {
            let mut last = self.last.lock();
            if let Some(next) = self.script.lock().pop_front() {
                *last = next;
            }
            *last
        };
        (status, format!("{} #{}", status, call))
    }
}

/// Shared record of `(alerter name, event)` calls
#[derive(Clone, Default)]
pub struct AlertLog(Arc<Mutex<Vec<(String, AlertEvent)>>>);

impl AlertLog {
    pub fn calls(&self) -> Vec<(String, AlertEvent)> {
        self.0.lock().clone()
    }

    /// Events received by one alerter, in order
    pub fn events_for(&self, name: &str) -> Vec<AlertEvent> {
        self.0
            .lock()
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, e)| e.clone())
            .collect()
    }
}

pub struct RecordingAlerter {
    name: String,
    log: AlertLog,
}

impl RecordingAlerter {
    pub fn new(name: impl Into<String>, log: AlertLog) -> Self {
        Self {
            name: name.into(),
            log,
        }
    }
}

#[async_trait]
impl Alerter for RecordingAlerter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn alert(&self, event: &AlertEvent) -> Result<(), AlertError> {
        self.log.0.lock().push((self.name.clone(), event.clone()));
        Ok(())
    }
}

pub struct FailingAlerter;

#[async_trait]
impl Alerter for FailingAlerter {
    fn name(&self) -> &str {
        "failing"
    }

    async fn alert(&self, _event: &AlertEvent) -> Result<(), AlertError> {
        Err(AlertError::Webhook("connection refused".to_string()))
    }
}

/// Never completes a delivery
pub struct StalledAlerter;

#[async_trait]
impl Alerter for StalledAlerter {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn alert(&self, _event: &AlertEvent) -> Result<(), AlertError> {
        std::future::pending().await
    }
}
