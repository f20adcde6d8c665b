//! Broadcast of alert events to every registered channel

use std::time::Duration;

use chrono::Utc;
use tokio::time::timeout;

use crate::alert::{AlertEvent, Alerter};
use crate::status::Status;

/// Format of the dispatch timestamp handed to alerters
pub const TIMESTAMP_FORMAT: &str = "%H:%M:%S UTC";

/// Upper bound on a single alerter call
pub const DEFAULT_ALERT_TIMEOUT: Duration = Duration::from_secs(30);

/// Delivery counts for one broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Calls every alerter, in registration order, for each qualifying transition
pub struct AlertDispatcher {
    alerters: Vec<Box<dyn Alerter>>,
    timeout: Duration,
}

impl AlertDispatcher {
    pub fn new(alerters: Vec<Box<dyn Alerter>>) -> Self {
        Self {
            alerters,
            timeout: DEFAULT_ALERT_TIMEOUT,
        }
    }

    /// Abandon any alerter call that takes longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn len(&self) -> usize {
        self.alerters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerters.is_empty()
    }

    /// Names of the registered alerters, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.alerters.iter().map(|a| a.name()).collect()
    }

    /// Build the event for one service state, stamped with the current time
    pub fn event(
        status: Status,
        category: &str,
        name: &str,
        message: &str,
        target: &str,
    ) -> AlertEvent {
        AlertEvent {
            status,
            category: category.to_string(),
            name: name.to_string(),
            message: message.to_string(),
            target: target.to_string(),
            timestamp: Utc::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    /// Deliver `event` to every alerter
    ///
    /// Calls are sequential, each bounded by the dispatcher timeout. A failing
    /// or stalled alerter is logged and does not stop the remaining ones.
    pub async fn notify(&self, event: &AlertEvent) -> DispatchReport {
        let mut report = DispatchReport::default();

        for alerter in &self.alerters {
            match timeout(self.timeout, alerter.alert(event)).await {
                Ok(Ok(())) => report.delivered += 1,
                Err(_) => {
                    report.failed += 1;
                    tracing::error!(
                        alerter = %alerter.name(),
                        service = %event.name,
                        category = %event.category,
                        "Alert timed out after {:?}",
                        self.timeout
                    );
                }
                Ok(Err(e)) => {
                    report.failed += 1;
                    tracing::error!(
                        alerter = %alerter.name(),
                        service = %event.name,
                        category = %event.category,
                        error = %e,
                        "Failed to send alert"
                    );
                }
            }
        }

        report
    }
}
