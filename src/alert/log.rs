//! Alerts written to the tracing log

use async_trait::async_trait;

use super::{AlertError, AlertEvent, Alerter};

/// Emits each alert as a `tracing` event
#[derive(Debug, Default)]
pub struct LogAlerter;

impl LogAlerter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Alerter for LogAlerter {
    fn name(&self) -> &str {
        "log"
    }

    async fn alert(&self, event: &AlertEvent) -> Result<(), AlertError> {
        if event.status.is_error() {
            tracing::error!(
                category = %event.category,
                service = %event.name,
                target = %event.target,
                at = %event.timestamp,
                "Service DOWN: {}",
                event.message
            );
        } else {
            tracing::warn!(
                category = %event.category,
                service = %event.name,
                target = %event.target,
                at = %event.timestamp,
                "Service recovered ({}): {}",
                event.status,
                event.message
            );
        }
        Ok(())
    }
}
