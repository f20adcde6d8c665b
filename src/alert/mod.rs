//! Notification capability
//!
//! An [`Alerter`] delivers one [`AlertEvent`] to an external channel. Alerters
//! are built once at startup and are read-only afterwards.

pub mod log;
pub mod webhook;

pub use self::log::LogAlerter;
pub use webhook::WebhookAlerter;

use async_trait::async_trait;
use serde::Serialize;

use crate::status::Status;

/// Payload passed to every alerter for one alert-worthy transition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertEvent {
    pub status: Status,
    pub category: String,
    pub name: String,
    pub message: String,
    pub target: String,
    /// Dispatch time, formatted for display (`HH:MM:SS UTC`)
    pub timestamp: String,
}

/// A pluggable notification channel
#[async_trait]
pub trait Alerter: Send + Sync {
    /// Channel name used in logs
    fn name(&self) -> &str;

    /// Best-effort delivery of one event
    async fn alert(&self, event: &AlertEvent) -> Result<(), AlertError>;
}

/// Alert delivery errors
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("Webhook error: {0}")]
    Webhook(String),

    #[error("Alerter misconfigured: {0}")]
    Config(String),
}
