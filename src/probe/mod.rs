//! Health-check capability
//!
//! A [`Prober`] checks one service and maps whatever happened into a [`Status`]
//! plus a human-readable message. Probe failures are never surfaced as errors:
//! an unreachable target is simply `Status::Error`.
//!
//! Built-in probers:
//! - [`TcpProber`] (`tcp`): connection establishment to `host:port`
//! - [`HttpProber`] (`http`): GET request with optional status/body expectations

pub mod http;
pub mod tcp;

pub use http::HttpProber;
pub use tcp::TcpProber;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::status::Status;

/// Message prefix used when a target cannot be reached at all
pub const CONNECT_ERROR_MSG: &str = "Unable to connect";

/// Configuration handed to [`Prober::init`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProberConfig {
    /// Address or URL to check
    pub target: String,
    /// Prober-specific options
    pub options: HashMap<String, serde_json::Value>,
    /// Latency at or above which a successful check is reported as `Warning`
    pub warning: Duration,
    /// Hard limit after which the check is abandoned and reported as `Error`
    pub fatal: Duration,
}

impl ProberConfig {
    /// Read an optional string option
    pub fn str_option(&self, key: &str) -> Result<Option<&str>, ProbeError> {
        match self.options.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(ProbeError::InvalidOption {
                key: key.to_string(),
                reason: format!("expected a string, got {}", other),
            }),
        }
    }

    /// Read an optional unsigned integer option
    pub fn u64_option(&self, key: &str) -> Result<Option<u64>, ProbeError> {
        match self.options.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => value.as_u64().map(Some).ok_or_else(|| ProbeError::InvalidOption {
                key: key.to_string(),
                reason: format!("expected an unsigned integer, got {}", value),
            }),
        }
    }
}

/// A pluggable health check for one service
#[async_trait]
pub trait Prober: Send + Sync {
    /// Validate and store the configuration. Called once before any probe.
    fn init(&mut self, config: ProberConfig) -> Result<(), ProbeError>;

    /// Run one check
    ///
    /// Must map its outcome to exactly one of `Ok`, `Warning` or `Error` and
    /// must not block past its configured `fatal` duration.
    async fn probe(&self) -> (Status, String);
}

/// Prober configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Invalid target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("Invalid option '{key}': {reason}")]
    InvalidOption { key: String, reason: String },

    #[error("Prober setup failed: {0}")]
    Setup(String),
}
