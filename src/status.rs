//! Service status values

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Last-known health of a monitored service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// Never probed yet
    #[default]
    Unknown,
    Ok,
    Warning,
    Error,
}

impl Status {
    /// Whether this status is on the failing side of the alert boundary
    pub fn is_error(self) -> bool {
        self == Status::Error
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Unknown => "UNKNOWN",
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Error => "ERROR",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a successful check's latency to `Ok` or `Warning`
///
/// Returns `Warning` once `elapsed` reaches the `warning` threshold. The message
/// carries the elapsed time in whole milliseconds.
pub fn evaluate_duration(elapsed: Duration, warning: Duration) -> (Status, String) {
    let status = if elapsed >= warning {
        Status::Warning
    } else {
        Status::Ok
    };

    (status, format!("{} ms", elapsed.as_millis()))
}
