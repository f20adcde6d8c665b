//! TCP connection probing

use std::time::Instant;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use super::{ProbeError, Prober, ProberConfig, CONNECT_ERROR_MSG};
use crate::status::{evaluate_duration, Status};

/// Checks that a TCP connection to `host:port` can be established
///
/// The connection is dropped as soon as it is open. Connect time is compared
/// against the warning threshold; anything slower than `fatal` is an error.
#[derive(Debug, Default)]
pub struct TcpProber {
    config: ProberConfig,
}

impl TcpProber {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Split `host:port`, accepting bracketed IPv6 hosts
fn split_host_port(target: &str) -> Option<(&str, u16)> {
    let (host, port) = target.rsplit_once(':')?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return None;
    }
    port.parse().ok().map(|port| (host, port))
}

#[async_trait]
impl Prober for TcpProber {
    fn init(&mut self, config: ProberConfig) -> Result<(), ProbeError> {
        if split_host_port(&config.target).is_none() {
            return Err(ProbeError::InvalidTarget {
                target: config.target,
                reason: "expected host:port".to_string(),
            });
        }
        self.config = config;
        Ok(())
    }

    async fn probe(&self) -> (Status, String) {
        let target = &self.config.target;
        debug!("TCP probe connecting to {}", target);

        let start = Instant::now();
        match timeout(self.config.fatal, TcpStream::connect(target.as_str())).await {
            Ok(Ok(_stream)) => evaluate_duration(start.elapsed(), self.config.warning),
            Ok(Err(e)) => {
                debug!("TCP probe to {} failed: {}", target, e);
                (Status::Error, format!("{}: {}", CONNECT_ERROR_MSG, e))
            }
            Err(_) => (
                Status::Error,
                format!(
                    "{}: timed out after {} ms",
                    CONNECT_ERROR_MSG,
                    self.config.fatal.as_millis()
                ),
            ),
        }
    }
}
