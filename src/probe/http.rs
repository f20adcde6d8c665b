//! HTTP request probing

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

use super::{ProbeError, Prober, ProberConfig, CONNECT_ERROR_MSG};
use crate::status::{evaluate_duration, Status};

/// Checks a URL with a GET request
///
/// Options:
/// - `expected_status`: exact status code required (default: any 2xx)
/// - `contains`: text the response body must contain
#[derive(Debug, Default)]
pub struct HttpProber {
    client: reqwest::Client,
    url: Option<Url>,
    expected_status: Option<u16>,
    contains: Option<String>,
    config: ProberConfig,
}

impl HttpProber {
    pub fn new() -> Self {
        Self::default()
    }

    fn status_matches(&self, status: reqwest::StatusCode) -> bool {
        match self.expected_status {
            Some(expected) => status.as_u16() == expected,
            None => status.is_success(),
        }
    }
}

#[async_trait]
impl Prober for HttpProber {
    fn init(&mut self, config: ProberConfig) -> Result<(), ProbeError> {
        let url = Url::parse(&config.target).map_err(|e| ProbeError::InvalidTarget {
            target: config.target.clone(),
            reason: e.to_string(),
        })?;

        self.expected_status = match config.u64_option("expected_status")? {
            Some(code) => Some(u16::try_from(code).map_err(|_| ProbeError::InvalidOption {
                key: "expected_status".to_string(),
                reason: format!("{} is not a valid status code", code),
            })?),
            None => None,
        };
        self.contains = config.str_option("contains")?.map(str::to_string);

        self.client = reqwest::Client::builder()
            .timeout(config.fatal)
            .build()
            .map_err(|e| ProbeError::Setup(e.to_string()))?;
        self.url = Some(url);
        self.config = config;
        Ok(())
    }

    async fn probe(&self) -> (Status, String) {
        let Some(url) = &self.url else {
            return (Status::Error, "Prober not initialized".to_string());
        };
        debug!("HTTP probe requesting {}", url);

        let start = Instant::now();
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return (
                    Status::Error,
                    format!(
                        "{}: timed out after {} ms",
                        CONNECT_ERROR_MSG,
                        self.config.fatal.as_millis()
                    ),
                );
            }
            Err(e) => {
                debug!("HTTP probe to {} failed: {}", url, e);
                return (Status::Error, format!("{}: {}", CONNECT_ERROR_MSG, e));
            }
        };

        let status = response.status();
        if !self.status_matches(status) {
            return (Status::Error, format!("Unexpected status {}", status.as_u16()));
        }

        if let Some(expected) = &self.contains {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => return (Status::Error, format!("Unable to read body: {}", e)),
            };
            if !body.contains(expected.as_str()) {
                return (
                    Status::Error,
                    format!("Response body does not contain '{}'", expected),
                );
            }
        }

        evaluate_duration(start.elapsed(), self.config.warning)
    }
}
