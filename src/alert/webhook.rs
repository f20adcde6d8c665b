//! HTTP webhook alerts

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use super::{AlertError, AlertEvent, Alerter};

/// POSTs each alert as JSON to a configured URL
///
/// Options:
/// - `url` (required): webhook endpoint
/// - `headers`: extra request headers as a string map
/// - `timeout_ms`: request timeout (default: 5000)
pub struct WebhookAlerter {
    client: reqwest::Client,
    url: Option<String>,
    headers: HashMap<String, String>,
    timeout: Duration,
}

pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_millis(5000);

impl WebhookAlerter {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: Some(url.into()),
            headers: HashMap::new(),
            timeout: DEFAULT_WEBHOOK_TIMEOUT,
        }
    }

    /// Build from declaration options. Never fails; a missing URL is reported
    /// on delivery instead.
    pub fn from_options(options: &HashMap<String, serde_json::Value>) -> Self {
        let url = options
            .get("url")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let headers = options
            .get("headers")
            .and_then(|v| v.as_object())
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        let timeout = options
            .get("timeout_ms")
            .and_then(|v| v.as_u64())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_WEBHOOK_TIMEOUT);

        Self {
            client: reqwest::Client::new(),
            url,
            headers,
            timeout,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

#[async_trait]
impl Alerter for WebhookAlerter {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn alert(&self, event: &AlertEvent) -> Result<(), AlertError> {
        let url = self
            .url
            .as_deref()
            .ok_or_else(|| AlertError::Config("webhook 'url' option is missing".to_string()))?;

        let payload = serde_json::json!({
            "status": event.status,
            "category": event.category,
            "name": event.name,
            "message": event.message,
            "target": event.target,
            "timestamp": event.timestamp,
        });

        let mut request = self.client.post(url).timeout(self.timeout).json(&payload);

        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AlertError::Webhook(format!("Failed to send webhook: {}", e)))?;

        if !response.status().is_success() {
            return Err(AlertError::Webhook(format!(
                "Webhook returned status {}",
                response.status()
            )));
        }

        tracing::debug!(
            service = %event.name,
            url = %url,
            "Webhook notification sent"
        );

        Ok(())
    }
}
