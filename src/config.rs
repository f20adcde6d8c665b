//! Declarative monitor configuration
//!
//! Loaded from a JSON file, with a handful of environment overrides:
//! - `VIGIL_CONFIG`: path of the configuration file (default: `vigil.json`)
//! - `VIGIL_HOST` / `VIGIL_PORT`: HTTP bind address
//! - `VIGIL_INTERVAL_SECS`: probing interval

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::probe::ProberConfig;

pub const DEFAULT_CONFIG_PATH: &str = "vigil.json";

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between probing rounds
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Upper bound on one alerter delivery, in milliseconds
    #[serde(default = "default_alert_timeout_ms")]
    pub alert_timeout_ms: u64,
    /// Threshold defaults applied to every probe declaration
    #[serde(default)]
    pub defaults: ProbeDefaults,
    #[serde(default)]
    pub probes: Vec<ProbeDeclaration>,
    #[serde(default)]
    pub alerts: Vec<AlertDeclaration>,
    #[serde(default)]
    pub server: ServerSettings,
}

fn default_interval_secs() -> u64 {
    60
}

fn default_alert_timeout_ms() -> u64 {
    30_000
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            alert_timeout_ms: default_alert_timeout_ms(),
            defaults: ProbeDefaults::default(),
            probes: Vec::new(),
            alerts: Vec::new(),
            server: ServerSettings::default(),
        }
    }
}

/// Documented defaults for probe thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeDefaults {
    #[serde(default = "default_warning_ms")]
    pub warning_ms: u64,
    #[serde(default = "default_fatal_ms")]
    pub fatal_ms: u64,
}

fn default_warning_ms() -> u64 {
    1000
}

fn default_fatal_ms() -> u64 {
    10_000
}

impl Default for ProbeDefaults {
    fn default() -> Self {
        Self {
            warning_ms: default_warning_ms(),
            fatal_ms: default_fatal_ms(),
        }
    }
}

/// One monitored service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeDeclaration {
    /// Prober type name, resolved against the registry
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    pub name: String,
    #[serde(default)]
    pub config: ProbeSettings,
}

/// Check-specific settings of a probe declaration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeSettings {
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub options: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub warning_ms: Option<u64>,
    #[serde(default)]
    pub fatal_ms: Option<u64>,
}

impl ProbeSettings {
    /// Merge these settings over `defaults`
    pub fn resolve(&self, defaults: &ProbeDefaults) -> ProberConfig {
        ProberConfig {
            target: self.target.clone(),
            options: self.options.clone(),
            warning: Duration::from_millis(self.warning_ms.unwrap_or(defaults.warning_ms)),
            fatal: Duration::from_millis(self.fatal_ms.unwrap_or(defaults.fatal_ms)),
        }
    }
}

/// One notification channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertDeclaration {
    /// Alerter type name, resolved against the registry
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub options: HashMap<String, serde_json::Value>,
}

/// HTTP bind settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl MonitorConfig {
    /// Load from the file named by `VIGIL_CONFIG` and apply environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var("VIGIL_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration file without environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate a configuration document
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(host) = std::env::var("VIGIL_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("VIGIL_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("VIGIL_PORT '{}' is not a port", port)))?;
        }
        if let Ok(secs) = std::env::var("VIGIL_INTERVAL_SECS") {
            self.interval_secs = secs.parse().map_err(|_| {
                ConfigError::Invalid(format!("VIGIL_INTERVAL_SECS '{}' is not a number", secs))
            })?;
        }
        Ok(())
    }

    /// Check values serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.defaults.warning_ms > self.defaults.fatal_ms {
            return Err(ConfigError::Invalid(format!(
                "default warning_ms ({}) exceeds fatal_ms ({})",
                self.defaults.warning_ms, self.defaults.fatal_ms
            )));
        }
        if self.alert_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "alert_timeout_ms must be greater than zero".to_string(),
            ));
        }
        for probe in &self.probes {
            let resolved = probe.config.resolve(&self.defaults);
            if resolved.warning > resolved.fatal {
                return Err(ConfigError::Invalid(format!(
                    "probe {}/{}: warning ({:?}) exceeds fatal ({:?})",
                    probe.category, probe.name, resolved.warning, resolved.fatal
                )));
            }
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn alert_timeout(&self) -> Duration {
        Duration::from_millis(self.alert_timeout_ms)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "interval_secs": 30,
        "defaults": { "warning_ms": 250 },
        "probes": [
            {
                "type": "http",
                "category": "web",
                "name": "homepage",
                "config": {
                    "target": "https://example.org",
                    "options": { "contains": "Example" },
                    "fatal_ms": 3000
                }
            },
            { "type": "tcp", "category": "db", "name": "postgres",
              "config": { "target": "10.0.0.5:5432" } }
        ],
        "alerts": [
            { "type": "log" },
            { "type": "webhook", "options": { "url": "http://hooks.local" } }
        ]
    }"#;

    #[test]
    fn test_parse_sample() {
        let config = MonitorConfig::from_json(SAMPLE).unwrap();

        assert_eq!(config.interval(), Duration::from_secs(30));
        assert_eq!(config.defaults.warning_ms, 250);
        assert_eq!(config.defaults.fatal_ms, 10_000);
        assert_eq!(config.probes.len(), 2);
        assert_eq!(config.probes[0].kind, "http");
        assert_eq!(config.alerts[1].kind, "webhook");
        assert_eq!(config.server, ServerSettings::default());
        assert_eq!(config.alert_timeout(), Duration::from_secs(30));
        config.validate().unwrap();
    }

    #[test]
    fn test_settings_merge_over_defaults() {
        let config = MonitorConfig::from_json(SAMPLE).unwrap();

        let http = config.probes[0].config.resolve(&config.defaults);
        assert_eq!(http.target, "https://example.org");
        assert_eq!(http.warning, Duration::from_millis(250));
        assert_eq!(http.fatal, Duration::from_millis(3000));
        assert_eq!(http.options["contains"], "Example");

        let tcp = config.probes[1].config.resolve(&config.defaults);
        assert_eq!(tcp.fatal, Duration::from_millis(10_000));
        assert!(tcp.options.is_empty());
    }

    #[test]
    fn test_validate() {
        let mut config = MonitorConfig::default();
        config.validate().unwrap();

        config.interval_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.interval_secs = 10;
        config.defaults.warning_ms = 20_000;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.defaults.warning_ms = 1000;
        config.alert_timeout_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_interval_rejected_on_parse() {
        let err = MonitorConfig::from_json(r#"{ "interval_secs": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("interval_secs")));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{ "interval_secs": 0 }"#).unwrap();
        assert!(matches!(
            MonitorConfig::from_file(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_declaration_thresholds_checked_after_merge() {
        // Own warning above the default fatal
        let err = MonitorConfig::from_json(
            r#"{
                "probes": [{ "type": "tcp", "category": "db", "name": "replica",
                             "config": { "target": "10.0.0.6:5432", "warning_ms": 15000 } }]
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("db/replica")));

        // Own fatal below the default warning
        let err = MonitorConfig::from_json(
            r#"{
                "defaults": { "warning_ms": 2000 },
                "probes": [{ "type": "tcp", "category": "db", "name": "primary",
                             "config": { "target": "10.0.0.5:5432", "fatal_ms": 500 } }]
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        // Both overridden consistently
        MonitorConfig::from_json(
            r#"{
                "probes": [{ "type": "tcp", "category": "db", "name": "primary",
                             "config": { "target": "10.0.0.5:5432",
                                         "warning_ms": 15000, "fatal_ms": 20000 } }]
            }"#,
        )
        .unwrap();
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = MonitorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.probes[1].name, "postgres");

        let err = MonitorConfig::from_file("/nonexistent/vigil.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        let err = MonitorConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
