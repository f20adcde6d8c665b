//! Constructor registry for probers and alerters
//!
//! A [`Registry`] maps type names from the configuration to factories. It is a
//! plain value built at startup and handed to [`Manager::new`](crate::manager::Manager::new);
//! there is no process-wide registration.

use std::collections::HashMap;
use std::sync::Arc;

use crate::alert::{Alerter, LogAlerter, WebhookAlerter};
use crate::config::AlertDeclaration;
use crate::probe::{HttpProber, Prober, TcpProber};

/// Produces a fresh, uninitialized prober
pub type ProbeConstructor = Arc<dyn Fn() -> Box<dyn Prober> + Send + Sync>;

/// Produces an alerter from its declaration
pub type AlertConstructor = Arc<dyn Fn(&AlertDeclaration) -> Box<dyn Alerter> + Send + Sync>;

#[derive(Clone, Default)]
pub struct Registry {
    probes: HashMap<String, ProbeConstructor>,
    alerts: HashMap<String, AlertConstructor>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `tcp`/`http` probers and `log`/`webhook` alerters
    pub fn builtin() -> Self {
        Self::new()
            .with_probe("tcp", || Box::new(TcpProber::new()))
            .with_probe("http", || Box::new(HttpProber::new()))
            .with_alert("log", |_| Box::new(LogAlerter::new()))
            .with_alert("webhook", |decl| {
                Box::new(WebhookAlerter::from_options(&decl.options))
            })
    }

    /// Register a prober factory, replacing any previous one with the same name
    pub fn with_probe<F>(mut self, kind: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> Box<dyn Prober> + Send + Sync + 'static,
    {
        self.probes.insert(kind.into(), Arc::new(constructor));
        self
    }

    /// Register an alerter factory, replacing any previous one with the same name
    pub fn with_alert<F>(mut self, kind: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&AlertDeclaration) -> Box<dyn Alerter> + Send + Sync + 'static,
    {
        self.alerts.insert(kind.into(), Arc::new(constructor));
        self
    }

    pub fn probe(&self, kind: &str) -> Option<&ProbeConstructor> {
        self.probes.get(kind)
    }

    pub fn alert(&self, kind: &str) -> Option<&AlertConstructor> {
        self.alerts.get(kind)
    }

    /// Registered prober type names, sorted
    pub fn probe_kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.probes.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Registered alerter type names, sorted
    pub fn alert_kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.alerts.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}
