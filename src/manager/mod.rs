//! Orchestration engine
//!
//! The [`Manager`] owns every monitored [`Service`], grouped by category in
//! configuration order, plus the [`AlertDispatcher`]. A probing round spawns one
//! task per service; each completed probe is compared with the previous status
//! and alert-worthy [`Transition`]s are broadcast to all alerters.
//!
//! A service is probed by at most one task at a time. When a round reaches a
//! service whose previous probe is still running, that service is skipped for
//! the round, so its `(status, message)` pair always comes from one probe.

pub mod dispatch;
pub mod scheduler;
pub mod service;
pub mod transition;

#[cfg(test)]
pub(crate) mod mock;

pub use dispatch::{AlertDispatcher, DispatchReport};
pub use scheduler::{run_loop, Scheduler, SchedulerError};
pub use service::{ProbeGuard, Service, ServiceSnapshot, ServiceState};
pub use transition::Transition;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::task::JoinSet;

use crate::config::MonitorConfig;
use crate::probe::ProbeError;
use crate::registry::Registry;
use crate::status::Status;

/// Services sharing a category label
struct Category {
    name: String,
    services: Vec<Arc<Service>>,
}

/// Result of one attempt to probe a service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The previous probe of this service was still running
    Skipped,
    Probed {
        previous: Status,
        current: Status,
        transition: Option<Transition>,
        /// Delivery counts when the transition was broadcast
        dispatch: Option<DispatchReport>,
    },
}

/// Read-only view of the whole store
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub last_update: Option<DateTime<Utc>>,
    pub services: BTreeMap<String, Vec<ServiceSnapshot>>,
}

pub struct Manager {
    categories: Vec<Category>,
    dispatcher: AlertDispatcher,
    last_update: RwLock<Option<DateTime<Utc>>>,
}

impl Manager {
    /// Build services and alerters from configuration
    ///
    /// Fails on the first unknown type or prober initialization error; no
    /// partially built manager is returned.
    pub fn new(config: &MonitorConfig, registry: &Registry) -> Result<Self, ManagerError> {
        let mut categories: Vec<Category> = Vec::new();

        for decl in &config.probes {
            let constructor = registry
                .probe(&decl.kind)
                .ok_or_else(|| ManagerError::UnknownProbeType(decl.kind.clone()))?;

            let prober_config = decl.config.resolve(&config.defaults);
            let target = prober_config.target.clone();

            let mut prober = constructor();
            prober
                .init(prober_config)
                .map_err(|source| ManagerError::ProbeInit {
                    category: decl.category.clone(),
                    name: decl.name.clone(),
                    source,
                })?;

            let service = Arc::new(Service::new(&decl.name, &decl.category, target, prober));
            match categories.iter_mut().find(|c| c.name == decl.category) {
                Some(category) => category.services.push(service),
                None => categories.push(Category {
                    name: decl.category.clone(),
                    services: vec![service],
                }),
            }
        }

        let mut alerters = Vec::with_capacity(config.alerts.len());
        for decl in &config.alerts {
            let constructor = registry
                .alert(&decl.kind)
                .ok_or_else(|| ManagerError::UnknownAlertType(decl.kind.clone()))?;
            alerters.push(constructor(decl));
        }

        let manager = Self {
            categories,
            dispatcher: AlertDispatcher::new(alerters).with_timeout(config.alert_timeout()),
            last_update: RwLock::new(None),
        };

        tracing::info!(
            services = manager.service_count(),
            categories = manager.categories.len(),
            alerters = manager.dispatcher.len(),
            "Manager initialized"
        );

        Ok(manager)
    }

    /// Category names in configuration order
    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    /// Services of one category, in configuration order
    pub fn category(&self, name: &str) -> Option<&[Arc<Service>]> {
        self.categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.services.as_slice())
    }

    /// All services, category by category
    pub fn services(&self) -> impl Iterator<Item = &Arc<Service>> {
        self.categories.iter().flat_map(|c| c.services.iter())
    }

    pub fn service(&self, category: &str, name: &str) -> Option<&Arc<Service>> {
        self.category(category)?.iter().find(|s| s.name() == name)
    }

    pub fn service_count(&self) -> usize {
        self.categories.iter().map(|c| c.services.len()).sum()
    }

    pub fn dispatcher(&self) -> &AlertDispatcher {
        &self.dispatcher
    }

    /// Start time of the most recent probing round
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        *self.last_update.read()
    }

    /// Probe one service and alert on a boundary crossing
    ///
    /// The probe claim is held until dispatch finishes, so alerts for one
    /// service are delivered in the order its transitions happened.
    pub async fn probe_service(&self, service: &Service) -> ProbeOutcome {
        let Some(guard) = service.begin_probe() else {
            tracing::debug!(
                service = %service.name(),
                category = %service.category(),
                "Previous probe still running, skipping"
            );
            return ProbeOutcome::Skipped;
        };

        let (current, message) = service.prober().probe().await;
        let previous = guard.record(current, message.clone()).status;
        let transition = Transition::detect(previous, current);
        let mut dispatch = None;

        if let Some(transition) = transition {
            match transition {
                Transition::Failing => tracing::warn!(
                    service = %service.name(),
                    category = %service.category(),
                    from = %previous,
                    "Service entered failure: {}",
                    message
                ),
                Transition::Recovered => tracing::info!(
                    service = %service.name(),
                    category = %service.category(),
                    to = %current,
                    "Service recovered: {}",
                    message
                ),
            }

            let event = AlertDispatcher::event(
                current,
                service.category(),
                service.name(),
                &message,
                service.target(),
            );
            let report = self.dispatcher.notify(&event).await;
            tracing::debug!(
                service = %service.name(),
                category = %service.category(),
                delivered = report.delivered,
                failed = report.failed,
                "Alert dispatched"
            );
            dispatch = Some(report);
        }

        ProbeOutcome::Probed {
            previous,
            current,
            transition,
            dispatch,
        }
    }

    /// Start a probing round without waiting for it
    ///
    /// Records the round start as `last_update` and spawns one task per
    /// service onto `tasks`. Returns the number of tasks spawned.
    pub fn spawn_round(self: &Arc<Self>, tasks: &mut JoinSet<ProbeOutcome>) -> usize {
        *self.last_update.write() = Some(Utc::now());
        tracing::debug!(services = self.service_count(), "Probing all");

        let mut spawned = 0;
        for service in self.services() {
            let manager = Arc::clone(self);
            let service = Arc::clone(service);
            tasks.spawn(async move { manager.probe_service(&service).await });
            spawned += 1;
        }
        spawned
    }

    /// Run one probing round and wait for every probe in it
    pub async fn probe_all(self: &Arc<Self>) -> Vec<ProbeOutcome> {
        let mut tasks = JoinSet::new();
        self.spawn_round(&mut tasks);

        let mut outcomes = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => tracing::error!(error = %e, "Probe task failed"),
            }
        }
        outcomes
    }

    /// Consistent per-service view of the store
    pub fn snapshot(&self) -> Snapshot {
        let services = self
            .categories
            .iter()
            .map(|c| {
                let list = c.services.iter().map(|s| s.snapshot()).collect();
                (c.name.clone(), list)
            })
            .collect();

        Snapshot {
            last_update: self.last_update(),
            services,
        }
    }
}

/// Manager construction errors
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error("unknown probe type: {0}")]
    UnknownProbeType(String),

    #[error("unknown alert type: {0}")]
    UnknownAlertType(String),

    #[error("failed to initialize probe {category}/{name}: {source}")]
    ProbeInit {
        category: String,
        name: String,
        #[source]
        source: ProbeError,
    },
}
