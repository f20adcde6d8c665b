//! Monitored service records

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::probe::Prober;
use crate::status::Status;

/// Outcome of the most recently completed probe
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServiceState {
    pub status: Status,
    pub message: String,
    /// Completion time of the probe that produced this state
    pub checked_at: Option<DateTime<Utc>>,
}

/// One monitored target and its last-known state
///
/// `status` and `message` live together behind one lock and are always
/// replaced as a pair. At most one probe runs at a time (see [`Service::begin_probe`]).
pub struct Service {
    name: String,
    category: String,
    target: String,
    prober: Box<dyn Prober>,
    state: RwLock<ServiceState>,
    in_flight: AtomicBool,
}

impl Service {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        target: impl Into<String>,
        prober: Box<dyn Prober>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            target: target.into(),
            prober,
            state: RwLock::new(ServiceState::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn prober(&self) -> &dyn Prober {
        self.prober.as_ref()
    }

    /// Consistent copy of the current state
    pub fn state(&self) -> ServiceState {
        self.state.read().clone()
    }

    pub fn status(&self) -> Status {
        self.state.read().status
    }

    pub fn is_probing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Claim the right to probe this service
    ///
    /// Returns `None` while another probe is outstanding. The claim is released
    /// when the guard drops.
    pub fn begin_probe(&self) -> Option<ProbeGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ProbeGuard { service: self })
    }

    pub fn snapshot(&self) -> ServiceSnapshot {
        let state = self.state();
        ServiceSnapshot {
            name: self.name.clone(),
            status: state.status,
            message: state.message,
            target: self.target.clone(),
            checked_at: state.checked_at,
        }
    }
}

/// Exclusive probe claim on a [`Service`]
pub struct ProbeGuard<'a> {
    service: &'a Service,
}

impl ProbeGuard<'_> {
    /// Replace the service state with a new probe result, returning the previous state
    pub fn record(&self, status: Status, message: String) -> ServiceState {
        let next = ServiceState {
            status,
            message,
            checked_at: Some(Utc::now()),
        };
        std::mem::replace(&mut *self.service.state.write(), next)
    }
}

impl Drop for ProbeGuard<'_> {
    fn drop(&mut self) {
        self.service.in_flight.store(false, Ordering::Release);
    }
}

/// Read-only view of a service for external viewers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceSnapshot {
    pub name: String,
    pub status: Status,
    pub message: String,
    pub target: String,
    pub checked_at: Option<DateTime<Utc>>,
}
