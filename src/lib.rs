//! Vigil: Service-Health Board
//!
//! Periodically checks a set of configured services, keeps each service's
//! last-known status, and notifies every configured channel whenever a service
//! enters or leaves the `Error` state.
//!
//! # Features
//!
//! - **Pluggable probes**: [`probe::Prober`] implementations selected by type name
//! - **Pluggable alerts**: [`alert::Alerter`] implementations, broadcast in order
//! - **Explicit registry**: type names resolved against a [`Registry`] value
//! - **Concurrent rounds**: one task per service, at most one probe per service at a time
//! - **Transition alerts**: notifications only when the `Error` boundary is crossed
//! - **Graceful shutdown**: the scheduler stops ticking and drains in-flight probes
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vigil::{Manager, MonitorConfig, Registry, Scheduler};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MonitorConfig::from_file("vigil.json")?;
//! let manager = Arc::new(Manager::new(&config, &Registry::builtin())?);
//!
//! let mut scheduler = Scheduler::new(Arc::clone(&manager), config.interval())?;
//! let handle = scheduler.start();
//!
//! // ... later
//! println!("{:?}", manager.snapshot());
//! scheduler.stop().await;
//! handle.await?;
//! # Ok(())
//! # }
//! ```

pub mod alert;
pub mod api;
pub mod config;
pub mod manager;
pub mod probe;
pub mod registry;
pub mod status;

// Re-export commonly used types
pub use config::{ConfigError, MonitorConfig};
pub use manager::{Manager, ManagerError, Scheduler, SchedulerError, Snapshot};
pub use registry::Registry;
pub use status::Status;
