//! Alert-worthy transition detection

use crate::status::Status;

/// A status change that crosses the `Error` boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Moved into `Error`
    Failing,
    /// Left `Error`
    Recovered,
}

impl Transition {
    /// Classify one probe result against the previous status
    ///
    /// Changes that stay on the same side of the boundary (`Ok` to `Warning`,
    /// `Unknown` to `Ok`, ...) yield `None`.
    pub fn detect(previous: Status, current: Status) -> Option<Self> {
        match (previous.is_error(), current.is_error()) {
            (false, true) => Some(Transition::Failing),
            (true, false) => Some(Transition::Recovered),
            _ => None,
        }
    }
}
