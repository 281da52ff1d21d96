//! UI controllers.
//!
//! Each controller owns the local lists for one area of the app and applies
//! server responses to them. A user action runs through the same steps
//! everywhere: check preconditions, claim the target in [`SingleFlight`],
//! issue the request, reconcile the returned entity, release the target.

mod communities;
mod feed;
mod notifications;
mod plans;
mod profile;
mod single_flight;

pub use communities::*;
pub use feed::*;
pub use notifications::*;
pub use plans::*;
pub use profile::*;
pub use single_flight::*;

/// Result of a user action that may be ignored while a previous one runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The request completed and local state was updated.
    Applied(T),
    /// The same action on the same target was already pending; nothing sent.
    Busy,
}

impl<T> Outcome<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            Outcome::Applied(value) => Some(value),
            Outcome::Busy => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Outcome::Busy)
    }
}
