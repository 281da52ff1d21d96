//! Per-target in-flight tracking.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Set of targets with a request in flight.
///
/// `try_begin` moves a target from Idle to Pending and hands back a guard.
/// Dropping the guard returns the target to Idle on every exit path.
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    pending: Arc<Mutex<HashSet<String>>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start work on `key`, or `None` if it is already pending.
    pub fn try_begin(&self, key: impl Into<String>) -> Option<FlightGuard> {
        let key = key.into();
        let mut pending = self.pending.lock().ok()?;
        if !pending.insert(key.clone()) {
            return None;
        }
        Some(FlightGuard {
            key,
            pending: self.pending.clone(),
        })
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.pending
            .lock()
            .map(|p| p.contains(key))
            .unwrap_or(false)
    }
}

/// Releases its key when dropped.
#[derive(Debug)]
pub struct FlightGuard {
    key: String,
    pending: Arc<Mutex<HashSet<String>>>,
}

impl FlightGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.remove(&self.key);
        }
    }
}
