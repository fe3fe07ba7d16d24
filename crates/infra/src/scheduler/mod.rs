//! Deferred task scheduler port.
//!
//! Registrations are *named*: the callback name is the identity entry points
//! use to disarm their own pending runs. The scheduler offers no mutual
//! exclusion — two registrations for the same callback may both fire, which
//! is why the processor reconciles rather than assuming a single run.

use std::time::Duration;

use chrono::{DateTime, Utc};

use certforge_core::TriggerId;

pub mod in_memory;

pub use in_memory::InMemoryTriggerScheduler;

/// Scheduler error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ScheduleError {
    #[error("storage error: {0}")]
    Storage(String),
}

/// One pending registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerRegistration {
    pub id: TriggerId,
    pub callback: String,
    pub fire_at: DateTime<Utc>,
    /// Recurring registrations re-arm themselves after firing.
    pub period: Option<Duration>,
}

/// Scheduler abstraction.
pub trait TriggerScheduler: Send + Sync {
    /// Register a one-shot callback to fire after at least `delay`.
    fn register(&self, callback: &str, delay: Duration) -> Result<TriggerId, ScheduleError>;

    /// Register a recurring callback firing every `period`.
    fn register_recurring(
        &self,
        callback: &str,
        period: Duration,
    ) -> Result<TriggerId, ScheduleError>;

    /// Enumerate all pending registrations.
    fn registrations(&self) -> Result<Vec<TriggerRegistration>, ScheduleError>;

    /// Delete every registration for a callback name; returns how many.
    fn clear(&self, callback: &str) -> Result<usize, ScheduleError>;
}
