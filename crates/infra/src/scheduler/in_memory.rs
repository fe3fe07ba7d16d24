//! In-memory scheduler for tests/dev.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::Utc;

use certforge_core::TriggerId;

use super::{ScheduleError, TriggerRegistration, TriggerScheduler};

/// In-memory scheduler for tests/dev.
///
/// `fire_due` plays the role of the external clock: it returns the callbacks
/// whose time has come, removing one-shots and re-arming recurring
/// registrations, so tests drive deferred execution explicitly.
#[derive(Debug, Default)]
pub struct InMemoryTriggerScheduler {
    registrations: RwLock<Vec<TriggerRegistration>>,
}

impl InMemoryTriggerScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Pending registrations for one callback name (test inspection).
    pub fn pending(&self, callback: &str) -> usize {
        self.registrations
            .read()
            .unwrap()
            .iter()
            .filter(|r| r.callback == callback)
            .count()
    }

    /// Pop every registration due at `now`; recurring ones are re-armed.
    pub fn fire_due(&self, now: chrono::DateTime<Utc>) -> Vec<TriggerRegistration> {
        let mut registrations = self.registrations.write().unwrap();
        let mut fired = Vec::new();
        let mut kept = Vec::new();
        for registration in registrations.drain(..) {
            if registration.fire_at > now {
                kept.push(registration);
                continue;
            }
            if let Some(period) = registration.period {
                let mut rearmed = registration.clone();
                rearmed.fire_at = now
                    + chrono::Duration::from_std(period).unwrap_or_else(|_| chrono::Duration::zero());
                kept.push(rearmed);
            }
            fired.push(registration);
        }
        *registrations = kept;
        fired
    }
}

impl TriggerScheduler for InMemoryTriggerScheduler {
    fn register(&self, callback: &str, delay: Duration) -> Result<TriggerId, ScheduleError> {
        let id = TriggerId::new();
        let fire_at =
            Utc::now() + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::zero());
        self.registrations.write().unwrap().push(TriggerRegistration {
            id,
            callback: callback.to_string(),
            fire_at,
            period: None,
        });
        Ok(id)
    }

    fn register_recurring(
        &self,
        callback: &str,
        period: Duration,
    ) -> Result<TriggerId, ScheduleError> {
        let id = TriggerId::new();
        let fire_at =
            Utc::now() + chrono::Duration::from_std(period).unwrap_or_else(|_| chrono::Duration::zero());
        self.registrations.write().unwrap().push(TriggerRegistration {
            id,
            callback: callback.to_string(),
            fire_at,
            period: Some(period),
        });
        Ok(id)
    }

    fn registrations(&self) -> Result<Vec<TriggerRegistration>, ScheduleError> {
        Ok(self.registrations.read().unwrap().clone())
    }

    fn clear(&self, callback: &str) -> Result<usize, ScheduleError> {
        let mut registrations = self.registrations.write().unwrap();
        let before = registrations.len();
        registrations.retain(|r| r.callback != callback);
        Ok(before - registrations.len())
    }
}

impl TriggerScheduler for Arc<InMemoryTriggerScheduler> {
    fn register(&self, callback: &str, delay: Duration) -> Result<TriggerId, ScheduleError> {
        (**self).register(callback, delay)
    }

    fn register_recurring(
        &self,
        callback: &str,
        period: Duration,
    ) -> Result<TriggerId, ScheduleError> {
        (**self).register_recurring(callback, period)
    }

    fn registrations(&self) -> Result<Vec<TriggerRegistration>, ScheduleError> {
        (**self).registrations()
    }

    fn clear(&self, callback: &str) -> Result<usize, ScheduleError> {
        (**self).clear(callback)
    }
}
