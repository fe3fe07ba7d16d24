//! Runtime toggles, persisted in the key-value store.
//!
//! Toggles are loaded explicitly at each entry point and passed as values;
//! there is no ambient global state.

use crate::properties::{PropertyError, PropertyStore};

/// Key for the auto-generation toggle.
pub const AUTO_GENERATE_KEY: &str = "settings/auto_generate";

/// Key for the auto-notify toggle.
pub const AUTO_NOTIFY_KEY: &str = "settings/auto_notify";

/// Runtime toggles controlling the automatic pipeline.
///
/// Both default to disabled: a fresh deployment issues nothing until an
/// operator turns it on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutomationSettings {
    /// Whether a PASS classification enqueues a certificate job.
    pub auto_generate: bool,
    /// Whether issued certificates are mailed to the recipient.
    pub auto_notify: bool,
}

impl AutomationSettings {
    /// Load both toggles from the store; absent keys read as disabled.
    pub fn load<P: PropertyStore + ?Sized>(props: &P) -> Result<Self, PropertyError> {
        Ok(Self {
            auto_generate: read_flag(props, AUTO_GENERATE_KEY)?,
            auto_notify: read_flag(props, AUTO_NOTIFY_KEY)?,
        })
    }

    /// Persist both toggles.
    pub fn store<P: PropertyStore + ?Sized>(&self, props: &P) -> Result<(), PropertyError> {
        write_flag(props, AUTO_GENERATE_KEY, self.auto_generate)?;
        write_flag(props, AUTO_NOTIFY_KEY, self.auto_notify)
    }
}

/// Flip the auto-generation toggle; returns the new state.
pub fn toggle_auto_generate<P: PropertyStore + ?Sized>(props: &P) -> Result<bool, PropertyError> {
    let next = !read_flag(props, AUTO_GENERATE_KEY)?;
    write_flag(props, AUTO_GENERATE_KEY, next)?;
    Ok(next)
}

/// Flip the auto-notify toggle; returns the new state.
pub fn toggle_auto_notify<P: PropertyStore + ?Sized>(props: &P) -> Result<bool, PropertyError> {
    let next = !read_flag(props, AUTO_NOTIFY_KEY)?;
    write_flag(props, AUTO_NOTIFY_KEY, next)?;
    Ok(next)
}

fn read_flag<P: PropertyStore + ?Sized>(props: &P, key: &str) -> Result<bool, PropertyError> {
    Ok(props.get(key)?.as_deref() == Some("true"))
}

fn write_flag<P: PropertyStore + ?Sized>(
    props: &P,
    key: &str,
    value: bool,
) -> Result<(), PropertyError> {
    props.set(key, if value { "true" } else { "false" })
}
