//! Persistent key-value store port.
//!
//! A durable, process-wide string→string map with last-write-wins semantics
//! and no transactions. It backs three distinct namespaces: the job queue
//! (`jobs/`), the notification ledger (`notice/`), and the runtime toggles
//! (`settings/`). Namespaces are prefixes, never overlapping.

pub mod in_memory;

pub use in_memory::InMemoryPropertyStore;

/// Key-value store error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PropertyError {
    #[error("storage error: {0}")]
    Storage(String),
}

/// Persistent key-value store abstraction.
pub trait PropertyStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PropertyError>;

    fn set(&self, key: &str, value: &str) -> Result<(), PropertyError>;

    fn delete(&self, key: &str) -> Result<(), PropertyError>;

    /// Enumerate all pairs. Callers filter by namespace prefix.
    fn entries(&self) -> Result<Vec<(String, String)>, PropertyError>;
}

/// Delete every key under a namespace prefix; returns how many were removed.
pub fn purge_prefix<P: PropertyStore + ?Sized>(
    props: &P,
    prefix: &str,
) -> Result<usize, PropertyError> {
    let mut removed = 0;
    for (key, _) in props.entries()? {
        if key.starts_with(prefix) {
            props.delete(&key)?;
            removed += 1;
        }
    }
    Ok(removed)
}
