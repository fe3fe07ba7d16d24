//! Object-store port.
//!
//! Containers are append-only from this system's perspective: entries are
//! only removed when a temporary intermediate draft is superseded by the
//! final artifact. The listing (name, id, creation time) is the single
//! source of truth for what has been issued.

use chrono::{DateTime, Utc};

use certforge_core::{ContainerId, EntryId};

pub mod in_memory;

pub use in_memory::InMemoryDocumentStore;

/// Object-store error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("container not found: {0}")]
    ContainerNotFound(ContainerId),
    #[error("entry not found: {0}")]
    EntryNotFound(EntryId),
    #[error("storage error: {0}")]
    Storage(String),
}

/// Opaque binary content with its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Blob {
    pub fn new(content_type: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

/// Listing entry: what a container scan reports per object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMeta {
    pub id: EntryId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Object store abstraction.
pub trait DocumentStore: Send + Sync {
    /// Create an entry in a container; names are not required to be unique
    /// by the store itself.
    fn create(&self, container: &ContainerId, name: &str, blob: Blob)
    -> Result<EntryId, StoreError>;

    /// List all live entries in a container.
    fn list(&self, container: &ContainerId) -> Result<Vec<EntryMeta>, StoreError>;

    /// Fetch an entry's content by id.
    fn fetch(&self, id: &EntryId) -> Result<Blob, StoreError>;

    /// Move an entry to the trash; it no longer appears in listings.
    fn trash(&self, id: &EntryId) -> Result<(), StoreError>;
}
