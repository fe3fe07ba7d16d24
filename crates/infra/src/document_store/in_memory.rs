//! In-memory object store for tests/dev.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use certforge_core::{ContainerId, EntryId};

use super::{Blob, DocumentStore, EntryMeta, StoreError};

#[derive(Debug, Clone)]
struct StoredEntry {
    meta: EntryMeta,
    blob: Blob,
    trashed: bool,
}

/// In-memory object store for tests/dev.
///
/// Containers must be created explicitly (`add_container`); listing an
/// unknown container fails like the real store does. `create_backdated`
/// exists so expiry tests can control creation timestamps.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    containers: RwLock<HashMap<ContainerId, Vec<StoredEntry>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn add_container(&self, container: &ContainerId) {
        let mut containers = self.containers.write().unwrap();
        containers.entry(container.clone()).or_default();
    }

    /// Create an entry with an explicit creation timestamp.
    pub fn create_backdated(
        &self,
        container: &ContainerId,
        name: &str,
        blob: Blob,
        created_at: DateTime<Utc>,
    ) -> Result<EntryId, StoreError> {
        let mut containers = self.containers.write().unwrap();
        let entries = containers
            .get_mut(container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.clone()))?;
        let id = EntryId::new();
        entries.push(StoredEntry {
            meta: EntryMeta {
                id,
                name: name.to_string(),
                created_at,
            },
            blob,
            trashed: false,
        });
        Ok(id)
    }

    /// Number of live entries in a container (test inspection).
    pub fn live_count(&self, container: &ContainerId) -> usize {
        let containers = self.containers.read().unwrap();
        containers
            .get(container)
            .map(|entries| entries.iter().filter(|e| !e.trashed).count())
            .unwrap_or(0)
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn create(
        &self,
        container: &ContainerId,
        name: &str,
        blob: Blob,
    ) -> Result<EntryId, StoreError> {
        self.create_backdated(container, name, blob, Utc::now())
    }

    fn list(&self, container: &ContainerId) -> Result<Vec<EntryMeta>, StoreError> {
        let containers = self.containers.read().unwrap();
        let entries = containers
            .get(container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.clone()))?;
        Ok(entries
            .iter()
            .filter(|e| !e.trashed)
            .map(|e| e.meta.clone())
            .collect())
    }

    fn fetch(&self, id: &EntryId) -> Result<Blob, StoreError> {
        let containers = self.containers.read().unwrap();
        containers
            .values()
            .flatten()
            .find(|e| e.meta.id == *id && !e.trashed)
            .map(|e| e.blob.clone())
            .ok_or(StoreError::EntryNotFound(*id))
    }

    fn trash(&self, id: &EntryId) -> Result<(), StoreError> {
        let mut containers = self.containers.write().unwrap();
        for entries in containers.values_mut() {
            if let Some(entry) = entries.iter_mut().find(|e| e.meta.id == *id && !e.trashed) {
                entry.trashed = true;
                return Ok(());
            }
        }
        Err(StoreError::EntryNotFound(*id))
    }
}

impl DocumentStore for Arc<InMemoryDocumentStore> {
    fn create(
        &self,
        container: &ContainerId,
        name: &str,
        blob: Blob,
    ) -> Result<EntryId, StoreError> {
        (**self).create(container, name, blob)
    }

    fn list(&self, container: &ContainerId) -> Result<Vec<EntryMeta>, StoreError> {
        (**self).list(container)
    }

    fn fetch(&self, id: &EntryId) -> Result<Blob, StoreError> {
        (**self).fetch(id)
    }

    fn trash(&self, id: &EntryId) -> Result<(), StoreError> {
        (**self).trash(id)
    }
}
