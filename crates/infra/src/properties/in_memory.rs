//! In-memory key-value store for tests/dev.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use super::{PropertyError, PropertyStore};

/// In-memory key-value store for tests/dev.
///
/// BTreeMap keeps enumeration deterministic.
#[derive(Debug, Default)]
pub struct InMemoryPropertyStore {
    inner: RwLock<BTreeMap<String, String>>,
}

impl InMemoryPropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl PropertyStore for InMemoryPropertyStore {
    fn get(&self, key: &str) -> Result<Option<String>, PropertyError> {
        Ok(self.inner.read().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PropertyError> {
        self.inner
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), PropertyError> {
        self.inner.write().unwrap().remove(key);
        Ok(())
    }

    fn entries(&self) -> Result<Vec<(String, String)>, PropertyError> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

impl PropertyStore for Arc<InMemoryPropertyStore> {
    fn get(&self, key: &str) -> Result<Option<String>, PropertyError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PropertyError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), PropertyError> {
        (**self).delete(key)
    }

    fn entries(&self) -> Result<Vec<(String, String)>, PropertyError> {
        (**self).entries()
    }
}
