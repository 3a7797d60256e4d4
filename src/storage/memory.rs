use std::{collections::HashMap, sync::Mutex};

use serde_json::Value;

use crate::errors::StoreError;

use super::{DocumentStore, Result, WriteGuard};

/// Volatile store used by tests and ephemeral servers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Value>>>,
    exclusive: Mutex<()>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self, collection: &str) -> Result<Vec<Value>> {
        let guard = self.collections.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.get(collection).cloned().unwrap_or_default())
    }

    fn modify(
        &self,
        collection: &str,
        apply: &mut dyn FnMut(&mut Vec<Value>) -> Result<()>,
    ) -> Result<()> {
        let mut guard = self.collections.lock().map_err(|_| StoreError::Poisoned)?;
        let before = guard.get(collection);
        let mut docs = before.cloned().unwrap_or_default();
        apply(&mut docs)?;
        if before.map_or(docs.is_empty(), |existing| *existing == docs) {
            return Ok(());
        }
        guard.insert(collection.to_string(), docs);
        Ok(())
    }

    fn exclusive(&self) -> Result<WriteGuard<'_>> {
        self.exclusive.lock().map_err(|_| StoreError::Poisoned)
    }
}
