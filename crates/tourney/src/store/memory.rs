use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use super::{Collection, RecordStore, StoreError};

/// Process-local store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<Collection, Vec<Value>>>,
    #[cfg(test)]
    writes: std::sync::atomic::AtomicUsize,
}

impl MemoryStore {
    #[cfg(test)]
    pub(crate) fn write_count(&self) -> usize {
        self.writes.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl MemoryStore {
    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Collection, Vec<Value>>>, StoreError> {
        self.collections
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn commit(
        &self,
        guard: &mut HashMap<Collection, Vec<Value>>,
        collection: Collection,
        records: Vec<Value>,
    ) {
        guard.insert(collection, records);
        #[cfg(test)]
        self.writes
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}

impl RecordStore for MemoryStore {
    fn read(&self, collection: Collection) -> Result<Option<Vec<Value>>, StoreError> {
        Ok(self.lock()?.get(&collection).cloned())
    }

    fn write(&self, collection: Collection, records: Vec<Value>) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        self.commit(&mut guard, collection, records);
        Ok(())
    }

    fn update(
        &self,
        collection: Collection,
        apply: &mut dyn FnMut(&mut Vec<Value>) -> Result<bool, StoreError>,
    ) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        let mut records = guard.get(&collection).cloned().unwrap_or_default();
        if apply(&mut records)? {
            self.commit(&mut guard, collection, records);
        }
        Ok(())
    }
}
