use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::Value;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tourney::store::{Collection, JsonFileStore, MemoryStore, RecordStore, StoreError};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Storage engine picked at startup from the data directory setting.
#[derive(Debug)]
pub(crate) enum ConfiguredStore {
    Memory(MemoryStore),
    File(JsonFileStore),
}

impl ConfiguredStore {
    pub(crate) fn open(data_dir: Option<&Path>) -> Result<Self, StoreError> {
        match data_dir {
            Some(dir) => {
                let store = JsonFileStore::open(dir)?;
                info!(data_dir = %store.root().display(), "using json file store");
                Ok(Self::File(store))
            }
            None => {
                info!("no data directory configured, records live in memory");
                Ok(Self::Memory(MemoryStore::default()))
            }
        }
    }
}

impl RecordStore for ConfiguredStore {
    fn read(&self, collection: Collection) -> Result<Option<Vec<Value>>, StoreError> {
        match self {
            Self::Memory(store) => store.read(collection),
            Self::File(store) => store.read(collection),
        }
    }

    fn write(&self, collection: Collection, records: Vec<Value>) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.write(collection, records),
            Self::File(store) => store.write(collection, records),
        }
    }

    fn update(
        &self,
        collection: Collection,
        apply: &mut dyn FnMut(&mut Vec<Value>) -> Result<bool, StoreError>,
    ) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.update(collection, apply),
            Self::File(store) => store.update(collection, apply),
        }
    }
}
