use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;
use tracing::debug;

use super::{Collection, RecordStore, StoreError};

/// Device-local store keeping one `<collection>.json` file per collection.
///
/// Writes land in a sibling temp file which is renamed over the target, so a concurrent
/// reader sees either the previous collection or the new one. Updates within one process are
/// serialized; two processes writing the same collection race and the last rename wins.
#[derive(Debug)]
pub struct JsonFileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::Root {
            path: root.clone(),
            source,
        })?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("file store lock poisoned".to_string()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, collection: Collection) -> PathBuf {
        self.root.join(format!("{}.json", collection.name()))
    }
}

impl JsonFileStore {
    fn read_file(&self, collection: Collection) -> Result<Option<Vec<Value>>, StoreError> {
        let bytes = match fs::read(self.path_for(collection)) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { collection, source }),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Decode { collection, source })
    }

    /// Caller holds `write_lock`.
    fn replace_file(&self, collection: Collection, records: &[Value]) -> Result<(), StoreError> {
        let payload = serde_json::to_vec_pretty(records)
            .map_err(|source| StoreError::Encode { collection, source })?;

        let target = self.path_for(collection);
        let staging = target.with_extension("json.tmp");
        fs::write(&staging, payload).map_err(|source| StoreError::Io { collection, source })?;
        fs::rename(&staging, &target).map_err(|source| StoreError::Io { collection, source })?;

        debug!(%collection, records = records.len(), "collection written");
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn read(&self, collection: Collection) -> Result<Option<Vec<Value>>, StoreError> {
        self.read_file(collection)
    }

    fn write(&self, collection: Collection, records: Vec<Value>) -> Result<(), StoreError> {
        let _guard = self.lock()?;
        self.replace_file(collection, &records)
    }

    fn update(
        &self,
        collection: Collection,
        apply: &mut dyn FnMut(&mut Vec<Value>) -> Result<bool, StoreError>,
    ) -> Result<(), StoreError> {
        let _guard = self.lock()?;
        let mut records = self.read_file(collection)?.unwrap_or_default();
        if apply(&mut records)? {
            self.replace_file(collection, &records)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("tourney-store-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn missing_collection_reads_as_uninitialized() {
        let dir = scratch_dir();
        let store = JsonFileStore::open(&dir).expect("open store");
        assert!(store.read(Collection::Divisions).expect("read").is_none());
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn written_collections_survive_reopening() {
        let dir = scratch_dir();
        {
            let store = JsonFileStore::open(&dir).expect("open store");
            store
                .write(Collection::Teams, vec![json!({"id": "t1", "name": "Comets"})])
                .expect("write");
        }

        let reopened = JsonFileStore::open(&dir).expect("reopen store");
        let teams = reopened
            .read(Collection::Teams)
            .expect("read")
            .expect("initialized");
        assert_eq!(teams, vec![json!({"id": "t1", "name": "Comets"})]);
        assert!(!dir.join("teams.json.tmp").exists());
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn concurrent_updates_are_serialized() {
        let dir = scratch_dir();
        let store = JsonFileStore::open(&dir).expect("open store");

        std::thread::scope(|scope| {
            for worker in 0..4 {
                let store = &store;
                scope.spawn(move || {
                    for n in 0..10 {
                        store
                            .update(Collection::Rosters, &mut |records: &mut Vec<Value>| {
                                records.push(json!({ "id": format!("{worker}-{n}") }));
                                Ok(true)
                            })
                            .expect("update");
                    }
                });
            }
        });

        let stored = store
            .read(Collection::Rosters)
            .expect("read")
            .expect("written");
        assert_eq!(stored.len(), 40);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn failed_update_writes_nothing() {
        let dir = scratch_dir();
        let store = JsonFileStore::open(&dir).expect("open store");
        let result = store.update(Collection::Teams, &mut |records: &mut Vec<Value>| {
            records.push(json!({ "id": "t1" }));
            Err(StoreError::Unavailable("abandoned".to_string()))
        });

        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert!(store.read(Collection::Teams).expect("read").is_none());
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn corrupt_file_is_a_decode_error() {
        let dir = scratch_dir();
        let store = JsonFileStore::open(&dir).expect("open store");
        fs::write(dir.join("users.json"), b"{not json").expect("write garbage");

        assert!(matches!(
            store.read(Collection::Users),
            Err(StoreError::Decode { .. })
        ));
        fs::remove_dir_all(dir).ok();
    }
}
