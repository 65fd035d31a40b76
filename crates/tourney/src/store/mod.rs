//! Keyed record store: named collections of JSON records replaced wholesale on every write.
//!
//! Engines only know how to read, write and update a whole collection. [`Repository`] layers
//! typed access on top so every mutation is one read-modify-write of the complete collection,
//! run under the engine's lock. Other callers observe either the old or the new value, never a
//! partial one, and concurrent mutations of different records never erase each other.

mod file;
mod memory;

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Named collections persisted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Users,
    Teams,
    Applications,
    Rosters,
    Divisions,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Users,
        Collection::Teams,
        Collection::Applications,
        Collection::Rosters,
        Collection::Divisions,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Teams => "teams",
            Collection::Applications => "applications",
            Collection::Rosters => "rosters",
            Collection::Divisions => "divisions",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Storage engine contract. `read` returns `None` for a collection that was never written.
pub trait RecordStore: Send + Sync {
    fn read(&self, collection: Collection) -> Result<Option<Vec<Value>>, StoreError>;
    fn write(&self, collection: Collection, records: Vec<Value>) -> Result<(), StoreError>;

    /// Read-modify-write of one collection while holding the engine's lock.
    ///
    /// `apply` sees the current records (empty when never written) and returns whether it
    /// changed them. The collection is written back only on `Ok(true)`; an error leaves the
    /// stored value untouched.
    fn update(
        &self,
        collection: Collection,
        apply: &mut dyn FnMut(&mut Vec<Value>) -> Result<bool, StoreError>,
    ) -> Result<(), StoreError>;
}

/// Error enumeration for storage failures. A missing record is never an error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record {key} already exists in {collection}")]
    Conflict { collection: Collection, key: String },
    #[error("cannot open data directory {}: {source}", path.display())]
    Root {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to access {collection}: {source}")]
    Io {
        collection: Collection,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode {collection}: {source}")]
    Encode {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },
    #[error("stored {collection} data is unreadable: {source}")]
    Decode {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A record kind living in exactly one collection, addressed by a string key.
pub trait Record: Serialize + DeserializeOwned + Clone {
    const COLLECTION: Collection;

    fn key(&self) -> &str;
}

/// Typed view over one collection of a [`RecordStore`].
pub struct Repository<S, T> {
    store: Arc<S>,
    _record: PhantomData<fn() -> T>,
}

impl<S, T> Clone for Repository<S, T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _record: PhantomData,
        }
    }
}

impl<S, T> Repository<S, T>
where
    S: RecordStore,
    T: Record,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    fn decode(raw: &[Value]) -> Result<Vec<T>, StoreError> {
        raw.iter()
            .map(|value| {
                T::deserialize(value).map_err(|source| StoreError::Decode {
                    collection: T::COLLECTION,
                    source,
                })
            })
            .collect()
    }

    fn encode(records: &[T]) -> Result<Vec<Value>, StoreError> {
        records
            .iter()
            .map(|record| {
                serde_json::to_value(record).map_err(|source| StoreError::Encode {
                    collection: T::COLLECTION,
                    source,
                })
            })
            .collect()
    }

    fn load(&self) -> Result<Vec<T>, StoreError> {
        let raw = self.store.read(T::COLLECTION)?.unwrap_or_default();
        Self::decode(&raw)
    }

    /// Run `change` over the decoded collection as one atomic step.
    ///
    /// `change` returns whether it altered the records alongside its result; unchanged
    /// collections are not written.
    fn mutate<R, F>(&self, change: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<(bool, R), StoreError>,
    {
        let mut change = Some(change);
        let mut outcome = None;
        self.store.update(T::COLLECTION, &mut |raw: &mut Vec<Value>| {
            let Some(change) = change.take() else {
                return Ok(false);
            };
            let mut records = Self::decode(raw)?;
            let (changed, result) = change(&mut records)?;
            if changed {
                *raw = Self::encode(&records)?;
            }
            outcome = Some(result);
            Ok(changed)
        })?;
        outcome.ok_or_else(|| {
            StoreError::Unavailable(format!("{} update was never applied", T::COLLECTION))
        })
    }

    pub fn get(&self, key: &str) -> Result<Option<T>, StoreError> {
        Ok(self.load()?.into_iter().find(|record| record.key() == key))
    }

    /// Store a new record ahead of existing ones so listings read newest first.
    pub fn insert(&self, record: T) -> Result<T, StoreError> {
        self.mutate(|records| {
            if records.iter().any(|existing| existing.key() == record.key()) {
                return Err(StoreError::Conflict {
                    collection: T::COLLECTION,
                    key: record.key().to_string(),
                });
            }
            records.insert(0, record.clone());
            Ok((true, record))
        })
    }

    /// Return the record stored under `record`'s key, inserting `record` first when absent.
    pub fn get_or_insert(&self, record: T) -> Result<T, StoreError> {
        self.mutate(|records| {
            match records.iter().find(|existing| existing.key() == record.key()) {
                Some(existing) => Ok((false, existing.clone())),
                None => {
                    records.insert(0, record.clone());
                    Ok((true, record))
                }
            }
        })
    }

    /// Replace the record with the same key in place, or insert it first when absent.
    pub fn upsert(&self, record: T) -> Result<T, StoreError> {
        self.mutate(|records| {
            match records.iter().position(|existing| existing.key() == record.key()) {
                Some(index) => records[index] = record.clone(),
                None => records.insert(0, record.clone()),
            }
            Ok((true, record))
        })
    }

    pub fn list<F>(&self, predicate: F) -> Result<Vec<T>, StoreError>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self
            .load()?
            .into_iter()
            .filter(|record| predicate(record))
            .collect())
    }

    /// Apply `change` to the record stored under `key`.
    ///
    /// `change` reports whether it altered the record; the collection is only written back
    /// when it did. Returns `Ok(None)` when no record has that key.
    pub fn modify<F>(&self, key: &str, change: F) -> Result<Option<T>, StoreError>
    where
        F: FnOnce(&mut T) -> bool,
    {
        self.mutate(|records| {
            let Some(record) = records.iter_mut().find(|record| record.key() == key) else {
                return Ok((false, None));
            };
            let changed = change(record);
            Ok((changed, Some(record.clone())))
        })
    }
}

/// Create every collection that was never written so later reads see an empty list.
pub fn initialize_collections<S: RecordStore + ?Sized>(store: &S) -> Result<(), StoreError> {
    for collection in Collection::ALL {
        if store.read(collection)?.is_none() {
            store.update(collection, &mut |records: &mut Vec<Value>| Ok(records.is_empty()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
        body: String,
    }

    impl Record for Note {
        const COLLECTION: Collection = Collection::Rosters;

        fn key(&self) -> &str {
            &self.id
        }
    }

    fn note(id: &str, body: &str) -> Note {
        Note {
            id: id.to_string(),
            body: body.to_string(),
        }
    }

    fn repository() -> Repository<MemoryStore, Note> {
        Repository::new(Arc::new(MemoryStore::default()))
    }

    #[test]
    fn insert_lists_newest_first_and_rejects_duplicates() {
        let notes = repository();
        notes.insert(note("a", "first")).expect("insert a");
        notes.insert(note("b", "second")).expect("insert b");

        let keys: Vec<String> = notes
            .list(|_| true)
            .expect("list")
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(keys, vec!["b", "a"]);

        match notes.insert(note("a", "again")) {
            Err(StoreError::Conflict { key, .. }) => assert_eq!(key, "a"),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn upsert_replaces_in_place() {
        let notes = repository();
        notes.insert(note("a", "first")).expect("insert a");
        notes.insert(note("b", "second")).expect("insert b");
        notes.upsert(note("a", "edited")).expect("upsert");

        let all = notes.list(|_| true).expect("list");
        assert_eq!(all[1], note("a", "edited"));
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn modify_skips_write_when_nothing_changed() {
        let store = Arc::new(MemoryStore::default());
        let notes: Repository<MemoryStore, Note> = Repository::new(store.clone());
        notes.insert(note("a", "first")).expect("insert");
        let writes_before = store.write_count();

        let unchanged = notes.modify("a", |_| false).expect("modify");
        assert_eq!(unchanged, Some(note("a", "first")));
        assert_eq!(store.write_count(), writes_before);

        let changed = notes
            .modify("a", |n| {
                n.body = "second".to_string();
                true
            })
            .expect("modify");
        assert_eq!(changed.map(|n| n.body), Some("second".to_string()));
        assert_eq!(store.write_count(), writes_before + 1);

        assert_eq!(notes.modify("missing", |_| true).expect("modify"), None);
    }

    #[test]
    fn concurrent_mutations_keep_every_acknowledged_write() {
        let notes = repository();
        notes.insert(note("tally", "")).expect("seed tally");

        std::thread::scope(|scope| {
            for worker in 0..8 {
                let notes = notes.clone();
                scope.spawn(move || {
                    for n in 0..25 {
                        notes
                            .insert(note(&format!("w{worker}-{n}"), "body"))
                            .expect("insert");
                        notes
                            .modify("tally", |tally| {
                                tally.body.push('x');
                                true
                            })
                            .expect("modify")
                            .expect("tally exists");
                    }
                });
            }
        });

        assert_eq!(notes.list(|_| true).expect("list").len(), 1 + 8 * 25);
        let tally = notes.get("tally").expect("get").expect("tally");
        assert_eq!(tally.body.len(), 8 * 25);
    }

    #[test]
    fn failed_mutation_leaves_collection_untouched() {
        let store = Arc::new(MemoryStore::default());
        let notes: Repository<MemoryStore, Note> = Repository::new(store.clone());
        notes.insert(note("a", "first")).expect("insert");
        let writes_before = store.write_count();

        assert!(matches!(
            notes.insert(note("a", "again")),
            Err(StoreError::Conflict { .. })
        ));
        assert_eq!(store.write_count(), writes_before);
        assert_eq!(notes.get("a").expect("get"), Some(note("a", "first")));
    }

    #[test]
    fn get_or_insert_keeps_the_first_record() {
        let notes = repository();
        assert_eq!(
            notes.get_or_insert(note("a", "first")).expect("insert"),
            note("a", "first")
        );
        assert_eq!(
            notes.get_or_insert(note("a", "second")).expect("existing"),
            note("a", "first")
        );
        assert_eq!(notes.list(|_| true).expect("list").len(), 1);
    }

    #[test]
    fn initialize_creates_only_missing_collections() {
        let store = MemoryStore::default();
        store
            .write(Collection::Teams, vec![serde_json::json!({"id": "t1"})])
            .expect("seed teams");

        initialize_collections(&store).expect("initialize");

        for collection in Collection::ALL {
            assert!(store.read(collection).expect("read").is_some());
        }
        assert_eq!(
            store.read(Collection::Teams).expect("read").map(|v| v.len()),
            Some(1)
        );
    }

    #[test]
    fn undecodable_records_surface_as_decode_errors() {
        let store = Arc::new(MemoryStore::default());
        store
            .write(Collection::Rosters, vec![serde_json::json!({"id": 7})])
            .expect("write");
        let notes: Repository<MemoryStore, Note> = Repository::new(store);

        assert!(matches!(
            notes.get("7"),
            Err(StoreError::Decode {
                collection: Collection::Rosters,
                ..
            })
        ));
    }
}
