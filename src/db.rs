use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::auth::repo_types::{SessionMarker, User};
use crate::jobs::{repo_types::Application, repo_types::Job, seed};
use crate::storage::KvBackend;

/// Key holding the current session marker.
pub const SESSION_KEY: &str = "ef_current_user";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Users,
    Jobs,
    Applications,
}

impl Collection {
    pub const fn key(self) -> &'static str {
        match self {
            Collection::Users => "ef_users",
            Collection::Jobs => "ef_jobs",
            Collection::Applications => "ef_applications",
        }
    }
}

/// A record persisted as an element of one collection.
pub trait Record: Serialize + DeserializeOwned + Clone {
    const COLLECTION: Collection;

    fn id(&self) -> i64;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("corrupted data under {key}: {source}")]
    Corrupt {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode {key}: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid update for {key}: {reason}")]
    InvalidPatch { key: &'static str, reason: String },
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Typed collections over a [`KvBackend`].
///
/// Every operation reads, modifies and writes back a whole collection. A
/// store-wide lock makes each of those sequences atomic.
pub struct Store {
    backend: Arc<dyn KvBackend>,
    lock: Mutex<()>,
}

impl Store {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            backend,
            lock: Mutex::new(()),
        }
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read<T: DeserializeOwned>(&self, key: &'static str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.backend.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupt { key, source })
    }

    fn write<T: Serialize + ?Sized>(&self, key: &'static str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode { key, source })?;
        self.backend.set(key, &raw)?;
        Ok(())
    }

    /// Seeds the job board on first run and makes sure every collection exists.
    pub fn init(&self) -> Result<(), StoreError> {
        let _guard = self.guard();

        let jobs: Option<Vec<Job>> = self.read(Collection::Jobs.key())?;
        if jobs.map_or(true, |jobs| jobs.is_empty()) {
            let seeded = seed::default_jobs();
            self.write(Collection::Jobs.key(), &seeded)?;
            info!(count = seeded.len(), "seeded default jobs");
        }
        if self.backend.get(Collection::Users.key())?.is_none() {
            self.write(Collection::Users.key(), &Vec::<User>::new())?;
        }
        if self.backend.get(Collection::Applications.key())?.is_none() {
            self.write(Collection::Applications.key(), &Vec::<Application>::new())?;
        }
        Ok(())
    }

    /// `None` means the collection was never written.
    pub fn get_all<T: Record>(&self) -> Result<Option<Vec<T>>, StoreError> {
        let _guard = self.guard();
        self.read(T::COLLECTION.key())
    }

    pub fn save<T: Record>(&self, items: &[T]) -> Result<(), StoreError> {
        let _guard = self.guard();
        self.write(T::COLLECTION.key(), items)
    }

    /// Runs `f` against the collection under the store lock and persists the
    /// result when `f` succeeds. Nothing is written if `f` fails or leaves the
    /// collection unchanged.
    pub fn modify<T, R, E>(&self, f: impl FnOnce(&mut Vec<T>) -> Result<R, E>) -> Result<R, E>
    where
        T: Record,
        E: From<StoreError>,
    {
        let key = T::COLLECTION.key();
        let _guard = self.guard();

        let before = self.backend.get(key).map_err(StoreError::from)?;
        let mut items: Vec<T> = match &before {
            Some(raw) => {
                serde_json::from_str(raw).map_err(|source| StoreError::Corrupt { key, source })?
            }
            None => Vec::new(),
        };

        let out = f(&mut items)?;

        let after =
            serde_json::to_string(&items).map_err(|source| StoreError::Encode { key, source })?;
        let unchanged = match &before {
            Some(raw) => *raw == after,
            None => items.is_empty(),
        };
        if !unchanged {
            self.backend.set(key, &after).map_err(StoreError::from)?;
            debug!(key, len = items.len(), "collection written");
        }
        Ok(out)
    }

    pub fn add<T: Record>(&self, item: T) -> Result<T, StoreError> {
        self.modify(|items: &mut Vec<T>| {
            items.push(item.clone());
            Ok(item)
        })
    }

    pub fn find_by_id<T: Record>(&self, id: i64) -> Result<Option<T>, StoreError> {
        self.find_by(|item: &T| item.id() == id)
    }

    pub fn find_by<T: Record>(&self, pred: impl Fn(&T) -> bool) -> Result<Option<T>, StoreError> {
        let items = self.get_all::<T>()?.unwrap_or_default();
        Ok(items.into_iter().find(|item| pred(item)))
    }

    /// Shallow-merges the fields of `patch` into the first record with `id`.
    /// Returns the merged record, or `None` when no record matches.
    pub fn update<T: Record>(&self, id: i64, patch: &Value) -> Result<Option<T>, StoreError> {
        let key = T::COLLECTION.key();
        let Value::Object(fields) = patch else {
            return Err(StoreError::InvalidPatch {
                key,
                reason: "patch must be a JSON object".into(),
            });
        };

        self.modify(|items: &mut Vec<T>| {
            let Some(slot) = items.iter_mut().find(|item| item.id() == id) else {
                return Ok(None);
            };
            let mut merged =
                serde_json::to_value(&*slot).map_err(|source| StoreError::Encode { key, source })?;
            if let Value::Object(target) = &mut merged {
                for (name, value) in fields {
                    target.insert(name.clone(), value.clone());
                }
            }
            *slot = serde_json::from_value(merged).map_err(|e| StoreError::InvalidPatch {
                key,
                reason: e.to_string(),
            })?;
            Ok(Some(slot.clone()))
        })
    }

    /// Returns whether anything was removed.
    pub fn delete<T: Record>(&self, id: i64) -> Result<bool, StoreError> {
        self.modify(|items: &mut Vec<T>| {
            let len = items.len();
            items.retain(|item| item.id() != id);
            Ok(items.len() != len)
        })
    }

    pub fn session(&self) -> Result<Option<SessionMarker>, StoreError> {
        let _guard = self.guard();
        self.read(SESSION_KEY)
    }

    pub fn set_session(&self, marker: &SessionMarker) -> Result<(), StoreError> {
        let _guard = self.guard();
        self.write(SESSION_KEY, marker)
    }

    pub fn clear_session(&self) -> Result<(), StoreError> {
        let _guard = self.guard();
        self.backend.remove(SESSION_KEY)?;
        Ok(())
    }
}

/// Creation-time millisecond id, bumped past existing ids so records created
/// within the same millisecond stay distinct.
pub fn next_id<T: Record>(items: &[T]) -> i64 {
    let now = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;
    let max = items.iter().map(Record::id).max().unwrap_or(0);
    now.max(max.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::repo_types::Category;
    use crate::storage::MemoryKv;
    use serde_json::json;

    fn store_with(backend: Arc<MemoryKv>) -> Store {
        Store::new(backend as Arc<dyn KvBackend>)
    }

    fn fresh() -> Store {
        let store = store_with(Arc::new(MemoryKv::default()));
        store.init().expect("init");
        store
    }

    #[test]
    fn uninitialized_collection_reads_none() {
        let store = store_with(Arc::new(MemoryKv::default()));
        assert!(store.get_all::<Job>().unwrap().is_none());
        assert!(store.get_all::<User>().unwrap().is_none());
    }

    #[test]
    fn init_seeds_four_jobs_and_empty_collections() {
        let store = fresh();
        assert_eq!(store.get_all::<Job>().unwrap().unwrap().len(), 4);
        assert_eq!(store.get_all::<User>().unwrap(), Some(vec![]));
        assert_eq!(store.get_all::<Application>().unwrap(), Some(vec![]));
    }

    #[test]
    fn init_does_not_reseed_a_populated_board() {
        let store = fresh();
        store.delete::<Job>(1).unwrap();
        store.init().unwrap();
        let ids: Vec<i64> = store.get_all::<Job>().unwrap().unwrap().iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
    }

    #[test]
    fn init_reseeds_an_emptied_board() {
        let store = fresh();
        store.save::<Job>(&[]).unwrap();
        store.init().unwrap();
        assert_eq!(store.get_all::<Job>().unwrap().unwrap().len(), 4);
    }

    #[test]
    fn update_merges_fields_into_matching_record() {
        let store = fresh();
        let merged: Job = store
            .update(2, &json!({ "rate": "$70-100/hr", "location": "Berlin" }))
            .unwrap()
            .expect("job 2 exists");
        assert_eq!(merged.rate, "$70-100/hr");
        assert_eq!(merged.location, "Berlin");
        assert_eq!(merged.title, "UI/UX Designer");
        assert_eq!(store.find_by_id::<Job>(2).unwrap().unwrap().location, "Berlin");
    }

    #[test]
    fn update_on_unknown_id_is_a_no_op() {
        let store = fresh();
        let before = store.get_all::<Job>().unwrap();
        let merged: Option<Job> = store.update(999, &json!({ "title": "x" })).unwrap();
        assert!(merged.is_none());
        assert_eq!(store.get_all::<Job>().unwrap(), before);
    }

    #[test]
    fn update_rejects_patches_that_break_the_record() {
        let store = fresh();
        let err = store
            .update::<Job>(1, &json!({ "category": "Juggling" }))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidPatch { .. }));
        assert_eq!(
            store.find_by_id::<Job>(1).unwrap().unwrap().category,
            Category::Development
        );

        let err = store.update::<Job>(1, &json!(["not", "an", "object"])).unwrap_err();
        assert!(matches!(err, StoreError::InvalidPatch { .. }));
    }

    #[test]
    fn delete_removes_by_id() {
        let store = fresh();
        assert!(store.delete::<Job>(3).unwrap());
        assert!(!store.delete::<Job>(3).unwrap());
        assert!(store.find_by_id::<Job>(3).unwrap().is_none());
        assert_eq!(store.get_all::<Job>().unwrap().unwrap().len(), 3);
    }

    #[test]
    fn find_by_returns_first_match() {
        let store = fresh();
        let job = store
            .find_by(|j: &Job| j.company == "MediaWorks")
            .unwrap()
            .expect("seed job");
        assert_eq!(job.id, 3);
    }

    #[test]
    fn corrupted_blob_surfaces_as_corrupt() {
        let backend = Arc::new(MemoryKv::default());
        backend.set(Collection::Jobs.key(), "[{not json").unwrap();
        let store = store_with(backend);
        let err = store.get_all::<Job>().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { key: "ef_jobs", .. }));
        assert!(store.add(seed::default_jobs().remove(0)).is_err());
    }

    #[test]
    fn failed_modify_writes_nothing() {
        let store = fresh();
        let res: Result<(), StoreError> = store.modify(|jobs: &mut Vec<Job>| {
            jobs.clear();
            Err(StoreError::InvalidPatch {
                key: "ef_jobs",
                reason: "abort".into(),
            })
        });
        assert!(res.is_err());
        assert_eq!(store.get_all::<Job>().unwrap().unwrap().len(), 4);
    }

    #[test]
    fn next_id_moves_past_existing_ids() {
        let mut jobs = seed::default_jobs();
        let first = next_id(&jobs);
        assert!(first > 4);
        jobs[0].id = i64::MAX - 1;
        assert_eq!(next_id(&jobs), i64::MAX);
        jobs[0].id = i64::MAX;
        assert_eq!(next_id(&jobs), i64::MAX);
    }
}
