//! Cached id → record directories for cities and property types.
//!
//! Property cards show city and type names for every row, so a lookup is
//! fetched at most once per id and then served from a bounded cache that the
//! caller owns and can invalidate.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::api::LookupApi;
use crate::error::Result;
use crate::models::{City, LookupRecord, PropertyType};

/// Bounded id-keyed cache. When full, the oldest insertion is evicted.
#[derive(Debug)]
pub struct LookupCache<T> {
    capacity: usize,
    inner: Mutex<CacheInner<T>>,
}

#[derive(Debug)]
struct CacheInner<T> {
    entries: HashMap<i64, T>,
    order: VecDeque<i64>,
}

impl<T: Clone> LookupCache<T> {
    /// A cache holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    // Entries are plain data, so a poisoned lock is still consistent.
    fn lock(&self) -> MutexGuard<'_, CacheInner<T>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, id: i64) -> Option<T> {
        self.lock().entries.get(&id).cloned()
    }

    pub fn insert(&self, id: i64, value: T) {
        let mut inner = self.lock();
        if inner.entries.insert(id, value).is_some() {
            return;
        }
        inner.order.push_back(id);
        while inner.order.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
            }
        }
    }

    pub fn invalidate(&self, id: i64) {
        let mut inner = self.lock();
        if inner.entries.remove(&id).is_some() {
            inner.order.retain(|&cached| cached != id);
        }
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.order.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Lookup endpoints composed with a cache.
pub struct Directory<T: LookupRecord> {
    api: Arc<dyn LookupApi<T>>,
    cache: Arc<LookupCache<T>>,
}

pub type CityDirectory = Directory<City>;
pub type PropertyTypeDirectory = Directory<PropertyType>;

impl<T: LookupRecord> Clone for Directory<T> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<T: LookupRecord> Directory<T> {
    pub fn new(api: Arc<dyn LookupApi<T>>, cache: Arc<LookupCache<T>>) -> Self {
        Self { api, cache }
    }

    /// Directory with a fresh cache of `capacity` entries.
    pub fn with_capacity(api: Arc<dyn LookupApi<T>>, capacity: usize) -> Self {
        Self::new(api, Arc::new(LookupCache::new(capacity)))
    }

    pub fn cache(&self) -> &LookupCache<T> {
        &self.cache
    }

    /// Record for `id`, from cache or the backend.
    ///
    /// Non-positive ids and failed requests yield `None`; failures are logged
    /// and not cached, so the next call retries.
    pub async fn get_by_id(&self, id: i64) -> Option<T> {
        if id <= 0 {
            return None;
        }
        if let Some(hit) = self.cache.get(id) {
            debug!("{} {} served from cache", T::KIND, id);
            return Some(hit);
        }

        match self.api.get_by_id(id).await {
            Ok(record) => {
                self.cache.insert(id, record.clone());
                Some(record)
            }
            Err(err) => {
                error!("Error fetching {} {}: {}", T::KIND, id, err);
                None
            }
        }
    }

    /// Display name for `id`, or the unknown label.
    pub async fn name(&self, id: i64) -> String {
        match self.get_by_id(id).await {
            Some(record) if !record.name().is_empty() => record.name().to_string(),
            _ => T::UNKNOWN_NAME.to_string(),
        }
    }

    /// Warm the cache for several ids at once.
    pub async fn preload(&self, ids: &[i64]) {
        let mut pending: Vec<i64> = ids
            .iter()
            .copied()
            .filter(|&id| id > 0 && self.cache.get(id).is_none())
            .collect();
        pending.sort_unstable();
        pending.dedup();
        if pending.is_empty() {
            return;
        }

        let loaded = join_all(pending.iter().map(|&id| self.get_by_id(id)))
            .await
            .into_iter()
            .flatten()
            .count();
        info!("Preloaded {}/{} {} records", loaded, pending.len(), T::KIND);
    }

    /// Every record. Not cached.
    pub async fn list_all(&self) -> Result<Vec<T>> {
        self.api
            .get_all()
            .await
            .map_err(|err| err.context(format!("Failed to fetch {} list", T::KIND)))
    }

    /// Records whose name contains `term`, ignoring case.
    pub fn search<'a>(records: &'a [T], term: &str) -> Vec<&'a T> {
        let needle = term.trim().to_lowercase();
        records
            .iter()
            .filter(|record| record.name().to_lowercase().contains(&needle))
            .collect()
    }

    /// Validate and submit a new record.
    pub async fn add(&self, draft: &T::Draft) -> Result<Value> {
        T::validate_draft(draft)?;
        let created = self
            .api
            .add(draft)
            .await
            .map_err(|err| err.context(format!("Failed to add {}", T::KIND)))?;
        info!("Added new {}", T::KIND);
        Ok(created)
    }

    pub fn invalidate(&self, id: i64) {
        self.cache.invalidate(id);
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::NewCity;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeCities {
        by_id_calls: AtomicUsize,
        add_calls: AtomicUsize,
    }

    #[async_trait]
    impl LookupApi<City> for FakeCities {
        async fn get_all(&self) -> Result<Vec<City>> {
            Ok(vec![city(1, "Riyadh"), city(2, "Jeddah"), city(3, "Dammam")])
        }

        async fn get_by_id(&self, id: i64) -> Result<City> {
            self.by_id_calls.fetch_add(1, Ordering::SeqCst);
            match id {
                1 => Ok(city(1, "Riyadh")),
                2 => Ok(city(2, "")),
                _ => Err(Error::Api {
                    status: 404,
                    reason: "Not Found".into(),
                    body: Value::Null,
                }),
            }
        }

        async fn add(&self, draft: &NewCity) -> Result<Value> {
            self.add_calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({"id": 10, "name": draft.name}))
        }
    }

    fn city(id: i64, name: &str) -> City {
        City {
            id,
            name: name.into(),
            ..City::default()
        }
    }

    fn directory(capacity: usize) -> (Arc<FakeCities>, CityDirectory) {
        let api = Arc::new(FakeCities::default());
        let dir = CityDirectory::with_capacity(api.clone(), capacity);
        (api, dir)
    }

    #[test]
    fn test_cache_evicts_oldest() {
        let cache = LookupCache::new(2);
        cache.insert(1, "a");
        cache.insert(2, "b");
        cache.insert(1, "a2");
        cache.insert(3, "c");

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(1), None);
        assert_eq!(cache.get(2), Some("b"));
        assert_eq!(cache.get(3), Some("c"));

        cache.invalidate(2);
        assert_eq!(cache.get(2), None);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(LookupCache::<u8>::new(0).capacity(), 1);
    }

    #[tokio::test]
    async fn test_lookup_hits_network_once_per_id() {
        let (api, dir) = directory(16);

        assert_eq!(dir.get_by_id(1).await.unwrap().name, "Riyadh");
        assert_eq!(dir.get_by_id(1).await.unwrap().name, "Riyadh");
        assert_eq!(dir.name(1).await, "Riyadh");

        assert_eq!(api.by_id_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let (api, dir) = directory(16);

        assert!(dir.get_by_id(99).await.is_none());
        assert_eq!(dir.name(99).await, "Unknown City");
        assert_eq!(api.by_id_calls.load(Ordering::SeqCst), 2);
        assert!(dir.cache().is_empty());
    }

    #[tokio::test]
    async fn test_non_positive_ids_skip_the_network() {
        let (api, dir) = directory(16);

        assert!(dir.get_by_id(0).await.is_none());
        assert!(dir.get_by_id(-3).await.is_none());
        assert_eq!(api.by_id_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_name_reports_unknown() {
        let (_, dir) = directory(16);
        assert_eq!(dir.name(2).await, "Unknown City");
    }

    #[tokio::test]
    async fn test_preload_dedups_and_skips_cached() {
        let (api, dir) = directory(16);
        dir.get_by_id(1).await;

        dir.preload(&[1, 2, 2, 0, 7]).await;

        // 1 initial + 2 and 7 once each
        assert_eq!(api.by_id_calls.load(Ordering::SeqCst), 3);
        assert_eq!(dir.cache().len(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let (api, dir) = directory(16);
        dir.get_by_id(1).await;
        dir.invalidate(1);
        dir.get_by_id(1).await;
        assert_eq!(api.by_id_calls.load(Ordering::SeqCst), 2);

        dir.clear();
        assert!(dir.cache().is_empty());
    }

    #[tokio::test]
    async fn test_list_and_search() {
        let (_, dir) = directory(16);
        let cities = dir.list_all().await.unwrap();

        let found = CityDirectory::search(&cities, "JED");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 2);
        assert_eq!(CityDirectory::search(&cities, "").len(), 3);
    }

    #[tokio::test]
    async fn test_add_validates_first() {
        let (api, dir) = directory(16);

        let err = dir.add(&NewCity::new(" ")).await.unwrap_err();
        assert_eq!(
            err.validation().and_then(|v| v.get("name")),
            Some("City name is required")
        );
        assert_eq!(api.add_calls.load(Ordering::SeqCst), 0);

        let created = dir.add(&NewCity::new("Abha")).await.unwrap();
        assert_eq!(created["name"], "Abha");
        assert_eq!(api.add_calls.load(Ordering::SeqCst), 1);
    }
}
