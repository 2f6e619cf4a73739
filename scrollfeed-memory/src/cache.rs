// Copyright 2026 scrollfeed Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{fmt::Debug, hash::Hash, ops::Deref, sync::Arc};

use hashbrown::{Equivalent, HashMap};
use parking_lot::Mutex;
use scrollfeed_common::{
    code::{Key, Value},
    event::{Event, EventListener},
    metrics::Metrics,
    strict_assert, strict_assert_eq,
};

use crate::{
    eviction::{Eviction, EvictionConfig},
    record::Record,
    soft::SoftTier,
};

/// Shared handle to a cached media object.
///
/// Holding an entry keeps the media alive even after the cache evicts it.
pub struct CacheEntry<K, V> {
    record: Arc<Record<K, V>>,
}

impl<K, V> Clone for CacheEntry<K, V> {
    fn clone(&self) -> Self {
        Self {
            record: self.record.clone(),
        }
    }
}

impl<K, V> Debug for CacheEntry<K, V>
where
    K: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEntry").field("record", &self.record).finish()
    }
}

impl<K, V> Deref for CacheEntry<K, V>
where
    K: Key,
    V: Value,
{
    type Target = V;

    fn deref(&self) -> &Self::Target {
        self.record.value()
    }
}

impl<K, V> CacheEntry<K, V>
where
    K: Key,
    V: Value,
{
    /// Media reference of the entry.
    pub fn key(&self) -> &K {
        self.record.key()
    }

    /// Decoded media object of the entry.
    pub fn value(&self) -> &V {
        self.record.value()
    }

    /// Whether both handles point at the same cached object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.record, &other.record)
    }
}

type Garbage<K, V> = (Event, Arc<Record<K, V>>);

enum Lookup {
    Hit,
    SoftHit,
    Miss,
}

struct Shard<K, V> {
    indexer: HashMap<K, Arc<Record<K, V>>>,
    eviction: Box<dyn Eviction<K>>,
    soft: Option<SoftTier<K, V>>,
    capacity: usize,
}

impl<K, V> Shard<K, V>
where
    K: Key,
    V: Value,
{
    fn insert(&mut self, record: Arc<Record<K, V>>, garbages: &mut Vec<Garbage<K, V>>) {
        if let Some(soft) = self.soft.as_mut() {
            soft.remove(record.key());
        }

        if let Some(old) = self.indexer.insert(record.key().clone(), record.clone()) {
            garbages.push((Event::Replace, old));
        }
        // Pushing a tracked key moves it to the most recent position.
        self.eviction.push(record.key().clone());

        self.evict(self.capacity, Event::Evict, garbages);
        strict_assert!(self.indexer.contains_key(record.key()));
    }

    fn get<Q>(&mut self, key: &Q, garbages: &mut Vec<Garbage<K, V>>) -> (Option<Arc<Record<K, V>>>, Lookup)
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        if let Some(record) = self.indexer.get(key).cloned() {
            self.eviction.access(record.key());
            return (Some(record), Lookup::Hit);
        }

        let record = self.soft.as_mut().and_then(|soft| soft.upgrade(key));
        match record {
            Some(record) => {
                self.insert(record.clone(), garbages);
                (Some(record), Lookup::SoftHit)
            }
            None => (None, Lookup::Miss),
        }
    }

    fn remove<Q>(&mut self, key: &Q) -> Option<Arc<Record<K, V>>>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        if let Some(soft) = self.soft.as_mut() {
            soft.remove(key);
        }
        let record = self.indexer.remove(key)?;
        self.eviction.remove(record.key());
        Some(record)
    }

    /// Evict in eviction order until at most `target` entries remain.
    fn evict(&mut self, target: usize, event: Event, garbages: &mut Vec<Garbage<K, V>>) {
        while self.indexer.len() > target {
            let Some(key) = self.eviction.pop() else {
                break;
            };
            if let Some(record) = self.indexer.remove(&key) {
                if event == Event::Evict {
                    if let Some(soft) = self.soft.as_mut() {
                        soft.insert(&record);
                    }
                }
                garbages.push((event, record));
            }
        }
        strict_assert_eq!(self.indexer.len(), self.eviction.len());
    }

    fn clear(&mut self, garbages: &mut Vec<Garbage<K, V>>) {
        garbages.extend(self.indexer.drain().map(|(_, record)| (Event::Clear, record)));
        self.eviction.clear();
        if let Some(soft) = self.soft.as_mut() {
            soft.clear();
        }
    }
}

struct Inner<K, V> {
    name: String,
    capacity: usize,
    shard: Mutex<Shard<K, V>>,
    event_listener: Option<Arc<dyn EventListener<Key = K, Value = V>>>,
    metrics: Arc<Metrics>,
}

/// Bounded, recency-ordered cache of decoded media objects keyed by media reference.
///
/// Lookups never block on I/O and never trigger a fetch. All state lives behind one lock, so
/// the eviction decision and the mutation that triggered it are atomic. Event listener
/// callbacks and value drops happen after the lock is released.
pub struct MediaCache<K, V> {
    inner: Arc<Inner<K, V>>,
}

impl<K, V> Clone for MediaCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V> Debug for MediaCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaCache")
            .field("name", &self.inner.name)
            .field("capacity", &self.inner.capacity)
            .finish()
    }
}

impl<K, V> MediaCache<K, V>
where
    K: Key,
    V: Value,
{
    /// Insert or replace the media object of `key` and mark it most recently used.
    ///
    /// If the cache grows over capacity, the entry with the oldest recency is evicted.
    pub fn insert(&self, key: K, value: V) -> CacheEntry<K, V> {
        let record = Arc::new(Record::new(key, value));
        let mut garbages = vec![];

        let len = {
            let mut shard = self.inner.shard.lock();
            shard.insert(record.clone(), &mut garbages);
            shard.indexer.len()
        };

        self.inner.metrics.cache_insert.increment(1);
        self.inner.metrics.cache_usage.set(len as f64);
        self.release(garbages);

        CacheEntry { record }
    }

    /// Get the media object of `key` and mark it most recently used.
    pub fn get<Q>(&self, key: &Q) -> Option<CacheEntry<K, V>>
    where
        Q: Hash + Equivalent<K> + Debug + ?Sized,
    {
        let mut garbages = vec![];

        let (record, lookup) = self.inner.shard.lock().get(key, &mut garbages);

        match lookup {
            Lookup::Hit => {
                tracing::trace!("[media cache]: {} hit {key:?}", self.inner.name);
                self.inner.metrics.cache_hit.increment(1);
            }
            Lookup::SoftHit => {
                tracing::trace!("[media cache]: {} soft hit {key:?}", self.inner.name);
                self.inner.metrics.cache_soft_hit.increment(1);
            }
            Lookup::Miss => {
                tracing::trace!("[media cache]: {} miss {key:?}", self.inner.name);
                self.inner.metrics.cache_miss.increment(1);
            }
        }
        self.release(garbages);

        record.map(|record| CacheEntry { record })
    }

    /// Whether `key` is resident in the hard tier. Does not touch recency.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.inner.shard.lock().indexer.contains_key(key)
    }

    /// Drop the media object of `key` regardless of recency, so the next access refetches it.
    pub fn invalidate<Q>(&self, key: &Q) -> Option<CacheEntry<K, V>>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        let record = self.inner.shard.lock().remove(key)?;
        self.inner.metrics.cache_remove.increment(1);
        self.release(vec![(Event::Remove, record.clone())]);
        Some(CacheEntry { record })
    }

    /// Shrink the hard tier to at most `target` entries in eviction order and forget the
    /// soft tier. Returns how many hard entries were dropped.
    pub fn reclaim(&self, target: usize) -> usize {
        let mut garbages = vec![];
        {
            let mut shard = self.inner.shard.lock();
            shard.evict(target, Event::Reclaim, &mut garbages);
            if let Some(soft) = shard.soft.as_mut() {
                soft.clear();
            }
        }
        let reclaimed = garbages.len();
        if reclaimed > 0 {
            tracing::debug!(
                "[media cache]: {} reclaimed {reclaimed} entries down to {target}",
                self.inner.name
            );
        }
        self.inner.metrics.cache_reclaim.increment(reclaimed as u64);
        self.release(garbages);
        reclaimed
    }

    /// Drop every entry of both tiers.
    pub fn clear(&self) {
        let mut garbages = vec![];
        self.inner.shard.lock().clear(&mut garbages);
        self.release(garbages);
    }

    /// Number of entries in the hard tier.
    pub fn len(&self) -> usize {
        self.inner.shard.lock().indexer.len()
    }

    /// Whether the cache holds no entry.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hard tier capacity.
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Name used in logs and metric labels.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Metrics shared with whoever built this cache.
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.inner.metrics
    }

    fn release(&self, garbages: Vec<Garbage<K, V>>) {
        if garbages.is_empty() {
            return;
        }
        self.inner.metrics.cache_usage.set(self.len() as f64);
        for (event, record) in garbages {
            match event {
                Event::Evict => self.inner.metrics.cache_evict.increment(1),
                Event::Replace => self.inner.metrics.cache_replace.increment(1),
                Event::Remove | Event::Clear | Event::Reclaim => {}
            }
            if let Some(listener) = self.inner.event_listener.as_ref() {
                listener.on_leave(event, record.key(), record.value());
            }
        }
    }
}

/// Builder of [`MediaCache`].
pub struct CacheBuilder<K, V> {
    name: String,
    capacity: usize,
    eviction_config: EvictionConfig,
    soft_capacity: usize,
    event_listener: Option<Arc<dyn EventListener<Key = K, Value = V>>>,
    metrics: Option<Arc<Metrics>>,
}

impl<K, V> CacheBuilder<K, V>
where
    K: Key,
    V: Value,
{
    /// Create a builder for a cache holding at most `capacity` entries in its hard tier.
    ///
    /// A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            tracing::warn!("[media cache]: capacity 0 is not allowed, use 1 instead");
            1
        } else {
            capacity
        };
        Self {
            name: "media".to_string(),
            capacity,
            eviction_config: EvictionConfig::default(),
            soft_capacity: 0,
            event_listener: None,
            metrics: None,
        }
    }

    /// Set the name of the cache, used in logs and metric labels.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the eviction algorithm.
    pub fn with_eviction_config(mut self, eviction_config: impl Into<EvictionConfig>) -> Self {
        self.eviction_config = eviction_config.into();
        self
    }

    /// Remember up to `capacity` evicted entries weakly.
    ///
    /// A `get` for such an entry succeeds as long as somebody outside the cache still holds it,
    /// and promotes it back into the hard tier. 0 disables the soft tier.
    pub fn with_soft_tier(mut self, capacity: usize) -> Self {
        self.soft_capacity = capacity;
        self
    }

    /// Set the listener notified when entries leave the cache.
    pub fn with_event_listener<L>(mut self, event_listener: L) -> Self
    where
        L: EventListener<Key = K, Value = V>,
    {
        self.event_listener = Some(Arc::new(event_listener));
        self
    }

    /// Share a metrics handle set instead of registering a new one.
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build the media cache.
    pub fn build(self) -> MediaCache<K, V> {
        let metrics = self.metrics.unwrap_or_else(|| Arc::new(Metrics::new(&self.name)));
        let soft = (self.soft_capacity > 0).then(|| SoftTier::new(self.soft_capacity));
        tracing::info!(
            "[media cache]: {} built with capacity {}, eviction {:?}, soft tier {}",
            self.name,
            self.capacity,
            self.eviction_config,
            self.soft_capacity
        );
        MediaCache {
            inner: Arc::new(Inner {
                name: self.name,
                capacity: self.capacity,
                shard: Mutex::new(Shard {
                    indexer: HashMap::new(),
                    eviction: self.eviction_config.build(),
                    soft,
                    capacity: self.capacity,
                }),
                event_listener: self.event_listener,
                metrics,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeSet, thread};

    use itertools::Itertools;
    use rand::{rngs::SmallRng, Rng, SeedableRng};

    use super::*;

    fn is_send_sync_static<T: Send + Sync + 'static>() {}

    #[test]
    fn test_send_sync_static() {
        is_send_sync_static::<MediaCache<String, Vec<u8>>>();
        is_send_sync_static::<CacheEntry<String, Vec<u8>>>();
    }

    fn keys(cache: &MediaCache<String, usize>, candidates: &[&str]) -> Vec<String> {
        candidates
            .iter()
            .filter(|key| cache.contains(**key))
            .map(|key| key.to_string())
            .collect_vec()
    }

    #[test_log::test]
    fn test_get_refreshes_recency() {
        let cache = CacheBuilder::new(2).build();
        cache.insert("k1".to_string(), 1);
        cache.insert("k2".to_string(), 2);
        assert_eq!(*cache.get("k1").unwrap(), 1);
        cache.insert("k3".to_string(), 3);

        assert_eq!(cache.len(), 2);
        assert_eq!(keys(&cache, &["k1", "k2", "k3"]), vec!["k1", "k3"]);
        assert!(cache.get("k2").is_none());
    }

    #[test_log::test]
    fn test_fifo_ignores_get() {
        let cache = CacheBuilder::new(2).with_eviction_config(EvictionConfig::Fifo).build();
        cache.insert("k1".to_string(), 1);
        cache.insert("k2".to_string(), 2);
        assert!(cache.get("k1").is_some());
        cache.insert("k3".to_string(), 3);

        assert_eq!(keys(&cache, &["k1", "k2", "k3"]), vec!["k2", "k3"]);
    }

    #[test_log::test]
    fn test_zero_capacity_clamped() {
        let cache = CacheBuilder::<u64, u64>::new(0).build();
        assert_eq!(cache.capacity(), 1);
        cache.insert(1, 1);
        cache.insert(2, 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&2));
    }

    #[test_log::test]
    fn test_replace_keeps_single_entry() {
        let cache = CacheBuilder::new(2).build();
        let old = cache.insert(1u64, "a");
        cache.insert(2u64, "b");
        let new = cache.insert(1u64, "c");
        assert_eq!(cache.len(), 2);
        assert!(!old.ptr_eq(&new));
        // Entries handed out earlier keep their value.
        assert_eq!(*old, "a");
        assert_eq!(*cache.get(&1).unwrap(), "c");

        // The replacement refreshed key 1, so key 2 goes first.
        cache.insert(3u64, "d");
        assert!(cache.contains(&1));
        assert!(!cache.contains(&2));
    }

    #[test]
    fn test_retains_most_recently_used() {
        const CAPACITY: usize = 16;

        let mut rng = SmallRng::seed_from_u64(42);
        let cache = CacheBuilder::new(CAPACITY).build();
        // Model: keys ordered from least to most recently used.
        let mut model: Vec<u64> = vec![];

        for _ in 0..10_000 {
            let key = rng.random_range(0..64u64);
            if rng.random_bool(0.5) {
                cache.insert(key, key);
                model.retain(|k| *k != key);
                model.push(key);
                if model.len() > CAPACITY {
                    model.remove(0);
                }
            } else if cache.get(&key).is_some() {
                let pos = model.iter().position(|k| *k == key).unwrap();
                model.remove(pos);
                model.push(key);
            } else {
                assert!(!model.contains(&key));
            }
            assert_eq!(cache.len(), model.len());
        }

        let resident = (0..64u64).filter(|k| cache.contains(k)).collect::<BTreeSet<_>>();
        assert_eq!(resident, model.into_iter().collect::<BTreeSet<_>>());
    }

    #[test_log::test]
    fn test_soft_tier_resurrects_held_media() {
        let cache = CacheBuilder::new(1).with_soft_tier(4).build();
        let held = cache.insert(1u64, vec![0u8; 16]);
        drop(cache.insert(2u64, vec![1u8; 16]));
        assert!(!cache.contains(&1));

        // Still referenced outside the cache: promoted back into the hard tier.
        let again = cache.get(&1).unwrap();
        assert!(again.ptr_eq(&held));
        assert!(cache.contains(&1));

        // Key 2 was pushed out by the promotion and nobody holds it.
        assert!(cache.get(&2).is_none());
    }

    #[test_log::test]
    fn test_no_soft_tier_by_default() {
        let cache = CacheBuilder::new(1).build();
        let _held = cache.insert(1u64, 1u64);
        cache.insert(2u64, 2u64);
        assert!(cache.get(&1).is_none());
    }

    #[test_log::test]
    fn test_invalidate_and_reclaim() {
        let cache = CacheBuilder::new(8).with_soft_tier(8).build();
        for i in 0..8u64 {
            cache.insert(i, i);
        }

        let removed = cache.invalidate(&3).unwrap();
        assert_eq!(*removed, 3);
        assert!(cache.invalidate(&3).is_none());
        assert!(cache.get(&3).is_none());
        assert_eq!(cache.len(), 7);

        cache.get(&0);
        assert_eq!(cache.reclaim(3), 4);
        assert_eq!(cache.len(), 3);
        assert_eq!((0..8u64).filter(|k| cache.contains(k)).collect_vec(), vec![0, 6, 7]);
        assert_eq!(cache.reclaim(10), 0);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[derive(Default, Clone)]
    struct Recorder(Arc<Mutex<Vec<(Event, u64)>>>);

    impl EventListener for Recorder {
        type Key = u64;
        type Value = u64;

        fn on_leave(&self, reason: Event, key: &u64, _: &u64) {
            self.0.lock().push((reason, *key));
        }
    }

    #[test_log::test]
    fn test_event_listener() {
        let recorder = Recorder::default();
        let cache = CacheBuilder::new(2).with_event_listener(recorder.clone()).build();

        cache.insert(1, 1);
        cache.insert(2, 2);
        cache.insert(2, 20);
        cache.insert(3, 3);
        cache.invalidate(&2);
        cache.insert(4, 4);
        cache.insert(5, 5);
        cache.reclaim(1);
        cache.clear();

        assert_eq!(
            recorder.0.lock().clone(),
            vec![
                (Event::Replace, 2),
                (Event::Evict, 1),
                (Event::Remove, 2),
                (Event::Evict, 3),
                (Event::Reclaim, 4),
                (Event::Clear, 5),
            ]
        );
    }

    #[test_log::test]
    fn test_concurrent_access() {
        const THREADS: u64 = 8;
        const CAPACITY: usize = 32;

        let cache = CacheBuilder::new(CAPACITY).build();
        let handles = (0..THREADS)
            .map(|t| {
                let cache = cache.clone();
                thread::spawn(move || {
                    let mut rng = SmallRng::seed_from_u64(t);
                    for _ in 0..5_000 {
                        let key = rng.random_range(0..128u64);
                        match rng.random_range(0..10) {
                            0..5 => {
                                cache.insert(key, key * 10);
                            }
                            5..9 => {
                                if let Some(entry) = cache.get(&key) {
                                    assert_eq!(*entry, key * 10);
                                }
                            }
                            _ => {
                                cache.invalidate(&key);
                            }
                        }
                        assert!(cache.len() <= CAPACITY);
                    }
                })
            })
            .collect_vec();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(cache.len() <= CAPACITY);
    }
}
