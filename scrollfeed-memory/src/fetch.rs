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

use std::{fmt::Debug, hash::Hash, sync::Arc};

use hashbrown::Equivalent;
use parking_lot::Mutex;
use scrollfeed_common::{
    code::{Key, Value},
    error::{Error, ErrorKind, Result},
    metrics::Metrics,
    pool::WorkerPool,
};

use crate::{
    cache::{CacheEntry, MediaCache},
    inflight::{Enqueue, InflightMap},
};

/// Outcome delivered to fetch listeners.
pub type FetchResult<K, V> = Result<CacheEntry<K, V>>;

/// Completion callback of a fetch. Runs on a worker thread.
pub type Listener<K, V> = Box<dyn FnOnce(FetchResult<K, V>) + Send + 'static>;

/// What [`FetchCoordinator::request`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// A new fetch was submitted to the worker pool.
    Started,
    /// The listener joined a fetch already in flight; the producer was dropped unused.
    Joined,
}

/// What [`FetchCoordinator::fetch`] did.
#[derive(Debug)]
pub enum Fetch<K, V> {
    /// The media was cached. The listener is not called.
    Hit(CacheEntry<K, V>),
    /// See [`Request::Started`].
    Started,
    /// See [`Request::Joined`].
    Joined,
}

impl<K, V> From<Request> for Fetch<K, V> {
    fn from(request: Request) -> Self {
        match request {
            Request::Started => Fetch::Started,
            Request::Joined => Fetch::Joined,
        }
    }
}

/// Deduplicates background fetch-and-decode work and publishes results into the media cache.
///
/// At most one fetch per key is in flight. Every listener registered for a key while its
/// fetch runs receives the same outcome, in registration order, on the worker thread that
/// ran the producer. A failed fetch leaves nothing behind, so the next request retries.
pub struct FetchCoordinator<K, V> {
    cache: MediaCache<K, V>,
    inflights: Arc<Mutex<InflightMap<K, Listener<K, V>>>>,
    pool: Arc<WorkerPool>,
    metrics: Arc<Metrics>,
}

impl<K, V> Clone for FetchCoordinator<K, V> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            inflights: self.inflights.clone(),
            pool: self.pool.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

impl<K, V> Debug for FetchCoordinator<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchCoordinator")
            .field("cache", &self.cache)
            .field("pool", &self.pool)
            .finish()
    }
}

impl<K, V> FetchCoordinator<K, V>
where
    K: Key,
    V: Value,
{
    /// Create a coordinator publishing into `cache` and running producers on `pool`.
    pub fn new(cache: MediaCache<K, V>, pool: Arc<WorkerPool>) -> Self {
        let metrics = cache.metrics().clone();
        Self {
            cache,
            inflights: Arc::new(Mutex::new(InflightMap::default())),
            pool,
            metrics,
        }
    }

    /// Request the media of `key`, joining an in-flight fetch if there is one.
    ///
    /// Otherwise `producer` runs on the worker pool. `Ok(Some(v))` is inserted into the cache
    /// and handed to every listener; `Ok(None)` is reported as [`ErrorKind::Empty`]. Never
    /// blocks the caller.
    pub fn request<F, L>(&self, key: K, producer: F, on_complete: L) -> Request
    where
        F: FnOnce() -> Result<Option<V>> + Send + 'static,
        L: FnOnce(FetchResult<K, V>) + Send + 'static,
    {
        if self.inflights.lock().enqueue(key.clone(), Box::new(on_complete)) == Enqueue::Wait {
            tracing::trace!("[fetch]: join in-flight fetch of {key:?}");
            self.metrics.fetch_join.increment(1);
            return Request::Joined;
        }

        tracing::debug!("[fetch]: start fetch of {key:?}");
        self.metrics.fetch_start.increment(1);

        let cache = self.cache.clone();
        let inflights = self.inflights.clone();
        let metrics = self.metrics.clone();
        self.pool.execute(producer, move |res| {
            let res = match res.and_then(|produced| produced) {
                Ok(Some(value)) => Ok(cache.insert(key.clone(), value)),
                Ok(None) => Err(Error::new(ErrorKind::Empty, "media producer returned nothing")
                    .with_context("key", format!("{key:?}"))),
                Err(e) => Err(e),
            };

            match &res {
                Ok(_) => metrics.fetch_ok.increment(1),
                Err(e) if e.kind() == ErrorKind::Closed => {
                    tracing::debug!("[fetch]: fetch of {key:?} dropped, worker pool closed");
                    metrics.fetch_drop.increment(1);
                }
                Err(e) => {
                    tracing::warn!("[fetch]: fetch of {key:?} failed: {e}");
                    metrics.fetch_err.increment(1);
                }
            }

            let listeners = inflights.lock().take(&key);
            for listener in listeners {
                listener(res.clone());
            }
        });

        Request::Started
    }

    /// Look `key` up in the cache and fall back to [`FetchCoordinator::request`] on a miss.
    pub fn fetch<F, L>(&self, key: K, producer: F, on_complete: L) -> Fetch<K, V>
    where
        F: FnOnce() -> Result<Option<V>> + Send + 'static,
        L: FnOnce(FetchResult<K, V>) + Send + 'static,
    {
        match self.cache.get(&key) {
            Some(entry) => Fetch::Hit(entry),
            None => self.request(key, producer, on_complete).into(),
        }
    }

    /// Whether a fetch for `key` is in flight.
    pub fn is_inflight<Q>(&self, key: &Q) -> bool
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.inflights.lock().contains(key)
    }

    /// Number of keys with a fetch in flight.
    pub fn inflight_count(&self) -> usize {
        self.inflights.lock().len()
    }

    /// The cache fetched media is published into.
    pub fn cache(&self) -> &MediaCache<K, V> {
        &self.cache
    }

    /// The worker pool producers run on.
    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// Close the worker pool. Fetches that have not started yet fail with [`ErrorKind::Closed`].
    pub fn close(&self) {
        self.pool.close();
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            mpsc,
        },
        time::Duration,
    };

    use super::*;
    use crate::cache::CacheBuilder;

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn is_send_sync_static<T: Send + Sync + 'static>() {}

    #[test]
    fn test_send_sync_static() {
        is_send_sync_static::<FetchCoordinator<String, Vec<u8>>>();
    }

    fn coordinator(workers: usize) -> FetchCoordinator<String, u64> {
        let cache = CacheBuilder::new(16).build();
        let pool = Arc::new(WorkerPool::new("fetch-test", workers).unwrap());
        FetchCoordinator::new(cache, pool)
    }

    type Outcome = std::result::Result<u64, ErrorKind>;

    fn sender(tx: &mpsc::Sender<Outcome>) -> impl FnOnce(FetchResult<String, u64>) + Send + 'static {
        let tx = tx.clone();
        move |res| tx.send(res.map(|e| *e).map_err(|e| e.kind())).unwrap()
    }

    #[test_log::test]
    fn test_concurrent_requests_deduplicated() {
        let fetcher = coordinator(2);
        let calls = Arc::new(AtomicUsize::new(0));
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let (tx, rx) = mpsc::channel();

        let c = calls.clone();
        let first = fetcher.request(
            "a".to_string(),
            move || {
                c.fetch_add(1, Ordering::SeqCst);
                release_rx.recv().unwrap();
                Ok(Some(7))
            },
            sender(&tx),
        );
        let c = calls.clone();
        let second = fetcher.request(
            "a".to_string(),
            move || {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(Some(8))
            },
            sender(&tx),
        );
        assert_eq!(first, Request::Started);
        assert_eq!(second, Request::Joined);
        assert!(fetcher.is_inflight("a"));
        assert_eq!(fetcher.inflight_count(), 1);

        release_tx.send(()).unwrap();
        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), Ok(7));
        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), Ok(7));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!fetcher.is_inflight("a"));
        assert_eq!(*fetcher.cache().get("a").unwrap(), 7);
    }

    #[test_log::test]
    fn test_fetch_hits_cache() {
        let fetcher = coordinator(2);
        fetcher.cache().insert("a".to_string(), 1);
        let res = fetcher.fetch(
            "a".to_string(),
            || -> Result<Option<u64>> { panic!("producer must not run on a hit") },
            |_| panic!("listener must not run on a hit"),
        );
        assert!(matches!(res, Fetch::Hit(entry) if *entry == 1));
    }

    #[test_log::test]
    fn test_failure_is_not_cached_and_retries() {
        let fetcher = coordinator(2);
        let (tx, rx) = mpsc::channel();

        let res = fetcher.fetch(
            "a".to_string(),
            || Err(Error::new(ErrorKind::Fetch, "connection reset")),
            sender(&tx),
        );
        assert!(matches!(res, Fetch::Started));
        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), Err(ErrorKind::Fetch));
        assert!(!fetcher.cache().contains("a"));
        assert!(!fetcher.is_inflight("a"));

        let res = fetcher.fetch("a".to_string(), || Ok(Some(3)), sender(&tx));
        assert!(matches!(res, Fetch::Started));
        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), Ok(3));
        assert!(fetcher.cache().contains("a"));
    }

    #[test_log::test]
    fn test_empty_result_is_failure() {
        let fetcher = coordinator(1);
        let (tx, rx) = mpsc::channel();
        fetcher.request("a".to_string(), || Ok(None), sender(&tx));
        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), Err(ErrorKind::Empty));
        assert!(fetcher.cache().is_empty());
    }

    #[test_log::test]
    fn test_panicking_producer() {
        let fetcher = coordinator(1);
        let (tx, rx) = mpsc::channel();
        fetcher.request(
            "a".to_string(),
            || -> Result<Option<u64>> { panic!("decoder exploded") },
            sender(&tx),
        );
        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), Err(ErrorKind::Join));
        assert_eq!(fetcher.inflight_count(), 0);
    }

    #[test_log::test]
    fn test_close_fails_queued_fetches() {
        let fetcher = coordinator(1);
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let (tx, rx) = mpsc::channel();

        fetcher.request(
            "running".to_string(),
            move || {
                started_tx.send(()).unwrap();
                release_rx.recv().unwrap();
                Ok(Some(1))
            },
            sender(&tx),
        );
        started_rx.recv_timeout(TIMEOUT).unwrap();
        fetcher.request("queued".to_string(), || Ok(Some(2)), sender(&tx));

        fetcher.close();
        release_tx.send(()).unwrap();

        let mut outcomes = (0..2).map(|_| rx.recv_timeout(TIMEOUT).unwrap()).collect::<Vec<_>>();
        outcomes.sort_by_key(|o| o.is_err());
        assert_eq!(outcomes, vec![Ok(1), Err(ErrorKind::Closed)]);
        assert!(!fetcher.cache().contains("queued"));
        assert_eq!(fetcher.inflight_count(), 0);
    }
}
