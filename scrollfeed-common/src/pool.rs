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

use std::{num::NonZeroUsize, sync::Arc};

use tokio::sync::Semaphore;

use crate::{
    error::{Error, ErrorKind, Result},
    spawn::Spawner,
};

/// A bounded pool for blocking jobs.
///
/// At most `workers` jobs run at the same time; the rest wait in FIFO order for a permit.
/// Jobs never run on the submitting thread, so [`WorkerPool::execute`] is safe to call from
/// a latency-sensitive context.
#[derive(Debug)]
pub struct WorkerPool {
    name: String,
    workers: usize,
    permits: Arc<Semaphore>,
    spawner: Spawner,
}

impl WorkerPool {
    /// Create a pool backed by a dedicated runtime with `workers` blocking threads.
    pub fn new(name: impl Into<String>, workers: usize) -> Result<Self> {
        let name = name.into();
        if workers == 0 {
            return Err(Error::config("workers", workers, "worker pool needs at least one worker"));
        }
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(workers)
            .thread_name(format!("{name}-worker"))
            .build()?;
        tracing::info!("[worker pool]: {name} started with {workers} workers");
        Self::with_spawner(name, workers, runtime.into())
    }

    /// Create a pool that submits jobs to an existing runtime.
    ///
    /// The runtime's own blocking pool runs the jobs; the pool only bounds how many of them
    /// run at once.
    pub fn with_spawner(name: impl Into<String>, workers: usize, spawner: Spawner) -> Result<Self> {
        if workers == 0 {
            return Err(Error::config("workers", workers, "worker pool needs at least one worker"));
        }
        Ok(Self {
            name: name.into(),
            workers,
            permits: Arc::new(Semaphore::new(workers)),
            spawner,
        })
    }

    /// `max(2, available_parallelism / 2)`.
    pub fn default_workers() -> usize {
        let cpus = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        (cpus / 2).max(2)
    }

    /// Run `job` on the pool and hand its outcome to `done`.
    ///
    /// `done` runs on the worker side exactly once, unless the pool runtime is torn down
    /// while the job is still queued, in which case both are dropped. A job queued when
    /// [`WorkerPool::close`] is called is dropped and `done` receives [`ErrorKind::Closed`].
    /// A panicking job reports [`ErrorKind::Join`].
    pub fn execute<F, R, D>(&self, job: F, done: D)
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
        D: FnOnce(Result<R>) + Send + 'static,
    {
        let permits = self.permits.clone();
        self.spawner.spawn(async move {
            let permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    drop(job);
                    done(Err(Error::closed()));
                    return;
                }
            };
            let res = tokio::task::spawn_blocking(job)
                .await
                .map_err(|e| Error::new(ErrorKind::Join, "worker job did not complete").with_source(e));
            drop(permit);
            done(res);
        });
    }

    /// Stop accepting work. Queued jobs are dropped; running jobs finish.
    pub fn close(&self) {
        if !self.permits.is_closed() {
            tracing::debug!("[worker pool]: {} closed", self.name);
            self.permits.close();
        }
    }

    /// Whether [`WorkerPool::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }

    /// Maximum number of concurrently running jobs.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Pool name, used as the thread name prefix.
    pub fn name(&self) -> &str {
        &self.name
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

    fn is_send_sync_static<T: Send + Sync + 'static>() {}

    #[test]
    fn test_send_sync_static() {
        is_send_sync_static::<WorkerPool>();
    }

    #[test]
    fn test_zero_workers_rejected() {
        let err = WorkerPool::new("test", 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_default_workers_at_least_two() {
        assert!(WorkerPool::default_workers() >= 2);
    }

    #[test_log::test]
    fn test_concurrency_is_bounded() {
        const WORKERS: usize = 2;
        const JOBS: usize = 8;

        let pool = WorkerPool::new("bounded", WORKERS).unwrap();
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::channel();

        for i in 0..JOBS {
            let running = running.clone();
            let peak = peak.clone();
            let tx = tx.clone();
            pool.execute(
                move || {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(20));
                    running.fetch_sub(1, Ordering::SeqCst);
                    i
                },
                move |res| tx.send(res.unwrap()).unwrap(),
            );
        }

        let mut done = (0..JOBS)
            .map(|_| rx.recv_timeout(Duration::from_secs(10)).unwrap())
            .collect::<Vec<_>>();
        done.sort();
        assert_eq!(done, (0..JOBS).collect::<Vec<_>>());
        assert!(peak.load(Ordering::SeqCst) <= WORKERS);
    }

    #[test_log::test]
    fn test_close_drops_queued_jobs() {
        let pool = WorkerPool::new("close", 1).unwrap();
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let (done_tx, done_rx) = mpsc::channel();
        let queued_ran = Arc::new(AtomicUsize::new(0));

        let tx = done_tx.clone();
        pool.execute(
            move || {
                started_tx.send(()).unwrap();
                release_rx.recv().unwrap();
                "running"
            },
            move |res| tx.send(res.map_err(|e| e.kind())).unwrap(),
        );
        started_rx.recv_timeout(Duration::from_secs(10)).unwrap();

        let ran = queued_ran.clone();
        pool.execute(
            move || {
                ran.fetch_add(1, Ordering::SeqCst);
                "queued"
            },
            move |res| done_tx.send(res.map_err(|e| e.kind())).unwrap(),
        );

        pool.close();
        assert!(pool.is_closed());
        release_tx.send(()).unwrap();

        let mut results = (0..2)
            .map(|_| done_rx.recv_timeout(Duration::from_secs(10)).unwrap())
            .collect::<Vec<_>>();
        results.sort_by_key(|r| r.is_err());
        assert_eq!(results, vec![Ok("running"), Err(ErrorKind::Closed)]);
        assert_eq!(queued_ran.load(Ordering::SeqCst), 0);
    }

    #[test_log::test]
    fn test_panicking_job_reports_join_error() {
        let pool = WorkerPool::new("panic", 1).unwrap();
        let (tx, rx) = mpsc::channel();
        pool.execute(|| -> usize { panic!("decoder exploded") }, move |res| {
            tx.send(res.map_err(|e| e.kind())).unwrap()
        });
        assert_eq!(rx.recv_timeout(Duration::from_secs(10)).unwrap(), Err(ErrorKind::Join));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_pool_on_existing_runtime() {
        let pool = WorkerPool::with_spawner("handle", 1, Spawner::current()).unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel();
        pool.execute(|| 40 + 2, move |res| {
            let _ = tx.send(res.unwrap());
        });
        assert_eq!(rx.await.unwrap(), 42);
    }
}
