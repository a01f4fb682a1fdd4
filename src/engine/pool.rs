//! Fixed-size pool of OS threads for training and inference.
//!
//! Jobs wait in a bounded queue; a full queue rejects the submission with
//! `Busy` instead of growing. Results come back over a oneshot channel, so
//! async callers suspend only while awaiting their own job. There is no
//! cancellation: a job runs to completion even if its caller stops waiting.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, SyncSender, TrySendError, sync_channel};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use tokio::sync::oneshot;

use crate::config::{DF, PoolConfig};
use crate::error::{ForecastError, Result};

type Job = Box<dyn FnOnce() + Send + 'static>;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking job is caught before it can poison anything, so a poisoned lock still holds valid data
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct WorkerPool {
    config: PoolConfig,
    sender: Mutex<Option<SyncSender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    in_flight: Arc<AtomicUsize>,
}

/// Pending result of a submitted job.
pub struct JobHandle<T> {
    label: String,
    rx: oneshot::Receiver<thread::Result<Result<T>>>,
}

impl<T> JobHandle<T> {
    /// Waits for the job. A panicking job surfaces as `ForecastFailure`.
    pub async fn wait(self) -> Result<T> {
        match self.rx.await {
            Ok(Ok(result)) => result,
            Ok(Err(payload)) => {
                let msg = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(ForecastError::failure(format!(
                    "job [{}] panicked: {}",
                    self.label, msg
                )))
            }
            Err(_) => Err(ForecastError::failure(format!(
                "job [{}] was dropped before completing",
                self.label
            ))),
        }
    }
}

fn worker_loop(id: usize, rx: Arc<Mutex<Receiver<Job>>>) {
    loop {
        // Hold the lock only while taking a job, not while running it
        let job = lock(&rx).recv();
        match job {
            Ok(job) => job(),
            Err(_) => break,
        }
    }
    log::debug!("forecast-worker-{} stopped", id);
}

impl WorkerPool {
    /// Spawns `config.workers` threads (at least one).
    pub fn start(config: PoolConfig) -> Result<Self> {
        let workers = config.workers.max(1);
        let (tx, rx) = sync_channel::<Job>(config.queue_capacity);
        let rx = Arc::new(Mutex::new(rx));

        let mut handles = Vec::with_capacity(workers);
        for id in 0..workers {
            let rx = Arc::clone(&rx);
            let handle = thread::Builder::new()
                .name(format!("forecast-worker-{}", id))
                .spawn(move || worker_loop(id, rx))
                .map_err(|e| ForecastError::failure(format!("cannot spawn worker {}: {}", id, e)))?;
            handles.push(handle);
        }
        log::info!(
            "worker pool started: {} workers, queue capacity {}",
            workers,
            config.queue_capacity
        );

        Ok(Self {
            config: PoolConfig { workers, ..config },
            sender: Mutex::new(Some(tx)),
            workers: Mutex::new(handles),
            in_flight: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn config(&self) -> PoolConfig {
        self.config
    }

    pub fn is_running(&self) -> bool {
        lock(&self.sender).is_some()
    }

    /// Jobs queued or running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Queues `work` without blocking. Fails with `Busy` when the queue is full or the pool is stopped.
    pub fn submit<T, F>(&self, label: impl Into<String>, work: F) -> Result<JobHandle<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let label = label.into();
        let (tx, rx) = oneshot::channel();
        let in_flight = Arc::clone(&self.in_flight);
        let job_label = label.clone();

        let job: Job = Box::new(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(work));
            in_flight.fetch_sub(1, Ordering::SeqCst);
            if DF.log_pool_jobs {
                log::info!("job [{}] finished", job_label);
            }
            // The caller may have stopped waiting
            let _ = tx.send(outcome);
        });

        let guard = lock(&self.sender);
        let Some(sender) = guard.as_ref() else {
            return Err(ForecastError::Busy("worker pool is shut down".into()));
        };

        self.in_flight.fetch_add(1, Ordering::SeqCst);
        match sender.try_send(job) {
            Ok(()) => {
                if DF.log_pool_jobs {
                    log::info!("job [{}] queued ({} in flight)", label, self.in_flight());
                }
                Ok(JobHandle { label, rx })
            }
            Err(e) => {
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                let reason = match e {
                    TrySendError::Full(_) => format!(
                        "worker queue is full ({} waiting), try again later",
                        self.config.queue_capacity
                    ),
                    TrySendError::Disconnected(_) => "worker pool is shut down".to_string(),
                };
                log::warn!("rejected job [{}]: {}", label, reason);
                Err(ForecastError::Busy(reason))
            }
        }
    }

    /// Stops accepting work, lets queued and running jobs finish, then joins every worker.
    /// Blocks the calling thread; idempotent.
    pub fn shutdown(&self) {
        let Some(sender) = lock(&self.sender).take() else {
            return;
        };
        drop(sender);

        let handles: Vec<_> = lock(&self.workers).drain(..).collect();
        let count = handles.len();
        for handle in handles {
            if handle.join().is_err() {
                log::error!("a worker thread panicked outside of a job");
            }
        }
        log::info!("worker pool drained, {} workers joined", count);
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    fn pool(workers: usize, queue_capacity: usize) -> WorkerPool {
        WorkerPool::start(PoolConfig {
            workers,
            queue_capacity,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn runs_jobs_and_returns_results() {
        let pool = pool(2, 8);
        let handles: Vec<_> = (0..4u64)
            .map(|i| pool.submit(format!("sq {}", i), move || Ok(i * i)).unwrap())
            .collect();
        let mut out = Vec::new();
        for h in handles {
            out.push(h.wait().await.unwrap());
        }
        assert_eq!(out, vec![0, 1, 4, 9]);
    }

    #[tokio::test]
    async fn job_errors_pass_through() {
        let pool = pool(1, 1);
        let h = pool
            .submit("bad", || -> Result<()> {
                Err(ForecastError::InvalidRequest("nope".into()))
            })
            .unwrap();
        assert!(matches!(h.wait().await, Err(ForecastError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn panics_become_failures_and_worker_survives() {
        let pool = pool(1, 2);
        let h = pool
            .submit("boom", || -> Result<()> { panic!("kaboom") })
            .unwrap();
        match h.wait().await {
            Err(ForecastError::ForecastFailure(msg)) => assert!(msg.contains("kaboom"), "{}", msg),
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
        let h = pool.submit("after", || Ok(5)).unwrap();
        assert_eq!(h.wait().await.unwrap(), 5);
    }

    #[test]
    fn full_queue_is_busy() {
        let pool = pool(1, 1);
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let _running = pool
            .submit("blocker", move || {
                started_tx.send(()).unwrap();
                release_rx.recv().unwrap();
                Ok(())
            })
            .unwrap();
        started_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        let _queued = pool.submit("queued", || Ok(())).unwrap();
        let err = pool.submit("rejected", || Ok(())).err().unwrap();
        assert!(matches!(err, ForecastError::Busy(_)));
        assert_eq!(pool.in_flight(), 2);

        release_tx.send(()).unwrap();
        pool.shutdown();
        assert_eq!(pool.in_flight(), 0);
    }

    #[test]
    fn shutdown_drains_queue_and_rejects_new_work() {
        let pool = pool(1, 16);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..10 {
            let c = Arc::clone(&counter);
            pool.submit("count", move || {
                std::thread::sleep(Duration::from_millis(2));
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();
        }
        pool.shutdown();
        assert_eq!(counter.load(Ordering::SeqCst), 10);
        assert!(!pool.is_running());
        assert!(matches!(
            pool.submit("late", || Ok(())),
            Err(ForecastError::Busy(_))
        ));
        // Idempotent
        pool.shutdown();
    }
}
