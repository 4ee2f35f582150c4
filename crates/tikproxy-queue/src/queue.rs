//! Single-lane job queue: submit handle and executor.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info};

use crate::error::{QueueError, QueueResult};
use crate::job::{FetchJob, FetchResult};

/// Processes one job to completion.
///
/// `process` must not return until the job's full lifecycle is finished;
/// the executor takes the next job only after it returns. `cancel` flips
/// to `true` on shutdown so long waits inside a job can be abandoned.
#[async_trait]
pub trait JobProcessor: Send + Sync {
    async fn process(&self, job: FetchJob, cancel: watch::Receiver<bool>);
}

/// Counters shared between the submit handle and the executor.
#[derive(Debug, Default)]
struct QueueStats {
    pending: AtomicUsize,
    active: AtomicBool,
}

/// Submit handle for the fetch queue.
///
/// Cheap to clone; all clones feed the same executor. Dropping every
/// clone lets the executor drain what was submitted and stop.
#[derive(Clone)]
pub struct JobQueue {
    tx: mpsc::UnboundedSender<FetchJob>,
    shutdown: Arc<watch::Sender<bool>>,
    stats: Arc<QueueStats>,
}

/// Single-consumer executor that drains the fetch queue.
pub struct JobExecutor {
    rx: mpsc::UnboundedReceiver<FetchJob>,
    processor: Arc<dyn JobProcessor>,
    shutdown_rx: watch::Receiver<bool>,
    stats: Arc<QueueStats>,
}

impl JobQueue {
    /// Create the queue and its executor.
    ///
    /// The executor must be driven (`tokio::spawn(executor.run())`) for
    /// submissions to make progress.
    pub fn new(processor: Arc<dyn JobProcessor>) -> (Self, JobExecutor) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (shutdown, shutdown_rx) = watch::channel(false);
        let stats = Arc::new(QueueStats::default());

        let queue = Self {
            tx,
            shutdown: Arc::new(shutdown),
            stats: Arc::clone(&stats),
        };
        let executor = JobExecutor {
            rx,
            processor,
            shutdown_rx,
            stats,
        };
        (queue, executor)
    }

    /// Submit a locator for fetching. Non-blocking; admission is
    /// unbounded.
    ///
    /// Returns the receiver on which the job's outcome arrives once its
    /// turn in the lane completes.
    pub fn submit(&self, locator: impl Into<String>) -> QueueResult<oneshot::Receiver<FetchResult>> {
        let (result_tx, result_rx) = oneshot::channel();
        let job = FetchJob::new(locator, result_tx);
        let job_id = job.job_id.clone();

        self.tx.send(job).map_err(|_| QueueError::Closed)?;

        let depth = self.stats.pending.fetch_add(1, Ordering::SeqCst) + 1;
        info!(job_id = %job_id, depth = depth, "Enqueued fetch job");

        Ok(result_rx)
    }

    /// Jobs submitted but not yet picked up by the executor.
    pub fn pending(&self) -> usize {
        self.stats.pending.load(Ordering::SeqCst)
    }

    /// Whether a job is currently being processed.
    pub fn is_active(&self) -> bool {
        self.stats.active.load(Ordering::SeqCst)
    }

    /// Signal the executor to stop after the current job.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }
}

impl JobExecutor {
    /// Drain the queue until shutdown or until every submit handle is
    /// dropped and the backlog is empty.
    ///
    /// Strict FIFO, one job at a time: the next job is taken only after
    /// the processor returns, which for successful jobs includes the
    /// post-delivery expiry wait.
    pub async fn run(self) {
        let JobExecutor {
            mut rx,
            processor,
            mut shutdown_rx,
            stats,
        } = self;

        info!("Fetch queue executor started");

        // Once the shutdown sender is gone (all queue handles dropped),
        // stop polling it and finish the backlog via recv alone.
        let mut watch_alive = true;

        loop {
            let job = tokio::select! {
                changed = shutdown_rx.changed(), if watch_alive => {
                    match changed {
                        Ok(()) => {
                            if *shutdown_rx.borrow() {
                                info!("Shutdown signal received, stopping executor");
                                break;
                            }
                            continue;
                        }
                        Err(_) => {
                            watch_alive = false;
                            continue;
                        }
                    }
                }
                next = rx.recv() => match next {
                    Some(job) => job,
                    None => {
                        debug!("All submit handles dropped, stopping executor");
                        break;
                    }
                },
            };

            stats.pending.fetch_sub(1, Ordering::SeqCst);
            stats.active.store(true, Ordering::SeqCst);

            let job_id = job.job_id.clone();
            debug!(job_id = %job_id, "Job started");

            processor.process(job, shutdown_rx.clone()).await;

            stats.active.store(false, Ordering::SeqCst);
            debug!(job_id = %job_id, "Job finished, lane free");
        }

        info!("Fetch queue executor stopped");
    }
}
