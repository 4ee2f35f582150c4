//! Single-lane FIFO fetch queue.
//!
//! This crate provides:
//! - Non-blocking job submission with oneshot outcome delivery
//! - A single-consumer executor that serializes pipelines: at most one
//!   job is active, and the next starts only after the current job's
//!   full lifecycle ends (expiry wait included for successes)
//! - The fetch pipeline itself: validate, download, transcode, probe,
//!   deliver, expire

pub mod error;
pub mod job;
pub mod pipeline;
pub mod queue;

pub use error::{FetchError, QueueError, QueueResult};
pub use job::{FetchJob, FetchResult, FetchSuccess};
pub use pipeline::{Pipeline, PipelineConfig};
pub use queue::{JobExecutor, JobProcessor, JobQueue};
