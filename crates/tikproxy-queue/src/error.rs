//! Queue and pipeline error types.

use thiserror::Error;

use tikproxy_models::LocatorError;

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// Errors from the queue machinery itself, as opposed to pipeline
/// failures, which travel as [`FetchError`] inside a job's outcome.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The executor is gone; nothing will ever consume submissions.
    #[error("Job queue has been shut down")]
    Closed,

    /// The processor dropped a job without delivering an outcome.
    #[error("Job was dropped before completion")]
    ResponseDropped,
}

/// Classified pipeline failure, delivered to the submitter.
///
/// Each variant maps to one fallible stage; a failure in stage N means
/// stages after N never ran.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid locator: {0}")]
    MalformedLocator(#[from] LocatorError),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Transcode failed: {0}")]
    TranscodeFailed(String),

    #[error("Probe failed: {0}")]
    ProbeFailed(String),

    #[error("Encoded artifact missing after transcode")]
    ArtifactMissing,
}

impl FetchError {
    pub fn download_failed(msg: impl Into<String>) -> Self {
        Self::DownloadFailed(msg.into())
    }

    pub fn transcode_failed(msg: impl Into<String>) -> Self {
        Self::TranscodeFailed(msg.into())
    }

    pub fn probe_failed(msg: impl Into<String>) -> Self {
        Self::ProbeFailed(msg.into())
    }
}
