//! Fetch job types.

use chrono::{DateTime, Utc};
use tokio::sync::oneshot;

use tikproxy_models::{JobId, VideoId};

use crate::error::FetchError;

/// Outcome delivered to the submitter of a fetch job.
pub type FetchResult = Result<FetchSuccess, FetchError>;

/// Successful fetch outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSuccess {
    /// Extracted video ID
    pub video_id: VideoId,
    /// File name of the encoded artifact under the storage root
    pub encoded_file_name: String,
    /// Probed duration of the encoded artifact, in seconds
    pub duration_secs: f64,
}

/// A queued fetch request.
///
/// Carries the oneshot responder the pipeline uses to deliver the
/// outcome. The sender is consumed by the single send, so a job cannot
/// be answered twice.
#[derive(Debug)]
pub struct FetchJob {
    /// Unique job ID for log correlation
    pub job_id: JobId,
    /// Raw locator as received from the client
    pub locator: String,
    /// When the job was submitted
    pub created_at: DateTime<Utc>,
    responder: oneshot::Sender<FetchResult>,
}

impl FetchJob {
    /// Create a new fetch job with its responder.
    pub fn new(locator: impl Into<String>, responder: oneshot::Sender<FetchResult>) -> Self {
        Self {
            job_id: JobId::new(),
            locator: locator.into(),
            created_at: Utc::now(),
            responder,
        }
    }

    /// Deliver the outcome, consuming the responder.
    ///
    /// Returns the outcome back as `Err` if the submitter stopped
    /// listening; the job's lifecycle continues regardless.
    pub fn respond(self, result: FetchResult) -> Result<(), FetchResult> {
        self.responder.send(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_respond_delivers_outcome() {
        let (tx, rx) = oneshot::channel();
        let job = FetchJob::new("https://example.com/video/1", tx);
        assert!(!job.job_id.as_str().is_empty());

        job.respond(Err(FetchError::download_failed("nope"))).unwrap();

        let outcome = rx.await.unwrap();
        assert!(matches!(outcome, Err(FetchError::DownloadFailed(_))));
    }

    #[tokio::test]
    async fn test_respond_to_dropped_submitter() {
        let (tx, rx) = oneshot::channel();
        let job = FetchJob::new("https://example.com/video/1", tx);
        drop(rx);

        let returned = job.respond(Err(FetchError::ArtifactMissing));
        assert!(matches!(returned, Err(Err(FetchError::ArtifactMissing))));
    }
}
