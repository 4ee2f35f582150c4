//! Fetch pipeline: the stage machine executed once per job.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use tikproxy_media::{download_video, probe_duration, transcode_to_h264, MediaConfig};
use tikproxy_models::{extract_video_id, JobId};
use tikproxy_store::{ArtifactKind, ArtifactStore};

use crate::error::FetchError;
use crate::job::{FetchJob, FetchResult, FetchSuccess};
use crate::queue::JobProcessor;

/// Pipeline timing configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Delay between transcode completion and the delivery existence check
    pub settle_delay: Duration,
    /// Extra lifetime granted beyond the probed duration
    pub expiry_buffer: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(1),
            expiry_buffer: Duration::from_secs(1),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            settle_delay: Duration::from_millis(
                std::env::var("SETTLE_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.settle_delay.as_millis() as u64),
            ),
            expiry_buffer: Duration::from_millis(
                std::env::var("EXPIRY_BUFFER_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.expiry_buffer.as_millis() as u64),
            ),
        }
    }
}

/// The fetch pipeline: validate, download, transcode, probe, deliver,
/// expire.
///
/// One instance serves the whole queue; per-job state lives on the stack
/// of [`JobProcessor::process`]. Stages run strictly in order and a
/// failure in any fallible stage skips every later one.
pub struct Pipeline {
    store: ArtifactStore,
    media: MediaConfig,
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline over the given store and tool configuration.
    pub fn new(store: ArtifactStore, media: MediaConfig, config: PipelineConfig) -> Self {
        Self {
            store,
            media,
            config,
        }
    }

    /// Run the fallible stages, returning the classified outcome.
    async fn execute(&self, job_id: &JobId, locator: &str) -> FetchResult {
        // Validating: no process is ever spawned for a malformed locator
        let video_id = extract_video_id(locator)?;
        info!(job_id = %job_id, video_id = %video_id, "Locator validated");

        let raw_path = self.store.path_for(&video_id, ArtifactKind::Raw);
        let encoded_path = self.store.path_for(&video_id, ArtifactKind::Encoded);

        // A re-requested ID starts from a clean slate
        self.store.clear_artifacts(&video_id).await;

        // Downloading
        download_video(&self.media, locator, &raw_path)
            .await
            .map_err(|e| {
                error!(job_id = %job_id, error = %e, "Download failed");
                FetchError::download_failed(e.to_string())
            })?;

        // Transcoding
        transcode_to_h264(&self.media, &raw_path, &encoded_path)
            .await
            .map_err(|e| {
                error!(job_id = %job_id, error = %e, "Transcode failed");
                FetchError::transcode_failed(e.to_string())
            })?;

        // Probing
        let duration_secs = probe_duration(&self.media, &encoded_path)
            .await
            .map_err(|e| {
                error!(job_id = %job_id, error = %e, "Probe failed");
                FetchError::probe_failed(e.to_string())
            })?;

        // The raw download is no longer needed; losing it is not fatal
        if let Err(e) = self.store.remove_if_exists(&raw_path).await {
            warn!(job_id = %job_id, error = %e, "Failed to remove raw artifact");
        }

        // Delivering: give the encoder's writes a moment to settle, then
        // confirm the artifact is really on disk
        tokio::time::sleep(self.config.settle_delay).await;
        if !self.store.exists(&encoded_path) {
            error!(
                job_id = %job_id,
                path = %encoded_path.display(),
                "Encoded artifact missing after settle delay"
            );
            return Err(FetchError::ArtifactMissing);
        }

        Ok(FetchSuccess {
            encoded_file_name: ArtifactKind::Encoded.file_name(&video_id),
            video_id,
            duration_secs,
        })
    }

    /// Total time a delivered artifact stays on disk.
    fn expiry_delay(&self, duration_secs: f64) -> Duration {
        Duration::from_secs_f64(duration_secs.max(0.0)) + self.config.expiry_buffer
    }
}

#[async_trait]
impl JobProcessor for Pipeline {
    async fn process(&self, job: FetchJob, mut cancel: watch::Receiver<bool>) {
        let job_id = job.job_id.clone();
        info!(job_id = %job_id, locator = %job.locator, "Pipeline started");

        match self.execute(&job_id, &job.locator).await {
            Ok(success) => {
                let encoded_path = self.store.path_for(&success.video_id, ArtifactKind::Encoded);
                let delay = self.expiry_delay(success.duration_secs);

                info!(
                    job_id = %job_id,
                    file = %success.encoded_file_name,
                    duration_secs = success.duration_secs,
                    expiry_secs = delay.as_secs_f64(),
                    "Delivering fetch result"
                );
                if job.respond(Ok(success)).is_err() {
                    debug!(job_id = %job_id, "Submitter gone before delivery");
                }

                // AwaitingExpiry: hold the lane until the artifact is
                // reclaimed, unless shutdown interrupts the wait. An
                // interrupted wait leaves the file for the next
                // idempotency sweep.
                tokio::select! {
                    _ = self.store.remove_after(&encoded_path, delay) => {}
                    _ = wait_for_shutdown(&mut cancel) => {
                        debug!(job_id = %job_id, "Shutdown during expiry wait");
                    }
                }

                info!(job_id = %job_id, "Job done");
            }
            Err(err) => {
                warn!(job_id = %job_id, error = %err, "Pipeline failed");
                if job.respond(Err(err)).is_err() {
                    debug!(job_id = %job_id, "Submitter gone before failure delivery");
                }
                // Failed is terminal; the lane frees immediately
            }
        }
    }
}

/// Resolve once `rx` observes a true shutdown flag.
async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    while !*rx.borrow_and_update() {
        if rx.changed().await.is_err() {
            // Sender dropped without signaling shutdown; park so the
            // racing branch can finish
            std::future::pending::<()>().await;
        }
    }
}
