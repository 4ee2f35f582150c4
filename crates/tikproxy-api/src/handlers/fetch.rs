//! Fetch endpoint: enqueue a locator and wait for the pipeline outcome.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use tikproxy_queue::{FetchError, QueueError};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FetchParams {
    pub url: Option<String>,
}

/// Fetch response.
#[derive(Debug, Serialize)]
pub struct FetchResponse {
    #[serde(rename = "videoURL")]
    pub video_url: String,
}

/// Fetch a TikTok video: enqueue the locator and block until the
/// pipeline delivers an outcome. The response carries the public URL
/// the encoded artifact is served from.
pub async fn fetch_tiktok(
    State(state): State<AppState>,
    Query(params): Query<FetchParams>,
) -> ApiResult<Json<FetchResponse>> {
    // An empty `url=` counts as missing
    let locator = params
        .url
        .filter(|u| !u.is_empty())
        .ok_or(ApiError::MissingUrl)?;

    info!(locator = %locator, "Fetch request received");

    let outcome_rx = state.queue.submit(&locator)?;
    metrics::record_job_enqueued();
    metrics::set_queue_depth(state.queue.pending() as u64);

    // The submitter end of the oneshot only drops if the executor died
    let outcome = outcome_rx
        .await
        .map_err(|_| ApiError::Queue(QueueError::ResponseDropped))?;

    match outcome {
        Ok(success) => {
            metrics::record_job_completed();
            let video_url = format!(
                "{}/tiktok-proxy/{}",
                state.config.public_base_url.trim_end_matches('/'),
                success.encoded_file_name
            );
            info!(video_id = %success.video_id, url = %video_url, "Fetch request served");
            Ok(Json(FetchResponse { video_url }))
        }
        Err(err) => {
            metrics::record_job_failed(failure_stage(&err));
            warn!(locator = %locator, error = %err, "Fetch request failed");
            Err(err.into())
        }
    }
}

/// Metric label for the stage a fetch failed in.
fn failure_stage(err: &FetchError) -> &'static str {
    match err {
        FetchError::MalformedLocator(_) => "validate",
        FetchError::DownloadFailed(_) => "download",
        FetchError::TranscodeFailed(_) => "transcode",
        FetchError::ProbeFailed(_) => "probe",
        FetchError::ArtifactMissing => "deliver",
    }
}
