//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use tikproxy_queue::{FetchError, QueueError};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("URL query parameter is required")]
    MissingUrl,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Queue(#[from] QueueError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingUrl => StatusCode::BAD_REQUEST,
            ApiError::Fetch(FetchError::MalformedLocator(_)) => StatusCode::BAD_REQUEST,
            ApiError::Fetch(_) | ApiError::Queue(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing body. Stage detail stays in the logs; clients only
    /// learn which stage gave out.
    fn body_text(&self) -> &'static str {
        match self {
            ApiError::MissingUrl => "URL query parameter is required.",
            ApiError::Fetch(FetchError::MalformedLocator(_)) => "Invalid TikTok URL format.",
            ApiError::Fetch(FetchError::DownloadFailed(_)) => "Error downloading video.",
            ApiError::Fetch(FetchError::TranscodeFailed(_)) => "Error converting video.",
            ApiError::Fetch(FetchError::ProbeFailed(_)) => "Error probing video duration.",
            ApiError::Fetch(FetchError::ArtifactMissing) => {
                "Error: Video file not found after conversion."
            }
            ApiError::Queue(_) => "Error processing video.",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), self.body_text()).into_response()
    }
}
