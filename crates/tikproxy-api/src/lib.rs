//! Axum HTTP API server.
//!
//! This crate provides:
//! - The `/fetch-tiktok` endpoint that drives the fetch queue
//! - Static delivery of encoded artifacts under `/tiktok-proxy`
//! - Health/readiness probes and Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
