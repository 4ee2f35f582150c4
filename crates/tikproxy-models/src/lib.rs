//! Shared data models for the tikproxy backend.
//!
//! This crate provides the core domain types:
//! - Video identifiers extracted from TikTok locators
//! - Job identifiers for queue correlation
//! - Locator parsing

pub mod job;
pub mod locator;
pub mod video;

// Re-export common types
pub use job::JobId;
pub use locator::{extract_video_id, LocatorError, LocatorResult};
pub use video::VideoId;
