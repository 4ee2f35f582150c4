//! External tool orchestration: yt-dlp, ffmpeg, ffprobe.
//!
//! Everything here drives command-line tools through `tokio::process`;
//! nothing links against ffmpeg libraries. Invocations are argv-based,
//! never shell strings, and carry no retry or timeout policy of their own.

pub mod command;
pub mod config;
pub mod download;
pub mod error;
pub mod probe;
pub mod transcode;

pub use command::{check_ffmpeg, check_ffprobe, check_ytdlp, run_command, CommandOutput};
pub use config::MediaConfig;
pub use download::download_video;
pub use error::{MediaError, MediaResult};
pub use probe::probe_duration;
pub use transcode::{transcode_to_h264, FfmpegCommand};
