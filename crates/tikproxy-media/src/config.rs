//! Tool configuration for the external media binaries.

/// Program names (or paths) for the three tools the pipeline invokes.
///
/// Defaults resolve through PATH. Deployments pin absolute paths via the
/// `*_BIN` environment variables; tests substitute stub executables the
/// same way.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// yt-dlp program name or path
    pub ytdlp_program: String,
    /// ffmpeg program name or path
    pub ffmpeg_program: String,
    /// ffprobe program name or path
    pub ffprobe_program: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ytdlp_program: "yt-dlp".to_string(),
            ffmpeg_program: "ffmpeg".to_string(),
            ffprobe_program: "ffprobe".to_string(),
        }
    }
}

impl MediaConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ytdlp_program: std::env::var("YTDLP_BIN").unwrap_or(defaults.ytdlp_program),
            ffmpeg_program: std::env::var("FFMPEG_BIN").unwrap_or(defaults.ffmpeg_program),
            ffprobe_program: std::env::var("FFPROBE_BIN").unwrap_or(defaults.ffprobe_program),
        }
    }
}
