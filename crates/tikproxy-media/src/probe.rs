//! FFprobe duration extraction.

use serde::Deserialize;
use std::path::Path;
use tracing::debug;

use crate::command::{check_ffprobe, run_command};
use crate::config::MediaConfig;
use crate::error::{MediaError, MediaResult};

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Probe a media file for its duration in seconds.
pub async fn probe_duration(config: &MediaConfig, path: impl AsRef<Path>) -> MediaResult<f64> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    check_ffprobe(config)?;

    let path_str = path.to_string_lossy();
    let output = run_command(
        &config.ffprobe_program,
        [
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            path_str.as_ref(),
        ],
    )
    .await?;

    if !output.success {
        return Err(MediaError::ffprobe_failed(
            "ffprobe exited non-zero",
            Some(output.stderr),
        ));
    }

    let duration = parse_duration(&output.stdout)?;
    debug!(path = %path.display(), duration_secs = duration, "Probed duration");
    Ok(duration)
}

/// Parse `format.duration` out of ffprobe's JSON output.
///
/// The field is string-encoded seconds. Absence is an error rather than a
/// zero default: the caller uses the duration to bound a served file's
/// lifetime.
fn parse_duration(json: &str) -> MediaResult<f64> {
    let probe: FfprobeOutput = serde_json::from_str(json)?;

    let raw = probe
        .format
        .duration
        .ok_or_else(|| MediaError::InvalidDuration("missing format.duration".to_string()))?;

    let secs = raw
        .parse::<f64>()
        .map_err(|_| MediaError::InvalidDuration(raw.clone()))?;

    if !secs.is_finite() || secs < 0.0 {
        return Err(MediaError::InvalidDuration(raw));
    }

    Ok(secs)
}
