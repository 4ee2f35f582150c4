//! Video download using yt-dlp.

use std::path::Path;
use tracing::{debug, info};

use crate::command::{check_ytdlp, run_command};
use crate::config::MediaConfig;
use crate::error::{MediaError, MediaResult};

/// Download a video to `output_path` using yt-dlp.
///
/// The invocation is deliberately minimal: `yt-dlp -o <output> <url>`.
/// Format selection stays with yt-dlp; the transcode stage normalizes
/// codecs afterwards, so there is no point pinning formats here.
///
/// # Returns
///
/// - `Ok(())` if the download succeeded and the output file exists
/// - `Err(MediaError)` on spawn failure, non-zero exit, or missing output
pub async fn download_video(
    config: &MediaConfig,
    url: &str,
    output_path: impl AsRef<Path>,
) -> MediaResult<()> {
    let output_path = output_path.as_ref();

    check_ytdlp(config)?;

    info!(url = %url, output = %output_path.display(), "Downloading video");

    let output_path_str = output_path.to_string_lossy();
    let output = run_command(
        &config.ytdlp_program,
        ["-o", output_path_str.as_ref(), url],
    )
    .await?;

    if !output.success {
        debug!("yt-dlp stderr: {}", output.stderr);
        return Err(MediaError::download_failed(format!(
            "yt-dlp failed: {}",
            output.last_stderr_line()
        )));
    }

    // Verify file was created
    if !output_path.exists() {
        return Err(MediaError::download_failed("Output file not created"));
    }

    let file_size = output_path.metadata()?.len();
    info!(
        output = %output_path.display(),
        size_mb = file_size as f64 / (1024.0 * 1024.0),
        "Downloaded video successfully"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn stub_tool(dir: &Path, name: &str, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_download_video_writes_output() {
        let dir = TempDir::new().unwrap();
        // yt-dlp is invoked as: -o <output> <url>
        let tool = stub_tool(dir.path(), "yt-dlp", "#!/bin/sh\ntouch \"$2\"\n");
        let config = MediaConfig {
            ytdlp_program: tool.display().to_string(),
            ..Default::default()
        };

        let out = dir.path().join("v.mp4");
        download_video(&config, "https://example.com/video/1", &out)
            .await
            .unwrap();
        assert!(out.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_download_video_nonzero_exit() {
        let dir = TempDir::new().unwrap();
        let tool = stub_tool(
            dir.path(),
            "yt-dlp",
            "#!/bin/sh\necho 'ERROR: no video formats' >&2\nexit 1\n",
        );
        let config = MediaConfig {
            ytdlp_program: tool.display().to_string(),
            ..Default::default()
        };

        let err = download_video(&config, "https://example.com/video/1", dir.path().join("v.mp4"))
            .await
            .unwrap_err();
        match err {
            MediaError::DownloadFailed { message } => {
                assert!(message.contains("no video formats"), "got: {message}");
            }
            other => panic!("expected DownloadFailed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_download_video_detects_missing_output() {
        let dir = TempDir::new().unwrap();
        // Exits zero without writing anything
        let tool = stub_tool(dir.path(), "yt-dlp", "#!/bin/sh\nexit 0\n");
        let config = MediaConfig {
            ytdlp_program: tool.display().to_string(),
            ..Default::default()
        };

        let err = download_video(&config, "https://example.com/video/1", dir.path().join("v.mp4"))
            .await
            .unwrap_err();
        match err {
            MediaError::DownloadFailed { message } => {
                assert!(message.contains("not created"), "got: {message}");
            }
            other => panic!("expected DownloadFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_download_video_tool_missing() {
        let config = MediaConfig {
            ytdlp_program: "/nonexistent/yt-dlp".to_string(),
            ..Default::default()
        };
        let err = download_video(&config, "https://example.com/video/1", "/tmp/never.mp4")
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::YtDlpNotFound));
    }
}
