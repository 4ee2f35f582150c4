//! Async runner for external tool invocations.

use std::ffi::OsStr;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::config::MediaConfig;
use crate::error::{MediaError, MediaResult};

/// Captured result of a finished tool invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Whether the process exited with status zero
    pub success: bool,
    /// Raw exit code, if the process exited normally
    pub exit_code: Option<i32>,
    /// Captured stdout (lossy UTF-8)
    pub stdout: String,
    /// Captured stderr (lossy UTF-8)
    pub stderr: String,
}

impl CommandOutput {
    /// Last non-empty stderr line, which is where CLI tools usually put
    /// the actual failure reason.
    pub fn last_stderr_line(&self) -> &str {
        self.stderr
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("Unknown error")
    }
}

/// Run a program to completion, capturing stdout and stderr.
///
/// stdin is closed. A non-zero exit is reported through
/// [`CommandOutput::success`], not as `Err`; `Err` means the process could
/// not be spawned or awaited. No retry, no timeout.
pub async fn run_command<I, S>(program: impl AsRef<OsStr>, args: I) -> MediaResult<CommandOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let program = program.as_ref();

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    let result = CommandOutput {
        success: output.status.success(),
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    };

    if !result.success {
        debug!(
            program = ?program,
            exit_code = ?result.exit_code,
            "Command exited non-zero"
        );
    }

    Ok(result)
}

/// Verify the configured yt-dlp binary is available.
pub fn check_ytdlp(config: &MediaConfig) -> MediaResult<()> {
    which::which(&config.ytdlp_program).map_err(|_| MediaError::YtDlpNotFound)?;
    Ok(())
}

/// Verify the configured ffmpeg binary is available.
pub fn check_ffmpeg(config: &MediaConfig) -> MediaResult<()> {
    which::which(&config.ffmpeg_program).map_err(|_| MediaError::FfmpegNotFound)?;
    Ok(())
}

/// Verify the configured ffprobe binary is available.
pub fn check_ffprobe(config: &MediaConfig) -> MediaResult<()> {
    which::which(&config.ffprobe_program).map_err(|_| MediaError::FfprobeNotFound)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_stderr_line() {
        let output = CommandOutput {
            success: false,
            exit_code: Some(1),
            stdout: String::new(),
            stderr: "WARNING: something\nERROR: the real reason\n\n".to_string(),
        };
        assert_eq!(output.last_stderr_line(), "ERROR: the real reason");
    }

    #[test]
    fn test_last_stderr_line_empty() {
        let output = CommandOutput {
            success: false,
            exit_code: Some(1),
            stdout: String::new(),
            stderr: String::new(),
        };
        assert_eq!(output.last_stderr_line(), "Unknown error");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_command_captures_stdout() {
        let output = run_command("echo", ["hello"]).await.unwrap();
        assert!(output.success);
        assert_eq!(output.exit_code, Some(0));
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_command_nonzero_exit() {
        let output = run_command("sh", ["-c", "echo oops >&2; exit 3"]).await.unwrap();
        assert!(!output.success);
        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.last_stderr_line(), "oops");
    }

    #[tokio::test]
    async fn test_run_command_spawn_failure() {
        let result = run_command("definitely-not-a-real-binary-7f3a", ["x"]).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_check_tools_with_bogus_paths() {
        let config = MediaConfig {
            ytdlp_program: "/nonexistent/yt-dlp".to_string(),
            ffmpeg_program: "/nonexistent/ffmpeg".to_string(),
            ffprobe_program: "/nonexistent/ffprobe".to_string(),
        };
        assert!(matches!(check_ytdlp(&config), Err(MediaError::YtDlpNotFound)));
        assert!(matches!(check_ffmpeg(&config), Err(MediaError::FfmpegNotFound)));
        assert!(matches!(check_ffprobe(&config), Err(MediaError::FfprobeNotFound)));
    }
}
