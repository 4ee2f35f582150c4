//! FFmpeg transcode to the widely-playable H.264/AAC pairing.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::command::{check_ffmpeg, run_command};
use crate::config::MediaConfig;
use crate::error::{MediaError, MediaResult};

/// Builder for FFmpeg invocations.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output file path
    output: PathBuf,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Add an output argument (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        // Overwrite flag
        if self.overwrite {
            args.push("-y".to_string());
        }

        // Log level
        args.push("-v".to_string());
        args.push(self.log_level.clone());

        // Input
        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        // Output args
        args.extend(self.output_args.clone());

        // Output
        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Transcode `input` to H.264 video with AAC audio at `output`.
///
/// Codec parameters are fixed: every served artifact gets the same
/// pairing regardless of what yt-dlp fetched.
pub async fn transcode_to_h264(
    config: &MediaConfig,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> MediaResult<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    if !input.exists() {
        return Err(MediaError::FileNotFound(input.to_path_buf()));
    }

    check_ffmpeg(config)?;

    let args = FfmpegCommand::new(input, output)
        .video_codec("libx264")
        .audio_codec("aac")
        .output_args(["-strict", "experimental"])
        .build_args();

    info!(
        input = %input.display(),
        output = %output.display(),
        "Transcoding video to H.264/AAC"
    );

    let result = run_command(&config.ffmpeg_program, &args).await?;

    if !result.success {
        debug!("ffmpeg stderr: {}", result.stderr);
        let message = format!("ffmpeg failed: {}", result.last_stderr_line());
        return Err(MediaError::ffmpeg_failed(
            message,
            Some(result.stderr),
            result.exit_code,
        ));
    }

    info!(output = %output.display(), "Transcode complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_command_builder() {
        let args = FfmpegCommand::new("/tmp/in.mp4", "/tmp/out.mp4")
            .video_codec("libx264")
            .audio_codec("aac")
            .output_args(["-strict", "experimental"])
            .build_args();

        assert!(args.contains(&"-y".to_string()));
        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"aac".to_string()));
        assert!(args.contains(&"-strict".to_string()));

        // Input follows -i, output path comes last
        let i_pos = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[i_pos + 1], "/tmp/in.mp4");
        assert_eq!(args.last().unwrap(), "/tmp/out.mp4");
    }

    #[test]
    fn test_command_builder_codec_arg_order() {
        let args = FfmpegCommand::new("in", "out")
            .video_codec("libx264")
            .audio_codec("aac")
            .build_args();

        let v_pos = args.iter().position(|a| a == "-c:v").unwrap();
        assert_eq!(args[v_pos + 1], "libx264");
        let a_pos = args.iter().position(|a| a == "-c:a").unwrap();
        assert_eq!(args[a_pos + 1], "aac");
    }

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
    async fn test_transcode_copies_through_stub() {
        let dir = TempDir::new().unwrap();
        // Args arrive as: -y -v error -i <in> -c:v libx264 -c:a aac -strict experimental <out>
        let tool = stub_tool(
            dir.path(),
            "ffmpeg",
            "#!/bin/sh\nin=$5\nfor out do :; done\ncp \"$in\" \"$out\"\n",
        );
        let config = MediaConfig {
            ffmpeg_program: tool.display().to_string(),
            ..Default::default()
        };

        let input = dir.path().join("raw.mp4");
        std::fs::write(&input, b"fake video bytes").unwrap();
        let output = dir.path().join("encoded.mp4");

        transcode_to_h264(&config, &input, &output).await.unwrap();
        assert_eq!(std::fs::read(&output).unwrap(), b"fake video bytes");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_transcode_nonzero_exit() {
        let dir = TempDir::new().unwrap();
        let tool = stub_tool(
            dir.path(),
            "ffmpeg",
            "#!/bin/sh\necho 'Invalid data found when processing input' >&2\nexit 1\n",
        );
        let config = MediaConfig {
            ffmpeg_program: tool.display().to_string(),
            ..Default::default()
        };

        let input = dir.path().join("raw.mp4");
        std::fs::write(&input, b"junk").unwrap();

        let err = transcode_to_h264(&config, &input, dir.path().join("encoded.mp4"))
            .await
            .unwrap_err();
        match err {
            MediaError::FfmpegFailed {
                message, exit_code, ..
            } => {
                assert!(message.contains("Invalid data"), "got: {message}");
                assert_eq!(exit_code, Some(1));
            }
            other => panic!("expected FfmpegFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transcode_missing_input() {
        let err = transcode_to_h264(
            &MediaConfig::default(),
            "/nonexistent/raw.mp4",
            "/tmp/out.mp4",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }
}
