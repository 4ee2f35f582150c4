//! Artifact layout and lifecycle under the storage root.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, warn};

use tikproxy_models::VideoId;

use crate::error::{StoreError, StoreResult};

/// Artifact role within a fetch job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// As downloaded by yt-dlp, before transcoding
    Raw,
    /// Transcoded H.264/AAC output, the file that gets served
    Encoded,
}

impl ArtifactKind {
    /// File name for this artifact of the given video.
    pub fn file_name(&self, id: &VideoId) -> String {
        match self {
            ArtifactKind::Raw => format!("{id}.mp4"),
            ArtifactKind::Encoded => format!("{id}-encoded.mp4"),
        }
    }
}

/// Store rooted at a single storage directory.
///
/// Every path is derived from a video ID and a role; nothing else lands
/// under the root, which is what makes it safe to serve statically.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a store over `root`. The directory is not touched until
    /// [`ensure_root`](Self::ensure_root) runs.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Storage root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the storage root if it does not exist yet.
    pub async fn ensure_root(&self) -> StoreResult<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root)
                .await
                .map_err(|source| StoreError::CreateRoot {
                    path: self.root.clone(),
                    source,
                })?;
            debug!(root = %self.root.display(), "Created storage root");
        }
        Ok(())
    }

    /// Path of the given artifact for `id`.
    pub fn path_for(&self, id: &VideoId, kind: ArtifactKind) -> PathBuf {
        self.root.join(kind.file_name(id))
    }

    /// Whether a file exists at `path`.
    pub fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    /// Remove a file, treating "already gone" as success.
    pub async fn remove_if_exists(&self, path: &Path) -> StoreResult<()> {
        match fs::remove_file(path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Removed artifact");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::from(e)),
        }
    }

    /// Remove both artifacts of `id`, logging and swallowing failures.
    ///
    /// Runs before every download so a re-requested ID starts from a clean
    /// slate instead of a stale or half-written file.
    pub async fn clear_artifacts(&self, id: &VideoId) {
        for kind in [ArtifactKind::Raw, ArtifactKind::Encoded] {
            let path = self.path_for(id, kind);
            if let Err(e) = self.remove_if_exists(&path).await {
                warn!(path = %path.display(), error = %e, "Failed to clear stale artifact");
            }
        }
    }

    /// Sleep `delay`, then best-effort delete `path`.
    ///
    /// Deletion failure is logged and swallowed. The caller awaits this
    /// (the wait is part of a job's lifecycle) and may race it against a
    /// shutdown signal.
    pub async fn remove_after(&self, path: &Path, delay: Duration) {
        tokio::time::sleep(delay).await;
        match self.remove_if_exists(path).await {
            Ok(()) => debug!(path = %path.display(), "Expired artifact removed"),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to remove expired artifact")
            }
        }
    }
}
