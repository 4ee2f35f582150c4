//! Application state.

use std::sync::Arc;

use tikproxy_media::MediaConfig;
use tikproxy_queue::{JobExecutor, JobQueue, Pipeline, PipelineConfig};
use tikproxy_store::ArtifactStore;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: ArtifactStore,
    pub queue: JobQueue,
}

impl AppState {
    /// Create new application state.
    ///
    /// Returns the state together with the queue executor; the caller
    /// must spawn [`JobExecutor::run`] or no job will ever be processed.
    pub async fn new(
        config: ApiConfig,
    ) -> Result<(Self, JobExecutor), Box<dyn std::error::Error>> {
        let store = ArtifactStore::new(&config.storage_dir);
        store.ensure_root().await?;

        let media = MediaConfig::from_env();
        let pipeline = Pipeline::new(store.clone(), media, PipelineConfig::from_env());
        let (queue, executor) = JobQueue::new(Arc::new(pipeline));

        Ok((
            Self {
                config,
                store,
                queue,
            },
            executor,
        ))
    }
}
