//! Shared application state type.

use std::sync::Arc;

use tokio::sync::Mutex;

use voxflow_pipeline::PipelineConfig;

use crate::cache::SpeechCache;

/// Everything the handlers need: the backend configuration and the
/// utterance cache.
pub struct FacadeContext {
    /// Backend/pipeline configuration used for every request.
    pub pipeline: PipelineConfig,
    /// Cache of already-encoded utterances.
    pub cache: Mutex<SpeechCache>,
}

impl FacadeContext {
    #[must_use]
    pub fn new(pipeline: PipelineConfig) -> Self {
        Self {
            pipeline,
            cache: Mutex::new(SpeechCache::default()),
        }
    }
}

/// Application state shared across all handlers.
pub type AppState = Arc<FacadeContext>;
