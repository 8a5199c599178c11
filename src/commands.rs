use std::sync::{Arc, Mutex};

use crate::error::GenerationError;
use crate::registry;
use crate::session::SessionStore;
use crate::types::{GenerationParams, GenerationResult};

/// Settings dialog "save": store the URL if it changed, then reconnect.
pub async fn save_server_settings(store: &SessionStore, url: &str) -> bool {
    let url = url.trim();
    if url != store.server_url() {
        store.set_server_url(url);
    }
    store.connect().await
}

/// Runs generations against the session's backend and holds the result on display.
#[derive(Clone)]
pub struct GenerationWorkflow {
    store: SessionStore,
    current: Arc<Mutex<Option<GenerationResult>>>,
}

impl GenerationWorkflow {
    pub fn new(store: SessionStore) -> Self {
        Self {
            store,
            current: Arc::new(Mutex::new(None)),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Whether the generate trigger should be enabled.
    pub fn can_generate(&self, prompt: &str) -> bool {
        !prompt.trim().is_empty() && !self.store.is_generating()
    }

    pub fn current_result(&self) -> Option<GenerationResult> {
        self.current.lock().ok().and_then(|current| current.clone())
    }

    /// One backend call bracketed by begin/end generation. A failure leaves the
    /// current result as it was. Only one generation runs at a time, so a result
    /// always belongs to the latest request.
    pub async fn generate(&self, params: GenerationParams) -> Result<GenerationResult, GenerationError> {
        params.validate()?;
        if registry::find_model(&params.model).is_none() {
            return Err(GenerationError::InvalidParams(format!("unknown model {}", params.model)));
        }
        if registry::find_sampler(&params.sampler).is_none() {
            return Err(GenerationError::InvalidParams(format!("unknown sampler {}", params.sampler)));
        }
        let Some(generating) = self.store.try_begin_generation() else {
            return Err(GenerationError::Busy);
        };

        let request = params.with_effective_seed();
        tracing::info!(
            "Generating {} image(s) with model={} sampler={} seed={:?}",
            request.batch_size,
            request.model,
            request.sampler,
            request.seed
        );
        if request.batch_count > 1 {
            tracing::debug!("batchCount={} accepted; a single batch is produced", request.batch_count);
        }

        let started_at = std::time::Instant::now();
        let outcome = self.store.backend().generate(&request).await;
        drop(generating);

        match outcome {
            Ok(mut result) => {
                result.params = request;
                tracing::info!(
                    "Generation {} finished with {} image(s) durationMs={}",
                    result.id,
                    result.images.len(),
                    started_at.elapsed().as_millis()
                );
                if let Ok(mut current) = self.current.lock() {
                    *current = Some(result.clone());
                }
                Ok(result)
            }
            Err(error) => {
                tracing::error!("Generation failed: {}", error);
                Err(error)
            }
        }
    }
}
