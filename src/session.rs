use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::backends::ComfyBackend;
use crate::library::ModelLibrary;
use crate::settings::{load_server_url, SettingsStore, SERVER_URL_KEY};
use crate::types::{GenerationType, Model, SessionState};

/// Connection and generation state shared by every consumer.
///
/// Built once at startup and handed out by clone; all clones share the same state.
/// Operations never return backend errors: failures land in `connection_error`
/// or in a `false` return.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<Mutex<SessionState>>,
    library: Arc<Mutex<ModelLibrary>>,
    settings: Arc<dyn SettingsStore>,
    backend: Arc<dyn ComfyBackend>,
    connect_seq: Arc<AtomicU64>,
}

impl SessionStore {
    pub fn new(settings: Arc<dyn SettingsStore>, backend: Arc<dyn ComfyBackend>, dark_mode: bool) -> Self {
        let server_url = load_server_url(settings.as_ref());
        Self {
            state: Arc::new(Mutex::new(SessionState::new(server_url, dark_mode))),
            library: Arc::new(Mutex::new(ModelLibrary::new())),
            settings,
            backend,
            connect_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn lock_library(&self) -> MutexGuard<'_, ModelLibrary> {
        match self.library.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.lock_state().clone()
    }

    pub fn server_url(&self) -> String {
        self.lock_state().server_url.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.lock_state().is_connected
    }

    pub fn is_generating(&self) -> bool {
        self.lock_state().is_generating
    }

    pub fn backend(&self) -> Arc<dyn ComfyBackend> {
        self.backend.clone()
    }

    /// Persists and stores the trimmed URL without reconnecting. Returns whether
    /// the value reached durable storage; state is updated either way.
    pub fn set_server_url(&self, url: &str) -> bool {
        let url = url.trim().to_string();
        let persisted = match self.settings.set(SERVER_URL_KEY, &url) {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!("Failed to persist server URL {}: {}", url, error);
                false
            }
        };
        self.lock_state().server_url = url;
        persisted
    }

    /// Checks the server at the current URL. Only the most recently issued call
    /// may write its outcome; older responses are dropped on arrival.
    pub async fn connect(&self) -> bool {
        let ticket = self.connect_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let url = {
            let mut state = self.lock_state();
            state.is_connected = false;
            state.connection_error = None;
            state.server_url.clone()
        };
        tracing::info!("Connecting to ComfyUI server at {}", url);

        let result = self.backend.check_status(&url).await;

        let mut state = self.lock_state();
        if self.connect_seq.load(Ordering::SeqCst) != ticket {
            tracing::debug!("Discarding stale status response for {} (attempt {})", url, ticket);
            return result.is_ok();
        }
        match result {
            Ok(()) => {
                state.is_connected = true;
                state.connection_error = None;
                tracing::info!("Connected to ComfyUI server at {}", url);
                true
            }
            Err(error) => {
                let message = error.to_string();
                tracing::warn!("Connection failed: {}", message);
                state.is_connected = false;
                state.connection_error = Some(message);
                false
            }
        }
    }

    pub fn toggle_dark_mode(&self) -> bool {
        let mut state = self.lock_state();
        state.dark_mode = !state.dark_mode;
        state.dark_mode
    }

    pub fn set_generation_type(&self, generation_type: GenerationType) {
        self.lock_state().generation_type = generation_type;
    }

    pub fn begin_generation(&self) {
        self.lock_state().is_generating = true;
    }

    pub fn end_generation(&self) {
        self.lock_state().is_generating = false;
    }

    /// Sets `is_generating` unless it is already set. The flag is cleared when the
    /// returned guard drops, including when the owning future is cancelled.
    pub fn try_begin_generation(&self) -> Option<GenerationGuard> {
        let mut state = self.lock_state();
        if state.is_generating {
            return None;
        }
        state.is_generating = true;
        Some(GenerationGuard { store: self.clone() })
    }

    pub fn add_recent(&self, model: Model) {
        self.lock_library().add_recent(model);
    }

    /// Returns the model's favorite membership after the toggle.
    pub fn toggle_favorite(&self, model_id: &str) -> bool {
        self.lock_library().toggle_favorite(model_id)
    }

    pub fn recent_models(&self) -> Vec<Model> {
        self.lock_library().recent()
    }

    pub fn favorite_models(&self) -> Vec<Model> {
        self.lock_library().favorites()
    }
}

#[must_use = "dropping the guard ends the generation"]
pub struct GenerationGuard {
    store: SessionStore,
}

impl Drop for GenerationGuard {
    fn drop(&mut self) {
        self.store.end_generation();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::StubBackend;
    use crate::error::{ConnectionError, GenerationError};
    use crate::registry;
    use crate::settings::{MemorySettings, DEFAULT_SERVER_URL};
    use crate::types::{GenerationParams, GenerationResult};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Answers status checks from a script of (delay, outcome) pairs.
    struct ScriptedBackend {
        script: Mutex<VecDeque<(Duration, bool)>>,
        calls: AtomicUsize,
    }

    impl ScriptedBackend {
        fn new(script: Vec<(Duration, bool)>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ComfyBackend for ScriptedBackend {
        async fn check_status(&self, url: &str) -> Result<(), ConnectionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let step = self.script.lock().unwrap().pop_front();
            let (delay, ok) = step.unwrap_or((Duration::ZERO, true));
            tokio::time::sleep(delay).await;
            if ok {
                Ok(())
            } else {
                Err(ConnectionError::Transport {
                    url: url.to_string(),
                    message: "connection refused".to_string(),
                })
            }
        }

        async fn generate(&self, _params: &GenerationParams) -> Result<GenerationResult, GenerationError> {
            Err(GenerationError::Backend("not scripted".to_string()))
        }
    }

    fn store_with(backend: Arc<dyn ComfyBackend>) -> SessionStore {
        SessionStore::new(Arc::new(MemorySettings::new()), backend, true)
    }

    #[test]
    fn starts_from_persisted_url() {
        let settings = Arc::new(MemorySettings::new());
        settings.set(SERVER_URL_KEY, "http://saved:8188").unwrap();
        let store = SessionStore::new(settings, Arc::new(StubBackend::default()), false);
        let state = store.snapshot();
        assert_eq!(state.server_url, "http://saved:8188");
        assert!(!state.dark_mode);
        assert!(!state.is_connected);
        assert_eq!(state.generation_type, GenerationType::TextToImage);
    }

    #[test]
    fn set_server_url_persists_without_connecting() {
        let backend = ScriptedBackend::new(vec![]);
        let settings = Arc::new(MemorySettings::new());
        let store = SessionStore::new(settings.clone(), backend.clone(), true);
        assert_eq!(store.server_url(), DEFAULT_SERVER_URL);

        assert!(store.set_server_url("  http://gpu:8188 "));
        assert_eq!(store.server_url(), "http://gpu:8188");
        assert_eq!(settings.get(SERVER_URL_KEY).unwrap().as_deref(), Some("http://gpu:8188"));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn connect_success_sets_connected() {
        let store = store_with(ScriptedBackend::new(vec![(Duration::ZERO, true)]));
        assert!(store.connect().await);
        let state = store.snapshot();
        assert!(state.is_connected);
        assert_eq!(state.connection_error, None);
    }

    #[tokio::test]
    async fn connect_failure_records_error() {
        let store = store_with(ScriptedBackend::new(vec![(Duration::ZERO, false)]));
        store.set_server_url("http://example.invalid");
        assert!(!store.connect().await);
        let state = store.snapshot();
        assert!(!state.is_connected);
        let message = state.connection_error.unwrap();
        assert!(message.contains("http://example.invalid"));
    }

    #[tokio::test]
    async fn connect_clears_previous_state_while_pending() {
        let backend = ScriptedBackend::new(vec![
            (Duration::ZERO, false),
            (Duration::from_millis(200), true),
        ]);
        let store = store_with(backend);
        assert!(!store.connect().await);
        assert!(store.snapshot().connection_error.is_some());

        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.connect().await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        let state = store.snapshot();
        assert!(!state.is_connected);
        assert_eq!(state.connection_error, None);

        // Unrelated operations run while the check is outstanding.
        assert!(!store.toggle_dark_mode());

        assert!(pending.await.unwrap());
        assert!(store.is_connected());
    }

    #[tokio::test]
    async fn stale_response_is_discarded() {
        let backend = ScriptedBackend::new(vec![
            (Duration::from_millis(300), false),
            (Duration::from_millis(10), true),
        ]);
        let store = store_with(backend);

        let first = tokio::spawn({
            let store = store.clone();
            async move { store.connect().await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(store.connect().await);

        assert!(!first.await.unwrap());
        let state = store.snapshot();
        assert!(state.is_connected);
        assert_eq!(state.connection_error, None);
    }

    #[test]
    fn dark_mode_and_generation_type() {
        let store = store_with(Arc::new(StubBackend::default()));
        assert!(!store.toggle_dark_mode());
        assert!(store.toggle_dark_mode());
        store.set_generation_type(GenerationType::ImageToVideo);
        assert_eq!(store.snapshot().generation_type, GenerationType::ImageToVideo);
    }

    #[test]
    fn generation_flag_brackets() {
        let store = store_with(Arc::new(StubBackend::default()));
        store.begin_generation();
        assert!(store.is_generating());
        assert!(store.try_begin_generation().is_none());
        store.end_generation();

        let guard = store.try_begin_generation();
        assert!(guard.is_some());
        assert!(store.is_generating());
        drop(guard);
        assert!(!store.is_generating());
    }

    #[test]
    fn favorites_follow_recent_models() {
        let store = store_with(Arc::new(StubBackend::default()));
        let m1 = registry::find_model("model2").unwrap();

        assert!(!store.toggle_favorite("model2"));
        assert!(store.favorite_models().is_empty());

        store.add_recent(m1.clone());
        assert!(store.toggle_favorite("model2"));
        store.add_recent(m1);

        let recent = store.recent_models();
        assert_eq!(recent.len(), 1);
        assert!(recent[0].is_favorite);
        assert_eq!(store.favorite_models()[0].id, "model2");
    }

    #[test]
    fn clones_share_state() {
        let store = store_with(Arc::new(StubBackend::default()));
        let other = store.clone();
        other.set_generation_type(GenerationType::Inpainting);
        assert_eq!(store.snapshot().generation_type, GenerationType::Inpainting);
    }
}
