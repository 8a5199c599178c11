mod backends;
mod commands;
mod config;
mod error;
mod library;
mod registry;
mod session;
mod settings;
mod stub;
mod types;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use backends::{status_endpoint, ComfyBackend, HttpBackend, StubBackend, STATUS_TIMEOUT};
pub use commands::{save_server_settings, GenerationWorkflow};
pub use config::AppConfig;
pub use error::{ConnectionError, GenerationError, SettingsError};
pub use library::{ModelLibrary, RECENT_CAPACITY};
pub use registry::{find_model, find_sampler, list_models, list_samplers};
pub use session::{GenerationGuard, SessionStore};
pub use settings::{
    load_server_url, JsonFileSettings, MemorySettings, SettingsStore, DEFAULT_SERVER_URL, SERVER_URL_KEY,
};
pub use types::{
    random_seed, GenerationParams, GenerationResult, GenerationType, Model, ModelId, ModelType, Sampler,
    SamplerId, SessionState,
};

/// Wires config, settings, backend and store together. Nothing here is global;
/// every consumer receives the store it was built with. An unusable settings file
/// is ignored and the default server URL is used.
pub fn build_workflow(config: &AppConfig) -> GenerationWorkflow {
    let settings: Arc<dyn SettingsStore> = Arc::new(JsonFileSettings::open(&config.settings_path));
    let backend: Arc<dyn ComfyBackend> = if config.offline {
        Arc::new(StubBackend::new(config.generate_delay))
    } else {
        Arc::new(HttpBackend::new(config.status_timeout, config.generate_delay))
    };
    let store = SessionStore::new(settings, backend, config.dark_mode);
    GenerationWorkflow::new(store)
}

/// Headless entry point: connect, report state, and optionally run one generation
/// for the prompt given as the first argument.
pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "comfy_studio_lib=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    let workflow = build_workflow(&config);
    let store = workflow.store();

    if !store.connect().await {
        tracing::warn!("Starting disconnected from {}", store.server_url());
    }
    println!("{}", serde_json::to_string_pretty(&store.snapshot())?);

    let Some(prompt) = std::env::args().nth(1) else {
        return Ok(());
    };
    if !workflow.can_generate(&prompt) {
        anyhow::bail!("Prompt is empty");
    }

    let params = GenerationParams {
        prompt,
        ..GenerationParams::default()
    };
    if let Some(model) = find_model(&params.model) {
        store.add_recent(model);
    }
    let result = workflow.generate(params).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
