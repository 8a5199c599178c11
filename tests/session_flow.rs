use std::time::Duration;

use comfy_studio_lib::{
    build_workflow, find_model, list_models, save_server_settings, AppConfig, GenerationParams,
    GenerationType, DEFAULT_SERVER_URL, RECENT_CAPACITY,
};

fn offline_config(dir: &tempfile::TempDir) -> AppConfig {
    AppConfig {
        settings_path: dir.path().join("settings.json"),
        status_timeout: Duration::from_millis(500),
        generate_delay: Duration::from_millis(10),
        offline: true,
        dark_mode: true,
    }
}

#[tokio::test]
async fn saved_url_is_restored_on_next_start() {
    let dir = tempfile::tempdir().unwrap();
    let config = offline_config(&dir);

    let workflow = build_workflow(&config);
    assert!(save_server_settings(workflow.store(), "http://studio-gpu:8188").await);

    let restarted = build_workflow(&config);
    assert_eq!(restarted.store().server_url(), "http://studio-gpu:8188");
    assert!(!restarted.store().is_connected());
}

#[tokio::test]
async fn corrupt_settings_file_starts_with_default_url() {
    let dir = tempfile::tempdir().unwrap();
    let config = offline_config(&dir);
    std::fs::write(&config.settings_path, "{ not json").unwrap();

    let workflow = build_workflow(&config);
    assert_eq!(workflow.store().server_url(), DEFAULT_SERVER_URL);
    assert!(workflow.store().connect().await);

    assert!(save_server_settings(workflow.store(), "http://fresh:8188").await);
    assert_eq!(build_workflow(&config).store().server_url(), "http://fresh:8188");
}

#[tokio::test]
async fn generation_session_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let workflow = build_workflow(&offline_config(&dir));
    let store = workflow.store();

    assert!(store.connect().await);
    store.set_generation_type(GenerationType::TextToImage);

    let model = find_model("model3").unwrap();
    store.add_recent(model.clone());
    assert!(store.toggle_favorite(&model.id));

    let params = GenerationParams {
        model: model.id.clone(),
        sampler: "lcm".to_string(),
        batch_size: 8,
        batch_count: 3,
        ..GenerationParams::default()
    };
    let result = workflow.generate(params).await.unwrap();
    assert_eq!(result.images.len(), 8);
    assert_eq!(result.params.batch_count, 3);
    assert!(result.params.seed.is_some());
    assert_eq!(workflow.current_result().map(|current| current.id), Some(result.id));
    assert!(!store.is_generating());

    store.add_recent(model.clone());
    let recent = store.recent_models();
    assert_eq!(recent.len(), 1);
    assert!(recent[0].is_favorite);
}

#[tokio::test]
async fn browsing_many_models_keeps_recent_bounded() {
    let dir = tempfile::tempdir().unwrap();
    let workflow = build_workflow(&offline_config(&dir));
    let store = workflow.store();

    for round in 0..4 {
        for mut model in list_models() {
            model.id = format!("{}-{}", model.id, round);
            store.add_recent(model);
        }
    }
    let recent = store.recent_models();
    assert_eq!(recent.len(), RECENT_CAPACITY);
    assert_eq!(recent[0].id, "lora2-3");
}
