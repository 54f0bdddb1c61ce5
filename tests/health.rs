use axum::extract::State;
use restaurant_storefront::{
    config::AppConfig, models::Language, routes::health::health_check, state::AppState,
    store::MemoryStore,
};

#[tokio::test]
async fn health_check_returns_ok() {
    let state = AppState::new(AppConfig::default(), MemoryStore::shared());
    let response = health_check(State(state)).await;
    assert_eq!(response.0.message, "Health check");

    let data = serde_json::to_value(response.0.data.expect("health data")).unwrap();
    assert_eq!(data["status"], "ok");
    assert_eq!(data["store"], "memory");
    assert_eq!(data["language"], serde_json::json!(Language::En));
}

#[tokio::test]
async fn router_builds_over_a_file_store() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = AppConfig {
        store_path: Some(dir.path().join("store.json")),
        ..AppConfig::default()
    };
    let state = AppState::from_config(config)?;
    let response = health_check(State(state.clone())).await;
    let data = serde_json::to_value(response.0.data.expect("health data"))?;
    assert_eq!(data["store"], "file");

    let _app = restaurant_storefront::app::build_router(state);
    Ok(())
}
