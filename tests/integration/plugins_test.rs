//! Integration tests for plugin administration.

use http::StatusCode;

use podview_core::traits::PluginStore;
use podview_plugin::PluginState;

use crate::helpers::{TestApp, TestOptions};

#[tokio::test]
async fn test_list_plugins_in_registration_order() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/plugins", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    let plugins = response.body.as_array().unwrap();
    let names: Vec<&str> = plugins.iter().map(|p| p["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["demo", "led"]);
    assert!(plugins.iter().all(|p| p["enabled"] == false));
    assert!(plugins.iter().all(|p| p["status"] == "stopped"));
}

#[tokio::test]
async fn test_get_plugin_reports_running_state() {
    let app = TestApp::with_options(TestOptions {
        enabled: vec!["demo".to_string()],
        ..TestOptions::default()
    })
    .await;

    let response = app.request("GET", "/api/plugins/demo", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["state"], "running");
    assert_eq!(response.body["enabled"], true);
    assert_eq!(response.body["routes_count"], 3);
    assert_eq!(response.body["version"], "1.0.0");
}

#[tokio::test]
async fn test_get_unknown_plugin() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/plugins/fans", None, None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_toggle_mounts_and_unmounts_routes() {
    let app = TestApp::new().await;

    let before = app.request("GET", "/api/plugins/demo/ping", None, None).await;
    assert_eq!(before.status, StatusCode::NOT_FOUND);

    let enabled = app.toggle("demo", true, None).await;
    assert_eq!(enabled.status, StatusCode::OK);
    assert_eq!(enabled.body["success"], true);
    assert_eq!(enabled.body["enabled"], true);
    assert_eq!(enabled.body["state"], "running");
    assert_eq!(enabled.body["restart_required"], false);

    let ping = app.request("GET", "/api/plugins/demo/ping", None, None).await;
    assert_eq!(ping.status, StatusCode::OK);
    assert_eq!(ping.body["message"], "pong");

    let disabled = app.toggle("demo", false, None).await;
    assert_eq!(disabled.status, StatusCode::OK);
    assert_eq!(disabled.body["state"], "stopped");

    let after = app.request("GET", "/api/plugins/demo/ping", None, None).await;
    assert_eq!(after.status, StatusCode::NOT_FOUND);
    assert!(app.routes.is_empty());
}

#[tokio::test]
async fn test_toggle_persists_flag() {
    let app = TestApp::new().await;

    app.toggle("led", true, None).await;
    assert_eq!(app.store.get_enabled("led").await.unwrap(), Some(true));

    app.toggle("led", false, None).await;
    assert_eq!(app.store.get_enabled("led").await.unwrap(), Some(false));
    assert_eq!(app.registry.state("led").await.unwrap(), PluginState::Stopped);
}

#[tokio::test]
async fn test_toggle_unknown_plugin() {
    let app = TestApp::new().await;

    let response = app.toggle("fans", true, None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(app.store.get_enabled("fans").await.unwrap(), None);
}

#[tokio::test]
async fn test_toggle_rejects_invalid_body() {
    let app = TestApp::new().await;

    let malformed = app
        .raw_request("POST", "/api/plugins/demo/toggle", "{not json".to_string(), None)
        .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert_eq!(malformed.body["error"], "VALIDATION_ERROR");

    let wrong_type = app
        .request(
            "POST",
            "/api/plugins/demo/toggle",
            Some(serde_json::json!({ "enabled": "yes" })),
            None,
        )
        .await;
    assert_eq!(wrong_type.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.store.get_enabled("demo").await.unwrap(), None);
}

#[tokio::test]
async fn test_static_mode_requires_restart() {
    let app = TestApp::with_options(TestOptions {
        live_mount: false,
        enabled: vec!["demo".to_string()],
        ..TestOptions::default()
    })
    .await;

    // Boot still mounts enabled plugins.
    let ping = app.request("GET", "/api/plugins/demo/ping", None, None).await;
    assert_eq!(ping.status, StatusCode::OK);

    let response = app.toggle("led", true, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["restart_required"], true);
    assert_eq!(response.body["enabled"], true);
    assert_eq!(app.store.get_enabled("led").await.unwrap(), Some(true));

    let status = app.request("GET", "/api/plugins/led/status", None, None).await;
    assert_eq!(status.status, StatusCode::NOT_FOUND);

    let disabled = app.toggle("demo", false, None).await;
    assert_eq!(disabled.body["restart_required"], true);
    let still_there = app.request("GET", "/api/plugins/demo/ping", None, None).await;
    assert_eq!(still_there.status, StatusCode::OK);
}

#[tokio::test]
async fn test_health_counts_running_plugins() {
    let app = TestApp::with_options(TestOptions {
        enabled: vec!["demo".to_string(), "led".to_string()],
        ..TestOptions::default()
    })
    .await;

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["plugins_running"], 2);
    assert_eq!(response.body["plugin_routes"], 7);
    assert_eq!(response.body["live_mount"], true);
}
