//! Integration tests for dispatch of plugin routes.

use http::StatusCode;

use podview_plugin::PluginState;

use crate::helpers::{
    FixturePlugin, TestApp, TestOptions, faulty_routes, shadow_routes, squatter_routes,
};

#[tokio::test]
async fn test_led_switch_route() {
    let app = TestApp::with_options(TestOptions {
        enabled: vec!["led".to_string()],
        ..TestOptions::default()
    })
    .await;

    let response = app
        .request(
            "POST",
            "/api/plugins/led/leds",
            Some(serde_json::json!({ "enable": false })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["enabled"], false);
    assert_eq!(app.registry.state("led").await.unwrap(), PluginState::Running);

    let brightness =
        std::fs::read_to_string(app.leds_dir.path().join("led0").join("brightness")).unwrap();
    assert_eq!(brightness, "0");

    let status = app.request("GET", "/api/plugins/led/status", None, None).await;
    assert_eq!(status.status, StatusCode::OK);
    assert_eq!(status.body["state"]["status"], "disabled");
    assert_eq!(status.body["state"]["totalLeds"], 2);
}

#[tokio::test]
async fn test_admin_disables_running_led() {
    let app = TestApp::with_options(TestOptions {
        enabled: vec!["led".to_string()],
        ..TestOptions::default()
    })
    .await;
    assert_eq!(app.routes.len(), 4);

    let response = app.toggle("led", false, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["plugin"], "led");
    assert_eq!(response.body["enabled"], false);
    assert_eq!(response.body["state"], "stopped");
    assert_eq!(app.registry.state("led").await.unwrap(), PluginState::Stopped);
    assert!(app.routes.is_empty());

    let status = app.request("GET", "/api/plugins/led/status", None, None).await;
    assert_eq!(status.status, StatusCode::NOT_FOUND);

    let summary = app.request("GET", "/api/plugins/led", None, None).await;
    assert_eq!(summary.status, StatusCode::OK);
    assert_eq!(summary.body["routes_count"], 0);
}

#[tokio::test]
async fn test_plugin_cannot_shadow_admin_routes() {
    let app = TestApp::with_options(TestOptions {
        extra: vec![FixturePlugin::new("shadow", shadow_routes)],
        enabled: vec!["shadow".to_string()],
        ..TestOptions::default()
    })
    .await;

    assert_eq!(app.registry.state("shadow").await.unwrap(), PluginState::Failed);
    assert!(app.routes.is_empty());

    // Both admin routes still answer for the plugin.
    let summary = app.request("GET", "/api/plugins/shadow", None, None).await;
    assert_eq!(summary.status, StatusCode::OK);
    assert_eq!(summary.body["state"], "failed");

    let toggled = app.toggle("shadow", false, None).await;
    assert_eq!(toggled.status, StatusCode::OK);
    assert_eq!(toggled.body["plugin"], "shadow");
}

#[tokio::test]
async fn test_admin_toggle_reaches_unmounted_plugin() {
    let app = TestApp::new().await;

    let response = app.toggle("led", true, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["plugin"], "led");
    assert_eq!(response.body["state"], "running");
}

#[tokio::test]
async fn test_method_mismatch_falls_through() {
    let app = TestApp::with_options(TestOptions {
        enabled: vec!["demo".to_string()],
        ..TestOptions::default()
    })
    .await;

    let response = app.request("POST", "/api/plugins/demo/ping", None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_demo_counter_through_router() {
    let app = TestApp::with_options(TestOptions {
        enabled: vec!["demo".to_string()],
        ..TestOptions::default()
    })
    .await;

    let first = app.request("POST", "/api/plugins/demo/counter", None, None).await;
    let second = app.request("POST", "/api/plugins/demo/counter", None, None).await;
    assert_eq!(first.body["counter"], 1);
    assert_eq!(second.body["counter"], 2);

    let info = app.request("GET", "/api/plugins/demo/info", None, None).await;
    assert_eq!(info.status, StatusCode::OK);
    assert_eq!(info.body["counter"], 2);
}

#[tokio::test]
async fn test_panicking_handler_returns_500() {
    let app = TestApp::with_options(TestOptions {
        extra: vec![FixturePlugin::new("faulty", faulty_routes)],
        enabled: vec!["faulty".to_string()],
        ..TestOptions::default()
    })
    .await;

    let response = app.request("GET", "/api/plugins/faulty/boom", None, None).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"], "INTERNAL_ERROR");

    // The server keeps serving and the plugin keeps running.
    let health = app.request("GET", "/api/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(app.registry.state("faulty").await.unwrap(), PluginState::Running);
}

#[tokio::test]
async fn test_plugin_cannot_claim_host_path() {
    let app = TestApp::with_options(TestOptions {
        extra: vec![FixturePlugin::new("squatter", squatter_routes)],
        enabled: vec!["squatter".to_string(), "demo".to_string()],
        ..TestOptions::default()
    })
    .await;

    let summary = app.request("GET", "/api/plugins/squatter", None, None).await;
    assert_eq!(summary.body["state"], "failed");
    assert_eq!(summary.body["status"], "error");
    assert!(summary.body["last_error"].is_string());

    let health = app.request("GET", "/api/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["plugins_running"], 1);
}
