//! Integration tests for authentication.

use http::StatusCode;

use crate::helpers::{FixturePlugin, TOKEN, TestApp, TestOptions, faulty_routes};

#[tokio::test]
async fn test_admin_routes_require_token() {
    let app = TestApp::with_options(TestOptions::secured()).await;

    let missing = app.request("GET", "/api/plugins", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.body["error"], "UNAUTHORIZED");

    let wrong = app.request("GET", "/api/plugins", None, Some("nope")).await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let ok = app.request("GET", "/api/plugins", None, Some(TOKEN)).await;
    assert_eq!(ok.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unauthenticated_toggle_changes_nothing() {
    let app = TestApp::with_options(TestOptions::secured()).await;

    let response = app.toggle("demo", true, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(app.routes.is_empty());
    assert!(app.events.is_empty());
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::with_options(TestOptions::secured()).await;

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_plugin_routes_follow_their_auth_flag() {
    let app = TestApp::with_options(TestOptions {
        extra: vec![FixturePlugin::new("faulty", faulty_routes)],
        enabled: vec!["faulty".to_string(), "demo".to_string()],
        ..TestOptions::secured()
    })
    .await;

    let guarded = app.request("GET", "/api/plugins/demo/ping", None, None).await;
    assert_eq!(guarded.status, StatusCode::UNAUTHORIZED);

    let allowed = app
        .request("GET", "/api/plugins/demo/ping", None, Some(TOKEN))
        .await;
    assert_eq!(allowed.status, StatusCode::OK);

    let open = app.request("GET", "/api/plugins/faulty/open", None, None).await;
    assert_eq!(open.status, StatusCode::NO_CONTENT);
}
