//! Integration tests for the event log.

use http::StatusCode;

use crate::helpers::{TOKEN, TestApp, TestOptions};

#[tokio::test]
async fn test_toggle_is_recorded_with_actor() {
    let app = TestApp::with_options(TestOptions::secured()).await;

    app.toggle("demo", true, Some(TOKEN)).await;

    let response = app
        .request("GET", "/api/events?type=plugins.toggle", None, Some(TOKEN))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let events = response.body.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["actor"], "admin");
    assert_eq!(events[0]["success"], true);
    assert_eq!(events[0]["event_type"], "plugins.toggle");
}

#[tokio::test]
async fn test_failed_toggle_is_recorded() {
    let app = TestApp::new().await;

    app.toggle("fans", true, None).await;

    let response = app
        .request("GET", "/api/events?type=plugins.toggle", None, None)
        .await;
    let events = response.body.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["success"], false);
    assert_eq!(events[0]["actor"], "anonymous");
}

#[tokio::test]
async fn test_plugin_events_newest_first() {
    let app = TestApp::new().await;

    app.toggle("demo", true, None).await;
    app.toggle("demo", false, None).await;

    let response = app
        .request("GET", "/api/events?type=plugin.demo", None, None)
        .await;
    let types: Vec<&str> = response
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["event_type"].as_str().unwrap())
        .collect();
    assert_eq!(types, vec!["plugin.demo.stopped", "plugin.demo.started"]);
}

#[tokio::test]
async fn test_limit_caps_results() {
    let app = TestApp::new().await;

    for _ in 0..3 {
        app.toggle("demo", true, None).await;
    }

    let response = app.request("GET", "/api/events?limit=2", None, None).await;
    assert_eq!(response.body.as_array().unwrap().len(), 2);
}
