use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use dtm_kit::{Bounds, DtmError, DtmOverlay, OverlayConfig};
use dtm_kit_server::{app, AppState, ServerConfig};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tower::ServiceExt;

fn test_state(dir: &Path) -> AppState {
    AppState::new(ServerConfig {
        dtm_path: dir.join("dtm.tif"),
        static_dir: dir.join("static"),
        overlay: OverlayConfig::default(),
        pins_path: Some(dir.join("pins.geojson")),
    })
}

fn sample_overlay() -> DtmOverlay {
    let bounds = Bounds {
        west: -74.25,
        south: 46.0,
        east: -74.125,
        north: 46.0625,
    };
    DtmOverlay {
        png: b"\x89PNG fake".to_vec(),
        center: bounds.center(),
        bounds,
    }
}

async fn get(router: Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, body.to_vec())
}

async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
    let (status, _, body) = get(router, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_overlay_not_ready() {
    let temp_dir = TempDir::new().unwrap();
    let state = test_state(temp_dir.path());

    let (status, body) = get_json(app(state.clone()), "/dtm_info").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "DTM not prepared yet");

    let (status, _, body) = get(app(state), "/dtm.png").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_overlay_ready() {
    let temp_dir = TempDir::new().unwrap();
    let state = test_state(temp_dir.path());
    state.store_overlay(Ok(sample_overlay()));

    let (status, body) = get_json(app(state.clone()), "/dtm_info").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["bounds"],
        serde_json::json!([[46.0, -74.25], [46.0625, -74.125]])
    );
    assert_eq!(body["center"], serde_json::json!([46.03125, -74.1875]));
    assert_eq!(body["image_url"], "/dtm.png");

    let (status, content_type, body) = get(app(state), "/dtm.png").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/png"));
    assert_eq!(body, b"\x89PNG fake");
}

#[tokio::test]
async fn test_missing_dtm_reported() {
    let temp_dir = TempDir::new().unwrap();
    let state = test_state(temp_dir.path());
    state.prepare_overlay();

    let (status, body) = get_json(app(state.clone()), "/dtm_info").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("DTM not found at: "), "{}", message);

    let (status, _, _) = get(app(state.clone()), "/dtm.png").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get_json(app(state), "/dtm_debug").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exists"], false);
    assert_eq!(body["size_bytes"], Value::Null);
    assert_eq!(body["cached_error"].as_str(), Some(message));
}

#[tokio::test]
async fn test_preparation_error_reported() {
    let temp_dir = TempDir::new().unwrap();
    let state = test_state(temp_dir.path());
    state.store_overlay(Err(DtmError::MissingCrs("no CRS".to_string())));

    let (status, body) = get_json(app(state), "/dtm_info").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Error preparing DTM overlay: "));
}

#[tokio::test]
async fn test_dtm_debug_reports_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("dtm.tif"), [0u8; 42]).unwrap();
    let state = test_state(temp_dir.path());

    let (status, body) = get_json(app(state), "/dtm_debug").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exists"], true);
    assert_eq!(body["size_bytes"], 42);
    assert_eq!(body["cached_error"], Value::Null);
    assert!(body["dtm_path"].as_str().unwrap().ends_with("dtm.tif"));
}

#[tokio::test]
async fn test_index_and_static_files() {
    let temp_dir = TempDir::new().unwrap();
    let state = test_state(temp_dir.path());

    let (status, _, body) = get(app(state.clone()), "/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, b"Index not found");

    let static_dir = temp_dir.path().join("static");
    fs::create_dir_all(&static_dir).unwrap();
    fs::write(static_dir.join("index.html"), "<h1>map</h1>").unwrap();
    fs::write(static_dir.join("app.js"), "console.log(1);").unwrap();

    let (status, content_type, body) = get(app(state.clone()), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert_eq!(body, b"<h1>map</h1>");

    let (status, _, body) = get(app(state.clone()), "/static/app.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"console.log(1);");

    let (status, _, _) = get(app(state), "/static/missing.js").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pins() {
    let temp_dir = TempDir::new().unwrap();
    let state = test_state(temp_dir.path());

    let (status, _, _) = get(app(state.clone()), "/pins.geojson").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    fs::write(
        temp_dir.path().join("pins.geojson"),
        r#"{"type":"FeatureCollection","features":[]}"#,
    )
    .unwrap();
    let (status, content_type, body) = get(app(state), "/pins.geojson").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/geo+json"));
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["type"], "FeatureCollection");
}
