//! HTTP request handlers.

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::fs;
use tracing::{debug, warn};

use crate::state::AppState;

pub const PNG_URL: &str = "/dtm.png";

#[derive(Debug, Serialize)]
pub struct DtmInfo {
    /// `[[south, west], [north, east]]`, as Leaflet expects.
    pub bounds: [[f64; 2]; 2],
    /// `[lat, lon]`
    pub center: [f64; 2],
    pub image_url: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DtmDebug {
    pub dtm_path: String,
    pub exists: bool,
    pub size_bytes: Option<u64>,
    pub cached_error: Option<String>,
}

pub async fn index_handler(State(state): State<AppState>) -> Response {
    let path = state.config().static_dir.join("index.html");
    match tokio::fs::read(&path).await {
        Ok(html) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
            .body(Body::from(html))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        Err(e) => {
            warn!("Index not found at {:?}: {}", path, e);
            (StatusCode::NOT_FOUND, "Index not found").into_response()
        }
    }
}

pub async fn dtm_info_handler(State(state): State<AppState>) -> Response {
    match state.overlay() {
        None => error_json(StatusCode::SERVICE_UNAVAILABLE, "DTM not prepared yet"),
        Some(Err(message)) => error_json(StatusCode::INTERNAL_SERVER_ERROR, message),
        Some(Ok(overlay)) => {
            let b = overlay.bounds;
            let (lat, lon) = overlay.center;
            Json(DtmInfo {
                bounds: b.to_leaflet(),
                center: [lat, lon],
                image_url: PNG_URL,
            })
            .into_response()
        }
    }
}

pub async fn dtm_png_handler(State(state): State<AppState>) -> Response {
    match state.overlay() {
        Some(Ok(overlay)) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "image/png")
            .body(Body::from(overlay.png.clone()))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn dtm_debug_handler(State(state): State<AppState>) -> Json<DtmDebug> {
    let path = &state.config().dtm_path;
    let size_bytes = fs::metadata(path).ok().map(|m| m.len());
    let cached_error = match state.overlay() {
        Some(Err(message)) => Some(message.clone()),
        _ => None,
    };
    debug!("DTM debug: {:?} size={:?}", path, size_bytes);

    Json(DtmDebug {
        dtm_path: path.display().to_string(),
        exists: path.exists(),
        size_bytes,
        cached_error,
    })
}

pub async fn pins_handler(State(state): State<AppState>) -> Response {
    let Some(path) = state.config().pins_path.as_ref() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match tokio::fs::read(path).await {
        Ok(geojson) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/geo+json")
            .body(Body::from(geojson))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        Err(e) => {
            warn!("Pins not readable at {:?}: {}", path, e);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

fn error_json(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
