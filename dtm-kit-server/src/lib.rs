pub mod config;
pub mod handlers;
pub mod state;

use axum::{routing::get, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use config::{Args, ServerConfig};
pub use state::AppState;

/// Routes of the map service.
pub fn app(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config().static_dir);

    Router::new()
        .route("/", get(handlers::index_handler))
        .route("/dtm_info", get(handlers::dtm_info_handler))
        .route(handlers::PNG_URL, get(handlers::dtm_png_handler))
        .route("/dtm_debug", get(handlers::dtm_debug_handler))
        .route("/pins.geojson", get(handlers::pins_handler))
        .nest_service("/static", static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
