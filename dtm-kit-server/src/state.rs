//! Shared state: server configuration plus the overlay, prepared once.

use axum::body::Bytes;
use dtm_kit::{prepare_overlay, Bounds, DtmError, DtmOverlay};
use std::sync::{Arc, OnceLock};
use tracing::{error, info, warn};

use crate::config::ServerConfig;

#[derive(Debug, Clone)]
pub struct CachedOverlay {
    pub png: Bytes,
    pub bounds: Bounds,
    /// `(lat, lon)`
    pub center: (f64, f64),
}

impl From<DtmOverlay> for CachedOverlay {
    fn from(overlay: DtmOverlay) -> Self {
        Self {
            png: Bytes::from(overlay.png),
            bounds: overlay.bounds,
            center: overlay.center,
        }
    }
}

/// Outcome of overlay preparation. The error is kept as the message served
/// to clients.
pub type OverlayResult = std::result::Result<CachedOverlay, String>;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    config: ServerConfig,
    overlay: OnceLock<OverlayResult>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                overlay: OnceLock::new(),
            }),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// `None` until preparation has finished.
    pub fn overlay(&self) -> Option<&OverlayResult> {
        self.inner.overlay.get()
    }

    /// Records the outcome of a preparation. Only the first one is kept.
    pub fn store_overlay(&self, result: dtm_kit::Result<DtmOverlay>) {
        let cached = match result {
            Ok(overlay) => {
                info!(
                    "DTM overlay cached: {} bytes, bounds {}",
                    overlay.png.len(),
                    overlay.bounds
                );
                Ok(CachedOverlay::from(overlay))
            }
            Err(e @ DtmError::NotFound(_)) => Err(e.to_string()),
            Err(e) => Err(failure_message(e)),
        };
        self.cache(cached);
    }

    fn cache(&self, cached: OverlayResult) {
        if let Err(message) = &cached {
            error!("{}", message);
        }
        if self.inner.overlay.set(cached).is_err() {
            warn!("DTM overlay already prepared, ignoring new result");
        }
    }

    /// Reads, reprojects and renders the configured DTM, then caches the
    /// outcome. Blocking; run it off the async runtime.
    pub fn prepare_overlay(&self) {
        let config = self.config();
        let result = prepare_overlay(&config.dtm_path, &config.overlay);
        self.store_overlay(result);
    }

    /// Runs [`AppState::prepare_overlay`] on the blocking pool.
    pub async fn prepare_in_background(&self) {
        let config = self.config().clone();
        self.run_preparation(move || prepare_overlay(&config.dtm_path, &config.overlay))
            .await;
    }

    /// Runs `prepare` on the blocking pool and caches its outcome. A panic is
    /// cached as an error too.
    pub async fn run_preparation<F>(&self, prepare: F)
    where
        F: FnOnce() -> dtm_kit::Result<DtmOverlay> + Send + 'static,
    {
        match tokio::task::spawn_blocking(prepare).await {
            Ok(result) => self.store_overlay(result),
            Err(e) => self.cache(Err(failure_message(e))),
        }
    }
}

fn failure_message(e: impl std::fmt::Display) -> String {
    format!("Error preparing DTM overlay: {}", e)
}
