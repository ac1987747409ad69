use clap::Parser;
use dtm_kit::OverlayConfig;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// DTM location relative to the directory holding `data/`.
pub const DEFAULT_DTM: &str = "data/dtm/morin_heights_dtm.tif";

pub const DEFAULT_STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// DTM GeoTIFF to serve (default: searched upward for a `data` directory)
    #[arg(long, env = "DTM_PATH")]
    pub dtm: Option<PathBuf>,

    /// Directory mounted under /static; must contain index.html
    #[arg(long, env = "STATIC_DIR", default_value = DEFAULT_STATIC_DIR)]
    pub static_dir: PathBuf,

    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8000")]
    pub addr: SocketAddr,

    /// Width and height of the reprojected overlay, in pixels
    #[arg(long, default_value_t = 800)]
    pub overlay_size: usize,

    /// GeoJSON pins shown on the map page
    #[arg(long, env = "PINS_PATH")]
    pub pins: Option<PathBuf>,
}

impl Args {
    pub fn into_config(self, working_dir: &Path) -> ServerConfig {
        ServerConfig {
            dtm_path: self.dtm.unwrap_or_else(|| default_dtm_path(working_dir)),
            static_dir: self.static_dir,
            overlay: OverlayConfig {
                width: self.overlay_size,
                height: self.overlay_size,
            },
            pins_path: self.pins,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub dtm_path: PathBuf,
    pub static_dir: PathBuf,
    pub overlay: OverlayConfig,
    pub pins_path: Option<PathBuf>,
}

/// First ancestor of `start` that contains a `data` directory, joined with
/// [`DEFAULT_DTM`]; `start` itself when there is none.
pub fn default_dtm_path(start: &Path) -> PathBuf {
    let root = start
        .ancestors()
        .find(|dir| dir.join("data").is_dir())
        .unwrap_or(start);
    root.join(DEFAULT_DTM)
}
