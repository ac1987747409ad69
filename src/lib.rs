pub mod colormap;
pub mod error;
pub mod inspect;
pub mod model;
pub mod overlay;
pub mod pins;
pub mod preview;
pub mod raster;
pub mod render;
pub mod slope;
pub mod writer;
pub mod zip_handler;

pub use error::{DtmError, Result};
pub use model::{Bounds, ElevationGrid};
pub use overlay::{prepare_overlay, DtmOverlay, OverlayConfig};
pub use raster::{read_elevation, NodataRule};
pub use writer::GeoTiffWriter;
pub use zip_handler::{list_zip_files, ZipHandler};
