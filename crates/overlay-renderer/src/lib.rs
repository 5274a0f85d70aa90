//! Canvas overlay rendering for the grid engine.
//!
//! Implements the per-metric draw styles:
//! - tiled color rectangles (temperature, precipitation)
//! - soft gradient blobs (cloud cover)
//! - animated streamlines (wind)
//!
//! Every render pass re-projects cell coordinates through the host map's
//! live projection; nothing pixel-space is cached across viewport changes.

pub mod canvas;
pub mod clouds;
pub mod colorscale;
pub mod host;
pub mod scalar;
pub mod wind;

pub use canvas::OverlayLayer;
pub use clouds::{CloudRenderConfig, CloudRenderer};
pub use colorscale::{precipitation_color, temperature_color, wind_speed_color, Color};
pub use host::MapHost;
pub use scalar::{ScalarStyle, ScalarTileRenderer};
pub use wind::{WindRenderConfig, WindRenderer};
