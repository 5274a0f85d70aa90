//! Common types shared across the weather overlay engine crates.

pub mod error;
pub mod geo;
pub mod grid;
pub mod reading;
pub mod viewport;

pub use error::{OverlayError, OverlayResult};
pub use geo::haversine_km;
pub use grid::{CellValue, ComputedGrid, GridCell, GridPoint};
pub use reading::{Reading, WindVector};
pub use viewport::{LatLng, ViewportBounds};
