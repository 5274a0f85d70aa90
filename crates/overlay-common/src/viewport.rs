//! Viewport bounds and coordinate types.

use serde::{Deserialize, Serialize};

/// A geographic coordinate in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Create a new coordinate.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Check that both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// The geographic rectangle currently visible on the host map.
///
/// Corners are the northeast and southwest coordinates in degrees. The zoom
/// level is optional but, when present, drives grid density.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportBounds {
    pub northeast: LatLng,
    pub southwest: LatLng,
    pub zoom: Option<f64>,
}

impl ViewportBounds {
    /// Create bounds from corner coordinates.
    pub fn new(northeast: LatLng, southwest: LatLng, zoom: Option<f64>) -> Self {
        Self {
            northeast,
            southwest,
            zoom,
        }
    }

    /// Latitude span in degrees.
    pub fn lat_span(&self) -> f64 {
        self.northeast.lat - self.southwest.lat
    }

    /// Longitude span in degrees.
    pub fn lng_span(&self) -> f64 {
        self.northeast.lng - self.southwest.lng
    }

    /// Width-to-height ratio of the viewport in degrees.
    pub fn aspect_ratio(&self) -> f64 {
        self.lng_span() / self.lat_span()
    }

    /// Center point of the viewport.
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.northeast.lat + self.southwest.lat) / 2.0,
            (self.northeast.lng + self.southwest.lng) / 2.0,
        )
    }

    /// Check if a point falls within the bounds.
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.southwest.lat
            && lat <= self.northeast.lat
            && lng >= self.southwest.lng
            && lng <= self.northeast.lng
    }

    /// Check whether the viewport describes a usable, positive-area box.
    ///
    /// Degenerate viewports (NaN/infinite corners, zero or negative spans)
    /// must short-circuit the pipeline before any fetch is issued.
    pub fn is_valid(&self) -> bool {
        self.northeast.is_finite()
            && self.southwest.is_finite()
            && self.lat_span() > 0.0
            && self.lng_span() > 0.0
    }

    /// Cache key for this viewport, quantized to 4 decimal places (~11 m).
    ///
    /// Two viewports that differ by less than the quantum hash identically,
    /// so a re-settle on effectively the same view reuses the cached grid.
    pub fn bounds_hash(&self) -> String {
        format!(
            "{:.4}_{:.4}_{:.4}_{:.4}",
            self.northeast.lat, self.northeast.lng, self.southwest.lat, self.southwest.lng
        )
    }
}
