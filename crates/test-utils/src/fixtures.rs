//! Common viewport and reading fixtures.

use chrono::{TimeZone, Utc};
use overlay_common::{LatLng, Reading, ViewportBounds};

/// A 1°×1° viewport over the New York area.
pub fn bounds_1x1_deg(zoom: Option<f64>) -> ViewportBounds {
    ViewportBounds::new(LatLng::new(41.0, -73.0), LatLng::new(40.0, -74.0), zoom)
}

/// A degenerate zero-area viewport.
pub fn zero_area_bounds() -> ViewportBounds {
    ViewportBounds::new(LatLng::new(40.0, -74.0), LatLng::new(40.0, -74.0), Some(10.0))
}

/// A smooth synthetic reading for a coordinate.
///
/// Temperature tracks latitude, wind speed tracks longitude with a
/// westerly direction, precipitation and cloud cover ramp with latitude.
/// Smoothness matters: interpolation tests compare against the analytic
/// field.
pub fn reading_at(lat: f64, lon: f64) -> Reading {
    Reading {
        temperature_c: 30.0 - (lat - 40.0) * 10.0,
        wind_speed_kph: 10.0 + (lon + 74.0).abs() * 5.0,
        wind_direction_deg: 270.0,
        precipitation_mm: ((lat - 40.0) * 8.0).max(0.0),
        cloud_cover_pct: ((lat - 40.0) * 80.0).clamp(0.0, 100.0),
        observed_at: Utc
            .with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
            .single()
            .unwrap_or_default(),
    }
}
