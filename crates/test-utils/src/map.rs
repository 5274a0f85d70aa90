//! A fake map host with a linear equirectangular projection.

use overlay_common::ViewportBounds;
use overlay_renderer::MapHost;
use std::sync::atomic::{AtomicBool, Ordering};

/// Map host test double.
///
/// Projects linearly from the configured viewport bounds onto a fixed pixel
/// canvas, and can be "destroyed" mid-test to exercise the dead-host path.
pub struct FakeMapHost {
    bounds: ViewportBounds,
    width: u32,
    height: u32,
    alive: AtomicBool,
}

impl FakeMapHost {
    pub fn new(bounds: ViewportBounds, width: u32, height: u32) -> Self {
        Self {
            bounds,
            width,
            height,
            alive: AtomicBool::new(true),
        }
    }

    /// Simulate the host map being torn down.
    pub fn destroy(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    pub fn bounds(&self) -> ViewportBounds {
        self.bounds
    }
}

impl MapHost for FakeMapHost {
    fn viewport_px(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn project(&self, lat: f64, lng: f64) -> Option<(f32, f32)> {
        if !self.is_alive() {
            return None;
        }
        let x = (lng - self.bounds.southwest.lng) / self.bounds.lng_span() * self.width as f64;
        let y = (self.bounds.northeast.lat - lat) / self.bounds.lat_span() * self.height as f64;
        Some((x as f32, y as f32))
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::bounds_1x1_deg;

    #[test]
    fn test_projection_corners() {
        let bounds = bounds_1x1_deg(Some(10.0));
        let host = FakeMapHost::new(bounds, 200, 100);

        let (x, y) = host
            .project(bounds.northeast.lat, bounds.southwest.lng)
            .unwrap();
        assert!((x, y) == (0.0, 0.0));

        let (x, y) = host
            .project(bounds.southwest.lat, bounds.northeast.lng)
            .unwrap();
        assert!((x - 200.0).abs() < 1e-3 && (y - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_destroyed_host_stops_projecting() {
        let bounds = bounds_1x1_deg(None);
        let host = FakeMapHost::new(bounds, 100, 100);
        host.destroy();
        assert!(!host.is_alive());
        assert!(host.project(40.5, -74.5).is_none());
    }
}
