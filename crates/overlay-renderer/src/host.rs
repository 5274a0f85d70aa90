//! The narrow capability interface onto the host map widget.

/// What the engine needs from the third-party map SDK, and nothing more.
///
/// Keeping the surface this small keeps the renderers host-agnostic and
/// unit-testable against a fake map.
pub trait MapHost: Send + Sync {
    /// Current pixel size of the viewport canvas.
    fn viewport_px(&self) -> (u32, u32);

    /// Project a geographic coordinate into overlay pixel space.
    ///
    /// Returns None for coordinates the host cannot project (e.g. outside
    /// the projectable world extent). The mapping changes continuously
    /// while the user pans or zooms, so results must never be cached
    /// across frames.
    fn project(&self, lat: f64, lng: f64) -> Option<(f32, f32)>;

    /// Liveness probe. Once false the host map has been destroyed and any
    /// pending draw must silently abort.
    fn is_alive(&self) -> bool;
}
