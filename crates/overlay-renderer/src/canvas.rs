//! The raw-canvas overlay layer bound to the host map.

use crate::host::MapHost;
use overlay_common::{OverlayError, OverlayResult};
use std::sync::{Arc, Mutex};
use tiny_skia::Pixmap;
use tracing::debug;

/// A raster overlay surface sized to the host map viewport.
///
/// The pixmap has exactly one writer: the renderer that owns this layer.
/// Rebinding to a new map host goes through [`OverlayLayer::rebind`], which
/// tears the old surface down and allocates a fresh one; the old pixmap is
/// never shared with the new binding.
pub struct OverlayLayer {
    host: Arc<dyn MapHost>,
    pixmap: Mutex<Pixmap>,
}

impl OverlayLayer {
    /// Allocate an overlay canvas sized to the host viewport.
    pub fn attach(host: Arc<dyn MapHost>) -> OverlayResult<Self> {
        if !host.is_alive() {
            return Err(OverlayError::HostGone);
        }
        let (w, h) = host.viewport_px();
        let pixmap = Pixmap::new(w.max(1), h.max(1))
            .ok_or_else(|| OverlayError::Render("overlay canvas allocation failed".to_string()))?;
        debug!(width = w, height = h, "Overlay canvas attached");
        Ok(Self {
            host,
            pixmap: Mutex::new(pixmap),
        })
    }

    /// Tear down this layer and rebuild it against a new host.
    pub fn rebind(self, host: Arc<dyn MapHost>) -> OverlayResult<Self> {
        // Old pixmap drops here; the new binding starts from a clean canvas.
        drop(self.pixmap);
        Self::attach(host)
    }

    /// The capability probe used before every host write.
    pub fn ensure_alive(&self) -> OverlayResult<()> {
        if self.host.is_alive() {
            Ok(())
        } else {
            Err(OverlayError::HostGone)
        }
    }

    pub fn host(&self) -> &Arc<dyn MapHost> {
        &self.host
    }

    /// Current canvas size in pixels.
    pub fn size(&self) -> (u32, u32) {
        let pixmap = self.pixmap.lock().expect("pixmap lock");
        (pixmap.width(), pixmap.height())
    }

    /// Reallocate the canvas when the host viewport size changed.
    pub fn resize_to_host(&self) -> OverlayResult<()> {
        self.ensure_alive()?;
        let (w, h) = self.host.viewport_px();
        let mut pixmap = self.pixmap.lock().expect("pixmap lock");
        if (pixmap.width(), pixmap.height()) != (w.max(1), h.max(1)) {
            *pixmap = Pixmap::new(w.max(1), h.max(1)).ok_or_else(|| {
                OverlayError::Render("overlay canvas reallocation failed".to_string())
            })?;
        }
        Ok(())
    }

    /// Wipe the canvas to full transparency.
    pub fn clear(&self) {
        self.pixmap
            .lock()
            .expect("pixmap lock")
            .fill(tiny_skia::Color::TRANSPARENT);
    }

    /// Run a draw closure against the canvas.
    pub fn with_pixmap<R>(&self, f: impl FnOnce(&mut Pixmap) -> R) -> R {
        let mut pixmap = self.pixmap.lock().expect("pixmap lock");
        f(&mut pixmap)
    }

    /// Copy of the current canvas, for compositing or assertions.
    pub fn snapshot(&self) -> Pixmap {
        self.pixmap.lock().expect("pixmap lock").clone()
    }
}
