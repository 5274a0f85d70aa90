//! Viewport/zoom-adaptive grid sizing.

use crate::config::SizingConfig;
use overlay_common::ViewportBounds;
use serde::{Deserialize, Serialize};

/// Grid dimensions derived from a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDims {
    pub rows: usize,
    pub cols: usize,
}

impl GridDims {
    /// Total cell count.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// True when either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }
}

/// Derive grid rows/columns from viewport bounds and zoom.
///
/// The cell budget scales with zoom: `base_max_cells * clamp(zoom/10, 0.3,
/// 2.0)^zoom_exponent`, clamped to the configured absolute range. Rows and
/// columns split the budget to match the viewport aspect ratio, then are
/// rescaled proportionally if the product falls outside [min_cells, budget].
///
/// Deterministic: the same bounds and zoom always produce the same
/// dimensions, and both are always at least 1.
pub fn size_grid(bounds: &ViewportBounds, config: &SizingConfig) -> GridDims {
    let zoom = bounds.zoom.unwrap_or(config.default_zoom);
    let zoom_factor = (zoom / 10.0).clamp(0.3, 2.0).powf(config.zoom_exponent);

    let dynamic_max = (config.base_max_cells as f64 * zoom_factor)
        .clamp(
            config.absolute_min_cells as f64,
            config.absolute_max_cells as f64,
        );

    // rows*cols ~= dynamic_max with cols/rows ~= aspect
    let aspect = bounds.aspect_ratio();
    let base_rows = (dynamic_max / aspect).sqrt();

    let mut rows = base_rows.round().max(1.0);
    let mut cols = (base_rows * aspect).round().max(1.0);

    // Rescale proportionally when the rounded product breaks the budget.
    let total = rows * cols;
    if total > dynamic_max {
        let scale = (dynamic_max / total).sqrt();
        rows = (rows * scale).floor().max(1.0);
        cols = (cols * scale).floor().max(1.0);
    } else if total < config.min_cells as f64 {
        let scale = (config.min_cells as f64 / total).sqrt();
        rows = (rows * scale).ceil();
        cols = (cols * scale).ceil();
    }

    // Extreme aspect ratios can pin one dimension at 1 and leave the other
    // over budget after the proportional pass; clamp the free dimension.
    if rows * cols > dynamic_max {
        if rows <= cols {
            cols = (dynamic_max / rows).floor().max(1.0);
        } else {
            rows = (dynamic_max / cols).floor().max(1.0);
        }
    }

    GridDims {
        rows: rows as usize,
        cols: cols as usize,
    }
}
