//! Tiled rectangle rendering for scalar metrics (temperature,
//! precipitation).

use crate::canvas::OverlayLayer;
use crate::colorscale::{self, Color};
use grid_engine::GridRenderer;
use overlay_common::{CellValue, ComputedGrid, OverlayResult};
use std::sync::Arc;
use tiny_skia::{Paint, Rect, Transform};
use tracing::debug;

/// Value-to-color mapping for a scalar overlay.
pub type ColorFn = Box<dyn Fn(f64) -> Color + Send + Sync>;

/// Draw style for a scalar tile overlay.
pub struct ScalarStyle {
    pub color: ColorFn,
    /// Cells above this count are stride-skipped to bound per-frame draw
    /// operations.
    pub max_draw_cells: usize,
}

impl ScalarStyle {
    pub fn temperature() -> Self {
        Self {
            color: Box::new(colorscale::temperature_color),
            max_draw_cells: 4000,
        }
    }

    pub fn precipitation() -> Self {
        Self {
            color: Box::new(colorscale::precipitation_color),
            max_draw_cells: 4000,
        }
    }
}

/// Stride for draw decimation: every Nth cell when over budget.
pub(crate) fn draw_stride(cells: usize, max_draw: usize) -> usize {
    if cells <= max_draw || max_draw == 0 {
        1
    } else {
        cells.div_ceil(max_draw)
    }
}

/// Renders each cell as a filled rectangle covering exactly the cell's
/// geographic footprint in pixel space.
pub struct ScalarTileRenderer {
    layer: Arc<OverlayLayer>,
    style: ScalarStyle,
}

impl ScalarTileRenderer {
    pub fn new(layer: Arc<OverlayLayer>, style: ScalarStyle) -> Self {
        Self { layer, style }
    }
}

impl GridRenderer for ScalarTileRenderer {
    fn render(&self, grid: &ComputedGrid) -> OverlayResult<()> {
        self.layer.ensure_alive()?;
        self.layer.clear();

        if grid.is_empty() || grid.cols == 0 {
            return Ok(());
        }

        let stride = draw_stride(grid.len(), self.style.max_draw_cells);
        let lat_step = grid.cell_lat_span();
        let lng_step = grid.cell_lng_span();
        let north_edge = grid.bounds.northeast.lat;
        let west_edge = grid.bounds.southwest.lng;
        let host = self.layer.host().clone();

        let mut drawn = 0usize;
        self.layer.with_pixmap(|pixmap| {
            let mut paint = Paint::default();
            paint.anti_alias = false;

            for (i, cell) in grid.cells.iter().enumerate().step_by(stride) {
                let value = match cell.value {
                    CellValue::Scalar(v) => v,
                    CellValue::Vector(_) => continue,
                };

                let color = (self.style.color)(value);
                if color.a == 0 {
                    continue;
                }

                // Cell edges derive from row/col so adjacent cells share the
                // exact same edge coordinates and tile without gaps.
                let row = i / grid.cols;
                let col = i % grid.cols;
                let north = north_edge - row as f64 * lat_step;
                let south = north_edge - (row + 1) as f64 * lat_step;
                let west = west_edge + col as f64 * lng_step;
                let east = west_edge + (col + 1) as f64 * lng_step;

                let (Some((x0, y0)), Some((x1, y1))) =
                    (host.project(north, west), host.project(south, east))
                else {
                    continue;
                };

                let Some(rect) =
                    Rect::from_ltrb(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
                else {
                    continue;
                };

                paint.set_color(color.to_tiny());
                pixmap.fill_rect(rect, &paint, Transform::identity(), None);
                drawn += 1;
            }
        });

        debug!(cells = grid.len(), drawn, stride, "Scalar tiles rendered");
        Ok(())
    }

    fn clear(&self) -> OverlayResult<()> {
        self.layer.ensure_alive()?;
        self.layer.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_stride_under_budget() {
        assert_eq!(draw_stride(100, 4000), 1);
        assert_eq!(draw_stride(4000, 4000), 1);
    }

    #[test]
    fn test_draw_stride_over_budget() {
        assert_eq!(draw_stride(8000, 4000), 2);
        assert_eq!(draw_stride(4001, 4000), 2);
        assert_eq!(draw_stride(12_000, 4000), 3);
    }

    #[test]
    fn test_zero_budget_draws_everything() {
        assert_eq!(draw_stride(500, 0), 1);
    }
}
