//! Cloud cover rendering: soft radial-gradient blobs.

use crate::canvas::OverlayLayer;
use crate::scalar::draw_stride;
use grid_engine::GridRenderer;
use overlay_common::{CellValue, ComputedGrid, OverlayResult};
use std::sync::Arc;
use tiny_skia::{
    FillRule, GradientStop, Paint, PathBuilder, Point, RadialGradient, SpreadMode, Transform,
};
use tracing::debug;

/// Draw style for the cloud overlay.
#[derive(Debug, Clone)]
pub struct CloudRenderConfig {
    /// Cells below this coverage percentage are skipped entirely.
    pub visibility_threshold_pct: f64,
    /// Blob radius at 100% coverage, as a multiple of the cell's pixel size.
    pub radius_scale: f32,
    /// Peak blob opacity at 100% coverage.
    pub max_alpha: f64,
    /// Modulate opacity with a tiled value-noise texture for a non-uniform
    /// look.
    pub noise: bool,
    pub max_draw_cells: usize,
}

impl Default for CloudRenderConfig {
    fn default() -> Self {
        Self {
            visibility_threshold_pct: 5.0,
            radius_scale: 0.85,
            max_alpha: 0.82,
            noise: true,
            max_draw_cells: 2500,
        }
    }
}

/// Deterministic per-cell hash in [0, 1).
fn cell_hash(row: usize, col: usize) -> f32 {
    let seed = (row as u64).wrapping_mul(0x517c_c1b7_2722_0a95)
        ^ (col as u64).wrapping_mul(0x6c62_272e_07bb_0142);
    let mixed = seed.wrapping_mul(0x9e37_79b9_7f4a_7c15);
    let mixed = (mixed ^ (mixed >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    let mixed = mixed ^ (mixed >> 27);
    (mixed % 1000) as f32 / 1000.0
}

/// Tiled value noise: bilinear blend of lattice hashes.
fn value_noise(x: f32, y: f32) -> f32 {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    // Smoothstep fade keeps the lattice from showing through.
    let sx = fx * fx * (3.0 - 2.0 * fx);
    let sy = fy * fy * (3.0 - 2.0 * fy);

    let (ix, iy) = (x0 as i64 as usize, y0 as i64 as usize);
    let h00 = cell_hash(iy, ix);
    let h10 = cell_hash(iy, ix.wrapping_add(1));
    let h01 = cell_hash(iy.wrapping_add(1), ix);
    let h11 = cell_hash(iy.wrapping_add(1), ix.wrapping_add(1));

    let top = h00 + (h10 - h00) * sx;
    let bottom = h01 + (h11 - h01) * sx;
    top + (bottom - top) * sy
}

/// Renders cloud cover as overlapping soft blobs whose radius and opacity
/// scale with coverage.
pub struct CloudRenderer {
    layer: Arc<OverlayLayer>,
    config: CloudRenderConfig,
}

impl CloudRenderer {
    pub fn new(layer: Arc<OverlayLayer>, config: CloudRenderConfig) -> Self {
        Self { layer, config }
    }
}

impl GridRenderer for CloudRenderer {
    fn render(&self, grid: &ComputedGrid) -> OverlayResult<()> {
        self.layer.ensure_alive()?;
        self.layer.clear();

        if grid.is_empty() || grid.cols == 0 {
            return Ok(());
        }

        let stride = draw_stride(grid.len(), self.config.max_draw_cells);
        let half_lat = grid.cell_lat_span() / 2.0;
        let half_lng = grid.cell_lng_span() / 2.0;
        let host = self.layer.host().clone();

        let mut drawn = 0usize;
        self.layer.with_pixmap(|pixmap| {
            for (i, cell) in grid.cells.iter().enumerate().step_by(stride) {
                let pct = match cell.value {
                    CellValue::Scalar(v) => v,
                    CellValue::Vector(_) => continue,
                };
                if pct < self.config.visibility_threshold_pct {
                    continue;
                }

                let Some((cx, cy)) = host.project(cell.lat, cell.lon) else {
                    continue;
                };
                // Cell pixel extent, re-measured through the live projection.
                let (Some((x0, y0)), Some((x1, y1))) = (
                    host.project(cell.lat + half_lat, cell.lon - half_lng),
                    host.project(cell.lat - half_lat, cell.lon + half_lng),
                ) else {
                    continue;
                };
                let cell_px = (x1 - x0).abs().max((y1 - y0).abs());

                let coverage = (pct / 100.0).clamp(0.0, 1.0);
                let radius =
                    (cell_px * self.config.radius_scale * (0.4 + 0.6 * coverage as f32)).max(1.0);

                let row = i / grid.cols;
                let col = i % grid.cols;
                let mut alpha = self.config.max_alpha * coverage;
                if self.config.noise {
                    // 0.6..1.0 multiplier breaks up uniform decks.
                    alpha *= 0.6 + 0.4 * value_noise(col as f32 * 0.7, row as f32 * 0.7) as f64;
                }

                let center = tiny_skia::Color::from_rgba(1.0, 1.0, 1.0, alpha as f32)
                    .unwrap_or(tiny_skia::Color::WHITE);
                let Some(shader) = RadialGradient::new(
                    Point::from_xy(cx, cy),
                    Point::from_xy(cx, cy),
                    radius,
                    vec![
                        GradientStop::new(0.0, center),
                        GradientStop::new(1.0, tiny_skia::Color::TRANSPARENT),
                    ],
                    SpreadMode::Pad,
                    Transform::identity(),
                ) else {
                    continue;
                };

                let Some(path) = PathBuilder::from_circle(cx, cy, radius) else {
                    continue;
                };
                let mut paint = Paint::default();
                paint.shader = shader;
                paint.anti_alias = true;
                pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
                drawn += 1;
            }
        });

        debug!(cells = grid.len(), drawn, stride, "Cloud blobs rendered");
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
    fn test_cell_hash_deterministic_and_spread() {
        assert_eq!(cell_hash(3, 7), cell_hash(3, 7));
        assert_ne!(cell_hash(3, 7), cell_hash(7, 3));

        let values: Vec<f32> = (0..100).map(|i| cell_hash(i, i * 3 + 1)).collect();
        let mean = values.iter().sum::<f32>() / values.len() as f32;
        assert!((0.3..0.7).contains(&mean), "mean {}", mean);
    }

    #[test]
    fn test_value_noise_in_unit_range() {
        for i in 0..50 {
            let n = value_noise(i as f32 * 0.37, i as f32 * 0.91);
            assert!((0.0..=1.0).contains(&n), "noise {}", n);
        }
    }

    #[test]
    fn test_value_noise_matches_lattice_at_integers() {
        assert!((value_noise(4.0, 9.0) - cell_hash(9, 4)).abs() < 1e-6);
    }
}
