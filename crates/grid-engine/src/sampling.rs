//! Bandwidth-aware sample selection.
//!
//! Only a fraction of grid points are fetched from the live service; the
//! rest are interpolated. Corner, center, and (optionally) edge-midpoint
//! points are always included so interpolation stays stable at the viewport
//! boundary even when those cells fall off-stride.

use crate::config::SamplingConfig;
use crate::sizer::GridDims;
use std::collections::BTreeSet;

/// Effective sampling ratio for a grid of `total` points.
///
/// Starts at `base_ratio` and ramps linearly toward `max_ratio` between
/// `ramp_start` and `ramp_full` points, preserving fidelity on dense grids
/// without letting request counts grow unbounded. Disabled interpolation
/// forces a full fetch (ratio 1.0).
pub fn effective_ratio(total: usize, config: &SamplingConfig) -> f64 {
    if !config.interpolation_enabled {
        return 1.0;
    }
    if total <= config.ramp_start {
        return config.base_ratio;
    }
    let span = (config.ramp_full.saturating_sub(config.ramp_start)).max(1) as f64;
    let progress = ((total - config.ramp_start) as f64 / span).min(1.0);
    config.base_ratio + (config.max_ratio - config.base_ratio) * progress
}

/// Select the indices of grid points to fetch.
///
/// Stride-samples every Nth point with `N = floor(1/ratio)`, then force-adds
/// the 4 corners, the center, and (when `include_edge_midpoints`) the 4 edge
/// midpoints. Robustness points are added even when the stride already
/// covers them. The result is sorted and deduplicated, and its length never
/// exceeds the total point count.
pub fn select_samples(
    dims: GridDims,
    config: &SamplingConfig,
    include_edge_midpoints: bool,
) -> Vec<usize> {
    let total = dims.len();
    if total == 0 {
        return Vec::new();
    }

    let ratio = effective_ratio(total, config);
    let stride = ((1.0 / ratio).floor() as usize).max(1);

    let mut selected: BTreeSet<usize> = (0..total).step_by(stride).collect();

    let last_row = dims.rows - 1;
    let last_col = dims.cols - 1;
    let mid_row = dims.rows / 2;
    let mid_col = dims.cols / 2;
    let idx = |row: usize, col: usize| row * dims.cols + col;

    // Corners and center anchor the interpolation at the boundary.
    selected.insert(idx(0, 0));
    selected.insert(idx(0, last_col));
    selected.insert(idx(last_row, 0));
    selected.insert(idx(last_row, last_col));
    selected.insert(idx(mid_row, mid_col));

    if include_edge_midpoints {
        selected.insert(idx(0, mid_col));
        selected.insert(idx(last_row, mid_col));
        selected.insert(idx(mid_row, 0));
        selected.insert(idx(mid_row, last_col));
    }

    selected.into_iter().collect()
}
