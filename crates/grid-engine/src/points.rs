//! Cell-center point generation.

use crate::sizer::GridDims;
use overlay_common::{GridPoint, ViewportBounds};

/// Generate cell-center coordinates for a sized grid, row-major with row 0
/// at the northern edge.
///
/// Each cell center sits at the fractional position `((i+0.5)/rows,
/// (j+0.5)/cols)` mapped linearly into the bounds' lat/lng span. Pure
/// function, no side effects.
pub fn generate_points(bounds: &ViewportBounds, dims: GridDims) -> Vec<GridPoint> {
    let lat_step = bounds.lat_span() / dims.rows as f64;
    let lng_step = bounds.lng_span() / dims.cols as f64;

    let mut points = Vec::with_capacity(dims.len());
    for row in 0..dims.rows {
        let lat = bounds.northeast.lat - (row as f64 + 0.5) * lat_step;
        for col in 0..dims.cols {
            let lon = bounds.southwest.lng + (col as f64 + 0.5) * lng_step;
            points.push(GridPoint { lat, lon, row, col });
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use overlay_common::LatLng;

    fn bounds() -> ViewportBounds {
        ViewportBounds::new(LatLng::new(42.0, -72.0), LatLng::new(40.0, -74.0), None)
    }

    #[test]
    fn test_point_count_and_order() {
        let points = generate_points(&bounds(), GridDims { rows: 4, cols: 5 });
        assert_eq!(points.len(), 20);
        assert_eq!((points[0].row, points[0].col), (0, 0));
        assert_eq!((points[19].row, points[19].col), (3, 4));
        // Row-major: index = row * cols + col
        assert_eq!((points[7].row, points[7].col), (1, 2));
    }

    #[test]
    fn test_centers_inside_bounds() {
        let b = bounds();
        for p in generate_points(&b, GridDims { rows: 3, cols: 3 }) {
            assert!(b.contains(p.lat, p.lon), "({}, {})", p.lat, p.lon);
        }
    }

    #[test]
    fn test_first_center_offset_half_cell() {
        let b = bounds();
        let points = generate_points(&b, GridDims { rows: 4, cols: 4 });
        // 2° span over 4 rows -> 0.5° cells, first center half a cell in.
        assert!((points[0].lat - 41.75).abs() < 1e-9);
        assert!((points[0].lon + 73.75).abs() < 1e-9);
    }

    #[test]
    fn test_single_cell_center() {
        let b = bounds();
        let points = generate_points(&b, GridDims { rows: 1, cols: 1 });
        let c = b.center();
        assert!((points[0].lat - c.lat).abs() < 1e-9);
        assert!((points[0].lon - c.lng).abs() < 1e-9);
    }
}
