//! Grid data model: cell-center points and computed cell grids.

use crate::reading::WindVector;
use crate::viewport::ViewportBounds;
use serde::{Deserialize, Serialize};

/// A cell-center coordinate with its grid index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub lat: f64,
    pub lon: f64,
    pub row: usize,
    pub col: usize,
}

/// The interpolated payload of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Scalar(f64),
    Vector(WindVector),
}

impl CellValue {
    /// Scalar magnitude of the cell: the value itself, or vector speed.
    pub fn magnitude(&self) -> f64 {
        match self {
            CellValue::Scalar(v) => *v,
            CellValue::Vector(w) => w.speed(),
        }
    }
}

/// A rendered unit: cell-center coordinate plus its interpolated value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub lat: f64,
    pub lon: f64,
    pub value: CellValue,
}

/// A fully computed, immutable grid for one viewport.
///
/// Cells are stored row-major, row 0 at the northern edge. Cell boundaries
/// derive from row/col and the per-cell span, so cells tile the viewport
/// without gaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputedGrid {
    pub rows: usize,
    pub cols: usize,
    pub bounds: ViewportBounds,
    pub cells: Vec<GridCell>,
}

impl ComputedGrid {
    /// Latitude span of one cell in degrees.
    pub fn cell_lat_span(&self) -> f64 {
        self.bounds.lat_span() / self.rows as f64
    }

    /// Longitude span of one cell in degrees.
    pub fn cell_lng_span(&self) -> f64 {
        self.bounds.lng_span() / self.cols as f64
    }

    /// Get the cell at a grid position.
    pub fn cell(&self, row: usize, col: usize) -> Option<&GridCell> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get(row * self.cols + col)
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the grid holds no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
