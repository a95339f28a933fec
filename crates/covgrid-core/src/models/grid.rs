//! Coverage grid types: sizing parameters, dimensions, affine transform and
//! the per-cell count array itself.

use crate::error::{CoverageError, Result};
use crate::models::geometry::BoundingBox;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Default minimum cell size in metres (roughly 3x the native GSD of the sensor)
pub const DEFAULT_MIN_CELL_SIZE_M: f64 = 9.0;
/// Default minimum number of cells along each axis
pub const DEFAULT_MIN_CELLS: usize = 3;
/// Default maximum number of cells along each axis
pub const DEFAULT_MAX_CELLS: usize = 3000;

/// Parameters controlling how a bounding box is divided into cells
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub min_cell_size_m: f64,
    pub min_cells: usize,
    pub max_cells: usize,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            min_cell_size_m: DEFAULT_MIN_CELL_SIZE_M,
            min_cells: DEFAULT_MIN_CELLS,
            max_cells: DEFAULT_MAX_CELLS,
        }
    }
}

impl GridSpec {
    /// Smallest side length (in metres) a bounding box may have
    pub fn min_extent(&self) -> f64 {
        self.min_cell_size_m * self.min_cells as f64
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min_cell_size_m.is_finite() || self.min_cell_size_m <= 0.0 {
            return Err(CoverageError::ConfigInvalid {
                key: "min_cell_size_m".to_string(),
                reason: format!("must be a positive number, got {}", self.min_cell_size_m),
            });
        }
        if self.min_cells == 0 {
            return Err(CoverageError::ConfigInvalid {
                key: "min_cells".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_cells < self.min_cells {
            return Err(CoverageError::ConfigInvalid {
                key: "max_cells".to_string(),
                reason: format!(
                    "must not be smaller than min_cells ({} < {})",
                    self.max_cells, self.min_cells
                ),
            });
        }
        Ok(())
    }
}

/// Row and column count of a coverage grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDimensions {
    pub rows: usize,
    pub cols: usize,
}

impl GridDimensions {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// `(rows, cols)`, the ndarray shape ordering
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}

/// Affine map from grid cells to projected coordinates.
///
/// Row 0 is the northern edge, so `pixel_height` is negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn from_bbox(bbox: &BoundingBox, dims: GridDimensions) -> Self {
        Self {
            origin_x: bbox.min_x,
            origin_y: bbox.max_y,
            pixel_width: bbox.width() / dims.cols as f64,
            pixel_height: (bbox.min_y - bbox.max_y) / dims.rows as f64,
        }
    }

    /// Projected coordinates of the top-left corner of a cell
    pub fn cell_origin(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.origin_x + col as f64 * self.pixel_width,
            self.origin_y + row as f64 * self.pixel_height,
        )
    }

    /// Projected coordinates of the centre of a cell
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.origin_x + (col as f64 + 0.5) * self.pixel_width,
            self.origin_y + (row as f64 + 0.5) * self.pixel_height,
        )
    }

    /// GDAL-ordered six-tuple
    pub fn to_gdal(&self) -> [f64; 6] {
        [self.origin_x, self.pixel_width, 0.0, self.origin_y, 0.0, self.pixel_height]
    }
}

/// Per-cell count of item overlaps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridRows", into = "GridRows")]
pub struct CoverageGrid {
    cells: Array2<u32>,
}

impl CoverageGrid {
    /// An all-zero grid
    pub fn zeros(dims: GridDimensions) -> Self {
        Self { cells: Array2::zeros(dims.shape()) }
    }

    pub fn from_array(cells: Array2<u32>) -> Self {
        Self { cells }
    }

    pub fn dimensions(&self) -> GridDimensions {
        let (rows, cols) = self.cells.dim();
        GridDimensions { rows, cols }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        self.cells.get((row, col)).copied()
    }

    pub fn cells(&self) -> &Array2<u32> {
        &self.cells
    }

    pub fn into_array(self) -> Array2<u32> {
        self.cells
    }

    /// Add one to every cell flagged in `mask`. Shapes must match.
    pub fn add_mask(&mut self, mask: &Array2<bool>) {
        debug_assert_eq!(self.cells.dim(), mask.dim());
        self.cells.zip_mut_with(mask, |count, &hit| {
            if hit {
                *count += 1;
            }
        });
    }

    /// Element-wise addition of another grid of the same shape
    pub fn merge(mut self, other: &CoverageGrid) -> Self {
        debug_assert_eq!(self.cells.dim(), other.cells.dim());
        self.cells += &other.cells;
        self
    }

    /// Row-major nested vectors, row 0 first
    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        self.cells.rows().into_iter().map(|row| row.to_vec()).collect()
    }
}

/// Serialized form of a grid
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GridRows {
    rows: usize,
    cols: usize,
    cells: Vec<Vec<u32>>,
}

impl From<CoverageGrid> for GridRows {
    fn from(grid: CoverageGrid) -> Self {
        let dims = grid.dimensions();
        Self { rows: dims.rows, cols: dims.cols, cells: grid.to_rows() }
    }
}

impl TryFrom<GridRows> for CoverageGrid {
    type Error = String;

    fn try_from(value: GridRows) -> std::result::Result<Self, Self::Error> {
        if value.cells.len() != value.rows {
            return Err(format!("expected {} rows, found {}", value.rows, value.cells.len()));
        }
        let mut flat = Vec::with_capacity(value.rows * value.cols);
        for (i, row) in value.cells.into_iter().enumerate() {
            if row.len() != value.cols {
                return Err(format!("row {} has {} cells, expected {}", i, row.len(), value.cols));
            }
            flat.extend(row);
        }
        Array2::from_shape_vec((value.rows, value.cols), flat)
            .map(CoverageGrid::from_array)
            .map_err(|e| e.to_string())
    }
}

/// Representative availability statistics of a grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageSummary {
    pub min: u32,
    pub max: u32,
    pub median: f64,
}
