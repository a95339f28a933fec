//! Coverage grid sizing

use covgrid_core::error::{CoverageError, Result};
use covgrid_core::models::{BoundingBox, GridDimensions, GridSpec};

/// Number of rows and columns for a projected bounding box.
///
/// Each side must span at least `min_cells` cells of `min_cell_size_m`;
/// the cell count along each axis is then capped at `max_cells`.
pub fn size_for(bbox: &BoundingBox, spec: &GridSpec) -> Result<GridDimensions> {
    spec.validate()?;

    let (width, height) = (bbox.width(), bbox.height());
    let (Some(rows), Some(cols)) = (axis_cells(height, spec), axis_cells(width, spec)) else {
        return Err(CoverageError::AoiTooSmall { width, height, minimum: spec.min_extent() });
    };
    tracing::debug!(width, height, rows, cols, "Sized coverage grid");

    Ok(GridDimensions::new(rows, cols))
}

/// Whole cells along one side, `None` when fewer than `min_cells` fit
fn axis_cells(extent: f64, spec: &GridSpec) -> Option<usize> {
    let cells = (extent / spec.min_cell_size_m).floor();
    if cells.is_nan() || cells < spec.min_cells as f64 {
        return None;
    }
    Some(if cells >= spec.max_cells as f64 { spec.max_cells } else { cells as usize })
}
