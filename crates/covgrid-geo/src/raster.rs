//! Burning overlaps into the coverage grid.
//!
//! A cell is covered when its centre lies inside the overlap by the even-odd
//! rule. Each row is scanned once: the centre line is intersected with every
//! ring edge, crossings are sorted, and cells whose centres fall in
//! `[x_in, x_out)` are set. The half-open interval means a centre exactly on
//! an edge shared by two adjacent polygons is counted for one of them only.

use crate::models::Overlap;
use covgrid_core::models::{BoundingBox, CoverageGrid, GeoTransform, GridDimensions};
use geo::{Coord, LineString};
use ndarray::Array2;

/// 0/1 mask of the cells covered by one overlap
pub fn rasterize(overlap: &Overlap, transform: &GeoTransform, dims: GridDimensions) -> Array2<bool> {
    let mut mask = Array2::from_elem(dims.shape(), false);
    if overlap.is_empty() {
        return mask;
    }

    let rings: Vec<&LineString<f64>> = overlap
        .shape
        .0
        .iter()
        .flat_map(|polygon| std::iter::once(polygon.exterior()).chain(polygon.interiors()))
        .collect();

    let mut crossings = Vec::new();
    for row in 0..dims.rows {
        let (_, cy) = transform.cell_center(row, 0);

        crossings.clear();
        for ring in &rings {
            for line in ring.lines() {
                if let Some(x) = crossing(line.start, line.end, cy) {
                    crossings.push(x);
                }
            }
        }
        crossings.sort_by(f64::total_cmp);

        for span in crossings.chunks_exact(2) {
            let first = column_at(span[0], transform, dims.cols);
            let last = column_at(span[1], transform, dims.cols);
            for col in first..last {
                mask[(row, col)] = true;
            }
        }
    }

    mask
}

/// Sum the masks of every non-empty overlap into one grid
pub fn accumulate(overlaps: &[Overlap], dims: GridDimensions, bbox: &BoundingBox) -> CoverageGrid {
    let transform = GeoTransform::from_bbox(bbox, dims);
    let grid = burn_all(overlaps, &transform, dims);
    tracing::debug!(
        overlaps = overlaps.len(),
        rows = dims.rows,
        cols = dims.cols,
        "Accumulated coverage grid"
    );
    grid
}

#[cfg(not(feature = "rayon"))]
fn burn_all(overlaps: &[Overlap], transform: &GeoTransform, dims: GridDimensions) -> CoverageGrid {
    let mut grid = CoverageGrid::zeros(dims);
    for overlap in overlaps.iter().filter(|o| !o.is_empty()) {
        grid.add_mask(&rasterize(overlap, transform, dims));
    }
    grid
}

#[cfg(feature = "rayon")]
fn burn_all(overlaps: &[Overlap], transform: &GeoTransform, dims: GridDimensions) -> CoverageGrid {
    use rayon::prelude::*;

    overlaps
        .par_iter()
        .filter(|o| !o.is_empty())
        .fold(
            || CoverageGrid::zeros(dims),
            |mut partial, overlap| {
                partial.add_mask(&rasterize(overlap, transform, dims));
                partial
            },
        )
        .reduce(|| CoverageGrid::zeros(dims), |a, b| a.merge(&b))
}

/// x where edge `a -> b` crosses the horizontal line `y`, if it does.
/// The upper endpoint is excluded so a vertex on the line is counted once.
fn crossing(a: Coord<f64>, b: Coord<f64>, y: f64) -> Option<f64> {
    if (a.y > y) == (b.y > y) {
        return None;
    }
    Some(a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y))
}

/// First column whose centre is at or right of `x`
fn column_at(x: f64, transform: &GeoTransform, cols: usize) -> usize {
    let c = ((x - transform.origin_x) / transform.pixel_width - 0.5).ceil();
    if c <= 0.0 {
        0
    } else if c >= cols as f64 {
        cols
    } else {
        c as usize
    }
}
