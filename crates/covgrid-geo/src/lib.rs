//! covgrid Geo - Geometry, projection and coverage raster operations
//!
//! This crate loads and validates areas of interest, selects a UTM zone,
//! reprojects footprints, intersects them with the AOI and burns the
//! overlaps into a per-cell coverage count.

pub mod grid;
pub mod models;
pub mod overlap;
pub mod raster;
pub mod stats;
pub mod transform;
pub mod utm;
pub mod validation;

pub use grid::size_for;
pub use models::{GeoPolygon, Overlap, ProjectedPolygon};
pub use overlap::{intersect, overlaps_for};
pub use raster::{accumulate, rasterize};
pub use stats::{fraction_covered, histogram, summarize};
pub use transform::{projection_for, transform, CoordinateTransform, IdentityTransform, ProjTransform};
pub use utm::zone_for;
pub use validation::{load_aoi, load_aoi_file, parse_aoi, polygon_from_geojson};
