//! Coordinate transforms from WGS84 into a planar system

use crate::models::{GeoPolygon, ProjectedPolygon};
use crate::utm::zone_for;
use covgrid_core::error::{CoverageError, Result};
use covgrid_core::models::{Crs, UtmZone};
use geo::{Coord, MapCoords};
use proj::Proj;

/// Maps one WGS84 `(lon, lat)` coordinate to planar `(x, y)`
pub trait CoordinateTransform {
    fn convert(&self, coord: Coord<f64>) -> Result<Coord<f64>>;

    /// CRS of the output coordinates
    fn target_crs(&self) -> Crs;
}

/// Pass-through for input that is already planar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityTransform {
    crs: Crs,
}

impl IdentityTransform {
    pub fn new(crs: Crs) -> Self {
        Self { crs }
    }
}

impl CoordinateTransform for IdentityTransform {
    fn convert(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        Ok(coord)
    }

    fn target_crs(&self) -> Crs {
        self.crs.clone()
    }
}

/// PROJ-backed transform from WGS84 into a fixed UTM zone
pub struct ProjTransform {
    zone: UtmZone,
    proj: Proj,
}

impl ProjTransform {
    pub fn new(zone: UtmZone) -> Result<Self> {
        let from = Crs::wgs84().authority();
        let to = zone.crs().authority();
        let proj = Proj::new_known_crs(&from, &to, None).map_err(|e| CoverageError::Projection {
            reason: format!("Failed to create projection from {} to {}: {}", from, to, e),
        })?;
        Ok(Self { zone, proj })
    }

    pub fn zone(&self) -> UtmZone {
        self.zone
    }
}

impl std::fmt::Debug for ProjTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjTransform").field("zone", &self.zone).finish()
    }
}

impl CoordinateTransform for ProjTransform {
    fn convert(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        // new_known_crs normalizes axis order to (lon, lat)
        let (x, y) = self
            .proj
            .convert((coord.x, coord.y))
            .map_err(|e| CoverageError::Projection { reason: format!("Projection failed: {}", e) })?;
        if !x.is_finite() || !y.is_finite() {
            return Err(CoverageError::Projection {
                reason: format!("({}, {}) has no image in UTM zone {}", coord.x, coord.y, self.zone),
            });
        }
        Ok(Coord { x, y })
    }

    fn target_crs(&self) -> Crs {
        self.zone.crs()
    }
}

/// Transform selected from the polygon's centroid
pub fn projection_for(polygon: &GeoPolygon) -> Result<ProjTransform> {
    let centroid = polygon.centroid().ok_or_else(|| CoverageError::Projection {
        reason: "polygon has no centroid".to_string(),
    })?;
    let zone = zone_for(centroid)?;
    tracing::debug!(zone = %zone, epsg = zone.epsg(), "Selected UTM zone from AOI centroid");
    ProjTransform::new(zone)
}

/// Apply `transform` to every vertex, keeping ring structure and order
pub fn transform(polygon: &GeoPolygon, transform: &dyn CoordinateTransform) -> Result<ProjectedPolygon> {
    let projected = polygon.as_geo().try_map_coords(|coord| transform.convert(coord))?;
    Ok(ProjectedPolygon::new(projected, transform.target_crs()))
}
