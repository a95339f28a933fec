//! Polygon wrappers for the geographic and projected stages of the pipeline.
//!
//! Both wrap `geo::Polygon<f64>`. A `GeoPolygon` only comes out of
//! [`crate::validation`] and a `ProjectedPolygon` only out of a transform (or
//! an explicit planar constructor), so the stage a polygon belongs to is part
//! of its type.

use covgrid_core::models::{BoundingBox, Crs};
use geo::{Area, BoundingRect, Centroid, MultiPolygon, Point, Polygon};

/// Validated polygon in WGS84 longitude/latitude degrees
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPolygon {
    polygon: Polygon<f64>,
}

impl GeoPolygon {
    /// Wrap a polygon that has already passed validation
    pub(crate) fn from_validated(polygon: Polygon<f64>) -> Self {
        Self { polygon }
    }

    pub fn as_geo(&self) -> &Polygon<f64> {
        &self.polygon
    }

    /// Area-weighted centroid in degrees
    pub fn centroid(&self) -> Option<Point<f64>> {
        self.polygon.centroid()
    }

    /// GeoJSON geometry for search filters and order tools
    pub fn to_geojson(&self) -> geojson::Geometry {
        geojson::Geometry::new(polygon_to_geojson_value(&self.polygon))
    }
}

/// Polygon in planar metres of a projected CRS
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedPolygon {
    polygon: Polygon<f64>,
    crs: Crs,
}

impl ProjectedPolygon {
    /// Planar polygon given directly in the units of `crs`
    pub fn new(polygon: Polygon<f64>, crs: Crs) -> Self {
        Self { polygon, crs }
    }

    pub fn as_geo(&self) -> &Polygon<f64> {
        &self.polygon
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    pub fn area(&self) -> f64 {
        self.polygon.unsigned_area()
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.polygon
            .bounding_rect()
            .map(|r| BoundingBox::new(r.min().x, r.min().y, r.max().x, r.max().y))
    }
}

/// Intersection of the AOI with one item footprint, possibly empty
#[derive(Debug, Clone, PartialEq)]
pub struct Overlap {
    pub item_id: String,
    pub shape: MultiPolygon<f64>,
}

impl Overlap {
    pub fn new(item_id: impl Into<String>, shape: MultiPolygon<f64>) -> Self {
        Self { item_id: item_id.into(), shape }
    }

    pub fn empty(item_id: impl Into<String>) -> Self {
        Self::new(item_id, MultiPolygon::new(vec![]))
    }

    pub fn area(&self) -> f64 {
        self.shape.unsigned_area()
    }

    /// Zero-area overlaps contribute no coverage
    pub fn is_empty(&self) -> bool {
        self.shape.0.is_empty() || self.area() <= 0.0
    }
}

fn polygon_to_geojson_value(polygon: &Polygon<f64>) -> geojson::Value {
    let ring = |ls: &geo::LineString<f64>| -> Vec<Vec<f64>> {
        ls.coords().map(|c| vec![c.x, c.y]).collect()
    };
    let mut rings = vec![ring(polygon.exterior())];
    rings.extend(polygon.interiors().iter().map(ring));
    geojson::Value::Polygon(rings)
}
