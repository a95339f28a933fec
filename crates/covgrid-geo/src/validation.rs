//! AOI and footprint loading from GeoJSON.
//!
//! Structural problems (wrong geometry type, open or short rings, non-finite
//! or out-of-range coordinates) are always errors. Topological problems
//! (self-intersection, zero area) are errors for the AOI and are passed
//! through for catalog footprints, where the overlap step treats a zero-area
//! result as empty.

use crate::models::GeoPolygon;
use covgrid_core::error::{CoverageError, Result};
use geo::{Area, Coord, LineString, Polygon, Validation};
use geojson::GeoJson;
use std::path::Path;

/// Feature id reported for an AOI that carries none
pub const AOI_ID: &str = "aoi";

/// How strictly topology is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidityMode {
    /// Reject self-intersecting and zero-area polygons
    Strict,
    /// Only structural checks
    Lenient,
}

/// Validation result with details
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
}

/// A single problem and where it was found
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub location: String,
    pub reason: String,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, location: impl Into<String>, reason: impl Into<String>) {
        self.errors.push(ValidationError { location: location.into(), reason: reason.into() });
    }

    /// Collapse into a single `InvalidGeometry` error for `feature_id`
    pub fn into_result(self, feature_id: &str) -> Result<()> {
        if self.errors.is_empty() {
            return Ok(());
        }
        let reason = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.location, e.reason))
            .collect::<Vec<_>>()
            .join("; ");
        Err(CoverageError::invalid_geometry(feature_id, reason))
    }
}

/// Parse an AOI from GeoJSON text
pub fn parse_aoi(text: &str) -> Result<GeoPolygon> {
    let geojson: GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| CoverageError::invalid_geometry(AOI_ID, e.to_string()))?;
    load_aoi(&geojson)
}

/// Read and parse an AOI file
pub fn load_aoi_file(path: &Path) -> Result<GeoPolygon> {
    if !path.exists() {
        return Err(CoverageError::FileNotFound { path: path.to_path_buf() });
    }
    let text = std::fs::read_to_string(path)?;
    parse_aoi(&text)
}

/// Build the AOI from a Polygon geometry, a Feature holding one, or the first
/// feature of a FeatureCollection
pub fn load_aoi(geojson: &GeoJson) -> Result<GeoPolygon> {
    let (feature_id, geometry) = match geojson {
        GeoJson::Geometry(geometry) => (AOI_ID.to_string(), geometry),
        GeoJson::Feature(feature) => {
            let id = feature_label(feature);
            let geometry = feature
                .geometry
                .as_ref()
                .ok_or_else(|| CoverageError::invalid_geometry(&id, "feature has no geometry"))?;
            (id, geometry)
        }
        GeoJson::FeatureCollection(collection) => {
            let feature = collection.features.first().ok_or_else(|| {
                CoverageError::invalid_geometry(AOI_ID, "feature collection is empty")
            })?;
            if collection.features.len() > 1 {
                tracing::warn!(
                    features = collection.features.len(),
                    "AOI collection has several features, using the first"
                );
            }
            let id = feature_label(feature);
            let geometry = feature
                .geometry
                .as_ref()
                .ok_or_else(|| CoverageError::invalid_geometry(&id, "feature has no geometry"))?;
            (id, geometry)
        }
    };

    build_polygon(&feature_id, geometry, ValidityMode::Strict)
}

/// Convert a catalog footprint, checking structure only
pub fn polygon_from_geojson(feature_id: &str, geometry: &geojson::Geometry) -> Result<GeoPolygon> {
    build_polygon(feature_id, geometry, ValidityMode::Lenient)
}

fn build_polygon(
    feature_id: &str,
    geometry: &geojson::Geometry,
    mode: ValidityMode,
) -> Result<GeoPolygon> {
    let rings = match &geometry.value {
        geojson::Value::Polygon(rings) => rings,
        other => {
            return Err(CoverageError::invalid_geometry(
                feature_id,
                format!("expected Polygon, found {}", value_type(other)),
            ))
        }
    };

    validate_rings(rings).into_result(feature_id)?;

    let mut rings = rings.iter().map(|ring| to_line_string(ring));
    let exterior = rings
        .next()
        .ok_or_else(|| CoverageError::invalid_geometry(feature_id, "polygon has no rings"))?;
    let polygon = Polygon::new(exterior, rings.collect());

    validate_polygon(&polygon, mode).into_result(feature_id)?;

    Ok(GeoPolygon::from_validated(polygon))
}

/// Structural checks on raw GeoJSON rings
pub fn validate_rings(rings: &[Vec<Vec<f64>>]) -> ValidationResult {
    let mut result = ValidationResult::default();

    if rings.is_empty() {
        result.add_error("Polygon", "polygon has no rings");
        return result;
    }

    for (i, ring) in rings.iter().enumerate() {
        let location =
            if i == 0 { "Polygon exterior".to_string() } else { format!("Polygon interior[{}]", i - 1) };

        if ring.len() < 4 {
            result.add_error(&location, format!("ring must have at least 4 positions, found {}", ring.len()));
            continue;
        }

        if ring.first() != ring.last() {
            result.add_error(&location, "ring must be closed (first position == last position)");
        }

        for (j, position) in ring.iter().enumerate() {
            let (lon, lat) = match position.as_slice() {
                [lon, lat, ..] => (*lon, *lat),
                _ => {
                    result.add_error(format!("{}[{}]", location, j), "position needs longitude and latitude");
                    continue;
                }
            };
            if !lon.is_finite() || !lat.is_finite() {
                result.add_error(format!("{}[{}]", location, j), "coordinates must be finite");
            } else if !(-180.0..=180.0).contains(&lon) {
                result.add_error(format!("{}[{}]", location, j), format!("longitude {} outside [-180, 180]", lon));
            } else if !(-90.0..=90.0).contains(&lat) {
                result.add_error(format!("{}[{}]", location, j), format!("latitude {} outside [-90, 90]", lat));
            }
        }
    }

    result
}

/// Topological checks on an assembled polygon
pub fn validate_polygon(polygon: &Polygon<f64>, mode: ValidityMode) -> ValidationResult {
    let mut result = ValidationResult::default();
    if mode == ValidityMode::Lenient {
        return result;
    }

    if polygon.unsigned_area() <= 0.0 {
        result.add_error("Polygon exterior", "ring encloses no area");
    } else if !polygon.is_valid() {
        result.add_error("Polygon", "polygon is self-intersecting or has rings outside the exterior");
    }

    result
}

fn to_line_string(ring: &[Vec<f64>]) -> LineString<f64> {
    ring.iter().map(|p| Coord { x: p[0], y: p[1] }).collect()
}

fn value_type(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn feature_label(feature: &geojson::Feature) -> String {
    match &feature.id {
        Some(geojson::feature::Id::String(id)) => id.clone(),
        Some(geojson::feature::Id::Number(id)) => id.to_string(),
        None => AOI_ID.to_string(),
    }
}
