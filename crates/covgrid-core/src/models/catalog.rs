//! Catalog search models.
//!
//! The filter types serialize to the JSON filter language of the Planet Data
//! API, so a `SearchRequest` can be posted as-is.

use crate::error::{CoverageError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default cap on the number of items returned by a search
pub const DEFAULT_RESULT_CAP: usize = 500;

/// Catalog item type, e.g. `PSScene`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemType(pub String);

impl ItemType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// PlanetScope scene
    pub fn ps_scene() -> Self {
        Self::new("PSScene")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ItemType {
    fn default() -> Self {
        Self::ps_scene()
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Numeric bounds for a `RangeFilter`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeBounds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt: Option<f64>,
}

impl RangeBounds {
    pub fn at_most(value: f64) -> Self {
        Self { lte: Some(value), ..Default::default() }
    }

    pub fn at_least(value: f64) -> Self {
        Self { gte: Some(value), ..Default::default() }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.gte.map_or(true, |b| value >= b)
            && self.gt.map_or(true, |b| value > b)
            && self.lte.map_or(true, |b| value <= b)
            && self.lt.map_or(true, |b| value < b)
    }
}

/// Bounds for a `DateRangeFilter`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DateBounds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt: Option<DateTime<Utc>>,
}

impl DateBounds {
    pub fn contains(&self, value: DateTime<Utc>) -> bool {
        self.gte.map_or(true, |b| value >= b)
            && self.gt.map_or(true, |b| value > b)
            && self.lte.map_or(true, |b| value <= b)
            && self.lt.map_or(true, |b| value < b)
    }
}

/// Search filter, combinable with `AndFilter`, `OrFilter` and `NotFilter`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SearchFilter {
    AndFilter { config: Vec<SearchFilter> },
    OrFilter { config: Vec<SearchFilter> },
    NotFilter { config: Box<SearchFilter> },
    GeometryFilter { field_name: String, config: geojson::Geometry },
    DateRangeFilter { field_name: String, config: DateBounds },
    RangeFilter { field_name: String, config: RangeBounds },
    StringInFilter { field_name: String, config: Vec<String> },
    PermissionFilter { config: Vec<String> },
}

impl SearchFilter {
    /// All of the given filters must match
    pub fn and(filters: Vec<SearchFilter>) -> Self {
        SearchFilter::AndFilter { config: filters }
    }

    /// Any of the given filters must match
    pub fn or(filters: Vec<SearchFilter>) -> Self {
        SearchFilter::OrFilter { config: filters }
    }

    pub fn not(filter: SearchFilter) -> Self {
        SearchFilter::NotFilter { config: Box::new(filter) }
    }

    /// Item footprint intersects the geometry
    pub fn geometry(geometry: geojson::Geometry) -> Self {
        SearchFilter::GeometryFilter { field_name: "geometry".to_string(), config: geometry }
    }

    /// Acquisition date within `[start, end]`; open bounds are omitted
    pub fn acquired_between(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        SearchFilter::DateRangeFilter {
            field_name: "acquired".to_string(),
            config: DateBounds { gte: start, lte: end, ..Default::default() },
        }
    }

    pub fn range(field_name: impl Into<String>, bounds: RangeBounds) -> Self {
        SearchFilter::RangeFilter { field_name: field_name.into(), config: bounds }
    }

    /// Cloud cover fraction at most `max`
    pub fn max_cloud_cover(max: f64) -> Self {
        Self::range("cloud_cover", RangeBounds::at_most(max))
    }

    pub fn string_in(field_name: impl Into<String>, values: Vec<String>) -> Self {
        SearchFilter::StringInFilter { field_name: field_name.into(), config: values }
    }

    /// Only items the caller may download
    pub fn downloadable() -> Self {
        SearchFilter::PermissionFilter { config: vec!["assets:download".to_string()] }
    }

    /// Combine with another filter, flattening nested `AndFilter`s
    pub fn and_also(self, other: SearchFilter) -> Self {
        match self {
            SearchFilter::AndFilter { mut config } => {
                config.push(other);
                SearchFilter::AndFilter { config }
            }
            filter => SearchFilter::and(vec![filter, other]),
        }
    }
}

/// A catalog search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub item_types: Vec<ItemType>,
    pub filter: SearchFilter,
    /// Maximum number of items to collect across pages
    #[serde(skip, default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_RESULT_CAP
}

impl SearchRequest {
    pub fn new(item_types: Vec<ItemType>, filter: SearchFilter) -> Self {
        Self { item_types, filter, limit: DEFAULT_RESULT_CAP }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// A catalog entry with its ground footprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub item_type: ItemType,
    pub geometry: geojson::Geometry,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl Item {
    pub fn new(id: impl Into<String>, item_type: ItemType, geometry: geojson::Geometry) -> Self {
        Self { id: id.into(), item_type, geometry, properties: serde_json::Map::new() }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Build an item from a GeoJSON feature as returned by a search.
    ///
    /// The item type is read from the `item_type` property and falls back to
    /// `default_type` when absent.
    pub fn from_feature(feature: geojson::Feature, default_type: &ItemType) -> Result<Self> {
        let id = match feature.id {
            Some(geojson::feature::Id::String(id)) => id,
            Some(geojson::feature::Id::Number(n)) => n.to_string(),
            None => {
                return Err(CoverageError::Serialization("catalog feature without id".to_string()))
            }
        };
        let geometry = feature
            .geometry
            .ok_or_else(|| CoverageError::invalid_geometry(&id, "feature has no footprint"))?;
        let properties = feature.properties.unwrap_or_default();
        let item_type = properties
            .get("item_type")
            .and_then(|v| v.as_str())
            .map(ItemType::new)
            .unwrap_or_else(|| default_type.clone());

        Ok(Self { id, item_type, geometry, properties })
    }

    /// GeoJSON feature readable by [`Item::from_feature`]
    pub fn to_feature(&self) -> geojson::Feature {
        let mut properties = self.properties.clone();
        properties
            .entry("item_type")
            .or_insert_with(|| serde_json::Value::String(self.item_type.to_string()));
        geojson::Feature {
            bbox: None,
            geometry: Some(self.geometry.clone()),
            id: Some(geojson::feature::Id::String(self.id.clone())),
            properties: Some(properties),
            foreign_members: None,
        }
    }

    /// Acquisition time from the `acquired` property
    pub fn acquired(&self) -> Option<DateTime<Utc>> {
        self.properties
            .get("acquired")
            .and_then(|v| v.as_str())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Numeric property lookup
    pub fn number(&self, key: &str) -> Option<f64> {
        self.properties.get(key).and_then(|v| v.as_f64())
    }

    pub fn cloud_cover(&self) -> Option<f64> {
        self.number("cloud_cover")
    }
}
