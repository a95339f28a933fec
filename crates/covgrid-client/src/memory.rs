//! In-memory catalog for offline runs and tests.
//!
//! Items are held in their original order. Footprint envelopes are indexed in
//! an R-tree so a geometry filter only evaluates nearby items.

use crate::filter::matches;
use async_trait::async_trait;
use covgrid_core::error::{CoverageError, Result};
use covgrid_core::models::{Item, ItemType, SearchFilter, SearchRequest};
use covgrid_core::ports::CatalogClient;
use geo::BoundingRect;
use rstar::{RTree, RTreeObject, AABB};
use std::path::Path;

/// Envelope of one footprint, pointing back at its item
#[derive(Debug, Clone, PartialEq)]
struct IndexedFootprint {
    position: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedFootprint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Catalog backed by a list of items
pub struct MemoryCatalog {
    items: Vec<Item>,
    index: RTree<IndexedFootprint>,
}

impl MemoryCatalog {
    pub fn new(items: Vec<Item>) -> Self {
        let indexed: Vec<IndexedFootprint> = items
            .iter()
            .enumerate()
            .filter_map(|(position, item)| {
                envelope_of(&item.geometry).map(|envelope| IndexedFootprint { position, envelope })
            })
            .collect();

        Self { items, index: RTree::bulk_load(indexed) }
    }

    /// Build from the features of a collection, as saved from a search
    pub fn from_feature_collection(
        collection: geojson::FeatureCollection,
        default_type: &ItemType,
    ) -> Result<Self> {
        let items = collection
            .features
            .into_iter()
            .map(|feature| Item::from_feature(feature, default_type))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(items))
    }

    pub fn from_geojson_str(text: &str, default_type: &ItemType) -> Result<Self> {
        let geojson: geojson::GeoJson = text
            .parse()
            .map_err(|e: geojson::Error| CoverageError::Serialization(format!("Invalid item collection: {}", e)))?;
        match geojson {
            geojson::GeoJson::FeatureCollection(collection) => {
                Self::from_feature_collection(collection, default_type)
            }
            _ => Err(CoverageError::Serialization(
                "item file must be a GeoJSON FeatureCollection".to_string(),
            )),
        }
    }

    /// Load a FeatureCollection file
    pub fn load(path: &Path, default_type: &ItemType) -> Result<Self> {
        if !path.exists() {
            return Err(CoverageError::FileNotFound { path: path.to_path_buf() });
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_geojson_str(&text, default_type)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Positions of the items worth evaluating, in catalog order
    fn candidates(&self, filter: &SearchFilter) -> Vec<usize> {
        let Some(envelope) = required_geometry(filter).and_then(envelope_of) else {
            return (0..self.items.len()).collect();
        };

        let mut positions: Vec<usize> =
            self.index.locate_in_envelope_intersecting(&envelope).map(|f| f.position).collect();
        positions.sort_unstable();
        positions
    }
}

#[async_trait]
impl CatalogClient for MemoryCatalog {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Item>> {
        let found: Vec<Item> = self
            .candidates(&request.filter)
            .into_iter()
            .map(|position| &self.items[position])
            .filter(|item| request.item_types.is_empty() || request.item_types.contains(&item.item_type))
            .filter(|item| matches(&request.filter, item))
            .take(request.limit)
            .cloned()
            .collect();

        tracing::debug!(items = found.len(), catalog = self.items.len(), "Searched in-memory catalog");
        Ok(found)
    }
}

/// A geometry every match must intersect: a top-level geometry filter or
/// one directly inside a top-level `AndFilter`
fn required_geometry(filter: &SearchFilter) -> Option<&geojson::Geometry> {
    match filter {
        SearchFilter::GeometryFilter { config, .. } => Some(config),
        SearchFilter::AndFilter { config } => config.iter().find_map(|f| match f {
            SearchFilter::GeometryFilter { config, .. } => Some(config),
            _ => None,
        }),
        _ => None,
    }
}

fn envelope_of(geometry: &geojson::Geometry) -> Option<AABB<[f64; 2]>> {
    let geometry = geo::Geometry::<f64>::try_from(geometry.clone()).ok()?;
    let rect = geometry.bounding_rect()?;
    Some(AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]))
}
