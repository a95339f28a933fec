use chrono::{DateTime, Utc};
use covgrid_core::models::{
    BoundingBox, CoverageGrid, CoverageSummary, Crs, GeoTransform, GridDimensions, ItemType,
    SearchFilter, SearchRequest, UtmZone, DEFAULT_RESULT_CAP,
};
use covgrid_geo::{CoordinateTransform, GeoPolygon, ProjectedPolygon};
use serde::{Deserialize, Serialize};

/// Caller-supplied part of a catalog search. The AOI geometry filter is
/// added by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTemplate {
    pub item_types: Vec<ItemType>,
    pub filters: Vec<SearchFilter>,
    pub limit: usize,
}

impl Default for SearchTemplate {
    fn default() -> Self {
        Self { item_types: vec![ItemType::ps_scene()], filters: Vec::new(), limit: DEFAULT_RESULT_CAP }
    }
}

impl SearchTemplate {
    pub fn new(item_type: ItemType) -> Self {
        Self { item_types: vec![item_type], ..Default::default() }
    }

    pub fn with_filter(mut self, filter: SearchFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Acquisition date range; a template without either bound adds no filter
    pub fn acquired_between(self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        if start.is_none() && end.is_none() {
            return self;
        }
        self.with_filter(SearchFilter::acquired_between(start, end))
    }

    pub fn max_cloud_cover(self, max: f64) -> Self {
        self.with_filter(SearchFilter::max_cloud_cover(max))
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// AOI geometry filter AND every template filter
    pub fn to_request(&self, aoi: &GeoPolygon) -> SearchRequest {
        let filter = self
            .filters
            .iter()
            .cloned()
            .fold(SearchFilter::and(vec![SearchFilter::geometry(aoi.to_geojson())]), SearchFilter::and_also);
        SearchRequest::new(self.item_types.clone(), filter).with_limit(self.limit)
    }
}

/// AOI after zone selection, projection and grid sizing
pub struct PreparedAoi {
    pub polygon: GeoPolygon,
    pub zone: UtmZone,
    pub transform: Box<dyn CoordinateTransform>,
    pub projected: ProjectedPolygon,
    pub bbox: BoundingBox,
    pub dimensions: GridDimensions,
    pub projection_phase: ProjectionPhase,
    pub grid_phase: GridPhase,
}

impl PreparedAoi {
    pub fn geo_transform(&self) -> GeoTransform {
        GeoTransform::from_bbox(&self.bbox, self.dimensions)
    }
}

/// Zone selection details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPhase {
    pub centroid: [f64; 2],
    pub zone: UtmZone,
    pub crs: Crs,
}

/// Grid sizing details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridPhase {
    pub width_m: f64,
    pub height_m: f64,
    pub rows: usize,
    pub cols: usize,
    pub cell_width_m: f64,
    pub cell_height_m: f64,
}

/// Catalog search details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogPhase {
    pub item_types: Vec<ItemType>,
    pub limit: usize,
    pub items_returned: usize,
}

/// Overlap computation details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapPhase {
    pub items_considered: usize,
    pub non_empty: usize,
    pub aoi_area_m2: f64,
    /// Largest single overlap as a share of the AOI area
    pub max_overlap_fraction: f64,
}

/// What each phase of a run did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunExplanation {
    pub projection: ProjectionPhase,
    pub grid: GridPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<CatalogPhase>,
    pub overlap: OverlapPhase,
}

/// Result of a coverage run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub zone: UtmZone,
    pub dimensions: GridDimensions,
    pub bbox: BoundingBox,
    pub geo_transform: GeoTransform,
    pub item_ids: Vec<String>,
    pub non_empty_overlaps: usize,
    pub grid: CoverageGrid,
    pub summary: CoverageSummary,
    pub histogram: Vec<usize>,
    pub fraction_covered: f64,
    pub explanation: RunExplanation,
}
