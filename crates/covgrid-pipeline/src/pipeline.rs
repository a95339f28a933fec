//! Coverage pipeline
//!
//! A run is split in two halves. [`prepare_aoi`] does everything that depends
//! only on the AOI (zone selection, projection, grid sizing) so domain errors
//! surface before the catalog is contacted. [`analyze_items`] turns a list of
//! catalog items into the coverage grid and its statistics.

use crate::models::{
    CatalogPhase, CoverageReport, GridPhase, OverlapPhase, PreparedAoi, ProjectionPhase,
    RunExplanation, SearchTemplate,
};
use covgrid_core::error::{CoverageError, Result};
use covgrid_core::models::{GridSpec, Item};
use covgrid_core::ports::CatalogClient;
use covgrid_geo::{
    accumulate, fraction_covered, histogram, overlaps_for, projection_for, size_for, summarize,
    transform, CoordinateTransform, GeoPolygon, Overlap,
};

/// Select the zone, project the AOI and size its grid
pub fn prepare_aoi(aoi: &GeoPolygon, spec: &GridSpec) -> Result<PreparedAoi> {
    let centroid = aoi.centroid().ok_or_else(|| CoverageError::Projection {
        reason: "AOI has no centroid".to_string(),
    })?;
    let projector = projection_for(aoi)?;
    let zone = projector.zone();

    let projected = transform(aoi, &projector)?;
    let bbox = projected.bounding_box().ok_or_else(|| CoverageError::Projection {
        reason: "projected AOI has no extent".to_string(),
    })?;
    let dimensions = size_for(&bbox, spec)?;

    let projection_phase = ProjectionPhase {
        centroid: [centroid.x(), centroid.y()],
        zone,
        crs: projector.target_crs(),
    };
    let grid_phase = GridPhase {
        width_m: bbox.width(),
        height_m: bbox.height(),
        rows: dimensions.rows,
        cols: dimensions.cols,
        cell_width_m: bbox.width() / dimensions.cols as f64,
        cell_height_m: bbox.height() / dimensions.rows as f64,
    };

    tracing::debug!(
        zone = %zone,
        rows = dimensions.rows,
        cols = dimensions.cols,
        width_m = bbox.width(),
        height_m = bbox.height(),
        "Prepared AOI"
    );

    Ok(PreparedAoi {
        polygon: aoi.clone(),
        zone,
        transform: Box::new(projector),
        projected,
        bbox,
        dimensions,
        projection_phase,
        grid_phase,
    })
}

/// Intersect every item with the prepared AOI and count coverage per cell
pub fn analyze_items(prepared: &PreparedAoi, items: &[Item]) -> Result<CoverageReport> {
    let overlaps: Vec<Overlap> =
        overlaps_for(&prepared.projected, items, prepared.transform.as_ref()).collect::<Result<_>>()?;

    let non_empty_overlaps = overlaps.iter().filter(|o| !o.is_empty()).count();
    let aoi_area_m2 = prepared.projected.area();
    let largest = overlaps.iter().map(Overlap::area).fold(0.0_f64, f64::max);

    let grid = accumulate(&overlaps, prepared.dimensions, &prepared.bbox);
    let summary = summarize(&grid);
    let histogram = histogram(&grid);
    let fraction_covered = fraction_covered(&grid);

    tracing::info!(
        items = items.len(),
        non_empty = non_empty_overlaps,
        min = summary.min,
        max = summary.max,
        median = summary.median,
        "Coverage computed"
    );

    Ok(CoverageReport {
        zone: prepared.zone,
        dimensions: prepared.dimensions,
        bbox: prepared.bbox,
        geo_transform: prepared.geo_transform(),
        item_ids: items.iter().map(|i| i.id.clone()).collect(),
        non_empty_overlaps,
        grid,
        summary,
        histogram,
        fraction_covered,
        explanation: RunExplanation {
            projection: prepared.projection_phase.clone(),
            grid: prepared.grid_phase.clone(),
            catalog: None,
            overlap: OverlapPhase {
                items_considered: items.len(),
                non_empty: non_empty_overlaps,
                aoi_area_m2,
                max_overlap_fraction: if aoi_area_m2 > 0.0 { largest / aoi_area_m2 } else { 0.0 },
            },
        },
    })
}

/// Coverage analysis against a catalog
pub struct CoveragePipeline<C: CatalogClient> {
    catalog: C,
    spec: GridSpec,
}

impl<C: CatalogClient> CoveragePipeline<C> {
    pub fn new(catalog: C, spec: GridSpec) -> Self {
        Self { catalog, spec }
    }

    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn prepare(&self, aoi: &GeoPolygon) -> Result<PreparedAoi> {
        prepare_aoi(aoi, &self.spec)
    }

    /// Search the catalog for items over the AOI and compute their coverage
    pub async fn run(&self, aoi: &GeoPolygon, template: &SearchTemplate) -> Result<CoverageReport> {
        let prepared = self.prepare(aoi)?;
        self.run_prepared(&prepared, template).await
    }

    /// Like [`run`](Self::run) for an AOI that has already been prepared
    pub async fn run_prepared(&self, prepared: &PreparedAoi, template: &SearchTemplate) -> Result<CoverageReport> {
        let request = template.to_request(&prepared.polygon);
        tracing::info!(
            item_types = ?request.item_types,
            limit = request.limit,
            "Searching catalog"
        );
        let items = self.catalog.search(&request).await?;
        tracing::info!(items = items.len(), "Catalog search complete");

        let mut report = analyze_items(prepared, &items)?;
        report.explanation.catalog = Some(CatalogPhase {
            item_types: request.item_types,
            limit: request.limit,
            items_returned: items.len(),
        });
        Ok(report)
    }

    /// Coverage of already-known items, without a catalog call
    pub fn analyze(&self, aoi: &GeoPolygon, items: &[Item]) -> Result<CoverageReport> {
        let prepared = self.prepare(aoi)?;
        analyze_items(&prepared, items)
    }
}
