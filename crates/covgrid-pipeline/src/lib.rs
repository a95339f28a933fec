//! covgrid Pipeline - Coverage analysis orchestration
//!
//! Runs the AOI through zone selection, grid sizing, catalog search, overlap
//! computation and rasterization, and reports the result with an explanation
//! of each phase.

pub mod models;
pub mod pipeline;

pub use models::{
    CatalogPhase, CoverageReport, GridPhase, OverlapPhase, PreparedAoi, ProjectionPhase,
    RunExplanation, SearchTemplate,
};
pub use pipeline::{analyze_items, prepare_aoi, CoveragePipeline};
