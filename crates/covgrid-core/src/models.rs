pub mod catalog;
pub mod geometry;
pub mod grid;
pub mod order;

pub use catalog::{
    DateBounds, Item, ItemType, RangeBounds, SearchFilter, SearchRequest, DEFAULT_RESULT_CAP,
};
pub use geometry::{BoundingBox, Crs, Hemisphere, UtmZone};
pub use grid::{CoverageGrid, CoverageSummary, GeoTransform, GridDimensions, GridSpec};
pub use order::{
    Delivery, Order, OrderLinks, OrderRequest, OrderState, OrderTool, PollSettings, Product, ResultLocation,
};
