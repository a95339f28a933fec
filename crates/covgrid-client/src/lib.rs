//! covgrid Client - Catalog and order service adapters
//!
//! HTTP adapters for a Planet-style Data API and Orders API, plus an
//! in-memory catalog that evaluates search filters locally.

pub mod catalog;
pub mod filter;
mod http;
pub mod memory;
pub mod orders;

pub use catalog::HttpCatalogClient;
pub use filter::matches;
pub use memory::MemoryCatalog;
pub use orders::HttpOrderClient;
