//! Port trait definitions
//!
//! These traits define the interfaces that the catalog and order adapters must implement.

pub mod remote;

pub use remote::{CatalogClient, OrderClient};
