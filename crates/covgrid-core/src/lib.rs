//! covgrid Core - Domain models, configuration and collaborator ports
//!
//! This crate contains the error taxonomy, the layered configuration, the
//! data model shared by the geometry, client and pipeline crates, and the
//! port traits the catalog and order adapters implement.

pub mod config;
pub mod error;
pub mod models;
pub mod ports;

pub use error::{CoverageError, ErrorKind, Result};
