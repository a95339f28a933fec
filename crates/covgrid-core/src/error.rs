//! Error types for covgrid

use std::path::PathBuf;
use thiserror::Error;

/// Broad error classes used by callers to decide how to report a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input outside the domain of the analysis (fatal, raised before any network call)
    Domain,
    /// Degenerate or invalid geometry
    Geometry,
    /// Failure reported by the catalog or order service
    Collaborator,
    /// Missing or invalid configuration
    Config,
    /// Filesystem or serialization failure
    Io,
}

#[derive(Debug, Error)]
pub enum CoverageError {
    // Domain errors
    #[error("UTM zones are only defined for latitudes in [-80, 84], got {latitude}")]
    LatitudeOutOfRange { latitude: f64 },

    #[error(
        "AOI too small for a coverage grid: {width:.1}m x {height:.1}m, \
         each side must be at least {minimum:.1}m"
    )]
    AoiTooSmall { width: f64, height: f64, minimum: f64 },

    // Geometry errors
    #[error("Invalid geometry at feature {feature_id}: {reason}")]
    InvalidGeometry { feature_id: String, reason: String },

    #[error("Projection failed: {reason}")]
    Projection { reason: String },

    // Collaborator errors
    #[error("Catalog request failed ({status}): {reason}")]
    Catalog { status: String, reason: String },

    #[error("Order {order_id} failed: {reason}")]
    Order { order_id: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CoverageError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoverageError::LatitudeOutOfRange { .. } | CoverageError::AoiTooSmall { .. } => {
                ErrorKind::Domain
            }
            CoverageError::InvalidGeometry { .. } | CoverageError::Projection { .. } => {
                ErrorKind::Geometry
            }
            CoverageError::Catalog { .. } | CoverageError::Order { .. } | CoverageError::Http(_) => {
                ErrorKind::Collaborator
            }
            CoverageError::ConfigMissing { .. } | CoverageError::ConfigInvalid { .. } => {
                ErrorKind::Config
            }
            CoverageError::FileNotFound { .. }
            | CoverageError::Io(_)
            | CoverageError::Serialization(_) => ErrorKind::Io,
        }
    }

    /// Shorthand for an invalid geometry error
    pub fn invalid_geometry(feature_id: impl Into<String>, reason: impl Into<String>) -> Self {
        CoverageError::InvalidGeometry { feature_id: feature_id.into(), reason: reason.into() }
    }
}

impl From<serde_json::Error> for CoverageError {
    fn from(err: serde_json::Error) -> Self {
        CoverageError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoverageError>;
