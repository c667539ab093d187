//! Error types for point dataset reading

use std::io;
use thiserror::Error;

/// Errors raised while reading labeled point datasets
#[derive(Debug, Error)]
pub enum VectorError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Unsupported point dataset format: '{0}'")]
    UnsupportedFormat(String),
    #[error("Label field '{0}' not found")]
    MissingField(String),
    /// Label that cannot be stored in the label mask
    #[error("Invalid label '{value}' for feature {index}: {reason}")]
    InvalidLabel {
        index: usize,
        value: String,
        reason: String,
    },
    #[error("Unsupported geometry '{geometry}' for feature {index}, only points are accepted")]
    UnsupportedGeometry {
        index: usize,
        geometry: String,
    },
    #[error("Non-finite coordinate for feature {0}")]
    InvalidCoordinate(usize),
    #[error("Malformed shapefile: {0}")]
    Shapefile(String),
    #[error("Malformed DBF table: {0}")]
    Dbf(String),
    #[error("Invalid GeoJSON: {0}")]
    GeoJson(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for point dataset operations
pub type VectorResult<T> = Result<T, VectorError>;
