//! Crate-level error type

use std::io;
use thiserror::Error;

use crate::sampling::{SamplingError, SplitError};
use crate::tiff::errors::TiffError;
use crate::vector::VectorError;

/// Any failure of the label preparation pipeline
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("Raster error: {0}")]
    Raster(#[from] TiffError),
    #[error("Point dataset error: {0}")]
    Vector(#[from] VectorError),
    #[error("Sampling error: {0}")]
    Sampling(#[from] SamplingError),
    #[error("Split error: {0}")]
    Split(#[from] SplitError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

/// Result type of the preparation pipeline
pub type PrepResult<T> = Result<T, PrepError>;
