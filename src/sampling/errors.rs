//! Error types for rasterization, extraction and splitting

use thiserror::Error;

use crate::tiff::errors::TiffError;

/// Errors raised while burning labels or extracting samples
#[derive(Debug, Error)]
pub enum SamplingError {
    #[error("Raster transform cannot be inverted: {0}")]
    DegenerateTransform(#[from] TiffError),
    /// Two points with different classes fell on the same pixel
    #[error("Label collision at pixel (row {row}, col {col}): class {existing} vs {incoming}")]
    LabelCollision {
        row: usize,
        col: usize,
        existing: i16,
        incoming: i16,
    },
    #[error("Mask shape {mask:?} does not match raster shape {raster:?}")]
    ShapeMismatch {
        mask: (usize, usize),
        raster: (usize, usize),
    },
    #[error("Raster has no bands")]
    NoBands,
    #[error("Unknown collision policy '{0}', expected first, last or error")]
    UnknownPolicy(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors raised by the stratified splitter
#[derive(Debug, Error, PartialEq)]
pub enum SplitError {
    #[error("Cannot split an empty sample set")]
    Empty,
    #[error("Test fraction must lie strictly between 0 and 1, got {0}")]
    InvalidFraction(f64),
    #[error("Features have {features} rows but there are {labels} labels")]
    LengthMismatch {
        features: usize,
        labels: usize,
    },
    #[error("Test fraction {fraction} of {samples} samples leaves the training set empty")]
    EmptyTrainSet {
        fraction: f64,
        samples: usize,
    },
    /// Stratification needs each class on both sides of the split
    #[error("The least populated class {class} has only {count} member(s); at least 2 are required")]
    ClassTooSmall {
        class: i16,
        count: usize,
    },
    #[error("{partition} size {size} is smaller than the number of classes {classes}")]
    PartitionTooSmall {
        partition: &'static str,
        size: usize,
        classes: usize,
    },
}

/// Result type for sampling operations
pub type SamplingResult<T> = Result<T, SamplingError>;
