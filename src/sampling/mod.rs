//! Training sample preparation
//!
//! Burns point labels onto the raster grid, pulls out the spectra of
//! labeled pixels and splits them into stratified train/test partitions.

mod errors;
mod export;
mod extract;
mod rasterize;
mod split;

pub use errors::{SamplingError, SamplingResult, SplitError};
pub use export::{export_split, write_samples};
pub use extract::{extract_labeled, LabeledSamples};
pub use rasterize::{rasterize_points, CollisionPolicy, LabelMask, RasterizeReport};
pub use split::{StratifiedSplitter, TrainTestSplit, DEFAULT_SEED, DEFAULT_TEST_FRACTION};
