pub mod io;
pub mod tiff;
pub mod utils;
pub mod compression;
pub mod coordinate;
pub mod raster;
pub mod vector;
pub mod sampling;
pub mod errors;
pub mod config;
pub mod cli;
pub mod commands;
pub mod api;

pub use crate::api::{LabelKit, LoadedSamples};
pub use crate::config::PrepConfig;
pub use crate::errors::{PrepError, PrepResult};

pub use tiff::TiffReader;
pub use raster::{RasterCube, RasterLoader, RasterMeta};
pub use vector::{LabeledPoint, PointLabelSet, PointReader};
pub use sampling::{CollisionPolicy, LabeledSamples, StratifiedSplitter, TrainTestSplit};
pub use coordinate::{AffineTransform, BoundingBox, Point, CoordinateSystem};
