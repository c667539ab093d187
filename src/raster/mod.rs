//! Raster reading
//!
//! Decodes the first image of a GeoTIFF into a `(bands, height, width)`
//! cube of `f64` values and gathers the metadata needed to place it on
//! the ground.

mod chunk;
mod cube;
mod gdal_metadata;
mod loader;
mod sample;
mod strip_reader;
mod tile_reader;

pub use chunk::ChunkDecoder;
pub use cube::{flatten_pixels, RasterCube, RasterMeta};
pub use gdal_metadata::{GdalMetadata, MetadataItem};
pub use loader::RasterLoader;
pub use sample::{decode_samples, SampleType};
pub use strip_reader::StripReader;
pub use tile_reader::TileReader;
