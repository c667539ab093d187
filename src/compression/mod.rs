//! Compression handling for TIFF files
//!
//! This module implements strategies for decoding the compression methods
//! found in GeoTIFF strips and tiles.

mod handler;
mod uncompressed;
mod deflate;
mod factory;
mod lzw;
mod packbits;
mod zstd;

pub use handler::CompressionHandler;
pub use uncompressed::UncompressedHandler;
pub use deflate::AdobeDeflateHandler;
pub use factory::CompressionFactory;
pub use lzw::LzwHandler;
pub use packbits::PackBitsHandler;
pub use self::zstd::ZstdHandler;
