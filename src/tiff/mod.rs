//! TIFF file format parsing module
//!
//! This module provides structures and functions for reading
//! TIFF and BigTIFF format files and their GeoTIFF metadata.

pub mod errors;
pub mod ifd;
pub(crate) mod types;
pub mod reader;
#[cfg(test)]
pub(crate) mod tests;
pub mod geotags;
pub(crate) mod constants;
pub mod geo_key_parser;
pub(crate) mod validation;

pub use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};
pub use errors::{TiffError, TiffResult};
pub use ifd::{IFD, IFDEntry};
pub use reader::TiffReader;
pub use types::TIFF;
pub use geotags::{GeoKeyEntry, get_key_name};
pub use geo_key_parser::{GeoKeyParser, GeoReference};
