//! Factory for creating compression handlers

use crate::tiff::constants::compression;
use crate::tiff::errors::{TiffError, TiffResult};
use super::handler::CompressionHandler;
use super::uncompressed::UncompressedHandler;
use super::deflate::AdobeDeflateHandler;
use super::lzw::LzwHandler;
use super::packbits::PackBitsHandler;
use super::zstd::ZstdHandler;

/// Factory for creating compression handlers
pub struct CompressionFactory;

impl CompressionFactory {
    /// Create a compression handler for the given compression code
    pub fn create_handler(code: u64) -> TiffResult<Box<dyn CompressionHandler>> {
        let code16 = u16::try_from(code).map_err(|_| TiffError::UnsupportedCompression(code))?;
        match code16 {
            compression::NONE => Ok(Box::new(UncompressedHandler)),
            compression::LZW => Ok(Box::new(LzwHandler)),
            compression::DEFLATE | compression::DEFLATE_OLD => Ok(Box::new(AdobeDeflateHandler)),
            compression::PACKBITS => Ok(Box::new(PackBitsHandler)),
            compression::ZSTD => Ok(Box::new(ZstdHandler)),
            _ => Err(TiffError::UnsupportedCompression(code))
        }
    }
}
