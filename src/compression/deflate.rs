//! Handler for Adobe Deflate compressed data

use std::io::Read;
use flate2::read::ZlibDecoder;
use crate::tiff::constants::compression;
use crate::tiff::errors::{TiffError, TiffResult};
use super::handler::CompressionHandler;

/// Adobe Deflate (Zlib) compression handler (compression codes 8 and 32946)
pub struct AdobeDeflateHandler;

impl CompressionHandler for AdobeDeflateHandler {
    fn decompress(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        let mut decoder = ZlibDecoder::new(data);
        let mut decompressed_data = Vec::new();
        match decoder.read_to_end(&mut decompressed_data) {
            Ok(_) => Ok(decompressed_data),
            Err(e) => Err(TiffError::Decompression { codec: self.name(), message: e.to_string() })
        }
    }

    fn name(&self) -> &'static str {
        "Adobe Deflate"
    }

    fn code(&self) -> u64 {
        compression::DEFLATE as u64
    }
}
