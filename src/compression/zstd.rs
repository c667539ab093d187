//! Handler for ZSTD compressed data

use crate::tiff::constants::compression;
use crate::tiff::errors::{TiffError, TiffResult};
use super::handler::CompressionHandler;
use log::{debug, warn};

/// ZSTD compression handler (compression code 50000)
pub struct ZstdHandler;

impl CompressionHandler for ZstdHandler {
    fn decompress(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        debug!("ZSTD decompressing {} bytes", data.len());
        if data.is_empty() {
            return Ok(Vec::new());
        }

        match zstd::decode_all(data) {
            Ok(decompressed_data) => {
                debug!("ZSTD decompressed to {} bytes", decompressed_data.len());
                Ok(decompressed_data)
            },
            Err(e) => {
                warn!("ZSTD decompression error: {}", e);
                Err(TiffError::Decompression { codec: self.name(), message: e.to_string() })
            }
        }
    }

    fn name(&self) -> &'static str {
        "ZSTD"
    }

    fn code(&self) -> u64 {
        compression::ZSTD as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_zstd_frame() {
        let data: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let compressed = zstd::encode_all(&data[..], 3).unwrap();
        assert_eq!(ZstdHandler.decompress(&compressed).unwrap(), data);
    }
}
