//! Handler for PackBits compressed data

use crate::tiff::constants::compression;
use crate::tiff::errors::{TiffError, TiffResult};
use super::handler::CompressionHandler;

/// PackBits run-length handler (compression code 32773)
pub struct PackBitsHandler;

impl CompressionHandler for PackBitsHandler {
    fn decompress(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        let mut output = Vec::with_capacity(data.len() * 2);
        let mut pos = 0;

        while pos < data.len() {
            let header = data[pos] as i8;
            pos += 1;

            match header {
                // No-op byte
                -128 => {},
                0..=127 => {
                    let end = pos + header as usize + 1;
                    let literal = data.get(pos..end).ok_or_else(|| TiffError::Decompression {
                        codec: self.name(),
                        message: format!("literal run of {} bytes past end of input", end - pos),
                    })?;
                    output.extend_from_slice(literal);
                    pos = end;
                },
                _ => {
                    let value = *data.get(pos).ok_or_else(|| TiffError::Decompression {
                        codec: self.name(),
                        message: "repeat run without a value byte".to_string(),
                    })?;
                    let repeat = 1 - header as isize;
                    output.extend(std::iter::repeat(value).take(repeat as usize));
                    pos += 1;
                },
            }
        }

        Ok(output)
    }

    fn name(&self) -> &'static str {
        "PackBits"
    }

    fn code(&self) -> u64 {
        compression::PACKBITS as u64
    }
}
