//! Handler for LZW compressed data
//!
//! TIFF flavour of LZW: codes are packed MSB-first, start at 9 bits and
//! widen one code early (at 511, 1023 and 2047 table entries).

use log::debug;
use crate::tiff::constants::compression;
use crate::tiff::errors::{TiffError, TiffResult};
use super::handler::CompressionHandler;

const CLEAR_CODE: usize = 256;
const EOI_CODE: usize = 257;
const FIRST_FREE: usize = 258;
const MAX_ENTRIES: usize = 4096;

/// LZW compression handler (compression code 5)
pub struct LzwHandler;

/// MSB-first reader of variable width codes
struct CodeReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> CodeReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        CodeReader { data, bit_pos: 0 }
    }

    /// Next `width` bit code, `None` once the input is exhausted
    fn next_code(&mut self, width: usize) -> Option<usize> {
        if self.bit_pos + width > self.data.len() * 8 {
            return None;
        }

        let mut code = 0usize;
        for _ in 0..width {
            let byte = self.data[self.bit_pos / 8];
            let bit = (byte >> (7 - self.bit_pos % 8)) & 1;
            code = (code << 1) | bit as usize;
            self.bit_pos += 1;
        }
        Some(code)
    }
}

fn code_width(table_len: usize) -> usize {
    match table_len + 1 {
        n if n >= 2048 => 12,
        n if n >= 1024 => 11,
        n if n >= 512 => 10,
        _ => 9,
    }
}

impl CompressionHandler for LzwHandler {
    fn decompress(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        let mut table: Vec<Vec<u8>> = (0..FIRST_FREE)
            .map(|code| if code < CLEAR_CODE { vec![code as u8] } else { Vec::new() })
            .collect();
        let mut reader = CodeReader::new(data);
        let mut output = Vec::with_capacity(data.len() * 2);
        let mut previous: Option<usize> = None;
        let mut width = 9;

        while let Some(code) = reader.next_code(width) {
            if code == EOI_CODE {
                break;
            }
            if code == CLEAR_CODE {
                table.truncate(FIRST_FREE);
                width = 9;
                previous = None;
                continue;
            }

            let entry = match previous {
                _ if code < table.len() => table[code].clone(),
                Some(prev) if code == table.len() => {
                    let mut entry = table[prev].clone();
                    entry.push(entry[0]);
                    entry
                },
                _ => return Err(TiffError::Decompression {
                    codec: self.name(),
                    message: format!("invalid code {} with {} table entries", code, table.len()),
                }),
            };

            output.extend_from_slice(&entry);

            if let Some(prev) = previous {
                if table.len() < MAX_ENTRIES {
                    let mut new_entry = table[prev].clone();
                    new_entry.push(entry[0]);
                    table.push(new_entry);
                }
            }

            previous = Some(code);
            width = code_width(table.len());
        }

        debug!("LZW decompressed {} bytes to {} bytes", data.len(), output.len());
        Ok(output)
    }

    fn name(&self) -> &'static str {
        "LZW"
    }

    fn code(&self) -> u64 {
        compression::LZW as u64
    }
}
