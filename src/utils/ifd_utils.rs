//! IFD utilities
//!
//! Utilities for locating Image File Directories (IFDs) in TIFF files.

use log::debug;
use crate::io::seekable::SeekableReader;
use crate::io::byte_order::ByteOrderHandler;
use crate::tiff::errors::TiffResult;
use crate::tiff::ifd::IFD;

/// Reads an IFD offset at the current position
///
/// Offsets are 4 bytes in classic TIFF and 8 bytes in BigTIFF. A zero
/// offset terminates the IFD chain.
fn read_ifd_offset(
    reader: &mut dyn SeekableReader,
    is_big_tiff: bool,
    byte_order_handler: &dyn ByteOrderHandler
) -> TiffResult<u64> {
    if is_big_tiff {
        Ok(byte_order_handler.read_u64(reader)?)
    } else {
        Ok(byte_order_handler.read_u32(reader)? as u64)
    }
}

/// Reads the first IFD offset from a TIFF file header
///
/// The reader must be positioned right after the version (and, for
/// BigTIFF, the offset-size) fields.
pub fn read_first_ifd_offset(
    reader: &mut dyn SeekableReader,
    is_big_tiff: bool,
    byte_order_handler: &dyn ByteOrderHandler
) -> TiffResult<u64> {
    debug!("Reading {} first IFD offset", if is_big_tiff { "BigTIFF" } else { "standard TIFF" });
    read_ifd_offset(reader, is_big_tiff, byte_order_handler)
}

/// Reads the next IFD offset, or 0 if there are no more IFDs
pub fn read_next_ifd_offset(
    reader: &mut dyn SeekableReader,
    is_big_tiff: bool,
    byte_order_handler: &dyn ByteOrderHandler
) -> TiffResult<u64> {
    read_ifd_offset(reader, is_big_tiff, byte_order_handler)
}

/// Calculates the size of an IFD in bytes, up to (not including) the next-IFD offset
pub fn calculate_ifd_size(ifd: &IFD, is_big_tiff: bool) -> u64 {
    if is_big_tiff {
        // 8 (entry count) + 20 (each entry)
        8 + (20 * ifd.entries.len() as u64)
    } else {
        // 2 (entry count) + 12 (each entry)
        2 + (12 * ifd.entries.len() as u64)
    }
}
