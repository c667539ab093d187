//! TIFF validation utilities
//!
//! This module provides validation functions for TIFF files
//! to ensure data integrity and prevent errors when processing
//! potentially malformed files.

use log::{debug, error, warn};
use std::io::{Seek, SeekFrom};

use crate::io::seekable::SeekableReader;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::io::byte_order::ByteOrderHandler;
use crate::tiff::constants::header;
use crate::tiff::ifd::IFDEntry;

/// Validates an IFD offset to ensure it's within reasonable bounds
///
/// # Arguments
/// * `offset` - The offset to validate
/// * `file_size` - The file size for validation
///
/// # Returns
/// Ok if the offset is valid, an error otherwise
pub fn validate_ifd_offset(offset: u64, file_size: u64) -> TiffResult<()> {
    if offset >= file_size || offset < 8 {
        return Err(TiffError::GenericError(format!(
            "Invalid IFD offset: {} (file size: {})",
            offset, file_size
        )));
    }

    Ok(())
}

/// Gets the file size for validation purposes
///
/// # Arguments
/// * `reader` - The seekable reader to use
///
/// # Returns
/// The file size or u64::MAX if it couldn't be determined
pub fn get_file_size(reader: &mut dyn SeekableReader) -> TiffResult<u64> {
    let current_position = reader.seek(SeekFrom::Current(0))?;
    let file_size = match reader.seek(SeekFrom::End(0)) {
        Ok(size) => {
            // Reset position after getting size
            reader.seek(SeekFrom::Start(current_position))?;
            size
        },
        Err(e) => {
            warn!("Could not determine file size: {}", e);
            // Reset position and return MAX as fallback
            reader.seek(SeekFrom::Start(current_position))?;
            u64::MAX
        }
    };

    Ok(file_size)
}

/// Validates the BigTIFF header
///
/// BigTIFF has specific header requirements beyond the standard TIFF.
/// This method verifies that those requirements are met.
///
/// # Arguments
/// * `reader` - The seekable reader to use
/// * `byte_order_handler` - Handler for the file's byte order
pub fn validate_bigtiff_header(
    reader: &mut dyn SeekableReader,
    byte_order_handler: &dyn ByteOrderHandler
) -> TiffResult<()> {
    // In BigTIFF, after the version number (43) comes:
    // - Offset size (should be 8)
    // - Reserved value (should be 0)
    let offset_size = byte_order_handler.read_u16(reader)?;
    let zeros = byte_order_handler.read_u16(reader)?;

    debug!("BigTIFF offset size: {}", offset_size);
    debug!("BigTIFF zeros: {}", zeros);

    if offset_size != header::BIGTIFF_OFFSET_SIZE || zeros != 0 {
        error!("Invalid BigTIFF header: offset_size={}, zeros={}", offset_size, zeros);
        return Err(TiffError::InvalidBigTIFFHeader);
    }

    Ok(())
}

/// Validates that a chunk lies entirely inside the file
///
/// # Arguments
/// * `offset` - Offset of the chunk
/// * `byte_count` - Size of the chunk in bytes
/// * `file_size` - The file size for validation
pub fn validate_chunk_bounds(offset: u64, byte_count: u64, file_size: u64) -> TiffResult<()> {
    match offset.checked_add(byte_count) {
        Some(end) if end <= file_size => Ok(()),
        _ => Err(TiffError::GenericError(format!(
            "Chunk at offset {} with {} bytes exceeds file size {}",
            offset, byte_count, file_size
        ))),
    }
}

/// Validates that an out-of-line tag value lies inside the file
///
/// Runs before any buffer is sized from the entry's count.
pub fn validate_tag_extent(entry: &IFDEntry, file_size: u64) -> TiffResult<()> {
    let byte_size = entry.value_byte_size().ok_or_else(|| TiffError::GenericError(format!(
        "Tag {} declares {} values, too many to address", entry.tag, entry.count
    )))?;
    validate_chunk_bounds(entry.value_offset, byte_size, file_size).map_err(|_| TiffError::GenericError(format!(
        "Tag {} with {} values at offset {} exceeds file size {}",
        entry.tag, entry.count, entry.value_offset, file_size
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_offsets_inside_header() {
        assert!(validate_ifd_offset(4, 100).is_err());
        assert!(validate_ifd_offset(8, 100).is_ok());
        assert!(validate_ifd_offset(100, 100).is_err());
    }

    #[test]
    fn rejects_chunks_past_end_of_file() {
        assert!(validate_chunk_bounds(90, 10, 100).is_ok());
        assert!(validate_chunk_bounds(90, 11, 100).is_err());
        assert!(validate_chunk_bounds(u64::MAX, 2, 100).is_err());
    }
}
