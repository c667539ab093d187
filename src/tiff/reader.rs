//! TIFF file reader implementation
//!
//! This module implements the TIFF/BigTIFF file reader that uses the
//! Strategy pattern to handle different byte orders.

use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::io::seekable::SeekableReader;
use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::tiff::constants::field_types;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::types::TIFF;
use crate::tiff::validation;
use crate::utils::format_utils;
use crate::utils::ifd_utils;
use crate::utils::tag_utils;
use crate::utils::string_utils;

/// Upper bound on the IFD chain length, guards against offset loops
const MAX_IFDS: usize = 100;

/// Reader for TIFF and BigTIFF files
///
/// The reader parses the header and IFD chain; pixel data and GeoTIFF
/// values are fetched afterwards through the `read_*` helpers, which
/// reuse the detected byte order.
pub struct TiffReader {
    /// Current byte order handler
    pub(crate) byte_order_handler: Option<Box<dyn ByteOrderHandler>>,
    /// Whether currently reading BigTIFF format
    pub(crate) is_big_tiff: bool,
}

impl Default for TiffReader {
    fn default() -> Self {
        Self::new()
    }
}

impl TiffReader {
    /// Creates a new TIFF reader
    pub fn new() -> Self {
        TiffReader {
            byte_order_handler: None,
            is_big_tiff: false,
        }
    }

    /// Returns the byte order handler, with proper error handling for None case
    ///
    /// This centralizes the error handling for byte_order_handler access
    pub(crate) fn handler(&self) -> TiffResult<&dyn ByteOrderHandler> {
        self.byte_order_handler.as_deref()
            .ok_or_else(|| TiffError::GenericError("Byte order not yet determined".to_string()))
    }

    /// Byte order of the file read last
    pub fn byte_order(&self) -> TiffResult<ByteOrder> {
        Ok(self.handler()?.byte_order())
    }

    /// Opens a TIFF file for buffered reading
    pub fn open(filepath: &Path) -> TiffResult<BufReader<File>> {
        info!("Opening TIFF file: {}", filepath.display());
        let file = File::open(filepath)?;
        Ok(BufReader::with_capacity(1024 * 1024, file)) // 1MB buffer
    }

    /// Loads a TIFF file from the given path
    ///
    /// Opens the file and delegates to the read() method. The returned
    /// reader stays positioned inside the file for follow-up reads.
    pub fn load(&mut self, filepath: &Path) -> TiffResult<(TIFF, BufReader<File>)> {
        let mut reader = Self::open(filepath)?;
        let tiff = self.read(&mut reader)?;
        Ok((tiff, reader))
    }

    /// Reads a TIFF file from the given reader
    ///
    /// This method handles the core process of reading a TIFF file:
    /// 1. Detect byte order (little/big endian)
    /// 2. Check for TIFF or BigTIFF format
    /// 3. Read all IFDs (Image File Directories)
    pub fn read(&mut self, reader: &mut dyn SeekableReader) -> TiffResult<TIFF> {
        debug!("Reader::read starting");
        reader.seek(SeekFrom::Start(0))?;

        let handler = format_utils::detect_byte_order(reader)?;
        let (is_big_tiff, _) = format_utils::detect_tiff_format(reader, handler.as_ref())?;
        self.is_big_tiff = is_big_tiff;

        let first_ifd_offset = ifd_utils::read_first_ifd_offset(reader, is_big_tiff, handler.as_ref())?;
        debug!("First IFD offset: {}", first_ifd_offset);
        self.byte_order_handler = Some(handler);

        let file_size = validation::get_file_size(reader)?;
        validation::validate_ifd_offset(first_ifd_offset, file_size)?;

        let mut tiff = TIFF::new(self.is_big_tiff);
        tiff.ifds = self.read_ifd_chain(reader, first_ifd_offset)?;

        info!("Read {} IFDs from TIFF file", tiff.ifds.len());
        Ok(tiff)
    }

    /// Reads a chain of IFDs starting from the given offset
    fn read_ifd_chain(&self, reader: &mut dyn SeekableReader, first_ifd_offset: u64) -> TiffResult<Vec<IFD>> {
        let mut ifds = Vec::new();
        let mut ifd_offset = first_ifd_offset;
        let handler = self.handler()?;
        let file_size = validation::get_file_size(reader)?;

        while ifd_offset != 0 && ifds.len() < MAX_IFDS {
            debug!("Reading IFD at offset: {}", ifd_offset);

            if ifd_offset >= file_size {
                warn!("IFD offset {} exceeds file size {}, stopping IFD chain",
                      ifd_offset, file_size);
                break;
            }

            // The main IFD must be readable; later ones (overviews, masks) are optional
            let ifd = match self.read_ifd(reader, ifd_offset, ifds.len()) {
                Ok(ifd) => ifd,
                Err(e) if !ifds.is_empty() => {
                    warn!("Error reading IFD {}: {}", ifds.len(), e);
                    break;
                },
                Err(e) => return Err(e),
            };

            let next_offset_position = ifd_offset + ifd_utils::calculate_ifd_size(&ifd, self.is_big_tiff);
            ifds.push(ifd);

            if next_offset_position >= file_size {
                warn!("Next IFD offset position {} exceeds file size {}",
                      next_offset_position, file_size);
                break;
            }

            reader.seek(SeekFrom::Start(next_offset_position))?;
            let next_ifd_offset = match ifd_utils::read_next_ifd_offset(reader, self.is_big_tiff, handler) {
                Ok(offset) => offset,
                Err(e) => {
                    warn!("Error reading next IFD offset: {}", e);
                    break;
                }
            };

            debug!("Next IFD offset: {}", next_ifd_offset);

            if next_ifd_offset != 0 && (next_ifd_offset >= file_size || next_ifd_offset < 8) {
                warn!("Invalid next IFD offset: {}, stopping IFD chain", next_ifd_offset);
                break;
            }

            ifd_offset = next_ifd_offset;
        }

        Ok(ifds)
    }

    /// Reads an IFD from the reader
    ///
    /// An IFD (Image File Directory) contains all the metadata for a single image.
    /// It consists of a count followed by a series of entries, each describing
    /// an aspect of the image (dimensions, color space, compression, etc.)
    pub fn read_ifd(&self, reader: &mut dyn SeekableReader, offset: u64, number: usize) -> TiffResult<IFD> {
        reader.seek(SeekFrom::Start(offset))?;

        let entry_count = self.read_ifd_entry_count(reader)?;
        debug!("IFD entry count: {}", entry_count);

        let mut ifd = IFD::new(number, offset);

        for _ in 0..entry_count {
            let entry = self.read_ifd_entry(reader)?;
            ifd.add_entry(entry);
        }

        debug!("Read IFD with {} entries", ifd.entries.len());
        Ok(ifd)
    }

    /// Reads the entry count from an IFD
    fn read_ifd_entry_count(&self, reader: &mut dyn SeekableReader) -> TiffResult<u64> {
        let handler = self.handler()?;
        if self.is_big_tiff {
            Ok(handler.read_u64(reader)?)
        } else {
            Ok(handler.read_u16(reader)? as u64)
        }
    }

    /// Reads a single IFD entry
    ///
    /// Single integer values stored inline are decoded into `value_offset`
    /// so callers can use them directly; everything else keeps the offset.
    fn read_ifd_entry(&self, reader: &mut dyn SeekableReader) -> TiffResult<IFDEntry> {
        let handler = self.handler()?;
        let byte_order = handler.byte_order();

        let tag = handler.read_u16(reader)?;
        let field_type = handler.read_u16(reader)?;
        let count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u32(reader)? as u64
        };

        let field_size = if self.is_big_tiff { 8 } else { 4 };
        let mut raw_value = [0u8; 8];
        reader.read_exact(&mut raw_value[..field_size])?;

        let value_size = tag_utils::field_type_size(field_type);
        let is_inline = (value_size as u64).checked_mul(count)
            .map_or(false, |size| size <= field_size as u64);
        let is_integer = !matches!(field_type,
            field_types::FLOAT | field_types::DOUBLE | field_types::RATIONAL |
            field_types::SRATIONAL | field_types::ASCII);

        let value_offset = if is_inline && count == 1 && is_integer {
            byte_order.read_uint(&raw_value, value_size)
        } else {
            byte_order.read_uint(&raw_value, field_size)
        };

        Ok(IFDEntry::with_raw_value(tag, field_type, count, value_offset, raw_value, byte_order))
    }

    /// Reads a tag's value as a vector of u64
    ///
    /// Handles inline and out-of-line storage and the integer field types.
    pub fn read_tag_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<u64>> {
        let entry = ifd.get_entry(tag)
            .ok_or(TiffError::TagNotFound(tag))?;

        if entry.is_value_inline(self.is_big_tiff) {
            return tag_utils::decode_inline_values(entry);
        }

        self.check_tag_extent(reader, entry)?;
        let mut values = Vec::with_capacity(entry.count as usize);
        reader.seek(SeekFrom::Start(entry.value_offset))?;
        tag_utils::read_tag_value_array(reader, entry, self.handler()?, &mut values)?;

        Ok(values)
    }

    /// Reads a FLOAT/DOUBLE tag as a vector of f64
    pub fn read_tag_floats(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<f64>> {
        let entry = ifd.get_entry(tag)
            .ok_or(TiffError::TagNotFound(tag))?;
        let handler = self.handler()?;

        if entry.is_value_inline(self.is_big_tiff) {
            let order = handler.byte_order();
            let size = entry.get_field_type_size();
            return Ok((0..entry.count as usize)
                .map(|i| {
                    let bytes = &entry.raw_value[i * size..];
                    if size == 8 { order.read_f64_bytes(bytes) } else { order.read_f32_bytes(bytes) as f64 }
                })
                .collect());
        }

        self.check_tag_extent(reader, entry)?;
        reader.seek(SeekFrom::Start(entry.value_offset))?;
        tag_utils::read_tag_float_array(reader, entry, handler)
    }

    /// Reads an ASCII tag, with trailing null characters removed
    pub fn read_tag_ascii(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<String> {
        let entry = ifd.get_entry(tag)
            .ok_or(TiffError::TagNotFound(tag))?;

        let mut buffer = if entry.is_value_inline(self.is_big_tiff) {
            entry.raw_value[..entry.count as usize].to_vec()
        } else {
            self.check_tag_extent(reader, entry)?;
            reader.seek(SeekFrom::Start(entry.value_offset))?;
            let mut buffer = vec![0u8; entry.count as usize];
            reader.read_exact(&mut buffer)?;
            buffer
        };

        string_utils::trim_trailing_nulls(&mut buffer);

        String::from_utf8(buffer)
            .map_err(|e| TiffError::GenericError(format!("Invalid UTF-8 string: {}", e)))
    }

    fn check_tag_extent(&self, reader: &mut dyn SeekableReader, entry: &IFDEntry) -> TiffResult<()> {
        let file_size = validation::get_file_size(reader)?;
        validation::validate_tag_extent(entry, file_size)
    }

    /// Returns whether the current file is a BigTIFF
    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }
}
