//! Image File Directory (IFD) structures and methods
//!
//! This module implements the core TIFF IFD (Image File Directory) structures
//! that store metadata about images in a TIFF file. IFDs are organized as
//! collections of tag entries, with each tag describing an aspect of the image.

use std::collections::HashMap;
use std::fmt;
use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::{planar_config, tags};
use log::{debug, trace};
use crate::utils::tag_utils;

/// Represents an Image File Directory (IFD) in a TIFF file
///
/// An IFD contains metadata about an image, stored as a series of tag entries.
/// TIFF files can contain multiple IFDs, each describing a separate image in
/// a multipage TIFF.
#[derive(Debug, Clone)]
pub struct IFD {
    /// Entries in this IFD
    pub entries: Vec<IFDEntry>,
    /// IFD number (0-based)
    pub number: usize,
    /// Offset to this IFD in the file
    pub offset: u64,
    /// Cached tag values for quick lookup
    tag_map: HashMap<u16, IFDEntry>,
}

/// Represents an entry in an Image File Directory (IFD)
///
/// Each entry describes one aspect of the image (dimensions, color space,
/// compression, etc.) using a tag-value pair. The field_type determines
/// how to interpret the value or offset.
#[derive(Debug, Clone)]
pub struct IFDEntry {
    /// TIFF tag identifier
    pub tag: u16,
    /// Field type
    pub field_type: u16,
    /// Number of values
    pub count: u64,
    /// Value (single inline values, already decoded) or offset to values
    pub value_offset: u64,
    /// Raw bytes of the value field as stored in the file (4 or 8 used)
    pub raw_value: [u8; 8],
    /// Byte order of `raw_value`
    pub byte_order: ByteOrder,
}

impl IFDEntry {
    /// Creates a new IFD entry
    ///
    /// For small values, value_offset contains the actual value.
    /// For larger values, it contains an offset to where the value is stored.
    /// The raw value field is assumed to be little-endian.
    pub fn new(tag: u16, field_type: u16, count: u64, value_offset: u64) -> Self {
        Self::with_raw_value(tag, field_type, count, value_offset,
                             value_offset.to_le_bytes(), ByteOrder::LittleEndian)
    }

    /// Creates a new IFD entry keeping the raw bytes of its value field
    pub fn with_raw_value(
        tag: u16,
        field_type: u16,
        count: u64,
        value_offset: u64,
        raw_value: [u8; 8],
        byte_order: ByteOrder,
    ) -> Self {
        trace!("Creating new IFD entry: tag={} ({}), type={} ({}), count={}, offset/value={}",
               tag, tag_utils::get_tag_name(tag), field_type,
               tag_utils::get_field_type_name(field_type), count, value_offset);

        Self {
            tag,
            field_type,
            count,
            value_offset,
            raw_value,
            byte_order,
        }
    }

    /// Get the size in bytes for this entry's field type
    pub fn get_field_type_size(&self) -> usize {
        tag_utils::field_type_size(self.field_type)
    }

    /// Determines if the value is stored inline in the value field
    /// rather than at the offset location
    pub fn is_value_inline(&self, is_big_tiff: bool) -> bool {
        let inline_size = if is_big_tiff { 8 } else { 4 };
        self.value_byte_size().map_or(false, |size| size <= inline_size)
    }

    /// Total size of the entry's values in bytes, `None` on overflow
    pub fn value_byte_size(&self) -> Option<u64> {
        (self.get_field_type_size() as u64).checked_mul(self.count)
    }

    /// Returns a human-readable description of this entry
    pub fn description(&self) -> String {
        let value_display = match self.tag {
            tags::COMPRESSION => format!("{} ({})",
                                         self.value_offset,
                                         tag_utils::get_compression_name(self.value_offset)),
            _ => self.value_offset.to_string()
        };

        format!("Tag: {} ({}), Type: {} ({}), Count: {}, Value/Offset: {}",
                self.tag, tag_utils::get_tag_name(self.tag), self.field_type,
                tag_utils::get_field_type_name(self.field_type), self.count, value_display)
    }
}

impl IFD {
    /// Creates a new IFD
    pub fn new(number: usize, offset: u64) -> Self {
        debug!("Creating new IFD #{} at offset {}", number, offset);

        Self {
            entries: Vec::new(),
            number,
            offset,
            tag_map: HashMap::new(),
        }
    }

    /// Adds an entry to this IFD
    ///
    /// This method adds a tag entry to the IFD and also updates the
    /// lookup cache for fast access by tag number.
    pub fn add_entry(&mut self, entry: IFDEntry) {
        trace!("Adding entry to IFD #{}: {}", self.number, entry.description());

        self.tag_map.insert(entry.tag, entry.clone());
        self.entries.push(entry);
    }

    /// Gets a tag value (value_offset) directly
    ///
    /// Only meaningful for single-valued tags; multi-valued tags yield
    /// the offset of their value array.
    pub fn get_tag_value(&self, tag: u16) -> Option<u64> {
        let value = self.tag_map.get(&tag).map(|entry| entry.value_offset);

        if let Some(val) = value {
            trace!("Found tag {} ({}) in IFD #{}: value/offset={}",
                   tag, tag_utils::get_tag_name(tag), self.number, val);
        }

        value
    }

    /// Checks if this IFD has a specific tag
    pub fn has_tag(&self, tag: u16) -> bool {
        self.tag_map.contains_key(&tag)
    }

    /// Gets an IFD entry by tag
    pub fn get_entry(&self, tag: u16) -> Option<&IFDEntry> {
        self.tag_map.get(&tag)
    }

    /// Gets the dimensions of the image described by this IFD
    ///
    /// Returns the width and height of the image if both tags are present.
    pub fn get_dimensions(&self) -> Option<(u64, u64)> {
        let width = self.get_tag_value(tags::IMAGE_WIDTH)?;
        let height = self.get_tag_value(tags::IMAGE_LENGTH)?;

        debug!("Image dimensions from IFD #{}: {}x{}", self.number, width, height);

        Some((width, height))
    }

    /// Returns number of samples per pixel (default 1 if not specified)
    ///
    /// For multispectral rasters this is the band count.
    pub fn get_samples_per_pixel(&self) -> u64 {
        self.get_tag_value(tags::SAMPLES_PER_PIXEL).unwrap_or(1)
    }

    /// Returns the planar configuration (default chunky)
    pub fn get_planar_configuration(&self) -> u16 {
        self.get_tag_value(tags::PLANAR_CONFIGURATION)
            .map(|v| v as u16)
            .unwrap_or(planar_config::CHUNKY)
    }

    /// Whether image data is organized in tiles rather than strips
    pub fn is_tiled(&self) -> bool {
        self.has_tag(tags::TILE_OFFSETS)
    }

    /// Gets the number of entries in this IFD
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Display for IFD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IFD #{} (offset: {})", self.number, self.offset)?;
        writeln!(f, "  Number of entries: {}", self.entries.len())?;

        if let Some((width, height)) = self.get_dimensions() {
            writeln!(f, "  Dimensions: {}x{}", width, height)?;
        }

        writeln!(f, "  Samples per pixel: {}", self.get_samples_per_pixel())?;

        writeln!(f, "  Tags:")?;
        for entry in &self.entries {
            writeln!(f, "    {}", entry.description())?;
        }

        Ok(())
    }
}
