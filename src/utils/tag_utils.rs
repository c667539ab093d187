//! TIFF tag utilities
//!
//! Utilities for working with TIFF tags and their values.

use byteorder::ReadBytesExt;

use crate::io::seekable::SeekableReader;
use crate::io::byte_order::ByteOrderHandler;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFDEntry;
use crate::tiff::constants::{field_types, tags, compression};

/// Size in bytes of one value of the given field type
pub fn field_type_size(field_type: u16) -> usize {
    match field_type {
        field_types::BYTE | field_types::ASCII | field_types::SBYTE | field_types::UNDEFINED => 1,
        field_types::SHORT | field_types::SSHORT => 2,
        field_types::LONG | field_types::SLONG | field_types::FLOAT => 4,
        field_types::RATIONAL | field_types::SRATIONAL | field_types::DOUBLE => 8,
        field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => 8,
        _ => 1, // Default for unknown types
    }
}

/// Reads an array of integer tag values based on the field type
///
/// # Arguments
/// * `reader` - The seekable reader, positioned at the value array
/// * `entry` - The IFD entry with tag information
/// * `handler` - The byte order handler
/// * `values` - The vector to store values in
pub fn read_tag_value_array(
    reader: &mut dyn SeekableReader,
    entry: &IFDEntry,
    handler: &dyn ByteOrderHandler,
    values: &mut Vec<u64>
) -> TiffResult<()> {
    for _ in 0..entry.count {
        let value = match entry.field_type {
            field_types::BYTE | field_types::SBYTE | field_types::UNDEFINED => reader.read_u8()? as u64,
            field_types::SHORT | field_types::SSHORT => handler.read_u16(reader)? as u64,
            field_types::LONG | field_types::SLONG => handler.read_u32(reader)? as u64,
            field_types::RATIONAL | field_types::SRATIONAL => {
                let (num, den) = handler.read_rational(reader)?;
                ((num as u64) << 32) | (den as u64)
            },
            field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => handler.read_u64(reader)?,
            _ => return Err(TiffError::UnsupportedFieldType(entry.field_type)),
        };

        values.push(value);
    }

    Ok(())
}

/// Reads an array of floating point tag values (FLOAT or DOUBLE)
pub fn read_tag_float_array(
    reader: &mut dyn SeekableReader,
    entry: &IFDEntry,
    handler: &dyn ByteOrderHandler,
) -> TiffResult<Vec<f64>> {
    let mut values = Vec::with_capacity(entry.count as usize);
    for _ in 0..entry.count {
        let value = match entry.field_type {
            field_types::DOUBLE => handler.read_f64(reader)?,
            field_types::FLOAT => handler.read_f32(reader)? as f64,
            _ => return Err(TiffError::UnsupportedFieldType(entry.field_type)),
        };
        values.push(value);
    }

    Ok(values)
}

/// Decodes integer values stored inline in an entry's value field
pub fn decode_inline_values(entry: &IFDEntry) -> TiffResult<Vec<u64>> {
    let size = field_type_size(entry.field_type);
    match entry.field_type {
        field_types::BYTE | field_types::SBYTE | field_types::UNDEFINED |
        field_types::SHORT | field_types::SSHORT |
        field_types::LONG | field_types::SLONG |
        field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => {
            Ok((0..entry.count as usize)
                .map(|i| entry.byte_order.read_uint(&entry.raw_value[i * size..], size))
                .collect())
        },
        _ => Err(TiffError::UnsupportedFieldType(entry.field_type)),
    }
}

/// Get the name of a TIFF tag
///
/// Returns a human-readable name for a tag based on its numeric ID.
/// If the tag is not recognized, returns "Unknown".
pub fn get_tag_name(tag: u16) -> &'static str {
    match tag {
        tags::NEW_SUBFILE_TYPE => "NewSubfileType",
        tags::IMAGE_WIDTH => "ImageWidth",
        tags::IMAGE_LENGTH => "ImageLength",
        tags::BITS_PER_SAMPLE => "BitsPerSample",
        tags::COMPRESSION => "Compression",
        tags::PHOTOMETRIC_INTERPRETATION => "PhotometricInterpretation",
        tags::SAMPLES_PER_PIXEL => "SamplesPerPixel",
        tags::ROWS_PER_STRIP => "RowsPerStrip",
        tags::STRIP_OFFSETS => "StripOffsets",
        tags::STRIP_BYTE_COUNTS => "StripByteCounts",
        tags::PLANAR_CONFIGURATION => "PlanarConfiguration",
        tags::SAMPLE_FORMAT => "SampleFormat",
        tags::PREDICTOR => "Predictor",

        // Tiling tags
        tags::TILE_OFFSETS => "TileOffsets",
        tags::TILE_BYTE_COUNTS => "TileByteCounts",
        tags::TILE_WIDTH => "TileWidth",
        tags::TILE_LENGTH => "TileLength",

        // GeoTIFF tags
        tags::MODEL_PIXEL_SCALE_TAG => "ModelPixelScale",
        tags::MODEL_TIEPOINT_TAG => "ModelTiepoint",
        tags::GEO_KEY_DIRECTORY_TAG => "GeoKeyDirectory",
        tags::GEO_DOUBLE_PARAMS_TAG => "GeoDoubleParams",
        tags::GEO_ASCII_PARAMS_TAG => "GeoAsciiParams",
        tags::MODEL_TRANSFORMATION_TAG => "ModelTransformation",

        // GDAL specific tags
        tags::GDAL_METADATA => "GDALMetadata",
        tags::GDAL_NODATA => "GDALNoData",

        _ => "Unknown",
    }
}

/// Get the name of a TIFF field type
pub fn get_field_type_name(field_type: u16) -> &'static str {
    match field_type {
        field_types::BYTE => "BYTE",
        field_types::ASCII => "ASCII",
        field_types::SHORT => "SHORT",
        field_types::LONG => "LONG",
        field_types::RATIONAL => "RATIONAL",
        field_types::SBYTE => "SBYTE",
        field_types::UNDEFINED => "UNDEFINED",
        field_types::SSHORT => "SSHORT",
        field_types::SLONG => "SLONG",
        field_types::SRATIONAL => "SRATIONAL",
        field_types::FLOAT => "FLOAT",
        field_types::DOUBLE => "DOUBLE",
        field_types::LONG8 => "LONG8",
        field_types::SLONG8 => "SLONG8",
        field_types::IFD8 => "IFD8",
        _ => "Unknown",
    }
}

/// Get the name of a compression method
pub fn get_compression_name(compression_code: u64) -> &'static str {
    match compression_code as u16 {
        compression::NONE => "None",
        compression::LZW => "LZW",
        compression::JPEG => "JPEG",
        compression::DEFLATE | compression::DEFLATE_OLD => "Adobe Deflate",
        compression::PACKBITS => "PackBits",
        compression::ZSTD => "Zstandard",
        _ => "Unknown",
    }
}
