//! Tests for the TIFF reader and GeoTIFF parsing

extern crate std;

use std::io::Cursor;

use super::test_utils::{create_test_bigtiff_buffer, create_test_tiff_buffer, TagValue, TiffFixture};
use crate::coordinate::{AffineTransform, CoordinateSystem};
use crate::tiff::constants::{geo_keys, tags, USER_DEFINED};
use crate::tiff::errors::TiffError;
use crate::tiff::geo_key_parser::GeoKeyParser;
use crate::tiff::reader::TiffReader;

fn geo_key_directory(keys: &[(u16, u16, u16, u16)]) -> TagValue {
    let mut values = vec![1, 1, 0, keys.len() as u16];
    for (id, location, count, value) in keys {
        values.extend_from_slice(&[*id, *location, *count, *value]);
    }
    TagValue::Short(values)
}

fn georeferenced_fixture(big_endian: bool, keys: &[(u16, u16, u16, u16)]) -> TiffFixture {
    TiffFixture::new(big_endian)
        .tag(tags::IMAGE_WIDTH, TagValue::Long(vec![4]))
        .tag(tags::IMAGE_LENGTH, TagValue::Long(vec![3]))
        .tag(tags::BITS_PER_SAMPLE, TagValue::Short(vec![8, 8, 8]))
        .tag(tags::SAMPLES_PER_PIXEL, TagValue::Short(vec![3]))
        .tag(tags::MODEL_PIXEL_SCALE_TAG, TagValue::Double(vec![10.0, 10.0, 0.0]))
        .tag(tags::MODEL_TIEPOINT_TAG, TagValue::Double(vec![0.0, 0.0, 0.0, 500_000.0, 4_000_000.0, 0.0]))
        .tag(tags::GEO_KEY_DIRECTORY_TAG, geo_key_directory(keys))
}

const UTM_33N_KEYS: [(u16, u16, u16, u16); 3] = [
    (geo_keys::MODEL_TYPE, 0, 1, 1),
    (geo_keys::RASTER_TYPE, 0, 1, 1),
    (geo_keys::PROJECTED_CS_TYPE, 0, 1, 32633),
];

#[test]
fn test_read_standard_tiff() {
    let mut cursor = create_test_tiff_buffer();
    let mut reader = TiffReader::new();

    let tiff = reader.read(&mut cursor).unwrap();

    std::assert!(!tiff.is_big_tiff);
    std::assert_eq!(tiff.ifd_count(), 1);
    std::assert_eq!(tiff.main_ifd().unwrap().get_dimensions(), Some((800, 600)));
}

#[test]
fn test_read_bigtiff_with_packed_inline_values() {
    let mut cursor = create_test_bigtiff_buffer();
    let mut reader = TiffReader::new();

    let tiff = reader.read(&mut cursor).unwrap();
    let ifd = tiff.main_ifd().unwrap();

    std::assert!(reader.is_big_tiff());
    std::assert_eq!(ifd.get_dimensions(), Some((1024, 768)));
    std::assert_eq!(reader.read_tag_values(&mut cursor, ifd, tags::BITS_PER_SAMPLE).unwrap(),
                    vec![16, 16, 16, 16]);
}

#[test]
fn test_big_endian_values_inline_and_out_of_line() {
    let mut cursor = georeferenced_fixture(true, &UTM_33N_KEYS)
        .tag(tags::SAMPLE_FORMAT, TagValue::Short(vec![1, 2]))
        .cursor();
    let mut reader = TiffReader::new();

    let tiff = reader.read(&mut cursor).unwrap();
    let ifd = tiff.main_ifd().unwrap();

    std::assert_eq!(ifd.get_dimensions(), Some((4, 3)));
    std::assert_eq!(ifd.get_samples_per_pixel(), 3);
    std::assert_eq!(reader.read_tag_values(&mut cursor, ifd, tags::BITS_PER_SAMPLE).unwrap(), vec![8, 8, 8]);
    std::assert_eq!(reader.read_tag_values(&mut cursor, ifd, tags::SAMPLE_FORMAT).unwrap(), vec![1, 2]);
}

#[test]
fn test_missing_tag_is_reported() {
    let mut cursor = create_test_tiff_buffer();
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();

    let result = reader.read_tag_values(&mut cursor, tiff.main_ifd().unwrap(), tags::TILE_WIDTH);
    std::assert!(std::matches!(result, Err(TiffError::TagNotFound(322))));
}

#[test]
fn test_invalid_magic_is_rejected() {
    let mut cursor = Cursor::new(vec![0x12, 0x34, 42, 0, 8, 0, 0, 0]);
    let result = TiffReader::new().read(&mut cursor);
    std::assert!(std::matches!(result, Err(TiffError::InvalidByteOrder(_))));
}

#[test]
fn test_geo_reference_from_tiepoint_and_scale() {
    for big_endian in [false, true] {
        let mut cursor = georeferenced_fixture(big_endian, &UTM_33N_KEYS).cursor();
        let mut reader = TiffReader::new();
        let tiff = reader.read(&mut cursor).unwrap();

        let geo = GeoKeyParser::extract_geo_reference(&reader, &mut cursor, tiff.main_ifd().unwrap()).unwrap();

        std::assert_eq!(geo.transform, AffineTransform::from_origin(500_000.0, 4_000_000.0, 10.0, 10.0));
        std::assert_eq!(geo.crs, Some(CoordinateSystem::UTM(33, true)));
        std::assert_eq!(geo.crs_label(), "EPSG:32633");
    }
}

#[test]
fn test_model_transformation_with_pixel_is_point() {
    let mut cursor = TiffFixture::new(false)
        .tag(tags::IMAGE_WIDTH, TagValue::Long(vec![2]))
        .tag(tags::IMAGE_LENGTH, TagValue::Long(vec![2]))
        .tag(tags::MODEL_TRANSFORMATION_TAG, TagValue::Double(vec![
            2.0, 0.0, 0.0, 100.0,
            0.0, -2.0, 0.0, 50.0,
            0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ]))
        .tag(tags::GEO_KEY_DIRECTORY_TAG, geo_key_directory(&[
            (geo_keys::RASTER_TYPE, 0, 1, 2),
            (geo_keys::GEOGRAPHIC_TYPE, 0, 1, 4326),
        ]))
        .cursor();
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();

    let geo = GeoKeyParser::extract_geo_reference(&reader, &mut cursor, tiff.main_ifd().unwrap()).unwrap();

    std::assert_eq!(geo.transform, AffineTransform::new(2.0, 0.0, 99.0, 0.0, -2.0, 51.0));
    std::assert_eq!(geo.crs, Some(CoordinateSystem::WGS84));
}

#[test]
fn test_user_defined_crs_falls_back_to_citation() {
    let citation = "Custom Lambert|";
    let mut cursor = georeferenced_fixture(false, &[
            (geo_keys::PROJECTED_CS_TYPE, 0, 1, USER_DEFINED),
            (geo_keys::PCS_CITATION, tags::GEO_ASCII_PARAMS_TAG, citation.len() as u16, 0),
        ])
        .tag(tags::GEO_ASCII_PARAMS_TAG, TagValue::Ascii(citation.to_string()))
        .cursor();
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();

    let geo = GeoKeyParser::extract_geo_reference(&reader, &mut cursor, tiff.main_ifd().unwrap()).unwrap();

    std::assert_eq!(geo.crs, None);
    std::assert_eq!(geo.citation.as_deref(), Some("Custom Lambert"));
    std::assert_eq!(geo.crs_label(), "Custom Lambert");
}

#[test]
fn test_missing_georeference_is_an_error() {
    let mut cursor = create_test_tiff_buffer();
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();

    let result = GeoKeyParser::extract_geo_reference(&reader, &mut cursor, tiff.main_ifd().unwrap());
    std::assert!(std::matches!(result, Err(TiffError::MissingGeoreference(_))));
}

/// Fixture whose StripOffsets (third entry) declares `count` values
fn fixture_with_strip_offset_count(count: u32) -> Cursor<Vec<u8>> {
    let mut bytes = TiffFixture::new(false)
        .tag(tags::IMAGE_WIDTH, TagValue::Long(vec![4]))
        .tag(tags::IMAGE_LENGTH, TagValue::Long(vec![3]))
        .tag(tags::STRIP_OFFSETS, TagValue::Long(vec![8, 8, 8]))
        .build();
    let ifd_offset = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
    let count_at = ifd_offset + 2 + 2 * 12 + 4;
    bytes[count_at..count_at + 4].copy_from_slice(&count.to_le_bytes());
    Cursor::new(bytes)
}

#[test]
fn test_tag_count_past_end_of_file_is_rejected() {
    let mut cursor = fixture_with_strip_offset_count(u32::MAX);
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();
    let ifd = tiff.main_ifd().unwrap();

    let result = reader.read_tag_values(&mut cursor, ifd, tags::STRIP_OFFSETS);
    std::assert!(std::matches!(result, Err(TiffError::GenericError(ref msg)) if msg.contains("exceeds file size")));
}

#[test]
fn test_tag_count_within_file_still_reads() {
    let mut cursor = fixture_with_strip_offset_count(3);
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();

    std::assert_eq!(reader.read_tag_values(&mut cursor, tiff.main_ifd().unwrap(), tags::STRIP_OFFSETS).unwrap(),
                    vec![8, 8, 8]);
}

#[test]
fn test_overflowing_value_size_is_not_inline() {
    let entry = crate::tiff::ifd::IFDEntry::new(tags::STRIP_OFFSETS, crate::tiff::constants::field_types::LONG8, u64::MAX, 0);
    std::assert_eq!(entry.value_byte_size(), None);
    std::assert!(!entry.is_value_inline(true));
}
