//! ESRI Shapefile point reading
//!
//! Only the point family of shape types is read. Attributes come from the
//! sibling `.dbf` table and the coordinate system from the optional `.prj`.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use log::{debug, warn};

use crate::coordinate::{CoordinateSystem, CoordinateSystemFactory, Point};

use super::dbf::DbfTable;
use super::errors::{VectorError, VectorResult};
use super::label;
use super::point_set::{LabeledPoint, PointLabelSet};
use super::reader::PointSource;

const FILE_CODE: i32 = 9994;
const HEADER_SIZE: u64 = 100;

/// Shape type codes of the main file
pub mod shape_types {
    pub const NULL: i32 = 0;
    pub const POINT: i32 = 1;
    pub const MULTI_POINT: i32 = 8;
    pub const POINT_Z: i32 = 11;
    pub const MULTI_POINT_Z: i32 = 18;
    pub const POINT_M: i32 = 21;
    pub const MULTI_POINT_M: i32 = 28;
}

fn shape_type_name(shape_type: i32) -> String {
    match shape_type {
        3 => "PolyLine".to_string(),
        5 => "Polygon".to_string(),
        13 => "PolyLineZ".to_string(),
        15 => "PolygonZ".to_string(),
        23 => "PolyLineM".to_string(),
        25 => "PolygonM".to_string(),
        31 => "MultiPatch".to_string(),
        other => format!("shape type {}", other),
    }
}

/// Parses the records of a `.shp` main file
///
/// Returns one entry per record; null shapes yield an empty point list so
/// that record positions stay aligned with the attribute table.
pub fn parse_shapes(bytes: &[u8]) -> VectorResult<Vec<Vec<Point>>> {
    let mut cursor = Cursor::new(bytes);
    if bytes.len() < HEADER_SIZE as usize {
        return Err(VectorError::Shapefile(format!("file is {} bytes, header needs {}", bytes.len(), HEADER_SIZE)));
    }

    let file_code = cursor.read_i32::<BigEndian>()?;
    if file_code != FILE_CODE {
        return Err(VectorError::Shapefile(format!("bad file code {}", file_code)));
    }
    cursor.set_position(32);
    let file_shape_type = cursor.read_i32::<LittleEndian>()?;
    debug!("Shapefile header shape type: {}", file_shape_type);

    cursor.set_position(HEADER_SIZE);
    let mut shapes = Vec::new();

    while (cursor.position() as usize) + 8 <= bytes.len() {
        let record_number = cursor.read_i32::<BigEndian>()?;
        let content_words = cursor.read_i32::<BigEndian>()?;
        let content_start = cursor.position();
        let content_end = content_start + content_words.max(0) as u64 * 2;
        if content_end as usize > bytes.len() {
            return Err(VectorError::Shapefile(format!("record {} extends past the end of the file", record_number)));
        }

        let index = shapes.len();
        let shape_type = cursor.read_i32::<LittleEndian>()
            .map_err(|_| VectorError::Shapefile(format!("record {} has no shape type", record_number)))?;
        let points = match shape_type {
            shape_types::NULL => Vec::new(),
            shape_types::POINT | shape_types::POINT_Z | shape_types::POINT_M => {
                let x = cursor.read_f64::<LittleEndian>()?;
                let y = cursor.read_f64::<LittleEndian>()?;
                vec![Point::new(x, y)]
            },
            shape_types::MULTI_POINT | shape_types::MULTI_POINT_Z | shape_types::MULTI_POINT_M => {
                // skip the record bounding box
                cursor.set_position(cursor.position() + 32);
                let count = cursor.read_i32::<LittleEndian>()?.max(0) as u64;
                let available = content_end.saturating_sub(cursor.position());
                if count.checked_mul(16).map_or(true, |needed| needed > available) {
                    return Err(VectorError::Shapefile(format!(
                        "record {} declares {} points but holds {} bytes", record_number, count, available)));
                }
                let mut points = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    let x = cursor.read_f64::<LittleEndian>()?;
                    let y = cursor.read_f64::<LittleEndian>()?;
                    points.push(Point::new(x, y));
                }
                points
            },
            other => {
                return Err(VectorError::UnsupportedGeometry {
                    index,
                    geometry: shape_type_name(other),
                });
            },
        };

        shapes.push(points);
        cursor.set_position(content_end);
    }

    Ok(shapes)
}

/// Reads point shapefiles (`.shp` + `.dbf`, optional `.prj`)
pub struct ShapefileSource;

impl PointSource for ShapefileSource {
    fn read_points(&self, path: &Path, label_field: &str) -> VectorResult<PointLabelSet> {
        let shapes = parse_shapes(&fs::read(path)?)?;
        let table = DbfTable::read(&path.with_extension("dbf"))?;

        let field = table.field_index(label_field)
            .ok_or_else(|| VectorError::MissingField(label_field.to_string()))?;
        if table.records.len() != shapes.len() {
            return Err(VectorError::Dbf(format!(
                "{} attribute records for {} shapes", table.records.len(), shapes.len())));
        }

        let mut points = Vec::new();
        let mut skipped = 0;
        for (index, (shape, record)) in shapes.iter().zip(&table.records).enumerate() {
            if record.deleted || shape.is_empty() {
                skipped += 1;
                continue;
            }
            let class = label::label_from_str(&record.values[field], index)?;
            for point in shape {
                if !point.is_finite() {
                    return Err(VectorError::InvalidCoordinate(index));
                }
                points.push(LabeledPoint { point: *point, class });
            }
        }
        if skipped > 0 {
            warn!("Skipped {} deleted or empty shapefile records", skipped);
        }

        let crs = read_projection(&path.with_extension("prj"))?;
        Ok(PointLabelSet::new(points, crs))
    }
}

/// Coordinate system of the `.prj` sidecar, when it names an EPSG code
fn read_projection(prj_path: &Path) -> VectorResult<Option<CoordinateSystem>> {
    if !prj_path.exists() {
        debug!("No projection file at {}", prj_path.display());
        return Ok(None);
    }
    let wkt = fs::read_to_string(prj_path)?;
    let crs = CoordinateSystemFactory::from_wkt(&wkt);
    if crs.is_none() {
        warn!("Projection file {} carries no EPSG authority", prj_path.display());
    }
    Ok(crs)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use byteorder::WriteBytesExt;

    /// Builds a `.shp` main file holding point records
    pub(crate) fn build_point_shp(points: &[(f64, f64)]) -> Vec<u8> {
        let mut records = Vec::new();
        for (i, (x, y)) in points.iter().enumerate() {
            records.write_i32::<BigEndian>(i as i32 + 1).unwrap();
            records.write_i32::<BigEndian>(10).unwrap();
            records.write_i32::<LittleEndian>(shape_types::POINT).unwrap();
            records.write_f64::<LittleEndian>(*x).unwrap();
            records.write_f64::<LittleEndian>(*y).unwrap();
        }
        with_header(shape_types::POINT, records)
    }

    fn with_header(shape_type: i32, records: Vec<u8>) -> Vec<u8> {
        let mut out = Vec::new();
        out.write_i32::<BigEndian>(FILE_CODE).unwrap();
        out.extend_from_slice(&[0u8; 20]);
        out.write_i32::<BigEndian>(((HEADER_SIZE as usize + records.len()) / 2) as i32).unwrap();
        out.write_i32::<LittleEndian>(1000).unwrap();
        out.write_i32::<LittleEndian>(shape_type).unwrap();
        out.extend_from_slice(&[0u8; 64]);
        out.extend(records);
        out
    }

    #[test]
    fn parses_point_records() {
        let shapes = parse_shapes(&build_point_shp(&[(1.5, 2.5), (-3.0, 4.0)])).unwrap();
        assert_eq!(shapes, vec![vec![Point::new(1.5, 2.5)], vec![Point::new(-3.0, 4.0)]]);
    }

    #[test]
    fn parses_multipoint_and_null_records() {
        let mut records = Vec::new();
        records.write_i32::<BigEndian>(1).unwrap();
        records.write_i32::<BigEndian>(2).unwrap();
        records.write_i32::<LittleEndian>(shape_types::NULL).unwrap();

        records.write_i32::<BigEndian>(2).unwrap();
        records.write_i32::<BigEndian>(36).unwrap();
        records.write_i32::<LittleEndian>(shape_types::MULTI_POINT).unwrap();
        for v in [0.0, 0.0, 5.0, 5.0] {
            records.write_f64::<LittleEndian>(v).unwrap();
        }
        records.write_i32::<LittleEndian>(2).unwrap();
        for v in [0.0, 0.0, 5.0, 5.0] {
            records.write_f64::<LittleEndian>(v).unwrap();
        }

        let shapes = parse_shapes(&with_header(shape_types::MULTI_POINT, records)).unwrap();
        assert!(shapes[0].is_empty());
        assert_eq!(shapes[1], vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)]);
    }

    #[test]
    fn oversized_multipoint_count_is_an_error() {
        let mut records = Vec::new();
        records.write_i32::<BigEndian>(1).unwrap();
        records.write_i32::<BigEndian>(20).unwrap();
        records.write_i32::<LittleEndian>(shape_types::MULTI_POINT).unwrap();
        for v in [0.0, 0.0, 5.0, 5.0] {
            records.write_f64::<LittleEndian>(v).unwrap();
        }
        records.write_i32::<LittleEndian>(i32::MAX).unwrap();

        match parse_shapes(&with_header(shape_types::MULTI_POINT, records)) {
            Err(VectorError::Shapefile(msg)) => assert!(msg.contains("declares")),
            other => panic!("expected Shapefile error, got {:?}", other),
        }
    }

    #[test]
    fn polygons_are_rejected() {
        let mut records = Vec::new();
        records.write_i32::<BigEndian>(1).unwrap();
        records.write_i32::<BigEndian>(2).unwrap();
        records.write_i32::<LittleEndian>(5).unwrap();

        match parse_shapes(&with_header(5, records)) {
            Err(VectorError::UnsupportedGeometry { geometry, .. }) => assert_eq!(geometry, "Polygon"),
            other => panic!("expected UnsupportedGeometry, got {:?}", other),
        }
    }

    #[test]
    fn bad_file_code_is_rejected() {
        let mut bytes = build_point_shp(&[(0.0, 0.0)]);
        bytes[3] = 0;
        assert!(matches!(parse_shapes(&bytes), Err(VectorError::Shapefile(_))));
    }
}
