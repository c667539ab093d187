//! Fixture writers shared by the integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};

pub const ORIGIN_X: f64 = 500_000.0;
pub const ORIGIN_Y: f64 = 4_000_000.0;
pub const PIXEL_SIZE: f64 = 10.0;

/// Fresh directory under the system temp dir, unique per test
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("labelkit-it-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Pixel value written for band `b` at (`row`, `col`)
pub fn pixel_value(band: usize, row: usize, col: usize) -> u16 {
    (band * 1000 + row * 10 + col) as u16
}

/// World coordinates of the centre of pixel (`row`, `col`)
pub fn pixel_center(row: usize, col: usize) -> (f64, f64) {
    (
        ORIGIN_X + PIXEL_SIZE * col as f64 + PIXEL_SIZE / 2.0,
        ORIGIN_Y - PIXEL_SIZE * row as f64 - PIXEL_SIZE / 2.0,
    )
}

fn shorts(values: &[u16]) -> Vec<u8> {
    let mut out = Vec::new();
    for v in values {
        out.write_u16::<LittleEndian>(*v).unwrap();
    }
    out
}

fn longs(values: &[u32]) -> Vec<u8> {
    let mut out = Vec::new();
    for v in values {
        out.write_u32::<LittleEndian>(*v).unwrap();
    }
    out
}

fn doubles(values: &[f64]) -> Vec<u8> {
    let mut out = Vec::new();
    for v in values {
        out.write_f64::<LittleEndian>(*v).unwrap();
    }
    out
}

/// Writes an uncompressed little-endian uint16 GeoTIFF in one chunky strip
pub fn write_geotiff(path: &Path, width: usize, height: usize, bands: usize, epsg: u16) {
    let mut pixels = Vec::new();
    for row in 0..height {
        for col in 0..width {
            for band in 0..bands {
                pixels.write_u16::<LittleEndian>(pixel_value(band, row, col)).unwrap();
            }
        }
    }

    const SHORT: u16 = 3;
    const LONG: u16 = 4;
    const DOUBLE: u16 = 12;
    let mut entries: Vec<(u16, u16, u32, Vec<u8>)> = vec![
        (256, LONG, 1, longs(&[width as u32])),
        (257, LONG, 1, longs(&[height as u32])),
        (258, SHORT, bands as u32, shorts(&vec![16; bands])),
        (259, SHORT, 1, shorts(&[1])),
        (262, SHORT, 1, shorts(&[1])),
        (273, LONG, 1, longs(&[8])),
        (277, SHORT, 1, shorts(&[bands as u16])),
        (278, LONG, 1, longs(&[height as u32])),
        (279, LONG, 1, longs(&[pixels.len() as u32])),
        (284, SHORT, 1, shorts(&[1])),
        (339, SHORT, 1, shorts(&[1])),
        (33550, DOUBLE, 3, doubles(&[PIXEL_SIZE, PIXEL_SIZE, 0.0])),
        (33922, DOUBLE, 6, doubles(&[0.0, 0.0, 0.0, ORIGIN_X, ORIGIN_Y, 0.0])),
        (34735, SHORT, 12, shorts(&[1, 1, 0, 2, 1024, 0, 1, 1, 3072, 0, 1, epsg])),
    ];
    entries.sort_by_key(|entry| entry.0);

    let mut out = Vec::new();
    out.extend_from_slice(b"II");
    out.write_u16::<LittleEndian>(42).unwrap();
    out.write_u32::<LittleEndian>(0).unwrap();
    out.extend_from_slice(&pixels);

    let mut fields = Vec::new();
    for (tag, field_type, count, data) in entries {
        let mut value = [0u8; 4];
        if data.len() <= 4 {
            value[..data.len()].copy_from_slice(&data);
        } else {
            if out.len() % 2 == 1 {
                out.push(0);
            }
            value = (out.len() as u32).to_le_bytes();
            out.extend_from_slice(&data);
        }
        fields.push((tag, field_type, count, value));
    }
    if out.len() % 2 == 1 {
        out.push(0);
    }

    let ifd_offset = out.len() as u32;
    out[4..8].copy_from_slice(&ifd_offset.to_le_bytes());
    out.write_u16::<LittleEndian>(fields.len() as u16).unwrap();
    for (tag, field_type, count, value) in fields {
        out.write_u16::<LittleEndian>(tag).unwrap();
        out.write_u16::<LittleEndian>(field_type).unwrap();
        out.write_u32::<LittleEndian>(count).unwrap();
        out.extend_from_slice(&value);
    }
    out.write_u32::<LittleEndian>(0).unwrap();

    fs::write(path, out).unwrap();
}

/// Writes a GeoJSON FeatureCollection of labeled points
pub fn write_geojson(path: &Path, points: &[(f64, f64, i64)], epsg: u32) {
    let features: Vec<serde_json::Value> = points.iter()
        .map(|(x, y, class)| serde_json::json!({
            "type": "Feature",
            "properties": { "Class": class },
            "geometry": { "type": "Point", "coordinates": [x, y] }
        }))
        .collect();
    let collection = serde_json::json!({
        "type": "FeatureCollection",
        "crs": { "type": "name", "properties": { "name": format!("urn:ogc:def:crs:EPSG::{}", epsg) } },
        "features": features,
    });
    fs::write(path, collection.to_string()).unwrap();
}

/// Writes a CSV point file with `x`, `y` and `Class` columns
pub fn write_csv(path: &Path, points: &[(f64, f64, i64)]) {
    let mut text = String::from("x,y,Class\n");
    for (x, y, class) in points {
        text.push_str(&format!("{},{},{}\n", x, y, class));
    }
    fs::write(path, text).unwrap();
}
