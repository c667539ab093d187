//! In-memory raster cube and its metadata

use std::collections::BTreeMap;
use std::fmt;

use ndarray::{Array2, Array3};

use crate::coordinate::{AffineTransform, BoundingBox, CoordinateSystem};
use super::sample::SampleType;

/// Metadata of a loaded raster
#[derive(Debug, Clone, PartialEq)]
pub struct RasterMeta {
    pub width: usize,
    pub height: usize,
    pub band_count: usize,
    pub sample_type: SampleType,
    /// Pixel corner to world mapping
    pub transform: AffineTransform,
    pub crs: Option<CoordinateSystem>,
    /// Printable coordinate system, also set for user-defined systems
    pub crs_label: String,
    pub nodata: Option<f64>,
    /// Band descriptions keyed by zero-based band index
    pub band_descriptions: BTreeMap<usize, String>,
    pub compression: String,
    pub tiled: bool,
}

impl RasterMeta {
    /// World extent of the pixel grid
    pub fn extent(&self) -> BoundingBox {
        BoundingBox::from_grid(&self.transform, self.width, self.height)
    }

    /// Column name for band `index`, its description when one exists
    pub fn band_name(&self, index: usize) -> String {
        self.band_descriptions.get(&index)
            .cloned()
            .unwrap_or_else(|| format!("b{}", index + 1))
    }
}

impl fmt::Display for RasterMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Raster:")?;
        writeln!(f, "  Dimensions: {}x{}", self.width, self.height)?;
        writeln!(f, "  Bands: {} ({})", self.band_count, self.sample_type)?;
        writeln!(f, "  Layout: {}, {}", if self.tiled { "tiled" } else { "stripped" }, self.compression)?;
        writeln!(f, "  Coordinate Reference System: {}", self.crs_label)?;
        writeln!(f, "  Transform: {}", self.transform)?;
        let extent = self.extent();
        writeln!(f, "  Extent: ({}, {}) - ({}, {})", extent.min_x, extent.min_y, extent.max_x, extent.max_y)?;
        if let Some(nodata) = self.nodata {
            writeln!(f, "  NoData: {}", nodata)?;
        }
        for (band, description) in &self.band_descriptions {
            writeln!(f, "  Band {}: {}", band + 1, description)?;
        }
        Ok(())
    }
}

/// Pixel values shaped (bands, height, width) plus metadata
#[derive(Debug, Clone)]
pub struct RasterCube {
    pub data: Array3<f64>,
    pub meta: RasterMeta,
}

impl RasterCube {
    /// Reshapes the cube to one row per pixel and one column per band
    ///
    /// Rows follow row-major pixel order: pixel (row, col) lands on row
    /// `row * width + col`.
    pub fn flatten_pixels(&self) -> Array2<f64> {
        flatten_pixels(&self.data)
    }
}

/// Reshapes a (bands, height, width) cube to (height * width, bands)
pub fn flatten_pixels(cube: &Array3<f64>) -> Array2<f64> {
    let (bands, height, width) = cube.dim();
    Array2::from_shape_fn((height * width, bands), |(pixel, band)| {
        cube[[band, pixel / width, pixel % width]]
    })
}
