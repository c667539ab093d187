//! Affine mapping between pixel and world coordinates

use std::fmt;

use super::point::Point;
use crate::tiff::errors::{TiffError, TiffResult};

/// Six-coefficient affine transform
///
/// ```text
/// x = c + a * col + b * row
/// y = f + d * col + e * row
/// ```
///
/// Pixel coordinates refer to the pixel's upper-left corner, so the
/// centre of pixel (col, row) is at (col + 0.5, row + 0.5).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl AffineTransform {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        AffineTransform { a, b, c, d, e, f }
    }

    /// North-up transform from an upper-left origin and pixel size
    pub fn from_origin(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self::new(pixel_width, 0.0, origin_x, 0.0, -pixel_height, origin_y)
    }

    /// Builds the transform from a ModelTiepoint and ModelPixelScale pair
    ///
    /// The tiepoint links raster (i, j) to world (x, y); the Y scale is
    /// positive in the file and negated here because rows grow southwards.
    pub fn from_tiepoint_scale(tiepoint: &[f64], scale: &[f64]) -> TiffResult<Self> {
        if tiepoint.len() < 6 || scale.len() < 2 {
            return Err(TiffError::MissingGeoreference(format!(
                "tiepoint needs 6 values and pixel scale 2, got {} and {}",
                tiepoint.len(), scale.len())));
        }

        let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
        let (sx, sy) = (scale[0], scale[1]);

        Ok(Self::new(sx, 0.0, x - i * sx, 0.0, -sy, y + j * sy))
    }

    /// Builds the transform from a row-major 4x4 ModelTransformation matrix
    pub fn from_matrix(matrix: &[f64]) -> TiffResult<Self> {
        if matrix.len() < 16 {
            return Err(TiffError::MissingGeoreference(format!(
                "model transformation needs 16 values, got {}", matrix.len())));
        }

        Ok(Self::new(matrix[0], matrix[1], matrix[3], matrix[4], matrix[5], matrix[7]))
    }

    /// The same transform with its origin moved by a fraction of a pixel
    pub fn shifted(&self, dcol: f64, drow: f64) -> Self {
        let origin = self.pixel_to_world(dcol, drow);
        Self::new(self.a, self.b, origin.x, self.d, self.e, origin.y)
    }

    /// Converts pixel coordinates (col, row) to world coordinates
    pub fn pixel_to_world(&self, col: f64, row: f64) -> Point {
        Point::new(
            self.c + self.a * col + self.b * row,
            self.f + self.d * col + self.e * row,
        )
    }

    /// Converts world coordinates to fractional pixel coordinates (col, row)
    pub fn world_to_pixel(&self, x: f64, y: f64) -> TiffResult<(f64, f64)> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return Err(TiffError::GenericError(format!(
                "Affine transform is not invertible: {}", self)));
        }

        let dx = x - self.c;
        let dy = y - self.f;
        let col = (self.e * dx - self.b * dy) / det;
        let row = (self.a * dy - self.d * dx) / det;

        Ok((col, row))
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.e - self.b * self.d
    }

    /// Whether the grid has no rotation or shear terms
    pub fn is_north_up(&self) -> bool {
        self.b == 0.0 && self.d == 0.0
    }
}

impl fmt::Display for AffineTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}, {}, {}]", self.a, self.b, self.c, self.d, self.e, self.f)
    }
}
