//! Bounding box structure for defining extents

use super::affine::AffineTransform;
use super::point::Point;

/// A bounding box in a coordinate system
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum X coordinate
    pub min_x: f64,
    /// Minimum Y coordinate
    pub min_y: f64,
    /// Maximum X coordinate
    pub max_x: f64,
    /// Maximum Y coordinate
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Smallest box holding every point, `None` for an empty iterator
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        points.into_iter().fold(None, |bbox, p| {
            Some(match bbox {
                None => BoundingBox::new(p.x, p.y, p.x, p.y),
                Some(b) => BoundingBox::new(
                    b.min_x.min(p.x), b.min_y.min(p.y),
                    b.max_x.max(p.x), b.max_y.max(p.y),
                ),
            })
        })
    }

    /// World extent of a `width` x `height` grid under `transform`
    pub fn from_grid(transform: &AffineTransform, width: usize, height: usize) -> Self {
        let corners = [
            transform.pixel_to_world(0.0, 0.0),
            transform.pixel_to_world(width as f64, 0.0),
            transform.pixel_to_world(0.0, height as f64),
            transform.pixel_to_world(width as f64, height as f64),
        ];
        // Four corners are never empty
        Self::from_points(corners.iter()).unwrap_or(BoundingBox::new(0.0, 0.0, 0.0, 0.0))
    }

    /// Get the width of the bounding box
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Get the height of the bounding box
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Check if this bounding box contains a point
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.min_x && point.x <= self.max_x &&
            point.y >= self.min_y && point.y <= self.max_y
    }

    /// Whether the two boxes share any area or edge
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x && other.min_x <= self.max_x &&
            self.min_y <= other.max_y && other.min_y <= self.max_y
    }
}
