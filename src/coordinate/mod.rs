//! Coordinate handling for geospatial data
//!
//! This module provides points, extents, the pixel/world affine mapping
//! and coordinate system identification.

mod affine;
mod bbox;
mod point;
mod crs;

// Re-export key types
pub use self::affine::AffineTransform;
pub use self::bbox::BoundingBox;
pub use self::point::Point;
pub use self::crs::{CoordinateSystem, CoordinateSystemFactory};
