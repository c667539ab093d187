//! Burning point labels onto a raster grid

use std::fmt;
use std::str::FromStr;

use log::{debug, info, warn};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::coordinate::AffineTransform;
use crate::vector::{PointLabelSet, NO_LABEL};

use super::errors::{SamplingError, SamplingResult};

/// Per-pixel class labels, `NO_LABEL` where no point fell
pub type LabelMask = Array2<i16>;

/// What to do when several points fall on one pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Keep the label of the first point written to the pixel
    #[default]
    First,
    /// Overwrite with the label of the last point
    Last,
    /// Fail when the colliding points disagree on the class
    Error,
}

impl FromStr for CollisionPolicy {
    type Err = SamplingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(CollisionPolicy::First),
            "last" => Ok(CollisionPolicy::Last),
            "error" => Ok(CollisionPolicy::Error),
            other => Err(SamplingError::UnknownPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CollisionPolicy::First => "first",
            CollisionPolicy::Last => "last",
            CollisionPolicy::Error => "error",
        };
        write!(f, "{}", name)
    }
}

/// Outcome counts of a rasterization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RasterizeReport {
    /// Distinct pixels holding a label
    pub burned: usize,
    /// Points whose pixel lies outside the grid
    pub outside: usize,
    /// Points landing on an already labeled pixel
    pub collisions: usize,
    /// Collisions between different classes
    pub conflicting: usize,
}

/// Grid pixel containing world position (x, y), if inside the grid
fn pixel_of(inverse: (f64, f64), width: usize, height: usize) -> Option<(usize, usize)> {
    let (col, row) = (inverse.0.floor(), inverse.1.floor());
    if !col.is_finite() || !row.is_finite() {
        return None;
    }
    if col < 0.0 || row < 0.0 || col >= width as f64 || row >= height as f64 {
        return None;
    }
    Some((row as usize, col as usize))
}

/// Burns every point's class into a `(height, width)` mask
///
/// The pixel of a point is the floor of its inverse-transformed position, so
/// points on a shared edge belong to the pixel to their lower right.
pub fn rasterize_points(
    points: &PointLabelSet,
    transform: &AffineTransform,
    width: usize,
    height: usize,
    policy: CollisionPolicy,
) -> SamplingResult<(LabelMask, RasterizeReport)> {
    let mut mask = LabelMask::from_elem((height, width), NO_LABEL);
    let mut report = RasterizeReport::default();

    // fail early on a singular transform even when there are no points
    transform.world_to_pixel(0.0, 0.0)?;

    for labeled in points.iter() {
        let inverse = transform.world_to_pixel(labeled.point.x, labeled.point.y)?;
        let Some((row, col)) = pixel_of(inverse, width, height) else {
            debug!("Point ({}, {}) falls outside the raster", labeled.point.x, labeled.point.y);
            report.outside += 1;
            continue;
        };

        let cell = &mut mask[[row, col]];
        if *cell == NO_LABEL {
            *cell = labeled.class;
            report.burned += 1;
            continue;
        }

        report.collisions += 1;
        if *cell != labeled.class {
            report.conflicting += 1;
            match policy {
                CollisionPolicy::Error => {
                    return Err(SamplingError::LabelCollision {
                        row,
                        col,
                        existing: *cell,
                        incoming: labeled.class,
                    });
                },
                CollisionPolicy::Last => *cell = labeled.class,
                CollisionPolicy::First => {},
            }
        }
    }

    if report.outside > 0 {
        warn!("{} of {} points fall outside the raster extent", report.outside, points.len());
    }
    if report.conflicting > 0 {
        warn!("{} points collided with a different class (policy: {})", report.conflicting, policy);
    }
    info!("Rasterized {} labeled pixels", report.burned);

    Ok((mask, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::LabeledPoint;

    // 10x10 grid of 10 m pixels with its upper left corner at (1000, 2000)
    fn transform() -> AffineTransform {
        AffineTransform::from_origin(1000.0, 2000.0, 10.0, 10.0)
    }

    fn points(items: &[(f64, f64, i16)]) -> PointLabelSet {
        PointLabelSet::new(items.iter().map(|(x, y, c)| LabeledPoint::new(*x, *y, *c)).collect(), None)
    }

    #[test]
    fn burns_points_into_their_pixels() {
        let set = points(&[(1005.0, 1995.0, 1), (1095.0, 1905.0, 2), (1020.0, 1980.0, 3)]);
        let (mask, report) = rasterize_points(&set, &transform(), 10, 10, CollisionPolicy::First).unwrap();

        assert_eq!(mask[[0, 0]], 1);
        assert_eq!(mask[[9, 9]], 2);
        // exactly on the corner of pixel (2, 2)
        assert_eq!(mask[[2, 2]], 3);
        assert_eq!(mask.iter().filter(|v| **v != NO_LABEL).count(), 3);
        assert_eq!(report, RasterizeReport { burned: 3, outside: 0, collisions: 0, conflicting: 0 });
    }

    #[test]
    fn points_outside_are_counted() {
        let set = points(&[(999.0, 1995.0, 1), (1100.0, 1995.0, 1), (1005.0, 2000.5, 1), (1005.0, 1995.0, 4)]);
        let (mask, report) = rasterize_points(&set, &transform(), 10, 10, CollisionPolicy::First).unwrap();

        assert_eq!(report.outside, 3);
        assert_eq!(report.burned, 1);
        assert_eq!(mask[[0, 0]], 4);
    }

    #[test]
    fn collision_policies() {
        let set = points(&[(1001.0, 1999.0, 1), (1009.0, 1991.0, 2)]);

        let (first, report) = rasterize_points(&set, &transform(), 10, 10, CollisionPolicy::First).unwrap();
        assert_eq!(first[[0, 0]], 1);
        assert_eq!(report.collisions, 1);
        assert_eq!(report.burned, 1);

        let (last, _) = rasterize_points(&set, &transform(), 10, 10, CollisionPolicy::Last).unwrap();
        assert_eq!(last[[0, 0]], 2);

        let error = rasterize_points(&set, &transform(), 10, 10, CollisionPolicy::Error).unwrap_err();
        assert!(matches!(error, SamplingError::LabelCollision { row: 0, col: 0, existing: 1, incoming: 2 }));
    }

    #[test]
    fn same_class_collision_is_not_an_error() {
        let set = points(&[(1001.0, 1999.0, 5), (1009.0, 1991.0, 5)]);
        let (mask, report) = rasterize_points(&set, &transform(), 10, 10, CollisionPolicy::Error).unwrap();
        assert_eq!(mask[[0, 0]], 5);
        assert_eq!(report.conflicting, 0);
    }

    #[test]
    fn singular_transform_is_rejected() {
        let flat = AffineTransform::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let result = rasterize_points(&points(&[]), &flat, 10, 10, CollisionPolicy::First);
        assert!(matches!(result, Err(SamplingError::DegenerateTransform(_))));
    }

    #[test]
    fn policy_parses_from_text() {
        assert_eq!("Last".parse::<CollisionPolicy>().unwrap(), CollisionPolicy::Last);
        assert!("newest".parse::<CollisionPolicy>().is_err());
        assert_eq!(CollisionPolicy::default().to_string(), "first");
    }
}
