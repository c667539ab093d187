//! Labeled point collections

use std::collections::BTreeMap;

use crate::coordinate::{BoundingBox, CoordinateSystem, Point};

/// Mask value of cells that carry no label
pub const NO_LABEL: i16 = -1;

/// A point with its class label
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledPoint {
    pub point: Point,
    pub class: i16,
}

impl LabeledPoint {
    pub fn new(x: f64, y: f64, class: i16) -> Self {
        LabeledPoint { point: Point::new(x, y), class }
    }
}

/// Ordered point labels read from one dataset
///
/// Order follows the source file, which matters for collision handling
/// when two points fall on the same pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct PointLabelSet {
    points: Vec<LabeledPoint>,
    crs: Option<CoordinateSystem>,
}

impl PointLabelSet {
    pub fn new(points: Vec<LabeledPoint>, crs: Option<CoordinateSystem>) -> Self {
        PointLabelSet { points, crs }
    }

    pub fn points(&self) -> &[LabeledPoint] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabeledPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Coordinate system declared by the dataset, if any
    pub fn crs(&self) -> Option<CoordinateSystem> {
        self.crs
    }

    /// Sorted distinct class labels
    pub fn unique_classes(&self) -> Vec<i16> {
        self.class_counts().into_keys().collect()
    }

    /// Number of points per class
    pub fn class_counts(&self) -> BTreeMap<i16, usize> {
        let mut counts = BTreeMap::new();
        for labeled in &self.points {
            *counts.entry(labeled.class).or_insert(0) += 1;
        }
        counts
    }

    pub fn bbox(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.points.iter().map(|p| &p.point))
    }
}
