//! Selecting the pixel spectra under labeled cells

use std::collections::BTreeMap;

use log::{info, warn};
use ndarray::{Array1, Array2, Array3, Axis};

use crate::raster::flatten_pixels;
use crate::vector::NO_LABEL;

use super::errors::{SamplingError, SamplingResult};
use super::rasterize::LabelMask;

/// Feature rows and their labels, index aligned
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSamples {
    /// One row per labeled pixel, one column per band
    pub features: Array2<f64>,
    pub labels: Array1<i16>,
    /// Flattened pixel index (`row * width + col`) of each sample
    pub pixel_indices: Vec<usize>,
}

impl LabeledSamples {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of samples per class
    pub fn class_counts(&self) -> BTreeMap<i16, usize> {
        let mut counts = BTreeMap::new();
        for class in &self.labels {
            *counts.entry(*class).or_insert(0) += 1;
        }
        counts
    }
}

/// Flattens `cube` and keeps the rows whose mask cell holds a label
///
/// Rows come out in row-major mask order.
pub fn extract_labeled(cube: &Array3<f64>, mask: &LabelMask, nodata: Option<f64>) -> SamplingResult<LabeledSamples> {
    let (bands, height, width) = cube.dim();
    if bands == 0 {
        return Err(SamplingError::NoBands);
    }
    if mask.dim() != (height, width) {
        return Err(SamplingError::ShapeMismatch {
            mask: mask.dim(),
            raster: (height, width),
        });
    }

    let flat_mask: Vec<i16> = mask.iter().copied().collect();
    let pixel_indices: Vec<usize> = flat_mask.iter()
        .enumerate()
        .filter(|(_, class)| **class != NO_LABEL)
        .map(|(index, _)| index)
        .collect();

    let features = flatten_pixels(cube).select(Axis(0), &pixel_indices);
    let labels: Array1<i16> = pixel_indices.iter().map(|i| flat_mask[*i]).collect();

    if let Some(nodata) = nodata {
        let nodata_rows = features.rows().into_iter()
            .filter(|row| row.iter().any(|v| *v == nodata))
            .count();
        if nodata_rows > 0 {
            warn!("{} labeled pixels contain the NoData value {}", nodata_rows, nodata);
        }
    }
    info!("Extracted {} labeled samples with {} bands", labels.len(), bands);

    Ok(LabeledSamples {
        features,
        labels,
        pixel_indices,
    })
}
