//! Library entry points
//!
//! [`LabelKit`] ties the stages together: read the point labels and the
//! raster, burn the labels onto the raster grid, keep the spectra of
//! labeled pixels and split them into stratified partitions.

use std::path::Path;

use log::{info, warn};

use crate::config::PrepConfig;
use crate::errors::PrepResult;
use crate::raster::{RasterCube, RasterLoader, RasterMeta};
use crate::sampling::{
    extract_labeled, rasterize_points, CollisionPolicy, LabelMask, LabeledSamples, RasterizeReport,
    StratifiedSplitter, TrainTestSplit,
};
use crate::vector::{PointLabelSet, PointReader};

/// Everything the loader stage produces
#[derive(Debug, Clone)]
pub struct LoadedSamples {
    pub samples: LabeledSamples,
    pub meta: RasterMeta,
    pub points: PointLabelSet,
    pub mask: LabelMask,
    pub report: RasterizeReport,
}

/// Main interface to the labelkit library
#[derive(Debug, Clone)]
pub struct LabelKit {
    label_field: String,
    collision: CollisionPolicy,
    show_progress: bool,
}

impl Default for LabelKit {
    fn default() -> Self {
        LabelKit::new(crate::config::DEFAULT_LABEL_FIELD)
    }
}

impl LabelKit {
    pub fn new(label_field: &str) -> Self {
        LabelKit {
            label_field: label_field.to_string(),
            collision: CollisionPolicy::default(),
            show_progress: false,
        }
    }

    pub fn from_config(config: &PrepConfig) -> Self {
        LabelKit::new(&config.label_field)
            .with_collision(config.collision)
            .with_progress(config.show_progress)
    }

    pub fn with_collision(mut self, collision: CollisionPolicy) -> Self {
        self.collision = collision;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Loads labeled pixel samples from a point dataset and a raster
    ///
    /// Points outside the raster contribute nothing; an empty result is not
    /// an error here.
    pub fn load_samples(&self, points_path: &Path, raster_path: &Path) -> PrepResult<LoadedSamples> {
        let points = self.read_points(points_path)?;
        let cube = self.load_raster(raster_path)?;
        self.label_pixels(points, cube)
    }

    pub fn read_points(&self, points_path: &Path) -> PrepResult<PointLabelSet> {
        Ok(PointReader::new(&self.label_field).read(points_path)?)
    }

    pub fn load_raster(&self, raster_path: &Path) -> PrepResult<RasterCube> {
        let cube = RasterLoader::new()
            .with_progress(self.show_progress)
            .load(raster_path)?;
        info!("Coordinate Reference System: {}", cube.meta.crs_label);
        Ok(cube)
    }

    /// Burns the points onto the raster grid and keeps the labeled pixels
    pub fn label_pixels(&self, points: PointLabelSet, cube: RasterCube) -> PrepResult<LoadedSamples> {
        if let (Some(point_crs), Some(raster_crs)) = (points.crs(), cube.meta.crs) {
            if point_crs != raster_crs {
                warn!("Point dataset CRS {} differs from raster CRS {}; coordinates are used as is",
                      point_crs, raster_crs);
            }
        }

        let (mask, report) = rasterize_points(
            &points, &cube.meta.transform, cube.meta.width, cube.meta.height, self.collision)?;
        let samples = extract_labeled(&cube.data, &mask, cube.meta.nodata)?;

        Ok(LoadedSamples {
            samples,
            meta: cube.meta,
            points,
            mask,
            report,
        })
    }

    /// Stratified train/test split of loaded samples
    pub fn split(&self, samples: &LabeledSamples, test_fraction: f64, seed: u64) -> PrepResult<TrainTestSplit> {
        let split = StratifiedSplitter::new(test_fraction, seed)
            .split(&samples.features, &samples.labels)?;
        Ok(split)
    }
}
