//! Point dataset reading with format dispatch

use std::path::Path;

use log::{debug, info};

use super::csv_points::CsvSource;
use super::errors::{VectorError, VectorResult};
use super::geojson::GeoJsonSource;
use super::point_set::PointLabelSet;
use super::shapefile::ShapefileSource;

/// A readable point dataset format
pub trait PointSource {
    /// Reads every point of the dataset with its class from `label_field`
    fn read_points(&self, path: &Path, label_field: &str) -> VectorResult<PointLabelSet>;
}

/// Reads labeled points, picking the format from the file extension
#[derive(Debug, Clone)]
pub struct PointReader {
    label_field: String,
}

impl PointReader {
    pub fn new(label_field: &str) -> Self {
        PointReader {
            label_field: label_field.to_string(),
        }
    }

    /// Source able to read `path`
    pub fn source_for(path: &Path) -> VectorResult<Box<dyn PointSource>> {
        let extension = path.extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match extension.as_str() {
            "shp" => Ok(Box::new(ShapefileSource)),
            "geojson" | "json" => Ok(Box::new(GeoJsonSource)),
            "csv" => Ok(Box::new(CsvSource)),
            other => Err(VectorError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn read(&self, path: &Path) -> VectorResult<PointLabelSet> {
        info!("Reading point labels from {}", path.display());
        let source = Self::source_for(path)?;
        let set = source.read_points(path, &self.label_field)?;

        info!("Read {} labeled points", set.len());
        info!("Unique classes: {:?}", set.unique_classes());
        match set.crs() {
            Some(crs) => debug!("Point dataset CRS: {}", crs),
            None => debug!("Point dataset declares no CRS"),
        }
        Ok(set)
    }
}
