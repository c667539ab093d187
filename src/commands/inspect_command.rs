//! Label and raster inspection command
//!
//! Reports how the point labels land on the raster grid without splitting:
//! raster metadata, GeoKeys, rasterization counts and the class histogram
//! of labeled pixels.

use std::collections::BTreeMap;

use log::debug;

use crate::api::{LabelKit, LoadedSamples};
use crate::commands::command_traits::Command;
use crate::config::PrepConfig;
use crate::errors::PrepResult;
use crate::tiff::{GeoKeyParser, TiffReader};

/// Command printing a summary of the inputs
pub struct InspectCommand {
    config: PrepConfig,
}

impl InspectCommand {
    pub fn new(config: PrepConfig) -> PrepResult<Self> {
        config.validate_inputs()?;
        Ok(InspectCommand { config })
    }

    /// Lists the GeoKey directory of the raster's first image
    fn display_geo_keys(&self) -> PrepResult<()> {
        let mut tiff_reader = TiffReader::new();
        let (tiff, mut reader) = tiff_reader.load(self.config.raster_path()?)?;
        let ifd = tiff.require_main_ifd()?;

        let keys = GeoKeyParser::format_geo_keys(&tiff_reader, &mut reader, ifd)?;
        if keys.is_empty() {
            println!("GeoKeys: none");
        } else {
            println!("GeoKeys:");
            for (id, name, value) in keys {
                println!("  {} ({}): {}", name, id, value);
            }
        }
        Ok(())
    }

    fn display_labels(&self, loaded: &LoadedSamples) {
        println!("Points: {} ({} classes)", loaded.points.len(), loaded.points.unique_classes().len());
        match loaded.points.crs() {
            Some(crs) => println!("  Point CRS: {}", crs),
            None => println!("  Point CRS: not declared"),
        }
        if let Some(extent) = loaded.points.bbox() {
            println!("  Extent: ({}, {}) - ({}, {})", extent.min_x, extent.min_y, extent.max_x, extent.max_y);
        }
        println!("  Outside raster: {}", loaded.report.outside);
        println!("  Sharing a pixel: {} ({} with a different class)",
                 loaded.report.collisions, loaded.report.conflicting);
        println!("Labeled pixels: {}", loaded.samples.len());

        let points_per_class = loaded.points.class_counts();
        let pixels_per_class: BTreeMap<i16, usize> = loaded.samples.class_counts();
        for (class, points) in &points_per_class {
            let pixels = pixels_per_class.get(class).copied().unwrap_or(0);
            println!("  Class {}: {} points, {} pixels", class, points, pixels);
        }
    }
}

impl Command for InspectCommand {
    fn execute(&self) -> PrepResult<()> {
        let kit = LabelKit::from_config(&self.config);
        let loaded = kit.load_samples(self.config.points_path()?, self.config.raster_path()?)?;

        print!("{}", loaded.meta);
        self.display_geo_keys()?;
        self.display_labels(&loaded);
        debug!("Rasterize report: {:?}", loaded.report);
        Ok(())
    }
}
