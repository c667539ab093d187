//! Training sample preparation command
//!
//! Loads the labeled samples, splits them and reports the partition sizes.

use log::info;

use crate::api::LabelKit;
use crate::commands::command_traits::Command;
use crate::config::PrepConfig;
use crate::errors::PrepResult;
use crate::sampling::export_split;

/// Command running the loader and the splitter
pub struct PrepareCommand {
    config: PrepConfig,
}

impl PrepareCommand {
    /// Create a new prepare command
    ///
    /// # Arguments
    /// * `config` - Run configuration, checked here
    pub fn new(config: PrepConfig) -> PrepResult<Self> {
        config.validate()?;
        Ok(PrepareCommand { config })
    }
}

impl Command for PrepareCommand {
    fn execute(&self) -> PrepResult<()> {
        let kit = LabelKit::from_config(&self.config);
        let points = kit.read_points(self.config.points_path()?)?;
        let cube = kit.load_raster(self.config.raster_path()?)?;
        println!("Coordinate Reference System: {}", cube.meta.crs_label);
        let loaded = kit.label_pixels(points, cube)?;

        let split = kit.split(&loaded.samples, self.config.test_fraction, self.config.seed)?;
        println!("Training set size: {}", split.train_len());
        println!("Testing set size: {}", split.test_len());

        if let Some(dir) = &self.config.output_dir {
            let band_names: Vec<String> = (0..loaded.meta.band_count)
                .map(|band| loaded.meta.band_name(band))
                .collect();
            let (train, test) = export_split(dir, &split, &band_names, &self.config.label_field)?;
            info!("Exported partitions to {} and {}", train.display(), test.display());
        }

        Ok(())
    }
}
