//! Run configuration
//!
//! Settings come from an optional TOML file and the command line, the
//! latter taking precedence:
//!
//! ```toml
//! points_path = "labels.shp"
//! raster_path = "scene.tif"
//! label_field = "Class"
//! test_fraction = 0.1
//! seed = 42
//! collision = "first"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use clap::ArgMatches;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::errors::{PrepError, PrepResult};
use crate::sampling::{CollisionPolicy, DEFAULT_SEED, DEFAULT_TEST_FRACTION};

pub const DEFAULT_LABEL_FIELD: &str = "Class";

/// Settings of one preparation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrepConfig {
    pub points_path: Option<PathBuf>,
    pub raster_path: Option<PathBuf>,
    pub label_field: String,
    pub test_fraction: f64,
    pub seed: u64,
    pub collision: CollisionPolicy,
    /// Raises the log threshold to errors only
    pub suppress_warnings: bool,
    pub log_file: Option<PathBuf>,
    pub log_level: String,
    pub output_dir: Option<PathBuf>,
    pub show_progress: bool,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            points_path: None,
            raster_path: None,
            label_field: DEFAULT_LABEL_FIELD.to_string(),
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SEED,
            collision: CollisionPolicy::default(),
            suppress_warnings: false,
            log_file: None,
            log_level: "info".to_string(),
            output_dir: None,
            show_progress: false,
        }
    }
}

impl PrepConfig {
    pub fn from_toml_str(text: &str) -> PrepResult<Self> {
        toml::from_str(text).map_err(|e| PrepError::Config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> PrepResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| PrepError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Config file named by `--config` (or defaults) overlaid with the
    /// remaining command line options
    pub fn from_matches(args: &ArgMatches) -> PrepResult<Self> {
        let mut config = match args.get_one::<String>("config") {
            Some(path) => Self::from_file(Path::new(path))?,
            None => Self::default(),
        };

        if let Some(points) = args.get_one::<String>("points") {
            config.points_path = Some(PathBuf::from(points));
        }
        if let Some(raster) = args.get_one::<String>("raster") {
            config.raster_path = Some(PathBuf::from(raster));
        }
        if let Some(field) = args.get_one::<String>("label-field") {
            config.label_field = field.clone();
        }
        if let Some(fraction) = args.get_one::<f64>("test-fraction") {
            config.test_fraction = *fraction;
        }
        if let Some(seed) = args.get_one::<u64>("seed") {
            config.seed = *seed;
        }
        if let Some(policy) = args.get_one::<String>("collision") {
            config.collision = policy.parse().map_err(|e| PrepError::Config(format!("{}", e)))?;
        }
        if let Some(dir) = args.get_one::<String>("output-dir") {
            config.output_dir = Some(PathBuf::from(dir));
        }
        if let Some(file) = args.get_one::<String>("log-file") {
            config.log_file = Some(PathBuf::from(file));
        }
        if args.get_flag("progress") {
            config.show_progress = true;
        }
        if args.get_flag("suppress-warnings") {
            config.suppress_warnings = true;
        }
        if args.get_flag("verbose") {
            config.log_level = "debug".to_string();
        }

        Ok(config)
    }

    /// Checks that a split run can start with these settings
    pub fn validate(&self) -> PrepResult<()> {
        self.validate_inputs()?;
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(PrepError::Config(format!(
                "test fraction must lie strictly between 0 and 1, got {}", self.test_fraction)));
        }
        Ok(())
    }

    /// Checks the inputs and logging settings only, split parameters aside
    pub fn validate_inputs(&self) -> PrepResult<()> {
        if self.points_path.is_none() {
            return Err(PrepError::Config("no point dataset given".to_string()));
        }
        if self.raster_path.is_none() {
            return Err(PrepError::Config("no raster given".to_string()));
        }
        if self.label_field.trim().is_empty() {
            return Err(PrepError::Config("label field must not be empty".to_string()));
        }
        self.level_filter()?;
        Ok(())
    }

    pub fn points_path(&self) -> PrepResult<&Path> {
        self.points_path.as_deref()
            .ok_or_else(|| PrepError::Config("no point dataset given".to_string()))
    }

    pub fn raster_path(&self) -> PrepResult<&Path> {
        self.raster_path.as_deref()
            .ok_or_else(|| PrepError::Config("no raster given".to_string()))
    }

    /// Effective log threshold
    pub fn level_filter(&self) -> PrepResult<LevelFilter> {
        if self.suppress_warnings {
            return Ok(LevelFilter::Error);
        }
        self.log_level.parse::<LevelFilter>()
            .map_err(|_| PrepError::Config(format!("unknown log level '{}'", self.log_level)))
    }
}
