//! Command line definition

use clap::{value_parser, Arg, ArgAction, Command as ClapCommand};

/// Builds the `labelkit` argument parser
pub fn build_cli() -> ClapCommand {
    ClapCommand::new("labelkit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Rasterize point labels onto a GeoTIFF and build a stratified train/test split")
        .arg(
            Arg::new("points")
                .help("Labeled point dataset (.shp, .geojson, .json or .csv)")
                .value_name("POINTS")
                .index(1),
        )
        .arg(
            Arg::new("raster")
                .help("Multi-band GeoTIFF on the same grid as the points")
                .value_name("RASTER")
                .index(2),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("TOML configuration file, command line options take precedence")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("label-field")
                .short('l')
                .long("label-field")
                .help("Attribute holding the class label [default: Class]")
                .value_name("FIELD"),
        )
        .arg(
            Arg::new("test-fraction")
                .short('t')
                .long("test-fraction")
                .help("Share of samples put in the test set [default: 0.1]")
                .value_name("FRACTION")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("seed")
                .short('s')
                .long("seed")
                .help("Random seed of the split [default: 42]")
                .value_name("SEED")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("collision")
                .long("collision")
                .help("Label kept when points share a pixel [default: first]")
                .value_name("POLICY")
                .value_parser(["first", "last", "error"]),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .help("Write train.csv and test.csv into this directory")
                .value_name("DIR"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Write log records to this file")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("progress")
                .long("progress")
                .help("Show a progress bar while decoding the raster")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("suppress-warnings")
                .long("suppress-warnings")
                .help("Only log errors")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("inspect")
                .short('i')
                .long("inspect")
                .help("Report raster and label statistics instead of splitting")
                .action(ArgAction::SetTrue),
        )
}
