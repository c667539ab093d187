//! Labeled point datasets
//!
//! Reads point labels from shapefiles, GeoJSON and CSV into a
//! [`PointLabelSet`].

mod csv_points;
pub(crate) mod dbf;
mod errors;
mod geojson;
mod label;
mod point_set;
mod reader;
pub(crate) mod shapefile;

pub use csv_points::CsvSource;
pub use dbf::{DbfField, DbfRecord, DbfTable};
pub use errors::{VectorError, VectorResult};
pub use geojson::{parse_geojson, GeoJsonSource};
pub use label::{label_from_f64, label_from_str};
pub use point_set::{LabeledPoint, PointLabelSet, NO_LABEL};
pub use reader::{PointReader, PointSource};
pub use shapefile::{parse_shapes, ShapefileSource};
