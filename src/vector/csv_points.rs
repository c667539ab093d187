//! Delimited text point reading

use std::path::Path;

use super::errors::{VectorError, VectorResult};
use super::label;
use super::point_set::{LabeledPoint, PointLabelSet};
use super::reader::PointSource;
use crate::coordinate::Point;

/// Reads `x`, `y` and label columns of a CSV file with a header row
pub struct CsvSource;

impl PointSource for CsvSource {
    fn read_points(&self, path: &Path, label_field: &str) -> VectorResult<PointLabelSet> {
        let reader = csv::Reader::from_path(path)?;
        read_csv(reader, label_field)
    }
}

/// Reads points from any CSV reader
pub fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>, label_field: &str) -> VectorResult<PointLabelSet> {
    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers.iter().position(|h| h.trim() == name)
            .or_else(|| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name)))
            .ok_or_else(|| VectorError::MissingField(name.to_string()))
    };
    let x_index = column("x")?;
    let y_index = column("y")?;
    let label_index = column(label_field)?;

    let mut points = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let coordinate = |i: usize| record.get(i).and_then(|v| v.trim().parse::<f64>().ok());

        let point = match (coordinate(x_index), coordinate(y_index)) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Point::new(x, y),
            _ => return Err(VectorError::InvalidCoordinate(index)),
        };
        let class = label::label_from_str(record.get(label_index).unwrap_or(""), index)?;
        points.push(LabeledPoint { point, class });
    }

    Ok(PointLabelSet::new(points, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str, field: &str) -> VectorResult<PointLabelSet> {
        read_csv(csv::Reader::from_reader(text.as_bytes()), field)
    }

    #[test]
    fn reads_points_in_file_order() {
        let set = parse("id,X,y,Class\n1,10.5,20,3\n2,11,21,4\n", "Class").unwrap();
        assert_eq!(set.points(), &[LabeledPoint::new(10.5, 20.0, 3), LabeledPoint::new(11.0, 21.0, 4)]);
        assert_eq!(set.crs(), None);
    }

    #[test]
    fn missing_columns_are_reported() {
        assert!(matches!(parse("x,y,label\n1,2,3\n", "Class"), Err(VectorError::MissingField(_))));
        assert!(matches!(parse("x,Class\n1,3\n", "Class"), Err(VectorError::MissingField(_))));
    }

    #[test]
    fn bad_coordinates_are_reported() {
        assert!(matches!(parse("x,y,Class\nabc,2,3\n", "Class"), Err(VectorError::InvalidCoordinate(0))));
    }
}
