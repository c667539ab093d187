//! GeoJSON point reading

use std::fs;
use std::path::Path;

use log::warn;
use serde_json::{Map, Value as JsonValue};

use crate::coordinate::{CoordinateSystem, CoordinateSystemFactory, Point};

use super::errors::{VectorError, VectorResult};
use super::label;
use super::point_set::{LabeledPoint, PointLabelSet};
use super::reader::PointSource;

/// Reads Point and MultiPoint features of a GeoJSON document
pub struct GeoJsonSource;

impl PointSource for GeoJsonSource {
    fn read_points(&self, path: &Path, label_field: &str) -> VectorResult<PointLabelSet> {
        let text = fs::read_to_string(path)?;
        parse_geojson(&text, label_field)
    }
}

/// Parses a FeatureCollection (or a single Feature) into labeled points
pub fn parse_geojson(text: &str, label_field: &str) -> VectorResult<PointLabelSet> {
    let root: JsonValue = serde_json::from_str(text)?;
    let object = root.as_object()
        .ok_or_else(|| VectorError::GeoJson("top-level value is not an object".to_string()))?;

    let features: Vec<&JsonValue> = match object.get("type").and_then(JsonValue::as_str) {
        Some("FeatureCollection") => object.get("features")
            .and_then(JsonValue::as_array)
            .ok_or_else(|| VectorError::GeoJson("FeatureCollection without a features array".to_string()))?
            .iter()
            .collect(),
        Some("Feature") => vec![&root],
        other => {
            return Err(VectorError::GeoJson(format!("expected a Feature or FeatureCollection, found {:?}", other)));
        },
    };

    let mut points = Vec::new();
    let mut skipped = 0;
    for (index, feature) in features.iter().enumerate() {
        let feature = feature.as_object()
            .ok_or_else(|| VectorError::GeoJson(format!("feature {} is not an object", index)))?;

        let coordinates = match feature.get("geometry") {
            None | Some(JsonValue::Null) => {
                skipped += 1;
                continue;
            },
            Some(geometry) => geometry_points(geometry, index)?,
        };

        let class = feature_label(feature, label_field, index)?;
        points.extend(coordinates.into_iter().map(|point| LabeledPoint { point, class }));
    }
    if skipped > 0 {
        warn!("Skipped {} features without geometry", skipped);
    }

    Ok(PointLabelSet::new(points, declared_crs(object)))
}

fn feature_label(feature: &Map<String, JsonValue>, label_field: &str, index: usize) -> VectorResult<i16> {
    let value = feature.get("properties")
        .and_then(JsonValue::as_object)
        .and_then(|properties| properties.get(label_field))
        .ok_or_else(|| VectorError::MissingField(label_field.to_string()))?;

    match value {
        JsonValue::Number(number) => match number.as_f64() {
            Some(v) => label::label_from_f64(v, index),
            None => label::label_from_str(&number.to_string(), index),
        },
        JsonValue::String(text) => label::label_from_str(text, index),
        other => Err(VectorError::InvalidLabel {
            index,
            value: other.to_string(),
            reason: "not a number".to_string(),
        }),
    }
}

fn geometry_points(geometry: &JsonValue, index: usize) -> VectorResult<Vec<Point>> {
    let geometry_type = geometry.get("type").and_then(JsonValue::as_str).unwrap_or("");
    let coordinates = geometry.get("coordinates");

    match geometry_type {
        "Point" => Ok(vec![position(coordinates, index)?]),
        "MultiPoint" => coordinates
            .and_then(JsonValue::as_array)
            .ok_or_else(|| VectorError::GeoJson(format!("feature {} has no MultiPoint coordinates", index)))?
            .iter()
            .map(|c| position(Some(c), index))
            .collect(),
        other => Err(VectorError::UnsupportedGeometry {
            index,
            geometry: other.to_string(),
        }),
    }
}

fn position(value: Option<&JsonValue>, index: usize) -> VectorResult<Point> {
    let values = value.and_then(JsonValue::as_array)
        .filter(|values| values.len() >= 2)
        .ok_or_else(|| VectorError::GeoJson(format!("feature {} has an invalid position", index)))?;

    match (values[0].as_f64(), values[1].as_f64()) {
        (Some(x), Some(y)) => Ok(Point::new(x, y)),
        _ => Err(VectorError::InvalidCoordinate(index)),
    }
}

/// Coordinate system named by the legacy `crs` member
fn declared_crs(object: &Map<String, JsonValue>) -> Option<CoordinateSystem> {
    let name = object.get("crs")?
        .get("properties")?
        .get("name")?
        .as_str()?;
    let crs = CoordinateSystemFactory::from_reference(name);
    if crs.is_none() {
        warn!("Unrecognized GeoJSON crs '{}'", name);
    }
    crs
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "crs": { "type": "name", "properties": { "name": "urn:ogc:def:crs:EPSG::32633" } },
        "features": [
            { "type": "Feature", "properties": { "Class": 1 }, "geometry": { "type": "Point", "coordinates": [10.0, 20.0] } },
            { "type": "Feature", "properties": { "Class": "2" }, "geometry": { "type": "MultiPoint", "coordinates": [[1, 2], [3, 4]] } },
            { "type": "Feature", "properties": { "Class": 3 }, "geometry": null }
        ]
    }"#;

    #[test]
    fn reads_points_and_multipoints() {
        let set = parse_geojson(COLLECTION, "Class").unwrap();

        assert_eq!(set.len(), 3);
        assert_eq!(set.points()[0], LabeledPoint::new(10.0, 20.0, 1));
        assert_eq!(set.points()[2], LabeledPoint::new(3.0, 4.0, 2));
        assert_eq!(set.crs(), Some(CoordinateSystem::UTM(33, true)));
    }

    #[test]
    fn missing_label_field_is_reported() {
        match parse_geojson(COLLECTION, "landcover") {
            Err(VectorError::MissingField(field)) => assert_eq!(field, "landcover"),
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn fractional_label_is_rejected() {
        let text = r#"{"type": "Feature", "properties": {"Class": 1.5}, "geometry": {"type": "Point", "coordinates": [0, 0]}}"#;
        assert!(matches!(parse_geojson(text, "Class"), Err(VectorError::InvalidLabel { .. })));
    }

    #[test]
    fn polygons_are_rejected() {
        let text = r#"{"type": "Feature", "properties": {"Class": 1},
            "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}}"#;
        assert!(matches!(parse_geojson(text, "Class"), Err(VectorError::UnsupportedGeometry { .. })));
    }
}
