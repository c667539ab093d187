//! GeoTIFF Metadata and GeoKey parsing functionality
//!
//! This module interprets the GeoTIFF tags of an IFD: the model tags that
//! place the pixel grid in world coordinates and the GeoKey directory that
//! names the coordinate system.

use log::{debug, warn};

use crate::coordinate::{AffineTransform, CoordinateSystem, CoordinateSystemFactory};
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{geo_keys, raster_type, tags, USER_DEFINED};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::geotags::{get_key_name, GeoKeyEntry, GeoKeyLocation};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;

/// Georeferencing of a raster
#[derive(Debug, Clone, PartialEq)]
pub struct GeoReference {
    /// Pixel corner to world mapping, already corrected for PixelIsPoint
    pub transform: AffineTransform,
    /// Coordinate system, `None` when absent or user-defined
    pub crs: Option<CoordinateSystem>,
    /// GTRasterTypeGeoKey value (PixelIsArea when absent)
    pub raster_type: u16,
    /// Citation text naming the coordinate system, if any
    pub citation: Option<String>,
}

impl GeoReference {
    /// Human readable coordinate system, falling back to the citation
    pub fn crs_label(&self) -> String {
        match (&self.crs, &self.citation) {
            (Some(crs), _) => crs.to_string(),
            (None, Some(citation)) => citation.clone(),
            (None, None) => "unknown".to_string(),
        }
    }
}

/// Parser for GeoTIFF geographic metadata
pub struct GeoKeyParser;

impl GeoKeyParser {
    /// Parse the GeoKey directory from an IFD
    ///
    /// The directory is a SHORT array: a four value header (version,
    /// revision, minor revision, key count) followed by four values per key.
    /// Returns an empty list when the IFD has no directory.
    pub fn parse_geo_key_directory(
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
    ) -> TiffResult<Vec<GeoKeyEntry>> {
        if !ifd.has_tag(tags::GEO_KEY_DIRECTORY_TAG) {
            return Ok(Vec::new());
        }

        let values = tiff_reader.read_tag_values(reader, ifd, tags::GEO_KEY_DIRECTORY_TAG)?;
        if values.len() < 4 {
            return Err(TiffError::GenericError("Invalid GeoKey directory header".to_string()));
        }

        let num_keys = values[3] as usize;
        debug!("GeoKey directory: version={}, revision={}.{}, keys={}",
               values[0], values[1], values[2], num_keys);

        let available = (values.len() - 4) / 4;
        if available < num_keys {
            warn!("GeoKey directory declares {} keys but holds {}", num_keys, available);
        }

        let keys = values[4..].chunks_exact(4)
            .take(num_keys)
            .map(|key| {
                let entry = GeoKeyEntry::new(key[0] as u16, key[1] as u16, key[2] as u16, key[3] as u16);
                debug!("GeoKey: id={} ({}), location={}, count={}, offset={}",
                       entry.key_id, get_key_name(entry.key_id), entry.tiff_tag_location,
                       entry.count, entry.value_offset);
                entry
            })
            .collect();

        Ok(keys)
    }

    /// Get the value of a GeoKey as a string
    ///
    /// Inline values are returned as numbers, GeoDoubleParams references as
    /// the indexed double and GeoAsciiParams references as the referenced
    /// substring without its `|` terminator.
    pub fn get_geo_key_value_as_string(
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
        key_entry: &GeoKeyEntry,
    ) -> TiffResult<String> {
        match key_entry.location() {
            GeoKeyLocation::Inline => Ok(key_entry.value_offset.to_string()),
            GeoKeyLocation::Double => {
                let doubles = tiff_reader.read_tag_floats(reader, ifd, tags::GEO_DOUBLE_PARAMS_TAG)?;
                doubles.get(key_entry.value_offset as usize)
                    .map(|v| v.to_string())
                    .ok_or_else(|| TiffError::GenericError(format!(
                        "GeoKey {} indexes past GeoDoubleParams", key_entry.key_id)))
            },
            GeoKeyLocation::Ascii => {
                let ascii = tiff_reader.read_tag_ascii(reader, ifd, tags::GEO_ASCII_PARAMS_TAG)?;
                let start = key_entry.value_offset as usize;
                let end = (start + key_entry.count as usize).min(ascii.len());
                ascii.get(start..end)
                    .map(|s| s.trim_end_matches('|').to_string())
                    .ok_or_else(|| TiffError::GenericError(format!(
                        "GeoKey {} indexes past GeoAsciiParams", key_entry.key_id)))
            },
            GeoKeyLocation::Other(tag) => Err(TiffError::GenericError(format!(
                "GeoKey {} stored in unsupported tag {}", key_entry.key_id, tag))),
        }
    }

    /// Read model pixel scale values (x_scale, y_scale, z_scale)
    pub fn read_model_pixel_scale_values(
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
    ) -> TiffResult<Vec<f64>> {
        tiff_reader.read_tag_floats(reader, ifd, tags::MODEL_PIXEL_SCALE_TAG)
    }

    /// Read model tiepoint values (i,j,k,x,y,z, ...)
    pub fn read_model_tiepoint_values(
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
    ) -> TiffResult<Vec<f64>> {
        tiff_reader.read_tag_floats(reader, ifd, tags::MODEL_TIEPOINT_TAG)
    }

    /// Builds the affine transform of the IFD's pixel grid
    ///
    /// ModelTransformation wins over the tiepoint/scale pair when both are
    /// present. Only the first tiepoint is used.
    pub fn read_affine_transform(
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
    ) -> TiffResult<AffineTransform> {
        if ifd.has_tag(tags::MODEL_TRANSFORMATION_TAG) {
            let matrix = tiff_reader.read_tag_floats(reader, ifd, tags::MODEL_TRANSFORMATION_TAG)?;
            return AffineTransform::from_matrix(&matrix);
        }

        if ifd.has_tag(tags::MODEL_TIEPOINT_TAG) && ifd.has_tag(tags::MODEL_PIXEL_SCALE_TAG) {
            let tiepoint = Self::read_model_tiepoint_values(tiff_reader, reader, ifd)?;
            let scale = Self::read_model_pixel_scale_values(tiff_reader, reader, ifd)?;
            if tiepoint.len() > 6 {
                debug!("Using the first of {} tiepoints", tiepoint.len() / 6);
            }
            return AffineTransform::from_tiepoint_scale(&tiepoint, &scale);
        }

        Err(TiffError::MissingGeoreference(
            "no ModelTransformation or ModelTiepoint/ModelPixelScale tags".to_string()))
    }

    /// Extract georeferencing from a TIFF IFD
    ///
    /// The coordinate system comes from ProjectedCSTypeGeoKey, falling back
    /// to GeographicTypeGeoKey. For PixelIsPoint rasters the tiepoint refers
    /// to the pixel centre, so the origin is moved half a pixel up and left.
    pub fn extract_geo_reference(
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
    ) -> TiffResult<GeoReference> {
        let mut transform = Self::read_affine_transform(tiff_reader, reader, ifd)?;
        let keys = Self::parse_geo_key_directory(tiff_reader, reader, ifd)?;

        let short_key = |id: u16| keys.iter()
            .find(|k| k.key_id == id)
            .and_then(GeoKeyEntry::short_value);

        let epsg = short_key(geo_keys::PROJECTED_CS_TYPE)
            .or_else(|| short_key(geo_keys::GEOGRAPHIC_TYPE))
            .filter(|code| *code != 0 && *code != USER_DEFINED);
        let crs = epsg.map(|code| CoordinateSystemFactory::from_epsg(code as u32));

        let raster_type = short_key(geo_keys::RASTER_TYPE).unwrap_or(raster_type::PIXEL_IS_AREA);
        if raster_type == raster_type::PIXEL_IS_POINT {
            debug!("PixelIsPoint raster, shifting origin by half a pixel");
            transform = transform.shifted(-0.5, -0.5);
        }

        let mut citation = None;
        for key_id in [geo_keys::PCS_CITATION, geo_keys::CITATION, geo_keys::GEOG_CITATION] {
            if let Some(key) = keys.iter().find(|k| k.key_id == key_id) {
                match Self::get_geo_key_value_as_string(tiff_reader, reader, ifd, key) {
                    Ok(text) if !text.is_empty() => {
                        citation = Some(text);
                        break;
                    },
                    Ok(_) => {},
                    Err(e) => warn!("Could not read {}: {}", get_key_name(key_id), e),
                }
            }
        }

        if crs.is_none() {
            warn!("Raster has no EPSG coordinate system{}",
                  citation.as_ref().map(|c| format!(" (citation: {})", c)).unwrap_or_default());
        }

        Ok(GeoReference {
            transform,
            crs,
            raster_type,
            citation,
        })
    }

    /// Format GeoKeys for display as (key_id, key_name, value)
    pub fn format_geo_keys(
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
    ) -> TiffResult<Vec<(u16, String, String)>> {
        let keys = Self::parse_geo_key_directory(tiff_reader, reader, ifd)?;

        Ok(keys.iter()
            .map(|key| {
                let value = Self::get_geo_key_value_as_string(tiff_reader, reader, ifd, key)
                    .unwrap_or_else(|_| "Unknown".to_string());
                (key.key_id, key.get_name().to_string(), value)
            })
            .collect())
    }
}

