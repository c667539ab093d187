//! GeoKey directory entries
//!
//! GeoTIFF stores its coordinate system description as a directory of
//! keys inside the GeoKeyDirectory tag. Values either sit in the entry
//! itself or point into the GeoDoubleParams/GeoAsciiParams tags.

use crate::tiff::constants::{geo_keys, tags};

/// Represents a GeoKey entry in a GeoKey directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoKeyEntry {
    pub key_id: u16,
    pub tiff_tag_location: u16,
    pub count: u16,
    pub value_offset: u16,
}

/// Where a GeoKey's value is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoKeyLocation {
    /// The value is the entry's `value_offset` itself
    Inline,
    /// Index into the GeoDoubleParams array
    Double,
    /// Byte offset into the GeoAsciiParams string
    Ascii,
    /// Any other tag; not interpreted
    Other(u16),
}

impl GeoKeyEntry {
    /// Create a new GeoKey entry
    pub fn new(key_id: u16, tiff_tag_location: u16, count: u16, value_offset: u16) -> Self {
        GeoKeyEntry {
            key_id,
            tiff_tag_location,
            count,
            value_offset,
        }
    }

    /// Storage location of this key's value
    pub fn location(&self) -> GeoKeyLocation {
        match self.tiff_tag_location {
            0 => GeoKeyLocation::Inline,
            tags::GEO_DOUBLE_PARAMS_TAG => GeoKeyLocation::Double,
            tags::GEO_ASCII_PARAMS_TAG => GeoKeyLocation::Ascii,
            other => GeoKeyLocation::Other(other),
        }
    }

    /// The inline short value, if the key stores one
    pub fn short_value(&self) -> Option<u16> {
        (self.location() == GeoKeyLocation::Inline).then_some(self.value_offset)
    }

    /// Get the name of this key
    pub fn get_name(&self) -> &'static str {
        get_key_name(self.key_id)
    }
}

/// Get a GeoKey name
pub fn get_key_name(key: u16) -> &'static str {
    match key {
        geo_keys::MODEL_TYPE => "GTModelTypeGeoKey",
        geo_keys::RASTER_TYPE => "GTRasterTypeGeoKey",
        geo_keys::CITATION => "GTCitationGeoKey",
        geo_keys::GEOGRAPHIC_TYPE => "GeographicTypeGeoKey",
        geo_keys::GEOG_CITATION => "GeogCitationGeoKey",
        geo_keys::PROJECTED_CS_TYPE => "ProjectedCSTypeGeoKey",
        geo_keys::PCS_CITATION => "PCSCitationGeoKey",
        geo_keys::PROJ_LINEAR_UNITS => "ProjLinearUnitsGeoKey",
        _ => "Unknown",
    }
}
