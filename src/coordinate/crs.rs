//! Coordinate Reference System handling
//!
//! Coordinate systems are identified by EPSG code only. They are read and
//! compared, never used to transform coordinates.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::tiff::errors::{TiffError, TiffResult};

lazy_static! {
    /// Outermost `AUTHORITY["EPSG","<code>"]` of a WKT string is the last one
    static ref WKT_AUTHORITY: Regex =
        Regex::new(r#"AUTHORITY\s*\[\s*"EPSG"\s*,\s*"?(\d+)"?\s*\]"#).expect("valid regex");
    /// `urn:ogc:def:crs:EPSG::<code>` and `EPSG:<code>` forms
    static ref EPSG_REFERENCE: Regex =
        Regex::new(r"(?i)EPSG:(?:[\d.]*:)?(\d+)").expect("valid regex");
}

/// Identifier for common coordinate systems
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSystem {
    /// WGS 84 (EPSG:4326)
    WGS84,
    /// Web Mercator (EPSG:3857)
    WebMercator,
    /// UTM Zone (EPSG:326xx for northern hemisphere, 327xx for southern)
    UTM(u8, bool),
    /// Other EPSG code
    Other(u32),
}

impl CoordinateSystem {
    /// Get the EPSG code for this coordinate system
    pub fn epsg_code(&self) -> u32 {
        match self {
            CoordinateSystem::WGS84 => 4326,
            CoordinateSystem::WebMercator => 3857,
            CoordinateSystem::UTM(zone, is_northern) => {
                if *is_northern {
                    32600 + *zone as u32
                } else {
                    32700 + *zone as u32
                }
            },
            CoordinateSystem::Other(code) => *code,
        }
    }

    /// Get a description of this coordinate system
    pub fn description(&self) -> String {
        match self {
            CoordinateSystem::WGS84 => "WGS 84 (EPSG:4326)".to_string(),
            CoordinateSystem::WebMercator => "Web Mercator (EPSG:3857)".to_string(),
            CoordinateSystem::UTM(zone, is_northern) => {
                if *is_northern {
                    format!("WGS 84 / UTM Zone {}N (EPSG:{})", zone, self.epsg_code())
                } else {
                    format!("WGS 84 / UTM Zone {}S (EPSG:{})", zone, self.epsg_code())
                }
            },
            CoordinateSystem::Other(code) => format!("EPSG:{}", code),
        }
    }
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg_code())
    }
}

/// Factory for creating coordinate systems
pub struct CoordinateSystemFactory;

impl CoordinateSystemFactory {
    /// Create a coordinate system from an EPSG code
    pub fn from_epsg(epsg: u32) -> CoordinateSystem {
        match epsg {
            4326 => CoordinateSystem::WGS84,
            3857 => CoordinateSystem::WebMercator,
            32601..=32660 => CoordinateSystem::UTM((epsg - 32600) as u8, true),
            32701..=32760 => CoordinateSystem::UTM((epsg - 32700) as u8, false),
            _ => CoordinateSystem::Other(epsg),
        }
    }

    /// Parse a coordinate system from a string (e.g. "EPSG:4326" or "4326")
    pub fn from_string(crs_str: &str) -> TiffResult<CoordinateSystem> {
        let crs_str = crs_str.trim().to_uppercase();
        let code = crs_str.strip_prefix("EPSG:").unwrap_or(&crs_str);

        code.parse::<u32>()
            .map(Self::from_epsg)
            .map_err(|_| TiffError::GenericError(format!("Unsupported CRS format: {}", crs_str)))
    }

    /// Extract the coordinate system from a WKT definition (e.g. a `.prj` file)
    ///
    /// Returns `None` when the WKT carries no EPSG authority.
    pub fn from_wkt(wkt: &str) -> Option<CoordinateSystem> {
        WKT_AUTHORITY.captures_iter(wkt)
            .last()
            .and_then(|caps| caps[1].parse::<u32>().ok())
            .map(Self::from_epsg)
    }

    /// Extract the coordinate system from an EPSG reference such as
    /// `urn:ogc:def:crs:EPSG::32633` or `EPSG:4326`
    pub fn from_reference(reference: &str) -> Option<CoordinateSystem> {
        if reference.to_uppercase().contains("CRS84") {
            return Some(CoordinateSystem::WGS84);
        }

        EPSG_REFERENCE.captures(reference)
            .and_then(|caps| caps[1].parse::<u32>().ok())
            .map(Self::from_epsg)
    }
}
