//! GDAL metadata parsing
//!
//! GDAL writes per-dataset and per-band metadata into the GDALMetadata TIFF
//! tag as a small XML document:
//!
//! ```xml
//! <GDALMetadata>
//!   <Item name="DESCRIPTION" sample="0" role="description">Blue</Item>
//!   <Item name="SCALE" sample="0" role="scale">0.0001</Item>
//!   <Item name="AREA_OR_POINT">Area</Item>
//! </GDALMetadata>
//! ```

use std::collections::BTreeMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::tiff::errors::{TiffError, TiffResult};

/// One `<Item>` of a GDALMetadata document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataItem {
    pub name: String,
    /// Zero-based band index, `None` for dataset level items
    pub sample: Option<usize>,
    pub role: Option<String>,
    pub value: String,
}

/// Parsed GDALMetadata content
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GdalMetadata {
    pub items: Vec<MetadataItem>,
}

impl GdalMetadata {
    /// Parses the XML held in the GDALMetadata tag
    pub fn parse(xml: &str) -> TiffResult<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut items = Vec::new();
        let mut current: Option<MetadataItem> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) if e.name().as_ref() == b"Item" => {
                    let mut item = MetadataItem {
                        name: String::new(),
                        sample: None,
                        role: None,
                        value: String::new(),
                    };
                    for attr in e.attributes() {
                        let attr = attr.map_err(|e| xml_error(&e))?;
                        let value = attr.unescape_value().map_err(|e| xml_error(&e))?.into_owned();
                        match attr.key.as_ref() {
                            b"name" => item.name = value,
                            b"sample" => item.sample = value.parse().ok(),
                            b"role" => item.role = Some(value),
                            _ => {},
                        }
                    }
                    current = Some(item);
                },
                Ok(Event::Text(text)) => {
                    if let Some(item) = current.as_mut() {
                        item.value.push_str(&text.unescape().map_err(|e| xml_error(&e))?);
                    }
                },
                Ok(Event::End(e)) if e.name().as_ref() == b"Item" => {
                    if let Some(item) = current.take() {
                        items.push(item);
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(xml_error(&e)),
                _ => {},
            }
        }

        Ok(GdalMetadata { items })
    }

    /// Band descriptions keyed by zero-based band index
    pub fn band_descriptions(&self) -> BTreeMap<usize, String> {
        self.items.iter()
            .filter(|item| item.role.as_deref() == Some("description") || item.name == "DESCRIPTION")
            .filter_map(|item| item.sample.map(|band| (band, item.value.clone())))
            .collect()
    }

    /// Value of a dataset level item
    pub fn dataset_item(&self, name: &str) -> Option<&str> {
        self.items.iter()
            .find(|item| item.sample.is_none() && item.name == name)
            .map(|item| item.value.as_str())
    }
}

fn xml_error(e: &dyn std::fmt::Display) -> TiffError {
    TiffError::GenericError(format!("Invalid GDAL metadata XML: {}", e))
}
