//! Raster loading: GeoTIFF file to band cube

use log::{debug, info, warn};
use ndarray::Array3;
use std::path::Path;

use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{planar_config, sample_format, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::geo_key_parser::GeoKeyParser;
use crate::tiff::ifd::IFD;
use crate::tiff::TiffReader;
use crate::utils::progress::ProgressTracker;
use crate::utils::tag_utils;

use super::chunk::ChunkDecoder;
use super::cube::{RasterCube, RasterMeta};
use super::gdal_metadata::GdalMetadata;
use super::sample::SampleType;
use super::strip_reader::StripReader;
use super::tile_reader::TileReader;

/// Loads the first image of a GeoTIFF together with its georeferencing
#[derive(Debug, Clone, Default)]
pub struct RasterLoader {
    show_progress: bool,
}

impl RasterLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a progress bar while chunks are decoded
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Reads pixels and metadata of the raster at `path`
    pub fn load(&self, path: &Path) -> TiffResult<RasterCube> {
        info!("Loading raster {}", path.display());
        let mut reader = TiffReader::open(path)?;
        self.read_from(&mut reader)
    }

    /// Reads pixels and metadata from an open TIFF stream
    pub fn read_from(&self, reader: &mut dyn SeekableReader) -> TiffResult<RasterCube> {
        let mut tiff_reader = TiffReader::new();
        let tiff = tiff_reader.read(reader)?;
        let ifd = tiff.require_main_ifd()?;
        if tiff.ifd_count() > 1 {
            debug!("Ignoring {} additional IFDs", tiff.ifd_count() - 1);
        }

        let meta = Self::read_meta(&tiff_reader, reader, ifd)?;
        let data = self.read_pixels(&tiff_reader, reader, ifd, &meta)?;

        Ok(RasterCube { data, meta })
    }

    /// Collects dimensions, sample type, georeferencing and GDAL extras
    fn read_meta(tiff_reader: &TiffReader, reader: &mut dyn SeekableReader, ifd: &IFD) -> TiffResult<RasterMeta> {
        let (width, height) = ifd.get_dimensions().ok_or(TiffError::MissingDimensions)?;
        if width == 0 || height == 0 {
            return Err(TiffError::MissingDimensions);
        }

        let band_count = ifd.get_samples_per_pixel() as usize;
        if band_count == 0 {
            return Err(TiffError::NoBands);
        }

        let sample_type = Self::read_sample_type(tiff_reader, reader, ifd)?;
        let geo = GeoKeyParser::extract_geo_reference(tiff_reader, reader, ifd)?;
        let nodata = Self::read_nodata(tiff_reader, reader, ifd);

        let band_descriptions = if ifd.has_tag(tags::GDAL_METADATA) {
            match tiff_reader.read_tag_ascii(reader, ifd, tags::GDAL_METADATA).and_then(|xml| GdalMetadata::parse(&xml)) {
                Ok(metadata) => metadata.band_descriptions(),
                Err(e) => {
                    warn!("Ignoring unreadable GDAL metadata: {}", e);
                    Default::default()
                }
            }
        } else {
            Default::default()
        };

        let compression = tag_utils::get_compression_name(ifd.get_tag_value(tags::COMPRESSION).unwrap_or(1));

        let meta = RasterMeta {
            width: width as usize,
            height: height as usize,
            band_count,
            sample_type,
            transform: geo.transform,
            crs_label: geo.crs_label(),
            crs: geo.crs,
            nodata,
            band_descriptions,
            compression: compression.to_string(),
            tiled: ifd.is_tiled(),
        };
        debug!("{}", meta);
        Ok(meta)
    }

    /// Sample type shared by all bands
    fn read_sample_type(tiff_reader: &TiffReader, reader: &mut dyn SeekableReader, ifd: &IFD) -> TiffResult<SampleType> {
        let bits = if ifd.has_tag(tags::BITS_PER_SAMPLE) {
            tiff_reader.read_tag_values(reader, ifd, tags::BITS_PER_SAMPLE)?
        } else {
            vec![1]
        };
        let formats = if ifd.has_tag(tags::SAMPLE_FORMAT) {
            tiff_reader.read_tag_values(reader, ifd, tags::SAMPLE_FORMAT)?
        } else {
            vec![sample_format::UNSIGNED as u64]
        };

        let first_bits = bits.first().copied().unwrap_or(1);
        let first_format = formats.first().copied().unwrap_or(sample_format::UNSIGNED as u64);
        if bits.iter().any(|b| *b != first_bits) || formats.iter().any(|f| *f != first_format) {
            return Err(TiffError::GenericError(format!(
                "Bands with differing sample types are not supported (bits {:?}, formats {:?})", bits, formats)));
        }

        SampleType::from_tags(first_bits as u16, first_format as u16)
    }

    /// NoData value from the GDALNoData tag, if present and numeric
    fn read_nodata(tiff_reader: &TiffReader, reader: &mut dyn SeekableReader, ifd: &IFD) -> Option<f64> {
        if !ifd.has_tag(tags::GDAL_NODATA) {
            return None;
        }

        match tiff_reader.read_tag_ascii(reader, ifd, tags::GDAL_NODATA) {
            Ok(text) => match text.trim().parse::<f64>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring non-numeric NoData value '{}'", text.trim());
                    None
                }
            },
            Err(e) => {
                warn!("Could not read NoData tag: {}", e);
                None
            }
        }
    }

    /// Decodes all strips or tiles into a (bands, height, width) cube
    fn read_pixels(
        &self,
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
        meta: &RasterMeta,
    ) -> TiffResult<Array3<f64>> {
        let planar = meta.band_count > 1 && ifd.get_planar_configuration() == planar_config::PLANAR;
        let stride = if planar { 1 } else { meta.band_count };
        let decoder = ChunkDecoder::new(ifd, meta.sample_type, tiff_reader.byte_order()?, stride)?;
        info!("Using compression: {}", decoder.compression_name());

        let fill = meta.nodata.unwrap_or(0.0);
        let mut cube = Array3::from_elem((meta.band_count, meta.height, meta.width), fill);

        let offsets_tag = if meta.tiled { tags::TILE_OFFSETS } else { tags::STRIP_OFFSETS };
        let chunk_count = ifd.get_entry(offsets_tag)
            .map(|entry| entry.count)
            .ok_or(TiffError::TagNotFound(offsets_tag))?;
        let progress = self.show_progress.then(|| ProgressTracker::new(chunk_count, "Decoding raster"));

        if meta.tiled {
            TileReader::new(reader, ifd, tiff_reader).read_into(&mut cube, &decoder, planar, progress.as_ref())?;
        } else {
            StripReader::new(reader, ifd, tiff_reader).read_into(&mut cube, &decoder, planar, progress.as_ref())?;
        }

        if let Some(progress) = progress {
            progress.finish();
        }
        Ok(cube)
    }
}
