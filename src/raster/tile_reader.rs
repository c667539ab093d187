//! Tile-based pixel data reading
//!
//! Tiled TIFF files organize image data in rectangular tiles of equal size.
//! Edge tiles are stored at full size and padded past the image border.

use log::{debug, info};
use ndarray::Array3;

use crate::io::seekable::SeekableReader;
use crate::tiff::constants::tags;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::tiff::validation;
use crate::tiff::TiffReader;
use crate::utils::progress::ProgressTracker;

use super::chunk::ChunkDecoder;

/// Reads pixel data from tiled TIFF files into a band cube
pub struct TileReader<'a> {
    /// Reader for accessing the TIFF file
    reader: &'a mut dyn SeekableReader,
    /// IFD containing the image metadata
    ifd: &'a IFD,
    /// TIFF reader for accessing tag values
    tiff_reader: &'a TiffReader,
}

/// Placement of one tile in the image
struct TileWindow {
    x0: usize,
    y0: usize,
    tile_width: usize,
    tile_height: usize,
}

impl<'a> TileReader<'a> {
    pub fn new(reader: &'a mut dyn SeekableReader, ifd: &'a IFD, tiff_reader: &'a TiffReader) -> Self {
        TileReader {
            reader,
            ifd,
            tiff_reader,
        }
    }

    /// Tile width and height in pixels
    pub fn tile_dimensions(&self) -> TiffResult<(usize, usize)> {
        let tile_width = self.ifd.get_tag_value(tags::TILE_WIDTH)
            .ok_or(TiffError::TagNotFound(tags::TILE_WIDTH))? as usize;
        let tile_height = self.ifd.get_tag_value(tags::TILE_LENGTH)
            .ok_or(TiffError::TagNotFound(tags::TILE_LENGTH))? as usize;

        if tile_width == 0 || tile_height == 0 {
            return Err(TiffError::GenericError(format!(
                "Invalid tile dimensions {}x{}", tile_width, tile_height)));
        }
        Ok((tile_width, tile_height))
    }

    /// Decodes every tile into `cube`, shaped (bands, height, width)
    pub fn read_into(
        &mut self,
        cube: &mut Array3<f64>,
        decoder: &ChunkDecoder,
        planar: bool,
        progress: Option<&ProgressTracker>,
    ) -> TiffResult<()> {
        let (bands, height, width) = cube.dim();
        let (tile_width, tile_height) = self.tile_dimensions()?;
        info!("Tile dimensions: {}x{}", tile_width, tile_height);

        let tiles_across = width.div_ceil(tile_width);
        let tiles_down = height.div_ceil(tile_height);
        let tiles_per_band = tiles_across * tiles_down;
        let band_runs = if planar { bands } else { 1 };

        let tile_offsets = self.tiff_reader.read_tag_values(&mut *self.reader, self.ifd, tags::TILE_OFFSETS)?;
        let tile_byte_counts = self.tiff_reader.read_tag_values(&mut *self.reader, self.ifd, tags::TILE_BYTE_COUNTS)?;
        let file_size = validation::get_file_size(&mut *self.reader)?;

        let expected = tiles_per_band * band_runs;
        if tile_offsets.len() < expected || tile_byte_counts.len() < expected {
            return Err(TiffError::GenericError(format!(
                "Expected {} tiles, found {} offsets and {} byte counts",
                expected, tile_offsets.len(), tile_byte_counts.len())));
        }

        for run in 0..band_runs {
            for tile_y in 0..tiles_down {
                for tile_x in 0..tiles_across {
                    let index = run * tiles_per_band + tile_y * tiles_across + tile_x;
                    let (offset, byte_count) = (tile_offsets[index], tile_byte_counts[index]);

                    if let Some(progress) = progress {
                        progress.increment(1);
                    }
                    if offset == 0 || byte_count == 0 {
                        debug!("Tile {} is sparse, keeping fill value", index);
                        continue;
                    }

                    debug!("Reading tile {} ({}, {}) at offset {}", index, tile_x, tile_y, offset);
                    let samples = decoder.read_chunk(
                        &mut *self.reader, offset, byte_count, file_size, tile_width, tile_height)?;

                    let window = TileWindow {
                        x0: tile_x * tile_width,
                        y0: tile_y * tile_height,
                        tile_width,
                        tile_height,
                    };
                    Self::copy_tile(cube, &samples, &window, planar.then_some(run));
                }
            }
        }

        Ok(())
    }

    /// Copies the part of a decoded tile that lies inside the image
    fn copy_tile(cube: &mut Array3<f64>, samples: &[f64], window: &TileWindow, band: Option<usize>) {
        let (bands, height, width) = cube.dim();
        let rows = window.tile_height.min(height - window.y0);
        let cols = window.tile_width.min(width - window.x0);

        for row in 0..rows {
            for col in 0..cols {
                let pixel = row * window.tile_width + col;
                let (y, x) = (window.y0 + row, window.x0 + col);
                match band {
                    Some(b) => cube[[b, y, x]] = samples[pixel],
                    None => {
                        for b in 0..bands {
                            cube[[b, y, x]] = samples[pixel * bands + b];
                        }
                    },
                }
            }
        }
    }
}
