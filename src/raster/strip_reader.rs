//! Strip-based pixel data reading
//!
//! Stripped TIFFs organize image data in horizontal strips across the entire
//! width of the image. With planar configuration every band has its own run
//! of strips.

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

/// Reads pixel data from stripped TIFF files into a band cube
pub struct StripReader<'a> {
    /// Reader for accessing the TIFF file
    reader: &'a mut dyn SeekableReader,
    /// IFD containing the image metadata
    ifd: &'a IFD,
    /// TIFF reader for accessing tag values
    tiff_reader: &'a TiffReader,
}

impl<'a> StripReader<'a> {
    pub fn new(reader: &'a mut dyn SeekableReader, ifd: &'a IFD, tiff_reader: &'a TiffReader) -> Self {
        StripReader {
            reader,
            ifd,
            tiff_reader,
        }
    }

    /// Rows per strip, defaulting to the full image height
    fn rows_per_strip(&self, height: usize) -> usize {
        self.ifd.get_tag_value(tags::ROWS_PER_STRIP)
            .map(|rows| rows as usize)
            .filter(|rows| *rows > 0)
            .unwrap_or(height)
            .min(height.max(1))
    }

    /// Decodes every strip into `cube`, shaped (bands, height, width)
    ///
    /// Strips without data (offset or byte count 0) keep the cube's fill value.
    pub fn read_into(
        &mut self,
        cube: &mut Array3<f64>,
        decoder: &ChunkDecoder,
        planar: bool,
        progress: Option<&ProgressTracker>,
    ) -> TiffResult<()> {
        let (bands, height, width) = cube.dim();
        let rows_per_strip = self.rows_per_strip(height);
        let strips_per_band = height.div_ceil(rows_per_strip);
        let band_runs = if planar { bands } else { 1 };

        let strip_offsets = self.tiff_reader.read_tag_values(&mut *self.reader, self.ifd, tags::STRIP_OFFSETS)?;
        let strip_byte_counts = self.tiff_reader.read_tag_values(&mut *self.reader, self.ifd, tags::STRIP_BYTE_COUNTS)?;
        let file_size = validation::get_file_size(&mut *self.reader)?;

        info!("Rows per strip: {}", rows_per_strip);
        info!("Total strips: {}", strip_offsets.len());

        let expected = strips_per_band * band_runs;
        if strip_offsets.len() < expected || strip_byte_counts.len() < expected {
            return Err(TiffError::GenericError(format!(
                "Expected {} strips, found {} offsets and {} byte counts",
                expected, strip_offsets.len(), strip_byte_counts.len())));
        }

        for run in 0..band_runs {
            for strip in 0..strips_per_band {
                let index = run * strips_per_band + strip;
                let (offset, byte_count) = (strip_offsets[index], strip_byte_counts[index]);

                if let Some(progress) = progress {
                    progress.increment(1);
                }
                if offset == 0 || byte_count == 0 {
                    debug!("Strip {} is sparse, keeping fill value", index);
                    continue;
                }

                let start_row = strip * rows_per_strip;
                let rows = rows_per_strip.min(height - start_row);
                debug!("Reading strip {} at offset {} with {} bytes", index, offset, byte_count);

                let samples = decoder.read_chunk(&mut *self.reader, offset, byte_count, file_size, width, rows)?;
                Self::copy_strip(cube, &samples, start_row, rows, planar.then_some(run));
            }
        }

        Ok(())
    }

    /// Copies decoded strip samples into the cube
    ///
    /// `band` is set for planar strips, which hold one band; chunky strips
    /// interleave all bands per pixel.
    fn copy_strip(cube: &mut Array3<f64>, samples: &[f64], start_row: usize, rows: usize, band: Option<usize>) {
        let (bands, _, width) = cube.dim();

        for row in 0..rows {
            for col in 0..width {
                let pixel = row * width + col;
                match band {
                    Some(b) => cube[[b, start_row + row, col]] = samples[pixel],
                    None => {
                        for b in 0..bands {
                            cube[[b, start_row + row, col]] = samples[pixel * bands + b];
                        }
                    },
                }
            }
        }
    }
}
