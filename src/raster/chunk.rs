//! Decoding of individual strips and tiles

use log::trace;
use std::io::{Read, Seek, SeekFrom};

use crate::compression::{CompressionFactory, CompressionHandler};
use crate::io::byte_order::ByteOrder;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{predictor, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::tiff::validation;

use super::sample::{self, SampleType};

/// Turns the raw bytes of one chunk into `f64` samples
pub struct ChunkDecoder {
    compression: Box<dyn CompressionHandler>,
    predictor: u16,
    sample_type: SampleType,
    byte_order: ByteOrder,
    /// Interleaved samples per pixel inside a chunk (1 for planar data)
    stride: usize,
}

impl ChunkDecoder {
    pub fn new(
        ifd: &IFD,
        sample_type: SampleType,
        byte_order: ByteOrder,
        stride: usize,
    ) -> TiffResult<Self> {
        let compression = CompressionFactory::create_handler(
            ifd.get_tag_value(tags::COMPRESSION).unwrap_or(1))?;
        let predictor = ifd.get_tag_value(tags::PREDICTOR).unwrap_or(1) as u16;

        match predictor {
            predictor::NONE => {},
            predictor::HORIZONTAL_DIFFERENCING if !sample_type.is_float() => {},
            predictor::FLOATING_POINT if sample_type.is_float() => {},
            other => return Err(TiffError::GenericError(format!(
                "Predictor {} is not supported for {} samples", other, sample_type))),
        }

        Ok(ChunkDecoder {
            compression,
            predictor,
            sample_type,
            byte_order,
            stride,
        })
    }

    pub fn compression_name(&self) -> &'static str {
        self.compression.name()
    }

    /// Reads and decodes the chunk at `offset`
    ///
    /// `row_width` is the chunk's width in pixels and `rows` the number of
    /// rows it holds. Returns `rows * row_width * stride` samples.
    pub fn read_chunk(
        &self,
        reader: &mut dyn SeekableReader,
        offset: u64,
        byte_count: u64,
        file_size: u64,
        row_width: usize,
        rows: usize,
    ) -> TiffResult<Vec<f64>> {
        validation::validate_chunk_bounds(offset, byte_count, file_size)?;

        reader.seek(SeekFrom::Start(offset))?;
        let mut compressed_data = vec![0u8; byte_count as usize];
        reader.read_exact(&mut compressed_data)?;

        self.decode(&compressed_data, row_width, rows)
    }

    /// Decompresses one chunk, undoes the predictor and widens the samples
    pub fn decode(&self, compressed: &[u8], row_width: usize, rows: usize) -> TiffResult<Vec<f64>> {
        let sample_size = self.sample_type.byte_size();
        let expected = rows * row_width * self.stride * sample_size;

        let mut data = self.compression.decompress(compressed)?;
        trace!("Chunk decompressed from {} to {} bytes (expected {})",
               compressed.len(), data.len(), expected);
        if data.len() < expected {
            return Err(TiffError::Decompression {
                codec: self.compression.name(),
                message: format!("chunk holds {} bytes, expected {}", data.len(), expected),
            });
        }
        data.truncate(expected);

        let order = match self.predictor {
            predictor::HORIZONTAL_DIFFERENCING => {
                sample::undo_horizontal_predictor(&mut data, row_width, self.stride, sample_size, self.byte_order);
                self.byte_order
            },
            predictor::FLOATING_POINT => {
                sample::undo_floating_point_predictor(&mut data, row_width, self.stride, sample_size);
                ByteOrder::BigEndian
            },
            _ => self.byte_order,
        };

        Ok(sample::decode_samples(&data, self.sample_type, order))
    }
}
