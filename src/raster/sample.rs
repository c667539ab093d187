//! Sample types and predictor handling
//!
//! Decompressed chunks are raw sample bytes in the file's byte order. The
//! helpers here undo TIFF predictors in place and widen samples to `f64`.

use std::fmt;

use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::sample_format;
use crate::tiff::errors::{TiffError, TiffResult};

/// Numeric type of one raster sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl SampleType {
    /// Resolves BitsPerSample and SampleFormat into a sample type
    pub fn from_tags(bits: u16, format: u16) -> TiffResult<Self> {
        let sample_type = match (format, bits) {
            (sample_format::UNSIGNED, 8) => SampleType::U8,
            (sample_format::UNSIGNED, 16) => SampleType::U16,
            (sample_format::UNSIGNED, 32) => SampleType::U32,
            (sample_format::UNSIGNED, 64) => SampleType::U64,
            (sample_format::SIGNED, 8) => SampleType::I8,
            (sample_format::SIGNED, 16) => SampleType::I16,
            (sample_format::SIGNED, 32) => SampleType::I32,
            (sample_format::SIGNED, 64) => SampleType::I64,
            (sample_format::IEEEFP, 32) => SampleType::F32,
            (sample_format::IEEEFP, 64) => SampleType::F64,
            _ => return Err(TiffError::UnsupportedSampleType { bits, format }),
        };
        Ok(sample_type)
    }

    /// Size of one sample in bytes
    pub fn byte_size(&self) -> usize {
        match self {
            SampleType::U8 | SampleType::I8 => 1,
            SampleType::U16 | SampleType::I16 => 2,
            SampleType::U32 | SampleType::I32 | SampleType::F32 => 4,
            SampleType::U64 | SampleType::I64 | SampleType::F64 => 8,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, SampleType::F32 | SampleType::F64)
    }

    /// Decodes one sample from the start of `bytes`
    fn decode(&self, bytes: &[u8], order: ByteOrder) -> f64 {
        let raw = order.read_uint(bytes, self.byte_size());
        match self {
            SampleType::U8 | SampleType::U16 | SampleType::U32 | SampleType::U64 => raw as f64,
            SampleType::I8 => raw as u8 as i8 as f64,
            SampleType::I16 => raw as u16 as i16 as f64,
            SampleType::I32 => raw as u32 as i32 as f64,
            SampleType::I64 => raw as i64 as f64,
            SampleType::F32 => f32::from_bits(raw as u32) as f64,
            SampleType::F64 => f64::from_bits(raw),
        }
    }
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SampleType::U8 => "uint8",
            SampleType::U16 => "uint16",
            SampleType::U32 => "uint32",
            SampleType::U64 => "uint64",
            SampleType::I8 => "int8",
            SampleType::I16 => "int16",
            SampleType::I32 => "int32",
            SampleType::I64 => "int64",
            SampleType::F32 => "float32",
            SampleType::F64 => "float64",
        };
        f.write_str(name)
    }
}

/// Widens every complete sample in `bytes` to `f64`
pub fn decode_samples(bytes: &[u8], sample_type: SampleType, order: ByteOrder) -> Vec<f64> {
    bytes.chunks_exact(sample_type.byte_size())
        .map(|sample| sample_type.decode(sample, order))
        .collect()
}

/// Undoes horizontal differencing (predictor 2) in place
///
/// Each row holds `row_width` pixels of `stride` interleaved samples;
/// every sample is the wrapping difference to the sample one pixel left.
pub fn undo_horizontal_predictor(
    data: &mut [u8],
    row_width: usize,
    stride: usize,
    sample_size: usize,
    order: ByteOrder,
) {
    let row_bytes = row_width * stride * sample_size;
    if row_bytes == 0 {
        return;
    }
    let mask = if sample_size >= 8 { u64::MAX } else { (1u64 << (sample_size * 8)) - 1 };

    for row in data.chunks_exact_mut(row_bytes) {
        for i in stride..row_width * stride {
            let current = i * sample_size;
            let previous = (i - stride) * sample_size;
            let value = order.read_uint(&row[current..], sample_size)
                .wrapping_add(order.read_uint(&row[previous..], sample_size)) & mask;
            order.write_uint(&mut row[current..], value, sample_size);
        }
    }
}

/// Undoes the floating point predictor (predictor 3) in place
///
/// Rows are stored as byte planes, most significant byte first, with the
/// bytes differenced across the row. The rebuilt samples are big-endian
/// regardless of the file's byte order.
pub fn undo_floating_point_predictor(
    data: &mut [u8],
    row_width: usize,
    stride: usize,
    sample_size: usize,
) {
    let samples_per_row = row_width * stride;
    let row_bytes = samples_per_row * sample_size;
    if row_bytes == 0 {
        return;
    }

    let mut planes = vec![0u8; row_bytes];
    for row in data.chunks_exact_mut(row_bytes) {
        for i in stride..row_bytes {
            row[i] = row[i].wrapping_add(row[i - stride]);
        }

        planes.copy_from_slice(row);
        for sample in 0..samples_per_row {
            for byte in 0..sample_size {
                row[sample * sample_size + byte] = planes[byte * samples_per_row + sample];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_sample_types() {
        assert_eq!(SampleType::from_tags(16, 1).unwrap(), SampleType::U16);
        assert_eq!(SampleType::from_tags(8, 2).unwrap(), SampleType::I8);
        assert_eq!(SampleType::from_tags(32, 3).unwrap(), SampleType::F32);
        assert!(matches!(SampleType::from_tags(12, 1),
                         Err(TiffError::UnsupportedSampleType { bits: 12, format: 1 })));
        assert!(SampleType::from_tags(16, 3).is_err());
    }

    #[test]
    fn decodes_signed_and_float_samples() {
        let bytes = [0xFF, 0xFF, 0x00, 0x80];
        assert_eq!(decode_samples(&bytes, SampleType::I16, ByteOrder::LittleEndian), vec![-1.0, -32768.0]);

        let float_bytes = 1.5f32.to_be_bytes();
        assert_eq!(decode_samples(&float_bytes, SampleType::F32, ByteOrder::BigEndian), vec![1.5]);
    }

    #[test]
    fn horizontal_predictor_accumulates_per_channel() {
        // Two rows of three RGB pixels; second row starts fresh
        let mut data = vec![
            10, 20, 30, 1, 2, 3, 1, 2, 3,
            5, 5, 5, 255, 0, 1, 1, 0, 0,
        ];
        undo_horizontal_predictor(&mut data, 3, 3, 1, ByteOrder::LittleEndian);

        assert_eq!(data, vec![
            10, 20, 30, 11, 22, 33, 12, 24, 36,
            5, 5, 5, 4, 5, 6, 5, 5, 6,
        ]);
    }

    #[test]
    fn horizontal_predictor_on_16_bit_samples() {
        let mut data = Vec::new();
        for v in [1000u16, 24, 65535] {
            data.extend_from_slice(&v.to_be_bytes());
        }
        undo_horizontal_predictor(&mut data, 3, 1, 2, ByteOrder::BigEndian);

        assert_eq!(decode_samples(&data, SampleType::U16, ByteOrder::BigEndian), vec![1000.0, 1024.0, 1023.0]);
    }

    #[test]
    fn floating_point_predictor_restores_values() {
        let values = [1.0f32, -2.5, 1234.125];
        let width = values.len();

        // Encode the way a writer does: split into byte planes, then difference
        let mut encoded = vec![0u8; width * 4];
        for (i, v) in values.iter().enumerate() {
            for (byte, b) in v.to_be_bytes().iter().enumerate() {
                encoded[byte * width + i] = *b;
            }
        }
        for i in (1..encoded.len()).rev() {
            encoded[i] = encoded[i].wrapping_sub(encoded[i - 1]);
        }

        undo_floating_point_predictor(&mut encoded, width, 1, 4);
        assert_eq!(decode_samples(&encoded, SampleType::F32, ByteOrder::BigEndian),
                   vec![1.0, -2.5, 1234.125]);
    }
}
