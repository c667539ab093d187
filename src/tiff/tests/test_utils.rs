use std::io::Cursor;
use byteorder::{BigEndian, ByteOrder as EndianBytes, LittleEndian, WriteBytesExt};

use crate::tiff::constants::field_types;

/// Value of a fixture tag
#[derive(Debug, Clone)]
pub enum TagValue {
    Short(Vec<u16>),
    Long(Vec<u32>),
    Double(Vec<f64>),
    Ascii(String),
    /// Offsets of the fixture's data chunks, written as LONGs
    ChunkOffsets,
    /// Sizes of the fixture's data chunks, written as LONGs
    ChunkByteCounts,
}

/// Builder for small single-IFD classic TIFF files held in memory
///
/// Layout is header, chunk data, out-of-line tag values, IFD.
#[derive(Debug, Default, Clone)]
pub struct TiffFixture {
    pub big_endian: bool,
    pub entries: Vec<(u16, TagValue)>,
    pub chunks: Vec<Vec<u8>>,
}

impl TiffFixture {
    pub fn new(big_endian: bool) -> Self {
        TiffFixture { big_endian, ..Default::default() }
    }

    pub fn tag(mut self, tag: u16, value: TagValue) -> Self {
        self.entries.push((tag, value));
        self
    }

    pub fn chunk(mut self, data: Vec<u8>) -> Self {
        self.chunks.push(data);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        if self.big_endian {
            self.build_with::<BigEndian>(b"MM")
        } else {
            self.build_with::<LittleEndian>(b"II")
        }
    }

    pub fn cursor(&self) -> Cursor<Vec<u8>> {
        Cursor::new(self.build())
    }

    fn build_with<B: EndianBytes>(&self, magic: &[u8; 2]) -> Vec<u8> {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(magic);
        buffer.write_u16::<B>(42).unwrap();
        buffer.write_u32::<B>(0).unwrap(); // patched below

        let mut offsets = Vec::new();
        for chunk in &self.chunks {
            offsets.push(buffer.len() as u32);
            buffer.extend_from_slice(chunk);
            if buffer.len() % 2 == 1 {
                buffer.push(0);
            }
        }
        let counts: Vec<u32> = self.chunks.iter().map(|c| c.len() as u32).collect();

        let mut entries = self.entries.clone();
        entries.sort_by_key(|(tag, _)| *tag);

        let mut encoded = Vec::new();
        for (tag, value) in &entries {
            let (field_type, count, bytes) = encode_value::<B>(value, &offsets, &counts);
            let field = if bytes.len() <= 4 {
                let mut inline = bytes.clone();
                inline.resize(4, 0);
                inline
            } else {
                let offset = buffer.len() as u32;
                buffer.extend_from_slice(&bytes);
                if buffer.len() % 2 == 1 {
                    buffer.push(0);
                }
                let mut field = vec![0u8; 4];
                B::write_u32(&mut field, offset);
                field
            };
            encoded.push((*tag, field_type, count, field));
        }

        let ifd_offset = buffer.len() as u32;
        buffer.write_u16::<B>(encoded.len() as u16).unwrap();
        for (tag, field_type, count, field) in encoded {
            buffer.write_u16::<B>(tag).unwrap();
            buffer.write_u16::<B>(field_type).unwrap();
            buffer.write_u32::<B>(count).unwrap();
            buffer.extend_from_slice(&field);
        }
        buffer.write_u32::<B>(0).unwrap();

        B::write_u32(&mut buffer[4..8], ifd_offset);
        buffer
    }
}

fn encode_value<B: EndianBytes>(value: &TagValue, offsets: &[u32], counts: &[u32]) -> (u16, u32, Vec<u8>) {
    let mut bytes = Vec::new();
    match value {
        TagValue::Short(values) => {
            values.iter().for_each(|v| bytes.write_u16::<B>(*v).unwrap());
            (field_types::SHORT, values.len() as u32, bytes)
        },
        TagValue::Long(values) => {
            values.iter().for_each(|v| bytes.write_u32::<B>(*v).unwrap());
            (field_types::LONG, values.len() as u32, bytes)
        },
        TagValue::Double(values) => {
            values.iter().for_each(|v| bytes.write_f64::<B>(*v).unwrap());
            (field_types::DOUBLE, values.len() as u32, bytes)
        },
        TagValue::Ascii(text) => {
            bytes.extend_from_slice(text.as_bytes());
            bytes.push(0);
            (field_types::ASCII, bytes.len() as u32, bytes)
        },
        TagValue::ChunkOffsets => encode_value::<B>(&TagValue::Long(offsets.to_vec()), offsets, counts),
        TagValue::ChunkByteCounts => encode_value::<B>(&TagValue::Long(counts.to_vec()), offsets, counts),
    }
}

/// Creates a test buffer with TIFF header and sample data
pub fn create_test_tiff_buffer() -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();

    // TIFF header (little-endian)
    buffer.write_u16::<LittleEndian>(0x4949).unwrap(); // II for little-endian
    buffer.write_u16::<LittleEndian>(42).unwrap();     // TIFF magic number
    buffer.write_u32::<LittleEndian>(8).unwrap();      // IFD offset

    // Sample IFD (at offset 8)
    buffer.write_u16::<LittleEndian>(2).unwrap();      // Entry count (2 entries)

    // Entry 1: ImageWidth (tag 256)
    buffer.write_u16::<LittleEndian>(256).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (LONG)
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u32::<LittleEndian>(800).unwrap();    // Value (width)

    // Entry 2: ImageLength/Height (tag 257)
    buffer.write_u16::<LittleEndian>(257).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (LONG)
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u32::<LittleEndian>(600).unwrap();    // Value (height)

    // Next IFD offset (0 = no more IFDs)
    buffer.write_u32::<LittleEndian>(0).unwrap();

    Cursor::new(buffer)
}

/// Creates a test buffer with BigTIFF header and sample data
pub fn create_test_bigtiff_buffer() -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();

    // BigTIFF header (little-endian)
    buffer.write_u16::<LittleEndian>(0x4949).unwrap(); // II for little-endian
    buffer.write_u16::<LittleEndian>(43).unwrap();     // BigTIFF version
    buffer.write_u16::<LittleEndian>(8).unwrap();      // Offset size
    buffer.write_u16::<LittleEndian>(0).unwrap();      // Reserved
    buffer.write_u64::<LittleEndian>(16).unwrap();     // IFD offset

    // Sample IFD (at offset 16)
    buffer.write_u64::<LittleEndian>(3).unwrap();      // Entry count (3 entries)

    // Entry 1: ImageWidth (tag 256)
    buffer.write_u16::<LittleEndian>(256).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (LONG)
    buffer.write_u64::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u64::<LittleEndian>(1024).unwrap();   // Value (width)

    // Entry 2: ImageLength/Height (tag 257)
    buffer.write_u16::<LittleEndian>(257).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (LONG)
    buffer.write_u64::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u64::<LittleEndian>(768).unwrap();    // Value (height)

    // Entry 3: BitsPerSample, four SHORTs packed in the 8 byte value field
    buffer.write_u16::<LittleEndian>(258).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(3).unwrap();      // Type (SHORT)
    buffer.write_u64::<LittleEndian>(4).unwrap();      // Count
    for _ in 0..4 {
        buffer.write_u16::<LittleEndian>(16).unwrap();
    }

    // Next IFD offset (0 = no more IFDs)
    buffer.write_u64::<LittleEndian>(0).unwrap();

    Cursor::new(buffer)
}
