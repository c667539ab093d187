//! dBASE table reading
//!
//! Shapefile attributes live in a `.dbf` table whose records line up with
//! the shapes of the `.shp` file by position.

use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use log::debug;

use super::errors::{VectorError, VectorResult};

const HEADER_SIZE: usize = 32;
const DESCRIPTOR_SIZE: usize = 32;
const DESCRIPTOR_TERMINATOR: u8 = 0x0D;
const DELETED_FLAG: u8 = b'*';

/// Column definition of a dBASE table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbfField {
    pub name: String,
    /// dBASE type code: C, N, F, L, D ...
    pub field_type: char,
    pub length: usize,
    pub decimals: u8,
}

/// One row of a dBASE table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbfRecord {
    pub deleted: bool,
    pub values: Vec<String>,
}

/// In-memory dBASE table
#[derive(Debug, Clone)]
pub struct DbfTable {
    pub fields: Vec<DbfField>,
    pub records: Vec<DbfRecord>,
}

impl DbfTable {
    pub fn read(path: &Path) -> VectorResult<Self> {
        let bytes = fs::read(path)?;
        Self::parse(&bytes)
    }

    pub fn parse(bytes: &[u8]) -> VectorResult<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(VectorError::Dbf(format!("file is {} bytes, header needs {}", bytes.len(), HEADER_SIZE)));
        }

        let mut cursor = Cursor::new(bytes);
        cursor.set_position(4);
        let record_count = cursor.read_u32::<LittleEndian>()? as usize;
        let header_length = cursor.read_u16::<LittleEndian>()? as usize;
        let record_length = cursor.read_u16::<LittleEndian>()? as usize;

        let fields = Self::parse_fields(bytes, header_length)?;
        let row_width: usize = 1 + fields.iter().map(|f| f.length).sum::<usize>();
        if row_width > record_length {
            return Err(VectorError::Dbf(format!(
                "fields span {} bytes but records are {} bytes", row_width, record_length)));
        }
        debug!("DBF table: {} records, {} fields", record_count, fields.len());

        let table_end = record_count.checked_mul(record_length)
            .and_then(|body| body.checked_add(header_length));
        if table_end.map_or(true, |end| end > bytes.len()) {
            return Err(VectorError::Dbf(format!(
                "{} records of {} bytes do not fit in a {} byte file", record_count, record_length, bytes.len())));
        }

        let mut records = Vec::with_capacity(record_count);
        for index in 0..record_count {
            let start = header_length + index * record_length;
            let row = bytes.get(start..start + record_length).ok_or_else(|| {
                VectorError::Dbf(format!("record {} extends past the end of the file", index))
            })?;

            let mut values = Vec::with_capacity(fields.len());
            let mut offset = 1;
            for field in &fields {
                let raw = &row[offset..offset + field.length];
                values.push(String::from_utf8_lossy(raw).trim().to_string());
                offset += field.length;
            }
            records.push(DbfRecord {
                deleted: row[0] == DELETED_FLAG,
                values,
            });
        }

        Ok(DbfTable { fields, records })
    }

    fn parse_fields(bytes: &[u8], header_length: usize) -> VectorResult<Vec<DbfField>> {
        let mut fields = Vec::new();
        let mut position = HEADER_SIZE;

        while position < header_length.min(bytes.len()) && bytes[position] != DESCRIPTOR_TERMINATOR {
            let mut descriptor = [0u8; DESCRIPTOR_SIZE];
            let mut cursor = Cursor::new(&bytes[position..]);
            cursor.read_exact(&mut descriptor)
                .map_err(|_| VectorError::Dbf("truncated field descriptor".to_string()))?;

            let name_end = descriptor[..11].iter().position(|b| *b == 0).unwrap_or(11);
            fields.push(DbfField {
                name: String::from_utf8_lossy(&descriptor[..name_end]).trim().to_string(),
                field_type: descriptor[11] as char,
                length: descriptor[16] as usize,
                decimals: descriptor[17],
            });
            position += DESCRIPTOR_SIZE;
        }

        Ok(fields)
    }

    /// Column index of `name`, matched exactly first and then ignoring case
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
            .or_else(|| self.fields.iter().position(|f| f.name.eq_ignore_ascii_case(name)))
    }
}
