//! A minimal reader for the activity files this crate produces
//!
//! Enough of the FIT format to parse our own output back into typed field
//! values: header validation, definition tracking by local message type,
//! little-endian scalar fields, trailing checksum verification. Compressed
//! timestamp headers, developer fields, and big-endian files are not
//! supported.

use bytes::Buf;
use thiserror::Error;

use crate::{
    buffer_util::{BufExt, TruncatedError},
    crc,
    magic_numbers::FILE_HEADER_SIZE,
};

use super::{
    header::{FitFileHeader, FitHeaderError},
    BaseType, FieldDef,
};

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Truncated file")]
    Truncated,
    #[error(transparent)]
    Header(#[from] FitHeaderError),
    #[error("Header data size does not match the file length")]
    DataSizeMismatch,
    #[error("File checksum mismatch")]
    CrcMismatch,
    #[error("Data record references undefined local message type {0}")]
    UndefinedLocalType(u8),
    #[error("Unknown base type {0:#04x}")]
    UnknownBaseType(u8),
    #[error("Unsupported feature: {0}")]
    Unsupported(&'static str),
}

impl From<TruncatedError> for ReadError {
    fn from(TruncatedError: TruncatedError) -> Self {
        ReadError::Truncated
    }
}

/// A decoded scalar field value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldValue {
    Enum(u8),
    Uint16(u16),
    Sint32(i32),
    Uint32(u32),
}

#[derive(Clone, Debug)]
pub struct DecodedField {
    pub number: u8,
    pub value: FieldValue,
}

#[derive(Clone, Debug)]
pub struct DecodedMessage {
    pub global_mesg_num: u16,
    pub fields: Vec<DecodedField>,
}

impl DecodedMessage {
    /// Looks up a field by its profile field number.
    pub fn field(&self, number: u8) -> Option<FieldValue> {
        self.fields
            .iter()
            .find(|field| field.number == number)
            .map(|field| field.value)
    }
}

struct Definition {
    global_mesg_num: u16,
    fields: Vec<FieldDef>,
}

const COMPRESSED_HEADER_FLAG: u8 = 0x80;
const DEFINITION_FLAG: u8 = 0x40;
const DEVELOPER_DATA_FLAG: u8 = 0x20;
const LOCAL_TYPE_MASK: u8 = 0x0F;

/// Parses a complete FIT file into its data messages, in file order.
pub fn read_fit(data: &[u8]) -> Result<Vec<DecodedMessage>, ReadError> {
    if data.len() < FILE_HEADER_SIZE as usize + 2 {
        return Err(ReadError::Truncated);
    }
    let (body, trailer) = data.split_at(data.len() - 2);
    let expected_crc = u16::from_le_bytes([trailer[0], trailer[1]]);
    if crc::checksum(body) != expected_crc {
        return Err(ReadError::CrcMismatch);
    }

    let mut buffer = body;
    let header = FitFileHeader::from_buf(&mut buffer)?;
    if header.data_size as usize != buffer.remaining() {
        return Err(ReadError::DataSizeMismatch);
    }

    let mut definitions: [Option<Definition>; 16] = Default::default();
    let mut messages = Vec::new();
    while buffer.has_remaining() {
        let record_header = buffer.try_get_byte()?;
        if record_header & COMPRESSED_HEADER_FLAG != 0 {
            return Err(ReadError::Unsupported("compressed timestamp headers"));
        }
        if record_header & DEVELOPER_DATA_FLAG != 0 {
            return Err(ReadError::Unsupported("developer data fields"));
        }
        let local_type = record_header & LOCAL_TYPE_MASK;
        if record_header & DEFINITION_FLAG != 0 {
            definitions[local_type as usize] = Some(read_definition(&mut buffer)?);
        } else {
            let definition = definitions[local_type as usize]
                .as_ref()
                .ok_or(ReadError::UndefinedLocalType(local_type))?;
            messages.push(read_data(&mut buffer, definition)?);
        }
    }
    Ok(messages)
}

fn read_definition(buffer: &mut impl Buf) -> Result<Definition, ReadError> {
    let _reserved = buffer.try_get_byte()?;
    let architecture = buffer.try_get_byte()?;
    if architecture != 0 {
        return Err(ReadError::Unsupported("big-endian architecture"));
    }
    let global_mesg_num = buffer.try_get_u16_le()?;
    let num_fields = buffer.try_get_byte()?;
    let mut fields = Vec::with_capacity(num_fields as usize);
    for _ in 0..num_fields {
        let number = buffer.try_get_byte()?;
        let size = buffer.try_get_byte()?;
        let wire_id = buffer.try_get_byte()?;
        let base_type =
            BaseType::from_wire_id(wire_id).ok_or(ReadError::UnknownBaseType(wire_id))?;
        if size != base_type.size() {
            return Err(ReadError::Unsupported("field arrays"));
        }
        fields.push(FieldDef { number, base_type });
    }
    Ok(Definition {
        global_mesg_num,
        fields,
    })
}

fn read_data(buffer: &mut impl Buf, definition: &Definition) -> Result<DecodedMessage, ReadError> {
    let mut fields = Vec::with_capacity(definition.fields.len());
    for field in &definition.fields {
        let value = match field.base_type {
            BaseType::Enum => FieldValue::Enum(buffer.try_get_byte()?),
            BaseType::Uint16 => FieldValue::Uint16(buffer.try_get_u16_le()?),
            BaseType::Sint32 => FieldValue::Sint32(buffer.try_get_i32_le()?),
            BaseType::Uint32 | BaseType::Uint32z => FieldValue::Uint32(buffer.try_get_u32_le()?),
        };
        fields.push(DecodedField {
            number: field.number,
            value,
        });
    }
    Ok(DecodedMessage {
        global_mesg_num: definition.global_mesg_num,
        fields,
    })
}
