//! The FIT file header

use bytes::{Buf, BufMut};
use four_cc::FourCC;
use thiserror::Error;

use crate::{
    buffer_util::BufExt,
    crc,
    magic_numbers::{FILE_HEADER_SIZE, FIT_SIGNATURE, PROFILE_VERSION, PROTOCOL_VERSION},
};

#[derive(Error, Debug)]
pub enum FitHeaderError {
    #[error("Truncated header")]
    Truncated,
    #[error("Unsupported header size")]
    UnsupportedSize,
    #[error("Invalid data type tag")]
    InvalidSignature,
    #[error("Header checksum mismatch")]
    CrcMismatch,
}

/// The 14-byte leading header of a FIT file.
///
/// `data_size` counts record bytes only, excluding the header itself and
/// the trailing file checksum, and is only known once every record has been
/// written; the writer serializes a placeholder first and rewrites the
/// header during finalization.
pub struct FitFileHeader {
    pub header_size: u8,
    pub protocol_version: u8,
    pub profile_version: u16,
    pub data_size: u32,
    pub data_type: FourCC,
    pub crc: u16,
}

impl FitFileHeader {
    pub fn with_data_size(data_size: u32) -> Self {
        Self {
            header_size: FILE_HEADER_SIZE,
            protocol_version: PROTOCOL_VERSION,
            profile_version: PROFILE_VERSION,
            data_size,
            data_type: FIT_SIGNATURE,
            crc: 0,
        }
    }

    /// Serializes the header, computing the checksum of its leading twelve
    /// bytes into the final two.
    pub fn write_to_buf(&self, buffer: &mut impl BufMut) {
        let mut leading = [0u8; 12];
        {
            let mut cursor = &mut leading[..];
            cursor.put_u8(self.header_size);
            cursor.put_u8(self.protocol_version);
            cursor.put_u16_le(self.profile_version);
            cursor.put_u32_le(self.data_size);
            cursor.put_slice(&self.data_type.0);
        }
        buffer.put_slice(&leading);
        buffer.put_u16_le(crc::checksum(&leading));
    }

    pub fn from_buf(buffer: &mut impl Buf) -> Result<Self, FitHeaderError> {
        if buffer.remaining() < FILE_HEADER_SIZE as usize {
            return Err(FitHeaderError::Truncated);
        }
        let mut leading = [0u8; 12];
        buffer.copy_to_slice(&mut leading);

        let mut cursor = &leading[..];
        let header = Self {
            header_size: cursor.get_u8(),
            protocol_version: cursor.get_u8(),
            profile_version: cursor.get_u16_le(),
            data_size: cursor.get_u32_le(),
            data_type: cursor.get_four_cc(),
            crc: buffer.get_u16_le(),
        };
        header.validate(&leading)?;
        Ok(header)
    }

    fn validate(&self, leading: &[u8; 12]) -> Result<(), FitHeaderError> {
        if self.header_size != FILE_HEADER_SIZE {
            return Err(FitHeaderError::UnsupportedSize);
        }
        if self.data_type != FIT_SIGNATURE {
            return Err(FitHeaderError::InvalidSignature);
        }
        // a zero header checksum means the writer chose not to set one
        if self.crc != 0 && self.crc != crc::checksum(leading) {
            return Err(FitHeaderError::CrcMismatch);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::{FitFileHeader, FitHeaderError};

    fn serialized(data_size: u32) -> Vec<u8> {
        let mut buffer = Vec::new();
        FitFileHeader::with_data_size(data_size).write_to_buf(&mut buffer);
        buffer
    }

    #[test]
    fn write_then_read_round_trips() {
        let buffer = serialized(123);
        assert_eq!(14, buffer.len());
        let header = FitFileHeader::from_buf(&mut Cursor::new(&buffer)).unwrap();
        assert_eq!(123, header.data_size);
        assert_eq!(14, header.header_size);
    }

    #[test]
    fn corrupted_signature_is_rejected() {
        let mut buffer = serialized(0);
        buffer[8] = b'X';
        assert!(matches!(
            FitFileHeader::from_buf(&mut Cursor::new(&buffer)),
            Err(FitHeaderError::InvalidSignature)
        ));
    }

    #[test]
    fn corrupted_checksum_is_rejected() {
        let mut buffer = serialized(0);
        let stored = u16::from_le_bytes([buffer[12], buffer[13]]);
        let wrong = if stored.wrapping_add(1) == 0 {
            stored.wrapping_add(2)
        } else {
            stored.wrapping_add(1)
        };
        buffer[12..14].copy_from_slice(&wrong.to_le_bytes());
        assert!(matches!(
            FitFileHeader::from_buf(&mut Cursor::new(&buffer)),
            Err(FitHeaderError::CrcMismatch)
        ));
    }

    #[test]
    fn truncated_header_is_rejected() {
        let buffer = serialized(0);
        assert!(matches!(
            FitFileHeader::from_buf(&mut Cursor::new(&buffer[..10])),
            Err(FitHeaderError::Truncated)
        ));
    }
}
