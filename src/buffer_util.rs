use bytes::Buf;
use four_cc::FourCC;
pub use safer_bytes::error::Truncated as TruncatedError;

/// Checked little-endian accessors for the scalar widths FIT records use.
pub trait BufExt {
    fn get_four_cc(&mut self) -> FourCC;
    fn try_get_byte(&mut self) -> Result<u8, TruncatedError>;
    fn try_get_u16_le(&mut self) -> Result<u16, TruncatedError>;
    fn try_get_u32_le(&mut self) -> Result<u32, TruncatedError>;
    fn try_get_i32_le(&mut self) -> Result<i32, TruncatedError>;
}

impl<B> BufExt for B
where
    B: Buf,
{
    fn get_four_cc(&mut self) -> FourCC {
        let mut dest = [0; 4];
        self.copy_to_slice(&mut dest);
        FourCC(dest)
    }

    fn try_get_byte(&mut self) -> Result<u8, TruncatedError> {
        if self.remaining() < 1 {
            Err(TruncatedError)
        } else {
            Ok(self.get_u8())
        }
    }

    fn try_get_u16_le(&mut self) -> Result<u16, TruncatedError> {
        if self.remaining() < 2 {
            Err(TruncatedError)
        } else {
            Ok(self.get_u16_le())
        }
    }

    fn try_get_u32_le(&mut self) -> Result<u32, TruncatedError> {
        if self.remaining() < 4 {
            Err(TruncatedError)
        } else {
            Ok(self.get_u32_le())
        }
    }

    fn try_get_i32_le(&mut self) -> Result<i32, TruncatedError> {
        if self.remaining() < 4 {
            Err(TruncatedError)
        } else {
            Ok(self.get_i32_le())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use four_cc::FourCC;

    use super::BufExt;

    #[test]
    fn four_cc_reads_in_order() {
        let mut buf = Cursor::new(b".FITrest".as_slice());
        assert_eq!(FourCC(*b".FIT"), buf.get_four_cc());
    }

    #[test]
    fn little_endian_getters_work() {
        let mut buf = Cursor::new([0x34u8, 0x12, 0x78, 0x56, 0x34, 0x12]);
        assert_eq!(0x1234, buf.try_get_u16_le().unwrap());
        assert_eq!(0x1234_5678, buf.try_get_u32_le().unwrap());
    }

    #[test]
    fn signed_getter_preserves_sign() {
        let mut buf = Cursor::new((-5i32).to_le_bytes());
        assert_eq!(-5, buf.try_get_i32_le().unwrap());
    }

    #[test]
    fn truncated_input_is_an_error() {
        let mut buf = Cursor::new([0u8, 0, 0]);
        assert!(buf.try_get_u32_le().is_err());
        let mut empty = Cursor::new([0u8; 0]);
        assert!(empty.try_get_byte().is_err());
    }
}
