//! Fixed-offset binary header reading primitives.
//!
//! Thin layer over a byte slice for the two field styles fixed-layout
//! formats use: fixed-width ASCII fields (space- or null-padded, common in
//! EDF) and packed little/big-endian numerics (NIfTI, binary STL). No
//! knowledge of any specific format lives here, only offset arithmetic and
//! byte-to-value conversion.

use byteorder::ByteOrder;

use crate::error::DecodeError;

/// Cursor-free reader over a borrowed byte buffer.
///
/// ASCII reads truncate silently at the buffer end; numeric reads past the
/// end are a hard [`DecodeError::TruncatedInput`].
#[derive(Debug, Clone, Copy)]
pub struct HeaderReader<'a> {
    buf: &'a [u8],
}

impl<'a> HeaderReader<'a> {
    /// Wrap a byte slice.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Total buffer length.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True when the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Read a fixed-width ASCII field, trimming spaces and NUL padding.
    ///
    /// Out-of-range reads return whatever is available (possibly the empty
    /// string) rather than failing; fixed ASCII fields are descriptive and
    /// a short read is better handled by the caller's coercion step.
    pub fn ascii(&self, offset: usize, width: usize) -> String {
        let start = offset.min(self.buf.len());
        let end = offset.saturating_add(width).min(self.buf.len());
        let raw = &self.buf[start..end];
        raw.iter()
            .map(|&b| if b.is_ascii() { b as char } else { '?' })
            .collect::<String>()
            .trim_matches(|c: char| c == ' ' || c == '\0')
            .to_string()
    }

    /// Read a fixed-width ASCII field and coerce it to an integer.
    ///
    /// EDF count fields are ASCII digit strings at fixed width; a coercion
    /// failure means the header is structurally present but malformed.
    pub fn ascii_i64(&self, offset: usize, width: usize, field: &str) -> Result<i64, DecodeError> {
        let text = self.ascii(offset, width);
        text.parse::<i64>().map_err(|_| {
            DecodeError::malformed(format!("field '{field}' is not an integer: {text:?}"))
        })
    }

    /// Read a fixed-width ASCII field and coerce it to a float.
    pub fn ascii_f64(&self, offset: usize, width: usize, field: &str) -> Result<f64, DecodeError> {
        let text = self.ascii(offset, width);
        text.parse::<f64>().map_err(|_| {
            DecodeError::malformed(format!("field '{field}' is not a number: {text:?}"))
        })
    }

    /// Borrow `width` raw bytes at `offset`, or fail with `TruncatedInput`.
    pub fn bytes(&self, offset: usize, width: usize) -> Result<&'a [u8], DecodeError> {
        let end = offset
            .checked_add(width)
            .ok_or_else(|| DecodeError::truncated(usize::MAX, self.buf.len()))?;
        if end > self.buf.len() {
            return Err(DecodeError::truncated(end, self.buf.len()));
        }
        Ok(&self.buf[offset..end])
    }

    /// Read an unsigned byte.
    pub fn u8_at(&self, offset: usize) -> Result<u8, DecodeError> {
        Ok(self.bytes(offset, 1)?[0])
    }

    /// Read a 16-bit signed integer with the given endianness.
    pub fn i16_at<E: ByteOrder>(&self, offset: usize) -> Result<i16, DecodeError> {
        Ok(E::read_i16(self.bytes(offset, 2)?))
    }

    /// Read a 16-bit unsigned integer with the given endianness.
    pub fn u16_at<E: ByteOrder>(&self, offset: usize) -> Result<u16, DecodeError> {
        Ok(E::read_u16(self.bytes(offset, 2)?))
    }

    /// Read a 32-bit signed integer with the given endianness.
    pub fn i32_at<E: ByteOrder>(&self, offset: usize) -> Result<i32, DecodeError> {
        Ok(E::read_i32(self.bytes(offset, 4)?))
    }

    /// Read a 32-bit unsigned integer with the given endianness.
    pub fn u32_at<E: ByteOrder>(&self, offset: usize) -> Result<u32, DecodeError> {
        Ok(E::read_u32(self.bytes(offset, 4)?))
    }

    /// Read a 32-bit float with the given endianness.
    pub fn f32_at<E: ByteOrder>(&self, offset: usize) -> Result<f32, DecodeError> {
        Ok(E::read_f32(self.bytes(offset, 4)?))
    }

    /// Read a 64-bit float with the given endianness.
    pub fn f64_at<E: ByteOrder>(&self, offset: usize) -> Result<f64, DecodeError> {
        Ok(E::read_f64(self.bytes(offset, 8)?))
    }

    /// Read a 24-bit signed little-endian integer (BDF sample width).
    pub fn i24_le_at(&self, offset: usize) -> Result<i32, DecodeError> {
        let b = self.bytes(offset, 3)?;
        let raw = (b[0] as i32) | ((b[1] as i32) << 8) | ((b[2] as i32) << 16);
        // Sign-extend from bit 23.
        Ok((raw << 8) >> 8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{BigEndian, LittleEndian};

    #[test]
    fn ascii_trims_space_and_nul_padding() {
        let reader = HeaderReader::new(b"  EDF+C \0\0");
        assert_eq!(reader.ascii(0, 10), "EDF+C");
    }

    #[test]
    fn ascii_truncates_out_of_range_instead_of_failing() {
        let reader = HeaderReader::new(b"abc");
        assert_eq!(reader.ascii(1, 100), "bc");
        assert_eq!(reader.ascii(50, 10), "");
    }

    #[test]
    fn ascii_i64_rejects_non_digit_fields() {
        let reader = HeaderReader::new(b"12x4");
        let err = reader.ascii_i64(0, 4, "records").unwrap_err();
        assert!(matches!(err, DecodeError::MalformedHeader(_)));
    }

    #[test]
    fn numeric_reads_respect_endianness() {
        let buf = [0x01, 0x02, 0x03, 0x04];
        let reader = HeaderReader::new(&buf);
        assert_eq!(reader.u32_at::<LittleEndian>(0).unwrap(), 0x0403_0201);
        assert_eq!(reader.u32_at::<BigEndian>(0).unwrap(), 0x0102_0304);
    }

    #[test]
    fn numeric_read_past_end_is_truncated_input() {
        let reader = HeaderReader::new(&[0u8; 3]);
        let err = reader.u32_at::<LittleEndian>(0).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TruncatedInput {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn i24_sign_extends() {
        let reader = HeaderReader::new(&[0xFF, 0xFF, 0xFF, 0x01, 0x00, 0x00]);
        assert_eq!(reader.i24_le_at(0).unwrap(), -1);
        assert_eq!(reader.i24_le_at(3).unwrap(), 1);
    }
}
