//! Little-endian cursor reader/writer for frame payloads.

use crate::error::CodecError;

pub(crate) type Result<T> = std::result::Result<T, CodecError>;

pub(crate) struct Reader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub(crate) fn bytes_left(&self) -> usize {
        self.data.len() - self.position
    }

    fn check_eos(&self, len: usize) -> Result<()> {
        if self.bytes_left() >= len {
            Ok(())
        } else {
            Err(CodecError::UnexpectedEof)
        }
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.check_eos(len)?;
        let slice = &self.data[self.position..self.position + len];
        self.position += len;
        Ok(slice)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub(crate) fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub(crate) fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_u32()? as i32)
    }

    pub(crate) fn read_u64(&mut self) -> Result<u64> {
        let b = self.read_bytes(8)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    pub(crate) fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub(crate) fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// u8 length-prefixed UTF-8 string.
    pub(crate) fn read_str(&mut self) -> Result<String> {
        let len = self.read_u8()? as usize;
        let bytes = self.read_bytes(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| CodecError::InvalidUtf8)
    }
}

/// Maps a `from_wire` miss to a decode error naming the offending field.
pub(crate) fn enum_value<T>(field: &'static str, raw: impl Into<i64>, parsed: Option<T>) -> Result<T> {
    parsed.ok_or(CodecError::InvalidValue { field, value: raw.into() })
}

pub(crate) struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub(crate) fn new() -> Self {
        Self { buf: Vec::with_capacity(64) }
    }

    pub(crate) fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub(crate) fn write_u8(&mut self, val: u8) {
        self.buf.push(val);
    }

    pub(crate) fn write_i8(&mut self, val: i8) {
        self.buf.push(val as u8);
    }

    pub(crate) fn write_u16(&mut self, val: u16) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub(crate) fn write_u32(&mut self, val: u32) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub(crate) fn write_i32(&mut self, val: i32) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub(crate) fn write_u64(&mut self, val: u64) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub(crate) fn write_f32(&mut self, val: f32) {
        self.write_u32(val.to_bits());
    }

    pub(crate) fn write_f64(&mut self, val: f64) {
        self.write_u64(val.to_bits());
    }

    /// u8 length-prefixed UTF-8 string. Callers validate length upstream;
    /// anything longer than 255 bytes is truncated at the length prefix
    /// boundary, which validation rules out before reaching here.
    pub(crate) fn write_str(&mut self, s: &str) {
        let len = s.len().min(u8::MAX as usize);
        self.write_u8(len as u8);
        self.buf.extend_from_slice(&s.as_bytes()[..len]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_round_trip() {
        let mut w = Writer::new();
        w.write_u8(0xAB);
        w.write_u16(0x1234);
        w.write_u32(0xDEADBEEF);
        w.write_f32(3.5);
        w.write_f64(-0.25);
        w.write_str("band");
        let data = w.into_inner();

        let mut r = Reader::new(&data);
        assert_eq!(r.read_u8().unwrap(), 0xAB);
        assert_eq!(r.read_u16().unwrap(), 0x1234);
        assert_eq!(r.read_u32().unwrap(), 0xDEADBEEF);
        assert_eq!(r.read_f32().unwrap(), 3.5);
        assert_eq!(r.read_f64().unwrap(), -0.25);
        assert_eq!(r.read_str().unwrap(), "band");
        assert_eq!(r.bytes_left(), 0);
    }

    #[test]
    fn short_read_is_eof() {
        let mut r = Reader::new(&[1, 2]);
        assert!(matches!(r.read_u32(), Err(CodecError::UnexpectedEof)));
    }
}
