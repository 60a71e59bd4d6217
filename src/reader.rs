//! Random-access, endian-aware reads over an in-memory buffer.

use std::ops::Range;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use bytes::Bytes;

use crate::error::{MetadataError, MetadataResult};
use crate::tiff::{TIFF_BIG_ENDIAN, TIFF_LITTLE_ENDIAN};

/// Endianness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    /// Little Endian
    #[default]
    LittleEndian,
    /// Big Endian
    BigEndian,
}

impl Endianness {
    /// Interpret a TIFF byte order marker (`II` or `MM`).
    pub fn from_marker(marker: [u8; 2]) -> Option<Self> {
        match u16::from_be_bytes(marker) {
            TIFF_LITTLE_ENDIAN => Some(Endianness::LittleEndian),
            TIFF_BIG_ENDIAN => Some(Endianness::BigEndian),
            _ => None,
        }
    }

    /// The two marker bytes for this byte order.
    pub fn marker(&self) -> [u8; 2] {
        match self {
            Endianness::LittleEndian => *b"II",
            Endianness::BigEndian => *b"MM",
        }
    }
}

/// A byte buffer with a byte order and a cursor.
///
/// Reads at absolute offsets (`get_*`) leave the cursor alone; cursor-relative reads (`read_*`)
/// advance it. All reads are bounds checked against [`limit`][Self::limit] and fail with
/// [`MetadataError::EndOfFile`] rather than panicking.
///
/// Cloning is cheap: the underlying [`Bytes`] is reference counted.
#[derive(Debug, Clone)]
pub struct ByteBuffer {
    data: Bytes,
    endianness: Endianness,
    position: usize,
}

impl ByteBuffer {
    /// Wrap `data`, reading with the given byte order.
    pub fn new(data: Bytes, endianness: Endianness) -> Self {
        Self {
            data,
            endianness,
            position: 0,
        }
    }

    /// Total number of readable bytes.
    pub fn limit(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The current byte order.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Change the byte order used by subsequent reads.
    pub fn set_endianness(&mut self, endianness: Endianness) {
        self.endianness = endianness;
    }

    /// The cursor used by the `read_*` family.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Move the cursor.
    pub fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    /// A new buffer over `range` sharing the same storage. The cursor starts at zero.
    pub fn slice(&self, range: Range<usize>) -> MetadataResult<ByteBuffer> {
        self.check(range.start, range.end.saturating_sub(range.start))?;
        Ok(ByteBuffer::new(self.data.slice(range), self.endianness))
    }

    /// The underlying bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.data
    }

    fn check(&self, offset: usize, len: usize) -> MetadataResult<()> {
        match offset.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(()),
            _ => Err(MetadataError::EndOfFile(
                len,
                self.data.len().saturating_sub(offset),
            )),
        }
    }

    fn at(&self, offset: usize, len: usize) -> MetadataResult<&[u8]> {
        self.check(offset, len)?;
        Ok(&self.data[offset..offset + len])
    }

    /// Copy `len` bytes starting at `offset`.
    pub fn get_bytes(&self, offset: usize, len: usize) -> MetadataResult<Bytes> {
        self.check(offset, len)?;
        Ok(self.data.slice(offset..offset + len))
    }

    /// Whether the bytes at `offset` equal `expected`. Out-of-range comparisons are `false`.
    pub fn get_equals(&self, offset: usize, expected: &[u8]) -> bool {
        self.at(offset, expected.len())
            .map(|b| b == expected)
            .unwrap_or(false)
    }

    /// Decode up to `max_len` bytes at `offset` as text, stopping at the first NUL.
    ///
    /// Invalid UTF-8 is replaced, not rejected.
    pub fn get_string(&self, offset: usize, max_len: usize) -> MetadataResult<String> {
        let raw = self.at(offset, max_len)?;
        let len = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
        Ok(String::from_utf8_lossy(&raw[..len]).into_owned())
    }

    /// Read a u8 at `offset`.
    pub fn get_u8(&self, offset: usize) -> MetadataResult<u8> {
        Ok(self.at(offset, 1)?[0])
    }

    /// Read an i8 at `offset`.
    pub fn get_i8(&self, offset: usize) -> MetadataResult<i8> {
        Ok(self.at(offset, 1)?[0] as i8)
    }

    /// Read a u16 at `offset`.
    pub fn get_u16(&self, offset: usize) -> MetadataResult<u16> {
        let mut raw = self.at(offset, 2)?;
        match self.endianness {
            Endianness::LittleEndian => Ok(raw.read_u16::<LittleEndian>()?),
            Endianness::BigEndian => Ok(raw.read_u16::<BigEndian>()?),
        }
    }

    /// Read an i16 at `offset`.
    pub fn get_i16(&self, offset: usize) -> MetadataResult<i16> {
        let mut raw = self.at(offset, 2)?;
        match self.endianness {
            Endianness::LittleEndian => Ok(raw.read_i16::<LittleEndian>()?),
            Endianness::BigEndian => Ok(raw.read_i16::<BigEndian>()?),
        }
    }

    /// Read a u32 at `offset`.
    pub fn get_u32(&self, offset: usize) -> MetadataResult<u32> {
        let mut raw = self.at(offset, 4)?;
        match self.endianness {
            Endianness::LittleEndian => Ok(raw.read_u32::<LittleEndian>()?),
            Endianness::BigEndian => Ok(raw.read_u32::<BigEndian>()?),
        }
    }

    /// Read an i32 at `offset`.
    pub fn get_i32(&self, offset: usize) -> MetadataResult<i32> {
        let mut raw = self.at(offset, 4)?;
        match self.endianness {
            Endianness::LittleEndian => Ok(raw.read_i32::<LittleEndian>()?),
            Endianness::BigEndian => Ok(raw.read_i32::<BigEndian>()?),
        }
    }

    /// Read a u64 at `offset`.
    pub fn get_u64(&self, offset: usize) -> MetadataResult<u64> {
        let mut raw = self.at(offset, 8)?;
        match self.endianness {
            Endianness::LittleEndian => Ok(raw.read_u64::<LittleEndian>()?),
            Endianness::BigEndian => Ok(raw.read_u64::<BigEndian>()?),
        }
    }

    /// Read an i64 at `offset`.
    pub fn get_i64(&self, offset: usize) -> MetadataResult<i64> {
        let mut raw = self.at(offset, 8)?;
        match self.endianness {
            Endianness::LittleEndian => Ok(raw.read_i64::<LittleEndian>()?),
            Endianness::BigEndian => Ok(raw.read_i64::<BigEndian>()?),
        }
    }

    /// Read an f32 at `offset`.
    pub fn get_f32(&self, offset: usize) -> MetadataResult<f32> {
        let mut raw = self.at(offset, 4)?;
        match self.endianness {
            Endianness::LittleEndian => Ok(raw.read_f32::<LittleEndian>()?),
            Endianness::BigEndian => Ok(raw.read_f32::<BigEndian>()?),
        }
    }

    /// Read an f64 at `offset`.
    pub fn get_f64(&self, offset: usize) -> MetadataResult<f64> {
        let mut raw = self.at(offset, 8)?;
        match self.endianness {
            Endianness::LittleEndian => Ok(raw.read_f64::<LittleEndian>()?),
            Endianness::BigEndian => Ok(raw.read_f64::<BigEndian>()?),
        }
    }

    /// Read a u16 at the cursor and advance past it.
    pub fn read_u16(&mut self) -> MetadataResult<u16> {
        let v = self.get_u16(self.position)?;
        self.position += 2;
        Ok(v)
    }

    /// Read a u32 at the cursor and advance past it.
    pub fn read_u32(&mut self) -> MetadataResult<u32> {
        let v = self.get_u32(self.position)?;
        self.position += 4;
        Ok(v)
    }

    /// Skip `n` bytes.
    pub fn skip(&mut self, n: usize) {
        self.position = self.position.saturating_add(n);
    }

    /// Guess the byte order of the u16 at `offset` (typically a directory's entry count) and
    /// switch to it, returning the order that was in effect before.
    ///
    /// The guess is whichever order yields the smaller number.
    pub fn probe_endianness(&mut self, offset: usize) -> MetadataResult<Endianness> {
        let previous = self.endianness;
        let raw = self.at(offset, 2)?;
        let big = u16::from_be_bytes([raw[0], raw[1]]);
        let little = u16::from_le_bytes([raw[0], raw[1]]);
        self.endianness = if little > big {
            Endianness::BigEndian
        } else {
            Endianness::LittleEndian
        };
        Ok(previous)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    #[rustfmt::skip]
    fn test_typed_reads() {
        let raw = Bytes::from_static(&[0x01, 0x02, 0x03, 0x04, 0xFF, 0xFF, 0xFF, 0xFF]);
        let mut buf = ByteBuffer::new(raw, Endianness::LittleEndian);
        assert_eq!(buf.get_u16(0).unwrap(), 0x0201);
        assert_eq!(buf.get_u32(0).unwrap(), 0x04030201);
        assert_eq!(buf.get_i32(4).unwrap(), -1);
        buf.set_endianness(Endianness::BigEndian);
        assert_eq!(buf.get_u16(0).unwrap(), 0x0102);
        assert_eq!(buf.get_u32(0).unwrap(), 0x01020304);
        assert_eq!(buf.get_i16(6).unwrap(), -1);
    }

    #[test]
    fn test_cursor_reads() {
        let raw = Bytes::from_static(&[0x2A, 0x00, 0x08, 0x00, 0x00, 0x00]);
        let mut buf = ByteBuffer::new(raw, Endianness::LittleEndian);
        assert_eq!(buf.read_u16().unwrap(), 42);
        assert_eq!(buf.read_u32().unwrap(), 8);
        assert_eq!(buf.position(), 6);
        assert!(matches!(buf.read_u16(), Err(MetadataError::EndOfFile(2, 0))));
    }

    #[test]
    fn test_bounded_extraction() {
        let raw = Bytes::from_static(b"Acme\0zz");
        let buf = ByteBuffer::new(raw, Endianness::BigEndian);
        assert_eq!(buf.get_string(0, 7).unwrap(), "Acme");
        assert_eq!(buf.get_string(0, 2).unwrap(), "Ac");
        assert!(buf.get_equals(0, b"Acme"));
        assert!(!buf.get_equals(5, b"zzz"));
        assert!(buf.get_bytes(6, 2).is_err());
        assert_eq!(buf.slice(5..7).unwrap().get_string(0, 2).unwrap(), "zz");
    }

    #[test]
    fn test_markers() {
        assert_eq!(Endianness::from_marker(*b"II"), Some(Endianness::LittleEndian));
        assert_eq!(Endianness::from_marker(*b"MM"), Some(Endianness::BigEndian));
        assert_eq!(Endianness::from_marker(*b"MI"), None);
        assert_eq!(Endianness::BigEndian.marker(), *b"MM");
    }

    #[test]
    fn test_probe_endianness() {
        let raw = Bytes::from_static(&[0x00, 0x05, 0x07, 0x00]);
        let mut buf = ByteBuffer::new(raw, Endianness::LittleEndian);
        assert_eq!(buf.probe_endianness(0).unwrap(), Endianness::LittleEndian);
        assert_eq!(buf.endianness(), Endianness::BigEndian);
        assert_eq!(buf.probe_endianness(2).unwrap(), Endianness::BigEndian);
        assert_eq!(buf.endianness(), Endianness::LittleEndian);
    }
}
