//! Builds TIFF streams for the integration tests.
#![allow(dead_code)]

use std::io::Cursor;

use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

/// One entry of a test directory.
#[derive(Debug, Clone)]
pub enum Field {
    Short(u16, u16),
    Long(u16, u32),
    Ascii(u16, &'static str),
    Rational(u16, u32, u32),
    Undefined(u16, Vec<u8>),
    /// A LONG holding the offset of another directory of the same builder.
    Pointer(u16, usize),
    /// A LONG holding an arbitrary offset.
    RawOffset(u16, u32),
}

impl Field {
    fn tag(&self) -> u16 {
        match self {
            Field::Short(tag, _)
            | Field::Long(tag, _)
            | Field::Ascii(tag, _)
            | Field::Rational(tag, _, _)
            | Field::Undefined(tag, _)
            | Field::Pointer(tag, _)
            | Field::RawOffset(tag, _) => *tag,
        }
    }

    fn payload_len(&self) -> usize {
        match self {
            Field::Short(..) => 2,
            Field::Long(..) | Field::Pointer(..) | Field::RawOffset(..) => 4,
            Field::Ascii(_, s) => s.len() + 1,
            Field::Rational(..) => 8,
            Field::Undefined(_, bytes) => bytes.len(),
        }
    }
}

/// Lays out directories one after another, each followed by its out-of-line values.
#[derive(Debug, Clone)]
pub struct TiffBuilder {
    big_endian: bool,
    magic: u16,
    ifds: Vec<Vec<Field>>,
    next: Vec<Option<usize>>,
}

impl TiffBuilder {
    pub fn little_endian() -> Self {
        Self {
            big_endian: false,
            magic: 42,
            ifds: Vec::new(),
            next: Vec::new(),
        }
    }

    pub fn big_endian() -> Self {
        Self {
            big_endian: true,
            ..Self::little_endian()
        }
    }

    pub fn magic(mut self, magic: u16) -> Self {
        self.magic = magic;
        self
    }

    /// Append a directory. The first one is IFD0.
    pub fn ifd(mut self, fields: Vec<Field>) -> Self {
        self.ifds.push(fields);
        self.next.push(None);
        self
    }

    /// Make directory `to` follow `from` in the IFD chain.
    pub fn link(mut self, from: usize, to: usize) -> Self {
        self.next[from] = Some(to);
        self
    }

    fn u16(&self, out: &mut Vec<u8>, n: u16) {
        if self.big_endian {
            out.extend_from_slice(&n.to_be_bytes());
        } else {
            out.extend_from_slice(&n.to_le_bytes());
        }
    }

    fn u32(&self, out: &mut Vec<u8>, n: u32) {
        if self.big_endian {
            out.extend_from_slice(&n.to_be_bytes());
        } else {
            out.extend_from_slice(&n.to_le_bytes());
        }
    }

    fn offsets(&self) -> Vec<usize> {
        let mut offsets = Vec::new();
        let mut pos = 8;
        for fields in &self.ifds {
            offsets.push(pos);
            pos += 2 + 12 * fields.len() + 4;
            for field in fields {
                let len = field.payload_len();
                if len > 4 {
                    pos += len + (len & 1);
                }
            }
        }
        offsets
    }

    fn encode(&self, field: &Field, offsets: &[usize]) -> (u16, u32, Vec<u8>) {
        let mut bytes = Vec::new();
        let (field_type, count) = match field {
            Field::Short(_, n) => {
                self.u16(&mut bytes, *n);
                (3, 1)
            }
            Field::Long(_, n) | Field::RawOffset(_, n) => {
                self.u32(&mut bytes, *n);
                (4, 1)
            }
            Field::Pointer(_, ifd) => {
                self.u32(&mut bytes, offsets[*ifd] as u32);
                (4, 1)
            }
            Field::Ascii(_, s) => {
                bytes.extend_from_slice(s.as_bytes());
                bytes.push(0);
                (2, bytes.len() as u32)
            }
            Field::Rational(_, n, d) => {
                self.u32(&mut bytes, *n);
                self.u32(&mut bytes, *d);
                (5, 1)
            }
            Field::Undefined(_, data) => {
                bytes.extend_from_slice(data);
                (7, data.len() as u32)
            }
        };
        (field_type, count, bytes)
    }

    /// The TIFF stream, header included.
    pub fn build(&self) -> Vec<u8> {
        let offsets = self.offsets();
        let mut out = Vec::new();
        out.extend_from_slice(if self.big_endian { b"MM" } else { b"II" });
        self.u16(&mut out, self.magic);
        self.u32(&mut out, 8);

        for (index, fields) in self.ifds.iter().enumerate() {
            assert_eq!(out.len(), offsets[index]);
            let mut data_pos = offsets[index] + 2 + 12 * fields.len() + 4;
            let mut overflow = Vec::new();
            self.u16(&mut out, fields.len() as u16);
            for field in fields {
                let (field_type, count, mut bytes) = self.encode(field, &offsets);
                self.u16(&mut out, field.tag());
                self.u16(&mut out, field_type);
                self.u32(&mut out, count);
                if bytes.len() <= 4 {
                    bytes.resize(4, 0);
                    out.extend_from_slice(&bytes);
                } else {
                    self.u32(&mut out, data_pos as u32);
                    if bytes.len() & 1 == 1 {
                        bytes.push(0);
                    }
                    data_pos += bytes.len();
                    overflow.extend_from_slice(&bytes);
                }
            }
            let next = self.next[index].map_or(0, |to| offsets[to] as u32);
            self.u32(&mut out, next);
            out.extend_from_slice(&overflow);
        }
        out
    }

    /// The stream as an APP1 payload.
    pub fn build_exif(&self) -> Vec<u8> {
        let mut out = b"Exif\0\0".to_vec();
        out.extend(self.build());
        out
    }
}

/// Wrap an APP1 payload in a minimal JPEG.
pub fn jpeg_with_app1(payload: &[u8]) -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&[0xFF, 0xDA, 0, 2, 0xFF, 0xD9]);
    out
}

/// A small grayscale TIFF written by the `tiff` crate, with a few descriptive tags.
pub fn tiff_crate_image() -> Vec<u8> {
    let mut file = Cursor::new(Vec::new());
    let mut encoder = TiffEncoder::new(&mut file).unwrap();
    let mut image = encoder.new_image::<colortype::Gray8>(4, 2).unwrap();
    image.encoder().write_tag(Tag::Make, "Acme").unwrap();
    image.encoder().write_tag(Tag::Model, "Model 1").unwrap();
    image.encoder().write_tag(Tag::Artist, "Jo Doe").unwrap();
    image.encoder().write_tag(Tag::Orientation, 3u16).unwrap();
    image.write_data(&[0u8; 8]).unwrap();
    file.into_inner()
}
