//! Serializing a directory tree back into IFD bytes.
//!
//! The layout is planned before anything is written: every retained entry, every value's
//! encoded size and every child directory is known up front, so the output buffer is allocated
//! once at its final size. A directory's entry table comes first, followed by the values too big
//! to live inside their entries. Child directories are stacked backward from the end of the
//! parent's region.

use std::collections::HashSet;
use std::io::{Cursor, Seek, SeekFrom, Write};

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};

use crate::container::MetadataContainer;
use crate::directory::{DirectoryRegistry, MetadataDirectory};
use crate::error::{MetadataError, MetadataResult};
use crate::kind::DirectoryKind;
use crate::reader::Endianness;
use crate::tiff::tags::{exif, tiff, TagId, Type};
use crate::tiff::{
    TiffError, TiffResult, EXIF_HEADER_SIZE, EXIF_HEADER_START_SIZE, EXIF_SIGNATURE,
    IFD_ENTRY_SIZE, TIFF_HEADER_SIZE, TIFF_INLINE_VALUE_MAX_SIZE, TIFF_MAGIC_NUMBER,
};
use crate::value::{MetaType, MetadataValue, ValueData, EXIF_DATE_FORMAT};

/// Tags dropped on export: their values point into the source file.
pub const EXPORT_SKIP_TAGS: &[TagId] = &[
    exif::MAKER_NOTE,
    exif::INTEROPERABILITY_POINTER,
    exif::COLOR_SPACE,
    tiff::JPEG_INTERCHANGE_FORMAT,
    tiff::JPEG_INTERCHANGE_FORMAT_LENGTH,
    tiff::SUB_IFDS,
];

/// Size of an entry table holding `entries` entries.
pub fn ifd_size(entries: usize) -> usize {
    2 + entries * IFD_ENTRY_SIZE + 4
}

/// The directory a pointer tag in a `parent` directory leads to.
fn child_kind(parent: DirectoryKind, tag: TagId) -> Option<DirectoryKind> {
    match (parent, tag) {
        (DirectoryKind::Exif, tiff::EXIF_IFD_POINTER) => Some(DirectoryKind::SubExif),
        (DirectoryKind::Tiff | DirectoryKind::Dng, tiff::EXIF_IFD_POINTER) => {
            Some(DirectoryKind::Exif)
        }
        (_, tiff::GPS_IFD_POINTER) => Some(DirectoryKind::Gps),
        _ => None,
    }
}

/// How the output is framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Prefix the directories with `Exif\0\0` and a TIFF header, as an APP1 payload carries them.
    /// Stored offsets are then relative to the TIFF header.
    pub include_header: bool,
    /// Byte order of everything written.
    pub endianness: Endianness,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            include_header: true,
            endianness: Endianness::LittleEndian,
        }
    }
}

/// One entry of a planned directory.
#[derive(Debug)]
enum Slot {
    Value {
        tag: u16,
        field_type: Type,
        count: u32,
        bytes: Vec<u8>,
    },
    Pointer {
        tag: u16,
        /// `LONG`, or `IFD` when the source stored it that way.
        field_type: Type,
        child: Layout,
    },
}

/// A directory with everything needed to place it.
#[derive(Debug)]
struct Layout {
    slots: Vec<Slot>,
    /// Entry table plus big values.
    own_size: usize,
    /// `own_size` plus every descendant.
    total_size: usize,
}

/// Writes a container's directories as IFD bytes.
///
/// ```
/// use ifd_metadata::encoder::{DirectoryEncoder, EncodeOptions};
/// use ifd_metadata::{DirectoryKind, MetadataContainer, MetadataValue};
///
/// let container = MetadataContainer::new();
/// container.put_value(DirectoryKind::Exif, 0x0112, MetadataValue::ushort(6));
/// let bytes = DirectoryEncoder::new(&container, EncodeOptions::default())
///     .encode(DirectoryKind::Exif)
///     .unwrap();
/// assert_eq!(&bytes[..6], b"Exif\0\0");
/// assert_eq!(bytes.len(), 14 + 2 + 12 + 4);
/// ```
#[derive(Debug)]
pub struct DirectoryEncoder<'a> {
    container: &'a MetadataContainer,
    options: EncodeOptions,
}

impl<'a> DirectoryEncoder<'a> {
    /// An encoder over `container`.
    pub fn new(container: &'a MetadataContainer, options: EncodeOptions) -> Self {
        Self { container, options }
    }

    /// Number of bytes [`encode`](Self::encode) produces for `root`.
    pub fn encoded_size(&self, root: DirectoryKind) -> MetadataResult<usize> {
        Ok(self.plan_root(root)?.total_size + self.header_size())
    }

    /// Serialize `root` and the GPS, EXIF and Sub-EXIF directories its pointer tags lead to.
    ///
    /// Entries go out in ascending tag order and the next-directory offset is always zero.
    /// Pointers whose target directory is missing are dropped, as are the
    /// [skip-listed](EXPORT_SKIP_TAGS) tags. Each directory is written at most once.
    pub fn encode(&self, root: DirectoryKind) -> MetadataResult<Vec<u8>> {
        let layout = self.plan_root(root)?;
        let start = self.header_size();
        let total = start + layout.total_size;
        let mut writer = IfdWriter {
            cursor: Cursor::new(vec![0; total]),
            endianness: self.options.endianness,
            adjust: if self.options.include_header {
                EXIF_HEADER_START_SIZE
            } else {
                0
            },
        };

        if self.options.include_header {
            writer.write_header()?;
        }
        writer.place(&layout, start, total)?;
        Ok(writer.cursor.into_inner())
    }

    fn header_size(&self) -> usize {
        if self.options.include_header {
            EXIF_HEADER_SIZE
        } else {
            0
        }
    }

    fn plan_root(&self, root: DirectoryKind) -> MetadataResult<Layout> {
        let dir = self
            .container
            .directory(root)
            .ok_or_else(|| MetadataError::General(format!("no {root} directory to encode")))?;
        let mut claimed = HashSet::from([root]);
        self.plan(&dir, &mut claimed)
    }

    /// Decide the entries of `dir`, recursing depth first, in tag order, into each child. The
    /// first pointer to reach a directory claims it; later pointers to it are dropped.
    fn plan(
        &self,
        dir: &MetadataDirectory,
        claimed: &mut HashSet<DirectoryKind>,
    ) -> MetadataResult<Layout> {
        let mut slots = Vec::new();
        let mut big_size = 0;
        let mut children_size = 0;

        for (tag, value) in dir.entries() {
            if EXPORT_SKIP_TAGS.contains(&tag) {
                continue;
            }
            let Ok(wire_tag) = u16::try_from(tag) else {
                // synthetic sub-field
                continue;
            };

            if let Some(kind) = child_kind(dir.kind(), tag) {
                let child_dir = self.container.directory(kind);
                match child_dir {
                    Some(child_dir) if claimed.insert(kind) => {
                        let child = self.plan(&child_dir, claimed)?;
                        children_size += child.total_size;
                        let field_type = match value.meta_type() {
                            MetaType::Ifd => Type::IFD,
                            _ => Type::LONG,
                        };
                        slots.push(Slot::Pointer {
                            tag: wire_tag,
                            field_type,
                            child,
                        });
                    }
                    _ => log::debug!("dropping {} pointer {tag:#06x}", dir.kind()),
                }
                continue;
            }

            let (field_type, count, bytes) = encode_value(&value, self.options.endianness)?;
            let padded = bytes.len() + (bytes.len() & 1);
            if padded > TIFF_INLINE_VALUE_MAX_SIZE {
                big_size += padded;
            }
            slots.push(Slot::Value {
                tag: wire_tag,
                field_type,
                count,
                bytes,
            });
        }

        let own_size = ifd_size(slots.len()) + big_size;
        Ok(Layout {
            slots,
            own_size,
            total_size: own_size + children_size,
        })
    }
}

/// The wire type, count and raw bytes of `value`.
fn encode_value(
    value: &MetadataValue,
    endianness: Endianness,
) -> MetadataResult<(Type, u32, Vec<u8>)> {
    let field_type = value.meta_type().field_type().ok_or_else(|| {
        MetadataError::Internal(format!("no wire form for {:?}", value.meta_type()))
    })?;
    let bytes = match endianness {
        Endianness::LittleEndian => value_bytes::<LittleEndian>(value.data())?,
        Endianness::BigEndian => value_bytes::<BigEndian>(value.data())?,
    };
    let count = match value.data() {
        ValueData::String(_) | ValueData::Date(_) | ValueData::Undefined(_) => bytes.len(),
        _ => value.count(),
    };
    let count = u32::try_from(count).map_err(TiffError::from)?;
    Ok((field_type, count, bytes))
}

fn value_bytes<B: ByteOrder>(data: &ValueData) -> TiffResult<Vec<u8>> {
    let mut out = Vec::new();
    match data {
        ValueData::Float(v) => v.iter().try_for_each(|n| out.write_f32::<B>(*n))?,
        ValueData::Double(v) => v.iter().try_for_each(|n| out.write_f64::<B>(*n))?,
        ValueData::SByte(v) => v.iter().try_for_each(|n| out.write_i8(*n))?,
        ValueData::UByte(v) => out.extend_from_slice(v),
        ValueData::SShort(v) => v.iter().try_for_each(|n| out.write_i16::<B>(*n))?,
        ValueData::UShort(v) => v.iter().try_for_each(|n| out.write_u16::<B>(*n))?,
        ValueData::SLong(v) => v.iter().try_for_each(|n| out.write_i32::<B>(*n))?,
        ValueData::ULong(v) | ValueData::Ifd(v) => {
            v.iter().try_for_each(|n| out.write_u32::<B>(*n))?
        }
        ValueData::SLong8(v) => v.iter().try_for_each(|n| out.write_i64::<B>(*n))?,
        ValueData::ULong8(v) | ValueData::Ifd64(v) => {
            v.iter().try_for_each(|n| out.write_u64::<B>(*n))?
        }
        ValueData::SRational(v) => v.iter().try_for_each(|r| {
            out.write_i32::<B>(r.numerator)?;
            out.write_i32::<B>(r.denominator)
        })?,
        ValueData::URational(v) => v.iter().try_for_each(|r| {
            out.write_u32::<B>(r.numerator)?;
            out.write_u32::<B>(r.denominator)
        })?,
        ValueData::String(v) => {
            for s in v {
                out.extend_from_slice(s.as_bytes());
                out.push(0);
            }
        }
        ValueData::Date(d) => {
            out.extend_from_slice(d.format(EXIF_DATE_FORMAT).to_string().as_bytes());
            out.push(0);
        }
        ValueData::Undefined(b) => out.extend_from_slice(b),
    }
    Ok(out)
}

/// Output buffer plus the byte order and offset correction of the stream being written.
struct IfdWriter {
    cursor: Cursor<Vec<u8>>,
    endianness: Endianness,
    /// Subtracted from buffer positions to get stored offsets.
    adjust: usize,
}

impl IfdWriter {
    fn write_u16(&mut self, n: u16) -> TiffResult<()> {
        match self.endianness {
            Endianness::LittleEndian => self.cursor.write_u16::<LittleEndian>(n)?,
            Endianness::BigEndian => self.cursor.write_u16::<BigEndian>(n)?,
        }
        Ok(())
    }

    fn write_u32(&mut self, n: u32) -> TiffResult<()> {
        match self.endianness {
            Endianness::LittleEndian => self.cursor.write_u32::<LittleEndian>(n)?,
            Endianness::BigEndian => self.cursor.write_u32::<BigEndian>(n)?,
        }
        Ok(())
    }

    fn seek(&mut self, position: usize) -> TiffResult<()> {
        self.cursor.seek(SeekFrom::Start(position as u64))?;
        Ok(())
    }

    /// A buffer position as stored in the stream.
    fn offset(&self, position: usize) -> TiffResult<u32> {
        Ok(u32::try_from(position - self.adjust)?)
    }

    fn write_header(&mut self) -> TiffResult<()> {
        self.seek(0)?;
        self.cursor.write_all(EXIF_SIGNATURE)?;
        self.cursor.write_all(&self.endianness.marker())?;
        self.write_u16(TIFF_MAGIC_NUMBER)?;
        self.write_u32(u32::try_from(TIFF_HEADER_SIZE)?)?;
        Ok(())
    }

    /// Write `layout` into `start..end`: the entry table and big values from `start`, the
    /// children from `end` backward.
    fn place(&mut self, layout: &Layout, start: usize, end: usize) -> MetadataResult<()> {
        let mut big_cursor = start + ifd_size(layout.slots.len());
        let mut pointers: Vec<(usize, &Layout)> = Vec::new();

        self.seek(start)?;
        let count = u16::try_from(layout.slots.len()).map_err(TiffError::from)?;
        self.write_u16(count)?;
        for (index, slot) in layout.slots.iter().enumerate() {
            let entry = start + 2 + index * IFD_ENTRY_SIZE;
            self.seek(entry)?;
            match slot {
                Slot::Pointer {
                    tag,
                    field_type,
                    child,
                } => {
                    self.write_u16(*tag)?;
                    self.write_u16((*field_type).into())?;
                    self.write_u32(1)?;
                    // patched once the child's position is known
                    self.write_u32(0)?;
                    pointers.push((entry + 8, child));
                }
                Slot::Value {
                    tag,
                    field_type,
                    count,
                    bytes,
                } => {
                    self.write_u16(*tag)?;
                    self.write_u16((*field_type).into())?;
                    self.write_u32(*count)?;
                    let padded = bytes.len() + (bytes.len() & 1);
                    if padded <= TIFF_INLINE_VALUE_MAX_SIZE {
                        self.cursor.write_all(bytes)?;
                    } else {
                        let offset = self.offset(big_cursor)?;
                        self.write_u32(offset)?;
                        self.seek(big_cursor)?;
                        self.cursor.write_all(bytes)?;
                        big_cursor += padded;
                    }
                }
            }
        }
        self.seek(start + 2 + layout.slots.len() * IFD_ENTRY_SIZE)?;
        self.write_u32(0)?;

        let mut child_end = end;
        for (pointer, child) in pointers {
            let child_start = child_end - child.total_size;
            let offset = self.offset(child_start)?;
            self.seek(pointer)?;
            self.write_u32(offset)?;
            self.place(child, child_start, child_end)?;
            child_end = child_start;
        }

        if big_cursor != start + layout.own_size || child_end != big_cursor {
            return Err(MetadataError::Internal(format!(
                "directory layout mismatch: values end at {big_cursor}, children start at {child_end}"
            )));
        }
        Ok(())
    }
}

/// Convenience wrapper around [`DirectoryEncoder`].
impl MetadataContainer {
    /// Serialize the `root` directory tree. See [`DirectoryEncoder::encode`].
    pub fn encode(&self, root: DirectoryKind, options: EncodeOptions) -> MetadataResult<Vec<u8>> {
        DirectoryEncoder::new(self, options).encode(root)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tiff::tags::gps;
    use bytes::Bytes;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn sample() -> MetadataContainer {
        let c = MetadataContainer::new();
        c.put_value(DirectoryKind::Exif, tiff::ORIENTATION, MetadataValue::ushort(6));
        c.put_value(DirectoryKind::Exif, tiff::X_RESOLUTION, MetadataValue::urational(72, 1));
        c.put_value(DirectoryKind::Exif, tiff::MAKE, MetadataValue::string("Canon"));
        c
    }

    #[test]
    #[rustfmt::skip]
    fn test_encode_with_header() {
        let out = sample().encode(DirectoryKind::Exif, EncodeOptions::default()).unwrap();
        let expected: &[u8] = &[
            b'E', b'x', b'i', b'f', 0, 0,
            b'I', b'I', 42, 0, 8, 0, 0, 0,
            // IFD at 14
            3, 0,
            0x0F, 0x01, 2, 0, 6, 0, 0, 0, 50, 0, 0, 0,
            0x12, 0x01, 3, 0, 1, 0, 0, 0, 6, 0, 0, 0,
            0x1A, 0x01, 5, 0, 1, 0, 0, 0, 56, 0, 0, 0,
            0, 0, 0, 0,
            // big values at 56
            b'C', b'a', b'n', b'o', b'n', 0,
            72, 0, 0, 0, 1, 0, 0, 0,
        ];
        assert_eq!(out, expected);
        let container = sample();
        let encoder = DirectoryEncoder::new(&container, EncodeOptions::default());
        assert_eq!(encoder.encoded_size(DirectoryKind::Exif).unwrap(), expected.len());
    }

    #[test]
    #[rustfmt::skip]
    fn test_child_placed_at_end() {
        let c = MetadataContainer::new();
        c.put_value(DirectoryKind::Exif, tiff::GPS_IFD_POINTER, MetadataValue::ulong(0));
        c.put_value(DirectoryKind::Gps, gps::ALTITUDE_REF, MetadataValue::ushort(1));
        let options = EncodeOptions {
            include_header: false,
            endianness: Endianness::BigEndian,
        };
        let out = c.encode(DirectoryKind::Exif, options).unwrap();
        let expected: &[u8] = &[
            0, 1,
            0x88, 0x25, 0, 4, 0, 0, 0, 1, 0, 0, 0, 18,
            0, 0, 0, 0,
            // GPS at 18
            0, 1,
            0x00, 0x05, 0, 3, 0, 0, 0, 1, 0, 1, 0, 0,
            0, 0, 0, 0,
        ];
        assert_eq!(out, expected);
    }

    #[test]
    fn test_ifd_typed_pointer_kept() {
        let c = MetadataContainer::new();
        let pointer = MetadataValue::new(ValueData::Ifd(vec![0])).unwrap();
        c.put_value(DirectoryKind::Exif, tiff::GPS_IFD_POINTER, pointer);
        c.put_value(DirectoryKind::Gps, gps::ALTITUDE_REF, MetadataValue::ushort(1));
        let options = EncodeOptions {
            include_header: true,
            endianness: Endianness::BigEndian,
        };
        let out = c.encode(DirectoryKind::Exif, options).unwrap();
        // the entry after the header and the entry count; GPS follows at 8 + 18
        assert_eq!(&out[16..28], &[0x88, 0x25, 0, 13, 0, 0, 0, 1, 0, 0, 0, 26]);

        let back = MetadataContainer::new();
        crate::metadata::IfdReader::try_open(Bytes::from(out.clone()), EXIF_HEADER_START_SIZE, &[42])
            .unwrap()
            .read_into(DirectoryKind::Exif, &back, &Default::default())
            .unwrap();
        let pointer = back.get_value(DirectoryKind::Exif, tiff::GPS_IFD_POINTER).unwrap();
        assert_eq!(pointer.meta_type(), MetaType::Ifd);
        assert_eq!(back.encode(DirectoryKind::Exif, options).unwrap(), out);
    }

    #[test]
    fn test_skip_list_and_dangling_pointers() {
        let c = sample();
        let notes = MetadataValue::undefined(vec![0u8; 40]).unwrap();
        c.put_value(DirectoryKind::Exif, exif::MAKER_NOTE, notes);
        c.put_value(DirectoryKind::Exif, exif::COLOR_SPACE, MetadataValue::ushort(1));
        c.put_value(DirectoryKind::Exif, tiff::JPEG_INTERCHANGE_FORMAT, MetadataValue::ulong(9));
        // no Sub-EXIF directory to point at
        c.put_value(DirectoryKind::Exif, tiff::EXIF_IFD_POINTER, MetadataValue::ulong(0));
        let out = c.encode(DirectoryKind::Exif, EncodeOptions::default()).unwrap();
        assert_eq!(out, sample().encode(DirectoryKind::Exif, EncodeOptions::default()).unwrap());
    }

    #[test]
    fn test_directory_written_once() {
        let c = MetadataContainer::new();
        c.put_value(DirectoryKind::Tiff, tiff::EXIF_IFD_POINTER, MetadataValue::ulong(0));
        c.put_value(DirectoryKind::Tiff, tiff::GPS_IFD_POINTER, MetadataValue::ulong(0));
        c.put_value(DirectoryKind::Exif, tiff::GPS_IFD_POINTER, MetadataValue::ulong(0));
        c.put_value(DirectoryKind::Gps, gps::ALTITUDE_REF, MetadataValue::ushort(0));
        let options = EncodeOptions {
            include_header: false,
            ..Default::default()
        };
        let out = c.encode(DirectoryKind::Tiff, options).unwrap();
        // Tiff holds only the EXIF pointer; EXIF claims GPS.
        assert_eq!(out.len(), 3 * ifd_size(1));
        assert_eq!(&out[..2], &[1, 0]);
    }

    #[test]
    fn test_reads_back() {
        let c = sample();
        let date = NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(7, 8, 9)
            .unwrap();
        c.put_value(DirectoryKind::Exif, tiff::DATE_TIME, MetadataValue::date(date));
        c.put_value(DirectoryKind::Exif, tiff::GPS_IFD_POINTER, MetadataValue::ulong(0));
        c.put_value(DirectoryKind::Gps, gps::ALTITUDE, MetadataValue::urational(1234, 10));
        let options = EncodeOptions {
            include_header: true,
            endianness: Endianness::BigEndian,
        };
        let out = Bytes::from(c.encode(DirectoryKind::Exif, options).unwrap());

        let back = MetadataContainer::new();
        crate::metadata::IfdReader::try_open(out.clone(), EXIF_HEADER_START_SIZE, &[42])
            .unwrap()
            .read_into(DirectoryKind::Exif, &back, &Default::default())
            .unwrap();
        assert_eq!(back.camera_make().as_deref(), Some("Canon"));
        assert_eq!(back.get_value(DirectoryKind::Exif, tiff::DATE_TIME).unwrap().as_date(), Some(date));
        assert_eq!(
            back.get_value(DirectoryKind::Gps, gps::ALTITUDE).unwrap().as_f64(),
            Some(123.4)
        );
        assert_eq!(back.encode(DirectoryKind::Exif, options).unwrap(), out.to_vec());
    }

    #[test]
    fn test_missing_root() {
        let c = MetadataContainer::new();
        assert!(matches!(
            c.encode(DirectoryKind::Tiff, EncodeOptions::default()),
            Err(MetadataError::General(_))
        ));
    }
}
