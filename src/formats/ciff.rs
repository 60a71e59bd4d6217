//! Canon's CIFF heap format (CRW files) and its conversion to TIFF and EXIF tags.
//!
//! A CIFF file is a tree of heaps. Each heap ends with the offset of its entry table; entries
//! hold a value inline, point at a value within the heap, or point at a nested heap.

use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use chrono::DateTime;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::apex;
use crate::capability::{auto_rotate_orientation, split_make_model, ImageOrientation};
use crate::container::MetadataContainer;
use crate::directory::MetadataDirectory;
use crate::error::{MetadataError, MetadataResult};
use crate::export::ExportTarget;
use crate::kind::DirectoryKind;
use crate::metadata::ParseOptions;
use crate::reader::{ByteBuffer, Endianness};
use crate::tiff::tags::{ciff, exif, tiff, TagId};
use crate::tiff::TiffFormatError;
use crate::value::{MetadataValue, ValueData};

/// Signature following the header length.
pub const CIFF_SIGNATURE: &[u8; 8] = b"HEAPCCDR";

const CIFF_SIGNATURE_OFFSET: usize = 6;
const CIFF_HEADER_SIZE: usize = CIFF_SIGNATURE_OFFSET + CIFF_SIGNATURE.len();
const CIFF_ENTRY_SIZE: usize = 10;

const TAG_ID_MASK: u16 = 0x3FFF;
const DATA_TYPE_MASK: u16 = 0x3800;
const DATA_IN_ENTRY: u16 = 0x4000;

/// The data type bits of a CIFF tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum CiffDataType {
    /// Unsigned bytes
    UByte = 0x0000,
    /// NUL-terminated text
    Ascii = 0x0800,
    /// Unsigned 16-bit integers
    UShort = 0x1000,
    /// Unsigned 32-bit integers
    ULong = 0x1800,
    /// Opaque structure
    Mixed = 0x2000,
    /// Nested heap
    Heap1 = 0x2800,
    /// Nested heap
    Heap2 = 0x3000,
}

impl CiffDataType {
    fn element_size(&self) -> Option<usize> {
        match self {
            CiffDataType::UByte | CiffDataType::Ascii | CiffDataType::Mixed => Some(1),
            CiffDataType::UShort => Some(2),
            CiffDataType::ULong => Some(4),
            CiffDataType::Heap1 | CiffDataType::Heap2 => None,
        }
    }
}

/// Read a CIFF file into a container holding a single [`DirectoryKind::Ciff`] directory.
pub fn read_ciff(data: Bytes, options: &ParseOptions) -> MetadataResult<MetadataContainer> {
    if data.len() < CIFF_HEADER_SIZE {
        return Err(TiffFormatError::TruncatedHeader {
            required_bytes: CIFF_HEADER_SIZE,
            actual_bytes: data.len(),
        }
        .into());
    }
    let marker = [data[0], data[1]];
    let endianness = Endianness::from_marker(marker).ok_or(
        TiffFormatError::ByteOrderMarkerInvalid(u16::from_be_bytes(marker)),
    )?;
    let buf = ByteBuffer::new(data, endianness);
    if !buf.get_equals(CIFF_SIGNATURE_OFFSET, CIFF_SIGNATURE) {
        return Err(TiffFormatError::CiffSignatureNotFound.into());
    }

    let container = MetadataContainer::new();
    let root = buf.get_u32(2)? as usize;
    let root_len = buf.limit().saturating_sub(root);
    let mut walker = HeapWalker {
        buf,
        options,
        dir: container.get_or_create(DirectoryKind::Ciff),
        visited: HashSet::new(),
        depth: 0,
    };
    walker.read_heap(root, root_len)?;
    Ok(container)
}

struct HeapWalker<'a> {
    buf: ByteBuffer,
    options: &'a ParseOptions,
    dir: Arc<MetadataDirectory>,
    /// Entry tables already read.
    visited: HashSet<usize>,
    /// Heaps currently open.
    depth: usize,
}

impl HeapWalker<'_> {
    fn report(&self, message: impl AsRef<str>) {
        self.options.sink.report(message.as_ref());
    }

    fn read_heap(&mut self, block: usize, len: usize) -> MetadataResult<()> {
        if len < 4 {
            return Err(MetadataError::General(format!("CIFF heap at {block} is too short")));
        }
        if self.depth >= self.options.max_depth {
            self.report(format!(
                "CIFF heap at {block} is nested more than {} deep, skipping",
                self.options.max_depth
            ));
            return Ok(());
        }
        let table = block + self.buf.get_u32(block + len - 4)? as usize;
        if !self.visited.insert(table) {
            self.report(format!("CIFF entry table at {table} referenced twice"));
            return Ok(());
        }
        self.depth += 1;
        let result = self.read_entries(block, table);
        self.depth -= 1;
        result
    }

    fn read_entries(&mut self, block: usize, table: usize) -> MetadataResult<()> {

        let mut count = self.buf.get_u16(table)? as usize;
        log::trace!("CIFF heap at {block}: {count} entries at {table}");
        if count > self.options.max_entry_count {
            self.report(format!(
                "CIFF heap at {block} claims {count} entries, reading {}",
                self.options.max_entry_count
            ));
            count = self.options.max_entry_count;
        }

        for index in 0..count {
            if self.options.stop.is_stopped() {
                break;
            }
            let pos = table + 2 + index * CIFF_ENTRY_SIZE;
            if let Err(e) = self.read_entry(block, pos) {
                self.report(format!("CIFF entry at {pos}: {e}"));
            }
        }
        Ok(())
    }

    fn read_entry(&mut self, block: usize, pos: usize) -> MetadataResult<()> {
        let bits = self.buf.get_u16(pos)?;
        if bits == 0 {
            return Err(MetadataError::General("empty tag".into()));
        }
        let mut len = self.buf.get_u32(pos + 2)? as usize;
        let mut offset = self.buf.get_u32(pos + 6)? as usize;
        let id = (bits & TAG_ID_MASK) as TagId;
        let data_type = CiffDataType::try_from(bits & DATA_TYPE_MASK)
            .map_err(|e| MetadataError::General(format!("data type {:#06x}", e.number)))?;

        if bits & DATA_IN_ENTRY != 0 {
            len = 8;
            offset = pos + 2;
        } else {
            offset += block;
            if id == ciff::JPG_FROM_RAW {
                self.dir.put(ciff::PREVIEW_IMAGE_OFFSET, ulong(offset)?);
                self.dir.put(ciff::PREVIEW_IMAGE_LENGTH, ulong(len)?);
                return Ok(());
            }
            if matches!(data_type, CiffDataType::Heap1 | CiffDataType::Heap2) {
                return self.read_heap(offset, len);
            }
        }
        if data_type == CiffDataType::Mixed {
            return Ok(());
        }

        if len > self.options.max_value_size {
            return Err(MetadataError::General(format!(
                "value of {id:#06x} is {len} bytes"
            )));
        }
        if let Some(value) = self.read_value(id, data_type, offset, len)? {
            self.put(id, value);
        }
        Ok(())
    }

    fn read_value(
        &self,
        id: TagId,
        data_type: CiffDataType,
        offset: usize,
        len: usize,
    ) -> MetadataResult<Option<MetadataValue>> {
        if id == ciff::CAPTURED_TIME {
            let mut seconds = self.buf.get_u32(offset)? as i64;
            let tz_offset = self.buf.get_i32(offset + 4)?;
            let tz_info = self.buf.get_u32(offset + 8)?;
            if tz_info & 0x8000_0000 != 0 {
                seconds += tz_offset as i64;
            }
            let date = DateTime::from_timestamp(seconds, 0)
                .ok_or_else(|| MetadataError::General(format!("timestamp {seconds}")))?;
            return Ok(Some(MetadataValue::date(date.naive_utc())));
        }

        let size = data_type
            .element_size()
            .ok_or_else(|| MetadataError::General(format!("inline {data_type:?} value")))?;
        let count = len / size;
        if count == 0 {
            return Ok(None);
        }
        let data = match data_type {
            CiffDataType::Ascii => {
                let text = if id == ciff::MAKE_MODEL {
                    // make and model, separated and terminated by NUL
                    let raw = self.buf.get_bytes(offset, len)?;
                    let end = raw.iter().rposition(|b| *b == 0).unwrap_or(0);
                    String::from_utf8_lossy(&raw[..end]).into_owned()
                } else {
                    self.buf.get_string(offset, len)?
                };
                if text.is_empty() {
                    return Ok(None);
                }
                ValueData::String(vec![text])
            }
            CiffDataType::UByte => ValueData::UByte(self.buf.get_bytes(offset, count)?.to_vec()),
            CiffDataType::UShort => ValueData::UShort(
                (0..count)
                    .map(|i| self.buf.get_u16(offset + i * 2))
                    .collect::<MetadataResult<_>>()?,
            ),
            CiffDataType::ULong => ValueData::ULong(
                (0..count)
                    .map(|i| self.buf.get_u32(offset + i * 4))
                    .collect::<MetadataResult<_>>()?,
            ),
            CiffDataType::Mixed | CiffDataType::Heap1 | CiffDataType::Heap2 => return Ok(None),
        };
        Ok(Some(MetadataValue::new(data)?))
    }

    /// Store a value, splitting packed records into their fields.
    fn put(&self, id: TagId, value: MetadataValue) {
        match id {
            ciff::CAMERA_SETTINGS | ciff::CUSTOM_FUNCTIONS | ciff::SHOT_INFO | ciff::SENSOR_INFO => {
                self.dir.explode(id, 1, value, false)
            }
            ciff::FOCAL_LENGTH | ciff::PICTURE_INFO => self.dir.explode(id, 1, value, true),
            ciff::IMAGE_INFO => self.dir.explode(id, 0, value, false),
            _ => {
                self.dir.put(id, value);
            }
        }
        // A zero ISO means the other record has it.
        for iso in [ciff::CS_ISO, ciff::SI_ISO] {
            if self.dir.get_local(iso).and_then(|v| v.as_i64()) == Some(0) {
                self.dir.remove_local(iso);
            }
        }
    }
}

fn ulong(n: usize) -> MetadataResult<MetadataValue> {
    u32::try_from(n)
        .map(MetadataValue::ulong)
        .map_err(|_| MetadataError::General(format!("{n} exceeds 32 bits")))
}

fn integer(n: i64) -> Option<MetadataValue> {
    match (u16::try_from(n), u32::try_from(n)) {
        (Ok(n), _) => Some(MetadataValue::ushort(n)),
        (_, Ok(n)) => Some(MetadataValue::ulong(n)),
        _ => None,
    }
}

/// Map a CIFF directory onto the TIFF and EXIF tags of the same meaning.
///
/// For a JPEG target the TIFF tags go into the EXIF directory, which is where JPEG files keep
/// them. The TIFF-side directory always gets a zero EXIF pointer.
pub fn convert(ciff_dir: &MetadataDirectory, target: ExportTarget) -> MetadataContainer {
    let metadata = MetadataContainer::new();
    let exif_dir = metadata.get_or_create(DirectoryKind::Exif);
    let tiff_dir = match target {
        ExportTarget::Jpeg => exif_dir.clone(),
        ExportTarget::Tiff => metadata.get_or_create(DirectoryKind::Tiff),
    };
    tiff_dir.put(tiff::EXIF_IFD_POINTER, MetadataValue::ulong(0));

    let int = |tag: TagId| ciff_dir.get_local(tag).and_then(|v| v.as_i64());
    let orientation = |o: ImageOrientation| o.tiff_value().map(MetadataValue::ushort);

    // TIFF. Later mappings of the same tag win.
    put_some(
        &tiff_dir,
        tiff::BITS_PER_SAMPLE,
        int(ciff::II_COMPONENT_BIT_DEPTH)
            .and_then(|n| MetadataValue::new(ValueData::UShort(vec![n as u16; 3])).ok()),
    );
    put_some(&tiff_dir, tiff::IMAGE_LENGTH, int(ciff::II_IMAGE_HEIGHT).and_then(integer));
    put_some(&tiff_dir, tiff::IMAGE_WIDTH, int(ciff::II_IMAGE_WIDTH).and_then(integer));
    put_some(
        &tiff_dir,
        tiff::ORIENTATION,
        int(ciff::II_ROTATION).and_then(|n| orientation(ImageOrientation::from_degrees(n))),
    );
    for (from, to) in [
        (ciff::IMAGE_DESCRIPTION, tiff::IMAGE_DESCRIPTION),
        (ciff::OWNER_NAME, tiff::ARTIST),
    ] {
        if let Some(value) = ciff_dir.get_local(from) {
            tiff_dir.put(to, MetadataValue::clone(&value));
        }
    }
    put_some(&tiff_dir, tiff::IMAGE_LENGTH, int(ciff::PI_IMAGE_HEIGHT).and_then(integer));
    put_some(&tiff_dir, tiff::IMAGE_WIDTH, int(ciff::PI_IMAGE_WIDTH).and_then(integer));
    put_some(
        &tiff_dir,
        tiff::ORIENTATION,
        int(ciff::SI_AUTO_ROTATE).and_then(|n| orientation(auto_rotate_orientation(n))),
    );

    if let Some(make_model) = ciff_dir.get_local(ciff::MAKE_MODEL).and_then(|v| v.as_string()) {
        let (make, model) = split_make_model(&make_model);
        if !make.is_empty() {
            tiff_dir.put(tiff::MAKE, MetadataValue::string(make));
        }
        if !model.is_empty() {
            tiff_dir.put(tiff::MODEL, MetadataValue::string(model));
        }
    }

    // EXIF
    if let Some(value) = ciff_dir.get_local(ciff::CAPTURED_TIME) {
        exif_dir.put(exif::DATE_TIME_ORIGINAL, MetadataValue::clone(&value));
    }
    put_some(
        &exif_dir,
        exif::COLOR_SPACE,
        int(ciff::COLOR_SPACE).map(|n| MetadataValue::ushort(n as u16)),
    );
    put_some(
        &exif_dir,
        exif::CONTRAST,
        int(ciff::CS_CONTRAST).and_then(|n| match n {
            -1 => Some(MetadataValue::ushort(exif::CONTRAST_LOW)),
            0 => Some(MetadataValue::ushort(0)),
            1 => Some(MetadataValue::ushort(exif::CONTRAST_HARD)),
            _ => None,
        }),
    );
    put_some(
        &exif_dir,
        exif::EXPOSURE_PROGRAM,
        int(ciff::CS_EXPOSURE_MODE).and_then(|n| match n {
            1 => Some(MetadataValue::ushort(exif::EXPOSURE_PROGRAM_NORMAL)),
            2 => Some(MetadataValue::ushort(exif::EXPOSURE_PROGRAM_SHUTTER_PRIORITY)),
            4 => Some(MetadataValue::ushort(exif::EXPOSURE_PROGRAM_MANUAL)),
            5 => Some(MetadataValue::ushort(exif::EXPOSURE_PROGRAM_ACTION)),
            _ => None,
        }),
    );
    put_some(&exif_dir, exif::FLASH, int(ciff::CS_FLASH_MODE).and_then(flash_mode));
    for tag in [ciff::CS_ISO, ciff::SI_ISO] {
        put_some(
            &exif_dir,
            exif::ISO_SPEED_RATINGS,
            int(tag).filter(|apex| *apex != 0).map(|apex| {
                let iso = apex::iso_from_apex(apex as i32);
                MetadataValue::ushort(u16::try_from(iso).unwrap_or(u16::MAX))
            }),
        );
    }
    put_some(
        &exif_dir,
        exif::METERING_MODE,
        int(ciff::CS_METERING_MODE).and_then(|n| match n {
            4 => Some(MetadataValue::ushort(exif::METERING_MODE_PARTIAL)),
            5 => Some(MetadataValue::ushort(exif::METERING_MODE_CENTER_WEIGHTED_AVERAGE)),
            _ => None,
        }),
    );
    for (from, to) in [
        (ciff::CS_SATURATION, exif::SATURATION),
        (ciff::CS_SHARPNESS, exif::SHARPNESS),
    ] {
        put_some(
            &exif_dir,
            to,
            int(from).map(|n| {
                MetadataValue::ushort(match n {
                    -1 => exif::SHARPNESS_SOFT,
                    1 => exif::SHARPNESS_HARD,
                    n => n as u16,
                })
            }),
        );
    }
    for (from, to) in [
        (ciff::FL_FOCAL_LENGTH, exif::FOCAL_LENGTH),
        (ciff::FL_FOCAL_PLANE_X_SIZE, exif::FOCAL_PLANE_X_RESOLUTION),
        (ciff::FL_FOCAL_PLANE_Y_SIZE, exif::FOCAL_PLANE_Y_RESOLUTION),
    ] {
        put_some(&exif_dir, to, int(from).map(|n| MetadataValue::urational(n as u32, 1)));
    }
    put_some(
        &exif_dir,
        exif::FNUMBER,
        int(ciff::SI_FNUMBER).map(|apex| {
            let fstop = apex::fstop_from_apex(apex as i32);
            MetadataValue::urational((fstop * 10.0) as u32, 10)
        }),
    );
    put_some(
        &exif_dir,
        exif::EXPOSURE_TIME,
        int(ciff::SI_SHUTTER_SPEED).map(|apex| {
            let (n, d) = apex::shutter_speed_from_apex(apex as i32);
            let seconds = n as f64 / d as f64;
            MetadataValue::urational((seconds * 1000.0) as u32, 1000)
        }),
    );

    metadata
}

fn put_some(dir: &MetadataDirectory, tag: TagId, value: Option<MetadataValue>) {
    if let Some(value) = value {
        dir.put(tag, value);
    }
}

/// Canon flash mode to the EXIF `Flash` bit field.
fn flash_mode(mode: i64) -> Option<MetadataValue> {
    const FIRED: u16 = 1;
    const COMPULSORY: u16 = 1 << 3;
    const AUTO: u16 = 3 << 3;
    const RED_EYE: u16 = 1 << 6;
    let flash = match mode {
        0 => 0,
        1 => AUTO,
        2 => COMPULSORY | FIRED,
        3 => RED_EYE | FIRED,
        5 => RED_EYE | FIRED | AUTO,
        6 => RED_EYE | COMPULSORY | FIRED,
        _ => return None,
    };
    Some(MetadataValue::ushort(flash))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::metadata::CollectingSink;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn u16le(out: &mut Vec<u8>, n: u16) {
        out.extend_from_slice(&n.to_le_bytes());
    }

    fn u32le(out: &mut Vec<u8>, n: u32) {
        out.extend_from_slice(&n.to_le_bytes());
    }

    /// A heap with make/model, image info, captured time and an inline shot-info record.
    pub(crate) fn sample_crw() -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"II");
        u32le(&mut out, 14);
        out.extend_from_slice(CIFF_SIGNATURE);

        // heap at 14; value offsets are relative to it
        out.extend_from_slice(b"Canon\0EOS D30\0");
        for n in [2160u32, 1440, 0, (-90i32) as u32, 8, 24, 0] {
            u32le(&mut out, n);
        }
        u32le(&mut out, 1_000_000_000);
        u32le(&mut out, 3600);
        u32le(&mut out, 0x8000_0000);

        // entry table at 54
        u16le(&mut out, 4);
        for (bits, len, offset) in [
            (ciff::MAKE_MODEL as u16, 14, 0),
            (ciff::IMAGE_INFO as u16, 28, 14),
            (ciff::CAPTURED_TIME as u16, 12, 42),
        ] {
            u16le(&mut out, bits);
            u32le(&mut out, len);
            u32le(&mut out, offset);
        }
        // ShotInfo inline: record length, unused, ISO apex 160, unused
        u16le(&mut out, DATA_IN_ENTRY | ciff::SHOT_INFO as u16);
        for n in [8u16, 0, 160, 0] {
            u16le(&mut out, n);
        }
        u32le(&mut out, 54);
        out
    }

    #[test]
    fn test_read_heap() {
        let sink = Arc::new(CollectingSink::new());
        let options = ParseOptions::default().with_sink(sink.clone());
        let container = read_ciff(Bytes::from(sample_crw()), &options).unwrap();
        assert!(sink.messages().is_empty(), "{:?}", sink.messages());

        let dir = container.get_or_create(DirectoryKind::Ciff);
        assert_eq!(dir.get_local(ciff::II_IMAGE_WIDTH).unwrap().as_i64(), Some(2160));
        assert_eq!(dir.get_local(ciff::II_ROTATION).unwrap().as_i64(), Some(-90));
        assert_eq!(dir.get_local(ciff::SI_ISO).unwrap().as_i64(), Some(160));
        assert_eq!(container.camera_make().as_deref(), Some("Canon"));
        assert_eq!(container.camera_model().as_deref(), Some("EOS D30"));
        assert_eq!(container.iso(), 100);
        assert_eq!(container.orientation(), ImageOrientation::LeftBottom);

        let expected = NaiveDate::from_ymd_opt(2001, 9, 9)
            .unwrap()
            .and_hms_opt(2, 46, 40)
            .unwrap();
        assert_eq!(container.capture_date_time(), Some(expected));
    }

    #[test]
    fn test_convert() {
        let container = read_ciff(Bytes::from(sample_crw()), &ParseOptions::default()).unwrap();
        let ciff_dir = container.get_or_create(DirectoryKind::Ciff);

        let tiff_side = convert(&ciff_dir, ExportTarget::Tiff);
        let get = |kind, tag| tiff_side.get_value(kind, tag).unwrap();
        assert_eq!(get(DirectoryKind::Tiff, tiff::ORIENTATION).as_i64(), Some(8));
        assert_eq!(get(DirectoryKind::Tiff, tiff::IMAGE_WIDTH).as_i64(), Some(2160));
        assert_eq!(
            get(DirectoryKind::Tiff, tiff::BITS_PER_SAMPLE).as_i64_vec(),
            Some(vec![8, 8, 8])
        );
        assert_eq!(get(DirectoryKind::Tiff, tiff::MODEL).as_string().unwrap(), "EOS D30");
        assert_eq!(get(DirectoryKind::Tiff, tiff::EXIF_IFD_POINTER).as_i64(), Some(0));
        assert_eq!(get(DirectoryKind::Exif, exif::ISO_SPEED_RATINGS).as_i64(), Some(100));
        assert!(get(DirectoryKind::Exif, exif::DATE_TIME_ORIGINAL).as_date().is_some());

        let jpeg_side = convert(&ciff_dir, ExportTarget::Jpeg);
        assert_eq!(jpeg_side.kinds(), vec![DirectoryKind::Exif]);
        let make = jpeg_side.get_value(DirectoryKind::Exif, tiff::MAKE).unwrap();
        assert_eq!(make.as_string().unwrap(), "Canon");
    }

    #[test]
    fn test_flash_and_orientation_tables() {
        assert_eq!(flash_mode(5).unwrap().as_i64(), Some(0x59));
        assert_eq!(flash_mode(6).unwrap().as_i64(), Some(0x49));
        assert!(flash_mode(7).is_none());
        assert_eq!(auto_rotate_orientation(1), ImageOrientation::LeftBottom);
        assert_eq!(auto_rotate_orientation(3).tiff_value(), Some(6));
    }

    #[test]
    fn test_bad_signature() {
        let mut data = sample_crw();
        data[6] = b'X';
        assert!(matches!(
            read_ciff(Bytes::from(data), &ParseOptions::default()),
            Err(MetadataError::BadImageFile(TiffFormatError::CiffSignatureNotFound))
        ));
    }

    #[test]
    fn test_heap_depth_is_bounded() {
        // 40 heaps, each holding only the next one at its start.
        let mut heap = Vec::new();
        u16le(&mut heap, 0);
        u32le(&mut heap, 0);
        for _ in 0..40 {
            let inner_len = heap.len() as u32;
            let table = inner_len;
            u16le(&mut heap, 1);
            u16le(&mut heap, ciff::FIELD_TYPE_HEAP1 as u16 | 0x0A);
            u32le(&mut heap, inner_len);
            u32le(&mut heap, 0);
            u32le(&mut heap, table);
        }
        let mut data = b"II".to_vec();
        u32le(&mut data, 14);
        data.extend_from_slice(CIFF_SIGNATURE);
        data.extend_from_slice(&heap);

        let sink = Arc::new(CollectingSink::new());
        let options = ParseOptions::default().with_sink(sink.clone());
        read_ciff(Bytes::from(data), &options).unwrap();
        let messages = sink.messages();
        assert_eq!(messages.len(), 1, "{messages:?}");
        assert!(messages[0].contains("nested"));
    }

    #[test]
    fn test_heap_cycle() {
        let mut data = sample_crw();
        // turn the captured-time entry into a heap pointing back at the root heap
        let entry = 14 + 54 + 2 + 2 * CIFF_ENTRY_SIZE;
        data[entry..entry + 2].copy_from_slice(&(ciff::FIELD_TYPE_HEAP1 as u16 | 0x01).to_le_bytes());
        data[entry + 2..entry + 6].copy_from_slice(&100u32.to_le_bytes());
        data[entry + 6..entry + 10].copy_from_slice(&0u32.to_le_bytes());
        let sink = Arc::new(CollectingSink::new());
        let options = ParseOptions::default().with_sink(sink.clone());
        let container = read_ciff(Bytes::from(data), &options).unwrap();
        assert_eq!(sink.messages().len(), 1);
        assert!(container.camera_make().is_some());
    }
}
