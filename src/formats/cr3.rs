//! Canon CR3: an ISO base media file whose `moov` box holds a Canon `uuid` box. Its `CMT1` to
//! `CMT4` children are complete TIFF streams.

use std::ops::Range;

use bytes::Bytes;

use crate::container::MetadataContainer;
use crate::error::MetadataResult;
use crate::kind::{DirectoryKind, Vendor};
use crate::metadata::{IfdReader, ParseOptions};
use crate::tiff::{TiffFormatError, TIFF_MAGIC_NUMBER};

/// Type of the box holding Canon's metadata.
pub const CANON_UUID: [u8; 16] = [
    0x85, 0xC0, 0xB6, 0x87, 0x82, 0x0F, 0x11, 0xE0, 0x81, 0x11, 0xF4, 0xCE, 0x46, 0x2B, 0x6A, 0x48,
];

/// Major brand of a CR3 `ftyp` box.
pub const CR3_BRAND: &[u8; 4] = b"crx ";

/// One box, located within the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BmffBox {
    /// FourCC
    pub box_type: [u8; 4],
    /// Where the header starts.
    pub header_offset: usize,
    /// Where the payload starts.
    pub data_offset: usize,
    /// One past the payload.
    pub end: usize,
}

impl BmffBox {
    /// Payload range.
    pub fn data(&self) -> Range<usize> {
        self.data_offset..self.end
    }
}

/// Read the box header at `pos`, with `limit` the end of the enclosing box.
pub fn read_box(data: &[u8], pos: usize, limit: usize) -> MetadataResult<BmffBox> {
    let truncated = || TiffFormatError::Format(format!("box at {pos} overruns its parent"));
    if pos + 8 > limit {
        return Err(truncated().into());
    }
    let size = u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]);
    let box_type = [data[pos + 4], data[pos + 5], data[pos + 6], data[pos + 7]];

    let (data_offset, end) = match size {
        // extends to the end of the parent
        0 => (pos + 8, limit),
        1 => {
            if pos + 16 > limit {
                return Err(truncated().into());
            }
            let mut large = [0u8; 8];
            large.copy_from_slice(&data[pos + 8..pos + 16]);
            let size = usize::try_from(u64::from_be_bytes(large)).map_err(|_| truncated())?;
            (pos + 16, pos.checked_add(size).ok_or_else(truncated)?)
        }
        size => (pos + 8, pos + size as usize),
    };
    if end < data_offset || end > limit {
        return Err(truncated().into());
    }
    Ok(BmffBox {
        box_type,
        header_offset: pos,
        data_offset,
        end,
    })
}

/// Every box in `range`, in file order.
pub fn child_boxes(data: &[u8], range: Range<usize>) -> MetadataResult<Vec<BmffBox>> {
    let mut boxes = Vec::new();
    let mut pos = range.start;
    while pos + 8 <= range.end {
        let bmff_box = read_box(data, pos, range.end)?;
        pos = bmff_box.end;
        boxes.push(bmff_box);
    }
    Ok(boxes)
}

/// Read the metadata boxes of a CR3 file.
///
/// `CMT1` becomes the TIFF directory, `CMT2` the EXIF directory, `CMT3` Canon's maker notes and
/// `CMT4` the GPS directory. A box that fails header validation is reported and skipped.
pub fn read_cr3(data: Bytes, options: &ParseOptions) -> MetadataResult<MetadataContainer> {
    let top = child_boxes(&data, 0..data.len())
        .map_err(|_| TiffFormatError::ContainerSignatureNotFound("CR3"))?;
    match top.first() {
        Some(ftyp)
            if &ftyp.box_type == b"ftyp" && data[ftyp.data()].starts_with(CR3_BRAND) => {}
        _ => return Err(TiffFormatError::ContainerSignatureNotFound("CR3").into()),
    }

    let moov = top
        .iter()
        .find(|b| &b.box_type == b"moov")
        .ok_or(TiffFormatError::ContainerBlockNotFound("moov"))?;
    let canon = child_boxes(&data, moov.data())?
        .into_iter()
        .find(|b| &b.box_type == b"uuid" && data[b.data()].starts_with(&CANON_UUID))
        .ok_or(TiffFormatError::ContainerBlockNotFound("uuid"))?;

    let container = MetadataContainer::new();
    for cmt in child_boxes(&data, canon.data_offset + CANON_UUID.len()..canon.end)? {
        let kind = match &cmt.box_type {
            b"CMT1" => DirectoryKind::Tiff,
            b"CMT2" => DirectoryKind::Exif,
            b"CMT3" => DirectoryKind::MakerNotes(Vendor::Canon),
            b"CMT4" => DirectoryKind::Gps,
            _ => continue,
        };
        if options.stop.is_stopped() {
            break;
        }
        log::debug!("CR3 {} box at {}", kind, cmt.header_offset);
        match IfdReader::try_open(data.slice(cmt.data()), 0, &[TIFF_MAGIC_NUMBER]) {
            Ok(reader) => reader.read_into(kind, &container, options)?,
            Err(e) => options.sink.report(&format!("CR3 {kind} box: {e}")),
        }
    }
    if container.is_empty() {
        return Err(TiffFormatError::ContainerBlockNotFound("CMT1").into());
    }
    Ok(container)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::MetadataError;
    use crate::tiff::tags::exif;

    fn bmff_box(box_type: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
        out.extend_from_slice(box_type);
        out.extend_from_slice(payload);
        out
    }

    #[rustfmt::skip]
    const CMT1: &[u8] = &[
        b'I', b'I', 42, 0, 8, 0, 0, 0,
        1, 0,
        0x0F, 0x01, 2, 0, 6, 0, 0, 0, 26, 0, 0, 0,
        0, 0, 0, 0,
        b'C', b'a', b'n', b'o', b'n', 0,
    ];

    #[rustfmt::skip]
    const CMT2: &[u8] = &[
        b'M', b'M', 0, 42, 0, 0, 0, 8,
        0, 1,
        0x88, 0x27, 0, 3, 0, 0, 0, 1, 0x01, 0x90, 0, 0,
        0, 0, 0, 0,
    ];

    fn sample_cr3() -> Vec<u8> {
        let mut uuid = CANON_UUID.to_vec();
        uuid.extend(bmff_box(b"CNCV", b"CanonCR3_001/00.09.00/00.00.00"));
        uuid.extend(bmff_box(b"CMT1", CMT1));
        uuid.extend(bmff_box(b"CMT2", CMT2));
        let mut moov = bmff_box(b"uuid", &uuid);
        moov.extend(bmff_box(b"mvhd", &[0; 12]));

        let mut file = bmff_box(b"ftyp", b"crx \0\0\0\x01crx isom");
        file.extend(bmff_box(b"moov", &moov));
        file.extend(bmff_box(b"mdat", &[0xAB; 16]));
        file
    }

    #[test]
    fn test_read_cr3() {
        let container = read_cr3(Bytes::from(sample_cr3()), &ParseOptions::default()).unwrap();
        assert_eq!(container.camera_make().as_deref(), Some("Canon"));
        let iso = container.get_value(DirectoryKind::Exif, exif::ISO_SPEED_RATINGS).unwrap();
        assert_eq!(iso.as_i64(), Some(400));
        assert_eq!(container.iso(), 400);
    }

    #[test]
    fn test_large_size_box() {
        let mut data = 1u32.to_be_bytes().to_vec();
        data.extend_from_slice(b"free");
        data.extend_from_slice(&20u64.to_be_bytes());
        data.extend_from_slice(&[0; 4]);
        let free = read_box(&data, 0, data.len()).unwrap();
        assert_eq!(free.data(), 16..20);
        assert!(read_box(&data, 0, 12).is_err());
    }

    #[test]
    fn test_not_cr3() {
        let mp4 = bmff_box(b"ftyp", b"isom\0\0\0\x01");
        assert!(matches!(
            read_cr3(Bytes::from(mp4), &ParseOptions::default()),
            Err(MetadataError::BadImageFile(TiffFormatError::ContainerSignatureNotFound("CR3")))
        ));

        let no_moov = bmff_box(b"ftyp", b"crx \0\0\0\x01");
        assert!(matches!(
            read_cr3(Bytes::from(no_moov), &ParseOptions::default()),
            Err(MetadataError::BadImageFile(TiffFormatError::ContainerBlockNotFound("moov")))
        ));
    }
}
