//! EXIF payloads, bare or inside a JPEG's APP1 segment.

use bytes::Bytes;

use crate::container::MetadataContainer;
use crate::error::MetadataResult;
use crate::kind::DirectoryKind;
use crate::metadata::{IfdReader, ParseOptions};
use crate::tiff::{TiffFormatError, EXIF_HEADER_START_SIZE, EXIF_SIGNATURE, TIFF_MAGIC_NUMBER};

const MARKER_SOI: u8 = 0xD8;
const MARKER_EOI: u8 = 0xD9;
const MARKER_SOS: u8 = 0xDA;
const MARKER_APP1: u8 = 0xE1;

/// Read an APP1 payload: `Exif\0\0` followed by a TIFF stream whose offsets are relative to the
/// TIFF header.
pub fn read_exif(data: Bytes, options: &ParseOptions) -> MetadataResult<MetadataContainer> {
    if !data.starts_with(EXIF_SIGNATURE) {
        return Err(TiffFormatError::ExifSignatureNotFound.into());
    }
    let container = MetadataContainer::new();
    IfdReader::try_open(data, EXIF_HEADER_START_SIZE, &[TIFF_MAGIC_NUMBER])?.read_into(
        DirectoryKind::Exif,
        &container,
        options,
    )?;
    Ok(container)
}

/// Read the EXIF metadata of a JPEG file.
pub fn read_jpeg(data: Bytes, options: &ParseOptions) -> MetadataResult<MetadataContainer> {
    let payload = find_jpeg_exif(&data)?.ok_or(TiffFormatError::ContainerBlockNotFound("APP1"))?;
    read_exif(payload, options)
}

/// Locate the first APP1 segment carrying EXIF, returning its payload from the `Exif\0\0`
/// signature on. Scanning stops at the start of the entropy-coded data.
pub fn find_jpeg_exif(data: &Bytes) -> MetadataResult<Option<Bytes>> {
    if data.len() < 2 || data[0] != 0xFF || data[1] != MARKER_SOI {
        return Err(TiffFormatError::ContainerSignatureNotFound("JPEG").into());
    }

    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            log::debug!("JPEG marker expected at {pos}");
            return Ok(None);
        }
        let marker = data[pos + 1];
        match marker {
            // fill byte
            0xFF => {
                pos += 1;
                continue;
            }
            MARKER_SOS | MARKER_EOI => return Ok(None),
            // standalone markers carry no length
            0x01 | 0xD0..=0xD7 => {
                pos += 2;
                continue;
            }
            _ => {}
        }

        let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        let payload_start = pos + 4;
        let payload_end = pos + 2 + len;
        if len < 2 || payload_end > data.len() {
            log::debug!("JPEG segment {marker:#04x} at {pos} overruns the file");
            return Ok(None);
        }
        if marker == MARKER_APP1 && data[payload_start..payload_end].starts_with(EXIF_SIGNATURE) {
            return Ok(Some(data.slice(payload_start..payload_end)));
        }
        pos = payload_end;
    }
    Ok(None)
}
