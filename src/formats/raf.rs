//! Fujifilm RAF: a fixed header followed by an embedded JPEG preview that carries the EXIF.

use bytes::Bytes;

use crate::container::MetadataContainer;
use crate::error::MetadataResult;
use crate::formats::exif::{find_jpeg_exif, read_exif};
use crate::metadata::ParseOptions;
use crate::tiff::TiffFormatError;

/// Start of every RAF file.
pub const RAF_MAGIC: &[u8; 16] = b"FUJIFILMCCD-RAW ";

const JPEG_OFFSET_POS: usize = 84;
const JPEG_LENGTH_POS: usize = 88;

fn be_u32(data: &[u8], pos: usize) -> u32 {
    u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
}

/// Read the EXIF of the JPEG preview embedded in a RAF file.
pub fn read_raf(data: Bytes, options: &ParseOptions) -> MetadataResult<MetadataContainer> {
    if !data.starts_with(RAF_MAGIC) {
        return Err(TiffFormatError::ContainerSignatureNotFound("RAF").into());
    }
    if data.len() < JPEG_LENGTH_POS + 4 {
        return Err(TiffFormatError::TruncatedHeader {
            required_bytes: JPEG_LENGTH_POS + 4,
            actual_bytes: data.len(),
        }
        .into());
    }
    let offset = be_u32(&data, JPEG_OFFSET_POS) as usize;
    let len = be_u32(&data, JPEG_LENGTH_POS) as usize;
    let end = offset
        .checked_add(len)
        .filter(|end| *end <= data.len())
        .ok_or(TiffFormatError::ContainerBlockNotFound("JPEG preview"))?;
    log::debug!("RAF JPEG preview at {offset}, {len} bytes");

    let payload = find_jpeg_exif(&data.slice(offset..end))?
        .ok_or(TiffFormatError::ContainerBlockNotFound("APP1"))?;
    read_exif(payload, options)
}
