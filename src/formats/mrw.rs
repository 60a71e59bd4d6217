//! Minolta MRW: a chain of named blocks ahead of the raw data. The `TTW` block is a TIFF stream.

use bytes::Bytes;

use crate::container::MetadataContainer;
use crate::error::MetadataResult;
use crate::formats::tiff::read_tiff_at;
use crate::metadata::ParseOptions;
use crate::tiff::TiffFormatError;

/// Start of every MRW file.
pub const MRW_MAGIC: &[u8; 4] = b"\0MRM";

/// Name of the block holding the TIFF stream.
pub const TTW_BLOCK: &[u8; 4] = b"\0TTW";

const BLOCK_HEADER_SIZE: usize = 8;

fn be_u32(data: &[u8], pos: usize) -> usize {
    u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]) as usize
}

/// Read the TIFF block of an MRW file.
pub fn read_mrw(data: Bytes, options: &ParseOptions) -> MetadataResult<MetadataContainer> {
    if data.len() < BLOCK_HEADER_SIZE || !data.starts_with(MRW_MAGIC) {
        return Err(TiffFormatError::ContainerSignatureNotFound("MRW").into());
    }
    // the header block's length covers every metadata block
    let end = (BLOCK_HEADER_SIZE + be_u32(&data, 4)).min(data.len());

    let mut pos = BLOCK_HEADER_SIZE;
    while pos + BLOCK_HEADER_SIZE <= end {
        let name = &data[pos..pos + 4];
        let len = be_u32(&data, pos + 4);
        let payload = pos + BLOCK_HEADER_SIZE;
        log::trace!("MRW block {:?} at {pos}, {len} bytes", String::from_utf8_lossy(name));
        if name == TTW_BLOCK {
            let block_end = payload.saturating_add(len).min(data.len());
            return read_tiff_at(data.slice(..block_end), payload, options);
        }
        pos = payload.saturating_add(len);
    }
    Err(TiffFormatError::ContainerBlockNotFound("TTW").into())
}
