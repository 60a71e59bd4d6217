//! Plain TIFF streams: TIFF and DNG files, and the raw formats that are TIFF with another magic
//! number (Panasonic RW2, Olympus ORF).

use bytes::Bytes;

use crate::container::MetadataContainer;
use crate::error::MetadataResult;
use crate::kind::DirectoryKind;
use crate::metadata::{IfdReader, ParseOptions};
use crate::tiff::{OLYMPUS_MAGIC_NUMBERS, PANASONIC_MAGIC_NUMBER, TIFF_MAGIC_NUMBER};

/// Every magic number accepted after the byte order marker.
pub const TIFF_MAGIC_NUMBERS: &[u16] = &[
    TIFF_MAGIC_NUMBER,
    PANASONIC_MAGIC_NUMBER,
    OLYMPUS_MAGIC_NUMBERS[0],
    OLYMPUS_MAGIC_NUMBERS[1],
];

/// Read a TIFF stream that starts at the beginning of `data`.
pub fn read_tiff(data: Bytes, options: &ParseOptions) -> MetadataResult<MetadataContainer> {
    read_tiff_at(data, 0, options)
}

/// Read a TIFF stream embedded at `base`, with offsets relative to `base`.
pub fn read_tiff_at(
    data: Bytes,
    base: usize,
    options: &ParseOptions,
) -> MetadataResult<MetadataContainer> {
    let container = MetadataContainer::new();
    let reader = IfdReader::try_open(data, base, TIFF_MAGIC_NUMBERS)?;
    log::debug!(
        "TIFF stream at {base}: magic {:#06x}, {:?}",
        reader.magic(),
        reader.endianness()
    );
    reader.read_into(DirectoryKind::Tiff, &container, options)?;
    Ok(container)
}
