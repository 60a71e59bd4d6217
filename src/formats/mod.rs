//! Adapters that find the metadata stream inside each file format.
//!
//! Every adapter takes the whole file as [`Bytes`] and returns a fresh
//! [`MetadataContainer`]. [`read`] picks the adapter from the file's leading bytes.
//!
//! ```
//! use bytes::Bytes;
//! use ifd_metadata::formats::{self, FileFormat};
//! use ifd_metadata::metadata::ParseOptions;
//!
//! #[rustfmt::skip]
//! let data = Bytes::from_static(&[
//!     b'M', b'M', 0, 42, 0, 0, 0, 8,
//!     0, 1,
//!     0x01, 0x12, 0, 3, 0, 0, 0, 1, 0, 8, 0, 0,
//!     0, 0, 0, 0,
//! ]);
//! assert_eq!(FileFormat::detect(&data), Some(FileFormat::Tiff));
//! let container = formats::read(data, &ParseOptions::default()).unwrap();
//! assert_eq!(container.orientation().tiff_value(), Some(8));
//! ```

use bytes::Bytes;

use crate::container::MetadataContainer;
use crate::error::MetadataResult;
use crate::metadata::ParseOptions;
use crate::tiff::{TiffFormatError, EXIF_SIGNATURE};

pub mod ciff;
pub mod cr3;
pub mod exif;
pub mod mrw;
pub mod raf;
pub mod tiff;

/// A file format with an adapter in this module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// A bare APP1 payload starting with `Exif\0\0`.
    Exif,
    /// JPEG/JFIF
    Jpeg,
    /// TIFF, DNG and the TIFF-shaped raw formats (RW2, ORF and most others)
    Tiff,
    /// Canon CRW
    Ciff,
    /// Canon CR3
    Cr3,
    /// Fujifilm RAF
    Raf,
    /// Minolta MRW
    Mrw,
}

impl FileFormat {
    /// Guess the format from the leading bytes.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.starts_with(EXIF_SIGNATURE) {
            return Some(FileFormat::Exif);
        }
        if data.starts_with(&[0xFF, 0xD8]) {
            return Some(FileFormat::Jpeg);
        }
        if data.starts_with(raf::RAF_MAGIC) {
            return Some(FileFormat::Raf);
        }
        if data.starts_with(mrw::MRW_MAGIC) {
            return Some(FileFormat::Mrw);
        }
        if data.len() >= 12 && &data[4..8] == b"ftyp" && &data[8..12] == cr3::CR3_BRAND {
            return Some(FileFormat::Cr3);
        }
        if data.len() >= 14 && &data[6..14] == ciff::CIFF_SIGNATURE {
            return Some(FileFormat::Ciff);
        }
        if data.len() >= 4 {
            let magic = match &data[..2] {
                b"II" => u16::from_le_bytes([data[2], data[3]]),
                b"MM" => u16::from_be_bytes([data[2], data[3]]),
                _ => return None,
            };
            if tiff::TIFF_MAGIC_NUMBERS.contains(&magic) {
                return Some(FileFormat::Tiff);
            }
        }
        None
    }

    /// Read `data` with this format's adapter.
    pub fn read(&self, data: Bytes, options: &ParseOptions) -> MetadataResult<MetadataContainer> {
        match self {
            FileFormat::Exif => exif::read_exif(data, options),
            FileFormat::Jpeg => exif::read_jpeg(data, options),
            FileFormat::Tiff => tiff::read_tiff(data, options),
            FileFormat::Ciff => ciff::read_ciff(data, options),
            FileFormat::Cr3 => cr3::read_cr3(data, options),
            FileFormat::Raf => raf::read_raf(data, options),
            FileFormat::Mrw => mrw::read_mrw(data, options),
        }
    }
}

/// Detect the format of `data` and read its metadata.
pub fn read(data: Bytes, options: &ParseOptions) -> MetadataResult<MetadataContainer> {
    let format = FileFormat::detect(&data)
        .ok_or(TiffFormatError::Format("unrecognized file format".into()))?;
    log::debug!("reading {format:?} metadata");
    format.read(data, options)
}
