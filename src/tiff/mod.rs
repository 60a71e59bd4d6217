//! Wire-level vocabulary shared by every IFD-based format: field types, tag numbers and errors.

mod error;
pub mod tags;

pub use error::{TiffError, TiffFormatError, TiffResult, TiffUnsupportedError};

/// Size of a TIFF header: order marker, magic and first directory offset.
pub const TIFF_HEADER_SIZE: usize = 8;

/// Values of at most this many bytes are stored inside the directory entry.
pub const TIFF_INLINE_VALUE_MAX_SIZE: usize = 4;

/// The classic TIFF magic number.
pub const TIFF_MAGIC_NUMBER: u16 = 42;

/// Magic number Panasonic writes into RW2 files.
pub const PANASONIC_MAGIC_NUMBER: u16 = 0x55;

/// Magic numbers Olympus writes into ORF files (`RO` and `RS`).
pub const OLYMPUS_MAGIC_NUMBERS: [u16; 2] = [0x4F52, 0x5352];

/// Size of one classic directory entry.
pub const IFD_ENTRY_SIZE: usize = 12;

/// Little-endian byte order marker `II`.
pub const TIFF_LITTLE_ENDIAN: u16 = 0x4949;

/// Big-endian byte order marker `MM`.
pub const TIFF_BIG_ENDIAN: u16 = 0x4D4D;

/// The marker opening an EXIF APP1 payload.
pub const EXIF_SIGNATURE: &[u8; 6] = b"Exif\0\0";

/// Size of the `Exif\0\0` marker; offsets inside the payload are relative to what follows it.
pub const EXIF_HEADER_START_SIZE: usize = 6;

/// `Exif\0\0` marker plus the embedded TIFF header.
pub const EXIF_HEADER_SIZE: usize = EXIF_HEADER_START_SIZE + TIFF_HEADER_SIZE;
