use std::error::Error;
use std::fmt;
use std::io;

/// Wire-level error kinds.
#[derive(Debug)]
#[allow(clippy::enum_variant_names)]
pub enum TiffError {
    /// The byte stream is not formatted properly.
    FormatError(TiffFormatError),

    /// The stream uses a feature this crate does not handle.
    UnsupportedError(TiffUnsupportedError),

    /// An I/O Error occurred while reading or writing the stream.
    IoError(io::Error),

    /// An integer conversion to or from a platform size failed, either due to
    /// limits of the platform size or limits of the format.
    IntSizeError,
}

/// The byte stream is not formatted properly.
///
/// This indicates that the camera or software producing the file might behave incorrectly or
/// that the input file has been corrupted.
///
/// The list of variants may grow. Matching against this exhaustively is not covered by interface
/// stability guarantees.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum TiffFormatError {
    /// Neither `II` nor `MM` found where the byte order marker belongs.
    ByteOrderMarkerInvalid(u16),
    /// The magic number following the byte order marker is not accepted.
    TiffSignatureInvalid(u16),
    /// The `Exif\0\0` marker is missing from an APP1 payload.
    ExifSignatureNotFound,
    /// The CIFF `HEAPCCDR` signature is missing.
    CiffSignatureNotFound,
    /// A container magic (RAF, MRW, CR3) was not found.
    ContainerSignatureNotFound(&'static str),
    /// A container block or box required to find the directory is missing.
    ContainerBlockNotFound(&'static str),
    /// The buffer ends before the header does.
    TruncatedHeader {
        /// Bytes the header needs.
        required_bytes: usize,
        /// Bytes available.
        actual_bytes: usize,
    },
    /// Any other structural problem.
    Format(String),
}

impl fmt::Display for TiffFormatError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        use self::TiffFormatError::*;
        match *self {
            ByteOrderMarkerInvalid(marker) => {
                write!(fmt, "Byte order marker {marker:#06x} is neither II nor MM.")
            }
            TiffSignatureInvalid(magic) => write!(fmt, "TIFF signature {magic} invalid."),
            ExifSignatureNotFound => write!(fmt, "EXIF signature not found."),
            CiffSignatureNotFound => write!(fmt, "CIFF signature not found."),
            ContainerSignatureNotFound(name) => write!(fmt, "{name} signature not found."),
            ContainerBlockNotFound(name) => write!(fmt, "Container block `{name}` not found."),
            TruncatedHeader {
                required_bytes,
                actual_bytes,
            } => write!(
                fmt,
                "Header truncated: need {required_bytes} bytes, got {actual_bytes}."
            ),
            Format(ref val) => write!(fmt, "Invalid format: {val:?}."),
        }
    }
}

/// The stream uses something this crate does not handle.
///
/// The list of variants may grow. Matching against this exhaustively is not covered by interface
/// stability guarantees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TiffUnsupportedError {
    /// A field type code outside the known table.
    UnknownFieldType(u16),
}

impl fmt::Display for TiffUnsupportedError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        use self::TiffUnsupportedError::*;
        match *self {
            UnknownFieldType(code) => write!(fmt, "Unknown field type {code:#x}."),
        }
    }
}

impl fmt::Display for TiffError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match *self {
            TiffError::FormatError(ref e) => write!(fmt, "Format error: {e}"),
            TiffError::UnsupportedError(ref f) => write!(fmt, "Unsupported: {f}"),
            TiffError::IoError(ref e) => e.fmt(fmt),
            TiffError::IntSizeError => write!(fmt, "Platform or format size limits exceeded"),
        }
    }
}

impl Error for TiffError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            TiffError::IoError(ref e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TiffError {
    fn from(err: io::Error) -> TiffError {
        TiffError::IoError(err)
    }
}

impl From<TiffFormatError> for TiffError {
    fn from(err: TiffFormatError) -> TiffError {
        TiffError::FormatError(err)
    }
}

impl From<TiffUnsupportedError> for TiffError {
    fn from(err: TiffUnsupportedError) -> TiffError {
        TiffError::UnsupportedError(err)
    }
}

impl From<std::num::TryFromIntError> for TiffError {
    fn from(_err: std::num::TryFromIntError) -> TiffError {
        TiffError::IntSizeError
    }
}

/// Result of a wire-level operation.
pub type TiffResult<T> = Result<T, TiffError>;
