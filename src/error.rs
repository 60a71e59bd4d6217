//! Error handling.

use std::fmt::Debug;
use thiserror::Error;

use crate::tiff::{TiffError, TiffFormatError};

/// Enum with all errors in this crate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MetadataError {
    /// The source failed header validation and cannot be read at all.
    #[error("Bad image file: {0}")]
    BadImageFile(TiffFormatError),

    /// End of buffer reached.
    #[error("End of File: expected to read {0} bytes, got {1}")]
    EndOfFile(usize, usize),

    /// General error.
    #[error("General error: {0}")]
    General(String),

    /// A broken invariant, such as asking the encoder to write a value it has no layout for.
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO Error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// An error raised by the wire-level layer.
    #[error(transparent)]
    InternalTIFFError(#[from] TiffError),

    /// External error
    #[error(transparent)]
    External(Box<dyn std::error::Error + Send + Sync>),
}

impl From<TiffFormatError> for MetadataError {
    fn from(err: TiffFormatError) -> Self {
        MetadataError::BadImageFile(err)
    }
}

/// Crate-specific result type.
pub type MetadataResult<T> = std::result::Result<T, MetadataError>;
