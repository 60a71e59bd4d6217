//! API for reading metadata out of IFD-structured byte streams.
//!
//! ### Reading a TIFF stream
//!
//! [`IfdReader`] validates the header; [`IfdReader::read_into`] then walks every directory into a
//! [`MetadataContainer`](crate::MetadataContainer):
//!
//! ```
//! use bytes::Bytes;
//! use ifd_metadata::metadata::{IfdReader, ParseOptions};
//! use ifd_metadata::{DirectoryKind, MetadataContainer};
//!
//! #[rustfmt::skip]
//! let data = Bytes::from_static(&[
//!     b'I', b'I', 42, 0, 8, 0, 0, 0,
//!     1, 0,
//!     0x0F, 0x01, 2, 0, 5, 0, 0, 0, 26, 0, 0, 0,
//!     0, 0, 0, 0,
//!     b'A', b'c', b'm', b'e', 0,
//! ]);
//! let container = MetadataContainer::new();
//! IfdReader::try_open(data, 0, &[42])
//!     .unwrap()
//!     .read_into(DirectoryKind::Tiff, &container, &ParseOptions::default())
//!     .unwrap();
//! assert_eq!(container.camera_make().as_deref(), Some("Acme"));
//! ```
//!
//! ### Bad metadata
//!
//! Problems inside a directory never fail a read. Each one is reported to the
//! [`BadMetadataSink`] in [`ParseOptions`] and the offending entry is skipped; the default
//! [`LogSink`] logs at `warn`. Only header validation returns an error.
//!
//! ### Formats with their own framing
//!
//! [`BinaryDirectoryParser`] is format agnostic: it locates entries and hands them to a
//! [`DirectoryHandler`]. The adapters in [`formats`](crate::formats) locate the stream inside
//! their container and pick the handler.

mod exif;
mod maker_notes;
mod parser;

pub use exif::IfdReader;
pub use maker_notes::{
    MakerNoteLayout, MakerNoteParser, MakerNoteProbe, MakerNoteRegistry, SignatureProbe,
};
pub use parser::{
    entry_position, BadMetadataSink, BinaryDirectoryParser, CollectingSink, DirectoryHandler,
    Entry, GenericHandler, LogSink, ParseOptions, StopFlag, DEFAULT_MAX_DEPTH,
    DEFAULT_MAX_ENTRY_COUNT, DEFAULT_MAX_VALUE_SIZE,
};
