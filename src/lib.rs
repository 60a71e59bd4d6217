#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod apex;
pub mod capability;
pub mod catalog;
mod container;
mod directory;
pub mod encoder;
pub mod error;
pub mod export;
pub mod formats;
mod kind;
pub mod metadata;
pub mod reader;
pub mod tiff;
mod value;

pub use capability::{Capability, CapabilityValue, ImageOrientation, ResolutionUnit};
pub use catalog::{TagCatalog, TagDescriptor};
pub use container::MetadataContainer;
pub use directory::{DirectoryRegistry, MetadataDirectory, NoFallback};
pub use encoder::{DirectoryEncoder, EncodeOptions};
pub use error::{MetadataError, MetadataResult};
pub use export::{ExportOptions, ExportTarget};
pub use kind::{DirectoryKind, Vendor};
pub use value::{MetaType, MetadataValue, Rational, ValueData, EXIF_DATE_FORMAT};
