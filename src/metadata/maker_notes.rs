use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::container::MetadataContainer;
use crate::directory::MetadataDirectory;
use crate::error::{MetadataError, MetadataResult};
use crate::kind::{DirectoryKind, Vendor};
use crate::metadata::parser::{BinaryDirectoryParser, GenericHandler};
use crate::reader::{ByteBuffer, Endianness};
use crate::tiff::TIFF_HEADER_SIZE;

/// Where the directory inside a maker-note blob starts and how its offsets resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MakerNoteLayout {
    /// Absolute position of the directory's entry count.
    pub ifd_offset: usize,
    /// Absolute position stored value offsets are relative to. `None` keeps the enclosing
    /// stream's framing base.
    pub value_base: Option<usize>,
    /// The byte order, when the blob declares one. Otherwise it is guessed from the entry count.
    pub endianness: Option<Endianness>,
}

impl MakerNoteLayout {
    /// A bare directory at `offset` using the enclosing stream's offsets.
    pub fn at(offset: usize) -> Self {
        Self {
            ifd_offset: offset,
            value_base: None,
            endianness: None,
        }
    }

    fn relative_to(mut self, base: usize) -> Self {
        self.value_base = Some(base);
        self
    }
}

/// Trait to implement for vendor maker-note formats.
pub trait MakerNoteParser: Debug + Send + Sync {
    /// The vendors this parser handles.
    fn vendors(&self) -> &'static [Vendor];

    /// Locate the directory inside the blob starting at `offset`.
    fn layout(&self, buf: &ByteBuffer, offset: usize) -> MetadataResult<MakerNoteLayout>;

    /// Decode the blob entirely, returning `false` to have it read as a generic directory at
    /// [`layout`](Self::layout) instead.
    fn read(
        &self,
        _buf: &ByteBuffer,
        _offset: usize,
        _len: usize,
        _dir: &MetadataDirectory,
    ) -> MetadataResult<bool> {
        Ok(false)
    }
}

/// Chooses the vendor of a maker-note blob.
pub trait MakerNoteProbe: Debug + Send + Sync {
    /// The vendor of the blob at `offset`, given the camera make when it is known.
    fn probe(&self, make: Option<&str>, buf: &ByteBuffer, offset: usize) -> Option<Vendor>;
}

/// Recognizes the vendor by the blob's leading signature, falling back to the camera make.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureProbe;

const SIGNATURES: &[(&[u8], Vendor)] = &[
    (b"Nikon", Vendor::Nikon),
    (b"OLYMP", Vendor::Olympus),
    (b"OM SYSTEM", Vendor::Olympus),
    (b"AOC\0", Vendor::Pentax),
    (b"PENTAX ", Vendor::Pentax),
    (b"SONY", Vendor::Sony),
    (b"Panasonic", Vendor::Panasonic),
    (b"FUJIFILM", Vendor::Fuji),
];

impl MakerNoteProbe for SignatureProbe {
    fn probe(&self, make: Option<&str>, buf: &ByteBuffer, offset: usize) -> Option<Vendor> {
        SIGNATURES
            .iter()
            .find(|(signature, _)| buf.get_equals(offset, signature))
            .map(|(_, vendor)| *vendor)
            .or_else(|| make.and_then(Vendor::from_make))
    }
}

/// The registry of vendor maker-note parsers, at most one per vendor.
#[derive(Debug, Clone)]
pub struct MakerNoteRegistry(HashMap<Vendor, Arc<dyn MakerNoteParser>>);

impl MakerNoteRegistry {
    /// Create a new, empty `MakerNoteRegistry`.
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// The built-in parsers for every known vendor.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        let builtin: [Arc<dyn MakerNoteParser>; 6] = [
            Arc::new(NikonNotes),
            Arc::new(OlympusNotes),
            Arc::new(PentaxNotes),
            Arc::new(SonyNotes),
            Arc::new(FujiNotes),
            Arc::new(HeaderedNotes),
        ];
        for parser in builtin {
            for vendor in parser.vendors() {
                registry.0.insert(*vendor, parser.clone());
            }
        }
        registry
    }

    /// Register a parser for its vendors. Fails without registering anything when one of them
    /// already has a parser.
    pub fn register(&mut self, parser: Arc<dyn MakerNoteParser>) -> MetadataResult<()> {
        for vendor in parser.vendors() {
            if self.0.contains_key(vendor) {
                return Err(MetadataError::General(format!(
                    "maker-note parser for {vendor:?} already registered"
                )));
            }
        }
        for vendor in parser.vendors() {
            self.0.insert(*vendor, parser.clone());
        }
        Ok(())
    }

    /// Drop the parser for `vendor`, returning it.
    pub fn unregister(&mut self, vendor: Vendor) -> Option<Arc<dyn MakerNoteParser>> {
        self.0.remove(&vendor)
    }

    /// The parser for `vendor`.
    pub fn get(&self, vendor: Vendor) -> Option<&Arc<dyn MakerNoteParser>> {
        self.0.get(&vendor)
    }
}

impl Default for MakerNoteRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

fn unknown_header(vendor: Vendor) -> MetadataError {
    MetadataError::General(format!("unknown {vendor:?} maker notes header"))
}

/// `Nikon\0\2` wraps a complete TIFF stream; `Nikon\0\1` is a bare directory after the
/// signature. Anything else is a bare directory at the start.
#[derive(Debug, Clone, Copy)]
struct NikonNotes;

const NIKON_HEADER_SIZE: usize = 10;

impl MakerNoteParser for NikonNotes {
    fn vendors(&self) -> &'static [Vendor] {
        &[Vendor::Nikon]
    }

    fn layout(&self, buf: &ByteBuffer, offset: usize) -> MetadataResult<MakerNoteLayout> {
        if buf.get_equals(offset, b"Nikon\0\x02") {
            let tiff = offset + NIKON_HEADER_SIZE;
            let marker = buf.get_bytes(tiff, 2)?;
            Ok(MakerNoteLayout {
                ifd_offset: tiff + TIFF_HEADER_SIZE,
                value_base: Some(tiff),
                endianness: Endianness::from_marker([marker[0], marker[1]]),
            })
        } else if buf.get_equals(offset, b"Nikon\0\x01") {
            Ok(MakerNoteLayout::at(offset + TIFF_HEADER_SIZE))
        } else {
            Ok(MakerNoteLayout::at(offset))
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct OlympusNotes;

impl MakerNoteParser for OlympusNotes {
    fn vendors(&self) -> &'static [Vendor] {
        &[Vendor::Olympus]
    }

    fn layout(&self, buf: &ByteBuffer, offset: usize) -> MetadataResult<MakerNoteLayout> {
        if buf.get_equals(offset, b"OLYMPUS") || buf.get_equals(offset, b"OM SYSTEM") {
            // Self-contained: offsets count from the signature.
            let skip = if buf.get_equals(offset, b"OLYMPUS") { 12 } else { 16 };
            Ok(MakerNoteLayout::at(offset + skip).relative_to(offset))
        } else if buf.get_equals(offset, b"OLYMP") {
            Ok(MakerNoteLayout::at(offset + 8))
        } else {
            Err(unknown_header(Vendor::Olympus))
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PentaxNotes;

impl MakerNoteParser for PentaxNotes {
    fn vendors(&self) -> &'static [Vendor] {
        &[Vendor::Pentax]
    }

    fn layout(&self, buf: &ByteBuffer, offset: usize) -> MetadataResult<MakerNoteLayout> {
        if buf.get_equals(offset, b"AOC") {
            return Ok(MakerNoteLayout::at(offset + 6).relative_to(offset));
        }
        let signature = buf.get_string(offset, 7)?.to_ascii_uppercase();
        if signature == "PENTAX " || signature == "SAMSUNG" || signature.starts_with("RICOH") {
            Ok(MakerNoteLayout::at(offset + 10).relative_to(offset))
        } else {
            Err(unknown_header(Vendor::Pentax))
        }
    }
}

/// JPEG maker notes carry `SONY DSC \0\0\0`; raw files have no header.
#[derive(Debug, Clone, Copy)]
struct SonyNotes;

impl MakerNoteParser for SonyNotes {
    fn vendors(&self) -> &'static [Vendor] {
        &[Vendor::Sony]
    }

    fn layout(&self, buf: &ByteBuffer, offset: usize) -> MetadataResult<MakerNoteLayout> {
        if buf.get_equals(offset, b"SONY") {
            Ok(MakerNoteLayout::at(offset + 12))
        } else {
            Ok(MakerNoteLayout::at(offset))
        }
    }
}

/// `FUJIFILM`, then a little-endian offset to the directory, counted from the signature.
#[derive(Debug, Clone, Copy)]
struct FujiNotes;

impl MakerNoteParser for FujiNotes {
    fn vendors(&self) -> &'static [Vendor] {
        &[Vendor::Fuji]
    }

    fn layout(&self, buf: &ByteBuffer, offset: usize) -> MetadataResult<MakerNoteLayout> {
        if !buf.get_equals(offset, b"FUJIFILM") {
            return Err(unknown_header(Vendor::Fuji));
        }
        let mut le = buf.clone();
        le.set_endianness(Endianness::LittleEndian);
        let ifd = le.get_u32(offset + 8)? as usize;
        Ok(MakerNoteLayout {
            ifd_offset: offset + ifd,
            value_base: Some(offset),
            endianness: Some(Endianness::LittleEndian),
        })
    }
}

/// Vendors whose notes are a bare directory or one behind a fixed 12-byte signature.
#[derive(Debug, Clone, Copy)]
struct HeaderedNotes;

impl MakerNoteParser for HeaderedNotes {
    fn vendors(&self) -> &'static [Vendor] {
        &[Vendor::Canon, Vendor::Minolta, Vendor::Panasonic]
    }

    fn layout(&self, buf: &ByteBuffer, offset: usize) -> MetadataResult<MakerNoteLayout> {
        if buf.get_equals(offset, b"Panasonic") {
            Ok(MakerNoteLayout::at(offset + 12))
        } else {
            Ok(MakerNoteLayout::at(offset))
        }
    }
}

/// Decode the maker-note blob at `offset` into the container, returning the kind it went to.
///
/// The buffer's byte order is restored before returning.
pub(crate) fn read_maker_notes(
    parser: &mut BinaryDirectoryParser<'_>,
    container: &MetadataContainer,
    make: Option<&str>,
    offset: usize,
    len: usize,
) -> MetadataResult<DirectoryKind> {
    let options = parser.options();
    let vendor = options
        .probe
        .probe(make, parser.buffer(), offset)
        .unwrap_or(Vendor::Unknown);
    log::debug!("maker notes at {offset} ({len} bytes) read as {vendor:?}");

    let kind = DirectoryKind::MakerNotes(vendor);
    let dir = container.get_or_create(kind);
    let layout = match options.maker_notes.get(vendor) {
        Some(vendor_parser) => {
            if vendor_parser.read(parser.buffer(), offset, len, &dir)? {
                return Ok(kind);
            }
            match vendor_parser.layout(parser.buffer(), offset) {
                Ok(layout) => layout,
                Err(e) => {
                    parser.report(format!("{e}, reading the notes as a bare directory"));
                    MakerNoteLayout::at(offset)
                }
            }
        }
        None => MakerNoteLayout::at(offset),
    };

    let previous = match layout.endianness {
        Some(endianness) => {
            let previous = parser.buffer().endianness();
            parser.buffer_mut().set_endianness(endianness);
            previous
        }
        None => parser.buffer_mut().probe_endianness(layout.ifd_offset)?,
    };
    let base = layout.value_base.unwrap_or(parser.base());
    let result = parser.parse_directory(
        layout.ifd_offset,
        base,
        &dir,
        &mut GenericHandler(dir.clone()),
    );
    parser.buffer_mut().set_endianness(previous);
    result.map(|_| kind)
}

#[cfg(test)]
mod test {
    use bytes::Bytes;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct TestyNotes;

    impl MakerNoteParser for TestyNotes {
        fn vendors(&self) -> &'static [Vendor] {
            &[Vendor::Canon, Vendor::Unknown]
        }

        fn layout(&self, _buf: &ByteBuffer, offset: usize) -> MetadataResult<MakerNoteLayout> {
            Ok(MakerNoteLayout::at(offset))
        }
    }

    fn buffer(data: &'static [u8]) -> ByteBuffer {
        ByteBuffer::new(Bytes::from_static(data), Endianness::LittleEndian)
    }

    #[test]
    fn test_register() {
        let mut registry = MakerNoteRegistry::new();
        assert!(registry.0.is_empty());
        let a1: Arc<dyn MakerNoteParser> = Arc::new(TestyNotes);
        registry.register(a1.clone()).unwrap();
        assert_eq!(registry.0.len(), TestyNotes.vendors().len());
        for vendor in a1.vendors() {
            assert!(Arc::ptr_eq(registry.get(*vendor).unwrap(), &a1));
        }
    }

    #[test]
    fn test_overlap_err() {
        let mut registry = MakerNoteRegistry::with_builtin();
        assert!(matches!(
            registry.register(Arc::new(TestyNotes)).unwrap_err(),
            MetadataError::General(_)
        ));
        // Nothing was registered for Unknown either.
        assert!(registry.get(Vendor::Unknown).is_none());
        registry.unregister(Vendor::Canon);
        registry.register(Arc::new(TestyNotes)).unwrap();
    }

    #[test]
    fn test_probe() {
        let buf = buffer(b"Nikon\0\x02\x10\0\0MM\0\x2a\0\0\0\x08");
        assert_eq!(SignatureProbe.probe(None, &buf, 0), Some(Vendor::Nikon));
        let buf = buffer(b"\x05\x00\x01\x00");
        assert_eq!(SignatureProbe.probe(Some("Canon"), &buf, 0), Some(Vendor::Canon));
        assert_eq!(SignatureProbe.probe(Some("Acme"), &buf, 0), None);
    }

    #[test]
    fn test_layouts() {
        let buf = buffer(b"Nikon\0\x02\x10\0\0MM\0\x2a\0\0\0\x08\0\0");
        assert_eq!(
            NikonNotes.layout(&buf, 0).unwrap(),
            MakerNoteLayout {
                ifd_offset: 18,
                value_base: Some(10),
                endianness: Some(Endianness::BigEndian),
            }
        );

        let buf = buffer(b"OLYMPUS\0II\x03\0\0\0");
        assert_eq!(OlympusNotes.layout(&buf, 0).unwrap().ifd_offset, 12);
        assert_eq!(OlympusNotes.layout(&buf, 0).unwrap().value_base, Some(0));
        assert!(OlympusNotes.layout(&buffer(b"XXXXXXXX"), 0).is_err());

        let buf = buffer(b"AOC\0MM\0\0");
        assert_eq!(PentaxNotes.layout(&buf, 0).unwrap().ifd_offset, 6);

        let buf = buffer(b"FUJIFILM\x0c\0\0\0\0\0");
        let layout = FujiNotes.layout(&buf, 0).unwrap();
        assert_eq!(layout.ifd_offset, 12);
        assert_eq!(layout.endianness, Some(Endianness::LittleEndian));
    }
}
