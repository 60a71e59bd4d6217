use std::sync::Arc;

use bytes::Bytes;

use crate::container::MetadataContainer;
use crate::directory::MetadataDirectory;
use crate::error::{MetadataError, MetadataResult};
use crate::kind::DirectoryKind;
use crate::metadata::maker_notes::read_maker_notes;
use crate::metadata::parser::{BinaryDirectoryParser, DirectoryHandler, Entry, ParseOptions};
use crate::reader::{ByteBuffer, Endianness};
use crate::tiff::tags::{dng, exif, tiff, TagId, Type};
use crate::tiff::{TiffFormatError, TIFF_HEADER_SIZE};
use crate::value::{MetadataValue, ValueData};

/// Tags that describe one particular image of a multi-image stream. They are not copied from
/// later directories into the first.
const IMAGE_STRUCTURE_TAGS: &[TagId] = &[
    tiff::NEW_SUBFILE_TYPE,
    tiff::SUBFILE_TYPE,
    tiff::IMAGE_WIDTH,
    tiff::IMAGE_LENGTH,
    tiff::BITS_PER_SAMPLE,
    tiff::COMPRESSION,
    tiff::PHOTOMETRIC_INTERPRETATION,
    tiff::STRIP_OFFSETS,
    tiff::ORIENTATION,
    tiff::SAMPLES_PER_PIXEL,
    tiff::ROWS_PER_STRIP,
    tiff::STRIP_BYTE_COUNTS,
    tiff::X_RESOLUTION,
    tiff::Y_RESOLUTION,
    tiff::PLANAR_CONFIGURATION,
    tiff::RESOLUTION_UNIT,
    tiff::TRANSFER_FUNCTION,
    tiff::PREDICTOR,
    tiff::PRIMARY_CHROMATICITIES,
    tiff::TILE_LENGTH,
    tiff::TILE_OFFSETS,
    tiff::TILE_BYTE_COUNTS,
    tiff::SUB_IFDS,
    tiff::YCBCR_COEFFICIENTS,
    tiff::YCBCR_SUB_SAMPLING,
    tiff::YCBCR_POSITIONING,
    tiff::REFERENCE_BLACK_WHITE,
    tiff::EXIF_IFD_POINTER,
    tiff::ICC_PROFILE,
    tiff::GPS_IFD_POINTER,
    exif::OECF,
    exif::COMPONENTS_CONFIGURATION,
    exif::COMPRESSED_BITS_PER_PIXEL,
    exif::MAKER_NOTE,
    exif::COLOR_SPACE,
    exif::PIXEL_X_DIMENSION,
    exif::PIXEL_Y_DIMENSION,
    exif::INTEROPERABILITY_POINTER,
    exif::CFA_PATTERN,
];

/// DNG's private tags live in `0xC612..=0xCFFF`.
fn is_dng_tag(tag: TagId) -> bool {
    (dng::DNG_VERSION..=0xCFFF).contains(&tag)
}

/// Entry point to reading a TIFF-structured stream.
///
/// ```
/// use bytes::Bytes;
/// use ifd_metadata::metadata::{IfdReader, ParseOptions};
/// use ifd_metadata::{DirectoryKind, MetadataContainer};
///
/// #[rustfmt::skip]
/// let data = Bytes::from_static(&[
///     b'M', b'M', 0, 42, 0, 0, 0, 8,
///     0, 1,
///     0x01, 0x12, 0, 3, 0, 0, 0, 1, 0, 6, 0, 0,
///     0, 0, 0, 0,
/// ]);
/// let reader = IfdReader::try_open(data, 0, &[42]).unwrap();
/// let container = MetadataContainer::new();
/// reader
///     .read_into(DirectoryKind::Tiff, &container, &ParseOptions::default())
///     .unwrap();
/// assert_eq!(container.orientation().tiff_value(), Some(6));
/// ```
#[derive(Debug, Clone)]
pub struct IfdReader {
    buf: ByteBuffer,
    base: usize,
    magic: u16,
    first_ifd_offset: usize,
}

impl IfdReader {
    /// Validate the TIFF header at `base`: the byte order marker, a magic number from `magics`,
    /// and the first directory offset.
    ///
    /// Stored offsets are taken to be relative to `base`.
    pub fn try_open(data: Bytes, base: usize, magics: &[u16]) -> MetadataResult<Self> {
        if data.len() < base + TIFF_HEADER_SIZE {
            return Err(TiffFormatError::TruncatedHeader {
                required_bytes: base + TIFF_HEADER_SIZE,
                actual_bytes: data.len(),
            }
            .into());
        }

        // Should be b"II" for little endian or b"MM" for big endian
        let marker = [data[base], data[base + 1]];
        let endianness = Endianness::from_marker(marker).ok_or(
            TiffFormatError::ByteOrderMarkerInvalid(u16::from_be_bytes(marker)),
        )?;
        let buf = ByteBuffer::new(data, endianness);

        let magic = buf.get_u16(base + 2)?;
        if !magics.contains(&magic) {
            return Err(TiffFormatError::TiffSignatureInvalid(magic).into());
        }
        let first_ifd_offset = buf.get_u32(base + 4)? as usize + base;

        Ok(Self {
            buf,
            base,
            magic,
            first_ifd_offset,
        })
    }

    /// Returns the endianness of the stream.
    pub fn endianness(&self) -> Endianness {
        self.buf.endianness()
    }

    /// The magic number found in the header.
    pub fn magic(&self) -> u16 {
        self.magic
    }

    /// Absolute position of the first directory.
    pub fn first_ifd_offset(&self) -> usize {
        self.first_ifd_offset
    }

    /// Read every directory of the stream into `container`.
    ///
    /// The first directory and its continuation go into `root`. Pointer tags lead to the EXIF,
    /// GPS, interoperability and sub-IFD directories; maker notes are decoded last, once the
    /// camera make is known.
    pub fn read_into(
        &self,
        root: DirectoryKind,
        container: &MetadataContainer,
        options: &ParseOptions,
    ) -> MetadataResult<()> {
        let mut parser = BinaryDirectoryParser::new(self.buf.clone(), self.base, options);
        let mut handler = IfdHandler {
            container,
            root,
            later_ifds: Vec::new(),
            maker_notes: None,
        };
        parser.parse_all(self.first_ifd_offset, &mut handler)?;
        handler.finish(&mut parser)
    }
}

/// Routes entries of a TIFF-structured stream to the container's directories.
struct IfdHandler<'c> {
    container: &'c MetadataContainer,
    root: DirectoryKind,
    /// IFD1 and later, merged into the root when the walk ends.
    later_ifds: Vec<Arc<MetadataDirectory>>,
    /// Position and size of the maker-note blob.
    maker_notes: Option<(usize, usize)>,
}

impl IfdHandler<'_> {
    /// Parse the directory `entry` points at into `child`. A child other than `parent` leaves a
    /// zero placeholder pointer of the entry's wire type behind for the encoder to patch.
    fn follow(
        &mut self,
        parser: &mut BinaryDirectoryParser<'_>,
        entry: &Entry,
        parent: &Arc<MetadataDirectory>,
        child: &Arc<MetadataDirectory>,
    ) -> MetadataResult<()> {
        let offset = entry
            .subdir_offset
            .filter(|offset| *offset < parser.buffer().limit())
            .ok_or_else(|| {
                MetadataError::General(format!(
                    "{} directory offset is beyond the buffer",
                    child.kind()
                ))
            })?;
        let base = parser.base();
        parser.parse_directory(offset, base, child, self)?;
        if !Arc::ptr_eq(parent, child) {
            let placeholder = match entry.field_type {
                Type::IFD => MetadataValue::new(ValueData::Ifd(vec![0]))?,
                _ => MetadataValue::ulong(0),
            };
            parent.put(entry.tag, placeholder);
        }
        Ok(())
    }

    fn follow_sub_ifds(
        &mut self,
        parser: &mut BinaryDirectoryParser<'_>,
        entry: &Entry,
    ) -> MetadataResult<()> {
        let sub = self.container.get_or_create(DirectoryKind::SubIfd);
        let offsets = parser.decode_value(entry)?.as_i64_vec().unwrap_or_default();
        let base = parser.base();
        for raw in offsets {
            let offset = raw as usize + base;
            if offset >= parser.buffer().limit() {
                parser.report(format!("sub-IFD offset {offset} is beyond the buffer"));
                continue;
            }
            parser.parse_directory(offset, base, &sub, self)?;
        }
        Ok(())
    }

    fn finish(&mut self, parser: &mut BinaryDirectoryParser<'_>) -> MetadataResult<()> {
        let ifd0 = self.container.get_or_create(self.root);
        for later in self.later_ifds.drain(..) {
            for (tag, value) in later.entries() {
                if !IMAGE_STRUCTURE_TAGS.contains(&tag) && !ifd0.contains(tag) {
                    ifd0.put_shared(tag, value);
                }
            }
        }

        if self.root == DirectoryKind::Tiff && ifd0.contains(dng::DNG_VERSION) {
            let dng = self.container.get_or_create(DirectoryKind::Dng);
            let tags: Vec<TagId> = ifd0.tags().into_iter().filter(|t| is_dng_tag(*t)).collect();
            ifd0.move_values(&dng, &tags);
        }

        if let Some((offset, len)) = self.maker_notes.take() {
            let make = self.container.camera_make();
            if let Err(e) = read_maker_notes(parser, self.container, make.as_deref(), offset, len)
            {
                parser.report(format!("maker notes: {e}"));
            }
        }
        Ok(())
    }
}

impl DirectoryHandler for IfdHandler<'_> {
    fn got_directory(&mut self, index: usize) -> Arc<MetadataDirectory> {
        if index == 0 {
            self.container.get_or_create(self.root)
        } else {
            let dir = Arc::new(MetadataDirectory::new(self.root));
            self.later_ifds.push(dir.clone());
            dir
        }
    }

    fn got_tag(
        &mut self,
        parser: &mut BinaryDirectoryParser<'_>,
        entry: &Entry,
        dir: &Arc<MetadataDirectory>,
    ) -> MetadataResult<()> {
        match entry.tag {
            tiff::EXIF_IFD_POINTER => {
                // A TIFF stream keeps EXIF apart; an EXIF stream folds it into IFD0.
                let child = match dir.kind() {
                    DirectoryKind::Tiff | DirectoryKind::Dng => {
                        self.container.get_or_create(DirectoryKind::Exif)
                    }
                    _ => dir.clone(),
                };
                self.follow(parser, entry, dir, &child)
            }
            tiff::GPS_IFD_POINTER => {
                let gps = self.container.get_or_create(DirectoryKind::Gps);
                self.follow(parser, entry, dir, &gps)
            }
            exif::INTEROPERABILITY_POINTER => {
                let interop = self.container.get_or_create(DirectoryKind::Interop);
                self.follow(parser, entry, dir, &interop)
            }
            tiff::SUB_IFDS => self.follow_sub_ifds(parser, entry),
            exif::MAKER_NOTE => {
                self.maker_notes = Some((entry.value_offset, entry.byte_count));
                Ok(())
            }
            _ => parser.put_generic(entry, dir),
        }
    }
}
