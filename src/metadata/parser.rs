use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::directory::MetadataDirectory;
use crate::error::MetadataResult;
use crate::metadata::maker_notes::{MakerNoteProbe, MakerNoteRegistry, SignatureProbe};
use crate::reader::ByteBuffer;
use crate::tiff::tags::{exif, tiff, TagId, Type};
use crate::tiff::{TiffUnsupportedError, IFD_ENTRY_SIZE, TIFF_INLINE_VALUE_MAX_SIZE};
use crate::value::{MetadataValue, Rational, ValueData};

/// Directories claiming more entries than this are truncated.
pub const DEFAULT_MAX_ENTRY_COUNT: usize = 1000;

/// Values larger than this are skipped.
pub const DEFAULT_MAX_VALUE_SIZE: usize = 1 << 20;

/// Sub-directories nested deeper than this are skipped.
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// ASCII tags decoded as dates.
const DATE_TAGS: [TagId; 3] = [
    tiff::DATE_TIME,
    exif::DATE_TIME_ORIGINAL,
    exif::DATE_TIME_DIGITIZED,
];

/// A cooperative cancellation flag, checked between entries and between directories.
///
/// Clones share the same flag, so a caller can keep one and hand another to the parser.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    /// A flag that is not raised.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every parser holding this flag to stop at its next check.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether [`stop`](Self::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Receives recoverable problems found while reading. Nothing reported here aborts a read.
pub trait BadMetadataSink: Debug + Send + Sync {
    /// Record one problem.
    fn report(&self, message: &str);
}

/// Reports bad metadata through the `log` facade at `warn` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl BadMetadataSink for LogSink {
    fn report(&self, message: &str) {
        log::warn!("bad metadata: {message}");
    }
}

/// Keeps every reported message.
#[derive(Debug, Default)]
pub struct CollectingSink(Mutex<Vec<String>>);

impl CollectingSink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The messages reported so far.
    pub fn messages(&self) -> Vec<String> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl BadMetadataSink for CollectingSink {
    fn report(&self, message: &str) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

/// Knobs for a read.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Entry counts above this are clamped.
    pub max_entry_count: usize,
    /// Values whose encoded size exceeds this are skipped.
    pub max_value_size: usize,
    /// How many directories may be open at once, counting the one a chain walk is on.
    pub max_depth: usize,
    /// Checked between entries and between directories.
    pub stop: StopFlag,
    /// Where recoverable problems go.
    pub sink: Arc<dyn BadMetadataSink>,
    /// Vendor maker-note parsers.
    pub maker_notes: MakerNoteRegistry,
    /// Chooses the vendor of a maker-note blob.
    pub probe: Arc<dyn MakerNoteProbe>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_entry_count: DEFAULT_MAX_ENTRY_COUNT,
            max_value_size: DEFAULT_MAX_VALUE_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
            stop: StopFlag::new(),
            sink: Arc::new(LogSink),
            maker_notes: MakerNoteRegistry::default(),
            probe: Arc::new(SignatureProbe),
        }
    }
}

impl ParseOptions {
    /// Replace the bad-metadata sink.
    pub fn with_sink(mut self, sink: Arc<dyn BadMetadataSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replace the stop flag.
    pub fn with_stop(mut self, stop: StopFlag) -> Self {
        self.stop = stop;
        self
    }
}

/// One directory entry, located but not yet decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    /// The tag number.
    pub tag: TagId,
    /// The wire type.
    pub field_type: Type,
    /// Number of elements.
    pub count: usize,
    /// `count` times the width of `field_type`.
    pub byte_count: usize,
    /// Absolute position of the first value byte, inline or not.
    pub value_offset: usize,
    /// The first value read as a directory offset and corrected for the framing, for pointer
    /// tags.
    pub subdir_offset: Option<usize>,
}

/// Callbacks through which a format turns entries into directories.
pub trait DirectoryHandler {
    /// The directory to fill for the `index`th directory of a chain.
    fn got_directory(&mut self, index: usize) -> Arc<MetadataDirectory>;

    /// Handle one entry of `dir`. Pointer tags typically recurse through
    /// [`BinaryDirectoryParser::parse_directory`]; everything else can go to
    /// [`BinaryDirectoryParser::put_generic`].
    ///
    /// An error skips this entry only.
    fn got_tag(
        &mut self,
        parser: &mut BinaryDirectoryParser<'_>,
        entry: &Entry,
        dir: &Arc<MetadataDirectory>,
    ) -> MetadataResult<()>;
}

/// Decodes every entry into one directory and follows no pointers.
#[derive(Debug, Clone)]
pub struct GenericHandler(pub Arc<MetadataDirectory>);

impl DirectoryHandler for GenericHandler {
    fn got_directory(&mut self, _index: usize) -> Arc<MetadataDirectory> {
        self.0.clone()
    }

    fn got_tag(
        &mut self,
        parser: &mut BinaryDirectoryParser<'_>,
        entry: &Entry,
        dir: &Arc<MetadataDirectory>,
    ) -> MetadataResult<()> {
        parser.put_generic(entry, dir)
    }
}

/// Walks chained IFDs in a buffer.
///
/// Offsets stored in the stream are relative to a framing base: 6 for an `Exif\0\0` APP1
/// payload, 0 for a bare TIFF stream. Directory positions handed to and returned by this type
/// are absolute.
///
/// ```
/// use std::sync::Arc;
///
/// use bytes::Bytes;
/// use ifd_metadata::metadata::{BinaryDirectoryParser, GenericHandler, ParseOptions};
/// use ifd_metadata::reader::{ByteBuffer, Endianness};
/// use ifd_metadata::{DirectoryKind, MetadataDirectory};
///
/// #[rustfmt::skip]
/// let data = Bytes::from_static(&[
///     b'I', b'I', 42, 0, 8, 0, 0, 0,
///     1, 0,
///     0x0F, 0x01, 2, 0, 5, 0, 0, 0, 26, 0, 0, 0,
///     0, 0, 0, 0,
///     b'A', b'c', b'm', b'e', 0,
/// ]);
/// let options = ParseOptions::default();
/// let mut parser =
///     BinaryDirectoryParser::new(ByteBuffer::new(data, Endianness::LittleEndian), 0, &options);
/// let dir = Arc::new(MetadataDirectory::new(DirectoryKind::Tiff));
/// parser.parse_all(8, &mut GenericHandler(dir.clone())).unwrap();
/// assert_eq!(dir.get_local(0x010F).unwrap().as_string().unwrap(), "Acme");
/// ```
pub struct BinaryDirectoryParser<'a> {
    buf: ByteBuffer,
    base: usize,
    options: &'a ParseOptions,
    visited: HashSet<usize>,
    depth: usize,
}

impl<'a> BinaryDirectoryParser<'a> {
    /// Parse `buf`, whose stored offsets are relative to `base`.
    pub fn new(buf: ByteBuffer, base: usize, options: &'a ParseOptions) -> Self {
        Self {
            buf,
            base,
            options,
            visited: HashSet::new(),
            depth: 0,
        }
    }

    /// The buffer being parsed.
    pub fn buffer(&self) -> &ByteBuffer {
        &self.buf
    }

    /// The buffer being parsed, for byte order changes. Callers restore what they change.
    pub fn buffer_mut(&mut self) -> &mut ByteBuffer {
        &mut self.buf
    }

    /// The framing base stored offsets are relative to.
    pub fn base(&self) -> usize {
        self.base
    }

    /// The options this parser was created with.
    pub fn options(&self) -> &'a ParseOptions {
        self.options
    }

    /// Whether the stop flag is raised.
    pub fn is_stopped(&self) -> bool {
        self.options.stop.is_stopped()
    }

    /// Forward a problem to the sink.
    pub fn report(&self, message: impl AsRef<str>) {
        self.options.sink.report(message.as_ref());
    }

    /// Walk the chain of directories starting at the absolute offset `first`, returning how
    /// many directories were read.
    pub fn parse_all(
        &mut self,
        first: usize,
        handler: &mut dyn DirectoryHandler,
    ) -> MetadataResult<usize> {
        let mut offset = first;
        let mut index = 0;
        loop {
            if self.visited.contains(&offset) {
                log::debug!("directory chain revisits offset {offset}, stopping");
                break;
            }
            let dir = handler.got_directory(index);
            let base = self.base;
            let Some(end) = self.parse_directory(offset, base, &dir, handler)? else {
                break;
            };
            index += 1;
            if self.is_stopped() {
                break;
            }
            let next = match self.buf.get_u32(end) {
                Ok(next) => next as usize,
                Err(e) => {
                    self.report(format!("missing next directory offset after {offset}: {e}"));
                    break;
                }
            };
            if next == 0 {
                break;
            }
            offset = next + self.base;
            if offset >= self.buf.limit() {
                self.report(format!(
                    "next directory offset {offset} is beyond the buffer ({})",
                    self.buf.limit()
                ));
                break;
            }
        }
        Ok(index)
    }

    /// Read the directory at the absolute offset `offset` into `dir`, resolving value offsets
    /// against `value_base`.
    ///
    /// Returns the position of the directory's next-offset field, or `None` when this directory
    /// was already read by this parser or is nested too deep.
    pub fn parse_directory(
        &mut self,
        offset: usize,
        value_base: usize,
        dir: &Arc<MetadataDirectory>,
        handler: &mut dyn DirectoryHandler,
    ) -> MetadataResult<Option<usize>> {
        if self.depth >= self.options.max_depth {
            self.report(format!(
                "{} directory at {offset} is nested more than {} deep, skipping",
                dir.kind(),
                self.options.max_depth
            ));
            return Ok(None);
        }
        if !self.visited.insert(offset) {
            self.report(format!("directory at {offset} is referenced twice"));
            return Ok(None);
        }
        self.depth += 1;
        let result = self.read_entries(offset, value_base, dir, handler);
        self.depth -= 1;
        result.map(Some)
    }

    fn read_entries(
        &mut self,
        offset: usize,
        value_base: usize,
        dir: &Arc<MetadataDirectory>,
        handler: &mut dyn DirectoryHandler,
    ) -> MetadataResult<usize> {
        let mut count = self.buf.get_u16(offset)? as usize;
        if count > self.options.max_entry_count {
            self.report(format!(
                "{} directory at {offset} claims {count} entries, reading {}",
                dir.kind(),
                self.options.max_entry_count
            ));
            count = self.options.max_entry_count;
        }
        log::debug!("reading {} directory at {offset}: {count} entries", dir.kind());

        for i in 0..count {
            let position = entry_position(offset, i);
            match self.read_entry(position, value_base) {
                Ok(Some(entry)) => {
                    log::trace!(
                        "tag {:#06x} {:?} x{} at {}",
                        entry.tag,
                        entry.field_type,
                        entry.count,
                        entry.value_offset
                    );
                    if let Err(e) = handler.got_tag(self, &entry, dir) {
                        self.report(format!("{}: {e}", dir.tag_name(entry.tag)));
                    }
                }
                Ok(None) => {}
                Err(e) => self.report(format!("entry {i} of directory at {offset}: {e}")),
            }
            if self.is_stopped() {
                break;
            }
        }
        Ok(entry_position(offset, count))
    }

    /// Locate the entry at `position`. `None` means the entry is skipped.
    fn read_entry(&self, position: usize, value_base: usize) -> MetadataResult<Option<Entry>> {
        let tag = self.buf.get_u16(position)? as TagId;
        let code = self.buf.get_u16(position + 2)?;
        let Some(field_type) = Type::from_u16(code) else {
            self.report(format!(
                "{} for tag {tag:#06x}",
                TiffUnsupportedError::UnknownFieldType(code)
            ));
            return Ok(None);
        };
        let count = self.buf.get_u32(position + 4)? as usize;
        let Some(byte_count) = count.checked_mul(field_type.byte_width()) else {
            self.report(format!("tag {tag:#06x} has an impossible count {count}"));
            return Ok(None);
        };
        if byte_count == 0 {
            return Ok(None);
        }

        let value_offset = if byte_count <= TIFF_INLINE_VALUE_MAX_SIZE {
            position + 8
        } else {
            let offset = self.buf.get_u32(position + 8)? as usize + value_base;
            match offset.checked_add(byte_count) {
                Some(end) if end <= self.buf.limit() => offset,
                _ => {
                    self.report(format!(
                        "value of tag {tag:#06x} at {offset} ({byte_count} bytes) is beyond the buffer"
                    ));
                    return Ok(None);
                }
            }
        };
        let subdir_offset = self
            .buf
            .get_u32(value_offset)
            .ok()
            .map(|raw| raw as usize + value_base);

        Ok(Some(Entry {
            tag,
            field_type,
            count,
            byte_count,
            value_offset,
            subdir_offset,
        }))
    }

    /// Decode `entry` generically and store it in `dir`, skipping oversized values.
    pub fn put_generic(&self, entry: &Entry, dir: &MetadataDirectory) -> MetadataResult<()> {
        if entry.byte_count > self.options.max_value_size {
            self.report(format!(
                "value of {} is {} bytes, skipping",
                dir.tag_name(entry.tag),
                entry.byte_count
            ));
            return Ok(());
        }
        let value = self.decode_value(entry)?;
        dir.put(entry.tag, value);
        Ok(())
    }

    /// Decode the value of `entry` according to its wire type.
    pub fn decode_value(&self, entry: &Entry) -> MetadataResult<MetadataValue> {
        let buf = &self.buf;
        let offset = entry.value_offset;
        let count = entry.count;
        let data = match entry.field_type {
            Type::ASCII => {
                let s = buf.get_string(offset, entry.byte_count)?;
                return Ok(if DATE_TAGS.contains(&entry.tag) {
                    MetadataValue::date_or_string(&s)
                } else {
                    MetadataValue::string(s)
                });
            }
            Type::BYTE => ValueData::UByte(buf.get_bytes(offset, count)?.to_vec()),
            Type::UNDEFINED => ValueData::Undefined(buf.get_bytes(offset, count)?),
            Type::SBYTE => ValueData::SByte(read_array(count, 1, offset, |p| buf.get_i8(p))?),
            Type::SHORT => ValueData::UShort(read_array(count, 2, offset, |p| buf.get_u16(p))?),
            Type::SSHORT => ValueData::SShort(read_array(count, 2, offset, |p| buf.get_i16(p))?),
            Type::LONG => ValueData::ULong(read_array(count, 4, offset, |p| buf.get_u32(p))?),
            Type::SLONG => ValueData::SLong(read_array(count, 4, offset, |p| buf.get_i32(p))?),
            Type::IFD => ValueData::Ifd(read_array(count, 4, offset, |p| buf.get_u32(p))?),
            Type::FLOAT => ValueData::Float(read_array(count, 4, offset, |p| buf.get_f32(p))?),
            Type::DOUBLE => ValueData::Double(read_array(count, 8, offset, |p| buf.get_f64(p))?),
            Type::LONG8 => ValueData::ULong8(read_array(count, 8, offset, |p| buf.get_u64(p))?),
            Type::SLONG8 => ValueData::SLong8(read_array(count, 8, offset, |p| buf.get_i64(p))?),
            Type::IFD8 => ValueData::Ifd64(read_array(count, 8, offset, |p| buf.get_u64(p))?),
            Type::RATIONAL => ValueData::URational(read_array(count, 8, offset, |p| {
                Ok(Rational::new(buf.get_u32(p)?, buf.get_u32(p + 4)?))
            })?),
            Type::SRATIONAL => ValueData::SRational(read_array(count, 8, offset, |p| {
                Ok(Rational::new(buf.get_i32(p)?, buf.get_i32(p + 4)?))
            })?),
        };
        MetadataValue::new(data)
    }
}

/// Absolute position of entry `index` of the directory at `offset`.
pub fn entry_position(offset: usize, index: usize) -> usize {
    offset + 2 + index * IFD_ENTRY_SIZE
}

fn read_array<T>(
    count: usize,
    width: usize,
    offset: usize,
    read: impl Fn(usize) -> MetadataResult<T>,
) -> MetadataResult<Vec<T>> {
    (0..count).map(|i| read(offset + i * width)).collect()
}
