//! Typed metadata cells.

use std::fmt;

use bytes::Bytes;
use chrono::NaiveDateTime;

use crate::error::{MetadataError, MetadataResult};
use crate::kind::DirectoryKind;
use crate::tiff::tags::{TagId, Type};

/// EXIF's textual date layout.
pub const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// The closed set of value types a [`MetadataValue`] can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaType {
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// 8-bit signed integer
    SByte,
    /// 8-bit unsigned integer
    UByte,
    /// 16-bit signed integer
    SShort,
    /// 16-bit unsigned integer
    UShort,
    /// 32-bit signed integer
    SLong,
    /// 32-bit unsigned integer
    ULong,
    /// 64-bit signed integer
    SLong8,
    /// 64-bit unsigned integer
    ULong8,
    /// Signed fraction
    SRational,
    /// Unsigned fraction
    URational,
    /// NUL-terminated text
    String,
    /// A timestamp; stored on disk as text
    Date,
    /// Opaque bytes
    Undefined,
    /// 32-bit directory offset
    Ifd,
    /// 64-bit directory offset
    Ifd64,
    /// Anything else
    Unknown,
}

impl MetaType {
    /// The wire type this maps to. `Date` is written as `ASCII`; `Unknown` has no wire form.
    pub fn field_type(&self) -> Option<Type> {
        Some(match self {
            MetaType::Float => Type::FLOAT,
            MetaType::Double => Type::DOUBLE,
            MetaType::SByte => Type::SBYTE,
            MetaType::UByte => Type::BYTE,
            MetaType::SShort => Type::SSHORT,
            MetaType::UShort => Type::SHORT,
            MetaType::SLong => Type::SLONG,
            MetaType::ULong => Type::LONG,
            MetaType::SLong8 => Type::SLONG8,
            MetaType::ULong8 => Type::LONG8,
            MetaType::SRational => Type::SRATIONAL,
            MetaType::URational => Type::RATIONAL,
            MetaType::String | MetaType::Date => Type::ASCII,
            MetaType::Undefined => Type::UNDEFINED,
            MetaType::Ifd => Type::IFD,
            MetaType::Ifd64 => Type::IFD8,
            MetaType::Unknown => return None,
        })
    }

    /// On-disk width of one element. `Date` and `Unknown` have none.
    pub fn byte_width(&self) -> Option<usize> {
        match self {
            MetaType::Date | MetaType::Unknown => None,
            other => other.field_type().map(|t| t.byte_width()),
        }
    }

    /// Whether this is one of the integer types.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            MetaType::SByte
                | MetaType::UByte
                | MetaType::SShort
                | MetaType::UShort
                | MetaType::SLong
                | MetaType::ULong
                | MetaType::SLong8
                | MetaType::ULong8
        )
    }

    /// Whether a value of `other` may be merged into a slot declared as `self`.
    pub fn is_compatible_with(&self, other: MetaType) -> bool {
        use MetaType::*;
        if *self == other {
            return true;
        }
        match (*self, other) {
            (a, b) if a.is_integer() && b.is_integer() => true,
            (UByte, Undefined) | (Undefined, UByte) => true,
            (ULong, Ifd) | (Ifd, ULong) => true,
            (ULong8, Ifd64) | (Ifd64, ULong8) => true,
            (Float, Double) | (Double, Float) => true,
            (SRational, URational) | (URational, SRational) => true,
            _ => false,
        }
    }
}

/// A fraction as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational<T> {
    /// Numerator
    pub numerator: T,
    /// Denominator
    pub denominator: T,
}

impl<T> Rational<T> {
    /// Create a new fraction.
    pub fn new(numerator: T, denominator: T) -> Self {
        Self {
            numerator,
            denominator,
        }
    }
}

impl Rational<i64> {
    /// Floating point value; a zero denominator yields zero.
    pub fn as_f64(&self) -> f64 {
        if self.denominator == 0 {
            0.0
        } else {
            self.numerator as f64 / self.denominator as f64
        }
    }
}

impl<T: Into<f64> + Copy> Rational<T> {
    /// Floating point value; a zero denominator yields zero.
    pub fn to_f64(&self) -> f64 {
        let d: f64 = self.denominator.into();
        if d == 0.0 {
            0.0
        } else {
            self.numerator.into() / d
        }
    }
}

impl<T: fmt::Display> fmt::Display for Rational<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// The payload of a [`MetadataValue`].
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum ValueData {
    Float(Vec<f32>),
    Double(Vec<f64>),
    SByte(Vec<i8>),
    UByte(Vec<u8>),
    SShort(Vec<i16>),
    UShort(Vec<u16>),
    SLong(Vec<i32>),
    ULong(Vec<u32>),
    SLong8(Vec<i64>),
    ULong8(Vec<u64>),
    SRational(Vec<Rational<i32>>),
    URational(Vec<Rational<u32>>),
    String(Vec<String>),
    Date(NaiveDateTime),
    Undefined(Bytes),
    Ifd(Vec<u32>),
    Ifd64(Vec<u64>),
}

impl ValueData {
    /// The type tag of this payload.
    pub fn meta_type(&self) -> MetaType {
        match self {
            ValueData::Float(_) => MetaType::Float,
            ValueData::Double(_) => MetaType::Double,
            ValueData::SByte(_) => MetaType::SByte,
            ValueData::UByte(_) => MetaType::UByte,
            ValueData::SShort(_) => MetaType::SShort,
            ValueData::UShort(_) => MetaType::UShort,
            ValueData::SLong(_) => MetaType::SLong,
            ValueData::ULong(_) => MetaType::ULong,
            ValueData::SLong8(_) => MetaType::SLong8,
            ValueData::ULong8(_) => MetaType::ULong8,
            ValueData::SRational(_) => MetaType::SRational,
            ValueData::URational(_) => MetaType::URational,
            ValueData::String(_) => MetaType::String,
            ValueData::Date(_) => MetaType::Date,
            ValueData::Undefined(_) => MetaType::Undefined,
            ValueData::Ifd(_) => MetaType::Ifd,
            ValueData::Ifd64(_) => MetaType::Ifd64,
        }
    }

    /// Number of elements. Opaque bytes count one per byte.
    pub fn count(&self) -> usize {
        match self {
            ValueData::Float(v) => v.len(),
            ValueData::Double(v) => v.len(),
            ValueData::SByte(v) => v.len(),
            ValueData::UByte(v) => v.len(),
            ValueData::SShort(v) => v.len(),
            ValueData::UShort(v) => v.len(),
            ValueData::SLong(v) => v.len(),
            ValueData::ULong(v) => v.len(),
            ValueData::SLong8(v) => v.len(),
            ValueData::ULong8(v) => v.len(),
            ValueData::SRational(v) => v.len(),
            ValueData::URational(v) => v.len(),
            ValueData::String(v) => v.len(),
            ValueData::Date(_) => 1,
            ValueData::Undefined(v) => v.len(),
            ValueData::Ifd(v) => v.len(),
            ValueData::Ifd64(v) => v.len(),
        }
    }

    /// Element `idx` as a signed integer, if this is an integer-like payload.
    fn integer_at(&self, idx: usize) -> Option<i64> {
        match self {
            ValueData::SByte(v) => v.get(idx).map(|n| *n as i64),
            ValueData::UByte(v) => v.get(idx).map(|n| *n as i64),
            ValueData::SShort(v) => v.get(idx).map(|n| *n as i64),
            ValueData::UShort(v) => v.get(idx).map(|n| *n as i64),
            ValueData::SLong(v) => v.get(idx).map(|n| *n as i64),
            ValueData::ULong(v) | ValueData::Ifd(v) => v.get(idx).map(|n| *n as i64),
            ValueData::SLong8(v) => v.get(idx).copied(),
            ValueData::ULong8(v) | ValueData::Ifd64(v) => v.get(idx).map(|n| *n as i64),
            ValueData::Undefined(v) => v.get(idx).map(|n| *n as i64),
            _ => None,
        }
    }
}

/// One metadata cell: a typed, possibly multi-valued payload plus the bookkeeping a directory
/// stamps onto it.
///
/// The owning directory is recorded by kind rather than by reference; resolve it through the
/// [`MetadataContainer`](crate::MetadataContainer) holding the value.
#[derive(Debug, Clone)]
pub struct MetadataValue {
    data: ValueData,
    owner: Option<DirectoryKind>,
    tag: Option<TagId>,
    editable: bool,
    edited: bool,
    displayable: bool,
}

impl PartialEq for MetadataValue {
    /// Logical equality: only the payloads are compared.
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl MetadataValue {
    /// Wrap a payload, rejecting payloads with no elements.
    pub fn new(data: ValueData) -> MetadataResult<Self> {
        if data.count() == 0 {
            return Err(MetadataError::General(format!(
                "{:?} value needs at least one element",
                data.meta_type()
            )));
        }
        Ok(Self::from_data(data))
    }

    fn from_data(data: ValueData) -> Self {
        Self {
            data,
            owner: None,
            tag: None,
            editable: false,
            edited: false,
            displayable: true,
        }
    }

    /// A single unsigned 16-bit value.
    pub fn ushort(n: u16) -> Self {
        Self::from_data(ValueData::UShort(vec![n]))
    }

    /// A single signed 16-bit value.
    pub fn sshort(n: i16) -> Self {
        Self::from_data(ValueData::SShort(vec![n]))
    }

    /// A single unsigned 32-bit value.
    pub fn ulong(n: u32) -> Self {
        Self::from_data(ValueData::ULong(vec![n]))
    }

    /// A single unsigned fraction.
    pub fn urational(numerator: u32, denominator: u32) -> Self {
        Self::from_data(ValueData::URational(vec![Rational::new(
            numerator,
            denominator,
        )]))
    }

    /// A single signed fraction.
    pub fn srational(numerator: i32, denominator: i32) -> Self {
        Self::from_data(ValueData::SRational(vec![Rational::new(
            numerator,
            denominator,
        )]))
    }

    /// A single string.
    pub fn string(s: impl Into<String>) -> Self {
        Self::from_data(ValueData::String(vec![s.into()]))
    }

    /// A timestamp.
    pub fn date(d: NaiveDateTime) -> Self {
        Self::from_data(ValueData::Date(d))
    }

    /// Parse EXIF's `YYYY:MM:DD HH:MM:SS`, keeping the text as a string value if it doesn't parse.
    pub fn date_or_string(s: &str) -> Self {
        match NaiveDateTime::parse_from_str(s.trim(), EXIF_DATE_FORMAT) {
            Ok(d) => Self::date(d),
            Err(_) => Self::string(s),
        }
    }

    /// Opaque bytes. Fails when `bytes` is empty.
    pub fn undefined(bytes: impl Into<Bytes>) -> MetadataResult<Self> {
        Self::new(ValueData::Undefined(bytes.into()))
    }

    /// The payload.
    pub fn data(&self) -> &ValueData {
        &self.data
    }

    /// The payload's type.
    pub fn meta_type(&self) -> MetaType {
        self.data.meta_type()
    }

    /// Number of elements.
    pub fn count(&self) -> usize {
        self.data.count()
    }

    /// Replace the payload and mark the value edited.
    pub fn set(&mut self, data: ValueData) -> MetadataResult<()> {
        if data.count() == 0 {
            return Err(MetadataError::General(format!(
                "{:?} value needs at least one element",
                data.meta_type()
            )));
        }
        self.data = data;
        self.edited = true;
        Ok(())
    }

    /// Whether [`set`][Self::set] has been called.
    pub fn is_edited(&self) -> bool {
        self.edited
    }

    /// Whether the catalog allows users to edit this tag.
    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Whether the value should be shown to users. Exploded originals are hidden.
    pub fn is_displayable(&self) -> bool {
        self.displayable
    }

    pub(crate) fn set_displayable(&mut self, displayable: bool) {
        self.displayable = displayable;
    }

    /// The kind of directory holding this value, once stored.
    pub fn owner(&self) -> Option<DirectoryKind> {
        self.owner
    }

    /// The tag this value is stored under, once stored.
    pub fn tag(&self) -> Option<TagId> {
        self.tag
    }

    pub(crate) fn stamp(&mut self, owner: DirectoryKind, tag: TagId, editable: bool) {
        self.owner = Some(owner);
        self.tag = Some(tag);
        self.editable = editable;
    }

    /// Whether this is a string value whose text is empty, which directories treat as absence.
    pub fn is_empty_string(&self) -> bool {
        match &self.data {
            ValueData::String(v) => v.iter().all(|s| s.is_empty()),
            _ => false,
        }
    }

    /// First element as an integer. Fractions and floats truncate; text is parsed.
    pub fn as_i64(&self) -> Option<i64> {
        self.i64_at(0)
    }

    /// Element `idx` as an integer.
    pub fn i64_at(&self, idx: usize) -> Option<i64> {
        if let Some(n) = self.data.integer_at(idx) {
            return Some(n);
        }
        match &self.data {
            ValueData::Float(v) => v.get(idx).map(|f| *f as i64),
            ValueData::Double(v) => v.get(idx).map(|f| *f as i64),
            ValueData::SRational(v) => v.get(idx).map(|r| r.to_f64() as i64),
            ValueData::URational(v) => v.get(idx).map(|r| r.to_f64() as i64),
            ValueData::String(v) => v.get(idx).and_then(|s| s.trim().parse().ok()),
            _ => None,
        }
    }

    /// First element as an unsigned 32-bit integer, if it fits.
    pub fn as_u32(&self) -> Option<u32> {
        self.as_i64().and_then(|n| u32::try_from(n).ok())
    }

    /// Element `idx` of a fraction value, signedness erased.
    pub fn rational_at(&self, idx: usize) -> Option<Rational<i64>> {
        match &self.data {
            ValueData::SRational(v) => v
                .get(idx)
                .map(|r| Rational::new(r.numerator as i64, r.denominator as i64)),
            ValueData::URational(v) => v
                .get(idx)
                .map(|r| Rational::new(r.numerator as i64, r.denominator as i64)),
            _ => None,
        }
    }

    /// First element of a fraction value.
    pub fn as_rational(&self) -> Option<Rational<i64>> {
        self.rational_at(0)
    }

    /// First element as a float.
    pub fn as_f64(&self) -> Option<f64> {
        self.f64_at(0)
    }

    /// Element `idx` as a float.
    pub fn f64_at(&self, idx: usize) -> Option<f64> {
        match &self.data {
            ValueData::Float(v) => v.get(idx).map(|f| *f as f64),
            ValueData::Double(v) => v.get(idx).copied(),
            ValueData::SRational(v) => v.get(idx).map(|r| r.to_f64()),
            ValueData::URational(v) => v.get(idx).map(|r| r.to_f64()),
            ValueData::String(v) => v.get(idx).and_then(|s| s.trim().parse().ok()),
            _ => self.data.integer_at(idx).map(|n| n as f64),
        }
    }

    /// All elements as integers, for integer-like payloads.
    pub fn as_i64_vec(&self) -> Option<Vec<i64>> {
        (0..self.count())
            .map(|i| self.data.integer_at(i))
            .collect::<Option<Vec<_>>>()
    }

    /// The text of a string or date value.
    pub fn as_string(&self) -> Option<String> {
        match &self.data {
            ValueData::String(v) => v.first().cloned(),
            ValueData::Date(d) => Some(d.format(EXIF_DATE_FORMAT).to_string()),
            _ => None,
        }
    }

    /// The timestamp of a date value, or a string that parses as one.
    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match &self.data {
            ValueData::Date(d) => Some(*d),
            ValueData::String(v) => v
                .first()
                .and_then(|s| NaiveDateTime::parse_from_str(s.trim(), EXIF_DATE_FORMAT).ok()),
            _ => None,
        }
    }

    /// Raw bytes of an opaque or byte value.
    pub fn as_bytes(&self) -> Option<Bytes> {
        match &self.data {
            ValueData::Undefined(b) => Some(b.clone()),
            ValueData::UByte(v) => Some(Bytes::copy_from_slice(v)),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join<T: fmt::Display>(f: &mut fmt::Formatter<'_>, v: &[T]) -> fmt::Result {
            for (i, item) in v.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{item}")?;
            }
            Ok(())
        }
        match &self.data {
            ValueData::Float(v) => join(f, v),
            ValueData::Double(v) => join(f, v),
            ValueData::SByte(v) => join(f, v),
            ValueData::UByte(v) => join(f, v),
            ValueData::SShort(v) => join(f, v),
            ValueData::UShort(v) => join(f, v),
            ValueData::SLong(v) => join(f, v),
            ValueData::ULong(v) | ValueData::Ifd(v) => join(f, v),
            ValueData::SLong8(v) => join(f, v),
            ValueData::ULong8(v) | ValueData::Ifd64(v) => join(f, v),
            ValueData::SRational(v) => join(f, v),
            ValueData::URational(v) => join(f, v),
            ValueData::String(v) => f.write_str(&v.join("; ")),
            ValueData::Date(d) => write!(f, "{}", d.format(EXIF_DATE_FORMAT)),
            ValueData::Undefined(b) => {
                for byte in b.iter() {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_compatibility() {
        assert!(MetaType::UByte.is_compatible_with(MetaType::SLong8));
        assert!(MetaType::UShort.is_compatible_with(MetaType::SLong));
        assert!(MetaType::Undefined.is_compatible_with(MetaType::UByte));
        assert!(MetaType::UByte.is_compatible_with(MetaType::Undefined));
        assert!(MetaType::ULong.is_compatible_with(MetaType::Ifd));
        assert!(MetaType::Ifd64.is_compatible_with(MetaType::ULong8));
        assert!(!MetaType::Undefined.is_compatible_with(MetaType::UShort));
        assert!(!MetaType::String.is_compatible_with(MetaType::Date));
        assert!(!MetaType::URational.is_compatible_with(MetaType::Double));
        assert!(MetaType::Date.is_compatible_with(MetaType::Date));
    }

    #[test]
    fn test_widths() {
        assert_eq!(MetaType::URational.byte_width(), Some(8));
        assert_eq!(MetaType::String.byte_width(), Some(1));
        assert_eq!(MetaType::Date.byte_width(), None);
        assert_eq!(MetaType::Unknown.field_type(), None);
    }

    #[test]
    fn test_empty_payload_rejected() {
        assert!(MetadataValue::new(ValueData::UShort(vec![])).is_err());
        assert!(MetadataValue::undefined(Bytes::new()).is_err());
        let mut v = MetadataValue::ushort(1);
        assert!(v.set(ValueData::ULong(vec![])).is_err());
        assert!(!v.is_edited());
    }

    #[test]
    fn test_set_marks_edited() {
        let mut v = MetadataValue::ushort(1);
        assert!(!v.is_edited());
        v.set(ValueData::UShort(vec![6])).unwrap();
        assert!(v.is_edited());
        assert_eq!(v.as_i64(), Some(6));
    }

    #[test]
    fn test_typed_views() {
        let r = MetadataValue::urational(28, 10);
        assert_eq!(r.as_f64(), Some(2.8));
        assert_eq!(r.as_i64(), Some(2));
        assert_eq!(r.to_string(), "28/10");

        let d = MetadataValue::date_or_string("2005:07:01 12:30:00");
        assert_eq!(d.meta_type(), MetaType::Date);
        assert_eq!(d.as_string().unwrap(), "2005:07:01 12:30:00");

        let s = MetadataValue::date_or_string("not a date");
        assert_eq!(s.meta_type(), MetaType::String);
        assert!(s.as_date().is_none());

        assert!(MetadataValue::string("").is_empty_string());
        assert!(!MetadataValue::string("x").is_empty_string());
    }
}
