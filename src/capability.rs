//! Capabilities: the questions a directory can answer about the image, and which kinds answer
//! them at what priority.

use chrono::NaiveDateTime;

use crate::apex;
use crate::directory::{DirectoryRegistry, MetadataDirectory};
use crate::kind::{DirectoryKind, Vendor};
use crate::tiff::tags::{canon, ciff, core, exif, gps, iptc, tiff, TagId};

/// Priority of a provider with no particular claim.
pub const DEFAULT_PRIORITY: i32 = 0;

/// The closed set of image properties resolved across directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Capability {
    Aperture,
    ShutterSpeed,
    Iso,
    FocalLength,
    CaptureDateTime,
    Orientation,
    Rating,
    Flash,
    Artist,
    Caption,
    Copyright,
    Title,
    Lens,
    CameraMake,
    CameraModel,
    ImageWidth,
    ImageHeight,
    Resolution,
    ResolutionUnit,
    Gps,
    ColorTemperature,
}

/// Image orientation as TIFF encodes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageOrientation {
    /// Row 0 at the top, column 0 at the left.
    TopLeft,
    /// Mirrored horizontally.
    TopRight,
    /// Rotated 180°.
    BottomRight,
    /// Mirrored vertically.
    BottomLeft,
    /// Transposed.
    LeftTop,
    /// Needs a 90° clockwise rotation to display.
    RightTop,
    /// Transverse.
    RightBottom,
    /// Needs a 90° counter-clockwise rotation to display.
    LeftBottom,
    /// Missing or out of range.
    #[default]
    Unknown,
}

impl ImageOrientation {
    /// Map a TIFF `Orientation` value.
    pub fn from_tiff(value: i64) -> Self {
        match value {
            1 => ImageOrientation::TopLeft,
            2 => ImageOrientation::TopRight,
            3 => ImageOrientation::BottomRight,
            4 => ImageOrientation::BottomLeft,
            5 => ImageOrientation::LeftTop,
            6 => ImageOrientation::RightTop,
            7 => ImageOrientation::RightBottom,
            8 => ImageOrientation::LeftBottom,
            _ => ImageOrientation::Unknown,
        }
    }

    /// The TIFF `Orientation` value, if known.
    pub fn tiff_value(&self) -> Option<u16> {
        Some(match self {
            ImageOrientation::TopLeft => 1,
            ImageOrientation::TopRight => 2,
            ImageOrientation::BottomRight => 3,
            ImageOrientation::BottomLeft => 4,
            ImageOrientation::LeftTop => 5,
            ImageOrientation::RightTop => 6,
            ImageOrientation::RightBottom => 7,
            ImageOrientation::LeftBottom => 8,
            ImageOrientation::Unknown => return None,
        })
    }

    /// From a clockwise rotation in degrees. Only right angles map.
    pub fn from_degrees(degrees: i64) -> Self {
        match degrees.rem_euclid(360) {
            0 => ImageOrientation::TopLeft,
            90 => ImageOrientation::RightTop,
            180 => ImageOrientation::BottomRight,
            270 => ImageOrientation::LeftBottom,
            _ => ImageOrientation::Unknown,
        }
    }
}

/// TIFF `ResolutionUnit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResolutionUnit {
    /// No unit.
    #[default]
    None,
    /// Pixels per inch.
    Inch,
    /// Pixels per centimeter.
    Centimeter,
}

impl ResolutionUnit {
    /// Map a TIFF `ResolutionUnit` value.
    pub fn from_tiff(value: i64) -> Self {
        match value {
            2 => ResolutionUnit::Inch,
            3 => ResolutionUnit::Centimeter,
            _ => ResolutionUnit::None,
        }
    }

    /// The TIFF value, if a unit is set.
    pub fn tiff_value(&self) -> Option<u16> {
        match self {
            ResolutionUnit::None => None,
            ResolutionUnit::Inch => Some(2),
            ResolutionUnit::Centimeter => Some(3),
        }
    }
}

/// One provider's answer to a capability query.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum CapabilityValue {
    Float(f64),
    Integer(i64),
    Text(String),
    Date(NaiveDateTime),
    Orientation(ImageOrientation),
    Unit(ResolutionUnit),
    /// Latitude and longitude in decimal degrees.
    Location(f64, f64),
}

/// Whether directories of `kind` can answer `capability`.
pub fn provides(kind: DirectoryKind, capability: Capability) -> bool {
    use Capability as C;
    match kind {
        DirectoryKind::Core => true,
        DirectoryKind::Tiff | DirectoryKind::Exif | DirectoryKind::SubExif | DirectoryKind::Dng => {
            !matches!(capability, C::Gps | C::ColorTemperature)
        }
        DirectoryKind::Gps => matches!(capability, C::Gps),
        DirectoryKind::Iptc => {
            matches!(capability, C::Artist | C::Caption | C::Copyright | C::Title)
        }
        DirectoryKind::Ciff => matches!(
            capability,
            C::Aperture
                | C::ShutterSpeed
                | C::Iso
                | C::FocalLength
                | C::CaptureDateTime
                | C::Orientation
                | C::Artist
                | C::Caption
                | C::CameraMake
                | C::CameraModel
                | C::ImageWidth
                | C::ImageHeight
                | C::ColorTemperature
        ),
        DirectoryKind::MakerNotes(Vendor::Canon) => matches!(capability, C::Lens),
        DirectoryKind::Interop | DirectoryKind::SubIfd | DirectoryKind::MakerNotes(_) => false,
    }
}

/// Priority of `kind` as a provider of `capability`. Higher wins.
pub fn priority(kind: DirectoryKind, capability: Capability) -> i32 {
    match kind {
        // Core only echoes what other providers resolved, except for the lens, which it can't
        // know better than the maker notes.
        DirectoryKind::Core if capability == Capability::Lens => 0,
        DirectoryKind::Core => i32::MAX,
        DirectoryKind::Exif | DirectoryKind::SubExif => DEFAULT_PRIORITY + 10,
        DirectoryKind::Ciff => DEFAULT_PRIORITY - 10,
        _ => DEFAULT_PRIORITY,
    }
}

fn get_f64(dir: &MetadataDirectory, registry: &dyn DirectoryRegistry, tag: TagId) -> Option<f64> {
    dir.get(tag, registry)?.as_f64()
}

fn get_i64(dir: &MetadataDirectory, registry: &dyn DirectoryRegistry, tag: TagId) -> Option<i64> {
    dir.get(tag, registry)?.as_i64()
}

fn get_text(
    dir: &MetadataDirectory,
    registry: &dyn DirectoryRegistry,
    tag: TagId,
) -> Option<String> {
    let text = dir.get(tag, registry)?.as_string()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn positive_float(v: Option<f64>) -> Option<CapabilityValue> {
    v.filter(|f| *f > 0.0).map(CapabilityValue::Float)
}

fn positive_integer(v: Option<i64>) -> Option<CapabilityValue> {
    v.filter(|n| *n > 0).map(CapabilityValue::Integer)
}

/// Degrees/minutes/seconds rationals plus an `N`/`S` or `E`/`W` reference, as decimal degrees.
pub fn gps_coordinate(dms: &crate::value::MetadataValue, reference: Option<&str>) -> Option<f64> {
    let degrees = dms.f64_at(0)?;
    let minutes = dms.f64_at(1).unwrap_or(0.0);
    let seconds = dms.f64_at(2).unwrap_or(0.0);
    let value = degrees + minutes / 60.0 + seconds / 3600.0;
    match reference.map(|r| r.trim().to_ascii_uppercase()) {
        Some(r) if r == "S" || r == "W" => Some(-value),
        _ => Some(value),
    }
}

/// Ask `dir` about `capability`. `None` means the directory has no answer, which includes
/// holding only the capability's sentinel (zero, empty, unknown).
pub fn try_capability(
    capability: Capability,
    dir: &MetadataDirectory,
    registry: &dyn DirectoryRegistry,
) -> Option<CapabilityValue> {
    if !provides(dir.kind(), capability) {
        return None;
    }
    match dir.kind() {
        DirectoryKind::Core => core_capability(capability, dir, registry),
        DirectoryKind::Gps => gps_capability(dir, registry),
        DirectoryKind::Iptc => iptc_capability(capability, dir, registry),
        DirectoryKind::Ciff => ciff_capability(capability, dir, registry),
        DirectoryKind::MakerNotes(Vendor::Canon) => {
            get_text(dir, registry, canon::LENS_MODEL).map(CapabilityValue::Text)
        }
        _ => tiff_capability(capability, dir, registry),
    }
}

fn tiff_capability(
    capability: Capability,
    dir: &MetadataDirectory,
    registry: &dyn DirectoryRegistry,
) -> Option<CapabilityValue> {
    use Capability as C;
    let text = |tag| get_text(dir, registry, tag).map(CapabilityValue::Text);
    match capability {
        C::Aperture => positive_float(get_f64(dir, registry, exif::FNUMBER)).or_else(|| {
            let av = get_f64(dir, registry, exif::APERTURE_VALUE)?;
            positive_float(Some(apex::fix_fstop(2f64.powf(av / 2.0))))
        }),
        C::ShutterSpeed => positive_float(get_f64(dir, registry, exif::EXPOSURE_TIME)).or_else(|| {
            let tv = get_f64(dir, registry, exif::SHUTTER_SPEED_VALUE)?;
            positive_float(Some(2f64.powf(-tv)))
        }),
        C::Iso => positive_integer(get_i64(dir, registry, exif::ISO_SPEED_RATINGS)),
        C::FocalLength => positive_float(get_f64(dir, registry, exif::FOCAL_LENGTH)),
        C::CaptureDateTime => [exif::DATE_TIME_ORIGINAL, exif::DATE_TIME_DIGITIZED, tiff::DATE_TIME]
            .into_iter()
            .find_map(|tag| dir.get(tag, registry)?.as_date())
            .map(CapabilityValue::Date),
        C::Orientation => {
            let o = ImageOrientation::from_tiff(get_i64(dir, registry, tiff::ORIENTATION)?);
            (o != ImageOrientation::Unknown).then_some(CapabilityValue::Orientation(o))
        }
        C::Rating => positive_integer(get_i64(dir, registry, tiff::RATING)),
        C::Flash => get_i64(dir, registry, exif::FLASH)
            .filter(|n| *n >= 0)
            .map(CapabilityValue::Integer),
        C::Artist => text(tiff::ARTIST),
        C::Caption => text(tiff::IMAGE_DESCRIPTION),
        C::Copyright => text(tiff::COPYRIGHT),
        C::Title => text(tiff::DOCUMENT_NAME),
        C::Lens => text(exif::LENS_MODEL),
        C::CameraMake => text(tiff::MAKE),
        C::CameraModel => text(tiff::MODEL),
        C::ImageWidth => positive_integer(get_i64(dir, registry, exif::PIXEL_X_DIMENSION))
            .or_else(|| positive_integer(get_i64(dir, registry, tiff::IMAGE_WIDTH))),
        C::ImageHeight => positive_integer(get_i64(dir, registry, exif::PIXEL_Y_DIMENSION))
            .or_else(|| positive_integer(get_i64(dir, registry, tiff::IMAGE_LENGTH))),
        C::Resolution => positive_float(get_f64(dir, registry, tiff::X_RESOLUTION)),
        C::ResolutionUnit => {
            let unit = ResolutionUnit::from_tiff(get_i64(dir, registry, tiff::RESOLUTION_UNIT)?);
            (unit != ResolutionUnit::None).then_some(CapabilityValue::Unit(unit))
        }
        C::Gps | C::ColorTemperature => None,
    }
}

fn gps_capability(
    dir: &MetadataDirectory,
    registry: &dyn DirectoryRegistry,
) -> Option<CapabilityValue> {
    let lat = dir.get(gps::LATITUDE, registry)?;
    let lon = dir.get(gps::LONGITUDE, registry)?;
    let lat_ref = get_text(dir, registry, gps::LATITUDE_REF);
    let lon_ref = get_text(dir, registry, gps::LONGITUDE_REF);
    Some(CapabilityValue::Location(
        gps_coordinate(&lat, lat_ref.as_deref())?,
        gps_coordinate(&lon, lon_ref.as_deref())?,
    ))
}

fn iptc_capability(
    capability: Capability,
    dir: &MetadataDirectory,
    registry: &dyn DirectoryRegistry,
) -> Option<CapabilityValue> {
    let tag = match capability {
        Capability::Artist => iptc::BY_LINE,
        Capability::Caption => iptc::CAPTION_ABSTRACT,
        Capability::Copyright => iptc::COPYRIGHT_NOTICE,
        Capability::Title => iptc::OBJECT_NAME,
        _ => return None,
    };
    get_text(dir, registry, tag).map(CapabilityValue::Text)
}

/// CIFF's make/model record: make, NUL, model.
pub(crate) fn split_make_model(make_model: &str) -> (String, String) {
    let mut parts = make_model.splitn(2, '\0');
    let make = parts.next().unwrap_or_default().trim().to_string();
    let model = parts
        .next()
        .unwrap_or_default()
        .trim_end_matches('\0')
        .trim()
        .to_string();
    (make, model)
}

/// Orientation from the shot-info auto-rotate field.
pub(crate) fn auto_rotate_orientation(value: i64) -> ImageOrientation {
    match value {
        ciff::AUTO_ROTATE_NONE => ImageOrientation::TopLeft,
        ciff::AUTO_ROTATE_90CW => ImageOrientation::LeftBottom,
        ciff::AUTO_ROTATE_180 => ImageOrientation::BottomRight,
        ciff::AUTO_ROTATE_90CCW => ImageOrientation::RightTop,
        _ => ImageOrientation::Unknown,
    }
}

fn ciff_capability(
    capability: Capability,
    dir: &MetadataDirectory,
    registry: &dyn DirectoryRegistry,
) -> Option<CapabilityValue> {
    use Capability as C;
    let apex_at = |tag| get_i64(dir, registry, tag).map(|n| n as i32);
    match capability {
        C::Aperture => positive_float(apex_at(ciff::SI_FNUMBER).map(apex::fstop_from_apex)),
        C::ShutterSpeed => {
            let (n, d) = apex::shutter_speed_from_apex(apex_at(ciff::SI_SHUTTER_SPEED)?);
            positive_float(Some(n as f64 / d as f64))
        }
        C::Iso => positive_integer(apex_at(ciff::SI_ISO).map(|a| apex::iso_from_apex(a) as i64)),
        C::FocalLength => positive_float(get_f64(dir, registry, ciff::FL_FOCAL_LENGTH)),
        C::CaptureDateTime => dir
            .get(ciff::CAPTURED_TIME, registry)?
            .as_date()
            .map(CapabilityValue::Date),
        C::Orientation => {
            let o = match get_i64(dir, registry, ciff::II_ROTATION) {
                Some(degrees) => ImageOrientation::from_degrees(degrees),
                None => auto_rotate_orientation(get_i64(dir, registry, ciff::SI_AUTO_ROTATE)?),
            };
            (o != ImageOrientation::Unknown).then_some(CapabilityValue::Orientation(o))
        }
        C::Artist => get_text(dir, registry, ciff::OWNER_NAME).map(CapabilityValue::Text),
        C::Caption => get_text(dir, registry, ciff::IMAGE_DESCRIPTION).map(CapabilityValue::Text),
        C::CameraMake | C::CameraModel => {
            let raw = dir.get(ciff::MAKE_MODEL, registry)?;
            let raw = match raw.data() {
                crate::value::ValueData::String(parts) => parts.join("\0"),
                _ => return None,
            };
            let (make, model) = split_make_model(&raw);
            let text = if capability == C::CameraMake { make } else { model };
            (!text.is_empty()).then_some(CapabilityValue::Text(text))
        }
        C::ImageWidth => positive_integer(get_i64(dir, registry, ciff::II_IMAGE_WIDTH)),
        C::ImageHeight => positive_integer(get_i64(dir, registry, ciff::II_IMAGE_HEIGHT)),
        C::ColorTemperature => positive_integer(get_i64(dir, registry, ciff::COLOR_TEMPERATURE)),
        _ => None,
    }
}

fn core_capability(
    capability: Capability,
    dir: &MetadataDirectory,
    registry: &dyn DirectoryRegistry,
) -> Option<CapabilityValue> {
    use Capability as C;
    let text = |tag| get_text(dir, registry, tag).map(CapabilityValue::Text);
    match capability {
        C::Aperture => positive_float(get_f64(dir, registry, core::APERTURE)),
        C::ShutterSpeed => positive_float(get_f64(dir, registry, core::SHUTTER_SPEED)),
        C::Iso => positive_integer(get_i64(dir, registry, core::ISO)),
        C::FocalLength => positive_float(get_f64(dir, registry, core::FOCAL_LENGTH)),
        C::CaptureDateTime => dir
            .get(core::CAPTURE_DATE_TIME, registry)?
            .as_date()
            .map(CapabilityValue::Date),
        C::Orientation => {
            let o = ImageOrientation::from_tiff(get_i64(dir, registry, core::ORIENTATION)?);
            (o != ImageOrientation::Unknown).then_some(CapabilityValue::Orientation(o))
        }
        C::Rating => positive_integer(get_i64(dir, registry, core::RATING)),
        C::Flash => get_i64(dir, registry, core::FLASH)
            .filter(|n| *n >= 0)
            .map(CapabilityValue::Integer),
        C::Artist => text(core::ARTIST),
        C::Caption => text(core::CAPTION),
        C::Copyright => text(core::COPYRIGHT),
        C::Title => text(core::TITLE),
        C::Lens => text(core::LENS),
        C::ImageWidth => positive_integer(get_i64(dir, registry, core::IMAGE_WIDTH)),
        C::ImageHeight => positive_integer(get_i64(dir, registry, core::IMAGE_HEIGHT)),
        C::ColorTemperature => positive_integer(get_i64(dir, registry, core::COLOR_TEMPERATURE)),
        C::CameraMake | C::CameraModel | C::Resolution | C::ResolutionUnit | C::Gps => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::directory::NoFallback;
    use crate::value::MetadataValue;

    #[test]
    fn test_priorities() {
        assert_eq!(priority(DirectoryKind::Core, Capability::Iso), i32::MAX);
        assert_eq!(priority(DirectoryKind::Core, Capability::Lens), 0);
        assert!(
            priority(DirectoryKind::Exif, Capability::Iso)
                > priority(DirectoryKind::Tiff, Capability::Iso)
        );
        assert!(
            priority(DirectoryKind::Tiff, Capability::Iso)
                > priority(DirectoryKind::Ciff, Capability::Iso)
        );
    }

    #[test]
    fn test_tiff_answers() {
        let dir = MetadataDirectory::new(DirectoryKind::Exif);
        dir.put(exif::APERTURE_VALUE, MetadataValue::urational(3, 1));
        dir.put(tiff::ORIENTATION, MetadataValue::ushort(6));
        dir.put(exif::ISO_SPEED_RATINGS, MetadataValue::ushort(0));
        assert_eq!(
            try_capability(Capability::Aperture, &dir, &NoFallback),
            Some(CapabilityValue::Float(2.8))
        );
        assert_eq!(
            try_capability(Capability::Orientation, &dir, &NoFallback),
            Some(CapabilityValue::Orientation(ImageOrientation::RightTop))
        );
        // zero is the sentinel, not an answer
        assert_eq!(try_capability(Capability::Iso, &dir, &NoFallback), None);
        assert_eq!(try_capability(Capability::Gps, &dir, &NoFallback), None);
    }

    #[test]
    fn test_gps_location() {
        let dir = MetadataDirectory::new(DirectoryKind::Gps);
        dir.put(gps::LATITUDE_REF, MetadataValue::string("S"));
        dir.put(
            gps::LATITUDE,
            MetadataValue::new(crate::value::ValueData::URational(vec![
                crate::value::Rational::new(33, 1),
                crate::value::Rational::new(30, 1),
                crate::value::Rational::new(0, 1),
            ]))
            .unwrap(),
        );
        dir.put(gps::LONGITUDE, MetadataValue::urational(151, 1));
        assert_eq!(
            try_capability(Capability::Gps, &dir, &NoFallback),
            Some(CapabilityValue::Location(-33.5, 151.0))
        );
    }

    #[test]
    fn test_orientation_mappings() {
        assert_eq!(ImageOrientation::from_degrees(-90), ImageOrientation::LeftBottom);
        assert_eq!(ImageOrientation::from_degrees(90), ImageOrientation::RightTop);
        assert_eq!(ImageOrientation::from_degrees(45), ImageOrientation::Unknown);
        assert_eq!(ImageOrientation::from_tiff(9), ImageOrientation::Unknown);
        assert_eq!(ImageOrientation::BottomRight.tiff_value(), Some(3));
    }

    #[test]
    fn test_split_make_model() {
        assert_eq!(
            split_make_model("Canon\0Canon EOS D30\0"),
            ("Canon".to_string(), "Canon EOS D30".to_string())
        );
        assert_eq!(split_make_model("Canon"), ("Canon".to_string(), String::new()));
    }
}
