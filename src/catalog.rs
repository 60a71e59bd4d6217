//! Per-kind tag catalogs: ID, name, declared type and editability.
//!
//! Each catalog is built on first use and never changes afterwards, so references handed out by
//! [`catalog_for`] live for the whole process.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::kind::{DirectoryKind, Vendor};
use crate::tiff::tags::TagId;
use crate::value::MetaType;

/// Describes one tag of a directory kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagDescriptor {
    /// Numeric ID.
    pub id: TagId,
    /// Canonical name.
    pub name: &'static str,
    /// Declared type.
    pub meta_type: MetaType,
    /// Whether users may edit the value.
    pub editable: bool,
}

/// ID ↔ descriptor lookup for one directory kind.
#[derive(Debug, Default)]
pub struct TagCatalog {
    by_id: HashMap<TagId, TagDescriptor>,
    by_name: HashMap<&'static str, TagId>,
}

impl TagCatalog {
    fn from_table(table: &[(TagId, &'static str, MetaType, bool)]) -> Self {
        let mut catalog = TagCatalog::default();
        for &(id, name, meta_type, editable) in table {
            catalog.by_id.insert(
                id,
                TagDescriptor {
                    id,
                    name,
                    meta_type,
                    editable,
                },
            );
            catalog.by_name.insert(name, id);
        }
        catalog
    }

    /// Descriptor for `id`.
    pub fn get(&self, id: TagId) -> Option<&TagDescriptor> {
        self.by_id.get(&id)
    }

    /// Descriptor for `name`.
    pub fn get_by_name(&self, name: &str) -> Option<&TagDescriptor> {
        self.by_name.get(name).and_then(|id| self.by_id.get(id))
    }

    /// Whether `id` is declared editable. Unknown tags are not.
    pub fn is_editable(&self, id: TagId) -> bool {
        self.get(id).is_some_and(|d| d.editable)
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the catalog declares no tags.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

mod tables {
    use crate::tiff::tags::{canon, ciff, core, dng, exif, gps, interop, iptc, tiff, TagId};
    use crate::value::MetaType::{self, *};

    #[rustfmt::skip]
    pub(super) const TIFF_TAGS: &[(TagId, &str, MetaType, bool)] = &[
        (tiff::NEW_SUBFILE_TYPE,               "NewSubfileType",              ULong,     false),
        (tiff::IMAGE_WIDTH,                    "ImageWidth",                  ULong,     false),
        (tiff::IMAGE_LENGTH,                   "ImageLength",                 ULong,     false),
        (tiff::BITS_PER_SAMPLE,                "BitsPerSample",               UShort,    false),
        (tiff::COMPRESSION,                    "Compression",                 UShort,    false),
        (tiff::PHOTOMETRIC_INTERPRETATION,     "PhotometricInterpretation",   UShort,    false),
        (tiff::DOCUMENT_NAME,                  "DocumentName",                String,    true),
        (tiff::IMAGE_DESCRIPTION,              "ImageDescription",            String,    true),
        (tiff::MAKE,                           "Make",                        String,    false),
        (tiff::MODEL,                          "Model",                       String,    false),
        (tiff::STRIP_OFFSETS,                  "StripOffsets",                ULong,     false),
        (tiff::ORIENTATION,                    "Orientation",                 UShort,    true),
        (tiff::SAMPLES_PER_PIXEL,              "SamplesPerPixel",             UShort,    false),
        (tiff::ROWS_PER_STRIP,                 "RowsPerStrip",                ULong,     false),
        (tiff::STRIP_BYTE_COUNTS,              "StripByteCounts",             ULong,     false),
        (tiff::X_RESOLUTION,                   "XResolution",                 URational, false),
        (tiff::Y_RESOLUTION,                   "YResolution",                 URational, false),
        (tiff::PLANAR_CONFIGURATION,           "PlanarConfiguration",         UShort,    false),
        (tiff::RESOLUTION_UNIT,                "ResolutionUnit",              UShort,    false),
        (tiff::SOFTWARE,                       "Software",                    String,    false),
        (tiff::DATE_TIME,                      "DateTime",                    Date,      false),
        (tiff::ARTIST,                         "Artist",                      String,    true),
        (tiff::HOST_COMPUTER,                  "HostComputer",                String,    false),
        (tiff::PREDICTOR,                      "Predictor",                   UShort,    false),
        (tiff::TILE_WIDTH,                     "TileWidth",                   ULong,     false),
        (tiff::TILE_LENGTH,                    "TileLength",                  ULong,     false),
        (tiff::TILE_OFFSETS,                   "TileOffsets",                 ULong,     false),
        (tiff::TILE_BYTE_COUNTS,               "TileByteCounts",              ULong,     false),
        (tiff::SUB_IFDS,                       "SubIFDs",                     Ifd,       false),
        (tiff::EXTRA_SAMPLES,                  "ExtraSamples",                UShort,    false),
        (tiff::SAMPLE_FORMAT,                  "SampleFormat",                UShort,    false),
        (tiff::JPEG_INTERCHANGE_FORMAT,        "JPEGInterchangeFormat",       ULong,     false),
        (tiff::JPEG_INTERCHANGE_FORMAT_LENGTH, "JPEGInterchangeFormatLength", ULong,     false),
        (tiff::YCBCR_POSITIONING,              "YCbCrPositioning",            UShort,    false),
        (tiff::XMP_PACKET,                     "XMP",                         UByte,     false),
        (tiff::RATING,                         "Rating",                      UShort,    true),
        (tiff::RATING_PERCENT,                 "RatingPercent",               UShort,    true),
        (tiff::COPYRIGHT,                      "Copyright",                   String,    true),
        (tiff::IPTC_NAA,                       "IPTC-NAA",                    Undefined, false),
        (tiff::PHOTOSHOP_RESOURCES,            "Photoshop",                   UByte,     false),
        (tiff::EXIF_IFD_POINTER,               "ExifIFDPointer",              ULong,     false),
        (tiff::ICC_PROFILE,                    "ICCProfile",                  Undefined, false),
        (tiff::GPS_IFD_POINTER,                "GPSInfoIFDPointer",           ULong,     false),
    ];

    #[rustfmt::skip]
    pub(super) const EXIF_TAGS: &[(TagId, &str, MetaType, bool)] = &[
        (exif::EXPOSURE_TIME,                  "ExposureTime",                URational, false),
        (exif::FNUMBER,                        "FNumber",                     URational, false),
        (exif::EXPOSURE_PROGRAM,               "ExposureProgram",             UShort,    false),
        (exif::ISO_SPEED_RATINGS,              "ISOSpeedRatings",             UShort,    false),
        (exif::EXIF_VERSION,                   "ExifVersion",                 Undefined, false),
        (exif::DATE_TIME_ORIGINAL,             "DateTimeOriginal",            Date,      false),
        (exif::DATE_TIME_DIGITIZED,            "DateTimeDigitized",           Date,      false),
        (exif::SHUTTER_SPEED_VALUE,            "ShutterSpeedValue",           SRational, false),
        (exif::APERTURE_VALUE,                 "ApertureValue",               URational, false),
        (exif::EXPOSURE_BIAS_VALUE,            "ExposureBiasValue",           SRational, false),
        (exif::MAX_APERTURE_VALUE,             "MaxApertureValue",            URational, false),
        (exif::METERING_MODE,                  "MeteringMode",                UShort,    false),
        (exif::FLASH,                          "Flash",                       UShort,    false),
        (exif::FOCAL_LENGTH,                   "FocalLength",                 URational, false),
        (exif::MAKER_NOTE,                     "MakerNote",                   Undefined, false),
        (exif::USER_COMMENT,                   "UserComment",                 Undefined, true),
        (exif::SUB_SEC_TIME_ORIGINAL,          "SubSecTimeOriginal",          String,    false),
        (exif::FLASHPIX_VERSION,               "FlashpixVersion",             Undefined, false),
        (exif::COLOR_SPACE,                    "ColorSpace",                  UShort,    false),
        (exif::PIXEL_X_DIMENSION,              "PixelXDimension",             ULong,     false),
        (exif::PIXEL_Y_DIMENSION,              "PixelYDimension",             ULong,     false),
        (exif::INTEROPERABILITY_POINTER,       "InteroperabilityIFDPointer",  ULong,     false),
        (exif::FOCAL_PLANE_X_RESOLUTION,       "FocalPlaneXResolution",       URational, false),
        (exif::FOCAL_PLANE_Y_RESOLUTION,       "FocalPlaneYResolution",       URational, false),
        (exif::FOCAL_PLANE_RESOLUTION_UNIT,    "FocalPlaneResolutionUnit",    UShort,    false),
        (exif::EXPOSURE_MODE,                  "ExposureMode",                UShort,    false),
        (exif::WHITE_BALANCE,                  "WhiteBalance",                UShort,    false),
        (exif::FOCAL_LENGTH_IN_35MM_FILM,      "FocalLengthIn35mmFilm",       UShort,    false),
        (exif::CONTRAST,                       "Contrast",                    UShort,    false),
        (exif::SATURATION,                     "Saturation",                  UShort,    false),
        (exif::SHARPNESS,                      "Sharpness",                   UShort,    false),
        (exif::LENS_MAKE,                      "LensMake",                    String,    false),
        (exif::LENS_MODEL,                     "LensModel",                   String,    false),
    ];

    #[rustfmt::skip]
    pub(super) const GPS_TAGS: &[(TagId, &str, MetaType, bool)] = &[
        (gps::VERSION_ID,    "GPSVersionID",    UByte,     false),
        (gps::LATITUDE_REF,  "GPSLatitudeRef",  String,    false),
        (gps::LATITUDE,      "GPSLatitude",     URational, false),
        (gps::LONGITUDE_REF, "GPSLongitudeRef", String,    false),
        (gps::LONGITUDE,     "GPSLongitude",    URational, false),
        (gps::ALTITUDE_REF,  "GPSAltitudeRef",  UByte,     false),
        (gps::ALTITUDE,      "GPSAltitude",     URational, false),
        (gps::TIME_STAMP,    "GPSTimeStamp",    URational, false),
        (gps::MAP_DATUM,     "GPSMapDatum",     String,    false),
        (gps::DATE_STAMP,    "GPSDateStamp",    String,    false),
    ];

    #[rustfmt::skip]
    pub(super) const INTEROP_TAGS: &[(TagId, &str, MetaType, bool)] = &[
        (interop::INDEX,   "InteroperabilityIndex",   String,    false),
        (interop::VERSION, "InteroperabilityVersion", Undefined, false),
    ];

    #[rustfmt::skip]
    pub(super) const IPTC_TAGS: &[(TagId, &str, MetaType, bool)] = &[
        (iptc::CODED_CHARACTER_SET, "CodedCharacterSet", Undefined, false),
        (iptc::OBJECT_NAME,         "ObjectName",        String,    true),
        (iptc::URGENCY,             "Urgency",           String,    true),
        (iptc::KEYWORDS,            "Keywords",          String,    true),
        (iptc::DATE_CREATED,        "DateCreated",       String,    true),
        (iptc::BY_LINE,             "By-line",           String,    true),
        (iptc::CITY,                "City",              String,    true),
        (iptc::COPYRIGHT_NOTICE,    "CopyrightNotice",   String,    true),
        (iptc::CAPTION_ABSTRACT,    "Caption-Abstract",  String,    true),
    ];

    #[rustfmt::skip]
    pub(super) const DNG_TAGS: &[(TagId, &str, MetaType, bool)] = &[
        (dng::DNG_VERSION,            "DNGVersion",           UByte,     false),
        (dng::DNG_BACKWARD_VERSION,   "DNGBackwardVersion",   UByte,     false),
        (dng::UNIQUE_CAMERA_MODEL,    "UniqueCameraModel",    String,    false),
        (dng::LOCALIZED_CAMERA_MODEL, "LocalizedCameraModel", String,    false),
        (dng::LENS_INFO,              "LensInfo",             URational, false),
        (dng::ORIGINAL_RAW_FILE_NAME, "OriginalRawFileName",  String,    false),
    ];

    #[rustfmt::skip]
    pub(super) const CORE_TAGS: &[(TagId, &str, MetaType, bool)] = &[
        (core::IMAGE_WIDTH,          "ImageWidth",          UShort, false),
        (core::IMAGE_HEIGHT,         "ImageHeight",         UShort, false),
        (core::ORIENTATION,          "Orientation",         UShort, true),
        (core::ORIGINAL_ORIENTATION, "OriginalOrientation", UShort, false),
        (core::RATING,               "Rating",              UShort, true),
        (core::CAPTION,              "Caption",             String, true),
        (core::TITLE,                "Title",               String, true),
        (core::ARTIST,               "Artist",              String, true),
        (core::COPYRIGHT,            "Copyright",           String, true),
        (core::CAPTURE_DATE_TIME,    "CaptureDateTime",     Date,   false),
        (core::APERTURE,             "Aperture",            Float,  false),
        (core::SHUTTER_SPEED,        "ShutterSpeed",        Float,  false),
        (core::ISO,                  "ISO",                 UShort, false),
        (core::FOCAL_LENGTH,         "FocalLength",         Float,  false),
        (core::LENS,                 "Lens",                String, false),
        (core::CAMERA,               "Camera",              String, false),
        (core::FLASH,                "Flash",               UShort, false),
        (core::COLOR_TEMPERATURE,    "ColorTemperature",    UShort, false),
    ];

    #[rustfmt::skip]
    pub(super) const CIFF_TAGS: &[(TagId, &str, MetaType, bool)] = &[
        (ciff::FILE_DESCRIPTION,         "FileDescription",       String, false),
        (ciff::MAKE_MODEL,               "MakeModel",             String, false),
        (ciff::FIRMWARE_VERSION,         "FirmwareVersion",       String, false),
        (ciff::OWNER_NAME,               "OwnerName",             String, false),
        (ciff::IMAGE_TYPE,               "ImageType",             String, false),
        (ciff::IMAGE_FILE_NAME,          "ImageFileName",         String, false),
        (ciff::IMAGE_DESCRIPTION,        "ImageDescription",      String, false),
        (ciff::BASE_ISO,                 "BaseISO",               UShort, false),
        (ciff::CAMERA_SETTINGS,          "CameraSettings",        UShort, false),
        (ciff::SHOT_INFO,                "ShotInfo",              UShort, false),
        (ciff::FOCAL_LENGTH,             "FocalLength",           UShort, false),
        (ciff::SENSOR_INFO,              "SensorInfo",            UShort, false),
        (ciff::CUSTOM_FUNCTIONS,         "CustomFunctions",       UShort, false),
        (ciff::PICTURE_INFO,             "PictureInfo",           UShort, false),
        (ciff::COLOR_TEMPERATURE,        "ColorTemperature",      UShort, false),
        (ciff::COLOR_SPACE,              "ColorSpace",            UShort, false),
        (ciff::IMAGE_FORMAT,             "ImageFormat",           ULong,  false),
        (ciff::CAPTURED_TIME,            "CapturedTime",          Date,   false),
        (ciff::IMAGE_INFO,               "ImageInfo",             ULong,  false),
        (ciff::FILE_NUMBER,              "FileNumber",            ULong,  false),
        (ciff::PREVIEW_IMAGE_LENGTH,     "PreviewImageLength",    ULong,  false),
        (ciff::PREVIEW_IMAGE_OFFSET,     "PreviewImageOffset",    ULong,  false),
        (ciff::CS_FLASH_MODE,            "FlashMode",             SShort, false),
        (ciff::CS_CONTRAST,              "Contrast",              SShort, false),
        (ciff::CS_SATURATION,            "Saturation",            SShort, false),
        (ciff::CS_SHARPNESS,             "Sharpness",             SShort, false),
        (ciff::CS_ISO,                   "CameraISO",             SShort, false),
        (ciff::CS_METERING_MODE,         "MeteringMode",          SShort, false),
        (ciff::CS_EXPOSURE_MODE,         "ExposureMode",          SShort, false),
        (ciff::CS_LENS_TYPE,             "LensType",              UShort, false),
        (ciff::CS_LONG_FOCAL_LENGTH,     "LongFocalLength",       UShort, false),
        (ciff::CS_SHORT_FOCAL_LENGTH,    "ShortFocalLength",      UShort, false),
        (ciff::FL_FOCAL_LENGTH,          "FocalLengthValue",      UShort, false),
        (ciff::FL_FOCAL_PLANE_X_SIZE,    "FocalPlaneXSize",       UShort, false),
        (ciff::FL_FOCAL_PLANE_Y_SIZE,    "FocalPlaneYSize",       UShort, false),
        (ciff::II_IMAGE_WIDTH,           "ImageWidth",            ULong,  false),
        (ciff::II_IMAGE_HEIGHT,          "ImageHeight",           ULong,  false),
        (ciff::II_ROTATION,              "Rotation",              SLong,  false),
        (ciff::II_COMPONENT_BIT_DEPTH,   "ComponentBitDepth",     ULong,  false),
        (ciff::PI_IMAGE_WIDTH,           "PictureWidth",          UShort, false),
        (ciff::PI_IMAGE_HEIGHT,          "PictureHeight",         UShort, false),
        (ciff::SI_ISO,                   "ShotISO",               SShort, false),
        (ciff::SI_FNUMBER,               "ShotFNumber",           SShort, false),
        (ciff::SI_SHUTTER_SPEED,         "ShotShutterSpeed",      SShort, false),
        (ciff::SI_AUTO_ROTATE,           "AutoRotate",            SShort, false),
    ];

    #[rustfmt::skip]
    pub(super) const CANON_TAGS: &[(TagId, &str, MetaType, bool)] = &[
        (canon::CAMERA_SETTINGS,  "CanonCameraSettings",  SShort, false),
        (canon::FOCAL_LENGTH,     "CanonFocalLength",     UShort, false),
        (canon::SHOT_INFO,        "CanonShotInfo",        SShort, false),
        (canon::IMAGE_TYPE,       "CanonImageType",       String, false),
        (canon::FIRMWARE_VERSION, "CanonFirmwareVersion", String, false),
        (canon::OWNER_NAME,       "OwnerName",            String, false),
        (canon::MODEL_ID,         "CanonModelID",         ULong,  false),
        (canon::LENS_MODEL,       "LensModel",            String, false),
    ];
}

use tables::*;

static TIFF: LazyLock<TagCatalog> = LazyLock::new(|| TagCatalog::from_table(TIFF_TAGS));
static EXIF: LazyLock<TagCatalog> = LazyLock::new(|| {
    // IFD0 of an EXIF segment carries the TIFF tags too.
    let mut table = TIFF_TAGS.to_vec();
    table.extend_from_slice(EXIF_TAGS);
    TagCatalog::from_table(&table)
});
static GPS: LazyLock<TagCatalog> = LazyLock::new(|| TagCatalog::from_table(GPS_TAGS));
static INTEROP: LazyLock<TagCatalog> = LazyLock::new(|| TagCatalog::from_table(INTEROP_TAGS));
static IPTC: LazyLock<TagCatalog> = LazyLock::new(|| TagCatalog::from_table(IPTC_TAGS));
static DNG: LazyLock<TagCatalog> = LazyLock::new(|| TagCatalog::from_table(DNG_TAGS));
static CORE: LazyLock<TagCatalog> = LazyLock::new(|| TagCatalog::from_table(CORE_TAGS));
static CIFF: LazyLock<TagCatalog> = LazyLock::new(|| TagCatalog::from_table(CIFF_TAGS));
static CANON: LazyLock<TagCatalog> = LazyLock::new(|| TagCatalog::from_table(CANON_TAGS));
static EMPTY: LazyLock<TagCatalog> = LazyLock::new(TagCatalog::default);

/// The catalog for `kind`.
///
/// Kinds without a dedicated table (most maker notes) get an empty catalog: their values are kept
/// but not editable and named by number only.
pub fn catalog_for(kind: DirectoryKind) -> &'static TagCatalog {
    match kind {
        DirectoryKind::Tiff | DirectoryKind::SubIfd => &TIFF,
        DirectoryKind::Exif | DirectoryKind::SubExif => &EXIF,
        DirectoryKind::Gps => &GPS,
        DirectoryKind::Interop => &INTEROP,
        DirectoryKind::Iptc => &IPTC,
        DirectoryKind::Dng => &DNG,
        DirectoryKind::Core => &CORE,
        DirectoryKind::Ciff => &CIFF,
        DirectoryKind::MakerNotes(Vendor::Canon) => &CANON,
        DirectoryKind::MakerNotes(_) => &EMPTY,
    }
}

/// Tag name for display, falling back to the hexadecimal ID.
pub fn tag_name(kind: DirectoryKind, id: TagId) -> String {
    match catalog_for(kind).get(id) {
        Some(d) => d.name.to_string(),
        None => format!("{kind}:{id:#06x}"),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tiff::tags::{exif, gps, tiff};

    #[test]
    fn test_lookups() {
        let exif_catalog = catalog_for(DirectoryKind::Exif);
        assert_eq!(exif_catalog.get(exif::FNUMBER).unwrap().name, "FNumber");
        // EXIF's IFD0 shares the TIFF table.
        assert_eq!(exif_catalog.get(tiff::MAKE).unwrap().meta_type, MetaType::String);
        assert_eq!(
            exif_catalog.get_by_name("DateTimeOriginal").unwrap().id,
            exif::DATE_TIME_ORIGINAL
        );
        assert!(exif_catalog.is_editable(tiff::ARTIST));
        assert!(!exif_catalog.is_editable(tiff::MAKE));
        assert!(!exif_catalog.is_editable(0xFFFF));
    }

    #[test]
    fn test_shared_statics() {
        assert!(std::ptr::eq(
            catalog_for(DirectoryKind::SubExif),
            catalog_for(DirectoryKind::Exif)
        ));
        assert!(catalog_for(DirectoryKind::MakerNotes(Vendor::Sony)).is_empty());
        assert_eq!(tag_name(DirectoryKind::Gps, gps::LATITUDE), "GPSLatitude");
        assert_eq!(tag_name(DirectoryKind::Gps, 0x99), "GPS:0x0099");
    }
}
