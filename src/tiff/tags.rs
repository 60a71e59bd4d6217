//! Field types and tag numbers.
//!
//! Tag numbers are plain [`TagId`] constants grouped per directory family. Values above `0xFFFF`
//! only occur for synthetic sub-field IDs produced by
//! [`MetadataDirectory::explode`](crate::MetadataDirectory::explode).

#![allow(missing_docs)]

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Numeric tag identifier.
///
/// Wider than the 16 bits stored on disk so that exploded sub-fields (`tag << 8 | index`) stay
/// addressable.
pub type TagId = u32;

/// The type of an IFD entry's value, as stored in the entry's second field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
#[non_exhaustive]
pub enum Type {
    /// 8-bit unsigned integer
    BYTE = 1,
    /// 8-bit byte that contains a 7-bit ASCII code; the last byte must be zero
    ASCII = 2,
    /// 16-bit unsigned integer
    SHORT = 3,
    /// 32-bit unsigned integer
    LONG = 4,
    /// Fraction stored as two 32-bit unsigned integers
    RATIONAL = 5,
    /// 8-bit signed integer
    SBYTE = 6,
    /// 8-bit byte that may contain anything, depending on the field
    UNDEFINED = 7,
    /// 16-bit signed integer
    SSHORT = 8,
    /// 32-bit signed integer
    SLONG = 9,
    /// Fraction stored as two 32-bit signed integers
    SRATIONAL = 10,
    /// 32-bit IEEE floating point
    FLOAT = 11,
    /// 64-bit IEEE floating point
    DOUBLE = 12,
    /// 32-bit unsigned integer (offset)
    IFD = 13,
    /// BigTIFF 64-bit unsigned integer
    LONG8 = 16,
    /// BigTIFF 64-bit signed integer
    SLONG8 = 17,
    /// BigTIFF 64-bit unsigned integer (offset)
    IFD8 = 18,
}

impl Type {
    /// Look up a wire code, returning `None` for codes outside the table.
    pub fn from_u16(code: u16) -> Option<Self> {
        Self::try_from(code).ok()
    }

    /// On-disk width of a single element of this type.
    pub fn byte_width(&self) -> usize {
        match self {
            Type::BYTE | Type::SBYTE | Type::ASCII | Type::UNDEFINED => 1,
            Type::SHORT | Type::SSHORT => 2,
            Type::LONG | Type::SLONG | Type::FLOAT | Type::IFD => 4,
            Type::LONG8
            | Type::SLONG8
            | Type::DOUBLE
            | Type::RATIONAL
            | Type::SRATIONAL
            | Type::IFD8 => 8,
        }
    }
}

/// Baseline and extended TIFF tags, which EXIF's IFD0 shares.
pub mod tiff {
    use super::TagId;

    pub const NEW_SUBFILE_TYPE: TagId = 0x00FE;
    pub const SUBFILE_TYPE: TagId = 0x00FF;
    pub const IMAGE_WIDTH: TagId = 0x0100;
    pub const IMAGE_LENGTH: TagId = 0x0101;
    pub const BITS_PER_SAMPLE: TagId = 0x0102;
    pub const COMPRESSION: TagId = 0x0103;
    pub const PHOTOMETRIC_INTERPRETATION: TagId = 0x0106;
    pub const THRESHHOLDING: TagId = 0x0107;
    pub const CELL_WIDTH: TagId = 0x0108;
    pub const CELL_LENGTH: TagId = 0x0109;
    pub const FILL_ORDER: TagId = 0x010A;
    pub const DOCUMENT_NAME: TagId = 0x010D;
    pub const IMAGE_DESCRIPTION: TagId = 0x010E;
    pub const MAKE: TagId = 0x010F;
    pub const MODEL: TagId = 0x0110;
    pub const STRIP_OFFSETS: TagId = 0x0111;
    pub const ORIENTATION: TagId = 0x0112;
    pub const SAMPLES_PER_PIXEL: TagId = 0x0115;
    pub const ROWS_PER_STRIP: TagId = 0x0116;
    pub const STRIP_BYTE_COUNTS: TagId = 0x0117;
    pub const X_RESOLUTION: TagId = 0x011A;
    pub const Y_RESOLUTION: TagId = 0x011B;
    pub const PLANAR_CONFIGURATION: TagId = 0x011C;
    pub const X_POSITION: TagId = 0x011E;
    pub const Y_POSITION: TagId = 0x011F;
    pub const FREE_OFFSETS: TagId = 0x0120;
    pub const FREE_BYTE_COUNTS: TagId = 0x0121;
    pub const GRAY_RESPONSE_UNIT: TagId = 0x0122;
    pub const GRAY_RESPONSE_CURVE: TagId = 0x0123;
    pub const T4_OPTIONS: TagId = 0x0124;
    pub const T6_OPTIONS: TagId = 0x0125;
    pub const RESOLUTION_UNIT: TagId = 0x0128;
    pub const TRANSFER_FUNCTION: TagId = 0x012D;
    pub const SOFTWARE: TagId = 0x0131;
    pub const DATE_TIME: TagId = 0x0132;
    pub const ARTIST: TagId = 0x013B;
    pub const HOST_COMPUTER: TagId = 0x013C;
    pub const PREDICTOR: TagId = 0x013D;
    pub const WHITE_POINT: TagId = 0x013E;
    pub const PRIMARY_CHROMATICITIES: TagId = 0x013F;
    pub const COLOR_MAP: TagId = 0x0140;
    pub const HALFTONE_HINTS: TagId = 0x0141;
    pub const TILE_WIDTH: TagId = 0x0142;
    pub const TILE_LENGTH: TagId = 0x0143;
    pub const TILE_OFFSETS: TagId = 0x0144;
    pub const TILE_BYTE_COUNTS: TagId = 0x0145;
    pub const SUB_IFDS: TagId = 0x014A;
    pub const DOT_RANGE: TagId = 0x0150;
    pub const EXTRA_SAMPLES: TagId = 0x0152;
    pub const SAMPLE_FORMAT: TagId = 0x0153;
    pub const TRANSFER_RANGE: TagId = 0x0156;
    pub const CLIP_PATH: TagId = 0x0157;
    pub const X_CLIP_PATH_UNITS: TagId = 0x0158;
    pub const Y_CLIP_PATH_UNITS: TagId = 0x0159;
    pub const INDEXED: TagId = 0x015A;
    pub const OPI_PROXY: TagId = 0x015F;
    pub const JPEG_PROC: TagId = 0x0200;
    pub const JPEG_INTERCHANGE_FORMAT: TagId = 0x0201;
    pub const JPEG_INTERCHANGE_FORMAT_LENGTH: TagId = 0x0202;
    pub const JPEG_RESTART_INTERVAL: TagId = 0x0203;
    pub const JPEG_LOSSLESS_PREDICTORS: TagId = 0x0205;
    pub const JPEG_POINT_TRANSFORMS: TagId = 0x0206;
    pub const JPEG_Q_TABLES: TagId = 0x0207;
    pub const JPEG_DC_TABLES: TagId = 0x0208;
    pub const JPEG_AC_TABLES: TagId = 0x0209;
    pub const YCBCR_COEFFICIENTS: TagId = 0x0211;
    pub const YCBCR_SUB_SAMPLING: TagId = 0x0212;
    pub const YCBCR_POSITIONING: TagId = 0x0213;
    pub const REFERENCE_BLACK_WHITE: TagId = 0x0214;
    pub const XMP_PACKET: TagId = 0x02BC;
    pub const RATING: TagId = 0x4746;
    pub const RATING_PERCENT: TagId = 0x4749;
    pub const COPYRIGHT: TagId = 0x8298;
    pub const IPTC_NAA: TagId = 0x83BB;
    pub const PHOTOSHOP_RESOURCES: TagId = 0x8649;
    pub const EXIF_IFD_POINTER: TagId = 0x8769;
    pub const ICC_PROFILE: TagId = 0x8773;
    pub const GPS_IFD_POINTER: TagId = 0x8825;
    pub const LIGHTZONE: TagId = 0xC6E7;
}

/// Tags of the EXIF sub-directory.
pub mod exif {
    use super::TagId;

    pub const EXPOSURE_TIME: TagId = 0x829A;
    pub const FNUMBER: TagId = 0x829D;
    pub const EXPOSURE_PROGRAM: TagId = 0x8822;
    pub const ISO_SPEED_RATINGS: TagId = 0x8827;
    pub const OECF: TagId = 0x8828;
    pub const EXIF_VERSION: TagId = 0x9000;
    pub const DATE_TIME_ORIGINAL: TagId = 0x9003;
    pub const DATE_TIME_DIGITIZED: TagId = 0x9004;
    pub const COMPONENTS_CONFIGURATION: TagId = 0x9101;
    pub const COMPRESSED_BITS_PER_PIXEL: TagId = 0x9102;
    pub const SHUTTER_SPEED_VALUE: TagId = 0x9201;
    pub const APERTURE_VALUE: TagId = 0x9202;
    pub const EXPOSURE_BIAS_VALUE: TagId = 0x9204;
    pub const MAX_APERTURE_VALUE: TagId = 0x9205;
    pub const METERING_MODE: TagId = 0x9207;
    pub const FLASH: TagId = 0x9209;
    pub const FOCAL_LENGTH: TagId = 0x920A;
    pub const SUBJECT_AREA: TagId = 0x9214;
    pub const MAKER_NOTE: TagId = 0x927C;
    pub const USER_COMMENT: TagId = 0x9286;
    pub const SUB_SEC_TIME_ORIGINAL: TagId = 0x9291;
    pub const FLASHPIX_VERSION: TagId = 0xA000;
    pub const COLOR_SPACE: TagId = 0xA001;
    pub const PIXEL_X_DIMENSION: TagId = 0xA002;
    pub const PIXEL_Y_DIMENSION: TagId = 0xA003;
    pub const INTEROPERABILITY_POINTER: TagId = 0xA005;
    pub const SPATIAL_FREQUENCY_RESPONSE: TagId = 0xA20C;
    pub const FOCAL_PLANE_X_RESOLUTION: TagId = 0xA20E;
    pub const FOCAL_PLANE_Y_RESOLUTION: TagId = 0xA20F;
    pub const FOCAL_PLANE_RESOLUTION_UNIT: TagId = 0xA210;
    pub const CFA_PATTERN: TagId = 0xA302;
    pub const EXPOSURE_MODE: TagId = 0xA402;
    pub const WHITE_BALANCE: TagId = 0xA403;
    pub const FOCAL_LENGTH_IN_35MM_FILM: TagId = 0xA405;
    pub const CONTRAST: TagId = 0xA408;
    pub const SATURATION: TagId = 0xA409;
    pub const SHARPNESS: TagId = 0xA40A;
    pub const LENS_MAKE: TagId = 0xA433;
    pub const LENS_MODEL: TagId = 0xA434;

    pub const CONTRAST_LOW: u16 = 1;
    pub const CONTRAST_HARD: u16 = 2;
    pub const SHARPNESS_SOFT: u16 = 1;
    pub const SHARPNESS_HARD: u16 = 2;
    pub const EXPOSURE_PROGRAM_MANUAL: u16 = 1;
    pub const EXPOSURE_PROGRAM_NORMAL: u16 = 2;
    pub const EXPOSURE_PROGRAM_SHUTTER_PRIORITY: u16 = 4;
    pub const EXPOSURE_PROGRAM_ACTION: u16 = 6;
    pub const METERING_MODE_CENTER_WEIGHTED_AVERAGE: u16 = 2;
    pub const METERING_MODE_PARTIAL: u16 = 6;
}

/// Tags of the GPS sub-directory.
pub mod gps {
    use super::TagId;

    pub const VERSION_ID: TagId = 0x0000;
    pub const LATITUDE_REF: TagId = 0x0001;
    pub const LATITUDE: TagId = 0x0002;
    pub const LONGITUDE_REF: TagId = 0x0003;
    pub const LONGITUDE: TagId = 0x0004;
    pub const ALTITUDE_REF: TagId = 0x0005;
    pub const ALTITUDE: TagId = 0x0006;
    pub const TIME_STAMP: TagId = 0x0007;
    pub const MAP_DATUM: TagId = 0x0012;
    pub const DATE_STAMP: TagId = 0x001D;
}

/// Tags of the interoperability sub-directory.
pub mod interop {
    use super::TagId;

    pub const INDEX: TagId = 0x0001;
    pub const VERSION: TagId = 0x0002;
}

/// IPTC IIM datasets, keyed `record << 8 | dataset`.
pub mod iptc {
    use super::TagId;

    pub const CODED_CHARACTER_SET: TagId = 0x015A;
    pub const OBJECT_NAME: TagId = 0x0205;
    pub const URGENCY: TagId = 0x020A;
    pub const KEYWORDS: TagId = 0x0219;
    pub const DATE_CREATED: TagId = 0x0237;
    pub const BY_LINE: TagId = 0x0250;
    pub const CITY: TagId = 0x025A;
    pub const COPYRIGHT_NOTICE: TagId = 0x0274;
    pub const CAPTION_ABSTRACT: TagId = 0x0278;

    /// `ESC % G`, the ISO 2022 designation for UTF-8.
    pub const UTF8_CHARSET: &[u8] = &[0x1B, 0x25, 0x47];
}

/// Tags of DNG's IFD0 additions.
pub mod dng {
    use super::TagId;

    pub const DNG_VERSION: TagId = 0xC612;
    pub const DNG_BACKWARD_VERSION: TagId = 0xC613;
    pub const UNIQUE_CAMERA_MODEL: TagId = 0xC614;
    pub const LOCALIZED_CAMERA_MODEL: TagId = 0xC615;
    pub const LENS_INFO: TagId = 0xC630;
    pub const ORIGINAL_RAW_FILE_NAME: TagId = 0xC68B;
}

/// Tags of the synthesized core directory, which holds the resolved value of each capability.
pub mod core {
    use super::TagId;

    pub const IMAGE_WIDTH: TagId = 0x01;
    pub const IMAGE_HEIGHT: TagId = 0x02;
    pub const ORIENTATION: TagId = 0x03;
    pub const ORIGINAL_ORIENTATION: TagId = 0x04;
    pub const RATING: TagId = 0x05;
    pub const CAPTION: TagId = 0x06;
    pub const TITLE: TagId = 0x07;
    pub const ARTIST: TagId = 0x08;
    pub const COPYRIGHT: TagId = 0x09;
    pub const CAPTURE_DATE_TIME: TagId = 0x0A;
    pub const APERTURE: TagId = 0x0B;
    pub const SHUTTER_SPEED: TagId = 0x0C;
    pub const ISO: TagId = 0x0D;
    pub const FOCAL_LENGTH: TagId = 0x0E;
    pub const LENS: TagId = 0x0F;
    pub const CAMERA: TagId = 0x10;
    pub const FLASH: TagId = 0x11;
    pub const COLOR_TEMPERATURE: TagId = 0x12;
}

/// Canon maker-note tags shared by CR2, CR3 and JPEG files.
pub mod canon {
    use super::TagId;

    pub const CAMERA_SETTINGS: TagId = 0x0001;
    pub const FOCAL_LENGTH: TagId = 0x0002;
    pub const SHOT_INFO: TagId = 0x0004;
    pub const IMAGE_TYPE: TagId = 0x0006;
    pub const FIRMWARE_VERSION: TagId = 0x0007;
    pub const OWNER_NAME: TagId = 0x0009;
    pub const MODEL_ID: TagId = 0x0010;
    pub const LENS_MODEL: TagId = 0x0095;
}

/// CIFF (CRW) tags: the low 14 bits of the tag bits, data type included.
pub mod ciff {
    use super::TagId;

    pub const FIELD_TYPE_UBYTE: TagId = 0x0000;
    pub const FIELD_TYPE_ASCII: TagId = 0x0800;
    pub const FIELD_TYPE_USHORT: TagId = 0x1000;
    pub const FIELD_TYPE_ULONG: TagId = 0x1800;
    pub const FIELD_TYPE_MIXED: TagId = 0x2000;
    pub const FIELD_TYPE_HEAP1: TagId = 0x2800;
    pub const FIELD_TYPE_HEAP2: TagId = 0x3000;

    pub const FILE_DESCRIPTION: TagId = FIELD_TYPE_ASCII | 0x05;
    pub const MAKE_MODEL: TagId = FIELD_TYPE_ASCII | 0x0A;
    pub const FIRMWARE_VERSION: TagId = FIELD_TYPE_ASCII | 0x0B;
    pub const OWNER_NAME: TagId = FIELD_TYPE_ASCII | 0x10;
    pub const IMAGE_TYPE: TagId = FIELD_TYPE_ASCII | 0x15;
    pub const IMAGE_FILE_NAME: TagId = FIELD_TYPE_ASCII | 0x16;
    pub const IMAGE_DESCRIPTION: TagId = FIELD_TYPE_HEAP1 | 0x04;
    pub const CAMERA_OBJECT: TagId = FIELD_TYPE_HEAP1 | 0x07;
    pub const SHOOTING_RECORD: TagId = FIELD_TYPE_HEAP2 | 0x02;
    pub const MEASURED_INFO: TagId = FIELD_TYPE_HEAP2 | 0x03;
    pub const CAMERA_SPECIFICATION: TagId = FIELD_TYPE_HEAP2 | 0x04;
    pub const IMAGE_PROPS: TagId = FIELD_TYPE_HEAP2 | 0x0A;
    pub const EXIF_INFORMATION: TagId = FIELD_TYPE_HEAP2 | 0x0B;
    pub const RAW_DATA: TagId = FIELD_TYPE_MIXED | 0x05;
    pub const JPG_FROM_RAW: TagId = FIELD_TYPE_MIXED | 0x07;
    pub const THUMBNAIL_IMAGE: TagId = FIELD_TYPE_MIXED | 0x08;
    pub const TARGET_IMAGE_TYPE: TagId = FIELD_TYPE_USHORT | 0x0A;
    pub const SHUTTER_RELEASE_METHOD: TagId = FIELD_TYPE_USHORT | 0x10;
    pub const SHUTTER_RELEASE_TIMING: TagId = FIELD_TYPE_USHORT | 0x11;
    pub const RELEASE_SETTING: TagId = FIELD_TYPE_USHORT | 0x16;
    pub const BASE_ISO: TagId = FIELD_TYPE_USHORT | 0x1C;
    pub const FOCAL_LENGTH: TagId = 0x1029;
    pub const SHOT_INFO: TagId = 0x102A;
    pub const CAMERA_SETTINGS: TagId = FIELD_TYPE_USHORT | 0x2D;
    pub const SENSOR_INFO: TagId = 0x1031;
    pub const CUSTOM_FUNCTIONS: TagId = 0x1033;
    pub const PICTURE_INFO: TagId = 0x1038;
    pub const COLOR_TEMPERATURE: TagId = FIELD_TYPE_USHORT | 0xAE;
    pub const COLOR_SPACE: TagId = FIELD_TYPE_USHORT | 0xB4;
    pub const IMAGE_FORMAT: TagId = FIELD_TYPE_ULONG | 0x03;
    pub const RECORD_ID: TagId = FIELD_TYPE_ULONG | 0x04;
    pub const SELF_TIMER_TIME: TagId = FIELD_TYPE_ULONG | 0x06;
    pub const TARGET_DISTANCE_SETTING: TagId = FIELD_TYPE_ULONG | 0x07;
    pub const BODY_ID: TagId = FIELD_TYPE_ULONG | 0x0B;
    pub const CAPTURED_TIME: TagId = FIELD_TYPE_ULONG | 0x0E;
    pub const IMAGE_INFO: TagId = FIELD_TYPE_ULONG | 0x10;
    pub const FLASH_INFO: TagId = FIELD_TYPE_ULONG | 0x13;
    pub const MEASURED_EV: TagId = FIELD_TYPE_ULONG | 0x14;
    pub const FILE_NUMBER: TagId = FIELD_TYPE_ULONG | 0x17;
    pub const EXPOSURE_INFO: TagId = FIELD_TYPE_ULONG | 0x18;
    pub const DECODER_TABLE: TagId = FIELD_TYPE_ULONG | 0x35;

    pub const PREVIEW_IMAGE_LENGTH: TagId = JPG_FROM_RAW << 8 | 0x01;
    pub const PREVIEW_IMAGE_OFFSET: TagId = JPG_FROM_RAW << 8 | 0x02;

    pub const CS_MACRO_MODE: TagId = CAMERA_SETTINGS << 8 | 0x01;
    pub const CS_SELF_TIMER_DELAY: TagId = CAMERA_SETTINGS << 8 | 0x02;
    pub const CS_QUALITY: TagId = CAMERA_SETTINGS << 8 | 0x03;
    pub const CS_FLASH_MODE: TagId = CAMERA_SETTINGS << 8 | 0x04;
    pub const CS_CONTINUOUS_DRIVE_MODE: TagId = CAMERA_SETTINGS << 8 | 0x05;
    pub const CS_FOCUS_MODE: TagId = CAMERA_SETTINGS << 8 | 0x07;
    pub const CS_IMAGE_SIZE: TagId = CAMERA_SETTINGS << 8 | 0x0A;
    pub const CS_EASY_SHOOTING_MODE: TagId = CAMERA_SETTINGS << 8 | 0x0B;
    pub const CS_DIGITAL_ZOOM: TagId = CAMERA_SETTINGS << 8 | 0x0C;
    pub const CS_CONTRAST: TagId = CAMERA_SETTINGS << 8 | 0x0D;
    pub const CS_SATURATION: TagId = CAMERA_SETTINGS << 8 | 0x0E;
    pub const CS_SHARPNESS: TagId = CAMERA_SETTINGS << 8 | 0x0F;
    pub const CS_ISO: TagId = CAMERA_SETTINGS << 8 | 0x10;
    pub const CS_METERING_MODE: TagId = CAMERA_SETTINGS << 8 | 0x11;
    pub const CS_FOCUS_TYPE: TagId = CAMERA_SETTINGS << 8 | 0x12;
    pub const CS_AF_POINT_SELECTED: TagId = CAMERA_SETTINGS << 8 | 0x13;
    pub const CS_EXPOSURE_MODE: TagId = CAMERA_SETTINGS << 8 | 0x14;
    pub const CS_LENS_TYPE: TagId = CAMERA_SETTINGS << 8 | 0x16;
    pub const CS_LONG_FOCAL_LENGTH: TagId = CAMERA_SETTINGS << 8 | 0x17;
    pub const CS_SHORT_FOCAL_LENGTH: TagId = CAMERA_SETTINGS << 8 | 0x18;
    pub const CS_FOCAL_UNITS_PER_MM: TagId = CAMERA_SETTINGS << 8 | 0x19;
    pub const CS_MAX_APERTURE: TagId = CAMERA_SETTINGS << 8 | 0x1A;
    pub const CS_MIN_APERTURE: TagId = CAMERA_SETTINGS << 8 | 0x1B;

    pub const FL_FOCAL_LENGTH: TagId = FOCAL_LENGTH << 8 | 0x01;
    pub const FL_FOCAL_PLANE_X_SIZE: TagId = FOCAL_LENGTH << 8 | 0x02;
    pub const FL_FOCAL_PLANE_Y_SIZE: TagId = FOCAL_LENGTH << 8 | 0x03;

    pub const II_IMAGE_WIDTH: TagId = IMAGE_INFO << 8;
    pub const II_IMAGE_HEIGHT: TagId = IMAGE_INFO << 8 | 0x01;
    pub const II_PIXEL_ASPECT_RATIO: TagId = IMAGE_INFO << 8 | 0x02;
    pub const II_ROTATION: TagId = IMAGE_INFO << 8 | 0x03;
    pub const II_COMPONENT_BIT_DEPTH: TagId = IMAGE_INFO << 8 | 0x04;
    pub const II_COLOR_BIT_DEPTH: TagId = IMAGE_INFO << 8 | 0x05;
    pub const II_COLOR_BW: TagId = IMAGE_INFO << 8 | 0x06;

    pub const PI_IMAGE_WIDTH: TagId = PICTURE_INFO << 8 | 0x02;
    pub const PI_IMAGE_HEIGHT: TagId = PICTURE_INFO << 8 | 0x03;
    pub const PI_IMAGE_WIDTH_AS_SHOT: TagId = PICTURE_INFO << 8 | 0x04;
    pub const PI_IMAGE_HEIGHT_AS_SHOT: TagId = PICTURE_INFO << 8 | 0x05;
    pub const PI_AF_POINTS_USED: TagId = PICTURE_INFO << 8 | 0x16;

    pub const SI_ISO: TagId = SHOT_INFO << 8 | 0x02;
    pub const SI_EXPOSURE_COMPENSATION: TagId = SHOT_INFO << 8 | 0x06;
    pub const SI_WHITE_BALANCE: TagId = SHOT_INFO << 8 | 0x07;
    pub const SI_SEQUENCE_NUMBER: TagId = SHOT_INFO << 8 | 0x09;
    pub const SI_AF_POINT_USED: TagId = SHOT_INFO << 8 | 0x0E;
    pub const SI_FLASH_BIAS: TagId = SHOT_INFO << 8 | 0x0F;
    pub const SI_AUTO_EXPOSURE_BRACKETING: TagId = SHOT_INFO << 8 | 0x10;
    pub const SI_FOCUS_DISTANCE_UPPER: TagId = SHOT_INFO << 8 | 0x13;
    pub const SI_FOCUS_DISTANCE_LOWER: TagId = SHOT_INFO << 8 | 0x14;
    pub const SI_FNUMBER: TagId = SHOT_INFO << 8 | 0x15;
    pub const SI_SHUTTER_SPEED: TagId = SHOT_INFO << 8 | 0x16;
    pub const SI_BULB_DURATION: TagId = SHOT_INFO << 8 | 0x18;
    pub const SI_AUTO_ROTATE: TagId = SHOT_INFO << 8 | 0x1B;

    pub const SSI_SENSOR_WIDTH: TagId = SENSOR_INFO << 8 | 0x01;
    pub const SSI_SENSOR_HEIGHT: TagId = SENSOR_INFO << 8 | 0x02;
    pub const SSI_SENSOR_LEFT_BORDER: TagId = SENSOR_INFO << 8 | 0x05;
    pub const SSI_SENSOR_TOP_BORDER: TagId = SENSOR_INFO << 8 | 0x06;
    pub const SSI_SENSOR_RIGHT_BORDER: TagId = SENSOR_INFO << 8 | 0x07;
    pub const SSI_SENSOR_BOTTOM_BORDER: TagId = SENSOR_INFO << 8 | 0x08;

    pub const AUTO_ROTATE_NONE: i64 = 0;
    pub const AUTO_ROTATE_90CW: i64 = 1;
    pub const AUTO_ROTATE_180: i64 = 2;
    pub const AUTO_ROTATE_90CCW: i64 = 3;
}
