//! Reshaping a container's directories into what an exported JPEG or TIFF file carries.

use crate::capability::{Capability, CapabilityValue, ResolutionUnit};
use crate::container::MetadataContainer;
use crate::directory::{DirectoryRegistry, MetadataDirectory};
use crate::error::MetadataResult;
use crate::formats::ciff;
use crate::kind::DirectoryKind;
use crate::tiff::tags::{core, exif, iptc, tiff, TagId};
use crate::value::{MetadataValue, ValueData};

/// Version written to `ExifVersion` on export.
pub const EXIF_VERSION: &[u8; 4] = b"0221";

/// EXIF's IFD0 tags, which TIFF files keep in their own IFD0.
#[rustfmt::skip]
pub const TIFF_EXIF_OVERLAP: &[TagId] = &[
    tiff::NEW_SUBFILE_TYPE, tiff::IMAGE_WIDTH, tiff::IMAGE_LENGTH, tiff::BITS_PER_SAMPLE,
    tiff::COMPRESSION, tiff::PHOTOMETRIC_INTERPRETATION, tiff::DOCUMENT_NAME,
    tiff::IMAGE_DESCRIPTION, tiff::MAKE, tiff::MODEL, tiff::ORIENTATION, tiff::SAMPLES_PER_PIXEL,
    tiff::ROWS_PER_STRIP, tiff::X_RESOLUTION, tiff::Y_RESOLUTION, tiff::PLANAR_CONFIGURATION,
    tiff::RESOLUTION_UNIT, tiff::SOFTWARE, tiff::DATE_TIME, tiff::ARTIST, tiff::HOST_COMPUTER,
    tiff::PREDICTOR, tiff::YCBCR_POSITIONING, tiff::RATING, tiff::COPYRIGHT, tiff::ICC_PROFILE,
    tiff::GPS_IFD_POINTER,
    exif::EXPOSURE_TIME, exif::FNUMBER, exif::EXPOSURE_PROGRAM, exif::SHUTTER_SPEED_VALUE,
    exif::APERTURE_VALUE, exif::EXPOSURE_BIAS_VALUE, exif::MAX_APERTURE_VALUE,
    exif::METERING_MODE, exif::FLASH, exif::FOCAL_LENGTH,
];

/// Tags that never survive export: stale pointers, and the source file's image layout, which
/// says nothing about the exported pixels. The EXIF pointer is re-added when a Sub-EXIF directory
/// is generated.
#[rustfmt::skip]
pub const UNEXPORTED_TAGS: &[TagId] = &[
    exif::CFA_PATTERN, exif::COMPONENTS_CONFIGURATION, exif::COMPRESSED_BITS_PER_PIXEL,
    tiff::EXIF_IFD_POINTER, exif::INTEROPERABILITY_POINTER, exif::MAKER_NOTE,
    exif::SPATIAL_FREQUENCY_RESPONSE, exif::SUBJECT_AREA,
    tiff::CELL_LENGTH, tiff::CELL_WIDTH, tiff::CLIP_PATH, tiff::COLOR_MAP, tiff::COMPRESSION,
    tiff::DOT_RANGE, tiff::EXTRA_SAMPLES, tiff::FILL_ORDER, tiff::FREE_BYTE_COUNTS,
    tiff::FREE_OFFSETS, tiff::GRAY_RESPONSE_CURVE, tiff::GRAY_RESPONSE_UNIT,
    tiff::HALFTONE_HINTS, tiff::INDEXED, tiff::JPEG_AC_TABLES, tiff::JPEG_DC_TABLES,
    tiff::JPEG_INTERCHANGE_FORMAT, tiff::JPEG_INTERCHANGE_FORMAT_LENGTH,
    tiff::JPEG_LOSSLESS_PREDICTORS, tiff::JPEG_POINT_TRANSFORMS, tiff::JPEG_PROC,
    tiff::JPEG_Q_TABLES, tiff::JPEG_RESTART_INTERVAL, tiff::LIGHTZONE, tiff::NEW_SUBFILE_TYPE,
    tiff::OPI_PROXY, tiff::PHOTOSHOP_RESOURCES, tiff::PLANAR_CONFIGURATION, tiff::PREDICTOR,
    tiff::PRIMARY_CHROMATICITIES, tiff::REFERENCE_BLACK_WHITE, tiff::ROWS_PER_STRIP,
    tiff::SAMPLE_FORMAT, tiff::SAMPLES_PER_PIXEL, tiff::STRIP_BYTE_COUNTS, tiff::SUBFILE_TYPE,
    tiff::STRIP_OFFSETS, tiff::SUB_IFDS, tiff::T4_OPTIONS, tiff::T6_OPTIONS,
    tiff::THRESHHOLDING, tiff::TILE_BYTE_COUNTS, tiff::TILE_OFFSETS, tiff::TRANSFER_FUNCTION,
    tiff::TRANSFER_RANGE, tiff::WHITE_POINT, tiff::X_CLIP_PATH_UNITS, tiff::X_POSITION,
    tiff::YCBCR_COEFFICIENTS, tiff::YCBCR_POSITIONING, tiff::YCBCR_SUB_SAMPLING,
    tiff::Y_CLIP_PATH_UNITS, tiff::Y_POSITION,
];

/// IPTC datasets copied to the TIFF tag of the same meaning.
const IPTC_TO_TIFF: &[(TagId, TagId)] = &[
    (iptc::BY_LINE, tiff::ARTIST),
    (iptc::COPYRIGHT_NOTICE, tiff::COPYRIGHT),
    (iptc::OBJECT_NAME, tiff::DOCUMENT_NAME),
    (iptc::CAPTION_ABSTRACT, tiff::IMAGE_DESCRIPTION),
];

/// The file type being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget {
    /// EXIF in an APP1 segment: IFD0 plus a Sub-EXIF directory, no TIFF directory.
    Jpeg,
    /// TIFF IFD0 plus a single EXIF directory.
    Tiff,
}

/// What the exported image looks like.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Exported width in pixels; 0 drops the dimension tags.
    pub width: u32,
    /// Exported height in pixels; 0 drops the dimension tags.
    pub height: u32,
    /// Pixels per resolution unit; 0 leaves resolution alone.
    pub resolution: u32,
    /// Unit of `resolution`.
    pub resolution_unit: ResolutionUnit,
    /// Whether to write the resolved orientation.
    pub include_orientation: bool,
    /// Written to `Software`.
    pub software: String,
    /// Written to `HostComputer`.
    pub host_computer: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            resolution: 0,
            resolution_unit: ResolutionUnit::None,
            include_orientation: true,
            software: concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION")).to_string(),
            host_computer: format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
        }
    }
}

fn dimension(n: u32) -> MetadataValue {
    match u16::try_from(n) {
        Ok(n) => MetadataValue::ushort(n),
        Err(_) => MetadataValue::ulong(n),
    }
}

impl MetadataContainer {
    /// A copy of this container arranged for writing into a `target` file.
    ///
    /// The container itself is left untouched.
    pub fn export_prepare(
        &self,
        target: ExportTarget,
        options: &ExportOptions,
    ) -> MetadataResult<MetadataContainer> {
        let to_jpeg = target == ExportTarget::Jpeg;
        let metadata = self.clone();
        let rating = self.rating();
        let orientation = self.orientation();

        if let Some(ciff_dir) = metadata.remove_directory(DirectoryKind::Ciff) {
            let converted = ciff::convert(&ciff_dir, target);
            metadata.merge(&converted);
        } else if let Some(dng_dir) = metadata.remove_directory(DirectoryKind::Dng) {
            metadata.get_or_create(DirectoryKind::Tiff).merge_from(&dng_dir);
        }

        let exif_dir = metadata.get_or_create(DirectoryKind::Exif);
        let tiff_dir = if to_jpeg {
            // JPEG files carry the TIFF tags in EXIF's IFD0.
            if let Some(tiff_dir) = metadata.directory(DirectoryKind::Tiff) {
                let shared: Vec<TagId> = TIFF_EXIF_OVERLAP
                    .iter()
                    .copied()
                    .filter(|tag| !UNEXPORTED_TAGS.contains(tag))
                    .collect();
                tiff_dir.move_values(&exif_dir, &shared);
            }
            exif_dir.clone()
        } else {
            if let Some(sub_exif) = metadata.remove_directory(DirectoryKind::SubExif) {
                exif_dir.merge_from(&sub_exif);
            }
            metadata.get_or_create(DirectoryKind::Tiff)
        };

        exif_dir.put(exif::EXIF_VERSION, MetadataValue::undefined(&EXIF_VERSION[..])?);
        tiff_dir.put(tiff::HOST_COMPUTER, MetadataValue::string(&options.host_computer));
        tiff_dir.put(tiff::SOFTWARE, MetadataValue::string(&options.software));

        exif_dir.remove_local(tiff::ORIENTATION);
        if options.include_orientation {
            if let Some(value) = orientation.tiff_value() {
                tiff_dir.put(tiff::ORIENTATION, MetadataValue::ushort(value));
            }
        }

        exif_dir.remove_local(tiff::RATING);
        match u16::try_from(rating) {
            Ok(r) if r > 0 => {
                tiff_dir.put(tiff::RATING, MetadataValue::ushort(r));
            }
            _ => {
                tiff_dir.remove_local(tiff::RATING);
            }
        }

        exif_dir.remove_local(exif::PIXEL_X_DIMENSION);
        exif_dir.remove_local(exif::PIXEL_Y_DIMENSION);
        if options.width > 0 && options.height > 0 {
            tiff_dir.put(tiff::IMAGE_WIDTH, dimension(options.width));
            tiff_dir.put(tiff::IMAGE_LENGTH, dimension(options.height));
            exif_dir.put(exif::PIXEL_X_DIMENSION, dimension(options.width));
            exif_dir.put(exif::PIXEL_Y_DIMENSION, dimension(options.height));
        } else {
            tiff_dir.remove_local(tiff::IMAGE_WIDTH);
            tiff_dir.remove_local(tiff::IMAGE_LENGTH);
        }

        let unit = options.resolution_unit.tiff_value();
        if let Some(unit) = unit.filter(|_| options.resolution > 0) {
            tiff_dir.put(tiff::X_RESOLUTION, MetadataValue::urational(options.resolution, 1));
            tiff_dir.put(tiff::Y_RESOLUTION, MetadataValue::urational(options.resolution, 1));
            tiff_dir.put(tiff::RESOLUTION_UNIT, MetadataValue::ushort(unit));
        }

        if let Some(iptc_dir) = metadata.directory(DirectoryKind::Iptc) {
            for (from, to) in IPTC_TO_TIFF {
                if let Some(value) = iptc_dir.get_local(*from) {
                    tiff_dir.put(*to, MetadataValue::clone(&value));
                }
            }
            iptc_dir.put(
                iptc::CODED_CHARACTER_SET,
                MetadataValue::undefined(iptc::UTF8_CHARSET)?,
            );
        }

        for tag in UNEXPORTED_TAGS {
            exif_dir.remove_local(*tag);
        }

        if to_jpeg {
            split_sub_exif(&metadata, &exif_dir);
            metadata.remove_directory(DirectoryKind::Tiff);
        } else {
            tiff_dir.put(tiff::EXIF_IFD_POINTER, MetadataValue::ulong(0));
        }

        if metadata.directory(DirectoryKind::Gps).is_some() {
            exif_dir.put(tiff::GPS_IFD_POINTER, MetadataValue::ulong(0));
        }

        for kind in metadata.kinds() {
            if kind.is_maker_notes() {
                metadata.remove_directory(kind);
            }
        }

        sync_core(&metadata)?;
        Ok(metadata)
    }
}

/// Move EXIF tags from `ExposureTime` up, bar the two pointers, into a generated Sub-EXIF
/// directory and point at it. The pointer's real value is filled in by the encoder.
fn split_sub_exif(metadata: &MetadataContainer, exif_dir: &MetadataDirectory) {
    let tags: Vec<TagId> = exif_dir
        .tags()
        .into_iter()
        .filter(|tag| {
            *tag >= exif::EXPOSURE_TIME
                && *tag != tiff::EXIF_IFD_POINTER
                && *tag != tiff::GPS_IFD_POINTER
        })
        .collect();
    if tags.is_empty() {
        return;
    }
    let sub_exif = metadata.get_or_create(DirectoryKind::SubExif);
    exif_dir.move_values(&sub_exif, &tags);
    exif_dir.put(tiff::EXIF_IFD_POINTER, MetadataValue::ulong(0));
}

/// Recompute the core directory's editable fields and dimensions from the other providers.
fn sync_core(metadata: &MetadataContainer) -> MetadataResult<()> {
    let core_dir = metadata.get_or_create(DirectoryKind::Core);
    for (capability, tag) in [
        (Capability::Artist, core::ARTIST),
        (Capability::Caption, core::CAPTION),
        (Capability::Copyright, core::COPYRIGHT),
        (Capability::Title, core::TITLE),
        (Capability::Rating, core::RATING),
        (Capability::ImageWidth, core::IMAGE_WIDTH),
        (Capability::ImageHeight, core::IMAGE_HEIGHT),
    ] {
        // Core outranks everything, so its own stale value has to go before resolving.
        core_dir.remove_local(tag);
        match metadata.resolve(capability) {
            Some(CapabilityValue::Text(text)) => {
                core_dir.put(tag, MetadataValue::string(text));
            }
            Some(CapabilityValue::Integer(n)) => {
                let n = u16::try_from(n).unwrap_or(u16::MAX);
                core_dir.put(tag, MetadataValue::new(ValueData::UShort(vec![n]))?);
            }
            _ => {}
        }
    }
    Ok(())
}
