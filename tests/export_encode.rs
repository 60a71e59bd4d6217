//! Integration tests on export preparation and encoding.
use bytes::Bytes;
use ifd_metadata::formats::{self, exif::read_exif};
use ifd_metadata::metadata::{IfdReader, ParseOptions};
use ifd_metadata::reader::Endianness;
use ifd_metadata::tiff::tags::{ciff, exif, gps, tiff};
use ifd_metadata::{
    DirectoryKind, DirectoryRegistry, EncodeOptions, ExportOptions, ExportTarget,
    ImageOrientation, MetadataContainer, MetadataValue, ValueData,
};
use pretty_assertions::assert_eq;

mod util;
use util::{Field, TiffBuilder};

fn camera_tiff() -> Vec<u8> {
    TiffBuilder::little_endian()
        .ifd(vec![
            Field::Ascii(tiff::MAKE as u16, "Acme"),
            Field::Ascii(tiff::MODEL as u16, "Pro 1"),
            Field::Short(tiff::ORIENTATION as u16, 6),
            Field::Pointer(tiff::EXIF_IFD_POINTER as u16, 1),
            Field::Pointer(tiff::GPS_IFD_POINTER as u16, 2),
        ])
        .ifd(vec![
            Field::Rational(exif::EXPOSURE_TIME as u16, 1, 60),
            Field::Rational(exif::FNUMBER as u16, 4, 1),
            Field::Short(exif::ISO_SPEED_RATINGS as u16, 200),
            Field::Ascii(exif::DATE_TIME_ORIGINAL as u16, "2020:02:29 08:00:00"),
            Field::Undefined(exif::MAKER_NOTE as u16, vec![0; 6]),
        ])
        .ifd(vec![Field::Ascii(gps::LATITUDE_REF as u16, "N")])
        .build()
}

fn u16_at(data: &[u8], pos: usize) -> usize {
    u16::from_le_bytes([data[pos], data[pos + 1]]) as usize
}

fn u32_at(data: &[u8], pos: usize) -> usize {
    u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]) as usize
}

#[test]
fn test_jpeg_export_splits_sub_exif() {
    let source = formats::read(Bytes::from(camera_tiff()), &ParseOptions::default()).unwrap();
    let exported = source
        .export_prepare(ExportTarget::Jpeg, &ExportOptions::default())
        .unwrap();
    let sub_exif = exported.directory(DirectoryKind::SubExif).unwrap();
    let exif_dir = exported.directory(DirectoryKind::Exif).unwrap();
    assert!(sub_exif.contains(exif::ISO_SPEED_RATINGS));
    assert!(!exif_dir.contains(exif::ISO_SPEED_RATINGS));
    assert_eq!(exif_dir.get_local(tiff::EXIF_IFD_POINTER).unwrap().as_i64(), Some(0));

    let app1 = exported.encode(DirectoryKind::Exif, EncodeOptions::default()).unwrap();
    assert_eq!(&app1[..10], b"Exif\0\0II\x2a\0");

    // the placeholder now points at the Sub-EXIF directory, relative to the TIFF header
    let ifd0 = 6 + u32_at(&app1, 10);
    let pointer = (0..u16_at(&app1, ifd0))
        .map(|i| ifd0 + 2 + i * 12)
        .find(|pos| u16_at(&app1, *pos) == tiff::EXIF_IFD_POINTER as usize)
        .unwrap();
    let sub_ifd = 6 + u32_at(&app1, pointer + 8);
    assert!(sub_ifd > ifd0 && sub_ifd < app1.len());
    assert_eq!(u16_at(&app1, sub_ifd), sub_exif.len());

    let reread = read_exif(Bytes::from(app1), &ParseOptions::default()).unwrap();
    assert_eq!(reread.iso(), 200);
    assert_eq!(reread.camera_model().as_deref(), Some("Pro 1"));
    assert_eq!(reread.orientation(), ImageOrientation::RightTop);
    assert!(reread.get_value(DirectoryKind::Exif, exif::MAKER_NOTE).is_none());
}

#[test]
fn test_tiff_round_trip() {
    let source = formats::read(Bytes::from(camera_tiff()), &ParseOptions::default()).unwrap();
    let exported = source
        .export_prepare(ExportTarget::Tiff, &ExportOptions::default())
        .unwrap();
    let options = EncodeOptions {
        include_header: true,
        endianness: Endianness::BigEndian,
    };
    let encoded = exported.encode(DirectoryKind::Tiff, options).unwrap();
    assert_eq!(&encoded[6..8], b"MM");

    let reread = MetadataContainer::new();
    IfdReader::try_open(Bytes::from(encoded.clone()), 6, &[42])
        .unwrap()
        .read_into(DirectoryKind::Tiff, &reread, &ParseOptions::default())
        .unwrap();

    assert_eq!(reread.camera_make().as_deref(), Some("Acme"));
    assert_eq!(reread.iso(), 200);
    assert_eq!(reread.aperture(), 4.0);
    assert_eq!(reread.capture_date_time(), source.capture_date_time());
    let gps_dir = reread.directory(DirectoryKind::Gps).unwrap();
    assert_eq!(gps_dir.get_local(gps::LATITUDE_REF).unwrap().as_string().unwrap(), "N");

    // re-encoding what was read back gives the same bytes
    let again = reread.encode(DirectoryKind::Tiff, options).unwrap();
    assert_eq!(again, encoded);
}

#[test]
fn test_ciff_export() {
    let source = MetadataContainer::new();
    source.put_value(
        DirectoryKind::Ciff,
        ciff::MAKE_MODEL,
        MetadataValue::string("Canon\0Canon EOS 10D"),
    );
    source.put_value(
        DirectoryKind::Ciff,
        ciff::II_ROTATION,
        MetadataValue::new(ValueData::SShort(vec![90])).unwrap(),
    );
    source.put_value(
        DirectoryKind::Ciff,
        ciff::CS_CONTRAST,
        MetadataValue::new(ValueData::SShort(vec![-1])).unwrap(),
    );
    assert_eq!(source.orientation(), ImageOrientation::RightTop);

    let exported = source
        .export_prepare(ExportTarget::Tiff, &ExportOptions::default())
        .unwrap();
    assert!(exported.directory(DirectoryKind::Ciff).is_none());
    let tiff_dir = exported.directory(DirectoryKind::Tiff).unwrap();
    assert_eq!(tiff_dir.get_local(tiff::MAKE).unwrap().as_string().unwrap(), "Canon");
    assert_eq!(
        tiff_dir.get_local(tiff::MODEL).unwrap().as_string().unwrap(),
        "Canon EOS 10D"
    );
    assert_eq!(tiff_dir.get_local(tiff::ORIENTATION).unwrap().as_i64(), Some(6));
    let contrast = exported.get_value(DirectoryKind::Exif, exif::CONTRAST).unwrap();
    assert_eq!(contrast.as_i64(), Some(1));

    let encoded = exported
        .encode(DirectoryKind::Tiff, EncodeOptions::default())
        .unwrap();
    let reread = read_exif(Bytes::from(encoded), &ParseOptions::default()).unwrap();
    assert_eq!(reread.camera_model().as_deref(), Some("Canon EOS 10D"));
}

#[test]
fn test_encoded_size_matches() {
    let source = formats::read(Bytes::from(camera_tiff()), &ParseOptions::default()).unwrap();
    let encoder = ifd_metadata::DirectoryEncoder::new(&source, EncodeOptions::default());
    let size = encoder.encoded_size(DirectoryKind::Tiff).unwrap();
    assert_eq!(encoder.encode(DirectoryKind::Tiff).unwrap().len(), size);
}
