//! Integration tests on reading IFD streams.
use std::sync::Arc;

use bytes::Bytes;
use ifd_metadata::formats;
use ifd_metadata::metadata::{CollectingSink, IfdReader, ParseOptions, StopFlag};
use ifd_metadata::tiff::tags::{exif, gps, tiff};
use ifd_metadata::{DirectoryKind, DirectoryRegistry, ImageOrientation, MetadataContainer};
use pretty_assertions::assert_eq;

mod util;
use util::{Field, TiffBuilder};

fn read(data: Vec<u8>, options: &ParseOptions) -> MetadataContainer {
    let container = MetadataContainer::new();
    IfdReader::try_open(Bytes::from(data), 0, &[42])
        .unwrap()
        .read_into(DirectoryKind::Tiff, &container, options)
        .unwrap();
    container
}

fn collecting() -> (Arc<CollectingSink>, ParseOptions) {
    let sink = Arc::new(CollectingSink::new());
    let options = ParseOptions::default().with_sink(sink.clone());
    (sink, options)
}

#[test]
#[rustfmt::skip]
fn test_single_ascii_entry() {
    let data = vec![
        b'I', b'I', 42, 0, 8, 0, 0, 0,
        1, 0,
        0x0F, 0x01, 2, 0, 5, 0, 0, 0, 26, 0, 0, 0,
        0, 0, 0, 0,
        b'A', b'c', b'm', b'e', 0,
    ];
    let container = read(data, &ParseOptions::default());
    assert_eq!(container.kinds(), vec![DirectoryKind::Tiff]);
    let make = container.get_value(DirectoryKind::Tiff, tiff::MAKE).unwrap();
    assert_eq!(make.as_string().unwrap(), "Acme");
    assert_eq!(make.owner(), Some(DirectoryKind::Tiff));
    assert_eq!(make.tag(), Some(tiff::MAKE));
}

#[test]
fn test_exif_pointer_beyond_buffer() {
    let data = TiffBuilder::little_endian()
        .ifd(vec![
            Field::Ascii(tiff::MAKE as u16, "Acme"),
            Field::RawOffset(tiff::EXIF_IFD_POINTER as u16, 0x10000),
            Field::Short(tiff::ORIENTATION as u16, 6),
        ])
        .build();
    let (sink, options) = collecting();
    let container = read(data, &options);

    assert_eq!(sink.messages().len(), 1, "{:?}", sink.messages());
    assert_eq!(container.camera_make().as_deref(), Some("Acme"));
    assert_eq!(container.orientation(), ImageOrientation::RightTop);
    let tiff_dir = container.directory(DirectoryKind::Tiff).unwrap();
    assert!(!tiff_dir.contains(tiff::EXIF_IFD_POINTER));
}

#[test]
fn test_sub_directories() {
    let data = TiffBuilder::big_endian()
        .ifd(vec![
            Field::Ascii(tiff::MAKE as u16, "NIKON CORPORATION"),
            Field::Pointer(tiff::EXIF_IFD_POINTER as u16, 1),
            Field::Pointer(tiff::GPS_IFD_POINTER as u16, 2),
        ])
        .ifd(vec![
            Field::Rational(exif::EXPOSURE_TIME as u16, 1, 250),
            Field::Rational(exif::FNUMBER as u16, 56, 10),
            Field::Short(exif::ISO_SPEED_RATINGS as u16, 800),
            Field::Ascii(exif::DATE_TIME_ORIGINAL as u16, "2021:07:04 12:30:00"),
        ])
        .ifd(vec![
            Field::Ascii(gps::LATITUDE_REF as u16, "S"),
            Field::Ascii(gps::LONGITUDE_REF as u16, "E"),
        ])
        .build();
    let container = read(data, &ParseOptions::default());

    assert_eq!(container.iso(), 800);
    assert_eq!(container.aperture(), 5.6);
    assert!((container.shutter_speed() - 0.004).abs() < 1e-9);
    let date = container.capture_date_time().unwrap();
    assert_eq!(date.to_string(), "2021-07-04 12:30:00");

    // pointers stay behind as placeholders
    let tiff_dir = container.directory(DirectoryKind::Tiff).unwrap();
    assert_eq!(tiff_dir.get_local(tiff::EXIF_IFD_POINTER).unwrap().as_i64(), Some(0));
    let gps_dir = container.directory(DirectoryKind::Gps).unwrap();
    assert_eq!(gps_dir.get_local(gps::LATITUDE_REF).unwrap().as_string().unwrap(), "S");
}

#[test]
fn test_reading_twice_gives_equal_values() {
    let data = TiffBuilder::little_endian()
        .ifd(vec![
            Field::Ascii(tiff::MAKE as u16, "Acme"),
            Field::Short(tiff::ORIENTATION as u16, 3),
            Field::Pointer(tiff::EXIF_IFD_POINTER as u16, 1),
            Field::Pointer(tiff::GPS_IFD_POINTER as u16, 2),
        ])
        .ifd(vec![
            Field::Rational(exif::EXPOSURE_TIME as u16, 1, 60),
            Field::Short(exif::ISO_SPEED_RATINGS as u16, 200),
            Field::Ascii(exif::DATE_TIME_ORIGINAL as u16, "2020:02:29 08:00:00"),
            Field::Undefined(exif::USER_COMMENT as u16, b"ASCII\0\0\0hello".to_vec()),
        ])
        .ifd(vec![Field::Ascii(gps::LATITUDE_REF as u16, "N")])
        .build();
    let first = read(data.clone(), &ParseOptions::default());
    let second = read(data, &ParseOptions::default());

    assert_eq!(first.kinds(), second.kinds());
    for kind in first.kinds() {
        let a = first.directory(kind).unwrap().entries();
        let b = second.directory(kind).unwrap().entries();
        assert_eq!(a, b, "{kind:?}");
    }
}

#[test]
fn test_deep_pointer_chain_is_cut_off() {
    // Each directory holds only a GPS pointer to the next one.
    let mut builder = TiffBuilder::big_endian();
    for i in 0..500 {
        builder = builder.ifd(vec![Field::Pointer(tiff::GPS_IFD_POINTER as u16, i + 1)]);
    }
    let data = builder
        .ifd(vec![Field::Ascii(gps::LATITUDE_REF as u16, "N")])
        .build();
    let (sink, options) = collecting();
    let container = read(data, &options);

    assert_eq!(sink.messages().len(), 1, "{:?}", sink.messages());
    assert!(sink.messages()[0].contains("nested"));
    let gps_dir = container.directory(DirectoryKind::Gps).unwrap();
    assert!(!gps_dir.contains(gps::LATITUDE_REF));
}

#[test]
fn test_directory_cycle() {
    // IFD0 -> EXIF -> IFD0, and IFD0 chained to itself
    let data = TiffBuilder::little_endian()
        .ifd(vec![
            Field::Short(tiff::ORIENTATION as u16, 8),
            Field::Pointer(tiff::EXIF_IFD_POINTER as u16, 1),
        ])
        .ifd(vec![
            Field::Short(exif::ISO_SPEED_RATINGS as u16, 100),
            Field::Pointer(exif::INTEROPERABILITY_POINTER as u16, 0),
        ])
        .link(0, 0)
        .build();
    let (sink, options) = collecting();
    let container = read(data, &options);

    assert!(!sink.messages().is_empty());
    assert_eq!(container.iso(), 100);
    assert_eq!(container.orientation(), ImageOrientation::LeftBottom);
}

#[test]
fn test_later_ifds_fill_gaps() {
    let data = TiffBuilder::little_endian()
        .ifd(vec![
            Field::Long(tiff::IMAGE_WIDTH as u16, 6000),
            Field::Ascii(tiff::MAKE as u16, "Acme"),
        ])
        .ifd(vec![
            Field::Long(tiff::IMAGE_WIDTH as u16, 160),
            Field::Ascii(tiff::MAKE as u16, "Other"),
            Field::Ascii(tiff::ARTIST as u16, "Jo"),
        ])
        .link(0, 1)
        .build();
    let container = read(data, &ParseOptions::default());
    assert_eq!(container.image_width(), 6000);
    assert_eq!(container.camera_make().as_deref(), Some("Acme"));
    assert_eq!(container.artist().as_deref(), Some("Jo"));
}

#[test]
fn test_stop_flag() {
    let data = TiffBuilder::little_endian()
        .ifd(vec![
            Field::Short(tiff::ORIENTATION as u16, 1),
            Field::Ascii(tiff::MAKE as u16, "Acme"),
            Field::Ascii(tiff::MODEL as u16, "One"),
        ])
        .build();
    let stop = StopFlag::new();
    stop.stop();
    let options = ParseOptions::default().with_stop(stop);
    let container = read(data, &options);
    assert_eq!(container.directory(DirectoryKind::Tiff).unwrap().len(), 1);
}

#[test]
fn test_entry_count_clamped() {
    let data = TiffBuilder::little_endian()
        .ifd(vec![
            Field::Short(tiff::ORIENTATION as u16, 1),
            Field::Ascii(tiff::MAKE as u16, "Acme"),
            Field::Ascii(tiff::MODEL as u16, "One"),
        ])
        .build();
    let (sink, mut options) = collecting();
    options.max_entry_count = 2;
    let container = read(data, &options);
    assert_eq!(sink.messages().len(), 1);
    assert!(container.camera_model().is_none());
    assert_eq!(container.camera_make().as_deref(), Some("Acme"));
}

#[test]
fn test_tiff_crate_image() {
    let data = util::tiff_crate_image();
    let container = formats::read(Bytes::from(data), &ParseOptions::default()).unwrap();
    assert_eq!(container.camera_make().as_deref(), Some("Acme"));
    assert_eq!(container.camera_model().as_deref(), Some("Model 1"));
    assert_eq!(container.artist().as_deref(), Some("Jo Doe"));
    assert_eq!(container.orientation(), ImageOrientation::BottomRight);
    assert_eq!(container.image_width(), 4);
    assert_eq!(container.image_height(), 2);
}

#[test]
fn test_truncated_header() {
    let err = IfdReader::try_open(Bytes::from_static(b"II*\0"), 0, &[42]);
    assert!(err.is_err());
}
