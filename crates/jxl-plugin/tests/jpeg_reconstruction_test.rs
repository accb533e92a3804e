//! Files transcoded from JPEG, in both directions

mod common;

use common::*;
use jxl_plugin::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Write `jpeg` into a fresh temporary directory
fn jpeg_file(jpeg: &[u8]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("source.jpg");
    fs::write(&path, jpeg).unwrap();
    (dir, path)
}

fn jpeg_origin(path: PathBuf) -> ImageOrigin {
    ImageOrigin {
        format: SourceFormat::Jpeg,
        path: Some(path),
    }
}

#[test]
fn test_jpeg_source_is_rewrapped() {
    init_tracing();
    let jpeg = sample_jpeg(16, 8);
    let (_dir, path) = jpeg_file(&jpeg);

    let decoded = image::load_from_memory(&jpeg).unwrap();
    let host = HostImage::from_dynamic(&decoded)
        .unwrap()
        .with_origin(jpeg_origin(path.clone()));

    let format = JxlFormat::new(MockCodec::new());
    // host exif must not leak into the re-wrapped file
    let mut out = Vec::new();
    format
        .save(&host, &SaveOptions::new().exif(b"II*\0ignored".to_vec()), &mut out)
        .unwrap();

    assert!(format.codec().last_input_was_jpeg.get());
    assert!(format.codec().metadata().is_empty());

    let mut reopened = format.open_image(out.as_slice()).unwrap();
    assert!(reopened.is_jpeg_reconstruction());
    assert_eq!(reopened.mode(), HostPixelMode::RGB);
    assert_eq!((reopened.width(), reopened.height()), (16, 8));
    assert_eq!(reopened.exif(), None);

    let pixels = reopened.load().unwrap();
    assert_eq!(pixels, decoded.to_rgb8().into_raw().as_slice());
}

#[test]
fn test_lossless_jpeg_disabled_encodes_pixels() {
    let jpeg = sample_jpeg(4, 4);
    let (_dir, path) = jpeg_file(&jpeg);

    let host = HostImage::from_dynamic(&image::load_from_memory(&jpeg).unwrap())
        .unwrap()
        .with_origin(jpeg_origin(path.clone()));

    let format = JxlFormat::new(MockCodec::new());
    format.encode(&host, &SaveOptions::new().lossless_jpeg(false)).unwrap();
    assert!(!format.codec().last_input_was_jpeg.get());
    assert_eq!(
        format.codec().config().jpeg_reconstruction,
        JpegReconstructionPolicy::Disable
    );
}

#[test]
fn test_edited_pixels_are_not_rewrapped() {
    let jpeg = sample_jpeg(4, 4);
    let (_dir, path) = jpeg_file(&jpeg);

    let mut host = HostImage::from_dynamic(&image::load_from_memory(&jpeg).unwrap())
        .unwrap()
        .with_origin(jpeg_origin(path));
    for sample in host.data_mut() {
        *sample = 255 - *sample;
    }
    assert!(host.origin.is_none());

    let format = JxlFormat::new(MockCodec::new());
    let out = format.encode(&host, &SaveOptions::new()).unwrap();
    assert!(!format.codec().last_input_was_jpeg.get());

    let mut reopened = format.open_image(out.as_slice()).unwrap();
    assert!(!reopened.is_jpeg_reconstruction());
    assert_eq!(reopened.load().unwrap(), host.data());
}

#[test]
fn test_forced_reconstruction_needs_source() {
    let host = HostImage::new(HostPixelMode::RGB, 2, 2, pattern(HostPixelMode::RGB, 2, 2)).unwrap();
    let format = JxlFormat::new(MockCodec::new());

    assert!(matches!(
        format.encode(&host, &SaveOptions::new().lossless_jpeg(true)),
        Err(JxlError::InvalidParameter(_))
    ));
    assert_eq!(format.codec().encode_calls.get(), 0);
}

#[test]
fn test_embedded_jpeg_metadata_supersedes_container() {
    let tiff = b"MM\0*\0\0\0\x08jpeg-side";
    let jpeg = jpeg_with_exif(&sample_jpeg(8, 8), tiff);
    let stream = codestream(1, 8, 8, NativePixelFormat::uint8(3, false), &jpeg);
    let file = container_file(
        stream,
        vec![
            JxlBox::exif(b"II*\0container-side"),
            JxlBox::new(BoxType::Jumbf, b"jumbf".to_vec()),
        ],
    );

    let image = JxlImage::from_bytes(&MockCodec::with_icc(b"codec-icc"), &file).unwrap();
    assert!(image.is_jpeg_reconstruction());
    assert_eq!(image.exif(), Some(tiff.as_slice()));
    // not carried by the JPEG, so the container copy remains
    assert_eq!(image.metadata().jumb.as_deref(), Some(b"jumbf".as_slice()));
    assert_eq!(image.icc_profile(), Some(b"codec-icc".as_slice()));
}
