//! End-to-end tests through the public library API.
//!
//! Images are synthesized on the fly into a temp directory; nothing touches
//! the network.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use image_comparison::imaging::{self, EncodeMode, ImageReference, Quality, ReadOptions};
use image_comparison::{ComparisonConfig, render};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 90])
    });
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, 95)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    fs::write(path, buf).unwrap();
}

fn jpg_names(dir: &Path) -> BTreeSet<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|e| e == "jpg"))
        .collect()
}

#[test]
fn two_local_jpegs_in_memory() {
    let tmp = TempDir::new().unwrap();
    let before = tmp.path().join("before.jpg");
    let after = tmp.path().join("after.jpg");
    write_jpeg(&before, 1000, 500);
    write_jpeg(&after, 1000, 500);

    let config = ComparisonConfig {
        width: 700,
        starting_position: 50,
        show_labels: true,
        make_responsive: true,
        in_memory: true,
        ..ComparisonConfig::default()
    };
    let rendered = render(
        &ImageReference::from_location(before.to_str().unwrap()),
        &ImageReference::from_location(after.to_str().unwrap()),
        &config,
    )
    .unwrap();

    assert_eq!(rendered.height, 332);
    assert_eq!(rendered.width, 700);
    assert_eq!(rendered.fragment.matches("data:image/jpg;base64,").count(), 2);
    assert!(rendered.fragment.contains("showLabels: true"));
    assert!(rendered.fragment.contains("makeResponsive: true"));
    assert!(rendered.fragment.contains(r#"startingPosition: "50%""#));
}

#[test]
fn sequential_shared_scratch_renders_keep_only_latest_artifacts() {
    let tmp = TempDir::new().unwrap();
    let before = tmp.path().join("before.jpg");
    let after = tmp.path().join("after.jpg");
    write_jpeg(&before, 64, 48);
    write_jpeg(&after, 64, 48);
    let scratch = tmp.path().join("temp");

    let mut config = ComparisonConfig::default();
    config.encoder.scratch_dir = scratch.to_string_lossy().into_owned();
    let img1 = ImageReference::Path(before);
    let img2 = ImageReference::Path(after);

    render(&img1, &img2, &config).unwrap();
    let first = jpg_names(&scratch);
    assert_eq!(first.len(), 2);

    render(&img1, &img2, &config).unwrap();
    let second = jpg_names(&scratch);
    assert_eq!(second.len(), 2);
    assert!(first.is_disjoint(&second));
}

#[test]
fn path_round_trip_keeps_dimensions() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("source.jpg");
    write_jpeg(&path, 123, 77);

    let image = imaging::read_path(&path, &ReadOptions::default()).unwrap();
    let payload = imaging::encode(&image, EncodeMode::InMemory, Quality::default()).unwrap();
    let back = imaging::read_encoded(&payload.to_bytes().unwrap(), "payload", &ReadOptions::default())
        .unwrap();
    assert_eq!(back.dimensions(), (123, 77));
}

#[test]
fn mixed_sources_render() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("before.jpg");
    write_jpeg(&path, 200, 100);

    let pixels = ndarray::ArrayD::from_elem(ndarray::IxDyn(&[3, 100, 200]), 128u8);
    let rendered = render(
        &ImageReference::Path(path),
        &ImageReference::PixelBuffer(pixels),
        &ComparisonConfig {
            in_memory: true,
            ..ComparisonConfig::default()
        },
    )
    .unwrap();
    // 704 * 0.5 * 0.95 = 334.4
    assert_eq!(rendered.height, 334);
}

#[test]
fn decoded_input_matches_path_input() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("before.jpg");
    write_jpeg(&path, 40, 30);
    let decoded = image::open(&path).unwrap();

    let from_path = imaging::read_path(&path, &ReadOptions::default()).unwrap();
    let from_image =
        imaging::read(&ImageReference::Decoded(decoded), &ReadOptions::default()).unwrap();
    assert_eq!(from_path.pixels(), from_image.pixels());
}

#[test]
fn unreadable_second_image_fails_whole_render() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("before.jpg");
    write_jpeg(&path, 40, 30);
    let garbage = tmp.path().join("after.tif");
    fs::write(&garbage, b"II*\0 truncated").unwrap();

    let config = ComparisonConfig {
        in_memory: true,
        ..ComparisonConfig::default()
    };
    let err = render(&ImageReference::Path(path), &ImageReference::Path(garbage), &config)
        .unwrap_err();
    assert!(err.to_string().starts_with("reading image 2"));
}

#[cfg(not(feature = "tiff-fallback"))]
#[test]
fn rejected_tiff_without_fallback_names_feature() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("stack.tif");
    fs::write(&path, b"II*\0 truncated multi-page stack").unwrap();

    let err = imaging::read_path(&path, &ReadOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        imaging::ReadError::MissingOptionalDependency { .. }
    ));
    assert!(err.to_string().contains("--features tiff-fallback"));
}

#[cfg(feature = "tiff-fallback")]
#[test]
fn rgb_tiff_decodes_with_primary() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("scan.tif");
    DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 25, Rgb([10, 20, 30])))
        .save(&path)
        .unwrap();

    let image = imaging::read_path(&path, &ReadOptions::default()).unwrap();
    assert_eq!(image.dimensions(), (50, 25));
    assert_eq!(image.pixels().get_pixel(0, 0).0, [10, 20, 30]);
}

#[cfg(feature = "tiff-fallback")]
#[test]
fn deep_tiff_renders_through_fallback() {
    use tiff::encoder::{TiffEncoder, colortype::RGB64};

    let tmp = TempDir::new().unwrap();
    let deep = tmp.path().join("deep.tif");
    let samples = [u64::MAX, 0, u64::MAX / 2].repeat(40 * 20);
    let mut file = fs::File::create(&deep).unwrap();
    TiffEncoder::new(&mut file)
        .unwrap()
        .write_image::<RGB64>(40, 20, &samples)
        .unwrap();
    drop(file);

    let image = imaging::read_path(&deep, &ReadOptions::default()).unwrap();
    assert_eq!(image.dimensions(), (40, 20));
    assert_eq!(image.pixels().get_pixel(39, 19).0, [255, 0, 127]);

    let jpeg = tmp.path().join("after.jpg");
    write_jpeg(&jpeg, 40, 20);
    let config = ComparisonConfig {
        width: 400,
        in_memory: true,
        ..ComparisonConfig::default()
    };
    let rendered = render(&ImageReference::Path(deep), &ImageReference::Path(jpeg), &config)
        .unwrap();
    // 400 * (20 / 40) * 0.95
    assert_eq!(rendered.height, 190);
}
