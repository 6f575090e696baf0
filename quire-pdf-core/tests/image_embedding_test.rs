//! Image embedding tests
//!
//! Fixtures are encoded with the `image` crate so the codecs are exercised
//! against real encoder output (adaptive PNG row filters, baseline JPEG).

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use quire_pdf::compression;
use quire_pdf::graphics::{ColorSpace, ImageFilter};
use quire_pdf::{Document, ErrorCategory, ImageFormat, ImagePlacement, Orientation, PageSize, Unit};
use std::io::Cursor;
use tempfile::TempDir;

fn encode(image: DynamicImage, format: image::ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format).unwrap();
    out.into_inner()
}

fn pattern(x: u32, y: u32, salt: u32) -> u8 {
    ((x * 31 + y * 17 + salt * 7) ^ (x * y)) as u8
}

fn rgba_fixture(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([pattern(x, y, 1), pattern(x, y, 2), pattern(x, y, 3), pattern(y, x, 4)])
    })
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = a as i16 + b as i16 - c as i16;
    let (pa, pb, pc) = ((p - a as i16).abs(), (p - b as i16).abs(), (p - c as i16).abs());
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

/// Reverses PNG row filters the way a Flate predictor 15 reader does.
fn unfilter(data: &[u8], width: usize, height: usize, bpp: usize) -> Vec<u8> {
    let stride = width * bpp;
    assert_eq!(data.len(), (stride + 1) * height);
    let mut out = vec![0u8; stride * height];
    for y in 0..height {
        let row = &data[y * (stride + 1)..(y + 1) * (stride + 1)];
        for x in 0..stride {
            let a = if x >= bpp { out[y * stride + x - bpp] } else { 0 };
            let b = if y > 0 { out[(y - 1) * stride + x] } else { 0 };
            let c = if x >= bpp && y > 0 {
                out[(y - 1) * stride + x - bpp]
            } else {
                0
            };
            let predicted = match row[0] {
                0 => 0,
                1 => a,
                2 => b,
                3 => ((a as u16 + b as u16) / 2) as u8,
                4 => paeth(a, b, c),
                other => panic!("bad filter type {other}"),
            };
            out[y * stride + x] = row[1 + x].wrapping_add(predicted);
        }
    }
    out
}

fn points_doc() -> Document {
    let mut doc = Document::new(Orientation::Portrait, Unit::Point, PageSize::A4).unwrap();
    doc.add_page().unwrap();
    doc
}

#[test]
fn test_rgb_png_passes_through_with_predictor() {
    let source = RgbImage::from_fn(13, 7, |x, y| Rgb([pattern(x, y, 1), pattern(x, y, 2), pattern(x, y, 3)]));
    let data = encode(DynamicImage::ImageRgb8(source.clone()), image::ImageFormat::Png);

    let decoded = ImageFormat::Png.decode(&data).unwrap();
    assert_eq!((decoded.width, decoded.height), (13, 7));
    assert_eq!(decoded.color_space, ColorSpace::DeviceRGB);
    assert_eq!(decoded.filter, ImageFilter::FlatePredictor { colors: 3 });
    assert!(decoded.soft_mask.is_none());

    let pixels = unfilter(&compression::decompress(&decoded.data).unwrap(), 13, 7, 3);
    assert_eq!(pixels, source.into_raw());
}

#[test]
fn test_rgba_png_splits_color_and_alpha() {
    let source = rgba_fixture(9, 6);
    let data = encode(DynamicImage::ImageRgba8(source.clone()), image::ImageFormat::Png);

    let decoded = ImageFormat::Png.decode(&data).unwrap();
    assert!(decoded.has_alpha());
    let mask = decoded.soft_mask.as_deref().unwrap();
    assert_eq!(mask.color_space, ColorSpace::DeviceGray);
    assert_eq!(mask.bits_per_component, 8);

    let color = unfilter(&compression::decompress(&decoded.data).unwrap(), 9, 6, 3);
    let alpha = unfilter(&compression::decompress(&mask.data).unwrap(), 9, 6, 1);
    let expected_color: Vec<u8> = source.pixels().flat_map(|p| [p[0], p[1], p[2]]).collect();
    let expected_alpha: Vec<u8> = source.pixels().map(|p| p[3]).collect();
    assert_eq!(color, expected_color);
    assert_eq!(alpha, expected_alpha);
}

#[test]
fn test_gray_alpha_png() {
    let source = image::GrayAlphaImage::from_fn(5, 4, |x, y| image::LumaA([pattern(x, y, 9), pattern(y, x, 5)]));
    let data = encode(DynamicImage::ImageLumaA8(source.clone()), image::ImageFormat::Png);

    let decoded = ImageFormat::Png.decode(&data).unwrap();
    assert_eq!(decoded.color_space, ColorSpace::DeviceGray);
    let gray = unfilter(&compression::decompress(&decoded.data).unwrap(), 5, 4, 1);
    let expected: Vec<u8> = source.pixels().map(|p| p[0]).collect();
    assert_eq!(gray, expected);
}

#[test]
fn test_alpha_image_raises_version() {
    let data = encode(DynamicImage::ImageRgba8(rgba_fixture(4, 4)), image::ImageFormat::Png);
    let mut doc = points_doc();
    doc.image_bytes(&data, &ImagePlacement::new().at(10.0, 10.0).size(40.0, 40.0))
        .unwrap();
    let pdf = doc.to_bytes().unwrap();
    let text = String::from_utf8_lossy(&pdf);

    assert!(pdf.starts_with(b"%PDF-1.4\n"));
    assert!(text.contains("/SMask "));
    assert!(text.contains("/S /Transparency"));
    assert!(text.contains("/XObject <<\n/I1 "));
    assert!(text.contains("/DecodeParms <<\n/Predictor 15\n/Colors 3\n/BitsPerComponent 8\n/Columns 4\n>>"));
}

#[test]
fn test_jpeg_passthrough() {
    let rgb = encode(
        DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([200, 10, 10]))),
        image::ImageFormat::Jpeg,
    );
    let decoded = ImageFormat::Jpeg.decode(&rgb).unwrap();
    assert_eq!(decoded.color_space, ColorSpace::DeviceRGB);
    assert_eq!(decoded.filter, ImageFilter::Dct);
    assert_eq!(decoded.data, rgb);

    let gray = encode(
        DynamicImage::ImageLuma8(GrayImage::from_pixel(3, 5, Luma([90]))),
        image::ImageFormat::Jpeg,
    );
    let decoded = ImageFormat::Jpeg.decode(&gray).unwrap();
    assert_eq!(decoded.color_space, ColorSpace::DeviceGray);
    assert_eq!((decoded.width, decoded.height), (3, 5));

    let mut doc = points_doc();
    doc.image_bytes(&rgb, &ImagePlacement::new().at(0.0, 0.0)).unwrap();
    let pdf = doc.to_bytes().unwrap();
    assert!(pdf.starts_with(b"%PDF-1.3\n"));
    assert!(String::from_utf8_lossy(&pdf).contains("/Filter /DCTDecode"));
    assert!(pdf.windows(rgb.len()).any(|w| w == rgb.as_slice()));
}

#[test]
fn test_image_files_are_reused() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("logo.png");
    std::fs::write(
        &path,
        encode(DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([0, 0, 255]))), image::ImageFormat::Png),
    )
    .unwrap();

    let mut doc = points_doc();
    let first = doc.image(&path, &ImagePlacement::new().at(0.0, 0.0)).unwrap();
    doc.add_page().unwrap();
    let second = doc.image(&path, &ImagePlacement::new().at(50.0, 50.0)).unwrap();
    assert_eq!(first.index, second.index);

    let pdf = String::from_utf8_lossy(&doc.to_bytes().unwrap()).into_owned();
    assert_eq!(pdf.matches("/Subtype /Image").count(), 1);
}

#[test]
fn test_gif_fails_explicitly() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("anim.gif");
    std::fs::write(&path, b"GIF89a\x01\x00\x01\x00\x00\x00\x00;").unwrap();

    let mut doc = points_doc();
    let err = doc.image(&path, &ImagePlacement::new()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Image);
    assert!(err.to_string().contains("Unsupported image format: gif"));

    let pdf = String::from_utf8_lossy(&doc.to_bytes().unwrap()).into_owned();
    assert!(!pdf.contains("/Subtype /Image"));
}

#[test]
fn test_corrupt_png_is_rejected() {
    let mut data = encode(DynamicImage::ImageRgb8(RgbImage::new(2, 2)), image::ImageFormat::Png);
    data[1] = b'X';
    let mut doc = points_doc();
    let err = doc
        .image_bytes(&data, &ImagePlacement::new().format(ImageFormat::Png))
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Image);
}
