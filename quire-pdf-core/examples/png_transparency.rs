//! Places a generated RGBA PNG over a striped background to show the alpha
//! channel surviving as a soft mask

use image::{DynamicImage, Rgba, RgbaImage};
use quire_pdf::{Color, Document, ImagePlacement, PaintStyle};
use std::env;
use std::io::Cursor;

fn radial_badge(size: u32) -> RgbaImage {
    let center = size as f64 / 2.0;
    RgbaImage::from_fn(size, size, |x, y| {
        let dx = x as f64 - center;
        let dy = y as f64 - center;
        let distance = (dx * dx + dy * dy).sqrt() / center;
        let alpha = ((1.0 - distance).clamp(0.0, 1.0) * 255.0) as u8;
        Rgba([220, (x * 255 / size) as u8, 40, alpha])
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let output_path = args.get(1).map(String::as_str).unwrap_or("png_transparency.pdf");

    println!("Creating PDF with a transparent PNG: {output_path}");

    let mut png = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(radial_badge(128)).write_to(&mut png, image::ImageFormat::Png)?;
    let png = png.into_inner();

    let mut doc = Document::default();
    doc.set_title("PNG transparency");
    doc.add_page()?;

    for stripe in 0..10 {
        let shade = if stripe % 2 == 0 { 60 } else { 200 };
        doc.set_fill_color(Color::gray8(shade))?;
        doc.rect(20.0, 40.0 + stripe as f64 * 8.0, 170.0, 8.0, PaintStyle::Fill)?;
    }

    // natural size at 96 dpi, then scaled copies reuse the same XObject
    doc.image_bytes(&png, &ImagePlacement::new().at(30.0, 45.0))?;
    doc.image_bytes(&png, &ImagePlacement::new().at(90.0, 50.0).size(25.0, 0.0))?;
    doc.image_bytes(&png, &ImagePlacement::new().at(130.0, 40.0).size(0.0, 60.0))?;

    doc.set_y(130.0);
    doc.set_font("Helvetica", "", 11.0)?;
    doc.write(
        6.0,
        "The stripes show through the badge edges because the alpha channel \
         is embedded as a soft mask.",
        None,
    )?;

    doc.save(output_path)?;
    println!("✓ Wrote {output_path}");
    Ok(())
}
