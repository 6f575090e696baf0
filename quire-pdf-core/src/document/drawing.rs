use super::Document;
use crate::annotations::LinkTarget;
use crate::error::{PdfError, Result};
use crate::graphics::{colored, content_key, Image, ImageFormat, PaintStyle};
use std::path::Path;

/// Where and how large to draw an image.
///
/// With neither width nor height the image is drawn at 96 dpi. A negative
/// width or height is a resolution in dpi. When only one is given the other
/// keeps the aspect ratio. Without `y` the image flows at the cursor: it may
/// trigger a page break and the cursor moves below it. Without `x` the
/// current x position is used.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImagePlacement {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: f64,
    pub height: f64,
    /// Overrides format detection.
    pub format: Option<ImageFormat>,
    pub link: Option<LinkTarget>,
}

impl ImagePlacement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn x(mut self, x: f64) -> Self {
        self.x = Some(x);
        self
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn format(mut self, format: ImageFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn link(mut self, link: impl Into<LinkTarget>) -> Self {
        self.link = Some(link.into());
        self
    }
}

/// Where an image ended up, in user units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedImage {
    /// Resource index, `/I{index}`
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Document {
    /// Prints a string with its baseline at `(x, y)`.
    pub fn text(&mut self, x: f64, y: f64, text: &str) -> Result<()> {
        self.ensure_open()?;
        let font = self.require_font()?;
        let encoded = font.font.encoding().encode(text);
        self.require_page()?;

        let mut op = self.user_space().text(x, y, &encoded);
        if font.underline && !encoded.is_empty() {
            op.push(b' ');
            op.extend_from_slice(self.underline_op(x, y, &encoded, &font).as_bytes());
        }
        if self.graphics.color_flag() {
            op = colored(&self.graphics.text_color.fill_op(), &op);
        }
        self.out(&op)
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<()> {
        self.ensure_open()?;
        self.require_page()?;
        let op = self.user_space().line(x1, y1, x2, y2);
        self.out(op.as_bytes())
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, style: PaintStyle) -> Result<()> {
        self.ensure_open()?;
        self.require_page()?;
        let op = self.user_space().rect(x, y, w, h, style);
        self.out(op.as_bytes())
    }

    /// Draws a JPEG or PNG file.
    ///
    /// Files are decoded once; drawing the same path again reuses the image.
    pub fn image(&mut self, path: impl AsRef<Path>, placement: &ImagePlacement) -> Result<PlacedImage> {
        self.ensure_open()?;
        self.require_page()?;
        let path = path.as_ref();
        let key = path.to_string_lossy().into_owned();
        if self.images.get(&key).is_none() {
            let data = std::fs::read(path).map_err(|e| {
                PdfError::Image(format!("Can't open image file {}: {e}", path.display()))
            })?;
            let hint = path.extension().and_then(|ext| ext.to_str());
            let image = decode(&data, placement.format, hint)?;
            self.images.insert(key.clone(), image);
        }
        self.place_image(&key, placement)
    }

    /// Draws an in-memory JPEG or PNG. Identical bytes are embedded once.
    pub fn image_bytes(&mut self, data: &[u8], placement: &ImagePlacement) -> Result<PlacedImage> {
        self.ensure_open()?;
        self.require_page()?;
        let key = content_key(data);
        if self.images.get(&key).is_none() {
            let image = decode(data, placement.format, None)?;
            self.images.insert(key.clone(), image);
        }
        self.place_image(&key, placement)
    }

    fn place_image(&mut self, key: &str, placement: &ImagePlacement) -> Result<PlacedImage> {
        let (index, pixel_w, pixel_h) = self
            .images
            .get(key)
            .map(|r| (r.index, r.image.width as f64, r.image.height as f64))
            .ok_or_else(|| PdfError::InvalidStructure(format!("Image {key} is not registered")))?;

        let (mut w, mut h) = (placement.width, placement.height);
        if w == 0.0 && h == 0.0 {
            w = -96.0;
            h = -96.0;
        }
        if w < 0.0 {
            w = -pixel_w * 72.0 / w / self.k;
        }
        if h < 0.0 {
            h = -pixel_h * 72.0 / h / self.k;
        }
        if w == 0.0 {
            w = h * pixel_w / pixel_h;
        }
        if h == 0.0 {
            h = w * pixel_h / pixel_w;
        }

        let y = match placement.y {
            Some(y) => y,
            None => {
                if self.needs_page_break(h) {
                    let x = self.x;
                    self.break_page()?;
                    self.x = x;
                }
                let y = self.y;
                self.y += h;
                y
            }
        };
        let x = placement.x.unwrap_or(self.x);

        let op = self.user_space().image(index, x, y, w, h);
        self.out(op.as_bytes())?;
        if let Some(link) = &placement.link {
            self.add_page_link(x, y, w, h, link.clone())?;
        }
        Ok(PlacedImage {
            index,
            x,
            y,
            width: w,
            height: h,
        })
    }
}

fn decode(data: &[u8], format: Option<ImageFormat>, hint: Option<&str>) -> Result<Image> {
    let format = match format {
        Some(format) => format,
        None => ImageFormat::detect(data, hint)?,
    };
    format.decode(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Orientation, PageSize, Unit};
    use crate::error::ErrorCategory;
    use crate::graphics::Color;

    fn points_doc() -> Document {
        let mut doc = Document::new(Orientation::Portrait, Unit::Point, PageSize::A4).unwrap();
        doc.add_page().unwrap();
        doc
    }

    fn last_op(doc: &Document) -> String {
        String::from_utf8_lossy(doc.pages.last().unwrap().content())
            .lines()
            .last()
            .unwrap_or_default()
            .to_string()
    }

    // 2x1 baseline JPEG header: SOI, SOF0 with 3 components
    fn tiny_jpeg() -> Vec<u8> {
        vec![
            0xFF, 0xD8, 0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x01, 0x00, 0x02, 0x03, 0x01, 0x11,
            0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01, 0xFF, 0xD9,
        ]
    }

    #[test]
    fn test_text_and_underline() {
        let mut doc = points_doc();
        doc.set_font("Courier", "U", 10.0).unwrap();
        doc.text(10.0, 20.0, "ab").unwrap();
        assert_eq!(
            last_op(&doc),
            "BT 10.00 821.89 Td (ab) Tj ET 10.00 820.89 12.00 -0.50 re f"
        );
    }

    #[test]
    fn test_text_escapes_and_colors() {
        let mut doc = points_doc();
        doc.set_font("Helvetica", "", 10.0).unwrap();
        doc.set_text_color(Color::gray(0.5)).unwrap();
        doc.text(0.0, 0.0, "(a\\b)").unwrap();
        assert_eq!(
            last_op(&doc),
            "q 0.500 g BT 0.00 841.89 Td (\\(a\\\\b\\)) Tj ET Q"
        );
    }

    #[test]
    fn test_line_and_rect() {
        let mut doc = points_doc();
        doc.line(10.0, 10.0, 100.0, 10.0).unwrap();
        assert_eq!(last_op(&doc), "10.00 831.89 m 100.00 831.89 l S");
        doc.rect(10.0, 10.0, 50.0, 20.0, PaintStyle::Fill).unwrap();
        assert_eq!(last_op(&doc), "10.00 831.89 50.00 -20.00 re f");
    }

    #[test]
    fn test_drawing_requires_page() {
        let mut doc = Document::default();
        let err = doc.line(0.0, 0.0, 1.0, 1.0).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::State);
        assert_eq!(err.to_string(), "Invalid state: No page has been added yet");
    }

    #[test]
    fn test_image_natural_size_and_reuse() {
        let mut doc = points_doc();
        let data = tiny_jpeg();
        let placed = doc
            .image_bytes(&data, &ImagePlacement::new().at(10.0, 10.0))
            .unwrap();
        assert_eq!(placed.index, 1);
        assert!((placed.width - 1.5).abs() < 1e-9);
        assert!((placed.height - 0.75).abs() < 1e-9);

        let again = doc
            .image_bytes(&data, &ImagePlacement::new().at(0.0, 0.0).size(20.0, 0.0))
            .unwrap();
        assert_eq!(again.index, 1);
        assert_eq!(again.height, 10.0);
        assert_eq!(doc.images.len(), 1);
    }

    #[test]
    fn test_image_dpi() {
        let mut doc = points_doc();
        let placed = doc
            .image_bytes(&tiny_jpeg(), &ImagePlacement::new().at(0.0, 0.0).size(-72.0, 0.0))
            .unwrap();
        assert_eq!(placed.width, 2.0);
        assert_eq!(placed.height, 1.0);
    }

    #[test]
    fn test_image_flowing_mode_moves_cursor() {
        let mut doc = points_doc();
        let y0 = doc.get_y();
        let placed = doc
            .image_bytes(&tiny_jpeg(), &ImagePlacement::new().size(40.0, 20.0))
            .unwrap();
        assert_eq!(placed.y, y0);
        assert_eq!(placed.x, doc.left_margin());
        assert_eq!(doc.get_y(), y0 + 20.0);
        assert_eq!(
            last_op(&doc),
            format!("q 40.00 0 0 20.00 28.35 {:.2} cm /I1 Do Q", 841.89 - (y0 + 20.0))
        );
    }

    #[test]
    fn test_image_flowing_mode_breaks_page() {
        let mut doc = points_doc();
        doc.set_y(700.0);
        let placed = doc
            .image_bytes(&tiny_jpeg(), &ImagePlacement::new().size(40.0, 200.0))
            .unwrap();
        assert_eq!(doc.page_no(), 2);
        assert_eq!(placed.y, doc.top_margin());
    }

    #[test]
    fn test_image_link() {
        let mut doc = points_doc();
        doc.image_bytes(
            &tiny_jpeg(),
            &ImagePlacement::new()
                .at(0.0, 0.0)
                .size(10.0, 5.0)
                .link("https://example.com"),
        )
        .unwrap();
        assert_eq!(doc.pages[0].links().len(), 1);
    }

    #[test]
    fn test_gif_is_rejected() {
        let mut doc = points_doc();
        let err = doc
            .image_bytes(b"GIF89a\x01\x00\x01\x00", &ImagePlacement::new())
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Image);
        assert!(err.to_string().contains("gif"));
        assert!(doc.images.is_empty());
    }

    #[test]
    fn test_empty_png_is_rejected() {
        let mut data = b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0dIHDR".to_vec();
        data.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0, 8, 2, 0, 0, 0]);
        data.extend_from_slice(&[0; 4]);

        let mut doc = points_doc();
        let (x, y) = (doc.get_x(), doc.get_y());
        let err = doc
            .image_bytes(&data, &ImagePlacement::new().size(10.0, 0.0))
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Image);
        assert!(doc.images.is_empty());
        assert_eq!((doc.get_x(), doc.get_y()), (x, y));
        assert!(!last_op(&doc).contains("NaN"));
    }

    #[test]
    fn test_missing_file() {
        let mut doc = points_doc();
        let err = doc
            .image("/nonexistent/picture.png", &ImagePlacement::new())
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Image);
    }
}
