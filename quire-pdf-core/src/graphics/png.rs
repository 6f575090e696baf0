//! PNG codec.
//!
//! Images without alpha keep their deflated IDAT stream as-is; the reader
//! undoes the per-row filters through the Flate predictor. Images with an
//! alpha channel are inflated, split into a color plane and an alpha plane
//! (each row keeping its filter byte) and re-deflated; the alpha plane
//! becomes a soft mask.

use crate::compression;
use crate::error::{PdfError, Result};
use crate::graphics::image::{ColorSpace, Image, ImageCodec, ImageFilter};

pub const SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

pub struct PngCodec;

impl ImageCodec for PngCodec {
    fn decode(&self, data: &[u8]) -> Result<Image> {
        parse_png(data)
    }
}

fn invalid(msg: &str) -> PdfError {
    PdfError::Image(msg.to_string())
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn read(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| invalid("Unexpected end of stream"))?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_u32(&mut self) -> Result<u32> {
        let b = self.read(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read(1)?[0])
    }
}

fn parse_png(data: &[u8]) -> Result<Image> {
    let mut r = Reader { data, pos: 0 };

    if r.read(8).ok() != Some(SIGNATURE) {
        return Err(invalid("Not a PNG file"));
    }
    r.read(4)?;
    if r.read(4)? != b"IHDR" {
        return Err(invalid("Incorrect PNG file"));
    }

    let width = r.read_u32()?;
    let height = r.read_u32()?;
    if width == 0 || height == 0 {
        return Err(invalid("Image has no pixels"));
    }
    let bpc = r.read_u8()?;
    if bpc > 8 {
        return Err(invalid("16-bit depth not supported"));
    }
    let color_type = r.read_u8()?;
    let color_space = match color_type {
        0 | 4 => ColorSpace::DeviceGray,
        2 | 6 => ColorSpace::DeviceRGB,
        3 => ColorSpace::Indexed,
        _ => return Err(invalid("Unknown color type")),
    };
    if r.read_u8()? != 0 {
        return Err(invalid("Unknown compression method"));
    }
    if r.read_u8()? != 0 {
        return Err(invalid("Unknown filter method"));
    }
    if r.read_u8()? != 0 {
        return Err(invalid("Interlacing not supported"));
    }
    r.read(4)?;

    let mut palette = Vec::new();
    let mut color_key = None;
    let mut idat = Vec::new();
    loop {
        let n = r.read_u32()? as usize;
        let kind = r.read(4)?;
        match kind {
            b"PLTE" => {
                palette = r.read(n)?.to_vec();
                r.read(4)?;
            }
            b"tRNS" => {
                let t = r.read(n)?;
                color_key = match color_type {
                    0 if t.len() >= 2 => Some(vec![t[1]]),
                    2 if t.len() >= 6 => Some(vec![t[1], t[3], t[5]]),
                    // only fully transparent palette entries can be keyed, and only the first
                    3 => t.iter().position(|&a| a == 0).map(|i| vec![i as u8]),
                    _ => None,
                };
                r.read(4)?;
            }
            b"IDAT" => {
                idat.extend_from_slice(r.read(n)?);
                r.read(4)?;
            }
            b"IEND" => break,
            _ => {
                r.read(n + 4)?;
            }
        }
    }

    if color_space == ColorSpace::Indexed && palette.is_empty() {
        return Err(invalid("Missing palette"));
    }

    let colors = if color_space == ColorSpace::DeviceRGB { 3 } else { 1 };
    let mut image = Image {
        width,
        height,
        color_space,
        bits_per_component: bpc,
        filter: ImageFilter::FlatePredictor { colors },
        palette,
        color_key,
        soft_mask: None,
        data: idat,
    };

    if color_type >= 4 {
        let inflated = compression::decompress(&image.data)?;
        let (color, alpha) = split_alpha(&inflated, width as usize, height as usize, color_type)?;
        image.data = compression::compress(&color)?;
        image.soft_mask = Some(Box::new(Image {
            width,
            height,
            color_space: ColorSpace::DeviceGray,
            bits_per_component: 8,
            filter: ImageFilter::FlatePredictor { colors: 1 },
            palette: Vec::new(),
            color_key: None,
            soft_mask: None,
            data: compression::compress(&alpha)?,
        }));
    }

    Ok(image)
}

/// Splits inflated gray+alpha (type 4) or RGBA (type 6) rows into a color
/// plane and an alpha plane. Each output row starts with the source row's
/// filter byte.
pub fn split_alpha(
    data: &[u8],
    width: usize,
    height: usize,
    color_type: u8,
) -> Result<(Vec<u8>, Vec<u8>)> {
    let step = if color_type == 4 { 2 } else { 4 };
    let color_bytes = step - 1;
    let stride = step * width;
    if data.len() < (stride + 1) * height {
        return Err(invalid("Corrupt PNG image data"));
    }

    let mut color = Vec::with_capacity((color_bytes * width + 1) * height);
    let mut alpha = Vec::with_capacity((width + 1) * height);
    for row in data.chunks_exact(stride + 1).take(height) {
        let (filter, pixels) = (row[0], &row[1..]);
        color.push(filter);
        alpha.push(filter);
        for pixel in pixels.chunks_exact(step) {
            color.extend_from_slice(&pixel[..color_bytes]);
            alpha.push(pixel[color_bytes]);
        }
    }
    Ok((color, alpha))
}
