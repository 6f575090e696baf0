//! JPEG passthrough: the frame header is read for dimensions and channel
//! count, and the file is embedded unchanged.

use crate::error::{PdfError, Result};
use crate::graphics::image::{ColorSpace, Image, ImageCodec, ImageFilter};

pub struct JpegCodec;

impl ImageCodec for JpegCodec {
    fn decode(&self, data: &[u8]) -> Result<Image> {
        let header = parse_jpeg_header(data)?;
        let color_space = match header.components {
            3 => ColorSpace::DeviceRGB,
            4 => ColorSpace::DeviceCMYK,
            _ => ColorSpace::DeviceGray,
        };

        Ok(Image {
            width: header.width,
            height: header.height,
            color_space,
            bits_per_component: header.precision,
            filter: ImageFilter::Dct,
            palette: Vec::new(),
            color_key: None,
            soft_mask: None,
            data: data.to_vec(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct JpegHeader {
    width: u32,
    height: u32,
    components: u8,
    precision: u8,
}

fn invalid(msg: &str) -> PdfError {
    PdfError::Image(msg.to_string())
}

/// Walks the marker segments up to the first start-of-frame.
fn parse_jpeg_header(data: &[u8]) -> Result<JpegHeader> {
    if data.len() < 2 || data[0] != 0xFF || data[1] != 0xD8 {
        return Err(invalid("Not a valid JPEG file"));
    }

    let mut pos = 2;
    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            return Err(invalid("Invalid JPEG marker"));
        }

        let marker = data[pos + 1];
        pos += 2;

        // fill bytes
        if marker == 0xFF {
            pos -= 1;
            continue;
        }

        // SOF0..SOF15 except DHT, JPG and DAC
        if (0xC0..=0xCF).contains(&marker) && marker != 0xC4 && marker != 0xC8 && marker != 0xCC {
            if pos + 7 >= data.len() {
                return Err(invalid("Truncated JPEG file"));
            }
            let precision = data[pos + 2];
            let height = u16::from_be_bytes([data[pos + 3], data[pos + 4]]) as u32;
            let width = u16::from_be_bytes([data[pos + 5], data[pos + 6]]) as u32;
            let components = data[pos + 7];

            if width == 0 || height == 0 {
                return Err(invalid("Could not find image dimensions"));
            }
            return Ok(JpegHeader {
                width,
                height,
                components,
                precision: if precision == 0 { 8 } else { precision },
            });
        } else if marker == 0xD9 {
            break;
        } else if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            // standalone markers carry no length
            continue;
        } else {
            if pos + 1 >= data.len() {
                return Err(invalid("Truncated JPEG file"));
            }
            let length = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
            pos += length;
        }
    }

    Err(invalid("Could not find image dimensions"))
}
