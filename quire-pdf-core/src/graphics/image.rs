//! Image records and the codec dispatch.
//!
//! Two codecs are supported: JPEG (passed through as DCT data) and PNG
//! (IDAT passed through with a PNG predictor, or split into color and alpha
//! planes when the image carries an alpha channel).

use crate::error::{PdfError, Result};
use crate::graphics::{jpeg, png};
use crate::objects::{Dictionary, Object, ObjectId};
use indexmap::IndexMap;

/// Color spaces for images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    DeviceGray,
    DeviceRGB,
    DeviceCMYK,
    /// Palette-based; the palette is an RGB lookup table.
    Indexed,
}

impl ColorSpace {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRGB => "DeviceRGB",
            ColorSpace::DeviceCMYK => "DeviceCMYK",
            ColorSpace::Indexed => "Indexed",
        }
    }

    /// Number of color components per pixel in the stored data.
    pub fn components(&self) -> u8 {
        match self {
            ColorSpace::DeviceGray | ColorSpace::Indexed => 1,
            ColorSpace::DeviceRGB => 3,
            ColorSpace::DeviceCMYK => 4,
        }
    }
}

/// Shared decoding capability of the supported codecs.
pub trait ImageCodec {
    fn decode(&self, data: &[u8]) -> Result<Image>;
}

/// The supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Identifies the format from its magic bytes.
    ///
    /// GIF data is recognized only to be rejected.
    pub fn sniff(data: &[u8]) -> Result<Option<ImageFormat>> {
        if data.starts_with(png::SIGNATURE) {
            Ok(Some(ImageFormat::Png))
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Ok(Some(ImageFormat::Jpeg))
        } else if data.starts_with(b"GIF8") {
            Err(unsupported("gif"))
        } else {
            Ok(None)
        }
    }

    /// Parses a type hint or file extension such as `"png"` or `"JPG"`.
    pub fn from_hint(hint: &str) -> Result<ImageFormat> {
        match hint.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            other => Err(unsupported(other)),
        }
    }

    /// Picks the format from the data first, falling back to the hint.
    pub fn detect(data: &[u8], hint: Option<&str>) -> Result<ImageFormat> {
        if let Some(hint) = hint {
            // an explicit unsupported hint fails even if the bytes look fine
            let hinted = ImageFormat::from_hint(hint)?;
            return Ok(ImageFormat::sniff(data)?.unwrap_or(hinted));
        }
        ImageFormat::sniff(data)?.ok_or_else(|| unsupported("unknown"))
    }

    pub fn decode(&self, data: &[u8]) -> Result<Image> {
        match self {
            ImageFormat::Png => png::PngCodec.decode(data),
            ImageFormat::Jpeg => jpeg::JpegCodec.decode(data),
        }
    }
}

fn unsupported(kind: &str) -> PdfError {
    PdfError::Image(format!("Unsupported image format: {kind}"))
}

/// Compression of an image's pixel payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageFilter {
    /// JPEG data, embedded unchanged.
    Dct,
    /// Zlib data whose rows carry PNG filter bytes.
    FlatePredictor { colors: u8 },
}

/// A decoded image, ready to be written as an image XObject.
#[derive(Debug, Clone)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub color_space: ColorSpace,
    pub bits_per_component: u8,
    pub filter: ImageFilter,
    /// RGB triples for [`ColorSpace::Indexed`].
    pub palette: Vec<u8>,
    /// Color-key transparency: one value per component (or one palette index).
    pub color_key: Option<Vec<u8>>,
    /// Alpha plane as a nested grayscale image.
    pub soft_mask: Option<Box<Image>>,
    pub data: Vec<u8>,
}

impl Image {
    pub fn has_alpha(&self) -> bool {
        self.soft_mask.is_some()
    }

    /// Builds the XObject dictionary. `Length` is added by the stream.
    ///
    /// `companion` is the object that follows this one: the palette for
    /// indexed images or the soft mask for alpha images.
    pub fn xobject_dictionary(&self, companion: Option<ObjectId>) -> Dictionary {
        let mut dict = Dictionary::new()
            .with("Type", Object::name("XObject"))
            .with("Subtype", Object::name("Image"))
            .with("Width", self.width)
            .with("Height", self.height);

        match (self.color_space, companion) {
            (ColorSpace::Indexed, Some(palette)) => {
                dict.set(
                    "ColorSpace",
                    vec![
                        Object::name("Indexed"),
                        Object::name("DeviceRGB"),
                        Object::Integer(self.palette.len() as i64 / 3 - 1),
                        Object::Reference(palette),
                    ],
                );
            }
            (cs, _) => {
                dict.set("ColorSpace", Object::name(cs.pdf_name()));
                if cs == ColorSpace::DeviceCMYK {
                    let decode: Vec<Object> =
                        [1, 0, 1, 0, 1, 0, 1, 0].iter().map(|&v| Object::Integer(v)).collect();
                    dict.set("Decode", decode);
                }
            }
        }
        dict.set("BitsPerComponent", self.bits_per_component as i64);

        match self.filter {
            ImageFilter::Dct => dict.set("Filter", Object::name("DCTDecode")),
            ImageFilter::FlatePredictor { colors } => {
                dict.set("Filter", Object::name("FlateDecode"));
                dict.set(
                    "DecodeParms",
                    Dictionary::new()
                        .with("Predictor", 15)
                        .with("Colors", colors as i64)
                        .with("BitsPerComponent", self.bits_per_component as i64)
                        .with("Columns", self.width),
                );
            }
        }

        if let Some(key) = &self.color_key {
            let mask: Vec<Object> = key
                .iter()
                .flat_map(|&v| [Object::from(v as i64), Object::from(v as i64)])
                .collect();
            dict.set("Mask", mask);
        }
        if let (Some(_), Some(smask)) = (&self.soft_mask, companion) {
            dict.set("SMask", Object::Reference(smask));
        }
        dict
    }
}

/// A registered image and its resource index (`/I{index}`).
#[derive(Debug, Clone)]
pub struct RegisteredImage {
    pub index: usize,
    pub image: Image,
}

/// Images used by a document, keyed by source identity and deduplicated.
#[derive(Debug, Default)]
pub struct ImageRegistry {
    images: IndexMap<String, RegisteredImage>,
}

impl ImageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&RegisteredImage> {
        self.images.get(key)
    }

    /// Registers a decoded image under `key` and returns the stored record.
    pub fn insert(&mut self, key: String, image: Image) -> &RegisteredImage {
        let index = self.images.len() + 1;
        tracing::debug!(
            key = %key,
            index,
            width = image.width,
            height = image.height,
            color_space = image.color_space.pdf_name(),
            alpha = image.has_alpha(),
            "registered image"
        );
        self.images
            .entry(key)
            .or_insert(RegisteredImage { index, image })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredImage> {
        self.images.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RegisteredImage> {
        self.images.values_mut()
    }
}

/// Identity key for in-memory image data.
pub fn content_key(data: &[u8]) -> String {
    format!("md5:{:x}", md5::compute(data))
}
