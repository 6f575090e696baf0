//! Colors, the graphics-state snapshot, content-stream operators and images.

mod color;
mod content;
mod image;
mod jpeg;
mod png;
mod state;

pub use color::Color;
pub use content::{colored, PaintStyle, UserSpace};
pub use image::{
    content_key, ColorSpace, Image, ImageCodec, ImageFilter, ImageFormat, ImageRegistry,
    RegisteredImage,
};
pub use jpeg::JpegCodec;
pub use png::{split_alpha, PngCodec};
pub use state::{font_op, line_width_op, GraphicsState};
