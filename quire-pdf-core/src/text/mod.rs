//! Core fonts, their metrics, text encoding and line breaking.

mod encoding;
mod font;
mod layout;
pub mod metrics;

pub use encoding::{escape, text_string, TextEncoding};
pub use font::{resolve, Font, FontFamily, FontRegistry, FontSelection, FontStyle};
pub use layout::{clean, wrap, BreakKind, TextAlign, WrappedLine};
