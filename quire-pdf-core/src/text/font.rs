use crate::error::{PdfError, Result};
use crate::text::{metrics, TextEncoding};
use bitflags::bitflags;
use indexmap::IndexSet;
use std::fmt;
use std::str::FromStr;

/// The standard Type 1 fonts every PDF reader provides without embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    /// Helvetica (sans-serif)
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    /// Times Roman (serif)
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    /// Courier (monospace)
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
    /// Symbol font (mathematical symbols)
    Symbol,
    /// ZapfDingbats (decorative symbols)
    ZapfDingbats,
}

impl Font {
    /// PostScript name written as `/BaseFont`.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
            Font::HelveticaOblique => "Helvetica-Oblique",
            Font::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Font::TimesRoman => "Times-Roman",
            Font::TimesBold => "Times-Bold",
            Font::TimesItalic => "Times-Italic",
            Font::TimesBoldItalic => "Times-BoldItalic",
            Font::Courier => "Courier",
            Font::CourierBold => "Courier-Bold",
            Font::CourierOblique => "Courier-Oblique",
            Font::CourierBoldOblique => "Courier-BoldOblique",
            Font::Symbol => "Symbol",
            Font::ZapfDingbats => "ZapfDingbats",
        }
    }

    /// Symbolic fonts use their built-in encoding instead of WinAnsi.
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Font::Symbol | Font::ZapfDingbats)
    }

    pub fn widths(&self) -> &'static [u16; 256] {
        metrics::widths(*self)
    }

    pub fn encoding(&self) -> TextEncoding {
        if self.is_symbolic() {
            TextEncoding::Builtin
        } else {
            TextEncoding::WinAnsi
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFamily {
    Courier,
    Helvetica,
    Times,
    Symbol,
    ZapfDingbats,
}

impl FontFamily {
    /// Resolves the concrete font for a style. Symbolic families have no variants.
    pub fn with_style(self, style: FontStyle) -> Font {
        let bold = style.contains(FontStyle::BOLD);
        let italic = style.contains(FontStyle::ITALIC);
        match (self, bold, italic) {
            (FontFamily::Helvetica, false, false) => Font::Helvetica,
            (FontFamily::Helvetica, true, false) => Font::HelveticaBold,
            (FontFamily::Helvetica, false, true) => Font::HelveticaOblique,
            (FontFamily::Helvetica, true, true) => Font::HelveticaBoldOblique,
            (FontFamily::Times, false, false) => Font::TimesRoman,
            (FontFamily::Times, true, false) => Font::TimesBold,
            (FontFamily::Times, false, true) => Font::TimesItalic,
            (FontFamily::Times, true, true) => Font::TimesBoldItalic,
            (FontFamily::Courier, false, false) => Font::Courier,
            (FontFamily::Courier, true, false) => Font::CourierBold,
            (FontFamily::Courier, false, true) => Font::CourierOblique,
            (FontFamily::Courier, true, true) => Font::CourierBoldOblique,
            (FontFamily::Symbol, _, _) => Font::Symbol,
            (FontFamily::ZapfDingbats, _, _) => Font::ZapfDingbats,
        }
    }

    pub fn is_symbolic(&self) -> bool {
        matches!(self, FontFamily::Symbol | FontFamily::ZapfDingbats)
    }
}

impl FromStr for FontFamily {
    type Err = PdfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "courier" | "monospace" => Ok(FontFamily::Courier),
            "helvetica" | "arial" | "sans-serif" | "sans" => Ok(FontFamily::Helvetica),
            "times" | "times-roman" | "serif" => Ok(FontFamily::Times),
            "symbol" => Ok(FontFamily::Symbol),
            "zapfdingbats" => Ok(FontFamily::ZapfDingbats),
            other => Err(PdfError::Font(format!("Undefined font: {other}"))),
        }
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FontFamily::Courier => "courier",
            FontFamily::Helvetica => "helvetica",
            FontFamily::Times => "times",
            FontFamily::Symbol => "symbol",
            FontFamily::ZapfDingbats => "zapfdingbats",
        };
        f.write_str(name)
    }
}

bitflags! {
    /// Style flags accepted by `set_font`, parsed from tokens such as `"BI"` or `"u"`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FontStyle: u8 {
        const BOLD = 0b001;
        const ITALIC = 0b010;
        const UNDERLINE = 0b100;
    }
}

impl FontStyle {
    /// Style without the underline flag, which is a drawing attribute and not
    /// part of the font identity.
    pub fn face(self) -> FontStyle {
        self & (FontStyle::BOLD | FontStyle::ITALIC)
    }
}

impl FromStr for FontStyle {
    type Err = PdfError;

    /// Token order does not matter: `"IB"`, `"bi"` and `"BI"` are the same style.
    fn from_str(s: &str) -> Result<Self> {
        let mut style = FontStyle::empty();
        for ch in s.chars() {
            match ch.to_ascii_uppercase() {
                'B' => style |= FontStyle::BOLD,
                'I' => style |= FontStyle::ITALIC,
                'U' => style |= FontStyle::UNDERLINE,
                _ => {
                    return Err(PdfError::Font(format!("Incorrect font style: {s}")));
                }
            }
        }
        Ok(style)
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.contains(FontStyle::BOLD) {
            f.write_str("B")?;
        }
        if self.contains(FontStyle::ITALIC) {
            f.write_str("I")?;
        }
        if self.contains(FontStyle::UNDERLINE) {
            f.write_str("U")?;
        }
        Ok(())
    }
}

/// The font currently selected for drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSelection {
    pub font: Font,
    /// 1-based position in the registry; the resource name is `/F{index}`.
    pub index: usize,
    pub size_pt: f64,
    pub underline: bool,
}

impl FontSelection {
    pub fn resource_name(&self) -> String {
        format!("F{}", self.index)
    }

    pub fn widths(&self) -> &'static [u16; 256] {
        self.font.widths()
    }
}

/// Fonts used by a document, in first-use order.
#[derive(Debug, Clone, Default)]
pub struct FontRegistry {
    fonts: IndexSet<Font>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `font` if needed and returns its 1-based index.
    pub fn register(&mut self, font: Font) -> usize {
        let (index, inserted) = self.fonts.insert_full(font);
        if inserted {
            tracing::debug!(font = font.pdf_name(), index = index + 1, "registered core font");
        }
        index + 1
    }

    pub fn index_of(&self, font: Font) -> Option<usize> {
        self.fonts.get_index_of(&font).map(|i| i + 1)
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Font)> + '_ {
        self.fonts.iter().enumerate().map(|(i, f)| (i + 1, *f))
    }
}

/// Resolves a family name and style token to a core font.
///
/// Symbol and ZapfDingbats ignore the style. Underline is returned separately.
pub fn resolve(family: &str, style: &str) -> Result<(Font, bool)> {
    let parsed_style: FontStyle = style.parse()?;
    let family: FontFamily = family.parse().map_err(|_| {
        PdfError::Font(format!("Undefined font: {} {}", family, parsed_style.face()))
    })?;
    let face = if family.is_symbolic() {
        FontStyle::empty()
    } else {
        parsed_style.face()
    };
    Ok((
        family.with_style(face),
        parsed_style.contains(FontStyle::UNDERLINE),
    ))
}
