//! Content-stream operators in user space.
//!
//! Callers work in the document unit with the origin at the top-left corner
//! and y growing downwards. PDF space is in points with the origin at the
//! bottom-left, so `px = x * k` and `py = (page_height - y) * k`.

use crate::error::{PdfError, Result};
use crate::text::{escape, metrics};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scale factor and current page height, enough to map user space to PDF space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserSpace {
    /// Points per user unit.
    pub k: f64,
    /// Page height in user units.
    pub height: f64,
}

impl UserSpace {
    pub fn x(&self, x: f64) -> f64 {
        x * self.k
    }

    pub fn y(&self, y: f64) -> f64 {
        (self.height - y) * self.k
    }

    pub fn rect(&self, x: f64, y: f64, w: f64, h: f64, style: PaintStyle) -> String {
        format!(
            "{:.2} {:.2} {:.2} {:.2} re {}",
            self.x(x),
            self.y(y),
            w * self.k,
            -h * self.k,
            style.operator()
        )
    }

    pub fn line(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> String {
        format!(
            "{:.2} {:.2} m {:.2} {:.2} l S",
            self.x(x1),
            self.y(y1),
            self.x(x2),
            self.y(y2)
        )
    }

    /// `BT x y Td (text) Tj ET` with `text` already encoded.
    pub fn text(&self, x: f64, y: f64, encoded: &[u8]) -> Vec<u8> {
        let mut op = format!("BT {:.2} {:.2} Td (", self.x(x), self.y(y)).into_bytes();
        op.extend_from_slice(&escape(encoded));
        op.extend_from_slice(b") Tj ET");
        op
    }

    /// Filled rectangle under a run of text starting at `(x, y)` (baseline).
    ///
    /// `width` already includes any word spacing.
    pub fn underline(&self, x: f64, y: f64, width: f64, font_size: f64, font_size_pt: f64) -> String {
        let up = metrics::UNDERLINE_POSITION as f64;
        let ut = metrics::UNDERLINE_THICKNESS as f64;
        format!(
            "{:.2} {:.2} {:.2} {:.2} re f",
            self.x(x),
            self.y(y - up / 1000.0 * font_size),
            width * self.k,
            -ut / 1000.0 * font_size_pt
        )
    }

    /// Paints image XObject `/I{index}` into the given box.
    pub fn image(&self, index: usize, x: f64, y: f64, w: f64, h: f64) -> String {
        format!(
            "q {:.2} 0 0 {:.2} {:.2} {:.2} cm /I{} Do Q",
            w * self.k,
            h * self.k,
            self.x(x),
            (self.height - (y + h)) * self.k,
            index
        )
    }
}

/// Wraps a text operator in `q <color> ... Q`.
pub fn colored(color_op: &str, op: &[u8]) -> Vec<u8> {
    let mut out = format!("q {color_op} ").into_bytes();
    out.extend_from_slice(op);
    out.extend_from_slice(b" Q");
    out
}

/// How a closed path is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PaintStyle {
    #[default]
    Stroke,
    Fill,
    FillStroke,
}

impl PaintStyle {
    pub fn operator(&self) -> &'static str {
        match self {
            PaintStyle::Stroke => "S",
            PaintStyle::Fill => "f",
            PaintStyle::FillStroke => "B",
        }
    }
}

impl FromStr for PaintStyle {
    type Err = PdfError;

    /// Accepts `"D"`/`""` (draw), `"F"` (fill) and `"FD"`/`"DF"` (both).
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "" | "D" | "S" => Ok(PaintStyle::Stroke),
            "F" => Ok(PaintStyle::Fill),
            "FD" | "DF" | "B" => Ok(PaintStyle::FillStroke),
            _ => Err(PdfError::Configuration(format!("Incorrect paint style: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A4_MM: UserSpace = UserSpace {
        k: 72.0 / 25.4,
        height: 297.0,
    };

    #[test]
    fn test_coordinate_flip() {
        let space = UserSpace { k: 1.0, height: 800.0 };
        assert_eq!(space.x(10.0), 10.0);
        assert_eq!(space.y(0.0), 800.0);
        assert_eq!(space.y(800.0), 0.0);
    }

    #[test]
    fn test_rect_operator() {
        let space = UserSpace { k: 1.0, height: 100.0 };
        assert_eq!(
            space.rect(10.0, 20.0, 30.0, 40.0, PaintStyle::Fill),
            "10.00 80.00 30.00 -40.00 re f"
        );
    }

    #[test]
    fn test_line_operator() {
        let space = UserSpace { k: 2.0, height: 100.0 };
        assert_eq!(
            space.line(0.0, 0.0, 10.0, 10.0),
            "0.00 200.00 m 20.00 180.00 l S"
        );
    }

    #[test]
    fn test_text_operator_escapes() {
        let space = UserSpace { k: 1.0, height: 100.0 };
        assert_eq!(
            space.text(5.0, 10.0, b"a(b)"),
            b"BT 5.00 90.00 Td (a\\(b\\)) Tj ET".to_vec()
        );
    }

    #[test]
    fn test_colored_wrapper() {
        assert_eq!(
            colored("1.000 0.000 0.000 rg", b"BT ET"),
            b"q 1.000 0.000 0.000 rg BT ET Q".to_vec()
        );
    }

    #[test]
    fn test_image_operator() {
        let op = A4_MM.image(1, 10.0, 10.0, 50.0, 25.0);
        assert_eq!(op, "q 141.73 0 0 70.87 28.35 742.68 cm /I1 Do Q");
    }

    #[test]
    fn test_underline() {
        let space = UserSpace { k: 1.0, height: 100.0 };
        // up = -100, ut = 50: y - (-0.1 * 10) = 51, thickness 0.5
        assert_eq!(
            space.underline(0.0, 50.0, 20.0, 10.0, 10.0),
            "0.00 49.00 20.00 -0.50 re f"
        );
    }

    #[test]
    fn test_paint_style_parse() {
        assert_eq!("".parse::<PaintStyle>().unwrap(), PaintStyle::Stroke);
        assert_eq!("F".parse::<PaintStyle>().unwrap(), PaintStyle::Fill);
        assert_eq!("df".parse::<PaintStyle>().unwrap(), PaintStyle::FillStroke);
        assert!("Z".parse::<PaintStyle>().is_err());
    }
}
