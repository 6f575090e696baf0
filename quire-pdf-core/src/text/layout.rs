//! Greedy line breaking over encoded text.
//!
//! Widths are summed from the font's per-byte table in thousandths of the em,
//! so the limit passed in is `(cell width - 2 * cell margin) * 1000 / font size`.

use crate::error::{PdfError, Result};
use std::ops::Range;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Horizontal alignment of text inside a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    /// Stretches wrapped lines to the full width. Single-line cells treat it as left.
    Justified,
}

impl FromStr for TextAlign {
    type Err = PdfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "" | "L" | "LEFT" => Ok(TextAlign::Left),
            "C" | "CENTER" => Ok(TextAlign::Center),
            "R" | "RIGHT" => Ok(TextAlign::Right),
            "J" | "JUSTIFY" | "JUSTIFIED" => Ok(TextAlign::Justified),
            _ => Err(PdfError::Configuration(format!("Incorrect alignment: {s}"))),
        }
    }
}

/// Why a line ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakKind {
    /// An explicit `\n` in the input.
    Newline,
    /// The line overflowed and was broken at its last space.
    Space,
    /// The line overflowed with no space to break at and was split mid-word.
    Forced,
    /// The remaining input.
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedLine {
    /// Byte range of the line in the cleaned input, without the break character.
    pub range: Range<usize>,
    pub kind: BreakKind,
    /// Spaces seen on the line, including the one broken at.
    pub spaces: usize,
    /// Width of the line up to the break point, in thousandths of the em.
    pub width: u32,
}

impl WrappedLine {
    /// Extra word spacing, in the font size's unit, that stretches this line to
    /// `max_width` units. Zero unless the line broke at a space and has at
    /// least two words.
    pub fn justify_spacing(&self, max_width: f64, font_size: f64) -> f64 {
        if self.kind != BreakKind::Space || self.spaces <= 1 {
            return 0.0;
        }
        (max_width - self.width as f64) / 1000.0 * font_size / (self.spaces - 1) as f64
    }
}

/// Strips carriage returns and a single trailing newline.
pub fn clean(text: &[u8]) -> Vec<u8> {
    let mut cleaned: Vec<u8> = text.iter().copied().filter(|&b| b != b'\r').collect();
    if cleaned.last() == Some(&b'\n') {
        cleaned.pop();
    }
    cleaned
}

/// Breaks `text` (already cleaned) into lines no wider than `max_width` units.
///
/// A single word wider than the limit is split at the last byte that fits,
/// always advancing by at least one byte.
pub fn wrap(widths: &[u16; 256], text: &[u8], max_width: f64) -> Vec<WrappedLine> {
    let mut lines = Vec::new();
    let nb = text.len();
    let mut sep: Option<usize> = None;
    let mut i = 0;
    let mut j = 0;
    let mut l: u32 = 0;
    let mut ls: u32 = 0;
    let mut ns = 0;

    while i < nb {
        let c = text[i];
        if c == b'\n' {
            lines.push(WrappedLine {
                range: j..i,
                kind: BreakKind::Newline,
                spaces: ns,
                width: l,
            });
            i += 1;
            sep = None;
            j = i;
            l = 0;
            ns = 0;
            continue;
        }
        if c == b' ' {
            sep = Some(i);
            ls = l;
            ns += 1;
        }
        l += widths[c as usize] as u32;
        if l as f64 > max_width {
            match sep {
                None => {
                    if i == j {
                        i += 1;
                    }
                    let width = text[j..i].iter().map(|&b| widths[b as usize] as u32).sum();
                    lines.push(WrappedLine {
                        range: j..i,
                        kind: BreakKind::Forced,
                        spaces: ns,
                        width,
                    });
                }
                Some(s) => {
                    lines.push(WrappedLine {
                        range: j..s,
                        kind: BreakKind::Space,
                        spaces: ns,
                        width: ls,
                    });
                    i = s + 1;
                }
            }
            sep = None;
            j = i;
            l = 0;
            ns = 0;
        } else {
            i += 1;
        }
    }

    // An overflow break that consumed the rest of the input is the last line.
    if j == nb {
        if let Some(last) = lines.last_mut() {
            match last.kind {
                BreakKind::Space => {
                    last.kind = BreakKind::End;
                    return lines;
                }
                BreakKind::Forced => return lines,
                BreakKind::Newline | BreakKind::End => {}
            }
        }
    }

    let width = text[j..i].iter().map(|&b| widths[b as usize] as u32).sum();
    lines.push(WrappedLine {
        range: j..i,
        kind: BreakKind::End,
        spaces: ns,
        width,
    });
    lines
}
