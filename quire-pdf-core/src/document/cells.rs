//! Cell-based text layout: single-line cells, wrapped multi-line cells and
//! flowing text.

use super::Document;
use crate::annotations::LinkTarget;
use crate::error::{PdfError, Result};
use crate::graphics::{colored, PaintStyle};
use crate::text::{clean, metrics, wrap, BreakKind, TextAlign};
use bitflags::bitflags;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

bitflags! {
    /// Individual cell edges.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BorderSides: u8 {
        const LEFT = 0b0001;
        const TOP = 0b0010;
        const RIGHT = 0b0100;
        const BOTTOM = 0b1000;
    }
}

/// Cell border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Border {
    #[default]
    None,
    /// Full rectangle, drawn as one path
    Frame,
    /// Selected edges, drawn as separate lines
    Sides(BorderSides),
}

impl Border {
    /// Edges for the first line, the following lines, and whether the last
    /// line gets a bottom edge.
    fn multi_cell_sides(&self) -> (BorderSides, BorderSides, bool) {
        let vertical = BorderSides::LEFT | BorderSides::RIGHT;
        match *self {
            Border::None => (BorderSides::empty(), BorderSides::empty(), false),
            Border::Frame => (vertical | BorderSides::TOP, vertical, true),
            Border::Sides(sides) => {
                let rest = sides & vertical;
                let first = rest | (sides & BorderSides::TOP);
                (first, rest, sides.contains(BorderSides::BOTTOM))
            }
        }
    }
}

impl From<BorderSides> for Border {
    fn from(sides: BorderSides) -> Self {
        if sides.is_empty() {
            Border::None
        } else {
            Border::Sides(sides)
        }
    }
}

impl FromStr for Border {
    type Err = PdfError;

    /// `"0"` or `""` for none, `"1"` for a frame, or any of `L`, `T`, `R`, `B`.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "0" => return Ok(Border::None),
            "1" => return Ok(Border::Frame),
            _ => {}
        }
        let mut sides = BorderSides::empty();
        for ch in s.chars() {
            sides |= match ch.to_ascii_uppercase() {
                'L' => BorderSides::LEFT,
                'T' => BorderSides::TOP,
                'R' => BorderSides::RIGHT,
                'B' => BorderSides::BOTTOM,
                _ => {
                    return Err(PdfError::Configuration(format!("Incorrect border: {s}")));
                }
            };
        }
        Ok(Border::from(sides))
    }
}

/// Where the cursor goes after a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LineFeed {
    /// To the right of the cell
    #[default]
    Right,
    /// To the start of the next line
    NextLine,
    /// Below the cell, keeping its x position
    Below,
}

/// Options for [`Document::cell`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellOptions {
    pub border: Border,
    pub line_feed: LineFeed,
    pub align: TextAlign,
    pub fill: bool,
    pub link: Option<LinkTarget>,
}

impl CellOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn border(mut self, border: Border) -> Self {
        self.border = border;
        self
    }

    pub fn line_feed(mut self, line_feed: LineFeed) -> Self {
        self.line_feed = line_feed;
        self
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn fill(mut self, fill: bool) -> Self {
        self.fill = fill;
        self
    }

    pub fn link(mut self, link: impl Into<LinkTarget>) -> Self {
        self.link = Some(link.into());
        self
    }
}

/// Options for [`Document::multi_cell`]. Text is justified by default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiCellOptions {
    pub border: Border,
    pub align: TextAlign,
    pub fill: bool,
}

impl Default for MultiCellOptions {
    fn default() -> Self {
        Self {
            border: Border::None,
            align: TextAlign::Justified,
            fill: false,
        }
    }
}

impl MultiCellOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn border(mut self, border: Border) -> Self {
        self.border = border;
        self
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn fill(mut self, fill: bool) -> Self {
        self.fill = fill;
        self
    }
}

impl Document {
    /// Draws a single-line cell at the cursor.
    ///
    /// A width of 0 extends the cell to the right margin. The cell moves to a
    /// new page first when it would cross the page-break trigger.
    pub fn cell(&mut self, w: f64, h: f64, text: &str, options: &CellOptions) -> Result<()> {
        self.ensure_open()?;
        let encoded = if text.is_empty() {
            Vec::new()
        } else {
            let font = self.require_font()?;
            font.font.encoding().encode(text)
        };
        self.require_page()?;
        self.cell_bytes(w, h, &encoded, options)
    }

    pub(crate) fn cell_bytes(
        &mut self,
        w: f64,
        h: f64,
        text: &[u8],
        options: &CellOptions,
    ) -> Result<()> {
        let k = self.k;
        if self.needs_page_break(h) {
            let x = self.x;
            let ws = self.word_spacing;
            self.reset_word_spacing()?;
            self.break_page()?;
            self.x = x;
            if ws > 0.0 {
                self.set_word_spacing(ws)?;
            }
        }
        let w = if w == 0.0 {
            self.w - self.right_margin - self.x
        } else {
            w
        };

        let space = self.user_space();
        let (x, y) = (self.x, self.y);
        let mut ops: Vec<String> = Vec::new();
        let frame = options.border == Border::Frame;
        if options.fill || frame {
            let style = match (options.fill, frame) {
                (true, true) => PaintStyle::FillStroke,
                (true, false) => PaintStyle::Fill,
                _ => PaintStyle::Stroke,
            };
            ops.push(space.rect(x, y, w, h, style));
        }
        if let Border::Sides(sides) = options.border {
            if sides.contains(BorderSides::LEFT) {
                ops.push(space.line(x, y, x, y + h));
            }
            if sides.contains(BorderSides::TOP) {
                ops.push(space.line(x, y, x + w, y));
            }
            if sides.contains(BorderSides::RIGHT) {
                ops.push(space.line(x + w, y, x + w, y + h));
            }
            if sides.contains(BorderSides::BOTTOM) {
                ops.push(space.line(x, y + h, x + w, y + h));
            }
        }
        let mut out = ops.join(" ").into_bytes();

        if !text.is_empty() {
            let font = self.require_font()?;
            let font_size = font.size_pt / k;
            let text_width = metrics::measure_bytes(font.font, text, font_size);
            let dx = match options.align {
                TextAlign::Right => w - self.cell_margin - text_width,
                TextAlign::Center => (w - text_width) / 2.0,
                TextAlign::Left | TextAlign::Justified => self.cell_margin,
            };
            let baseline = y + 0.5 * h + 0.3 * font_size;
            let mut op = space.text(x + dx, baseline, text);
            if font.underline {
                op.push(b' ');
                op.extend_from_slice(self.underline_op(x + dx, baseline, text, &font).as_bytes());
            }
            if self.graphics.color_flag() {
                op = colored(&self.graphics.text_color.fill_op(), &op);
            }
            if !out.is_empty() {
                out.push(b' ');
            }
            out.extend_from_slice(&op);

            if let Some(link) = &options.link {
                self.add_page_link(
                    x + dx,
                    y + 0.5 * h - 0.5 * font_size,
                    text_width,
                    font_size,
                    link.clone(),
                )?;
            }
        }

        if !out.is_empty() {
            self.out(&out)?;
        }
        self.last_height = h;
        match options.line_feed {
            LineFeed::Right => self.x += w,
            LineFeed::NextLine => {
                self.y += h;
                self.x = self.left_margin;
            }
            LineFeed::Below => self.y += h,
        }
        Ok(())
    }

    /// Draws `text` as a stack of cells, wrapping at spaces to fit `w`.
    ///
    /// Explicit newlines always break. A word wider than the cell is split.
    /// With [`TextAlign::Justified`], lines that were wrapped are stretched
    /// to the full width with word spacing. The cursor ends below the last
    /// line, at the left margin.
    pub fn multi_cell(
        &mut self,
        w: f64,
        h: f64,
        text: &str,
        options: &MultiCellOptions,
    ) -> Result<()> {
        self.ensure_open()?;
        let font = self.require_font()?;
        let encoded = clean(&font.font.encoding().encode(text));
        self.require_page()?;

        let font_size = font.size_pt / self.k;
        let w = if w == 0.0 {
            self.w - self.right_margin - self.x
        } else {
            w
        };
        let max_width = (w - 2.0 * self.cell_margin) * 1000.0 / font_size;
        let (first, rest, bottom) = options.border.multi_cell_sides();
        let lines = wrap(font.widths(), &encoded, max_width);
        let last = lines.len().saturating_sub(1);

        for (i, line) in lines.iter().enumerate() {
            match line.kind {
                BreakKind::Space => {
                    if options.align == TextAlign::Justified {
                        self.set_word_spacing(line.justify_spacing(max_width, font_size))?;
                    }
                }
                BreakKind::Newline | BreakKind::Forced | BreakKind::End => {
                    self.reset_word_spacing()?;
                }
            }
            let mut sides = if i == 0 { first } else { rest };
            if i == last && bottom {
                sides |= BorderSides::BOTTOM;
            }
            let cell = CellOptions {
                border: Border::from(sides),
                line_feed: LineFeed::Below,
                align: options.align,
                fill: options.fill,
                link: None,
            };
            self.cell_bytes(w, h, &encoded[line.range.clone()], &cell)?;
        }
        self.x = self.left_margin;
        Ok(())
    }

    /// Flowing text starting at the cursor.
    ///
    /// Text wraps at the right margin and continues from the left margin.
    /// The cursor ends right after the last character, so consecutive calls
    /// (for example with different fonts or a link) read as one paragraph.
    pub fn write(&mut self, h: f64, text: &str, link: Option<&LinkTarget>) -> Result<()> {
        self.ensure_open()?;
        let font = self.require_font()?;
        let s: Vec<u8> = font
            .font
            .encoding()
            .encode(text)
            .into_iter()
            .filter(|&b| b != b'\r')
            .collect();
        self.require_page()?;

        let font_size = font.size_pt / self.k;
        let widths = font.widths();
        let line = CellOptions {
            line_feed: LineFeed::Below,
            link: link.cloned(),
            ..CellOptions::default()
        };
        let mut w = self.w - self.right_margin - self.x;
        let mut max_width = (w - 2.0 * self.cell_margin) * 1000.0 / font_size;

        let mut sep: Option<usize> = None;
        let mut i = 0;
        let mut j = 0;
        let mut l: u32 = 0;
        let mut nl = 1;
        while i < s.len() {
            let c = s[i];
            if c == b'\n' {
                self.cell_bytes(w, h, &s[j..i], &line)?;
                i += 1;
                sep = None;
                j = i;
                l = 0;
                if nl == 1 {
                    self.x = self.left_margin;
                    w = self.w - self.right_margin - self.x;
                    max_width = (w - 2.0 * self.cell_margin) * 1000.0 / font_size;
                }
                nl += 1;
                continue;
            }
            if c == b' ' {
                sep = Some(i);
            }
            l += widths[c as usize] as u32;
            if l as f64 > max_width {
                match sep {
                    None if self.x > self.left_margin => {
                        // the word does not fit after earlier text; retry it on a fresh line
                        self.x = self.left_margin;
                        self.y += h;
                        w = self.w - self.right_margin - self.x;
                        max_width = (w - 2.0 * self.cell_margin) * 1000.0 / font_size;
                        i = j;
                        l = 0;
                        nl += 1;
                        continue;
                    }
                    None => {
                        if i == j {
                            i += 1;
                        }
                        self.cell_bytes(w, h, &s[j..i], &line)?;
                    }
                    Some(at) => {
                        self.cell_bytes(w, h, &s[j..at], &line)?;
                        i = at + 1;
                    }
                }
                sep = None;
                j = i;
                l = 0;
                if nl == 1 {
                    self.x = self.left_margin;
                    w = self.w - self.right_margin - self.x;
                    max_width = (w - 2.0 * self.cell_margin) * 1000.0 / font_size;
                }
                nl += 1;
            } else {
                i += 1;
            }
        }

        if i != j {
            let tail = CellOptions {
                line_feed: LineFeed::Right,
                ..line
            };
            self.cell_bytes(l as f64 / 1000.0 * font_size, h, &s[j..], &tail)?;
        }
        Ok(())
    }
}
