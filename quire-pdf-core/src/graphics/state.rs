//! Snapshot of the page-level graphics state.
//!
//! The document saves a snapshot before a page transition runs the
//! header/footer hooks and restores it afterwards, so a hook that changes
//! fonts or colors does not leak them into the body of the page.

use crate::graphics::Color;
use crate::text::FontSelection;

#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsState {
    pub font: Option<FontSelection>,
    /// In user units.
    pub line_width: f64,
    pub draw_color: Color,
    pub fill_color: Color,
    pub text_color: Color,
}

impl GraphicsState {
    pub fn new(line_width: f64) -> Self {
        Self {
            font: None,
            line_width,
            draw_color: Color::black(),
            fill_color: Color::black(),
            text_color: Color::black(),
        }
    }

    /// Text needs its own color block when it differs from the fill color.
    pub fn color_flag(&self) -> bool {
        self.fill_color.fill_op() != self.text_color.fill_op()
    }

    pub fn font_size(&self, k: f64) -> f64 {
        self.font.map(|f| f.size_pt / k).unwrap_or(0.0)
    }

    /// Operators that establish this state at the top of a fresh page.
    /// Black draw and fill colors are the PDF defaults and are not emitted.
    pub fn page_start_ops(&self, k: f64) -> Vec<String> {
        let mut ops = vec![line_width_op(self.line_width, k)];
        if let Some(font) = &self.font {
            ops.push(font_op(font));
        }
        if self.draw_color.stroke_op() != Color::black().stroke_op() {
            ops.push(self.draw_color.stroke_op());
        }
        if self.fill_color.fill_op() != Color::black().fill_op() {
            ops.push(self.fill_color.fill_op());
        }
        ops
    }

    /// Operators that bring the page back from `current` to this state.
    pub fn restore_ops(&self, current: &GraphicsState, k: f64) -> Vec<String> {
        let mut ops = Vec::new();
        if current.line_width != self.line_width {
            ops.push(line_width_op(self.line_width, k));
        }
        if let Some(font) = &self.font {
            if current.font.as_ref() != Some(font) {
                ops.push(font_op(font));
            }
        }
        if current.draw_color.stroke_op() != self.draw_color.stroke_op() {
            ops.push(self.draw_color.stroke_op());
        }
        if current.fill_color.fill_op() != self.fill_color.fill_op() {
            ops.push(self.fill_color.fill_op());
        }
        ops
    }
}

pub fn line_width_op(width: f64, k: f64) -> String {
    format!("{:.2} w", width * k)
}

pub fn font_op(font: &FontSelection) -> String {
    format!("BT /{} {:.2} Tf ET", font.resource_name(), font.size_pt)
}
