//! JSON layout scripts.
//!
//! A script is a [`DocumentConfig`] plus a list of commands, one per public
//! drawing operation. Running it builds and closes a [`Document`].
//!
//! ```rust
//! use quire_pdf::script::{run, RunOptions, Script};
//!
//! let script = Script::from_json(r#"{
//!     "config": { "unit": "pt", "page_size": "letter" },
//!     "commands": [
//!         { "op": "add_page" },
//!         { "op": "set_font", "family": "Helvetica", "style": "B", "size": 16 },
//!         { "op": "cell", "width": 0, "height": 20, "text": "Hello", "line_feed": "next_line" }
//!     ]
//! }"#)?;
//! let mut doc = run(&script, &RunOptions::default())?;
//! assert!(doc.to_bytes()?.starts_with(b"%PDF-1.3"));
//! # Ok::<(), quire_pdf::PdfError>(())
//! ```

use crate::annotations::{LinkId, LinkTarget};
use crate::config::{DocumentConfig, Orientation, PageSize};
use crate::document::{CellOptions, Document, ImagePlacement, LineFeed, MultiCellOptions};
use crate::error::{PdfError, Result};
use crate::graphics::{Color, PaintStyle};
use crate::text::TextAlign;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub config: DocumentConfig,
    #[serde(default)]
    pub commands: Vec<Command>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| PdfError::Configuration(format!("Invalid layout script: {e}")))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PdfError::Configuration(format!("Invalid layout script: {e}")))
    }
}

/// Link on a cell, image or written text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptLink {
    Uri(String),
    /// Jumps to the position of the `anchor` command with this name.
    Anchor(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    AddPage {
        #[serde(default)]
        orientation: Option<Orientation>,
        #[serde(default)]
        size: Option<PageSize>,
        #[serde(default)]
        rotation: i32,
    },
    SetFont {
        family: String,
        #[serde(default)]
        style: String,
        #[serde(default)]
        size: f64,
    },
    SetFontSize {
        size: f64,
    },
    SetDrawColor {
        color: Color,
    },
    SetFillColor {
        color: Color,
    },
    SetTextColor {
        color: Color,
    },
    SetLineWidth {
        width: f64,
    },
    SetMargins {
        left: f64,
        top: f64,
        #[serde(default)]
        right: Option<f64>,
    },
    SetAutoPageBreak {
        enabled: bool,
        #[serde(default)]
        margin: f64,
    },
    AliasNbPages {
        #[serde(default)]
        alias: Option<String>,
    },
    SetX {
        x: f64,
    },
    SetY {
        y: f64,
    },
    SetXy {
        x: f64,
        y: f64,
    },
    Ln {
        #[serde(default)]
        height: Option<f64>,
    },
    Cell {
        #[serde(default)]
        width: f64,
        height: f64,
        #[serde(default)]
        text: String,
        /// `""`, `"1"` or any of `LTRB`
        #[serde(default)]
        border: String,
        #[serde(default)]
        line_feed: LineFeed,
        #[serde(default)]
        align: TextAlign,
        #[serde(default)]
        fill: bool,
        #[serde(default)]
        link: Option<ScriptLink>,
    },
    MultiCell {
        #[serde(default)]
        width: f64,
        height: f64,
        text: String,
        #[serde(default)]
        border: String,
        #[serde(default)]
        align: Option<TextAlign>,
        #[serde(default)]
        fill: bool,
    },
    Write {
        height: f64,
        text: String,
        #[serde(default)]
        link: Option<ScriptLink>,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        #[serde(default)]
        style: PaintStyle,
    },
    Image {
        path: PathBuf,
        #[serde(default)]
        x: Option<f64>,
        #[serde(default)]
        y: Option<f64>,
        #[serde(default)]
        width: f64,
        #[serde(default)]
        height: f64,
        #[serde(default)]
        link: Option<ScriptLink>,
    },
    /// Marks the current position as the destination of `name`.
    Anchor {
        name: String,
    },
}

/// Limits applied while running a script.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Allows `image` commands to read from the filesystem.
    pub allow_files: bool,
    /// Resolves relative image paths.
    pub base_dir: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            allow_files: true,
            base_dir: None,
        }
    }
}

/// Builds and closes a document from `script`.
pub fn run(script: &Script, options: &RunOptions) -> Result<Document> {
    let mut doc = Document::with_config(&script.config)?;
    let mut anchors = Anchors::default();
    tracing::debug!(commands = script.commands.len(), "running layout script");

    for (index, command) in script.commands.iter().enumerate() {
        apply(&mut doc, command, &mut anchors, options).map_err(|e| {
            tracing::debug!(index, error = %e, "layout command failed");
            e
        })?;
    }
    doc.close()?;
    Ok(doc)
}

#[derive(Default)]
struct Anchors(HashMap<String, LinkId>);

impl Anchors {
    fn id(&mut self, doc: &mut Document, name: &str) -> LinkId {
        *self
            .0
            .entry(name.to_string())
            .or_insert_with(|| doc.add_link())
    }

    fn target(&mut self, doc: &mut Document, link: &Option<ScriptLink>) -> Option<LinkTarget> {
        match link {
            None => None,
            Some(ScriptLink::Uri(uri)) => Some(LinkTarget::Uri(uri.clone())),
            Some(ScriptLink::Anchor(name)) => Some(LinkTarget::Internal(self.id(doc, name))),
        }
    }
}

fn apply(
    doc: &mut Document,
    command: &Command,
    anchors: &mut Anchors,
    options: &RunOptions,
) -> Result<()> {
    match command {
        Command::AddPage {
            orientation,
            size,
            rotation,
        } => doc.add_page_with(*orientation, *size, *rotation)?,
        Command::SetFont {
            family,
            style,
            size,
        } => doc.set_font(family, style, *size)?,
        Command::SetFontSize { size } => doc.set_font_size(*size)?,
        Command::SetDrawColor { color } => doc.set_draw_color(*color)?,
        Command::SetFillColor { color } => doc.set_fill_color(*color)?,
        Command::SetTextColor { color } => doc.set_text_color(*color)?,
        Command::SetLineWidth { width } => doc.set_line_width(*width)?,
        Command::SetMargins { left, top, right } => doc.set_margins(*left, *top, *right),
        Command::SetAutoPageBreak { enabled, margin } => doc.set_auto_page_break(*enabled, *margin),
        Command::AliasNbPages { alias } => doc.alias_nb_pages(alias.as_deref()),
        Command::SetX { x } => doc.set_x(*x),
        Command::SetY { y } => doc.set_y(*y),
        Command::SetXy { x, y } => doc.set_xy(*x, *y),
        Command::Ln { height } => doc.ln(*height),
        Command::Cell {
            width,
            height,
            text,
            border,
            line_feed,
            align,
            fill,
            link,
        } => {
            let mut cell = CellOptions::new()
                .border(border.parse()?)
                .line_feed(*line_feed)
                .align(*align)
                .fill(*fill);
            cell.link = anchors.target(doc, link);
            doc.cell(*width, *height, text, &cell)?;
        }
        Command::MultiCell {
            width,
            height,
            text,
            border,
            align,
            fill,
        } => {
            let mut cell = MultiCellOptions::new().border(border.parse()?).fill(*fill);
            if let Some(align) = align {
                cell = cell.align(*align);
            }
            doc.multi_cell(*width, *height, text, &cell)?;
        }
        Command::Write { height, text, link } => {
            let target = anchors.target(doc, link);
            doc.write(*height, text, target.as_ref())?;
        }
        Command::Text { x, y, text } => doc.text(*x, *y, text)?,
        Command::Line { x1, y1, x2, y2 } => doc.line(*x1, *y1, *x2, *y2)?,
        Command::Rect {
            x,
            y,
            width,
            height,
            style,
        } => doc.rect(*x, *y, *width, *height, *style)?,
        Command::Image {
            path,
            x,
            y,
            width,
            height,
            link,
        } => {
            if !options.allow_files {
                return Err(PdfError::Configuration(
                    "Image files are not allowed in this script".to_string(),
                ));
            }
            let path = match &options.base_dir {
                Some(base) if path.is_relative() => base.join(path),
                _ => path.clone(),
            };
            let placement = ImagePlacement {
                x: *x,
                y: *y,
                width: *width,
                height: *height,
                format: None,
                link: anchors.target(doc, link),
            };
            doc.image(&path, &placement)?;
        }
        Command::Anchor { name } => {
            let id = anchors.id(doc, name);
            doc.set_link(id, None, None)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    fn script(commands: &str) -> Script {
        Script::from_json(&format!(
            r#"{{ "config": {{ "unit": "pt", "compression": false }}, "commands": {commands} }}"#
        ))
        .unwrap()
    }

    fn rendered(script: &Script) -> String {
        let mut doc = run(script, &RunOptions::default()).unwrap();
        String::from_utf8_lossy(&doc.to_bytes().unwrap()).into_owned()
    }

    #[test]
    fn test_runs_cells_and_shapes() {
        let script = script(
            r#"[
                { "op": "add_page" },
                { "op": "set_font", "family": "Arial", "size": 12 },
                { "op": "set_fill_color", "color": { "gray": 0.5 } },
                { "op": "cell", "width": 100, "height": 20, "text": "Total", "border": "LB", "align": "right", "fill": true },
                { "op": "ln" },
                { "op": "multi_cell", "width": 200, "height": 14, "text": "one two three" },
                { "op": "rect", "x": 10, "y": 10, "width": 5, "height": 5, "style": "fill_stroke" },
                { "op": "line", "x1": 0, "y1": 0, "x2": 10, "y2": 10 }
            ]"#,
        );
        let pdf = rendered(&script);
        assert!(pdf.contains("(Total) Tj"));
        assert!(pdf.contains("(one two three) Tj"));
        assert!(pdf.contains("0.500 g"));
        assert!(pdf.contains(" re B"));
        assert!(pdf.contains("/BaseFont /Helvetica"));
    }

    #[test]
    fn test_anchor_links_resolve() {
        let script = script(
            r#"[
                { "op": "add_page" },
                { "op": "set_font", "family": "Times", "size": 10 },
                { "op": "write", "height": 12, "text": "see later", "link": { "anchor": "end" } },
                { "op": "cell", "width": 40, "height": 12, "text": "site", "link": { "uri": "https://example.com" } },
                { "op": "add_page" },
                { "op": "set_y", "y": 100 },
                { "op": "anchor", "name": "end" }
            ]"#,
        );
        let pdf = rendered(&script);
        assert!(pdf.contains("/Dest [5 0 R /XYZ 0 741.89 null]"));
        assert!(pdf.contains("/URI (https://example.com)"));
    }

    #[test]
    fn test_alias_and_page_options() {
        let script = script(
            r#"[
                { "op": "alias_nb_pages" },
                { "op": "add_page", "orientation": "landscape", "rotation": 90 },
                { "op": "set_font", "family": "Courier", "size": 8 },
                { "op": "text", "x": 10, "y": 10, "text": "of {nb}" }
            ]"#,
        );
        let pdf = rendered(&script);
        assert!(pdf.contains("(of 1) Tj"));
        assert!(pdf.contains("/Rotate 90"));
    }

    #[test]
    fn test_errors_propagate() {
        let no_font = script(r#"[{ "op": "add_page" }, { "op": "cell", "height": 10, "text": "x" }]"#);
        let err = run(&no_font, &RunOptions::default()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Font);

        let bad_border = script(
            r#"[{ "op": "add_page" }, { "op": "set_font", "family": "Courier" }, { "op": "cell", "height": 10, "border": "X" }]"#,
        );
        let err = run(&bad_border, &RunOptions::default()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Configuration);

        let err = Script::from_json(r#"{ "commands": [{ "op": "spin" }] }"#).unwrap_err();
        assert!(err.to_string().contains("Invalid layout script"));
    }

    #[test]
    fn test_files_can_be_disallowed() {
        let script = script(r#"[{ "op": "add_page" }, { "op": "image", "path": "logo.png" }]"#);
        let options = RunOptions {
            allow_files: false,
            base_dir: None,
        };
        let err = run(&script, &options).unwrap_err();
        assert!(err.to_string().contains("not allowed"));
    }

    #[test]
    fn test_script_json_is_stable() {
        let script = script(r#"[{ "op": "add_page" }, { "op": "ln", "height": 5 }]"#);
        let reparsed = Script::from_json(&script.to_json().unwrap()).unwrap();
        assert_eq!(reparsed, script);
    }
}
