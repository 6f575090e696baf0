//! # quire-pdf
//!
//! A from-scratch PDF writer for reports, labels and forms-on-paper: core
//! fonts with static metrics, cell-based text layout, JPEG passthrough and
//! PNG embedding with alpha, written without any external PDF toolkit.
//!
//! ## Features
//!
//! - **Cell layout**: single-line [`Document::cell`], wrapped and justified
//!   [`Document::multi_cell`], and flowing [`Document::write`]
//! - **Core fonts**: the fourteen standard Type 1 fonts with WinAnsi encoding
//! - **Images**: JPEG embedded as-is, PNG with palettes, color keys and alpha
//!   soft masks
//! - **Automatic page breaks** with header and footer hooks
//! - **Links**: external URIs and internal destinations
//! - **Output**: bytes, files, or an HTTP-style response sink
//!
//! ## Quick Start
//!
//! ```rust
//! use quire_pdf::{Border, CellOptions, Document, LineFeed, MultiCellOptions, Result};
//!
//! # fn main() -> Result<()> {
//! let mut doc = Document::default();
//! doc.set_title("Quarterly report");
//! doc.add_page()?;
//!
//! doc.set_font("Helvetica", "B", 16.0)?;
//! doc.cell(0.0, 10.0, "Quarterly report", &CellOptions::new().line_feed(LineFeed::NextLine))?;
//!
//! doc.set_font("Times", "", 12.0)?;
//! doc.multi_cell(
//!     0.0,
//!     6.0,
//!     "Long paragraphs are wrapped at the right margin and justified.",
//!     &MultiCellOptions::new().border(Border::Frame),
//! )?;
//!
//! let bytes = doc.to_bytes()?;
//! assert!(bytes.starts_with(b"%PDF-1.3"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`document`] - Document state machine and drawing operations
//! - [`page`] - Per-page content and links
//! - [`graphics`] - Colors, graphics state and image codecs
//! - [`text`] - Core fonts, metrics, encoding and line breaking
//! - [`writer`] - Low-level PDF writing
//! - [`output`] - Output destinations
//! - `script` - JSON layout scripts (`serde` feature)

pub mod annotations;
pub mod compression;
pub mod config;
pub mod document;
pub mod error;
pub mod graphics;
pub mod objects;
pub mod output;
pub mod page;
#[cfg(feature = "serde")]
pub mod script;
pub mod text;
pub mod writer;

pub use annotations::{LinkId, LinkTarget};
pub use config::{
    DisplayMode, DocumentConfig, Layout, MarginConfig, Orientation, PageBreakConfig, PageSize,
    Unit, Zoom,
};
pub use document::{
    Border, BorderSides, CellOptions, Document, DocumentMetadata, ImagePlacement, LineFeed,
    MultiCellOptions, PageDecorator, PlacedImage, NB_PAGES_ALIAS,
};
pub use error::{ErrorCategory, PdfError, Result};
pub use graphics::{Color, ImageFormat, PaintStyle};
pub use output::{Destination, HttpResponse, ResponseSink};
pub use page::Page;
pub use text::{Font, FontFamily, FontStyle, TextAlign};

/// Current version of quire-pdf
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
