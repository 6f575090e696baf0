use crate::annotations::{LinkDestination, LinkId, LinkTarget, PageLink};
use crate::config::{
    validate_rotation, DisplayMode, DocumentConfig, Orientation, PageSize, Unit,
};
use crate::error::{PdfError, Result};
use crate::graphics::{Color, GraphicsState, ImageRegistry, UserSpace};
use crate::graphics::{font_op, line_width_op};
use crate::page::Page;
use crate::text::{metrics, resolve, FontRegistry, FontSelection};
use crate::writer::PdfWriter;
use chrono::{DateTime, Local};

mod cells;
mod drawing;

pub use cells::{Border, BorderSides, CellOptions, LineFeed, MultiCellOptions};
pub use drawing::{ImagePlacement, PlacedImage};

/// Default token replaced by the total page count when aliasing is enabled.
pub const NB_PAGES_ALIAS: &str = "{nb}";

/// Hooks run on page transitions.
///
/// `header` runs at the top of every new page and `footer` at the bottom of
/// every finished page, including the last one when the document is closed.
/// Both receive the document and may draw on the current page; automatic page
/// breaks are suspended while they run. `accept_page_break` decides whether an
/// overflowing cell or image triggers a new page.
///
/// ```rust
/// use quire_pdf::{CellOptions, Document, PageDecorator, Result, TextAlign};
///
/// struct Footer;
///
/// impl PageDecorator for Footer {
///     fn footer(&mut self, doc: &mut Document) -> Result<()> {
///         doc.set_y(-15.0);
///         doc.set_font("Helvetica", "I", 8.0)?;
///         let label = format!("Page {}", doc.page_no());
///         doc.cell(0.0, 10.0, &label, &CellOptions::new().align(TextAlign::Center))
///     }
/// }
///
/// let mut doc = Document::default();
/// doc.set_page_decorator(Footer);
/// doc.add_page()?;
/// let bytes = doc.to_bytes()?;
/// assert!(bytes.starts_with(b"%PDF-1.3"));
/// # Ok::<(), quire_pdf::PdfError>(())
/// ```
pub trait PageDecorator: Send {
    fn header(&mut self, _doc: &mut Document) -> Result<()> {
        Ok(())
    }

    fn footer(&mut self, _doc: &mut Document) -> Result<()> {
        Ok(())
    }

    fn accept_page_break(&mut self, doc: &mut Document) -> bool {
        doc.auto_page_break()
    }
}

#[derive(Debug, Clone, Copy)]
enum Hook {
    Header,
    Footer,
}

/// Metadata for a PDF document.
#[derive(Debug, Clone)]
pub struct DocumentMetadata {
    /// Document title
    pub title: Option<String>,
    /// Document author
    pub author: Option<String>,
    /// Document subject
    pub subject: Option<String>,
    /// Document keywords
    pub keywords: Option<String>,
    /// Application that created the content
    pub creator: Option<String>,
    /// Software that produced the PDF
    pub producer: String,
    /// Date and time the document was created
    pub creation_date: DateTime<Local>,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            title: None,
            author: None,
            subject: None,
            keywords: None,
            creator: None,
            producer: format!("quire-pdf {}", env!("CARGO_PKG_VERSION")),
            creation_date: Local::now(),
        }
    }
}

/// A PDF document built page by page through a cursor-based drawing API.
///
/// Coordinates are in the document's unit with the origin at the top-left
/// corner of the page. The document is serialized once, on [`close`], and
/// every drawing call after that fails.
///
/// [`close`]: Document::close
///
/// # Example
///
/// ```rust
/// use quire_pdf::{CellOptions, Document, LineFeed};
///
/// let mut doc = Document::default();
/// doc.set_title("Inventory");
/// doc.add_page()?;
/// doc.set_font("Helvetica", "B", 16.0)?;
/// doc.cell(40.0, 10.0, "Hello World!", &CellOptions::new().line_feed(LineFeed::NextLine))?;
/// let bytes = doc.to_bytes()?;
/// assert!(bytes.ends_with(b"%%EOF\n"));
/// # Ok::<(), quire_pdf::PdfError>(())
/// ```
pub struct Document {
    /// Points per user unit
    k: f64,
    default_orientation: Orientation,
    /// Portrait size in user units
    default_size: (f64, f64),
    current_orientation: Orientation,
    current_size: (f64, f64),
    current_rotation: i32,
    /// Current page size in user units
    w: f64,
    h: f64,
    pub(crate) pages: Vec<Page>,
    pub(crate) fonts: FontRegistry,
    pub(crate) images: ImageRegistry,
    pub(crate) links: Vec<Option<LinkDestination>>,
    left_margin: f64,
    top_margin: f64,
    right_margin: f64,
    break_margin: f64,
    cell_margin: f64,
    x: f64,
    y: f64,
    last_height: f64,
    auto_page_break: bool,
    page_break_trigger: f64,
    in_hook: bool,
    graphics: GraphicsState,
    /// Size used by `set_font` calls that pass 0
    font_size_pt: f64,
    /// Word spacing in user units
    word_spacing: f64,
    pub(crate) compression: bool,
    pub(crate) metadata: DocumentMetadata,
    pub(crate) display: DisplayMode,
    pub(crate) nb_pages_alias: Option<String>,
    decorator: Option<Box<dyn PageDecorator>>,
    /// The serialized file, present once the document is closed
    buffer: Option<Vec<u8>>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("pages", &self.pages.len())
            .field("page_size", &(self.w, self.h))
            .field("x", &self.x)
            .field("y", &self.y)
            .field("metadata", &self.metadata)
            .field("has_decorator", &self.decorator.is_some())
            .field("closed", &self.buffer.is_some())
            .finish_non_exhaustive()
    }
}

impl Document {
    /// Creates a document. Custom page sizes are in `unit`.
    pub fn new(orientation: Orientation, unit: Unit, size: PageSize) -> Result<Self> {
        let k = unit.scale();
        let dimensions = size.dimensions(k)?;
        Ok(Self::build(orientation, k, dimensions))
    }

    /// Creates a document from a [`DocumentConfig`].
    pub fn with_config(config: &DocumentConfig) -> Result<Self> {
        let mut doc = Self::new(config.orientation, config.unit, config.page_size)?;
        doc.compression = config.compression;
        doc.display = config.display;
        if let Some(margins) = config.margins {
            doc.set_margins(margins.left, margins.top, margins.right);
        }
        if let Some(page_break) = config.page_break {
            doc.set_auto_page_break(page_break.enabled, page_break.margin);
        }
        doc.metadata.title = config.title.clone();
        doc.metadata.author = config.author.clone();
        doc.metadata.subject = config.subject.clone();
        doc.metadata.keywords = config.keywords.clone();
        doc.metadata.creator = config.creator.clone();
        Ok(doc)
    }

    fn build(orientation: Orientation, k: f64, size: (f64, f64)) -> Self {
        let (w, h) = match orientation {
            Orientation::Portrait => size,
            Orientation::Landscape => (size.1, size.0),
        };
        // 1 cm
        let margin = 28.35 / k;
        let mut doc = Self {
            k,
            default_orientation: orientation,
            default_size: size,
            current_orientation: orientation,
            current_size: size,
            current_rotation: 0,
            w,
            h,
            pages: Vec::new(),
            fonts: FontRegistry::new(),
            images: ImageRegistry::new(),
            links: Vec::new(),
            left_margin: margin,
            top_margin: margin,
            right_margin: margin,
            break_margin: 0.0,
            cell_margin: margin / 10.0,
            x: 0.0,
            y: 0.0,
            last_height: 0.0,
            auto_page_break: true,
            page_break_trigger: h,
            in_hook: false,
            graphics: GraphicsState::new(0.567 / k),
            font_size_pt: 12.0,
            word_spacing: 0.0,
            compression: true,
            metadata: DocumentMetadata::default(),
            display: DisplayMode::default(),
            nb_pages_alias: None,
            decorator: None,
            buffer: None,
        };
        doc.set_auto_page_break(true, 2.0 * margin);
        doc
    }

    pub fn set_page_decorator(&mut self, decorator: impl PageDecorator + 'static) {
        self.decorator = Some(Box::new(decorator));
    }

    pub fn is_closed(&self) -> bool {
        self.buffer.is_some()
    }

    // Lifecycle

    /// Starts a new page with the document's default orientation and size.
    pub fn add_page(&mut self) -> Result<()> {
        self.add_page_with(None, None, 0)
    }

    /// Starts a new page, overriding orientation, size and rotation.
    ///
    /// The previous page is finished first (its footer runs). Line width,
    /// font and colors carry over to the new page, and anything the header
    /// changes is reverted once it returns.
    pub fn add_page_with(
        &mut self,
        orientation: Option<Orientation>,
        size: Option<PageSize>,
        rotation: i32,
    ) -> Result<()> {
        self.ensure_open()?;
        let rotation = validate_rotation(rotation)?;
        let orientation = orientation.unwrap_or(self.default_orientation);
        let size = match size {
            Some(size) => size.dimensions(self.k)?,
            None => self.default_size,
        };
        self.start_page(orientation, size, rotation)
    }

    /// Page break during layout: same orientation, size and rotation.
    fn break_page(&mut self) -> Result<()> {
        self.start_page(
            self.current_orientation,
            self.current_size,
            self.current_rotation,
        )
    }

    fn start_page(
        &mut self,
        orientation: Orientation,
        size: (f64, f64),
        rotation: i32,
    ) -> Result<()> {
        let saved = self.graphics.clone();
        if !self.pages.is_empty() {
            self.run_hook(Hook::Footer)?;
        }
        self.begin_page(orientation, size, rotation);
        self.out(b"2 J")?;
        self.graphics = saved.clone();
        for op in saved.page_start_ops(self.k) {
            self.out(op.as_bytes())?;
        }

        self.run_hook(Hook::Header)?;

        let current = self.graphics.clone();
        for op in saved.restore_ops(&current, self.k) {
            self.out(op.as_bytes())?;
        }
        let mut restored = saved;
        if restored.font.is_none() {
            restored.font = current.font;
        }
        self.graphics = restored;
        Ok(())
    }

    fn begin_page(&mut self, orientation: Orientation, size: (f64, f64), rotation: i32) {
        if orientation != self.current_orientation || size != self.current_size {
            let (w, h) = match orientation {
                Orientation::Portrait => size,
                Orientation::Landscape => (size.1, size.0),
            };
            self.w = w;
            self.h = h;
            self.page_break_trigger = h - self.break_margin;
            self.current_orientation = orientation;
            self.current_size = size;
        }
        let custom = orientation != self.default_orientation || size != self.default_size;
        self.pages
            .push(Page::new(self.w * self.k, self.h * self.k, custom, rotation));
        self.current_rotation = rotation;
        self.x = self.left_margin;
        self.y = self.top_margin;
        tracing::debug!(
            page = self.pages.len(),
            width = self.w,
            height = self.h,
            rotation,
            "started page"
        );
    }

    fn run_hook(&mut self, hook: Hook) -> Result<()> {
        let Some(mut decorator) = self.decorator.take() else {
            return Ok(());
        };
        self.in_hook = true;
        let result = match hook {
            Hook::Header => decorator.header(self),
            Hook::Footer => decorator.footer(self),
        };
        self.in_hook = false;
        self.decorator = Some(decorator);
        result
    }

    /// Whether content of height `h` at the cursor must move to a new page.
    fn needs_page_break(&mut self, h: f64) -> bool {
        if self.y + h <= self.page_break_trigger || self.in_hook {
            return false;
        }
        match self.decorator.take() {
            Some(mut decorator) => {
                let accepted = decorator.accept_page_break(self);
                self.decorator = Some(decorator);
                accepted
            }
            None => self.auto_page_break,
        }
    }

    /// Finishes the last page and serializes the document.
    ///
    /// A document without pages gets one empty page. Calling `close` again
    /// does nothing; the serialized bytes stay available through
    /// [`buffer`](Document::buffer).
    pub fn close(&mut self) -> Result<()> {
        if self.is_closed() {
            return Ok(());
        }
        if self.pages.is_empty() {
            self.add_page()?;
        }
        self.run_hook(Hook::Footer)?;

        let mut buffer = Vec::new();
        PdfWriter::new_with_writer(&mut buffer).write_document(self)?;
        self.buffer = Some(buffer);
        Ok(())
    }

    /// The serialized file, once the document is closed.
    pub fn buffer(&self) -> Option<&[u8]> {
        self.buffer.as_deref()
    }

    /// Closes the document and returns a copy of the serialized file.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.close()?;
        self.buffer
            .clone()
            .ok_or_else(|| PdfError::InvalidStructure("Document has no output".to_string()))
    }

    // Metadata

    /// Sets the document title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.metadata.title = Some(title.into());
    }

    /// Sets the document author.
    pub fn set_author(&mut self, author: impl Into<String>) {
        self.metadata.author = Some(author.into());
    }

    /// Sets the document subject.
    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.metadata.subject = Some(subject.into());
    }

    /// Sets the document keywords.
    pub fn set_keywords(&mut self, keywords: impl Into<String>) {
        self.metadata.keywords = Some(keywords.into());
    }

    /// Sets the document creator (the application that built the content).
    pub fn set_creator(&mut self, creator: impl Into<String>) {
        self.metadata.creator = Some(creator.into());
    }

    /// Sets the document producer.
    pub fn set_producer(&mut self, producer: impl Into<String>) {
        self.metadata.producer = producer.into();
    }

    /// Sets the document creation date.
    pub fn set_creation_date(&mut self, date: DateTime<Local>) {
        self.metadata.creation_date = date;
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    pub fn set_display_mode(&mut self, display: DisplayMode) {
        self.display = display;
    }

    pub fn set_compression(&mut self, compression: bool) {
        self.compression = compression;
    }

    /// Replaces `alias` (default `{nb}`) with the total page count in every
    /// page when the document is written.
    pub fn alias_nb_pages(&mut self, alias: Option<&str>) {
        self.nb_pages_alias = Some(alias.unwrap_or(NB_PAGES_ALIAS).to_string());
    }

    // Layout settings

    /// Sets left, top and right margins. The right margin defaults to the left one.
    pub fn set_margins(&mut self, left: f64, top: f64, right: Option<f64>) {
        self.left_margin = left;
        self.top_margin = top;
        self.right_margin = right.unwrap_or(left);
    }

    pub fn set_left_margin(&mut self, margin: f64) {
        self.left_margin = margin;
        if !self.pages.is_empty() && self.x < margin {
            self.x = margin;
        }
    }

    pub fn set_top_margin(&mut self, margin: f64) {
        self.top_margin = margin;
    }

    pub fn set_right_margin(&mut self, margin: f64) {
        self.right_margin = margin;
    }

    pub fn left_margin(&self) -> f64 {
        self.left_margin
    }

    pub fn top_margin(&self) -> f64 {
        self.top_margin
    }

    pub fn right_margin(&self) -> f64 {
        self.right_margin
    }

    /// Horizontal padding inside cells.
    pub fn cell_margin(&self) -> f64 {
        self.cell_margin
    }

    pub fn set_cell_margin(&mut self, margin: f64) {
        self.cell_margin = margin;
    }

    /// Enables or disables automatic page breaks, `margin` from the bottom edge.
    pub fn set_auto_page_break(&mut self, enabled: bool, margin: f64) {
        self.auto_page_break = enabled;
        self.break_margin = margin;
        self.page_break_trigger = self.h - margin;
    }

    pub fn auto_page_break(&self) -> bool {
        self.auto_page_break
    }

    /// Vertical position past which content moves to a new page.
    pub fn page_break_trigger(&self) -> f64 {
        self.page_break_trigger
    }

    // Graphics state

    /// Selects a core font. `style` is any combination of `B`, `I` and `U`;
    /// a `size` of 0 keeps the current size.
    pub fn set_font(&mut self, family: &str, style: &str, size: f64) -> Result<()> {
        self.ensure_open()?;
        let (font, underline) = resolve(family, style)?;
        let size_pt = if size == 0.0 { self.font_size_pt } else { size };
        if let Some(current) = self.graphics.font.as_mut() {
            if current.font == font && current.size_pt == size_pt {
                current.underline = underline;
                return Ok(());
            }
        }
        let index = self.fonts.register(font);
        let selection = FontSelection {
            font,
            index,
            size_pt,
            underline,
        };
        self.font_size_pt = size_pt;
        self.graphics.font = Some(selection);
        self.out_if_page(font_op(&selection).as_bytes());
        Ok(())
    }

    /// Changes the size of the current font, in points.
    pub fn set_font_size(&mut self, size: f64) -> Result<()> {
        self.ensure_open()?;
        if self.font_size_pt == size {
            return Ok(());
        }
        self.font_size_pt = size;
        if let Some(current) = self.graphics.font.as_mut() {
            current.size_pt = size;
            let op = font_op(current);
            self.out_if_page(op.as_bytes());
        }
        Ok(())
    }

    pub fn current_font(&self) -> Option<&FontSelection> {
        self.graphics.font.as_ref()
    }

    /// Current font size in user units.
    pub fn font_size(&self) -> f64 {
        self.font_size_pt / self.k
    }

    pub fn set_draw_color(&mut self, color: Color) -> Result<()> {
        self.ensure_open()?;
        self.graphics.draw_color = color;
        self.out_if_page(color.stroke_op().as_bytes());
        Ok(())
    }

    pub fn set_fill_color(&mut self, color: Color) -> Result<()> {
        self.ensure_open()?;
        self.graphics.fill_color = color;
        self.out_if_page(color.fill_op().as_bytes());
        Ok(())
    }

    pub fn set_text_color(&mut self, color: Color) -> Result<()> {
        self.ensure_open()?;
        self.graphics.text_color = color;
        Ok(())
    }

    /// Line width in user units.
    pub fn set_line_width(&mut self, width: f64) -> Result<()> {
        self.ensure_open()?;
        self.graphics.line_width = width;
        self.out_if_page(line_width_op(width, self.k).as_bytes());
        Ok(())
    }

    pub fn line_width(&self) -> f64 {
        self.graphics.line_width
    }

    /// Width of `text` in user units with the current font.
    pub fn get_string_width(&self, text: &str) -> Result<f64> {
        let font = self.require_font()?;
        let encoded = font.font.encoding().encode(text);
        Ok(metrics::measure_bytes(font.font, &encoded, font.size_pt / self.k))
    }

    // Links

    /// Creates an internal link target. Point it somewhere with [`set_link`].
    ///
    /// [`set_link`]: Document::set_link
    pub fn add_link(&mut self) -> LinkId {
        self.links.push(None);
        LinkId(self.links.len())
    }

    /// Sets where an internal link points. `y` defaults to the current
    /// position and `page` to the current page.
    pub fn set_link(&mut self, link: LinkId, y: Option<f64>, page: Option<usize>) -> Result<()> {
        let destination = LinkDestination {
            page: page.unwrap_or(self.pages.len()),
            y: y.unwrap_or(self.y),
        };
        let slot = link
            .0
            .checked_sub(1)
            .and_then(|i| self.links.get_mut(i))
            .ok_or_else(|| PdfError::State(format!("Unknown link: {}", link.0)))?;
        *slot = Some(destination);
        Ok(())
    }

    /// Makes a rectangle of the current page clickable.
    pub fn link(
        &mut self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        target: impl Into<LinkTarget>,
    ) -> Result<()> {
        self.ensure_open()?;
        self.require_page()?;
        self.add_page_link(x, y, w, h, target.into())
    }

    fn add_page_link(&mut self, x: f64, y: f64, w: f64, h: f64, target: LinkTarget) -> Result<()> {
        let k = self.k;
        let height_pt = self.h * k;
        self.current_page()?.add_link(PageLink {
            x: x * k,
            y: height_pt - y * k,
            width: w * k,
            height: h * k,
            target,
        });
        Ok(())
    }

    // Cursor and page metrics

    /// Current page number, 0 before the first page.
    pub fn page_no(&self) -> usize {
        self.pages.len()
    }

    /// Current page width in user units.
    pub fn page_width(&self) -> f64 {
        self.w
    }

    /// Current page height in user units.
    pub fn page_height(&self) -> f64 {
        self.h
    }

    /// Points per user unit.
    pub fn scale_factor(&self) -> f64 {
        self.k
    }

    /// Default page size in points, orientation applied.
    pub(crate) fn default_page_points(&self) -> (f64, f64) {
        let (w, h) = self.default_size;
        match self.default_orientation {
            Orientation::Portrait => (w * self.k, h * self.k),
            Orientation::Landscape => (h * self.k, w * self.k),
        }
    }

    pub fn get_x(&self) -> f64 {
        self.x
    }

    pub fn get_y(&self) -> f64 {
        self.y
    }

    /// Negative values are measured from the right edge.
    pub fn set_x(&mut self, x: f64) {
        self.x = if x >= 0.0 { x } else { self.w + x };
    }

    /// Moves to `y` and back to the left margin. Negative values are measured
    /// from the bottom edge.
    pub fn set_y(&mut self, y: f64) {
        self.y = if y >= 0.0 { y } else { self.h + y };
        self.x = self.left_margin;
    }

    pub fn set_xy(&mut self, x: f64, y: f64) {
        self.set_x(x);
        self.y = if y >= 0.0 { y } else { self.h + y };
    }

    /// Line break: back to the left margin and down by `h`, or by the height
    /// of the last cell.
    pub fn ln(&mut self, h: Option<f64>) {
        self.x = self.left_margin;
        self.y += h.unwrap_or(self.last_height);
    }

    // Internals

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(PdfError::closed());
        }
        Ok(())
    }

    fn require_font(&self) -> Result<FontSelection> {
        self.graphics.font.ok_or_else(PdfError::no_font)
    }

    fn require_page(&self) -> Result<()> {
        if self.pages.is_empty() {
            return Err(PdfError::State("No page has been added yet".to_string()));
        }
        Ok(())
    }

    fn current_page(&mut self) -> Result<&mut Page> {
        self.pages
            .last_mut()
            .ok_or_else(|| PdfError::State("No page has been added yet".to_string()))
    }

    fn user_space(&self) -> UserSpace {
        UserSpace {
            k: self.k,
            height: self.h,
        }
    }

    fn out(&mut self, op: &[u8]) -> Result<()> {
        self.current_page()?.append(op);
        Ok(())
    }

    /// State changes made before the first page are only recorded.
    fn out_if_page(&mut self, op: &[u8]) {
        if let Some(page) = self.pages.last_mut() {
            page.append(op);
        }
    }

    fn set_word_spacing(&mut self, spacing: f64) -> Result<()> {
        self.word_spacing = spacing;
        let op = format!("{:.3} Tw", spacing * self.k);
        self.out(op.as_bytes())
    }

    fn reset_word_spacing(&mut self) -> Result<()> {
        if self.word_spacing > 0.0 {
            self.word_spacing = 0.0;
            self.out(b"0 Tw")?;
        }
        Ok(())
    }

    /// Underline rectangle for `text` drawn with its baseline at `(x, y)`.
    fn underline_op(&self, x: f64, y: f64, text: &[u8], font: &FontSelection) -> String {
        let font_size = font.size_pt / self.k;
        let spaces = text.iter().filter(|&&b| b == b' ').count() as f64;
        let width = metrics::measure_bytes(font.font, text, font_size) + self.word_spacing * spaces;
        self.user_space()
            .underline(x, y, width, font_size, font.size_pt)
    }
}

impl Default for Document {
    /// Portrait A4 in millimeters.
    fn default() -> Self {
        let k = Unit::Millimeter.scale();
        Self::build(Orientation::Portrait, k, (595.28 / k, 841.89 / k))
    }
}
