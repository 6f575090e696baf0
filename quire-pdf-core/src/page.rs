use crate::annotations::PageLink;

/// A single page of a document being built.
///
/// Holds the raw content-stream text and the links placed on the page. Sizes
/// are in points. A page is only written to while it is the document's
/// current page.
#[derive(Debug, Clone, Default)]
pub struct Page {
    content: Vec<u8>,
    width: f64,
    height: f64,
    /// Set when the page size or orientation differs from the document default.
    custom_size: bool,
    rotation: i32,
    links: Vec<PageLink>,
}

impl Page {
    pub(crate) fn new(width: f64, height: f64, custom_size: bool, rotation: i32) -> Self {
        Self {
            content: Vec::new(),
            width,
            height,
            custom_size,
            rotation,
            links: Vec::new(),
        }
    }

    /// Page width in points.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Page height in points.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// `(width, height)` in points when the page has its own media box.
    pub fn media_box(&self) -> Option<(f64, f64)> {
        self.custom_size.then_some((self.width, self.height))
    }

    pub fn rotation(&self) -> i32 {
        self.rotation
    }

    pub fn links(&self) -> &[PageLink] {
        &self.links
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Appends one operator line.
    pub(crate) fn append(&mut self, op: &[u8]) {
        self.content.extend_from_slice(op);
        self.content.push(b'\n');
    }

    pub(crate) fn add_link(&mut self, link: PageLink) {
        self.links.push(link);
    }

    /// Content with every occurrence of `alias` replaced by `value`.
    pub(crate) fn content_with_alias(&self, alias: &str, value: &str) -> Vec<u8> {
        replace_all(&self.content, alias.as_bytes(), value.as_bytes())
    }
}

fn replace_all(haystack: &[u8], needle: &[u8], replacement: &[u8]) -> Vec<u8> {
    if needle.is_empty() {
        return haystack.to_vec();
    }
    let mut out = Vec::with_capacity(haystack.len());
    let mut rest = haystack;
    while let Some(pos) = rest.windows(needle.len()).position(|w| w == needle) {
        out.extend_from_slice(&rest[..pos]);
        out.extend_from_slice(replacement);
        rest = &rest[pos + needle.len()..];
    }
    out.extend_from_slice(rest);
    out
}
