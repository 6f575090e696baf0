//! Link annotation implementation

use crate::objects::{Dictionary, Object, ObjectId};
use crate::text::text_string;

/// Handle returned by [`Document::add_link`](crate::Document::add_link).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkId(pub(crate) usize);

impl LinkId {
    /// 1-based position in the document's link table.
    pub fn get(&self) -> usize {
        self.0
    }
}

/// What a link points at.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkTarget {
    /// External URI
    Uri(String),
    /// Position inside this document, set with `set_link`
    Internal(LinkId),
}

impl From<LinkId> for LinkTarget {
    fn from(id: LinkId) -> Self {
        LinkTarget::Internal(id)
    }
}

impl From<&str> for LinkTarget {
    fn from(uri: &str) -> Self {
        LinkTarget::Uri(uri.to_string())
    }
}

impl From<String> for LinkTarget {
    fn from(uri: String) -> Self {
        LinkTarget::Uri(uri)
    }
}

/// Destination of an internal link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkDestination {
    /// 1-based page number
    pub page: usize,
    /// Vertical position on the page, in user units from the top
    pub y: f64,
}

impl LinkDestination {
    /// `[page /XYZ 0 top null]` where `top` is in points from the page bottom.
    pub fn to_array(page: ObjectId, top: f64) -> Object {
        Object::Array(vec![
            Object::Reference(page),
            Object::name("XYZ"),
            Object::Integer(0),
            Object::Real(round_points(top)),
            Object::Null,
        ])
    }
}

/// A clickable area on a page, stored in points.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLink {
    /// Left edge
    pub x: f64,
    /// Top edge, measured from the bottom of the page
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub target: LinkTarget,
}

impl PageLink {
    /// `[left top right bottom]`
    pub fn rect(&self) -> Vec<Object> {
        [self.x, self.y, self.x + self.width, self.y - self.height]
            .iter()
            .map(|&v| Object::Real(round_points(v)))
            .collect()
    }

    /// Builds the `/Annot` dictionary.
    ///
    /// `destination` is the resolved `/Dest` array for internal links; an
    /// internal link without one yields no annotation.
    pub fn to_annotation(&self, destination: Option<Object>) -> Option<Dictionary> {
        let mut dict = Dictionary::new()
            .with("Type", Object::name("Annot"))
            .with("Subtype", Object::name("Link"))
            .with("Rect", self.rect())
            .with(
                "Border",
                vec![Object::Integer(0), Object::Integer(0), Object::Integer(0)],
            );

        match &self.target {
            LinkTarget::Uri(uri) => {
                dict.set(
                    "A",
                    Dictionary::new()
                        .with("S", Object::name("URI"))
                        .with("URI", text_string(uri)),
                );
            }
            LinkTarget::Internal(_) => {
                dict.set("Dest", destination?);
            }
        }

        Some(dict)
    }
}

fn round_points(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
