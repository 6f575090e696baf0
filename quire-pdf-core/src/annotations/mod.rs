//! Link annotations.
//!
//! Links are collected per page while drawing and turned into `/Annot`
//! dictionaries when the document is written.

mod link;

pub use link::{LinkDestination, LinkId, LinkTarget, PageLink};
