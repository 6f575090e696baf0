//! # quire-pdf-api
//!
//! HTTP service that renders quire-pdf layout scripts
//!
//! `POST /api/render` takes a JSON layout script and answers with the PDF,
//! inline by default or as an attachment with `?download=true`.

mod api;
pub use api::{app, health_check, render_pdf, AppError, ErrorResponse, RenderQuery};
