//! Output destinations for a finished document.
//!
//! The serialized file is produced once by [`Document::close`]; a destination
//! only decides where those bytes go. Inline and download destinations write
//! to a [`ResponseSink`], which is how a web framework's response object is
//! plugged in.

use crate::document::Document;
use crate::error::{PdfError, Result};
use std::path::{Path, PathBuf};

/// File name used when a destination doesn't name one.
pub const DEFAULT_FILE_NAME: &str = "doc.pdf";

/// Receives a PDF sent with HTTP-style headers.
pub trait ResponseSink {
    /// Whether headers or body bytes have already been sent.
    fn output_started(&self) -> bool;

    fn set_header(&mut self, name: &str, value: &str);

    fn write_body(&mut self, body: &[u8]) -> Result<()>;
}

/// In-memory [`ResponseSink`], convertible into a framework response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpResponse {
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl HttpResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_parts(self) -> (Vec<(String, String)>, Vec<u8>) {
        (self.headers, self.body)
    }
}

impl ResponseSink for HttpResponse {
    fn output_started(&self) -> bool {
        !self.body.is_empty()
    }

    fn set_header(&mut self, name: &str, value: &str) {
        match self
            .headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some(existing) => existing.1 = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    fn write_body(&mut self, body: &[u8]) -> Result<()> {
        self.body.extend_from_slice(body);
        Ok(())
    }
}

/// Where [`Document::output`] sends the file.
pub enum Destination<'a> {
    /// Displayed by the client (`Content-Disposition: inline`).
    Inline {
        sink: &'a mut dyn ResponseSink,
        name: Option<&'a str>,
    },
    /// Saved by the client (`Content-Disposition: attachment`).
    Download {
        sink: &'a mut dyn ResponseSink,
        name: Option<&'a str>,
    },
    File(PathBuf),
    ReturnBytes,
}

impl std::fmt::Debug for Destination<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Destination::Inline { name, .. } => f.debug_struct("Inline").field("name", name).finish(),
            Destination::Download { name, .. } => {
                f.debug_struct("Download").field("name", name).finish()
            }
            Destination::File(path) => f.debug_tuple("File").field(path).finish(),
            Destination::ReturnBytes => f.write_str("ReturnBytes"),
        }
    }
}

impl Document {
    /// Closes the document if needed and sends it to `destination`.
    ///
    /// Only [`Destination::ReturnBytes`] returns the bytes.
    pub fn output(&mut self, destination: Destination<'_>) -> Result<Option<Vec<u8>>> {
        self.close()?;
        let bytes = self
            .buffer()
            .ok_or_else(|| PdfError::InvalidStructure("Document has no output".to_string()))?;

        match destination {
            Destination::Inline { sink, name } => {
                send(sink, "inline", name.unwrap_or(DEFAULT_FILE_NAME), bytes)?;
                Ok(None)
            }
            Destination::Download { sink, name } => {
                send(sink, "attachment", name.unwrap_or(DEFAULT_FILE_NAME), bytes)?;
                Ok(None)
            }
            Destination::File(path) => {
                write_file(&path, bytes)?;
                Ok(None)
            }
            Destination::ReturnBytes => Ok(Some(bytes.to_vec())),
        }
    }

    /// Closes the document and writes it to `path`.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.output(Destination::File(path.as_ref().to_path_buf()))
            .map(|_| ())
    }
}

fn send(sink: &mut dyn ResponseSink, disposition: &str, name: &str, bytes: &[u8]) -> Result<()> {
    if sink.output_started() {
        return Err(PdfError::OutputStarted);
    }
    tracing::debug!(disposition, name, bytes = bytes.len(), "sending document");
    sink.set_header("Content-Type", "application/pdf");
    sink.set_header(
        "Content-Disposition",
        &format!("{disposition}; {}", disposition_filename(name)),
    );
    sink.set_header("Cache-Control", "private, max-age=0, must-revalidate");
    sink.set_header("Pragma", "public");
    sink.write_body(bytes)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "writing document");
    std::fs::write(path, bytes).map_err(|source| PdfError::OutputFile {
        path: path.to_path_buf(),
        source,
    })
}

/// `filename="..."` for ASCII names, RFC 5987 `filename*=` otherwise.
fn disposition_filename(name: &str) -> String {
    if name.is_ascii() {
        format!("filename=\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        format!("filename*=UTF-8''{}", percent_encode(name))
    }
}

fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len() * 3);
    for &b in value.as_bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}
