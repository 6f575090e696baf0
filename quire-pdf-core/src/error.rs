use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Font error: {0}")]
    Font(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unable to create output file: {}", path.display())]
    OutputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Some data has already been output, can't send PDF file")]
    OutputStarted,

    #[error("Invalid state: {0}")]
    State(String),

    #[error("Invalid PDF structure: {0}")]
    InvalidStructure(String),
}

/// Coarse classification of a [`PdfError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Bad unit, orientation, page size or rotation
    Configuration,
    /// Undefined font or style, or a text call with no font selected
    Font,
    /// Malformed or unsupported image data
    Image,
    /// Output could not be written or sent
    Io,
    /// Operation not valid in the document's current lifecycle state
    State,
}

impl PdfError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PdfError::Configuration(_) => ErrorCategory::Configuration,
            PdfError::Font(_) => ErrorCategory::Font,
            PdfError::Image(_) => ErrorCategory::Image,
            PdfError::Io(_) | PdfError::OutputFile { .. } | PdfError::OutputStarted => {
                ErrorCategory::Io
            }
            PdfError::State(_) | PdfError::InvalidStructure(_) => ErrorCategory::State,
        }
    }

    pub(crate) fn closed() -> Self {
        PdfError::State("The document is closed".to_string())
    }

    pub(crate) fn no_font() -> Self {
        PdfError::Font("No font has been set".to_string())
    }
}

pub type Result<T> = std::result::Result<T, PdfError>;
