//! Error types for the scan-effect library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the scan-effect library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Invalid PDF (no pages)
    #[error("PDF has no pages: {}", .0.display())]
    EmptyPdf(PathBuf),

    /// The PDFium library could not be bound
    #[error("PDF renderer unavailable: {0}")]
    RendererUnavailable(String),

    /// The input document could not be opened by the renderer
    #[error("Failed to open {}: {message}", path.display())]
    Open { path: PathBuf, message: String },

    /// A page could not be rasterized
    #[error("Failed to render page {page}: {message}")]
    Render { page: usize, message: String },

    /// Raster-to-JPEG encoding or page embedding failed
    #[error("Encoding error: {0}")]
    Encode(String),

    /// A failure tied to a specific page (zero-based index)
    #[error("Page {page}: {source}")]
    Page {
        page: usize,
        #[source]
        source: Box<Error>,
    },

    /// The run was cancelled between pages
    #[error("Cancelled after {completed} page(s)")]
    Cancelled { completed: usize },

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Attach a page index to this error, unless it already carries one.
    pub fn at_page(self, page: usize) -> Self {
        match self {
            Error::Render { .. } | Error::Page { .. } | Error::Cancelled { .. } => self,
            other => Error::Page {
                page,
                source: Box::new(other),
            },
        }
    }

    /// True for failures that come from opening or rasterizing the input.
    pub fn is_render_error(&self) -> bool {
        match self {
            Error::FileNotFound(_)
            | Error::EmptyPdf(_)
            | Error::RendererUnavailable(_)
            | Error::Open { .. }
            | Error::Render { .. } => true,
            Error::Page { source, .. } => source.is_render_error(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_page_wraps_encode_errors() {
        let err = Error::Encode("bad stream".to_string()).at_page(3);
        assert!(matches!(err, Error::Page { page: 3, .. }));
        assert_eq!(err.to_string(), "Page 3: Encoding error: bad stream");
    }

    #[test]
    fn test_at_page_keeps_render_errors() {
        let err = Error::Render {
            page: 1,
            message: "bad content stream".to_string(),
        }
        .at_page(1);
        assert!(matches!(err, Error::Render { page: 1, .. }));
        assert!(err.is_render_error());
    }

    #[test]
    fn test_missing_file_is_render_error() {
        assert!(Error::FileNotFound(PathBuf::from("missing.pdf")).is_render_error());
        assert!(!Error::Encode("x".to_string()).is_render_error());
    }
}
