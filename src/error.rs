use thiserror::Error;

/// Failure to obtain a source document. Callers at the service boundary log
/// these and treat the document as absent.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("unexpected HTTP status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF text extraction failed: {0}")]
    Pdf(String),
}

/// A project identifier that cannot be split into `owner/repo`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed project identifier '{input}': {reason}")]
pub struct IdentifierError {
    pub input: String,
    pub reason: &'static str,
}
