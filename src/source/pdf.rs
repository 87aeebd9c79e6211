use std::panic;
use std::path::Path;

use tracing::debug;

use crate::error::SourceError;

/// Plain text of a PDF file. Panics inside the PDF parser are reported as
/// `SourceError::Pdf`.
pub fn extract_text(path: &Path) -> Result<String, SourceError> {
    if !path.is_file() {
        return Err(SourceError::NotFound(path.display().to_string()));
    }

    let bytes = std::fs::read(path)?;
    debug!("Extracting text from {} ({} bytes)", path.display(), bytes.len());

    panic::catch_unwind(|| pdf_extract::extract_text_from_mem(&bytes))
        .map_err(|_| SourceError::Pdf("parser panicked".to_string()))?
        .map_err(|e| SourceError::Pdf(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file() {
        let err = extract_text(Path::new("tests/fixtures/missing.pdf")).unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    #[test]
    fn not_a_pdf() {
        let err = extract_text(Path::new("tests/fixtures/resume.txt")).unwrap_err();
        assert!(matches!(err, SourceError::Pdf(_)));
    }
}
