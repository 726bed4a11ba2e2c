//! # Text Extractor — Ordered Backend Chain
//!
//! Raw document bytes → plain text. Each document format has an ordered
//! chain of independent backends. A backend that fails or yields only
//! whitespace is skipped (logged at `warn!` / `debug!`), and the first
//! non-empty result wins. Only when every backend comes up empty is the
//! extraction fatal.
//!
//! ## Chains
//!
//! | Extension     | Backends                                |
//! |---------------|-----------------------------------------|
//! | `.pdf`        | `pdf-extract`, then `lopdf` per page    |
//! | `.docx`       | `docx-lite`                             |
//! | `.txt`, `.md` | strict UTF-8, then lossy UTF-8          |

use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{IngestError, IngestResult};

/// One way of turning document bytes into text.
pub trait ExtractionBackend: Send + Sync {
    /// Short backend identifier, recorded in the build manifest.
    fn name(&self) -> &'static str;

    /// Extract text. An empty string means "nothing usable", not failure.
    fn extract(&self, bytes: &[u8]) -> IngestResult<String>;
}

/// Primary PDF backend.
#[derive(Debug, Default)]
pub struct PdfExtractBackend;

impl ExtractionBackend for PdfExtractBackend {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn extract(&self, bytes: &[u8]) -> IngestResult<String> {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| IngestError::Backend {
            backend: self.name(),
            detail: e.to_string(),
        })
    }
}

/// Secondary PDF backend: page-by-page text operators via `lopdf`.
#[derive(Debug, Default)]
pub struct LopdfBackend;

impl ExtractionBackend for LopdfBackend {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn extract(&self, bytes: &[u8]) -> IngestResult<String> {
        let doc = lopdf::Document::load_mem(bytes).map_err(|e| IngestError::Backend {
            backend: self.name(),
            detail: e.to_string(),
        })?;
        let mut pages = Vec::new();
        for page in doc.get_pages().keys() {
            match doc.extract_text(&[*page]) {
                Ok(text) => pages.push(text),
                Err(e) => debug!(page, error = %e, "lopdf could not extract page text"),
            }
        }
        Ok(pages.join("\n"))
    }
}

/// DOCX backend.
#[derive(Debug, Default)]
pub struct DocxBackend;

impl ExtractionBackend for DocxBackend {
    fn name(&self) -> &'static str {
        "docx-lite"
    }

    fn extract(&self, bytes: &[u8]) -> IngestResult<String> {
        docx_lite::extract_text_from_bytes(bytes).map_err(|e| IngestError::Backend {
            backend: self.name(),
            detail: e.to_string(),
        })
    }
}

/// Plain text that must be valid UTF-8.
#[derive(Debug, Default)]
pub struct Utf8Backend;

impl ExtractionBackend for Utf8Backend {
    fn name(&self) -> &'static str {
        "utf-8"
    }

    fn extract(&self, bytes: &[u8]) -> IngestResult<String> {
        std::str::from_utf8(bytes)
            .map(|s| s.trim_start_matches('\u{FEFF}').to_string())
            .map_err(|e| IngestError::Backend {
                backend: self.name(),
                detail: e.to_string(),
            })
    }
}

/// Plain text with invalid sequences replaced by U+FFFD.
#[derive(Debug, Default)]
pub struct LossyUtf8Backend;

impl ExtractionBackend for LossyUtf8Backend {
    fn name(&self) -> &'static str {
        "utf-8-lossy"
    }

    fn extract(&self, bytes: &[u8]) -> IngestResult<String> {
        Ok(String::from_utf8_lossy(bytes)
            .trim_start_matches('\u{FEFF}')
            .to_string())
    }
}

/// Source document formats with an extraction chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentFormat {
    /// Select the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> IngestResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "txt" | "md" => Ok(Self::PlainText),
            _ => Err(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::PlainText => "text",
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text produced by the first successful backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    /// Name of the backend that produced `text`.
    pub backend: &'static str,
}

/// An ordered fallback chain of backends.
pub struct TextExtractor {
    backends: Vec<Box<dyn ExtractionBackend>>,
}

impl TextExtractor {
    /// Build an extractor from an explicit chain.
    pub fn new(backends: Vec<Box<dyn ExtractionBackend>>) -> Self {
        Self { backends }
    }

    /// The default chain for a document format.
    pub fn for_format(format: DocumentFormat) -> Self {
        let backends: Vec<Box<dyn ExtractionBackend>> = match format {
            DocumentFormat::Pdf => vec![Box::new(PdfExtractBackend), Box::new(LopdfBackend)],
            DocumentFormat::Docx => vec![Box::new(DocxBackend)],
            DocumentFormat::PlainText => vec![Box::new(Utf8Backend), Box::new(LossyUtf8Backend)],
        };
        Self::new(backends)
    }

    /// Backend names in chain order.
    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Run the chain over `bytes`. `origin` only labels errors and logs.
    pub fn extract(&self, bytes: &[u8], origin: &Path) -> IngestResult<ExtractedText> {
        for backend in &self.backends {
            match backend.extract(bytes) {
                Ok(text) if !text.trim().is_empty() => {
                    info!(
                        backend = backend.name(),
                        chars = text.chars().count(),
                        path = %origin.display(),
                        "text extracted"
                    );
                    return Ok(ExtractedText {
                        text,
                        backend: backend.name(),
                    });
                }
                Ok(_) => debug!(backend = backend.name(), "backend produced no text"),
                Err(e) => warn!(backend = backend.name(), error = %e, "extraction backend failed"),
            }
        }
        Err(IngestError::NoText {
            path: origin.to_path_buf(),
            tried: self.backend_names().join(", "),
        })
    }
}

/// Read a document from disk and extract its text with the chain for its
/// extension.
pub fn extract_file(path: &Path) -> IngestResult<ExtractedText> {
    let format = DocumentFormat::from_path(path)?;
    let bytes = std::fs::read(path).map_err(|e| IngestError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    TextExtractor::for_format(format).extract(&bytes, path)
}
