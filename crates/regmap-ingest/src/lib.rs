//! # regmap-ingest — Source Document to Paragraph Tree
//!
//! The first three stages of the offline build:
//!
//! - [`extract`]: document bytes → raw text through an ordered chain of
//!   backends (`pdf-extract`, `lopdf`, `docx-lite`, UTF-8).
//! - [`normalize`]: raw text → canonical text (artifact cleanup, Unicode
//!   unification, reflow, whitespace collapsing).
//! - [`parse`]: canonical text → [`regmap_core::ParagraphTree`].
//!
//! [`Ingestor`] wires the three together for one marker configuration.

pub mod error;
pub mod extract;
pub mod markers;
pub mod normalize;
pub mod parse;

use std::path::Path;

pub use error::{IngestError, IngestResult};
pub use extract::{extract_file, DocumentFormat, ExtractedText, ExtractionBackend, TextExtractor};
pub use markers::ChapterMarkers;
pub use normalize::Normalizer;
pub use parse::{leading_number, ChapterHeader, ParagraphParser};

use regmap_core::ParagraphTree;

/// A parsed document together with the backend that produced its text.
#[derive(Debug, Clone)]
pub struct IngestedDocument {
    pub tree: ParagraphTree,
    pub backend: &'static str,
}

/// Normalizer and parser compiled for one marker configuration.
#[derive(Debug, Clone)]
pub struct Ingestor {
    normalizer: Normalizer,
    parser: ParagraphParser,
}

impl Ingestor {
    pub fn new(markers: &ChapterMarkers) -> IngestResult<Self> {
        Ok(Self {
            normalizer: Normalizer::new(markers)?,
            parser: ParagraphParser::new(markers)?,
        })
    }

    /// Normalize and parse already-extracted text.
    pub fn parse_text(&self, raw: &str) -> ParagraphTree {
        self.parser.parse(&self.normalizer.normalize_pipeline(raw))
    }

    /// Extract, normalize, and parse a document on disk.
    pub fn ingest_file(&self, path: &Path) -> IngestResult<IngestedDocument> {
        let extracted = extract_file(path)?;
        Ok(IngestedDocument {
            tree: self.parse_text(&extracted.text),
            backend: extracted.backend,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn ingest_text_file_end_to_end() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "'פרק4 – משרד הבריאות'").unwrap();
        writeln!(file, "4.1 חובת רחי-").unwrap();
        writeln!(file, "צת ידיים").unwrap();
        writeln!(file, "12").unwrap();
        let doc = Ingestor::new(&ChapterMarkers::default())
            .unwrap()
            .ingest_file(file.path())
            .unwrap();
        assert_eq!(doc.backend, "utf-8");
        assert_eq!(
            doc.tree.paragraph_text("משרד הבריאות", "4.1"),
            "4.1 חובת רחיצת ידיים"
        );
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let file = tempfile::Builder::new().suffix(".rtf").tempfile().unwrap();
        let err = Ingestor::new(&ChapterMarkers::default())
            .unwrap()
            .ingest_file(file.path())
            .unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFormat { .. }));
    }
}
