//! Table reconstruction from OCR word boxes.
//!
//! The pipeline is geometric and stateless: words are grouped into rows by vertical proximity,
//! split into cells by horizontal gaps and padded into a rectangular grid. Header rows are
//! flagged by a separate classifier and only affect rendering.

pub mod builder;
pub mod columns;
pub mod grid;
pub mod header;
pub mod hocr_parser;
pub mod rows;
pub mod serialize;
pub mod tsv_parser;
pub mod words;

pub use builder::TableBuilder;
pub use columns::{segment_row, segment_words};
pub use grid::{normalize, render_markup};
pub use header::{
    HeaderClassifier, LexicalHeaderClassifier, RowSignals, SignalHeaderClassifier, classify_headers,
    gap_coefficient_of_variation, matches_vocabulary,
};
pub use hocr_parser::extract_words_from_hocr;
pub use rows::{Row, cluster_rows};
pub use serialize::{table_to_markdown, table_to_tsv};
pub use tsv_parser::extract_words_from_tsv;
pub use words::sanitize_words;

use crate::types::RecognizedWord;
use crate::{LabscanError, Result};
use std::path::Path;

/// Serialized word formats accepted by [`parse_words`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordFormat {
    /// Tesseract TSV output.
    Tsv,
    /// hOCR document.
    Hocr,
    /// JSON array of [`RecognizedWord`].
    Json,
}

impl WordFormat {
    /// Guess the format from a file extension.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "tsv" | "txt" => Some(Self::Tsv),
            "hocr" | "html" | "htm" | "xhtml" => Some(Self::Hocr),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Format of a word file, from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| {
                LabscanError::UnsupportedFormat(format!(
                    "word file {} (expected .tsv, .txt, .hocr, .html, .htm, .xhtml or .json)",
                    path.display()
                ))
            })
    }
}

/// Parse words from any supported serialized form.
pub fn parse_words(data: &str, format: WordFormat, min_confidence: f64) -> Result<Vec<RecognizedWord>> {
    match format {
        WordFormat::Tsv => extract_words_from_tsv(data, min_confidence),
        WordFormat::Hocr => extract_words_from_hocr(data, min_confidence),
        WordFormat::Json => {
            let words: Vec<RecognizedWord> = serde_json::from_str(data)
                .map_err(|e| LabscanError::parsing_with_source("Invalid word list JSON", e))?;
            Ok(words)
        }
    }
}
