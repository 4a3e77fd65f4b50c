//! Reconstruction entry points and page orchestration.
//!
//! [`reconstruct`] is the pure core: words in, table out, no I/O. The `process_*` functions
//! wire the collaborators around it: optional image enhancement, OCR and, for PDFs, the
//! embedded-text fast path.

use crate::Result;
use crate::core::config::{LabscanConfig, TableConfig};
use crate::image::ImageEnhancer;
use crate::ocr::OcrBackend;
use crate::table::TableBuilder;
use crate::types::{RecognizedWord, ReconstructedTable};
use image::DynamicImage;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Reconstruct one table from one page's words.
///
/// Never fails: unusable words are dropped and an empty or sparse input gives an empty or
/// sparse table.
pub fn reconstruct(words: &[RecognizedWord], config: &TableConfig) -> ReconstructedTable {
    TableBuilder::new(config.clone()).build(words)
}

/// Reconstruct independent pages in parallel. Output order matches input order.
pub fn reconstruct_pages(pages: &[Vec<RecognizedWord>], config: &TableConfig) -> Vec<ReconstructedTable> {
    let builder = TableBuilder::new(config.clone());
    pages.par_iter().map(|words| builder.build(words)).collect()
}

/// True when an embedded text layer is long enough to skip OCR.
pub fn has_usable_text(text: &str, min_chars: usize) -> bool {
    text.trim().chars().count() > min_chars
}

/// Where a page's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSource {
    /// Embedded PDF text layer; no OCR and no table reconstruction.
    EmbeddedText,
    /// OCR of a rendered or supplied image.
    Ocr,
}

/// Result for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub page_index: usize,
    pub source: PageSource,
    pub text: String,
    /// Present for OCR pages, possibly empty.
    pub table: Option<ReconstructedTable>,
}

impl PageResult {
    /// Text handed to the analysis collaborator: the table when one was reconstructed, the raw
    /// text otherwise.
    pub fn analysis_text(&self) -> String {
        match &self.table {
            Some(table) => table.to_analysis_text(),
            None => self.text.clone(),
        }
    }
}

/// Enhance, recognize and reconstruct a single image.
///
/// The image is taken to be at the reference resolution; thresholds are scaled by the
/// enhancer's factor only.
pub fn process_image(
    image: &DynamicImage,
    backend: &dyn OcrBackend,
    enhancer: Option<&dyn ImageEnhancer>,
    config: &LabscanConfig,
) -> Result<PageResult> {
    recognize_page(0, image, backend, enhancer, config, 1.0)
}

#[tracing::instrument(level = "debug", skip_all, fields(page = page_index, backend = backend.name()))]
fn recognize_page(
    page_index: usize,
    image: &DynamicImage,
    backend: &dyn OcrBackend,
    enhancer: Option<&dyn ImageEnhancer>,
    config: &LabscanConfig,
    base_factor: f64,
) -> Result<PageResult> {
    let (ocr_output, factor) = match enhancer {
        Some(enhancer) => {
            let enhanced = enhancer.enhance(image)?;
            (backend.recognize(&enhanced, &config.ocr)?, base_factor * enhancer.scale_factor())
        }
        None => (backend.recognize(image, &config.ocr)?, base_factor),
    };

    let table_config = config.table.scaled(factor);
    tracing::debug!(
        words = ocr_output.words.len(),
        row_tolerance = table_config.row_tolerance,
        gap_threshold = table_config.gap_threshold,
        "Reconstructing OCR page"
    );
    let table = reconstruct(&ocr_output.words, &table_config);

    Ok(PageResult {
        page_index,
        source: PageSource::Ocr,
        text: ocr_output.text,
        table: Some(table),
    })
}

/// Process every page of a PDF, sequentially.
///
/// Pages whose embedded text is usable skip OCR and carry no table. Other pages are rendered at
/// `config.pdf.render_scale`, with thresholds scaled relative to the reference render scale.
#[cfg(feature = "pdf")]
pub fn process_pdf(
    pdf_bytes: &[u8],
    backend: &dyn OcrBackend,
    enhancer: Option<&dyn ImageEnhancer>,
    config: &LabscanConfig,
) -> Result<Vec<PageResult>> {
    let source = crate::pdf::PdfPageSource::new()?;
    let document = source.open(pdf_bytes)?;
    let page_count = document.page_count();
    tracing::debug!(page_count, "Processing PDF");

    let mut results = Vec::with_capacity(page_count);
    for page_index in 0..page_count {
        let text = document.extract_page_text(page_index)?;
        if has_usable_text(&text, config.pdf.min_text_chars) {
            tracing::debug!(page = page_index, chars = text.len(), "Using embedded text layer");
            results.push(PageResult {
                page_index,
                source: PageSource::EmbeddedText,
                text,
                table: None,
            });
            continue;
        }

        let image = document.render_page(page_index, config.pdf.render_scale)?;
        results.push(recognize_page(
            page_index,
            &image,
            backend,
            enhancer,
            config,
            config.pdf.threshold_factor(),
        )?);
    }

    Ok(results)
}
