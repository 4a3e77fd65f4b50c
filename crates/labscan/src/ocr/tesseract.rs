//! Tesseract backend over `kreuzberg-tesseract`.
//!
//! A fresh engine handle is created for every call and dropped when the call returns, on the
//! error paths included. Handles are never stored or shared between threads.

use super::{OcrBackend, OcrOutput};
use crate::core::config::{OcrConfig, PageSegmentation};
use crate::table::extract_words_from_tsv;
use crate::{LabscanError, Result};
use image::DynamicImage;
use kreuzberg_tesseract::{TessPageSegMode, TesseractAPI};
use std::env;
use std::path::{Path, PathBuf};

const FALLBACK_TESSDATA_PATHS: &[&str] = &[
    "/opt/homebrew/share/tessdata",
    "/opt/homebrew/opt/tesseract/share/tessdata",
    "/usr/local/opt/tesseract/share/tessdata",
    "/usr/share/tesseract-ocr/5/tessdata",
    "/usr/share/tesseract-ocr/4/tessdata",
    "/usr/share/tessdata",
    "/usr/local/share/tessdata",
    r#"C:\Program Files\Tesseract-OCR\tessdata"#,
    r#"C:\ProgramData\Tesseract-OCR\tessdata"#,
];

/// Tesseract page segmentation modes used by [`PageSegmentation`].
const PSM_AUTO: i32 = 3;
const PSM_SINGLE_BLOCK: i32 = 6;

/// OCR backend driving a local Tesseract installation.
#[derive(Debug, Clone, Default)]
pub struct TesseractBackend;

impl TesseractBackend {
    pub fn new() -> Self {
        Self
    }
}

impl OcrBackend for TesseractBackend {
    fn name(&self) -> &str {
        "tesseract"
    }

    #[tracing::instrument(level = "debug", skip_all, fields(language = %config.language))]
    fn recognize(&self, image: &DynamicImage, config: &OcrConfig) -> Result<OcrOutput> {
        validate_language(&config.language)?;
        let tessdata_path = resolve_tessdata_path(config.tessdata_path.as_deref());
        match &tessdata_path {
            Some(path) => check_traineddata(path, &config.language)?,
            None => tracing::warn!("No tessdata directory found, relying on Tesseract's compiled-in default"),
        }
        let tessdata = tessdata_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();

        let rgb_image = image.to_rgb8();
        let (width, height) = rgb_image.dimensions();
        let bytes_per_pixel = 3;
        let bytes_per_line = width * bytes_per_pixel;

        let api = TesseractAPI::new();

        api.init(&tessdata, &config.language).map_err(|e| {
            LabscanError::MissingDependency(format!(
                "Failed to initialize Tesseract language '{}': {}",
                config.language, e
            ))
        })?;

        let psm = match config.page_segmentation {
            PageSegmentation::Auto => PSM_AUTO,
            PageSegmentation::SingleBlock => PSM_SINGLE_BLOCK,
        };
        api.set_page_seg_mode(TessPageSegMode::from_int(psm))
            .map_err(|e| LabscanError::ocr(format!("Failed to set page segmentation mode: {}", e)))?;

        api.set_variable(
            "preserve_interword_spaces",
            if config.preserve_interword_spaces { "1" } else { "0" },
        )
        .map_err(|e| LabscanError::ocr(format!("Failed to set preserve_interword_spaces: {}", e)))?;

        if let Some(whitelist) = config.char_whitelist.as_deref().filter(|w| !w.is_empty()) {
            api.set_variable("tessedit_char_whitelist", whitelist)
                .map_err(|e| LabscanError::ocr(format!("Failed to set tessedit_char_whitelist: {}", e)))?;
        }

        api.set_image(
            rgb_image.as_raw(),
            width as i32,
            height as i32,
            bytes_per_pixel as i32,
            bytes_per_line as i32,
        )
        .map_err(|e| LabscanError::ocr(format!("Failed to set image: {}", e)))?;

        api.recognize()
            .map_err(|e| LabscanError::ocr(format!("Failed to recognize text: {}", e)))?;

        let tsv = api
            .get_tsv_text(0)
            .map_err(|e| LabscanError::ocr(format!("Failed to extract TSV: {}", e)))?;
        let text = api
            .get_utf8_text()
            .map_err(|e| LabscanError::ocr(format!("Failed to extract text: {}", e)))?;

        let words = extract_words_from_tsv(&tsv, 0.0)?;
        tracing::debug!(width, height, words = words.len(), "Tesseract recognition complete");

        Ok(OcrOutput {
            text: strip_control_characters(&text),
            words,
        })
    }
}

/// Empty language codes crash some Tesseract builds instead of returning an error.
fn validate_language(language: &str) -> Result<()> {
    if language.trim().is_empty() || language.split('+').any(|lang| lang.trim().is_empty()) {
        return Err(LabscanError::validation(format!(
            "Invalid OCR language '{}'. Use codes such as 'eng' or 'eng+fra'",
            language
        )));
    }
    Ok(())
}

fn resolve_tessdata_path(configured: Option<&Path>) -> Option<PathBuf> {
    configured
        .map(Path::to_path_buf)
        .or_else(|| env::var_os("TESSDATA_PREFIX").map(PathBuf::from))
        .or_else(|| {
            FALLBACK_TESSDATA_PATHS
                .iter()
                .map(Path::new)
                .find(|p| p.exists())
                .map(Path::to_path_buf)
        })
}

/// A missing traineddata file crashes some Tesseract builds instead of returning an error.
fn check_traineddata(tessdata: &Path, language: &str) -> Result<()> {
    for lang in language.split('+').map(str::trim) {
        let traineddata = tessdata.join(format!("{}.traineddata", lang));
        if !traineddata.exists() {
            return Err(LabscanError::MissingDependency(format!(
                "Tesseract language '{}' not found: {} does not exist",
                lang,
                traineddata.display()
            )));
        }
    }
    Ok(())
}

fn strip_control_characters(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect()
}
