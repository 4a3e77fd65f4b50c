//! Configuration loading and management.
//!
//! Every threshold used by the reconstruction heuristics lives here instead of being
//! hard-coded in the algorithms.
//!
//! # Resolution coupling
//!
//! `row_tolerance` and `gap_threshold` are pixel distances in the coordinate space the OCR
//! collaborator reports words in. The defaults are tuned for pages rendered at
//! [`REFERENCE_RENDER_SCALE`] (1.5x). Rendering or upscaling at a different resolution must scale
//! both by the same factor, which is what [`TableConfig::scaled`] does and what the pipeline
//! applies automatically for the enhancer's upscale factor and for `PdfConfig::render_scale`.
//! Tune the two together: they share one coordinate space.

use crate::{LabscanError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Render scale the default pixel thresholds were tuned at.
pub const REFERENCE_RENDER_SCALE: f64 = 1.5;

/// Name of the file searched by [`LabscanConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "labscan.toml";

/// Top-level configuration.
///
/// ```rust
/// use labscan::core::config::LabscanConfig;
///
/// let config = LabscanConfig::default();
/// assert_eq!(config.table.gap_threshold, 20.0);
///
/// // let config = LabscanConfig::from_toml_file("labscan.toml")?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabscanConfig {
    /// Table reconstruction thresholds
    #[serde(default)]
    pub table: TableConfig,

    /// OCR collaborator settings
    #[serde(default)]
    pub ocr: OcrConfig,

    /// PDF collaborator settings
    #[serde(default)]
    pub pdf: PdfConfig,
}

/// Thresholds for row clustering, column segmentation and grid rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Maximum distance (px) between a word's vertical center and a row's running average.
    #[serde(default = "default_row_tolerance")]
    pub row_tolerance: f64,

    /// Horizontal gap (px) between consecutive words above which a new cell starts.
    #[serde(default = "default_gap_threshold")]
    pub gap_threshold: f64,

    /// Words with a known confidence below this floor are dropped (0-100).
    #[serde(default)]
    pub min_confidence: f64,

    /// Filler for padded and blank cells.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    #[serde(default)]
    pub header: HeaderConfig,
}

/// Header detection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderStrategy {
    /// Lexical OR structural signals, with the first-rows fallback.
    #[default]
    Combined,
    /// Vocabulary match only.
    Lexical,
    /// Never flag header rows.
    Disabled,
}

/// Signals used by the header classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderConfig {
    #[serde(default)]
    pub strategy: HeaderStrategy,

    /// Lowercase column-name keywords; a row whose lowercase text contains any of them is a header.
    #[serde(default = "default_vocabulary")]
    pub vocabulary: Vec<String>,

    /// Minimum words for the structural and fallback checks.
    #[serde(default = "default_min_words")]
    pub min_words: usize,

    /// Minimum row width / document width for the structural check.
    #[serde(default = "default_min_span_ratio")]
    pub min_span_ratio: f64,

    /// Fraction of the document height, from the top, a structural header must start in.
    #[serde(default = "default_top_fraction")]
    pub top_fraction: f64,

    /// Maximum coefficient of variation of inter-word gaps for the structural check.
    #[serde(default = "default_max_gap_cv")]
    pub max_gap_cv: f64,

    /// Number of leading rows scanned by the fallback.
    #[serde(default = "default_fallback_rows")]
    pub fallback_rows: usize,

    /// Span ratio the fallback row must exceed.
    #[serde(default = "default_fallback_span_ratio")]
    pub fallback_span_ratio: f64,
}

/// Page segmentation assumption handed to the OCR engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSegmentation {
    /// Automatic layout detection.
    #[default]
    Auto,
    /// Treat the page as one uniform block of text.
    SingleBlock,
}

/// OCR collaborator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Language code (e.g., "eng", "fra", "eng+fra")
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub page_segmentation: PageSegmentation,

    /// Restricts recognized characters when set.
    #[serde(default)]
    pub char_whitelist: Option<String>,

    #[serde(default = "default_true")]
    pub preserve_interword_spaces: bool,

    /// Tessdata directory; falls back to `TESSDATA_PREFIX` and well-known install locations.
    #[serde(default)]
    pub tessdata_path: Option<std::path::PathBuf>,
}

/// PDF collaborator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfConfig {
    /// Scale factor pages are rendered at before OCR.
    #[serde(default = "default_render_scale")]
    pub render_scale: f64,

    /// Embedded text longer than this (trimmed, in chars) skips OCR entirely.
    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,
}

fn default_true() -> bool {
    true
}
fn default_row_tolerance() -> f64 {
    15.0
}
fn default_gap_threshold() -> f64 {
    20.0
}
fn default_placeholder() -> String {
    "—".to_string()
}
fn default_vocabulary() -> Vec<String> {
    [
        // English
        "test",
        "result",
        "unit",
        "reference",
        "range",
        "value",
        "parameter",
        // French
        "analyse",
        "examen",
        "résultat",
        "resultat",
        "unité",
        "valeurs de référence",
        "normes",
        "paramètre",
    ]
    .iter()
    .map(|term| term.to_string())
    .collect()
}
fn default_min_words() -> usize {
    3
}
fn default_min_span_ratio() -> f64 {
    0.5
}
fn default_top_fraction() -> f64 {
    1.0 / 3.0
}
fn default_max_gap_cv() -> f64 {
    0.7
}
fn default_fallback_rows() -> usize {
    5
}
fn default_fallback_span_ratio() -> f64 {
    0.4
}
fn default_language() -> String {
    "eng".to_string()
}
fn default_render_scale() -> f64 {
    REFERENCE_RENDER_SCALE
}
fn default_min_text_chars() -> usize {
    50
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            row_tolerance: default_row_tolerance(),
            gap_threshold: default_gap_threshold(),
            min_confidence: 0.0,
            placeholder: default_placeholder(),
            header: HeaderConfig::default(),
        }
    }
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            strategy: HeaderStrategy::default(),
            vocabulary: default_vocabulary(),
            min_words: default_min_words(),
            min_span_ratio: default_min_span_ratio(),
            top_fraction: default_top_fraction(),
            max_gap_cv: default_max_gap_cv(),
            fallback_rows: default_fallback_rows(),
            fallback_span_ratio: default_fallback_span_ratio(),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            page_segmentation: PageSegmentation::default(),
            char_whitelist: None,
            preserve_interword_spaces: true,
            tessdata_path: None,
        }
    }
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            render_scale: default_render_scale(),
            min_text_chars: default_min_text_chars(),
        }
    }
}

impl TableConfig {
    /// Copy with both pixel thresholds multiplied by `factor`.
    ///
    /// Non-finite or non-positive factors leave the thresholds unchanged.
    pub fn scaled(&self, factor: f64) -> Self {
        if !factor.is_finite() || factor <= 0.0 {
            return self.clone();
        }
        Self {
            row_tolerance: self.row_tolerance * factor,
            gap_threshold: self.gap_threshold * factor,
            ..self.clone()
        }
    }

    /// Replace thresholds the algorithms cannot work with by their defaults.
    ///
    /// A NaN tolerance would merge every word into one row and a zero tolerance would split every
    /// word into its own row, so neither survives. Each replacement is logged at warn.
    pub fn with_usable_thresholds(mut self) -> Self {
        if !self.row_tolerance.is_finite() || self.row_tolerance <= 0.0 {
            tracing::warn!(
                row_tolerance = self.row_tolerance,
                "Unusable row_tolerance, using the default"
            );
            self.row_tolerance = default_row_tolerance();
        }
        if !self.gap_threshold.is_finite() || self.gap_threshold < 0.0 {
            tracing::warn!(
                gap_threshold = self.gap_threshold,
                "Unusable gap_threshold, using the default"
            );
            self.gap_threshold = default_gap_threshold();
        }
        if !self.min_confidence.is_finite() {
            tracing::warn!(
                min_confidence = self.min_confidence,
                "Unusable min_confidence, using the default"
            );
            self.min_confidence = Self::default().min_confidence;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.row_tolerance.is_finite() || self.row_tolerance <= 0.0 {
            return Err(LabscanError::validation(format!(
                "row_tolerance must be a positive number of pixels, got {}",
                self.row_tolerance
            )));
        }
        if !self.gap_threshold.is_finite() || self.gap_threshold < 0.0 {
            return Err(LabscanError::validation(format!(
                "gap_threshold must be a non-negative number of pixels, got {}",
                self.gap_threshold
            )));
        }
        if !self.min_confidence.is_finite() {
            return Err(LabscanError::validation("min_confidence must be finite"));
        }
        self.header.validate()
    }
}

impl HeaderConfig {
    pub fn validate(&self) -> Result<()> {
        let ratios = [
            ("min_span_ratio", self.min_span_ratio),
            ("top_fraction", self.top_fraction),
            ("fallback_span_ratio", self.fallback_span_ratio),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(LabscanError::validation(format!(
                    "header.{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if !self.max_gap_cv.is_finite() || self.max_gap_cv < 0.0 {
            return Err(LabscanError::validation(format!(
                "header.max_gap_cv must be non-negative, got {}",
                self.max_gap_cv
            )));
        }
        Ok(())
    }
}

impl PdfConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.render_scale.is_finite() || self.render_scale <= 0.0 {
            return Err(LabscanError::validation(format!(
                "pdf.render_scale must be positive, got {}",
                self.render_scale
            )));
        }
        Ok(())
    }

    /// Factor to apply to the table thresholds for pages rendered at `render_scale`.
    pub fn threshold_factor(&self) -> f64 {
        self.render_scale / REFERENCE_RENDER_SCALE
    }
}

impl LabscanConfig {
    pub fn validate(&self) -> Result<()> {
        self.table.validate()?;
        self.pdf.validate()?;
        if self.ocr.language.trim().is_empty() {
            return Err(LabscanError::validation("ocr.language cannot be empty"));
        }
        Ok(())
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `LabscanError::Validation` if the file doesn't exist, is invalid TOML,
    /// or holds out-of-range values.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| LabscanError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = serde_yaml_ng::from_str(&content)
            .map_err(|e| LabscanError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| LabscanError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, picking the format from the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("toml") => Self::from_toml_file(path),
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(LabscanError::UnsupportedFormat(format!(
                "config file {} (expected .toml, .yaml, .yml or .json)",
                path.display()
            ))),
        }
    }

    /// Discover `labscan.toml` in the current directory or its parents.
    ///
    /// # Returns
    ///
    /// - `Some(config)` if found
    /// - `None` if no config file found
    pub fn discover() -> Result<Option<Self>> {
        let mut current = std::env::current_dir().map_err(LabscanError::Io)?;

        loop {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                tracing::debug!("Using configuration from {}", candidate.display());
                return Ok(Some(Self::from_toml_file(candidate)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| LabscanError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}
