//! OCR collaborator.
//!
//! The reconstruction core never calls an OCR engine itself; it consumes the words an
//! [`OcrBackend`] returns. The bundled Tesseract backend is available with the `ocr` feature.

#[cfg(feature = "ocr")]
pub mod tesseract;

#[cfg(feature = "ocr")]
pub use tesseract::TesseractBackend;

use crate::Result;
use crate::core::config::OcrConfig;
use crate::types::RecognizedWord;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Recognition result for one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrOutput {
    /// Plain text in reading order.
    pub text: String,
    /// Word boxes in the coordinate space of the recognized image.
    pub words: Vec<RecognizedWord>,
}

/// Trait for OCR engines.
///
/// Backends must be thread-safe (`Send + Sync`) so pages can be recognized concurrently.
///
/// # Example
///
/// ```rust
/// use image::DynamicImage;
/// use labscan::core::config::OcrConfig;
/// use labscan::ocr::{OcrBackend, OcrOutput};
/// use labscan::{BoundingBox, RecognizedWord, Result};
///
/// struct FixedBackend;
///
/// impl OcrBackend for FixedBackend {
///     fn name(&self) -> &str {
///         "fixed"
///     }
///
///     fn recognize(&self, _image: &DynamicImage, _config: &OcrConfig) -> Result<OcrOutput> {
///         Ok(OcrOutput {
///             text: "Glucose".to_string(),
///             words: vec![RecognizedWord::new("Glucose", BoundingBox::new(0.0, 0.0, 60.0, 10.0))],
///         })
///     }
/// }
/// ```
pub trait OcrBackend: Send + Sync {
    /// Backend identifier used in logs.
    fn name(&self) -> &str;

    /// Recognize `image`, returning its text and word boxes.
    fn recognize(&self, image: &DynamicImage, config: &OcrConfig) -> Result<OcrOutput>;
}
