//! Error types for labscan.
//!
//! The reconstruction core never fails: malformed or sparse word sets degrade to a
//! best-effort (possibly empty) grid. Errors exist only for the collaborators around it:
//! configuration files, word sources, OCR, PDF rendering and image decoding.
//!
//! **System errors bubble up unchanged:** `LabscanError::Io` wraps `std::io::Error`
//! and is never rewrapped into another variant.
//!
//! **Application errors carry context:**
//! - `Parsing` - unreadable TSV/hOCR/JSON word sources, corrupt PDFs
//! - `Validation` - invalid configuration values
//! - `Ocr` - OCR engine failures
//! - `MissingDependency` - OCR language data or PDF library not available
//! - `UnsupportedFormat` - configuration or word files with an unknown extension
//!
//! # Example
//!
//! ```rust
//! use labscan::{LabscanError, Result};
//!
//! fn read_words(path: &str) -> Result<String> {
//!     let content = std::fs::read_to_string(path)?;
//!     if content.trim().is_empty() {
//!         return Err(LabscanError::validation(format!("Word file is empty: {}", path)));
//!     }
//!     Ok(content)
//! }
//! ```
use thiserror::Error;

/// Result type alias using `LabscanError`.
pub type Result<T> = std::result::Result<T, LabscanError>;

/// Main error type for all fallible labscan operations.
#[derive(Debug, Error)]
pub enum LabscanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parsing error: {message}")]
    Parsing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("OCR error: {message}")]
    Ocr {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Image processing error: {message}")]
    ImageProcessing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl From<serde_json::Error> for LabscanError {
    fn from(err: serde_json::Error) -> Self {
        LabscanError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<image::ImageError> for LabscanError {
    fn from(err: image::ImageError) -> Self {
        LabscanError::ImageProcessing {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(feature = "pdf")]
impl From<crate::pdf::error::PdfError> for LabscanError {
    fn from(err: crate::pdf::error::PdfError) -> Self {
        LabscanError::Parsing {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl LabscanError {
    error_constructor!(parsing, Parsing);
    error_constructor!(ocr, Ocr);
    error_constructor!(validation, Validation);
    error_constructor!(image_processing, ImageProcessing);
    error_constructor!(serialization, Serialization);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: LabscanError = io_err.into();
        assert!(matches!(err, LabscanError::Io(_)));
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_parsing_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad bbox");
        let err = LabscanError::parsing_with_source("invalid hOCR", source);
        assert_eq!(err.to_string(), "Parsing error: invalid hOCR");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_validation_error() {
        let err = LabscanError::validation("row_tolerance must be positive");
        assert_eq!(err.to_string(), "Validation error: row_tolerance must be positive");
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn test_ocr_error() {
        let err = LabscanError::ocr("engine unavailable");
        assert_eq!(err.to_string(), "OCR error: engine unavailable");
    }

    #[test]
    fn test_missing_dependency_error() {
        let err = LabscanError::MissingDependency("fra.traineddata".to_string());
        assert_eq!(err.to_string(), "Missing dependency: fra.traineddata");
    }

    #[test]
    fn test_unsupported_format_error() {
        let err = LabscanError::UnsupportedFormat("words.dat".to_string());
        assert_eq!(err.to_string(), "Unsupported format: words.dat");
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: LabscanError = json_err.into();
        assert!(matches!(err, LabscanError::Serialization { .. }));
        assert!(err.to_string().contains("Serialization error"));
    }

    #[test]
    fn test_image_error_conversion() {
        let image_err = image::load_from_memory(b"definitely not an image").unwrap_err();
        let err: LabscanError = image_err.into();
        assert!(matches!(err, LabscanError::ImageProcessing { .. }));
    }

    #[test]
    fn test_io_error_bubbles_unchanged() {
        fn read_file() -> Result<String> {
            let content = std::fs::read_to_string("/nonexistent/words.tsv")?;
            Ok(content)
        }

        assert!(matches!(read_file().unwrap_err(), LabscanError::Io(_)));
    }
}
