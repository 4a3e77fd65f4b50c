//! PDF renderer collaborator.
//!
//! Gives access to a document's embedded text layer, used as a fast path when a report was
//! generated digitally, and renders pages to images for OCR otherwise.
//!
//! Requires the `pdf` feature and a Pdfium shared library on the system.

pub mod document;
pub mod error;

pub use document::{PdfPageSource, PdfPages};
pub use error::PdfError;
