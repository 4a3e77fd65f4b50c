//! labscan - table reconstruction for scanned lab reports
//!
//! Turns the word boxes an OCR engine reports for a lab report page into a rectangular grid of
//! cells, flags the rows that hold column labels and renders the result as HTML, Markdown or TSV
//! for a downstream analysis step.
//!
//! # Quick Start
//!
//! ```rust
//! use labscan::{BoundingBox, RecognizedWord, TableConfig, reconstruct};
//!
//! let words = vec![
//!     RecognizedWord::new("Test", BoundingBox::new(0.0, 0.0, 40.0, 10.0)),
//!     RecognizedWord::new("Result", BoundingBox::new(200.0, 0.0, 260.0, 10.0)),
//!     RecognizedWord::new("Hemoglobine", BoundingBox::new(0.0, 50.0, 100.0, 60.0)),
//!     RecognizedWord::new("13.5", BoundingBox::new(200.0, 50.0, 240.0, 60.0)),
//! ];
//!
//! let table = reconstruct(&words, &TableConfig::default());
//! assert_eq!(table.grid.num_rows(), 2);
//! assert_eq!(table.grid.cell(1, 1), Some("13.5"));
//! assert!(table.is_header_row(0));
//! ```
//!
//! # Architecture
//!
//! - **Table** (`table`): row clustering, header classification, column segmentation, grid
//!   normalization and serialization; pure and synchronous
//! - **Core** (`core`): configuration and the page pipeline
//! - **Collaborators**: OCR backends (`ocr`, Tesseract with the `ocr` feature), image enhancers
//!   (`image`) and PDF pages (`pdf`, with the `pdf` feature)

#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod image;
pub mod ocr;
pub mod table;
pub mod types;

#[cfg(feature = "pdf")]
pub mod pdf;

pub use error::{LabscanError, Result};
pub use types::{BoundingBox, Grid, NO_DATA_MARKER, RecognizedWord, ReconstructedTable};

pub use core::config::{HeaderConfig, HeaderStrategy, LabscanConfig, OcrConfig, PdfConfig, TableConfig};
pub use core::pipeline::{PageResult, PageSource, has_usable_text, process_image, reconstruct, reconstruct_pages};

#[cfg(feature = "pdf")]
pub use core::pipeline::process_pdf;

pub use crate::image::ImageEnhancer;
pub use ocr::{OcrBackend, OcrOutput};
pub use table::{TableBuilder, WordFormat, parse_words};
