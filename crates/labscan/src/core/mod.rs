//! Configuration and reconstruction entry points.
//!
//! - **Configuration** (`config`): every threshold, with file loading and discovery
//! - **Pipeline** (`pipeline`): `reconstruct` for word sets, `process_image` / `process_pdf` for
//!   pages that still need OCR

pub mod config;
pub mod pipeline;

pub use config::{HeaderConfig, HeaderStrategy, LabscanConfig, OcrConfig, PageSegmentation, PdfConfig, TableConfig};
pub use pipeline::{PageResult, PageSource, has_usable_text, process_image, reconstruct, reconstruct_pages};

#[cfg(feature = "pdf")]
pub use pipeline::process_pdf;
