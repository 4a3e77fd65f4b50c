//! Image enhancer collaborator.
//!
//! Pre-processing filters (binarization, denoising, deskew) are supplied by callers through
//! [`ImageEnhancer`]; none ship with the crate.

use crate::Result;
use image::DynamicImage;

/// Transforms a page image before OCR.
///
/// An enhancer that resizes the image must report the factor through [`scale_factor`], so the
/// pixel thresholds of the table configuration are scaled to match.
///
/// [`scale_factor`]: ImageEnhancer::scale_factor
pub trait ImageEnhancer: Send + Sync {
    fn enhance(&self, image: &DynamicImage) -> Result<DynamicImage>;

    /// Ratio of output to input size; 2.0 for a 2x upscale.
    fn scale_factor(&self) -> f64 {
        1.0
    }
}
