use super::error::{PdfError, Result};
use image::DynamicImage;
use pdfium_render::prelude::*;

/// Binds the system Pdfium library. One source can open any number of documents.
pub struct PdfPageSource {
    pdfium: Pdfium,
}

impl PdfPageSource {
    pub fn new() -> Result<Self> {
        let bindings = Pdfium::bind_to_system_library()
            .map_err(|e| PdfError::LibraryUnavailable(format!("Failed to initialize Pdfium: {}", e)))?;
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }

    /// Load a document from memory.
    pub fn open<'a>(&'a self, pdf_bytes: &'a [u8]) -> Result<PdfPages<'a>> {
        let document = self.pdfium.load_pdf_from_byte_slice(pdf_bytes, None).map_err(|e| {
            let err_msg = e.to_string();
            if err_msg.contains("password") || err_msg.contains("Password") {
                PdfError::PasswordRequired
            } else {
                PdfError::InvalidPdf(err_msg)
            }
        })?;
        Ok(PdfPages { document })
    }
}

/// An opened document.
pub struct PdfPages<'a> {
    document: PdfDocument<'a>,
}

impl PdfPages<'_> {
    pub fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    /// Embedded text layer of one page, empty for scanned pages.
    pub fn extract_page_text(&self, page_index: usize) -> Result<String> {
        let page = self.page(page_index)?;
        let text = page
            .text()
            .map_err(|e| PdfError::TextExtractionFailed(format!("Page text extraction failed: {}", e)))?;
        Ok(text.all())
    }

    /// Render one page at `scale` times its size in points.
    pub fn render_page(&self, page_index: usize, scale: f64) -> Result<DynamicImage> {
        let page = self.page(page_index)?;

        let width = ((page.width().value as f64 * scale) as i32).max(1);
        let height = ((page.height().value as f64 * scale) as i32).max(1);

        let config = PdfRenderConfig::new()
            .set_target_width(width)
            .set_target_height(height)
            .rotate_if_landscape(PdfPageRenderRotation::None, false);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| PdfError::RenderingFailed(format!("Failed to render page {}: {}", page_index, e)))?;

        Ok(DynamicImage::ImageRgb8(bitmap.as_image().into_rgb8()))
    }

    fn page(&self, page_index: usize) -> Result<PdfPage<'_>> {
        let index = u16::try_from(page_index).map_err(|_| PdfError::PageNotFound(page_index))?;
        self.document
            .pages()
            .get(index)
            .map_err(|_| PdfError::PageNotFound(page_index))
    }
}
