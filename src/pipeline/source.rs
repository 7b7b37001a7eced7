//! The page-source boundary: what the orchestrator needs from a document.
//!
//! A page source hands out pages in order; each page carries its plain text,
//! the tables detected on it, and the image descriptors found on it. How the
//! source gets there (content-stream decoding, glyph layout, table-grid
//! inference) is its own business. [`crate::pipeline::pdfium::PdfiumDocument`]
//! is the bundled implementation; tests use in-memory sources.

use crate::document::BBox;
use crate::error::SourceError;

/// An image found on a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageDescriptor {
    /// Page region covered by the image, top-left origin. `None` when the
    /// source could not determine where the image is drawn.
    pub bbox: Option<BBox>,
}

impl ImageDescriptor {
    pub fn at(bbox: BBox) -> Self {
        Self { bbox: Some(bbox) }
    }

    pub fn without_bbox() -> Self {
        Self { bbox: None }
    }
}

/// Everything a page source reports about one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourcePage {
    text: Option<String>,
    tables: Vec<Vec<Vec<String>>>,
    images: Vec<ImageDescriptor>,
}

impl SourcePage {
    pub fn new(
        text: Option<String>,
        tables: Vec<Vec<Vec<String>>>,
        images: Vec<ImageDescriptor>,
    ) -> Self {
        Self {
            text,
            tables,
            images,
        }
    }

    /// Extracted plain text with `\n` line breaks, if the page has any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Detected tables, each a sequence of rows of cell strings.
    pub fn tables(&self) -> &[Vec<Vec<String>>] {
        &self.tables
    }

    /// Image descriptors in detection order.
    pub fn images(&self) -> &[ImageDescriptor] {
        &self.images
    }

    /// Hand the detected tables over without copying them.
    pub fn take_tables(&mut self) -> Vec<Vec<Vec<String>>> {
        std::mem::take(&mut self.tables)
    }
}

/// An opened document that yields pages in order.
pub trait PageSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Read page `index` (0-based).
    ///
    /// A failure here means the document cannot be iterated and aborts the
    /// extraction.
    fn page(&self, index: usize) -> Result<SourcePage, SourceError>;
}
