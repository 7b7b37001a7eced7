//! Progress-callback trait for per-page extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as the orchestrator walks the document.
//!
//! The callback is the least-invasive integration point: a host can forward
//! events to a channel, a log, or a terminal progress bar without the library
//! knowing how the host communicates.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdf2json::{ExtractionConfig, ExtractionProgressCallback, PageSummary};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     images: Arc<AtomicUsize>,
//! }
//!
//! impl ExtractionProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, summary: &PageSummary) {
//!         self.images.fetch_add(summary.images, Ordering::SeqCst);
//!         eprintln!("Page {}/{} done", page_num, total_pages);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     images: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ExtractionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ExtractionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// What a finished page contributed to the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageSummary {
    pub text_blocks: usize,
    pub tables: usize,
    /// Images added to the document from this page.
    pub images: usize,
    /// Images dropped on this page because processing failed.
    pub failed_images: usize,
}

/// Called by the orchestrator as it processes each page.
///
/// Implementations must be `Send + Sync` because the async entry points run
/// the extraction on a blocking worker thread. All methods have default no-op
/// implementations so callers only override what they care about.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once before the first page.
    fn on_extraction_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called before a page is read.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages in the document
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page has been fully processed.
    fn on_page_complete(&self, page_num: usize, total_pages: usize, summary: &PageSummary) {
        let _ = (page_num, total_pages, summary);
    }

    /// Called for each image dropped because cropping, encoding or writing it
    /// failed. Extraction continues afterwards.
    fn on_image_error(&self, page_num: usize, image_index: usize, error: &str) {
        let _ = (page_num, image_index, error);
    }

    /// Called once after every page has been processed.
    ///
    /// # Arguments
    /// * `total_pages`      — total pages in the document
    /// * `images_extracted` — images that made it into the document
    fn on_extraction_complete(&self, total_pages: usize, images_extracted: usize) {
        let _ = (total_pages, images_extracted);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;
