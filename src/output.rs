//! Result types returned by the extraction entry points.

use crate::document::Document;
use crate::error::ImageError;
use serde::Serialize;

/// Everything one extraction run produced.
///
/// Only `document` ends up in the JSON artifact; `image_errors` and `stats`
/// are for the caller (logging, exit codes, dashboards).
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    /// The validated document.
    pub document: Document,
    /// Images that were dropped, in page then detection order.
    pub image_errors: Vec<ImageError>,
    pub stats: ExtractionStats,
}

/// Counters for one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    /// Pages in the source document.
    pub total_pages: usize,
    pub text_blocks: usize,
    pub tables: usize,
    /// Image descriptors reported by the page source.
    pub images_found: usize,
    /// Images that made it into the document.
    pub images_extracted: usize,
    /// Descriptors without a bounding box.
    pub images_skipped: usize,
    /// Images dropped because crop, encode or write failed.
    pub images_failed: usize,
    /// Wall-clock time of the page loop, in milliseconds.
    pub duration_ms: u64,
}
