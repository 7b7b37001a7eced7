//! Error types for the edgequake-pdf2json library.
//!
//! Two distinct error families reflect two distinct failure modes:
//!
//! * [`Pdf2JsonError`] — **Fatal**: the extraction cannot proceed or its
//!   result cannot be accepted (input unreadable, document failed validation,
//!   output not writable). Returned as `Err(Pdf2JsonError)` from the
//!   top-level `convert*` functions.
//!
//! * [`ImageError`] — **Non-fatal**: a single embedded image could not be
//!   cropped, encoded or persisted. The image is dropped from the document and
//!   the error is stored in [`crate::output::Extraction::image_errors`] so a
//!   single bad image never costs the rest of the document.
//!
//! The collaborator boundaries have their own small error types
//! ([`SourceError`], [`RenderError`], [`WriteError`]) that the orchestrator
//! maps onto the two families above.

use crate::document::{BBox, Document};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-pdf2json library.
///
/// Image-level failures use [`ImageError`] and are collected alongside the
/// document rather than propagated here.
#[derive(Debug, Error)]
pub enum Pdf2JsonError {
    /// The page source could not be opened or iterated.
    #[error(transparent)]
    SourceUnavailable(#[from] SourceError),

    /// The output image directory could not be created.
    #[error("Failed to prepare image directory '{path}': {source}")]
    ImageDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The assembled document failed structural validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Could not create or write the output JSON file.
    ///
    /// Extraction already succeeded: the validated document travels with the
    /// error so the caller can retry only the write.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: SerializationError,
        document: Box<Document>,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// The page source (input document) cannot be read.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// A page could not be loaded or its text could not be read.
    #[error("Page {page} could not be read: {detail}")]
    PageUnreadable { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install libpdfium for your platform, or set PDFIUM_LIB_PATH=/path/to/libpdfium\n\
to load an existing copy.\n"
    )]
    PdfiumBindingFailed(String),
}

/// The raster engine could not produce or encode an image region.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The page holding the region could not be loaded or rendered.
    #[error("rasterisation failed for page {page}: {detail}")]
    Rasterisation { page: usize, detail: String },

    /// The bounding box does not overlap the rendered page.
    #[error("region {bbox:?} does not overlap the page")]
    EmptyRegion { bbox: BBox },

    /// The cropped raster could not be encoded.
    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// The storage sink could not persist a payload.
#[derive(Debug, Error)]
#[error("Failed to write '{name}': {source}")]
pub struct WriteError {
    pub name: String,
    #[source]
    pub source: std::io::Error,
}

/// The JSON artifact could not be produced or written.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("JSON encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A non-fatal error for a single embedded image.
///
/// Stored in [`crate::output::Extraction::image_errors`]. The image is not
/// part of the document; every other image, table and text block is.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ImageError {
    /// Cropping the region out of the page failed.
    #[error("Page {page}, image {image_index}: crop failed: {detail}")]
    RenderFailed {
        page: usize,
        image_index: usize,
        detail: String,
    },

    /// PNG encoding of the cropped region failed.
    #[error("Page {page}, image {image_index}: encoding failed: {detail}")]
    EncodeFailed {
        page: usize,
        image_index: usize,
        detail: String,
    },

    /// Writing the encoded bytes to the storage sink failed.
    #[error("Page {page}, image {image_index}: could not persist '{name}': {detail}")]
    WriteFailed {
        page: usize,
        image_index: usize,
        name: String,
        detail: String,
    },
}

impl ImageError {
    /// 1-indexed page number the failed image belongs to.
    pub fn page(&self) -> usize {
        match self {
            ImageError::RenderFailed { page, .. }
            | ImageError::EncodeFailed { page, .. }
            | ImageError::WriteFailed { page, .. } => *page,
        }
    }

    /// 0-based detection index of the failed image within its page.
    pub fn image_index(&self) -> usize {
        match self {
            ImageError::RenderFailed { image_index, .. }
            | ImageError::EncodeFailed { image_index, .. }
            | ImageError::WriteFailed { image_index, .. } => *image_index,
        }
    }
}

/// One structurally invalid field of a candidate document.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldIssue {
    /// Path of the field, e.g. `images[2].bbox`.
    pub field: String,
    /// What is wrong with it.
    pub problem: String,
}

/// The assembled document failed validation.
///
/// Lists every invalid field, not just the first one found.
#[derive(Debug, Clone, Error)]
#[error("Document failed validation ({} issue(s)): {}", .issues.len(), summarize(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

fn summarize(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{}: {}", i.field, i.problem))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_error_accessors() {
        let e = ImageError::WriteFailed {
            page: 3,
            image_index: 1,
            name: "page_3_image_1.png".into(),
            detail: "disk full".into(),
        };
        assert_eq!(e.page(), 3);
        assert_eq!(e.image_index(), 1);
        assert!(e.to_string().contains("page_3_image_1.png"));
    }

    #[test]
    fn render_failed_display_names_page_and_index() {
        let e = ImageError::RenderFailed {
            page: 2,
            image_index: 0,
            detail: "bitmap allocation failed".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("Page 2"), "got: {msg}");
        assert!(msg.contains("image 0"), "got: {msg}");
    }

    #[test]
    fn validation_error_lists_every_issue() {
        let e = ValidationError {
            issues: vec![
                FieldIssue {
                    field: "text_blocks[0].text".into(),
                    problem: "blank".into(),
                },
                FieldIssue {
                    field: "images[1].page_number".into(),
                    problem: "must be >= 1".into(),
                },
            ],
        };
        let msg = e.to_string();
        assert!(msg.contains("2 issue(s)"), "got: {msg}");
        assert!(msg.contains("text_blocks[0].text"));
        assert!(msg.contains("images[1].page_number"));
    }

    #[test]
    fn source_error_converts_into_fatal() {
        let e: Pdf2JsonError = SourceError::PasswordRequired {
            path: PathBuf::from("secret.pdf"),
        }
        .into();
        assert!(matches!(e, Pdf2JsonError::SourceUnavailable(_)));
        assert!(e.to_string().contains("secret.pdf"));
    }
}
