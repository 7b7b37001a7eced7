//! # edgequake-pdf2json
//!
//! Extract the title, text blocks, tables and embedded images of a PDF
//! document into a single JSON artifact.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input     validate the local file (exists, readable, %PDF magic)
//!  ├─ 2. Source    per-page text, detected tables, image bounding boxes (pdfium)
//!  ├─ 3. Extract   title · text blocks · tables · images, in page order
//!  ├─ 4. Images    crop at the configured DPI → PNG → base64 (+ optional file)
//!  ├─ 5. Validate  structural checks on the assembled document
//!  └─ 6. Output    4-space-indented UTF-8 JSON
//! ```
//!
//! A failure on one image drops that image and is reported in
//! [`Extraction::image_errors`]; everything else on the page is kept.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2json::{convert, to_json, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::builder()
//!         .image_dir("images")
//!         .build()?;
//!     let extraction = convert("document.pdf", &config).await?;
//!     println!("{}", to_json(&extraction.document)?);
//!     eprintln!("{} images dropped", extraction.image_errors.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Custom collaborators
//!
//! The orchestrator in [`pipeline::extract`] only talks to the
//! [`PageSource`], [`RasterEngine`] and [`StorageSink`] traits. pdfium and
//! a plain directory are the built-in implementations; anything else
//! (in-memory fixtures, object stores) plugs in through the same traits.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2json` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! edgequake-pdf2json = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod document;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod serialize;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder, MAX_DPI, MIN_DPI};
pub use convert::{convert, convert_from_bytes, convert_sync, convert_to_file};
pub use document::{BBox, Document, DocumentDraft, ImageBlock, Table, TextBlock};
pub use error::{
    FieldIssue, ImageError, Pdf2JsonError, RenderError, SerializationError, SourceError,
    ValidationError, WriteError,
};
pub use output::{Extraction, ExtractionStats};
pub use pipeline::raster::RasterEngine;
pub use pipeline::source::{ImageDescriptor, PageSource, SourcePage};
pub use pipeline::storage::{DirectorySink, StorageSink};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, PageSummary, ProgressCallback};
pub use serialize::{to_json, write_json};
