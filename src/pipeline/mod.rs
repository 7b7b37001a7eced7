//! Pipeline stages for PDF-to-JSON extraction.
//!
//! Each submodule implements one stage or one collaborator boundary, so the
//! orchestrator can be driven by pdfium in production and by in-memory fakes
//! in tests.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ source ──▶ extract ──┬──▶ raster ──▶ encode ──▶ storage
//! (path)    (pages)   (per page) │    (crop)     (PNG/b64)  (files)
//!                                └──▶ text blocks · tables
//! ```
//!
//! 1. [`input`]   — validate the user-supplied path before pdfium opens it
//! 2. [`source`]  — the [`source::PageSource`] boundary
//! 3. [`pdfium`]  — pdfium implementation of page source and raster engine
//! 4. [`tables`]  — alignment-based table detection for the pdfium source
//! 5. [`raster`]  — the [`raster::RasterEngine`] boundary and crop geometry
//! 6. [`encode`]  — PNG and base64 encoding
//! 7. [`storage`] — the [`storage::StorageSink`] boundary and directory sink
//! 8. [`extract`] — the orchestrator

pub mod encode;
pub mod extract;
pub mod input;
pub mod pdfium;
pub mod raster;
pub mod source;
pub mod storage;
pub mod tables;
