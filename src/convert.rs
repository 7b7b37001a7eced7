//! High-level conversion entry points: PDF path in, [`Extraction`] or JSON
//! file out.
//!
//! pdfium is not async-safe, so the async functions run the whole extraction
//! (open, page loop, crops, image writes) inside `spawn_blocking`. The JSON
//! artifact is written by [`crate::serialize::write_json`] on the blocking
//! pool as well.

use crate::config::ExtractionConfig;
use crate::error::Pdf2JsonError;
use crate::output::{Extraction, ExtractionStats};
use crate::pipeline::pdfium::{bind_pdfium, PdfiumDocument};
use crate::pipeline::storage::{DirectorySink, StorageSink};
use crate::pipeline::{extract, input};
use crate::serialize;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Extract title, text blocks, tables and images from a PDF file.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(Extraction)` on success, even if some images were dropped
/// (check `extraction.image_errors`).
///
/// # Errors
/// Returns `Err(Pdf2JsonError)` only for fatal errors:
/// - file not found / permission denied / not a PDF / corrupt / encrypted
/// - image directory cannot be created
/// - assembled document failed validation
pub async fn convert(
    input_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<Extraction, Pdf2JsonError> {
    let path = input_path.as_ref().to_path_buf();
    let config = config.clone();

    tokio::task::spawn_blocking(move || extract_blocking(&path, &config))
        .await
        .map_err(|e| Pdf2JsonError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Synchronous extraction, for callers without an async runtime.
pub fn convert_sync(
    input_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<Extraction, Pdf2JsonError> {
    extract_blocking(input_path.as_ref(), config)
}

/// Extract a PDF and write the JSON artifact to `output_path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
///
/// # Errors
/// Any error from [`convert`], plus [`Pdf2JsonError::OutputWriteFailed`]
/// when the JSON cannot be written. That error carries the extracted
/// document so the write can be retried without extracting again
/// (e.g. with [`crate::serialize::write_json`]).
pub async fn convert_to_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionStats, Pdf2JsonError> {
    let extraction = convert(input_path, config).await?;
    let Extraction {
        document, stats, ..
    } = extraction;
    let path = output_path.as_ref().to_path_buf();

    // The writer hands the document back alongside the result.
    let out = path.clone();
    let (document, written) = tokio::task::spawn_blocking(move || {
        let result = serialize::write_json(&document, &out);
        (document, result)
    })
    .await
    .map_err(|e| Pdf2JsonError::Internal(format!("Output write task panicked: {}", e)))?;

    match written {
        Ok(()) => Ok(stats),
        Err(source) => Err(Pdf2JsonError::OutputWriteFailed {
            path,
            source,
            document: Box::new(document),
        }),
    }
}

/// Extract a PDF held in memory.
///
/// pdfium opens documents from the file system here, so the bytes are
/// written to a managed [`tempfile`] that is removed on return or panic.
pub async fn convert_from_bytes(
    bytes: &[u8],
    config: &ExtractionConfig,
) -> Result<Extraction, Pdf2JsonError> {
    let mut tmp = tempfile::NamedTempFile::new()
        .map_err(|e| Pdf2JsonError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| Pdf2JsonError::Internal(format!("tempfile write: {e}")))?;
    // `tmp` is dropped (and the file deleted) when `convert` returns
    convert(tmp.path(), config).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Blocking implementation shared by the sync and async entry points.
fn extract_blocking(path: &Path, config: &ExtractionConfig) -> Result<Extraction, Pdf2JsonError> {
    info!("Starting extraction: {}", path.display());
    let path = input::resolve_input(path)?;

    let pdfium = bind_pdfium()?;
    let document = PdfiumDocument::open(
        &pdfium,
        &path,
        config.password.as_deref(),
        config.render_scale(),
    )?;

    let sink = config.image_dir.as_ref().map(DirectorySink::new);

    extract::extract(
        &document,
        &document,
        sink.as_ref().map(|s| s as &dyn StorageSink),
        config.progress_callback.as_ref(),
    )
}
