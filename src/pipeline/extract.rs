//! The extraction orchestrator: pages in, validated [`Document`] out.
//!
//! ```text
//! prepare sink ──▶ for each page (in order):
//!                    title (page 1 only) · text blocks · tables · images
//!              ──▶ validate ──▶ Extraction
//! ```
//!
//! Only image-level failures are absorbed. Each image goes through
//! [`process_image`], whose [`ImageOutcome`] says whether the image made it
//! into the document, was skipped for lack of a bounding box, or failed; a
//! failure drops that image and nothing else. Every other error (source,
//! sink preparation, validation) aborts the run, and image files already
//! written by the aborted run are removed from the sink.

use crate::document::{BBox, DocumentDraft, ImageBlock, Table, TextBlock};
use crate::error::{ImageError, Pdf2JsonError};
use crate::output::{Extraction, ExtractionStats};
use crate::pipeline::encode;
use crate::pipeline::raster::RasterEngine;
use crate::pipeline::source::{PageSource, SourcePage};
use crate::pipeline::storage::{image_file_name, StorageSink};
use crate::progress::{PageSummary, ProgressCallback};
use std::time::Instant;
use tracing::{debug, info, warn};

/// What happened to one image descriptor.
#[derive(Debug)]
pub enum ImageOutcome {
    /// Cropped, encoded and (when a sink is configured) persisted.
    Extracted(ImageBlock),
    /// The descriptor has no bounding box; nothing to crop.
    Skipped,
    /// Crop, encode or write failed; the image is dropped.
    Failed(ImageError),
}

/// Title of the document: the raw first line of page 1's text.
///
/// Not trimmed, so a page starting with a line break yields `Some("")`.
/// Absent or empty page text yields `None`.
pub fn derive_title(page_text: Option<&str>) -> Option<String> {
    page_text
        .filter(|t| !t.is_empty())
        .and_then(|t| t.split('\n').next())
        .map(str::to_string)
}

/// One block per line whose trimmed form is non-empty, carrying the line
/// untrimmed.
pub fn segment_text(page_text: &str) -> impl Iterator<Item = TextBlock> + '_ {
    page_text
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(TextBlock::new)
}

/// Crop, encode and persist one image.
///
/// `page_index` is 0-based; the resulting block records `page_index + 1`.
pub fn process_image<R: RasterEngine + ?Sized>(
    raster: &R,
    sink: Option<&dyn StorageSink>,
    page_index: usize,
    image_index: usize,
    bbox: Option<BBox>,
) -> ImageOutcome {
    let page = page_index + 1;
    let Some(bbox) = bbox else {
        return ImageOutcome::Skipped;
    };

    let cropped = match raster.crop(page_index, &bbox) {
        Ok(img) => img,
        Err(e) => {
            return ImageOutcome::Failed(ImageError::RenderFailed {
                page,
                image_index,
                detail: e.to_string(),
            })
        }
    };

    let png = match raster.encode(&cropped) {
        Ok(bytes) => bytes,
        Err(e) => {
            return ImageOutcome::Failed(ImageError::EncodeFailed {
                page,
                image_index,
                detail: e.to_string(),
            })
        }
    };

    let url = match sink {
        Some(sink) => {
            let name = image_file_name(page, image_index);
            match sink.write(&name, &png) {
                Ok(locator) => Some(locator),
                Err(e) => {
                    return ImageOutcome::Failed(ImageError::WriteFailed {
                        page,
                        image_index,
                        name,
                        detail: e.source.to_string(),
                    })
                }
            }
        }
        None => None,
    };

    ImageOutcome::Extracted(ImageBlock {
        page_number: page,
        image_index,
        bbox,
        image_data: encode::to_base64(&png),
        url,
    })
}

/// Walk every page of `source` and assemble the validated document.
///
/// # Errors
/// - [`Pdf2JsonError::ImageDirFailed`] when the sink cannot be prepared
/// - [`Pdf2JsonError::SourceUnavailable`] when a page cannot be read
/// - [`Pdf2JsonError::Validation`] when the assembled document is rejected
///
/// On the last two, images written earlier in the run are removed again so
/// a failed run leaves no partial output behind.
pub fn extract<S, R>(
    source: &S,
    raster: &R,
    sink: Option<&dyn StorageSink>,
    progress: Option<&ProgressCallback>,
) -> Result<Extraction, Pdf2JsonError>
where
    S: PageSource + ?Sized,
    R: RasterEngine + ?Sized,
{
    let start = Instant::now();

    if let Some(sink) = sink {
        sink.prepare().map_err(|e| Pdf2JsonError::ImageDirFailed {
            path: sink.location(),
            source: e,
        })?;
    }

    let total_pages = source.page_count();
    info!("Extracting {} pages", total_pages);
    if let Some(cb) = progress {
        cb.on_extraction_start(total_pages);
    }

    let mut draft = DocumentDraft::default();
    let mut image_errors = Vec::new();
    let mut stats = ExtractionStats {
        total_pages,
        ..Default::default()
    };

    for i in 0..total_pages {
        let page_num = i + 1;
        if let Some(cb) = progress {
            cb.on_page_start(page_num, total_pages);
        }

        let mut page = match source.page(i) {
            Ok(page) => page,
            Err(e) => {
                discard_written(sink, &written_names(&draft.images));
                return Err(e.into());
            }
        };
        let before = (draft.text_blocks.len(), draft.tables.len(), draft.images.len());
        let failed_before = image_errors.len();

        if i == 0 {
            draft.title = derive_title(page.text());
        }

        if let Some(text) = page.text() {
            draft.text_blocks.extend(segment_text(text));
        }

        draft
            .tables
            .extend(page.take_tables().into_iter().map(Table::from_detected));

        process_page_images(
            &page,
            raster,
            sink,
            i,
            &mut draft,
            &mut image_errors,
            &mut stats,
            progress,
        );

        let summary = PageSummary {
            text_blocks: draft.text_blocks.len() - before.0,
            tables: draft.tables.len() - before.1,
            images: draft.images.len() - before.2,
            failed_images: image_errors.len() - failed_before,
        };
        debug!(
            "Page {}: {} text blocks, {} tables, {} images ({} failed)",
            page_num, summary.text_blocks, summary.tables, summary.images, summary.failed_images
        );
        if let Some(cb) = progress {
            cb.on_page_complete(page_num, total_pages, &summary);
        }
    }

    stats.text_blocks = draft.text_blocks.len();
    stats.tables = draft.tables.len();
    stats.images_extracted = draft.images.len();
    stats.images_failed = image_errors.len();

    let written = written_names(&draft.images);
    let document = match draft.validate() {
        Ok(doc) => doc,
        Err(e) => {
            discard_written(sink, &written);
            return Err(e.into());
        }
    };
    stats.duration_ms = start.elapsed().as_millis() as u64;

    info!(
        "Extraction complete: {} pages, {} text blocks, {} tables, {}/{} images in {}ms",
        stats.total_pages,
        stats.text_blocks,
        stats.tables,
        stats.images_extracted,
        stats.images_found,
        stats.duration_ms
    );
    if let Some(cb) = progress {
        cb.on_extraction_complete(total_pages, stats.images_extracted);
    }

    Ok(Extraction {
        document,
        image_errors,
        stats,
    })
}

/// Sink names of the images that were persisted.
fn written_names(images: &[ImageBlock]) -> Vec<String> {
    images
        .iter()
        .filter(|i| i.url.is_some())
        .map(|i| image_file_name(i.page_number, i.image_index))
        .collect()
}

/// Remove persisted images after a fatal error.
fn discard_written(sink: Option<&dyn StorageSink>, names: &[String]) {
    let Some(sink) = sink else {
        return;
    };
    for name in names {
        if let Err(e) = sink.remove(name) {
            warn!("Could not remove {} after failed extraction: {}", name, e);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn process_page_images<R: RasterEngine + ?Sized>(
    page: &SourcePage,
    raster: &R,
    sink: Option<&dyn StorageSink>,
    page_index: usize,
    draft: &mut DocumentDraft,
    image_errors: &mut Vec<ImageError>,
    stats: &mut ExtractionStats,
    progress: Option<&ProgressCallback>,
) {
    let page_num = page_index + 1;
    let descriptors = page.images();
    if descriptors.is_empty() {
        debug!("No images found on page {}", page_num);
        return;
    }
    debug!("Found {} images on page {}", descriptors.len(), page_num);
    stats.images_found += descriptors.len();

    for (idx, descriptor) in descriptors.iter().enumerate() {
        match process_image(raster, sink, page_index, idx, descriptor.bbox) {
            ImageOutcome::Extracted(block) => draft.images.push(block),
            ImageOutcome::Skipped => {
                stats.images_skipped += 1;
                info!("Bounding box not found for image {} on page {}", idx, page_num);
            }
            ImageOutcome::Failed(e) => {
                warn!(page = page_num, image_index = idx, error = %e, "Dropping image");
                if let Some(cb) = progress {
                    cb.on_image_error(page_num, idx, &e.to_string());
                }
                image_errors.push(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_raw_first_line() {
        assert_eq!(derive_title(Some("Hello\nWorld\n")), Some("Hello".into()));
        assert_eq!(derive_title(Some("  Padded  \nx")), Some("  Padded  ".into()));
        assert_eq!(derive_title(Some("\nSecond")), Some(String::new()));
        assert_eq!(derive_title(Some("")), None);
        assert_eq!(derive_title(None), None);
    }

    #[test]
    fn segmentation_drops_blank_lines_keeps_untrimmed_text() {
        let blocks: Vec<String> = segment_text("  a \n\n \t \nb\n").map(|b| b.text).collect();
        assert_eq!(blocks, vec!["  a ", "b"]);
    }

    #[test]
    fn segmentation_of_empty_text_is_empty() {
        assert_eq!(segment_text("").count(), 0);
        assert_eq!(segment_text("\n\n").count(), 0);
    }
}
