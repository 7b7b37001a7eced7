//! pdfium-backed page source and raster engine.
//!
//! [`PdfiumDocument`] implements both [`PageSource`] and [`RasterEngine`] on
//! top of one opened `pdfium-render` document:
//!
//! * text comes from pdfium's text page, with line breaks normalised to `\n`;
//! * image descriptors are the page objects of type Image; an object whose
//!   bounds pdfium cannot report becomes a descriptor without a bbox;
//! * tables are inferred from character positions ([`crate::pipeline::tables`]);
//! * crops render the whole page once at the configured DPI and cut regions
//!   out of the cached bitmap, so a page with ten figures renders once.
//!
//! pdfium uses a bottom-left origin. Everything leaving this module is
//! converted to top-left origin (y grows downward), the convention of the
//! JSON `bbox` field.
//!
//! pdfium is not async-safe; callers drive this type from a blocking thread
//! (see [`crate::convert::convert`]).

use crate::document::BBox;
use crate::error::{RenderError, SourceError};
use crate::pipeline::raster::{crop_region, RasterEngine};
use crate::pipeline::source::{ImageDescriptor, PageSource, SourcePage};
use crate::pipeline::tables::{detect_tables, TableDetectorConfig, Word};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::cell::RefCell;
use std::path::Path;
use tracing::{debug, info};

/// Characters further apart than this (points) start a new word.
const WORD_SPACING_THRESHOLD: f32 = 3.0;

/// Bind to a pdfium library.
///
/// `PDFIUM_LIB_PATH` (path to the shared library file) wins; otherwise a
/// library next to the working directory, then the system library.
pub fn bind_pdfium() -> Result<Pdfium, SourceError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(p) if !p.is_empty() => Pdfium::bind_to_library(&p),
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| SourceError::PdfiumBindingFailed(e.to_string()))?;
    Ok(Pdfium::new(bindings))
}

struct RenderedPage {
    index: usize,
    image: DynamicImage,
    /// Pixels per PDF point actually achieved by the render.
    scale: f64,
}

/// An opened PDF, usable as page source and raster engine.
pub struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
    render_scale: f32,
    table_config: TableDetectorConfig,
    rendered: RefCell<Option<RenderedPage>>,
}

impl<'a> PdfiumDocument<'a> {
    /// Open `path`; crops render at `render_scale` pixels per PDF point.
    pub fn open(
        pdfium: &'a Pdfium,
        path: &Path,
        password: Option<&'a str>,
        render_scale: f32,
    ) -> Result<Self, SourceError> {
        let document = pdfium.load_pdf_from_file(path, password).map_err(|e| {
            let err_str = format!("{:?}", e);
            if err_str.contains("Password") || err_str.contains("password") {
                if password.is_some() {
                    SourceError::WrongPassword {
                        path: path.to_path_buf(),
                    }
                } else {
                    SourceError::PasswordRequired {
                        path: path.to_path_buf(),
                    }
                }
            } else {
                SourceError::CorruptPdf {
                    path: path.to_path_buf(),
                    detail: err_str,
                }
            }
        })?;

        info!("PDF loaded: {} pages", document.pages().len());

        Ok(Self {
            document,
            render_scale,
            table_config: TableDetectorConfig::default(),
            rendered: RefCell::new(None),
        })
    }

    fn load_page(&self, index: usize) -> Result<PdfPage<'a>, PdfiumError> {
        self.document.pages().get(index as u16)
    }

    fn render(&self, index: usize) -> Result<(), RenderError> {
        if self.rendered.borrow().as_ref().is_some_and(|r| r.index == index) {
            return Ok(());
        }
        let fail = |e: PdfiumError| RenderError::Rasterisation {
            page: index + 1,
            detail: format!("{:?}", e),
        };

        let page = self.load_page(index).map_err(fail)?;
        let page_width = page.width().value;
        let config = PdfRenderConfig::new().scale_page_by_factor(self.render_scale);
        let bitmap = page.render_with_config(&config).map_err(fail)?;
        let image = bitmap.as_image();

        if image.width() == 0 || image.height() == 0 || page_width <= 0.0 {
            return Err(RenderError::Rasterisation {
                page: index + 1,
                detail: "rendered page has zero dimensions".into(),
            });
        }
        let scale = image.width() as f64 / page_width as f64;
        debug!(
            "Rendered page {} → {}x{} px",
            index + 1,
            image.width(),
            image.height()
        );

        *self.rendered.borrow_mut() = Some(RenderedPage {
            index,
            image,
            scale,
        });
        Ok(())
    }
}

impl PageSource for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page(&self, index: usize) -> Result<SourcePage, SourceError> {
        let unreadable = |e: PdfiumError| SourceError::PageUnreadable {
            page: index + 1,
            detail: format!("{:?}", e),
        };

        let page = self.load_page(index).map_err(unreadable)?;
        let page_height = page.height().value;
        let text_page = page.text().map_err(unreadable)?;

        let text = normalize_line_breaks(&text_page.all());
        let text = (!text.is_empty()).then_some(text);

        let words = page_words(&text_page, page_height);
        let tables = detect_tables(&words, &self.table_config);

        let images: Vec<ImageDescriptor> = page
            .objects()
            .iter()
            .filter(|object| object.object_type() == PdfPageObjectType::Image)
            .map(|object| match object.bounds() {
                Ok(b) => ImageDescriptor::at(BBox::new(
                    points(b.left().value),
                    flip_y(page_height, b.top().value),
                    points(b.right().value),
                    flip_y(page_height, b.bottom().value),
                )),
                Err(e) => {
                    debug!("Page {}: image object without bounds: {:?}", index + 1, e);
                    ImageDescriptor::without_bbox()
                }
            })
            .collect();

        debug!(
            "Page {}: {} words, {} tables, {} image objects",
            index + 1,
            words.len(),
            tables.len(),
            images.len()
        );

        Ok(SourcePage::new(text, tables, images))
    }
}

impl RasterEngine for PdfiumDocument<'_> {
    fn crop(&self, page_index: usize, bbox: &BBox) -> Result<DynamicImage, RenderError> {
        self.render(page_index)?;
        let rendered = self.rendered.borrow();
        match rendered.as_ref() {
            Some(r) => crop_region(&r.image, bbox, r.scale),
            None => Err(RenderError::Rasterisation {
                page: page_index + 1,
                detail: "page render cache is empty".into(),
            }),
        }
    }
}

/// pdfium coordinate as `f64`, rounded to 1/10000 pt so `72.1` stays `72.1`
/// instead of `72.0999984741211`.
fn points(v: f32) -> f64 {
    round_points(v as f64)
}

/// Bottom-left `y` to top-left `y`, computed in `f64`.
fn flip_y(page_height: f32, y: f32) -> f64 {
    round_points(page_height as f64 - y as f64)
}

fn round_points(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

/// `\r\n` and lone `\r` become `\n`.
fn normalize_line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Group the characters of a text page into positioned words.
fn page_words(text_page: &PdfPageText, page_height: f32) -> Vec<Word> {
    let mut words = Vec::new();
    let mut current: Option<Word> = None;

    for ch in text_page.chars().iter() {
        let Some(c) = ch.unicode_char() else {
            continue;
        };
        let Ok(bounds) = ch.loose_bounds() else {
            continue;
        };
        let left = bounds.left().value;
        let right = bounds.right().value;
        let top = page_height - bounds.top().value;
        let bottom = page_height - bounds.bottom().value;

        if c.is_whitespace() {
            words.extend(current.take());
            continue;
        }

        if let Some(word) = current.as_mut() {
            let same_line = (top - word.top).abs() <= (word.bottom - word.top) * 0.5;
            if same_line && left - word.right <= WORD_SPACING_THRESHOLD {
                word.text.push(c);
                word.right = word.right.max(right);
                word.top = word.top.min(top);
                word.bottom = word.bottom.max(bottom);
                continue;
            }
        }
        words.extend(current.replace(Word::new(c.to_string(), left, top, right, bottom)));
    }
    words.extend(current);
    words
}
