//! The raster-engine boundary and the page-to-pixel crop geometry.
//!
//! A raster engine turns a page region into pixels and pixels into PNG bytes.
//! [`crop_region`] holds the geometry shared by engines that render a whole
//! page and cut the region out of it: PDF points are scaled to pixels, the
//! box is clamped to the page, and edges are rounded outward so the crop
//! never loses a partially covered pixel row or column.

use crate::document::BBox;
use crate::error::RenderError;
use crate::pipeline::encode;
use image::DynamicImage;

/// Produces raster crops of page regions and encodes them.
pub trait RasterEngine {
    /// Render the region `bbox` of page `page_index` (0-based).
    fn crop(&self, page_index: usize, bbox: &BBox) -> Result<DynamicImage, RenderError>;

    /// Encode a raster to lossless PNG bytes.
    fn encode(&self, image: &DynamicImage) -> Result<Vec<u8>, RenderError> {
        Ok(encode::encode_png(image)?)
    }
}

/// Pixel rectangle inside a rendered page: `(x, y, width, height)`.
pub type PixelRect = (u32, u32, u32, u32);

/// Map a top-left-origin `bbox` in PDF points onto a page rendered with
/// `scale` pixels per point into an image of `image_width` × `image_height`.
///
/// Returns `None` when the box does not overlap the page at all.
pub fn pixel_rect(bbox: &BBox, scale: f64, image_width: u32, image_height: u32) -> Option<PixelRect> {
    if !bbox.is_finite() || !scale.is_finite() || scale <= 0.0 {
        return None;
    }
    let w = image_width as f64;
    let h = image_height as f64;

    let left = (bbox.left.min(bbox.right) * scale).floor().clamp(0.0, w);
    let right = (bbox.left.max(bbox.right) * scale).ceil().clamp(0.0, w);
    let top = (bbox.top.min(bbox.bottom) * scale).floor().clamp(0.0, h);
    let bottom = (bbox.top.max(bbox.bottom) * scale).ceil().clamp(0.0, h);

    if right <= left || bottom <= top {
        return None;
    }
    Some((
        left as u32,
        top as u32,
        (right - left) as u32,
        (bottom - top) as u32,
    ))
}

/// Cut `bbox` out of a page rendered at `scale` pixels per point.
pub fn crop_region(page: &DynamicImage, bbox: &BBox, scale: f64) -> Result<DynamicImage, RenderError> {
    let (x, y, w, h) =
        pixel_rect(bbox, scale, page.width(), page.height()).ok_or(RenderError::EmptyRegion { bbox: *bbox })?;
    Ok(page.crop_imm(x, y, w, h))
}
