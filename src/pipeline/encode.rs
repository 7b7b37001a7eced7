//! Image encoding: `DynamicImage` → PNG bytes → base64 text.
//!
//! PNG is lossless, so a cropped figure keeps the exact pixels pdfium drew.
//! The same PNG bytes are written to disk and embedded in the JSON, which
//! keeps the on-disk copy and the inline payload byte-identical.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a raster as PNG.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    debug!(
        "Encoded {}x{} image → {} PNG bytes",
        img.width(),
        img.height(),
        buf.len()
    );
    Ok(buf)
}

/// Wrap encoded bytes as standard, padded base64.
pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn encode_small_image() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let png = encode_png(&img).expect("encode should succeed");
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let b64 = to_base64(&png);
        let decoded = STANDARD.decode(&b64).expect("valid base64");
        assert_eq!(decoded, png);
    }

    #[test]
    fn png_is_lossless() {
        let mut src = RgbaImage::new(3, 2);
        src.put_pixel(0, 0, Rgba([1, 2, 3, 255]));
        src.put_pixel(2, 1, Rgba([200, 100, 50, 128]));
        let png = encode_png(&DynamicImage::ImageRgba8(src.clone())).unwrap();
        let back = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(back, src);
    }
}
