//! Configuration types for PDF-to-JSON extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. Nothing is read from process-wide
//! state: the image directory, rendering resolution and password are all
//! passed in explicitly, so two conversions in one process never interfere.

use crate::error::Pdf2JsonError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Lowest accepted rendering resolution.
pub const MIN_DPI: u32 = 36;
/// Highest accepted rendering resolution.
pub const MAX_DPI: u32 = 600;

/// Configuration for a PDF-to-JSON extraction.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_pdf2json::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .image_dir("out/images")
///     .dpi(150)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Directory that receives one PNG per extracted image. Default: None.
    ///
    /// When `None` images are still embedded as base64 but no file is written
    /// and every `url` is `null`.
    pub image_dir: Option<PathBuf>,

    /// Resolution used when rasterising a page before cropping images out of
    /// it. Range: 36–600. Default: 72 (one pixel per PDF point).
    pub dpi: u32,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Optional per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            image_dir: None,
            dpi: 72,
            password: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("image_dir", &self.image_dir)
            .field("dpi", &self.dpi)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Scale factor from PDF points to rendered pixels.
    pub fn render_scale(&self) -> f32 {
        self.dpi as f32 / 72.0
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.image_dir = Some(dir.into());
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(MIN_DPI, MAX_DPI);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, Pdf2JsonError> {
        let c = &self.config;
        if c.dpi < MIN_DPI || c.dpi > MAX_DPI {
            return Err(Pdf2JsonError::InvalidConfig(format!(
                "DPI must be {MIN_DPI}–{MAX_DPI}, got {}",
                c.dpi
            )));
        }
        if c
            .image_dir
            .as_ref()
            .is_some_and(|d| d.as_os_str().is_empty())
        {
            return Err(Pdf2JsonError::InvalidConfig(
                "Image directory must not be an empty path".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ExtractionConfig::default();
        assert_eq!(c.dpi, 72);
        assert!(c.image_dir.is_none());
        assert_eq!(c.render_scale(), 1.0);
    }

    #[test]
    fn dpi_is_clamped() {
        let c = ExtractionConfig::builder().dpi(10_000).build().unwrap();
        assert_eq!(c.dpi, MAX_DPI);
        let c = ExtractionConfig::builder().dpi(1).build().unwrap();
        assert_eq!(c.dpi, MIN_DPI);
    }

    #[test]
    fn empty_image_dir_is_rejected() {
        let err = ExtractionConfig::builder().image_dir("").build().unwrap_err();
        assert!(matches!(err, Pdf2JsonError::InvalidConfig(_)));
    }

    #[test]
    fn debug_redacts_password() {
        let c = ExtractionConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }
}
