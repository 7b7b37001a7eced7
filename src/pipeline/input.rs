//! Input resolution: validate a user-supplied path before pdfium opens it.
//!
//! pdfium reports a missing file, an unreadable file and a non-PDF file with
//! the same opaque load error. Checking existence, read permission and the
//! `%PDF` magic bytes up front gives the caller an actionable
//! [`SourceError`] instead.

use crate::error::SourceError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate `path` as a readable PDF file and return it.
pub fn resolve_input(path: impl AsRef<Path>) -> Result<PathBuf, SourceError> {
    let path = path.as_ref().to_path_buf();

    if !path.exists() {
        return Err(SourceError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(SourceError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(SourceError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(SourceError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}
