//! JSON emission of a validated [`Document`].
//!
//! Output is UTF-8 with non-ASCII characters written literally, indented with
//! four spaces. Key order follows the model's field order, so the same
//! document always produces the same bytes.

use crate::document::Document;
use crate::error::SerializationError;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::path::Path;
use tracing::info;

const INDENT: &[u8] = b"    ";

/// Render `doc` as pretty-printed JSON.
pub fn to_json(doc: &Document) -> Result<String, serde_json::Error> {
    let bytes = to_json_bytes(doc)?;
    // serde_json only ever emits valid UTF-8.
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Render `doc` as pretty-printed JSON bytes.
pub fn to_json_bytes(doc: &Document) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    doc.serialize(&mut ser)?;
    Ok(buf)
}

/// Temporary sibling used for atomic writes.
fn tmp_path(path: &Path) -> std::path::PathBuf {
    path.with_extension("json.tmp")
}

/// Write `doc` to `path`.
///
/// Uses atomic write (temp file + rename) so a failed write never leaves a
/// truncated artifact behind. The parent directory is created if missing.
pub fn write_json(doc: &Document, path: impl AsRef<Path>) -> Result<(), SerializationError> {
    let path = path.as_ref();
    let bytes = to_json_bytes(doc)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let tmp = tmp_path(path);
    std::fs::write(&tmp, &bytes)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }

    info!("Data successfully serialized to {}", path.display());
    Ok(())
}
