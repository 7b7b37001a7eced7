//! The storage-sink boundary: durable, named byte payloads.
//!
//! Image files are named deterministically from page number and image index
//! ([`image_file_name`]), so a rerun into the same directory overwrites the
//! previous files instead of accumulating copies, and two writers in one
//! document never collide.

use crate::error::WriteError;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Durable storage for encoded images.
pub trait StorageSink {
    /// Make the sink ready to accept writes (e.g. create its directory).
    /// Idempotent; called once before the first page.
    fn prepare(&self) -> io::Result<()>;

    /// Persist `bytes` under `name` and return a locator for the stored copy.
    fn write(&self, name: &str, bytes: &[u8]) -> Result<String, WriteError>;

    /// Delete a payload written earlier in the same run. Removing a name that
    /// is not stored is not an error.
    fn remove(&self, name: &str) -> io::Result<()>;

    /// Where the sink stores data, for error messages.
    fn location(&self) -> PathBuf;
}

/// File name for image `image_index` (0-based) on page `page_number` (1-based).
pub fn image_file_name(page_number: usize, image_index: usize) -> String {
    format!("page_{page_number}_image_{image_index}.png")
}

/// `file://` URL of an absolute path.
///
/// Unix paths already start with `/`; Windows drive paths get the extra slash
/// (`file:///C:/…`) and forward separators.
pub fn file_url(path: &Path) -> String {
    let s = path.to_string_lossy().replace('\\', "/");
    if s.starts_with('/') {
        format!("file://{s}")
    } else {
        format!("file:///{s}")
    }
}

/// Writes each payload as a file in one directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl StorageSink for DirectorySink {
    fn prepare(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<String, WriteError> {
        let wrap = |source: io::Error| WriteError {
            name: name.to_string(),
            source,
        };
        let path = self.dir.join(name);
        std::fs::write(&path, bytes).map_err(wrap)?;
        let absolute = std::path::absolute(&path).map_err(wrap)?;
        debug!("Wrote {} bytes → {}", bytes.len(), absolute.display());
        Ok(file_url(&absolute))
    }

    fn remove(&self, name: &str) -> io::Result<()> {
        match std::fs::remove_file(self.dir.join(name)) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    fn location(&self) -> PathBuf {
        self.dir.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_deterministic() {
        assert_eq!(image_file_name(1, 0), "page_1_image_0.png");
        assert_eq!(image_file_name(12, 3), "page_12_image_3.png");
    }

    #[test]
    fn file_url_forms() {
        assert_eq!(
            file_url(Path::new("/tmp/out/page_1_image_0.png")),
            "file:///tmp/out/page_1_image_0.png"
        );
        assert_eq!(
            file_url(Path::new(r"C:\out\page_1_image_0.png")),
            "file:///C:/out/page_1_image_0.png"
        );
    }

    #[test]
    fn directory_sink_creates_dir_and_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(tmp.path().join("nested/images"));
        sink.prepare().unwrap();
        sink.prepare().unwrap();

        let url1 = sink.write("page_1_image_0.png", b"first").unwrap();
        let url2 = sink.write("page_1_image_0.png", b"second").unwrap();
        assert_eq!(url1, url2);
        assert!(url1.starts_with("file://"));
        assert!(url1.ends_with("/page_1_image_0.png"));

        let on_disk = std::fs::read(sink.dir().join("page_1_image_0.png")).unwrap();
        assert_eq!(on_disk, b"second");
        assert_eq!(std::fs::read_dir(sink.dir()).unwrap().count(), 1);
    }

    #[test]
    fn write_into_missing_dir_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(tmp.path().join("never-created"));
        let err = sink.write("page_1_image_0.png", b"x").unwrap_err();
        assert_eq!(err.name, "page_1_image_0.png");
    }

    #[test]
    fn remove_deletes_and_tolerates_missing_files() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(tmp.path());
        sink.write("page_1_image_0.png", b"x").unwrap();

        sink.remove("page_1_image_0.png").unwrap();
        assert!(!sink.dir().join("page_1_image_0.png").exists());
        sink.remove("page_1_image_0.png").unwrap();
    }
}
