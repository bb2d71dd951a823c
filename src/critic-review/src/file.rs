//! The file a user picked for review.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
enum FileSource {
    /// Read lazily from disk when needed.
    Path(PathBuf),
    Memory(Arc<[u8]>),
}

/// A selected file: its name, size and a handle to its contents.
///
/// Contents are only read when previewing or submitting, like a browser
/// file handle.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    name: String,
    size: u64,
    source: FileSource,
}

impl SelectedFile {
    /// Select a file on disk.
    ///
    /// Fails when the path does not exist or is not a regular file.
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' is not a regular file", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            size: metadata.len(),
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    /// A file whose contents are already in memory.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            source: FileSource::Memory(bytes.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes at selection time.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            FileSource::Path(path) => Some(path),
            FileSource::Memory(_) => None,
        }
    }

    /// Size formatted as kilobytes with one decimal, e.g. `"1.5 KB"`.
    pub fn size_label(&self) -> String {
        format!("{:.1} KB", self.size as f64 / 1024.0)
    }

    /// Read the full contents.
    pub async fn read_bytes(&self) -> io::Result<Vec<u8>> {
        match &self.source {
            FileSource::Path(path) => tokio::fs::read(path).await,
            FileSource::Memory(bytes) => Ok(bytes.to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_reads_metadata() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("main.py");
        std::fs::write(&path, vec![b'a'; 1536]).unwrap();

        let file = SelectedFile::open(&path).await.unwrap();
        assert_eq!(file.name(), "main.py");
        assert_eq!(file.size(), 1536);
        assert_eq!(file.size_label(), "1.5 KB");
        assert_eq!(file.path(), Some(path.as_path()));
        assert_eq!(file.read_bytes().await.unwrap().len(), 1536);
    }

    #[tokio::test]
    async fn test_open_rejects_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let err = SelectedFile::open(tmp.path()).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let err = SelectedFile::open("/definitely/not/here.py").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_in_memory_file() {
        let file = SelectedFile::from_bytes("a.c", b"int main;".to_vec());
        assert_eq!(file.size(), 9);
        assert!(file.path().is_none());
        assert_eq!(file.read_bytes().await.unwrap(), b"int main;");
        assert_eq!(file.size_label(), "0.0 KB");
    }
}
