use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

/// Largest file accepted for upload (50 MiB).
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Extensions accepted by the file selection surface, lowercase.
pub const ACCEPTED_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "webp", "bmp", "tiff"];

/// Returns the MIME type for a recognized image extension.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "tiff" => Some("image/tiff"),
        _ => None,
    }
}

/// Returns the lowercase extension of a file name, if any.
pub fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

/// Immutable binary payload shared between state, display URLs and requests.
#[derive(Clone, PartialEq, Eq)]
pub struct Blob {
    data: Arc<[u8]>,
    mime_type: String,
}

impl Blob {
    pub fn new(data: impl Into<Arc<[u8]>>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// True when both blobs share the same allocation.
    pub fn same_data(&self, other: &Blob) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("size", &self.data.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/// A file chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub blob: Blob,
    /// Where the file was read from, when it came from disk.
    pub path: Option<PathBuf>,
}

impl SelectedFile {
    /// Builds a file from in-memory bytes; the MIME type follows the extension.
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        let name = name.into();
        let mime = extension_of(&name)
            .and_then(|ext| mime_for_extension(&ext))
            .unwrap_or("application/octet-stream");
        Self {
            blob: Blob::new(data, mime),
            name,
            path: None,
        }
    }

    pub fn size(&self) -> u64 {
        self.blob.size()
    }

    pub fn mime_type(&self) -> &str {
        self.blob.mime_type()
    }

    pub fn summary(&self) -> FileSummary {
        FileSummary {
            name: self.name.clone(),
            size: self.size(),
            mime_type: self.mime_type().to_string(),
        }
    }
}

/// Serializable description of a selected file.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileSummary {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
}
