//! Platform payloads delivered by the acquisition channels.
//!
//! The desktop shell translates native events (file dialog result, egui
//! dropped files, `arboard` clipboard contents) into these plain types, so the
//! session logic never touches a platform API.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{data_url, MediaError};

// ---------------------------------------------------------------------------
// FileItem
// ---------------------------------------------------------------------------

/// Where a file's bytes come from.
#[derive(Debug, Clone)]
pub enum FileContent {
    /// On disk; read lazily.
    Path(PathBuf),
    /// Already in memory (clipboard image, web-style drop).
    Bytes(Arc<[u8]>),
}

/// A single file offered by the picker, a drop or the clipboard.
#[derive(Debug, Clone)]
pub struct FileItem {
    /// Display name (file name without directories).
    pub name: String,
    /// Declared MIME type, if the platform reported one.
    pub mime: Option<String>,
    pub content: FileContent,
}

impl FileItem {
    /// A file on disk; the name is taken from the path.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            mime: None,
            content: FileContent::Path(path),
        }
    }

    /// An in-memory file.
    pub fn from_bytes(name: impl Into<String>, mime: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime,
            content: FileContent::Bytes(bytes.into()),
        }
    }

    /// Best-effort MIME type: declared, else sniffed (bytes) or guessed from
    /// the extension (paths).
    pub fn mime_type(&self) -> Option<String> {
        if let Some(mime) = self.mime.as_deref().filter(|m| !m.is_empty()) {
            return Some(mime.to_string());
        }
        match &self.content {
            FileContent::Bytes(bytes) => data_url::sniff_mime(bytes).map(str::to_string),
            FileContent::Path(path) => mime_from_extension(path).map(str::to_string),
        }
    }

    /// `true` when the item is image-typed (`image/*`).
    pub fn is_image(&self) -> bool {
        self.mime_type().is_some_and(|m| m.starts_with("image/"))
    }

    /// Read the content and encode it as a data URL.
    pub async fn read_as_data_url(&self) -> Result<String, MediaError> {
        let bytes: Vec<u8> = match &self.content {
            FileContent::Path(path) => tokio::fs::read(path).await?,
            FileContent::Bytes(bytes) => bytes.to_vec(),
        };
        let declared = self.mime.as_deref().filter(|m| !m.is_empty());
        let guessed = match &self.content {
            FileContent::Path(path) => mime_from_extension(path),
            FileContent::Bytes(_) => None,
        };
        let sniffed = data_url::sniff_mime(&bytes);
        Ok(data_url::encode_with_mime(
            &bytes,
            declared.or(sniffed).or(guessed),
        ))
    }
}

/// Map common image extensions to their MIME type.
pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_string_lossy().to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" | "jfif" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "avif" => "image/avif",
        "heic" => "image/heic",
        "svg" => "image/svg+xml",
        "txt" => "text/plain",
        "pdf" => "application/pdf",
        _ => return None,
    };
    Some(mime)
}

// ---------------------------------------------------------------------------
// Drop payload
// ---------------------------------------------------------------------------

/// Files released over the window.
#[derive(Debug, Clone, Default)]
pub struct DropPayload {
    pub files: Vec<FileItem>,
}

impl DropPayload {
    pub fn new(files: Vec<FileItem>) -> Self {
        Self { files }
    }

    /// The first image-typed file, if any.
    pub fn first_image(&self) -> Option<&FileItem> {
        self.files.iter().find(|f| f.is_image())
    }
}

// ---------------------------------------------------------------------------
// Clipboard payload
// ---------------------------------------------------------------------------

/// One entry of the clipboard item list.
#[derive(Debug, Clone)]
pub struct ClipboardItem {
    /// Type tag (`image/png`, `text/plain`, ...).
    pub kind: String,
    /// The entry materialised as a file; `None` when the platform could not
    /// produce one.
    pub file: Option<FileItem>,
}

impl ClipboardItem {
    pub fn is_image(&self) -> bool {
        self.kind.starts_with("image/")
    }
}

/// Snapshot of the clipboard at paste time.
#[derive(Debug, Clone, Default)]
pub struct ClipboardPayload {
    pub items: Vec<ClipboardItem>,
    /// Plain-text flavour, if any.
    pub text: Option<String>,
}

impl ClipboardPayload {
    /// A clipboard holding only text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            text: Some(text.into()),
        }
    }

    /// The first image item that yields a file; later image items are ignored.
    pub fn first_image_file(&self) -> Option<&FileItem> {
        self.items
            .iter()
            .filter(|item| item.is_image())
            .find_map(|item| item.file.as_ref())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
