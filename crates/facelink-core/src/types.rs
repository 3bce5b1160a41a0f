use chrono::{DateTime, Utc};
use std::fmt;
use std::path::Path;

/// MIME type assigned to files whose extension is not a known image format.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// A user-supplied or camera-produced file, ready to be attached to a request.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
    pub last_modified: DateTime<Utc>,
}

impl ImageFile {
    pub fn new(
        name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
        last_modified: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
            last_modified,
        }
    }

    /// Read a file from disk. The MIME type is derived from the extension,
    /// the timestamp from filesystem metadata.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let last_modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            mime: mime_for_path(path).to_string(),
            bytes,
            last_modified,
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .field("last_modified", &self.last_modified)
            .finish()
    }
}

/// Guess a MIME type from a path's extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    image::ImageFormat::from_path(path)
        .map(|f| f.to_mime_type())
        .unwrap_or(OCTET_STREAM)
}

/// An HTML-style `accept` list: exact MIME types, `type/*` wildcards and
/// `.ext` suffixes, separated by commas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptPattern {
    entries: Vec<String>,
}

impl AcceptPattern {
    pub fn parse(pattern: &str) -> Self {
        let entries = pattern
            .split(',')
            .map(|e| e.trim().to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { entries }
    }

    /// An empty pattern accepts everything.
    pub fn matches(&self, file_name: &str, mime: &str) -> bool {
        if self.entries.is_empty() {
            return true;
        }
        let mime = mime.to_ascii_lowercase();
        let name = file_name.to_ascii_lowercase();

        self.entries.iter().any(|entry| {
            if entry.starts_with('.') {
                name.ends_with(entry.as_str())
            } else if let Some(major) = entry.strip_suffix("/*") {
                mime.split('/').next() == Some(major)
            } else {
                *entry == mime
            }
        })
    }

    pub fn matches_path(&self, path: &Path) -> bool {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.matches(&name, mime_for_path(path))
    }
}

impl Default for AcceptPattern {
    fn default() -> Self {
        Self::parse("image/*")
    }
}

impl fmt::Display for AcceptPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.entries.join(","))
    }
}
