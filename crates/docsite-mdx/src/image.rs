//! Markdown image references.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Match: ![alt](path)
    Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").expect("Invalid image regex")
});

/// A markdown image reference `![alt](path)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Alt text (unused, kept for log output)
    pub alt: String,

    /// Path exactly as written in the document
    pub path: String,
}

/// Find the first image reference in a markdown body.
///
/// Only the first match is returned, even if it is a remote image and later
/// ones are local.
pub fn find_first_image(body: &str) -> Option<ImageRef> {
    let caps = IMAGE_RE.captures(body)?;

    Some(ImageRef {
        alt: caps.get(1).map(|m| m.as_str()).unwrap_or("").to_string(),
        path: caps.get(2)?.as_str().to_string(),
    })
}

impl ImageRef {
    /// Whether the image is hosted elsewhere.
    pub fn is_remote(&self) -> bool {
        self.path.starts_with("http://") || self.path.starts_with("https://")
    }

    /// Resolve the image to a file on disk.
    ///
    /// - `./img.png` is relative to the document directory
    /// - `/img.png` is relative to the public assets directory
    /// - `img.png` is relative to the document directory
    pub fn resolve(&self, doc_dir: &Path, public_dir: &Path) -> PathBuf {
        if let Some(rest) = self.path.strip_prefix("./") {
            doc_dir.join(rest)
        } else if let Some(rest) = self.path.strip_prefix('/') {
            public_dir.join(rest)
        } else {
            doc_dir.join(&self.path)
        }
    }

    /// Extension of the referenced file including the dot, or an empty string.
    pub fn extension(&self) -> String {
        Path::new(&self.path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default()
    }
}
