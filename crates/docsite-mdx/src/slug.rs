//! Slugs derived from document paths.

use std::path::{Component, Path};

/// Whether a path is a markdown or MDX document.
pub fn is_markdown(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("md") | Some("mdx")
    )
}

/// Derive a document slug from its path relative to the scanned root.
///
/// The extension is dropped, a trailing `index` segment is dropped and the
/// separators are normalized to `/`:
///
/// - `docs/foo/index.mdx` -> `foo`
/// - `docs/foo/bar.md` -> `foo/bar`
/// - `docs/index.mdx` -> `index`
pub fn document_slug(root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);

    let mut segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().replace('\\', "/")),
            _ => None,
        })
        .collect();

    if let Some(last) = segments.last_mut() {
        let stem = last
            .strip_suffix(".mdx")
            .or_else(|| last.strip_suffix(".md"))
            .map(str::to_string);
        if let Some(stem) = stem {
            *last = stem;
        }
    }

    // Only an `index` that follows another segment is dropped
    if segments.len() > 1 && segments.last().map(String::as_str) == Some("index") {
        segments.pop();
    }

    segments.join("/")
}

/// Flatten a slug into a single file name: `foo/bar` -> `foo-bar`.
pub fn flatten_slug(slug: &str) -> String {
    slug.replace('/', "-")
}
