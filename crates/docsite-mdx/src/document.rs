//! Markdown/MDX documents on disk.

use std::path::{Path, PathBuf};

use crate::frontmatter::{split_frontmatter, Frontmatter, FrontmatterError};
use crate::image::{find_first_image, ImageRef};

/// A document split into frontmatter and body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Source file path
    pub path: PathBuf,

    /// Parsed frontmatter (empty if the file has none)
    pub frontmatter: Frontmatter,

    /// Markdown content (without frontmatter)
    pub body: String,
}

/// Errors that can occur when loading or saving a document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Frontmatter {
        path: String,
        source: FrontmatterError,
    },
}

impl Document {
    /// Parse a document from its source text.
    pub fn parse(path: impl Into<PathBuf>, source: &str) -> Result<Self, FrontmatterError> {
        let (frontmatter, body) = split_frontmatter(source)?;

        Ok(Self {
            path: path.into(),
            frontmatter,
            body: body.to_string(),
        })
    }

    /// Read and parse a document.
    pub async fn read(path: &Path) -> Result<Self, DocumentError> {
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| DocumentError::Read {
                path: path.display().to_string(),
                source,
            })?;

        Self::parse(path, &source).map_err(|source| DocumentError::Frontmatter {
            path: path.display().to_string(),
            source,
        })
    }

    /// Render the document and write it back to its path.
    pub async fn write(&self) -> Result<(), DocumentError> {
        let content = self.render().map_err(|source| DocumentError::Frontmatter {
            path: self.path.display().to_string(),
            source,
        })?;

        tokio::fs::write(&self.path, content)
            .await
            .map_err(|source| DocumentError::Write {
                path: self.path.display().to_string(),
                source,
            })
    }

    /// Render frontmatter and body back into a single source string.
    ///
    /// The body is written as-is; a newline is appended only when it does not
    /// already end with one.
    pub fn render(&self) -> Result<String, FrontmatterError> {
        let yaml = self.frontmatter.to_yaml()?;

        let mut out = String::with_capacity(yaml.len() + self.body.len() + 8);
        out.push_str("---\n");
        out.push_str(&yaml);
        out.push_str("---\n");
        out.push_str(&self.body);
        if !out.ends_with('\n') {
            out.push('\n');
        }

        Ok(out)
    }

    /// First image referenced in the body.
    pub fn first_image(&self) -> Option<ImageRef> {
        find_first_image(&self.body)
    }

    /// Directory the document lives in.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }
}
