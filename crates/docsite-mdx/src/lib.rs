//! MDX document model with frontmatter, image and slug helpers.
//!
//! This crate provides functionality to split markdown/MDX files into a YAML
//! frontmatter mapping and a body, find the first image reference in a body,
//! and derive stable slugs from document paths.

pub mod document;
pub mod frontmatter;
pub mod image;
pub mod slug;

pub use document::{Document, DocumentError};
pub use frontmatter::{Frontmatter, FrontmatterError};
pub use image::{find_first_image, ImageRef};
pub use slug::{document_slug, flatten_slug, is_markdown};
