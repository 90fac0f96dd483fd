//! OG image promotion.
//!
//! For every markdown/MDX file under the configured content folders, the first
//! local image is copied to `<output_dir>/<flattened-slug>.<ext>` and the
//! document frontmatter is pointed at it. The output directory is not kept
//! between builds, so images are copied on every run even when the
//! frontmatter is already correct.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use docsite_mdx::{document_slug, flatten_slug, is_markdown, Document, DocumentError, ImageRef};

/// Configuration for promoting OG images.
#[derive(Debug, Clone)]
pub struct PromoterConfig {
    /// Project root, used for log output
    pub root: PathBuf,

    /// Content folders to scan
    pub content_dirs: Vec<PathBuf>,

    /// Public assets directory, used to resolve `/absolute` image paths
    pub public_dir: PathBuf,

    /// Directory the OG images are copied to
    pub output_dir: PathBuf,

    /// URL prefix the output directory is served under
    pub url_prefix: String,

    /// Frontmatter key that references the OG image
    pub frontmatter_key: String,
}

impl PromoterConfig {
    /// Default layout rooted at `root`: `docs/` and `develop-docs/` are
    /// scanned and images land in `public/og-images/`.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let public_dir = root.join("public");

        Self {
            content_dirs: vec![root.join("docs"), root.join("develop-docs")],
            output_dir: public_dir.join("og-images"),
            public_dir,
            root,
            url_prefix: "/og-images".to_string(),
            frontmatter_key: "og_image".to_string(),
        }
    }
}

impl Default for PromoterConfig {
    fn default() -> Self {
        Self::for_root(".")
    }
}

/// Errors that can occur while promoting images.
#[derive(Debug, thiserror::Error)]
pub enum PromoteError {
    #[error("Failed to read folder {path}: {source}")]
    ReadFolder {
        path: String,
        source: walkdir::Error,
    },

    #[error("Not a folder: {0}")]
    NotAFolder(String),

    #[error("Failed to create {path}: {source}")]
    CreateOutput {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// What happened to a single document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromoteOutcome {
    /// The body has no image
    NoImage,

    /// The first image is remote
    RemoteImage,

    /// The image could not be copied; the document was left alone
    CopyFailed(String),

    /// The document could not be processed
    Failed(String),

    /// Image copied, frontmatter already pointed at it
    Unchanged { url: String },

    /// Image copied and frontmatter rewritten
    Rewritten { url: String },
}

impl PromoteOutcome {
    /// The document ends up with a valid OG image.
    pub fn is_updated(&self) -> bool {
        matches!(self, Self::Unchanged { .. } | Self::Rewritten { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::CopyFailed(_) | Self::Failed(_))
    }
}

/// Counters accumulated over a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PromoteSummary {
    /// Markdown/MDX files found
    pub scanned: usize,

    /// Files that have a valid OG image afterwards
    pub updated: usize,

    /// Images copied to the output directory
    pub copied: usize,

    /// Files with a local image that could not be processed
    pub errors: usize,
}

impl PromoteSummary {
    /// Files without a local image.
    pub fn skipped(&self) -> usize {
        self.scanned
            .saturating_sub(self.updated)
            .saturating_sub(self.errors)
    }

    fn record(&mut self, outcome: &PromoteOutcome) {
        self.scanned += 1;
        if outcome.is_updated() {
            self.updated += 1;
            self.copied += 1;
        } else if outcome.is_error() {
            self.errors += 1;
        }
    }
}

/// Promotes the first local image of each document to an OG image.
pub struct ImagePromoter {
    config: PromoterConfig,
}

impl ImagePromoter {
    pub fn new(config: PromoterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PromoterConfig {
        &self.config
    }

    /// Process every configured folder, one file at a time.
    ///
    /// A folder that cannot be listed aborts the run. Per-file failures are
    /// logged and counted in the summary.
    pub async fn run(&self) -> Result<PromoteSummary, PromoteError> {
        self.ensure_output_dir().await?;
        tracing::info!(
            "Created {} directory",
            self.relative(&self.config.output_dir).display()
        );

        let mut summary = PromoteSummary::default();

        for folder in &self.config.content_dirs {
            let files = list_documents(folder).await?;

            tracing::info!(
                "Scanning {} files in {}/...",
                files.len(),
                self.relative(folder).display()
            );

            for file in files {
                let slug = document_slug(folder, &file);
                let outcome = self.promote_file(&file, &slug).await;
                summary.record(&outcome);
            }
        }

        Ok(summary)
    }

    /// Promote the image of a single document.
    pub async fn promote_file(&self, file: &Path, slug: &str) -> PromoteOutcome {
        match self.try_promote(file, slug).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Error processing {}: {}", self.relative(file).display(), e);
                PromoteOutcome::Failed(e.to_string())
            }
        }
    }

    async fn try_promote(&self, file: &Path, slug: &str) -> Result<PromoteOutcome, PromoteError> {
        let mut doc = Document::read(file).await?;

        let Some(image) = doc.first_image() else {
            return Ok(PromoteOutcome::NoImage);
        };

        if image.is_remote() {
            tracing::debug!(
                "Skipping remote image in {}: {}",
                self.relative(file).display(),
                image.path
            );
            return Ok(PromoteOutcome::RemoteImage);
        }

        let source = image.resolve(doc.dir(), &self.config.public_dir);
        let (target, url) = self.og_image_target(slug, &image);

        self.ensure_output_dir().await?;

        if is_same_file(&source, &target).await {
            tracing::debug!("{} is already the OG image", source.display());
        } else if let Err(e) = tokio::fs::copy(&source, &target).await {
            tracing::error!(
                "Could not copy image for {}: {}: {}",
                self.relative(file).display(),
                source.display(),
                e
            );
            return Ok(PromoteOutcome::CopyFailed(e.to_string()));
        }

        let key = self.config.frontmatter_key.as_str();
        if doc.frontmatter.get_str(key) == Some(url.as_str()) {
            return Ok(PromoteOutcome::Unchanged { url });
        }

        doc.frontmatter.set(key, url.clone());
        doc.write().await?;

        tracing::info!(
            "Added {} to {}: {}",
            key,
            self.relative(file).display(),
            url
        );

        Ok(PromoteOutcome::Rewritten { url })
    }

    /// Output path and public URL for the OG image of `slug`.
    pub fn og_image_target(&self, slug: &str, image: &ImageRef) -> (PathBuf, String) {
        let name = format!("{}{}", flatten_slug(slug), image.extension());
        let url = format!("{}/{}", self.config.url_prefix.trim_end_matches('/'), name);

        (self.config.output_dir.join(name), url)
    }

    async fn ensure_output_dir(&self) -> Result<(), PromoteError> {
        tokio::fs::create_dir_all(&self.config.output_dir)
            .await
            .map_err(|source| PromoteError::CreateOutput {
                path: self.config.output_dir.display().to_string(),
                source,
            })
    }

    fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.config.root).unwrap_or(path)
    }
}

/// Whether both paths name the same existing file. Copying a file onto
/// itself would truncate it.
async fn is_same_file(a: &Path, b: &Path) -> bool {
    match (
        tokio::fs::canonicalize(a).await,
        tokio::fs::canonicalize(b).await,
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// List markdown/MDX files under `folder`, sorted by path.
async fn list_documents(folder: &Path) -> Result<Vec<PathBuf>, PromoteError> {
    // A missing root is reported by WalkDir itself
    if let Ok(metadata) = tokio::fs::metadata(folder).await {
        if !metadata.is_dir() {
            return Err(PromoteError::NotAFolder(folder.display().to_string()));
        }
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(folder).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|source| PromoteError::ReadFolder {
            path: folder.display().to_string(),
            source,
        })?;

        let path = entry.path();
        if entry.file_type().is_file() && is_markdown(path) {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}
