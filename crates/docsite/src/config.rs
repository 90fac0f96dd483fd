//! Configuration file (docs.toml).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use docsite_static::PromoterConfig;
use serde::Deserialize;

/// Configuration file structure (docs.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub og_images: OgImagesConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Deserialize)]
pub struct OgImagesConfig {
    /// Content folders, relative to the project root
    #[serde(default = "default_content_dirs")]
    pub content_dirs: Vec<String>,
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
    /// Output folder, relative to the public directory
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_frontmatter_key")]
    pub frontmatter_key: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Falls back to $DOCSITE_API_TOKEN
    pub token: Option<String>,
}

fn default_content_dirs() -> Vec<String> {
    vec!["docs".to_string(), "develop-docs".to_string()]
}
fn default_public_dir() -> String {
    "public".to_string()
}
fn default_output_dir() -> String {
    "og-images".to_string()
}
fn default_frontmatter_key() -> String {
    "og_image".to_string()
}
fn default_base_url() -> String {
    "https://sentry.io".to_string()
}

impl Default for OgImagesConfig {
    fn default() -> Self {
        Self {
            content_dirs: default_content_dirs(),
            public_dir: default_public_dir(),
            output_dir: default_output_dir(),
            frontmatter_key: default_frontmatter_key(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
        }
    }
}

impl OgImagesConfig {
    /// Promoter settings for a project rooted at `root`.
    pub fn promoter_config(&self, root: &Path) -> PromoterConfig {
        let public_dir = root.join(&self.public_dir);
        let output = self.output_dir.trim_matches('/');

        PromoterConfig {
            root: root.to_path_buf(),
            content_dirs: self.content_dirs.iter().map(|d| root.join(d)).collect(),
            output_dir: public_dir.join(output),
            public_dir,
            url_prefix: format!("/{output}"),
            frontmatter_key: self.frontmatter_key.clone(),
        }
    }
}

impl ApiConfig {
    pub fn auth_token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| std::env::var("DOCSITE_API_TOKEN").ok())
            .filter(|t| !t.is_empty())
    }
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::info!("Loaded config from {}", path.display());

    Ok(config)
}
