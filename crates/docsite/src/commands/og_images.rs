//! OG image promotion command.

use std::path::Path;

use anyhow::{Context, Result};
use docsite_static::{ImagePromoter, PromoteSummary};

use crate::config::load_config;

/// Run the og-images command.
///
/// Per-file failures are reported in the summary; a content folder that
/// cannot be read fails the whole run before any summary is printed.
pub async fn run(config_path: &Path) -> Result<()> {
    let file_config = load_config(config_path)?;
    let root = std::env::current_dir().context("Failed to resolve project root")?;

    let promoter = ImagePromoter::new(file_config.og_images.promoter_config(&root));
    let summary = promoter
        .run()
        .await
        .context("Failed to promote OG images")?;

    let output_dir = promoter.config().output_dir.clone();
    log_summary(
        &summary,
        output_dir.strip_prefix(&root).unwrap_or(&output_dir),
    );

    Ok(())
}

fn log_summary(summary: &PromoteSummary, output_dir: &Path) {
    tracing::info!("Summary:");
    tracing::info!("  Scanned: {} files", summary.scanned);
    tracing::info!("  Updated: {} files", summary.updated);
    tracing::info!(
        "  Copied: {} images to {}/",
        summary.copied,
        output_dir.display()
    );
    tracing::info!("  Errors: {} files failed to copy", summary.errors);
    tracing::info!("  Skipped: {} files (no local image)", summary.skipped());

    if summary.errors > 0 {
        tracing::warn!("{} files had image copy errors", summary.errors);
        tracing::warn!("These files will use the default OG image.");
    }
}
