//! Docsite CLI - build and authoring tools for the docs site.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "docsite")]
#[command(about = "Build and authoring tools for the docs site")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to docs.toml config file
    #[arg(short, long, default_value = "docs.toml", global = true)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy the first local image of each page to og-images/ and reference it
    /// in the page frontmatter (default)
    OgImages,

    /// Generate an org auth token the way the code sample keyword does
    Token {
        /// JSON file with the code keywords (PROJECT, USER)
        #[arg(short, long)]
        keywords: PathBuf,

        /// Organization to create the token for, when there are several
        #[arg(short, long)]
        org: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    // Execute command
    match cli.command.unwrap_or(Commands::OgImages) {
        Commands::OgImages => {
            commands::og_images::run(&cli.config).await?;
        }
        Commands::Token { keywords, org } => {
            commands::token::run(&cli.config, &keywords, org).await?;
        }
    }

    Ok(())
}
