//! Org auth token command.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use docsite_keywords::{
    CodeContext, CodeKeywords, HttpTokenIssuer, OrgAuthTokenCreator, Rendered, PROJECT,
};

use crate::config::load_config;

/// Run the token command.
///
/// Drives the token creator the same way a click on the code sample keyword
/// does, picking `org` when the user belongs to several organizations.
pub async fn run(config_path: &Path, keywords_path: &Path, org: Option<String>) -> Result<()> {
    let file_config = load_config(config_path)?;

    let json = fs::read_to_string(keywords_path)
        .with_context(|| format!("Failed to read {}", keywords_path.display()))?;
    let keywords = CodeKeywords::from_json(&json)?;

    let issuer = match file_config.api.auth_token() {
        Some(token) => HttpTokenIssuer::with_auth_token(&file_config.api.base_url, &token)?,
        None => HttpTokenIssuer::new(&file_config.api.base_url)?,
    };

    let context = CodeContext::new(keywords);
    let mut creator = OrgAuthTokenCreator::new(Some(context.clone()), issuer);

    if context.keywords.is_authenticated() && creator.orgs().is_empty() {
        bail!("No organizations found in {}", keywords_path.display());
    }

    let orgs = creator.orgs();
    if let (Some(org), Some(only)) = (&org, ignored_org(org.as_deref(), &orgs)) {
        tracing::warn!("Ignoring --org {}, the only organization is {}", org, only);
    }

    let mut selection = context.shared_selection.subscribe();
    creator.press().await;

    if creator.is_open() {
        let orgs = creator.orgs();
        let Some(org) = org else {
            bail!(
                "Several organizations available, pick one with --org: {}",
                orgs.join(", ")
            );
        };
        if !orgs.contains(&org) {
            bail!("Unknown organization '{}', expected one of: {}", org, orgs.join(", "));
        }
        creator.choose(&org).await;
    }

    match creator.render() {
        Rendered::Token(token) => {
            if selection.has_changed().unwrap_or(false) {
                if let Some(project) = context.selected(PROJECT) {
                    tracing::info!("Switched to project: {}", project.title());
                }
            }
            println!("{token}");
        }
        Rendered::Placeholder(token) => {
            tracing::warn!("Not signed in, showing placeholder token");
            println!("{token}");
        }
        Rendered::Message(message) => bail!("{}", message),
        Rendered::Nothing | Rendered::Trigger(_) => bail!("No token was generated"),
    }

    Ok(())
}

/// The only organization, when `org` names a different one.
///
/// With a single organization the token is created without a pick, so a
/// mismatching `--org` has no effect.
fn ignored_org<'a>(org: Option<&str>, orgs: &'a [String]) -> Option<&'a str> {
    match (org, orgs) {
        (Some(org), [only]) if org != only => Some(only),
        _ => None,
    }
}
