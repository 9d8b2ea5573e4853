use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::config::{Config, DB_FILE};
use crate::db::Database;

/// Creates (or with `force`, refreshes) the workspace directory `workspace`.
pub fn run(workspace: &Path, api_url: Option<&str>, force: bool) -> Result<()> {
    let exists = workspace.exists();

    if exists && !force {
        println!("Already initialized at {}", workspace.display());
        println!("Use --force to rewrite the configuration.");
        return Ok(());
    }

    fs::create_dir_all(workspace).with_context(|| format!("Failed to create {}", workspace.display()))?;

    // Opening runs the schema migration; an existing database keeps its session and votes.
    Database::open(&workspace.join(DB_FILE))?;

    let mut config = if exists {
        Config::load(workspace).unwrap_or_default()
    } else {
        Config::default()
    };
    if let Some(url) = api_url.map(str::trim).filter(|url| !url.is_empty()) {
        config.api_url = url.to_string();
    }
    config.save(workspace)?;
    info!(dir = %workspace.display(), api_url = %config.api_url, "workspace initialized");

    if exists {
        println!("Updated {}", workspace.display());
    } else {
        println!("Created {}", workspace.display());
    }
    println!("Backend: {}", config.api_url);
    println!("\nNext steps:");
    println!("  issuedesk register --username <name> --email <email>");
    println!("  issuedesk list");

    Ok(())
}
