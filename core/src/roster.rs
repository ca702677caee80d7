//! The roster: an ordered YAML list of the accounts that may own a circus.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use tracing::{info, warn};

const ROSTER_DIR: &str = "barnum";
const ROSTER_FILE: &str = "barnum_config.yaml";
const ROSTER_TEMPLATE: &str = "# Add usernames here:\n# - <username1>\n# - <username2>\n";

/// Default roster location, `<config_dir>/barnum/barnum_config.yaml`.
pub fn default_path() -> anyhow::Result<PathBuf> {
    let config_dir = dirs::config_dir().context("could not determine the user config directory")?;
    Ok(config_dir.join(ROSTER_DIR).join(ROSTER_FILE))
}

/// Writes a commented template at `path` unless a file is already there.
///
/// Returns `true` when a template was written.
pub fn ensure_template(path: &Path) -> anyhow::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating roster directory {}", parent.display()))?;
    }
    fs::write(path, ROSTER_TEMPLATE)
        .with_context(|| format!("writing roster template {}", path.display()))?;
    warn!("Wrote roster template to {}", path.display());
    Ok(true)
}

/// Loads the roster at `path`, preserving order and dropping duplicates.
pub fn load(path: &Path) -> anyhow::Result<Vec<String>> {
    info!("Using roster file {}", path.display());
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading roster {}", path.display()))?;
    parse(&content).with_context(|| format!("parsing roster {}", path.display()))
}

pub fn parse(content: &str) -> anyhow::Result<Vec<String>> {
    let users: Option<Vec<String>> = serde_yaml::from_str(content)?;
    let mut roster: Vec<String> = Vec::new();
    for user in users.unwrap_or_default() {
        let user = user.trim().to_string();
        if !user.is_empty() && !roster.contains(&user) {
            roster.push(user);
        }
    }

    if roster.is_empty() {
        bail!("no users defined");
    }
    Ok(roster)
}
