use std::path::{Path, PathBuf};

use barnum_common::circus::target::Target;
use barnum_common::errors::ResolutionError;

use crate::circus_config::CircusConfig;

/// One `[watcher:*]` section of a target's circus config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherEntry {
    pub target: Target,
    pub watcher: String,
    pub config_path: PathBuf,
}

/// Watchers configured for each target, in target order then name order.
///
/// Unreadable configs do not stop the listing; they come back alongside.
pub fn list_watchers(
    users_root: &Path,
    targets: &[Target],
) -> (Vec<WatcherEntry>, Vec<ResolutionError>) {
    let mut entries = Vec::new();
    let mut errors = Vec::new();

    for target in targets {
        match CircusConfig::load(users_root, target) {
            Ok(config) => {
                entries.extend(config.watchers().into_iter().map(|watcher| WatcherEntry {
                    target: target.clone(),
                    watcher,
                    config_path: config.path.clone(),
                }));
            }
            Err(err) => errors.push(err),
        }
    }

    (entries, errors)
}
