//! Reading of per-user, per-host `circus.ini` files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use barnum_common::circus::endpoint::Endpoint;
use barnum_common::circus::target::Target;
use barnum_common::config::{CIRCUS_CONFIG_FILE, CIRCUS_DIR};
use barnum_common::errors::ResolutionError;
use ini::Ini;

const CIRCUS_SECTION: &str = "circus";
const ENDPOINT_KEY: &str = "endpoint";
const WATCHER_SECTION_MARKER: &str = "watcher";

/// `<users_root>/<user>/circus`, the directory holding one subdirectory per host.
pub fn user_circus_dir(users_root: &Path, user: &str) -> PathBuf {
    users_root.join(user).join(CIRCUS_DIR)
}

/// `<users_root>/<user>/circus/<host>/circus.ini`
pub fn config_path(users_root: &Path, target: &Target) -> PathBuf {
    user_circus_dir(users_root, &target.user)
        .join(&target.host)
        .join(CIRCUS_CONFIG_FILE)
}

/// A parsed `circus.ini` together with where it came from.
pub struct CircusConfig {
    pub target: Target,
    pub path: PathBuf,
    ini: Ini,
}

impl CircusConfig {
    pub fn load(users_root: &Path, target: &Target) -> Result<Self, ResolutionError> {
        let path = config_path(users_root, target);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ResolutionError::NotFound {
                    target: target.clone(),
                    path,
                });
            }
            Err(source) => {
                return Err(ResolutionError::Unreadable {
                    target: target.clone(),
                    path,
                    source,
                });
            }
        };

        let ini = Ini::load_from_str(&content).map_err(|err| ResolutionError::Malformed {
            target: target.clone(),
            path: path.clone(),
            reason: err.to_string(),
        })?;

        Ok(Self {
            target: target.clone(),
            path,
            ini,
        })
    }

    /// The `[circus] endpoint` value, parsed but not yet rewritten for the host.
    pub fn endpoint(&self) -> Result<Endpoint, ResolutionError> {
        let raw = self
            .ini
            .section(Some(CIRCUS_SECTION))
            .ok_or_else(|| self.malformed(format!("missing [{CIRCUS_SECTION}] section")))?
            .get(ENDPOINT_KEY)
            .ok_or_else(|| self.malformed(format!("missing '{ENDPOINT_KEY}' key")))?;

        raw.parse::<Endpoint>().map_err(|reason| self.malformed(reason))
    }

    /// Names of the `[watcher:*]` sections, sorted.
    pub fn watchers(&self) -> Vec<String> {
        let mut watchers: Vec<String> = self
            .ini
            .sections()
            .flatten()
            .filter(|section| section.contains(WATCHER_SECTION_MARKER))
            .map(str::to_string)
            .collect();
        watchers.sort();
        watchers
    }

    fn malformed(&self, reason: String) -> ResolutionError {
        ResolutionError::Malformed {
            target: self.target.clone(),
            path: self.path.clone(),
            reason,
        }
    }
}
