//! # Fleet Discovery
//!
//! Finds every `(user, host)` pair with a circus configuration by walking the
//! shared users tree:
//!
//! ```text
//! <users_root>/<user>/circus/<host>/circus.ini
//! ```
//!
//! The scan is read-only and touches no network. A user without any host is
//! not an error; the orchestrator reports it.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use barnum_common::circus::target::Target;
use barnum_common::config::CIRCUS_CONFIG_FILE;
use tracing::{debug, warn};

use crate::circus_config::user_circus_dir;

/// Hosts found for each roster user, in roster order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FleetInventory {
    entries: Vec<(String, BTreeSet<String>)>,
}

impl FleetInventory {
    pub fn hosts_for(&self, user: &str) -> Option<&BTreeSet<String>> {
        self.entries
            .iter()
            .find(|(u, _)| u == user)
            .map(|(_, hosts)| hosts)
    }

    /// Roster users that ended up with no host at all.
    pub fn users_without_hosts(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, hosts)| hosts.is_empty())
            .map(|(u, _)| u.as_str())
            .collect()
    }

    /// All targets, user-major in roster order.
    pub fn targets(&self) -> Vec<Target> {
        self.entries
            .iter()
            .flat_map(|(user, hosts)| hosts.iter().map(move |host| Target::new(user, host)))
            .collect()
    }

    /// Regroups the inventory per host.
    ///
    /// Hosts come in order of first appearance while walking the roster; the
    /// users under each host keep roster order.
    pub fn by_host(&self) -> Vec<(String, Vec<String>)> {
        let mut groups: Vec<(String, Vec<String>)> = Vec::new();
        for target in self.targets() {
            match groups.iter_mut().find(|(host, _)| *host == target.host) {
                Some((_, users)) => users.push(target.user),
                None => groups.push((target.host, vec![target.user])),
            }
        }
        groups
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|(_, hosts)| hosts.is_empty())
    }
}

pub struct FleetDiscoverer {
    users_root: PathBuf,
}

impl FleetDiscoverer {
    pub fn new(users_root: impl Into<PathBuf>) -> Self {
        Self {
            users_root: users_root.into(),
        }
    }

    /// Scans the tree for every user in `roster`, keeping roster order.
    pub fn discover(&self, roster: &[String]) -> FleetInventory {
        let entries = roster
            .iter()
            .map(|user| (user.clone(), self.hosts_for_user(user)))
            .collect();
        FleetInventory { entries }
    }

    fn hosts_for_user(&self, user: &str) -> BTreeSet<String> {
        let dir = user_circus_dir(&self.users_root, user);
        match scan_host_dirs(&dir) {
            Ok(hosts) => {
                debug!("Found {} circus hosts for {user} in {}", hosts.len(), dir.display());
                hosts
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("No circus directory for {user} at {}", dir.display());
                BTreeSet::new()
            }
            Err(err) => {
                warn!("Failed to scan {} for {user}: {err}", dir.display());
                BTreeSet::new()
            }
        }
    }
}

fn scan_host_dirs(dir: &Path) -> io::Result<BTreeSet<String>> {
    let mut hosts = BTreeSet::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }

        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };

        if !is_host_shaped(&name) {
            continue;
        }

        if entry.path().join(CIRCUS_CONFIG_FILE).is_file() {
            hosts.insert(name);
        } else {
            debug!("Ignoring {} without {CIRCUS_CONFIG_FILE}", entry.path().display());
        }
    }
    Ok(hosts)
}

/// Hostname-like directory names only; skips dotfiles and anything a host can't be called.
///
/// Underscores are rejected too: unit names end in `_<host>`, so such a host
/// could never be matched back from its unit.
pub fn is_host_shaped(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.'))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
