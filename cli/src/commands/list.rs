use colored::*;
use tracing::{error, warn};

use crate::terminal::{colors, print};
use barnum_common::circus::scope::Scope;
use barnum_common::circus::target::Target;
use barnum_common::config::Config;
use barnum_core::discovery::FleetDiscoverer;
use barnum_core::watchers::{self, WatcherEntry};

/// Prints the configured watchers of every target in `scope`. Reads the
/// users tree only.
///
/// Returns `Ok(false)` if a config could not be read or an explicit scope
/// matched nothing.
pub fn list(scope: &Scope, roster: &[String], cfg: &Config) -> anyhow::Result<bool> {
    let fleet = FleetDiscoverer::new(&cfg.users_root);
    let targets: Vec<Target> = match scope {
        Scope::Fleet => fleet.discover(roster).targets(),
        Scope::Host(host) | Scope::AnyUserOn(host) => fleet
            .discover(roster)
            .targets()
            .into_iter()
            .filter(|target| target.host == *host)
            .collect(),
        Scope::AnyHostOf(user) => fleet.discover(std::slice::from_ref(user)).targets(),
        Scope::UserAtHost(target) => vec![target.clone()],
    };

    if targets.is_empty() {
        warn!("No circus configuration found for {scope}");
        print::no_results();
        return Ok(!scope.is_explicit());
    }

    let (entries, errors) = watchers::list_watchers(&cfg.users_root, &targets);
    for entry in &entries {
        print::print(&format_entry(entry, cfg.verbose));
    }
    for err in &errors {
        error!("{err}");
    }

    Ok(errors.is_empty())
}

fn format_entry(entry: &WatcherEntry, verbose: bool) -> String {
    let line = format!(
        "{} {}",
        entry.target.to_string().color(colors::PRIMARY),
        format!("[{}]", entry.watcher).color(colors::ACCENT)
    );
    if verbose {
        format!(
            "{line} {}",
            entry.config_path.display().to_string().color(colors::SEPARATOR)
        )
    } else {
        line
    }
}
