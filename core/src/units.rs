//! # Host Unit Discovery
//!
//! Host-level counterpart to [`crate::discovery`]: asks one host's systemd for
//! its `circus_*` unit files and recovers the owning users from the unit names.

use std::sync::Arc;

use barnum_common::circus::target::Target;
use barnum_common::circus::unit::{UnitDescriptor, UnitMatch};
use barnum_common::dispatch::{CommandLine, CommandRunner};
use barnum_common::errors::DiscoveryError;
use tracing::{debug, warn};

use crate::command::CommandBuilder;

/// Prints `<unit> <enabled-state> <active-state>` for every circus unit file.
pub const UNIT_LISTING_SCRIPT: &str = "for unit in $(systemctl list-unit-files --no-legend --no-pager 'circus_*' | awk '{print $1}'); \
do echo \"$unit $(systemctl is-enabled \"$unit\") $(systemctl is-active \"$unit\")\"; done";

/// Supplies the raw unit listing of a host.
pub trait UnitSource: Send + Sync {
    fn list_units(&self, host: &str) -> Result<String, DiscoveryError>;

    /// The listing command for `host` when it must only be shown, not run.
    fn dry_run_listing(&self, _host: &str) -> Option<CommandLine> {
        None
    }
}

/// Runs [`UNIT_LISTING_SCRIPT`] through the builder's transport.
pub struct SystemdUnitSource {
    runner: Arc<dyn CommandRunner>,
    builder: Arc<CommandBuilder>,
}

impl SystemdUnitSource {
    pub fn new(runner: Arc<dyn CommandRunner>, builder: Arc<CommandBuilder>) -> Self {
        Self { runner, builder }
    }
}

impl UnitSource for SystemdUnitSource {
    fn list_units(&self, host: &str) -> Result<String, DiscoveryError> {
        let command = self.builder.shell(host, UNIT_LISTING_SCRIPT);
        if command.dry_run {
            return Err(DiscoveryError::RemoteFailure {
                host: host.to_string(),
                reason: "remote unit listing is not run under dry-run".to_string(),
            });
        }
        let output = self
            .runner
            .run(&command)
            .map_err(|err| DiscoveryError::RemoteFailure {
                host: host.to_string(),
                reason: err.to_string(),
            })?;

        if !output.success() {
            return Err(DiscoveryError::RemoteFailure {
                host: host.to_string(),
                reason: match output.stderr.trim() {
                    "" => format!("exit status {:?}", output.exit_code),
                    stderr => stderr.to_string(),
                },
            });
        }
        Ok(output.stdout)
    }

    fn dry_run_listing(&self, host: &str) -> Option<CommandLine> {
        let command = self.builder.shell(host, UNIT_LISTING_SCRIPT);
        command.dry_run.then_some(command)
    }
}

/// Which matched units contribute users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitSelection {
    /// Every unit matching the naming convention (status listing).
    All,
    /// Only units that are currently active (dispatch).
    Active,
}

/// A unit whose name matched, with the target it encodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostUnit {
    pub unit: UnitDescriptor,
    pub target: Target,
}

pub struct HostUnitDiscoverer {
    source: Arc<dyn UnitSource>,
}

impl HostUnitDiscoverer {
    pub fn new(source: Arc<dyn UnitSource>) -> Self {
        Self { source }
    }

    /// Rendered listing command for `host` if listing it is withheld under dry-run.
    pub fn planned_listing(&self, host: &str) -> Option<String> {
        self.source.dry_run_listing(host).map(|command| command.to_string())
    }

    /// Lists the circus units of `host`, in listing order.
    ///
    /// Non-matching names are skipped. The returned targets always carry
    /// `host`, even if the unit name spells the host differently.
    pub fn discover_units(&self, host: &str) -> Result<Vec<HostUnit>, DiscoveryError> {
        let listing = self.source.list_units(host)?;
        let units = parse_listing(&listing)
            .into_iter()
            .filter_map(|unit| match unit.target() {
                UnitMatch::Matched(target) => {
                    if target.host != host {
                        warn!("Unit {} names host {} but was listed on {host}", unit.name, target.host);
                    }
                    let target = Target::new(target.user, host);
                    Some(HostUnit { unit, target })
                }
                UnitMatch::Unmatched => {
                    debug!("Skipping unit {} not following the naming convention", unit.name);
                    None
                }
            })
            .collect::<Vec<HostUnit>>();

        if units.is_empty() {
            return Err(DiscoveryError::EmptyResult {
                scope: host.to_string(),
            });
        }
        Ok(units)
    }
}

/// Users owning the selected units, first occurrence wins.
pub fn derive_users(units: &[HostUnit], selection: UnitSelection) -> Vec<String> {
    let mut users: Vec<String> = Vec::new();
    for host_unit in units {
        if selection == UnitSelection::Active && !host_unit.unit.is_active() {
            continue;
        }
        if !users.contains(&host_unit.target.user) {
            users.push(host_unit.target.user.clone());
        }
    }
    users
}

pub fn parse_listing(listing: &str) -> Vec<UnitDescriptor> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let parsed = UnitDescriptor::from_listing_line(line);
            if parsed.is_none() {
                debug!("Ignoring unit listing line {line:?}");
            }
            parsed
        })
        .collect()
}
