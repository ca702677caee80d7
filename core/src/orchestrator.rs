//! # Orchestrator
//!
//! Top-level control flow. The invocation [`Scope`] picks exactly one path:
//!
//! * **Fleet**, `*@host`, `user@*`: scan the users tree for the selected
//!   users, then hand every `(user, host)` to the delegate tool on its host.
//! * **Host**: list the host's circus units, resolve the endpoint of each active
//!   one and drive `circusctl` on the host directly.
//! * **User@Host**: resolve the one endpoint and drive `circusctl` directly.
//!   With the unit check on (the delegate side), the instance's unit is looked
//!   up first and an idle instance is reported instead of addressed.
//!
//! Discovery and resolution run sequentially; only the dispatch fans out.
//! Under dry-run a remote unit listing is reported instead of run.

use std::path::PathBuf;
use std::sync::Arc;

use barnum_common::circus::scope::Scope;
use barnum_common::circus::target::Target;
use barnum_common::circus::unit::{UnitDescriptor, unit_name};
use barnum_common::config::Config;
use barnum_common::dispatch::{CommandRunner, DispatchResult};
use barnum_common::errors::{DiscoveryError, ResolutionError};
use barnum_common::passthrough;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::command::{CommandBuilder, Layer, Transport};
use crate::discovery::FleetDiscoverer;
use crate::dispatcher::{DispatchJob, Dispatcher, ProgressCallback};
use crate::resolver::EndpointResolver;
use crate::units::{
    HostUnit, HostUnitDiscoverer, SystemdUnitSource, UnitSelection, UnitSource, derive_users,
};

/// Failures that stop an invocation before anything is dispatched.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
}

/// One line of a host's report.
#[derive(Debug)]
pub enum Entry {
    /// A command was dispatched (or would have been, under dry-run).
    Dispatched {
        unit: Option<UnitDescriptor>,
        result: DispatchResult,
    },
    /// The unit exists but is not running; nothing was dispatched.
    Inactive { unit: UnitDescriptor, target: Target },
    /// The unit is running but its endpoint could not be resolved.
    Unresolved {
        unit: Option<UnitDescriptor>,
        error: ResolutionError,
    },
    /// Dry-run only: the unit listing that would have been run on `host`.
    Planned { host: String, command: String },
}

impl Entry {
    /// The instance this entry is about; `None` before units are known.
    pub fn target(&self) -> Option<&Target> {
        match self {
            Entry::Dispatched { result, .. } => Some(&result.target),
            Entry::Inactive { target, .. } => Some(target),
            Entry::Unresolved { error, .. } => Some(error.target()),
            Entry::Planned { .. } => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        match self {
            Entry::Dispatched { result, .. } => result.is_failure(),
            Entry::Inactive { .. } | Entry::Planned { .. } => false,
            Entry::Unresolved { .. } => true,
        }
    }
}

#[derive(Debug)]
pub struct HostReport {
    pub host: String,
    pub entries: Vec<Entry>,
}

/// Everything an invocation produced, grouped per host in discovery order.
#[derive(Debug)]
pub struct Report {
    pub scope: Scope,
    pub groups: Vec<HostReport>,
}

impl Report {
    /// A failed entry, or a named host where no circus is running at all.
    pub fn has_failures(&self) -> bool {
        self.entries().any(Entry::is_failure) || self.nothing_running()
    }

    /// True for a host scope whose units are all idle, so nothing was addressed.
    pub fn nothing_running(&self) -> bool {
        matches!(self.scope, Scope::Host(_))
            && !self.is_empty()
            && self.entries().all(|entry| matches!(entry, Entry::Inactive { .. }))
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.groups.iter().flat_map(|group| group.entries.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }
}

pub struct Orchestrator {
    resolver: EndpointResolver,
    fleet: FleetDiscoverer,
    units: HostUnitDiscoverer,
    builder: Arc<CommandBuilder>,
    dispatcher: Dispatcher,
    check_unit: bool,
    allow_missing_unit: bool,
}

impl Orchestrator {
    /// Wires the production unit source (systemd through `transport`) on top of `runner`.
    pub fn new(config: &Config, transport: Transport, runner: Arc<dyn CommandRunner>) -> Self {
        let builder = Arc::new(CommandBuilder::from_config(transport, config));
        let source = Arc::new(SystemdUnitSource::new(runner.clone(), builder.clone()));
        Self::with_parts(config, builder, source, runner)
    }

    pub fn with_parts(
        config: &Config,
        builder: Arc<CommandBuilder>,
        unit_source: Arc<dyn UnitSource>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        let users_root: PathBuf = config.users_root.clone();
        Self {
            resolver: EndpointResolver::new(users_root.clone()),
            fleet: FleetDiscoverer::new(users_root),
            units: HostUnitDiscoverer::new(unit_source),
            builder,
            dispatcher: Dispatcher::new(runner).sequential(config.no_threads),
            check_unit: config.check_unit,
            allow_missing_unit: config.status.allow_missing_unit,
        }
    }

    pub fn with_progress(mut self, on_progress: ProgressCallback) -> Self {
        self.dispatcher = self.dispatcher.with_progress(on_progress);
        self
    }

    /// Runs one invocation. `roster` is only consulted by the scopes that
    /// [`Scope::uses_roster`].
    pub async fn run(
        &self,
        scope: &Scope,
        roster: &[String],
        delegate_args: &[String],
    ) -> Result<Report, RunError> {
        info!("Processing scope {scope}");
        let groups = match scope {
            Scope::Fleet => self.run_fleet(scope, roster, None, delegate_args).await?,
            Scope::AnyUserOn(host) => {
                self.run_fleet(scope, roster, Some(host), delegate_args).await?
            }
            Scope::AnyHostOf(user) => {
                self.run_fleet(scope, std::slice::from_ref(user), None, delegate_args)
                    .await?
            }
            Scope::Host(host) => vec![self.run_host(host, delegate_args).await?],
            Scope::UserAtHost(target) if self.check_unit => {
                vec![self.run_checked_target(target, delegate_args).await?]
            }
            Scope::UserAtHost(target) => vec![self.run_target(target, None, delegate_args).await?],
        };

        let report = Report {
            scope: scope.clone(),
            groups,
        };
        if report.nothing_running() {
            warn!("{scope}: no circus unit is running");
        }
        Ok(report)
    }

    async fn run_fleet(
        &self,
        scope: &Scope,
        users: &[String],
        only_host: Option<&String>,
        delegate_args: &[String],
    ) -> Result<Vec<HostReport>, RunError> {
        let inventory = self.fleet.discover(users);
        for user in inventory.users_without_hosts() {
            warn!("No circus hosts found for {user}");
        }

        let mut by_host = inventory.by_host();
        if let Some(only_host) = only_host {
            by_host.retain(|(host, _)| host == only_host);
        }
        if by_host.is_empty() {
            if scope.is_explicit() {
                return Err(DiscoveryError::EmptyResult {
                    scope: scope.to_string(),
                }
                .into());
            }
            warn!("No circus instances found for any of the {} roster users", users.len());
            return Ok(Vec::new());
        }
        info!(
            "Circus is configured on {} hosts: {}",
            by_host.len(),
            by_host.iter().map(|(h, _)| h.as_str()).collect::<Vec<&str>>().join(", ")
        );

        let jobs: Vec<DispatchJob> = by_host
            .iter()
            .flat_map(|(host, users)| users.iter().map(move |user| Target::new(user, host)))
            .map(|target| {
                let command = self.builder.build(&target, Layer::Delegate { delegate_args });
                DispatchJob::new(target, command)
            })
            .collect();

        let mut results = self.dispatcher.dispatch(jobs).await.into_iter();
        Ok(by_host
            .into_iter()
            .map(|(host, users)| HostReport {
                host,
                entries: results
                    .by_ref()
                    .take(users.len())
                    .map(|result| Entry::Dispatched { unit: None, result })
                    .collect(),
            })
            .collect())
    }

    fn planned(&self, host: &str) -> Option<HostReport> {
        let command = self.units.planned_listing(host)?;
        info!("{host}: dry run, circus units are not listed");
        Some(HostReport {
            host: host.to_string(),
            entries: vec![Entry::Planned {
                host: host.to_string(),
                command,
            }],
        })
    }

    async fn run_host(&self, host: &str, delegate_args: &[String]) -> Result<HostReport, RunError> {
        if let Some(planned) = self.planned(host) {
            return Ok(planned);
        }

        let units = self.units.discover_units(host)?;
        info!(
            "{host}: circus units for {}, running for {}",
            derive_users(&units, UnitSelection::All).join(", "),
            derive_users(&units, UnitSelection::Active).join(", ")
        );
        let control_args = passthrough::control_args(delegate_args);

        // Entries waiting on a dispatch result carry `None` until it arrives.
        let mut slots: Vec<(Option<Entry>, Option<UnitDescriptor>)> = Vec::new();
        let mut jobs: Vec<DispatchJob> = Vec::new();

        for host_unit in units {
            let target = host_unit.target;
            let unit = host_unit.unit;

            if !unit.is_active() {
                debug!("{target}: unit {} is {}, no circus expected", unit.name, unit.active_state);
                slots.push((Some(Entry::Inactive { unit, target }), None));
                continue;
            }

            if jobs.iter().any(|job| job.target == target) {
                debug!("{target}: already scheduled, skipping duplicate unit {}", unit.name);
                continue;
            }

            match self.resolver.resolve(&target) {
                Ok(endpoint) => {
                    let command = self.builder.build(
                        &target,
                        Layer::Direct {
                            endpoint: &endpoint,
                            control_args: &control_args,
                        },
                    );
                    jobs.push(DispatchJob::new(target, command));
                    slots.push((None, Some(unit)));
                }
                Err(error) => {
                    warn!("{error}");
                    slots.push((Some(Entry::Unresolved { unit: Some(unit), error }), None));
                }
            }
        }

        let mut results = self.dispatcher.dispatch(jobs).await.into_iter();
        let entries = slots
            .into_iter()
            .filter_map(|(ready, unit)| match ready {
                Some(entry) => Some(entry),
                None => results.next().map(|result| Entry::Dispatched { unit, result }),
            })
            .collect();

        Ok(HostReport {
            host: host.to_string(),
            entries,
        })
    }

    /// [`Self::run_target`] behind a lookup of the instance's own unit.
    async fn run_checked_target(
        &self,
        target: &Target,
        delegate_args: &[String],
    ) -> Result<HostReport, RunError> {
        if let Some(planned) = self.planned(&target.host) {
            return Ok(planned);
        }

        let units = match self.units.discover_units(&target.host) {
            Ok(units) => units,
            Err(DiscoveryError::EmptyResult { .. }) => Vec::new(),
            Err(err) if self.allow_missing_unit => {
                warn!("{err}");
                Vec::new()
            }
            Err(err) => return Err(err.into()),
        };

        match units.into_iter().find(|host_unit| host_unit.target == *target) {
            Some(HostUnit { unit, .. }) if !unit.is_active() => {
                debug!("{target}: unit {} is {}, no circus expected", unit.name, unit.active_state);
                Ok(HostReport {
                    host: target.host.clone(),
                    entries: vec![Entry::Inactive {
                        unit,
                        target: target.clone(),
                    }],
                })
            }
            Some(HostUnit { unit, .. }) => self.run_target(target, Some(unit), delegate_args).await,
            None if self.allow_missing_unit => {
                warn!("{target}: no systemd unit {}, addressing it anyway", unit_name(target));
                self.run_target(target, None, delegate_args).await
            }
            None => Err(DiscoveryError::MissingUnit {
                target: target.clone(),
                unit: unit_name(target),
            }
            .into()),
        }
    }

    async fn run_target(
        &self,
        target: &Target,
        unit: Option<UnitDescriptor>,
        delegate_args: &[String],
    ) -> Result<HostReport, RunError> {
        let endpoint = self.resolver.resolve(target)?;
        let control_args = passthrough::control_args(delegate_args);
        let command = self.builder.build(
            target,
            Layer::Direct {
                endpoint: &endpoint,
                control_args: &control_args,
            },
        );

        let entries = self
            .dispatcher
            .dispatch(vec![DispatchJob::new(target.clone(), command)])
            .await
            .into_iter()
            .map(|result| Entry::Dispatched {
                unit: unit.clone(),
                result,
            })
            .collect();

        Ok(HostReport {
            host: target.host.clone(),
            entries,
        })
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
