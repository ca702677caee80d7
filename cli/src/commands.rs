pub mod list;
pub mod run;

use std::path::{Path, PathBuf};

use barnum_common::circus::scope::Scope;
use barnum_common::circus::target::Target;
use barnum_common::config::{Config, DEFAULT_USERS_ROOT, StatusOptions, ToolPaths};
use barnum_common::passthrough;
use barnum_core::roster;
use clap::{Args, Parser};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "barnum")]
#[command(about = "Query and control every circus instance in the fleet.")]
#[command(
    after_help = "Arguments after `--` are forwarded to bailey; a second `--` forwards to circusctl."
)]
pub struct CommandLine {
    /// `user@host`, a bare host, `*@host`, `user@*`, or nothing for every circus in the roster
    #[arg(value_name = "TARGET")]
    pub targets: Vec<Scope>,

    /// Trace every constructed command and pass --verbose to bailey
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the commands instead of running them
    #[arg(short = 'D', long)]
    pub dry_run: bool,

    /// List configured watchers without contacting any host
    #[arg(short, long)]
    pub list: bool,

    /// Dispatch one target at a time
    #[arg(long)]
    pub no_threads: bool,

    #[command(flatten)]
    pub status: StatusArgs,

    /// Disable ANSI colors
    #[arg(long)]
    pub no_colors: bool,

    /// Roster file, defaults to <config dir>/barnum/barnum_config.yaml
    #[arg(long)]
    pub config_path: Option<PathBuf>,

    /// Root of the shared users tree
    #[arg(long, default_value = DEFAULT_USERS_ROOT)]
    pub users_root: PathBuf,

    #[arg(long, default_value = "ssh")]
    pub ssh_path: String,

    #[arg(long, default_value = "bailey")]
    pub bailey_path: String,

    #[arg(long, default_value = "circusctl")]
    pub circusctl_path: String,
}

impl CommandLine {
    /// Parses the process arguments. Everything after the first `--` is
    /// returned untouched as the delegate arguments.
    pub fn parse_args() -> (Self, Vec<String>) {
        Self::parse_words(std::env::args())
    }

    pub fn parse_words<I, S>(args: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (own, delegate_args) = passthrough::split(args);
        (Self::parse_from(own), delegate_args)
    }

    /// The requested scopes in command-line order; the fleet when none is given.
    pub fn scopes(&self) -> Vec<Scope> {
        if self.targets.is_empty() {
            vec![Scope::Fleet]
        } else {
            self.targets.clone()
        }
    }

    pub fn config(&self) -> Config {
        Config {
            verbose: self.verbose,
            dry_run: self.dry_run,
            no_threads: self.no_threads,
            users_root: self.users_root.clone(),
            tools: ToolPaths {
                ssh: self.ssh_path.clone(),
                bailey: self.bailey_path.clone(),
                circusctl: self.circusctl_path.clone(),
            },
            status: self.status.options(),
            check_unit: false,
        }
    }

    /// Whether this invocation reads the roster at all.
    pub fn needs_roster(&self) -> bool {
        self.scopes().iter().any(|scope| match scope {
            Scope::Host(_) => self.list,
            scope => scope.uses_roster(),
        })
    }
}

/// Status switches shared by `barnum` and `bailey`.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct StatusArgs {
    /// One line per circus instance with watcher state counts
    #[arg(long)]
    pub short: bool,

    /// Include the systemd unit state in --short lines
    #[arg(short = 'S', long)]
    pub get_systemd_status: bool,

    /// Address an instance even when it has no systemd unit
    #[arg(long)]
    pub allow_missing_systemd_unit: bool,
}

impl StatusArgs {
    pub fn options(&self) -> StatusOptions {
        StatusOptions {
            short: self.short,
            systemd_status: self.get_systemd_status,
            allow_missing_unit: self.allow_missing_systemd_unit,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "bailey")]
#[command(about = "Query and control the circus instances of this host.")]
pub struct BaileyLine {
    /// Only this user's circus; every circus unit on the host otherwise
    #[arg(long)]
    pub user: Option<String>,

    /// Host name to act as, defaults to `hostname`
    #[arg(long)]
    pub host: Option<String>,

    #[arg(short, long)]
    pub verbose: bool,

    #[arg(short = 'D', long)]
    pub dry_run: bool,

    #[arg(long)]
    pub no_colors: bool,

    #[command(flatten)]
    pub status: StatusArgs,

    #[arg(long, default_value = "circusctl")]
    pub circusctl_path: String,

    #[arg(long, default_value = DEFAULT_USERS_ROOT)]
    pub users_root: PathBuf,

    /// circusctl command, `status` when omitted
    pub command: Vec<String>,
}

impl BaileyLine {
    /// Parses the process arguments and returns the words destined for the
    /// control tool's side of the passthrough, separator included.
    pub fn parse_args() -> (Self, Vec<String>) {
        Self::parse_words(std::env::args())
    }

    pub fn parse_words<I, S>(args: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (own, trailing) = passthrough::split(args);
        let line = Self::parse_from(own);
        let delegate_args = passthrough::rejoin(line.command.clone(), trailing);
        (line, delegate_args)
    }

    /// The named user's circus on `host`, or every circus unit there.
    pub fn scope_on(&self, host: String) -> Scope {
        match &self.user {
            Some(user) => Scope::UserAtHost(Target::new(user, host)),
            None => Scope::Host(host),
        }
    }

    pub fn config(&self) -> Config {
        Config {
            verbose: self.verbose,
            dry_run: self.dry_run,
            no_threads: false,
            users_root: self.users_root.clone(),
            tools: ToolPaths {
                circusctl: self.circusctl_path.clone(),
                ..ToolPaths::default()
            },
            status: self.status.options(),
            check_unit: self.user.is_some(),
        }
    }
}

/// Loads the roster from `explicit`, or from the default location after
/// seeding it with a template on first use.
pub fn load_roster(explicit: Option<&Path>) -> anyhow::Result<Vec<String>> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = roster::default_path()?;
            if roster::ensure_template(&path)? {
                info!("Add the users to manage to {}", path.display());
            }
            path
        }
    };
    roster::load(&path)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
