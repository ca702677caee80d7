use std::path::PathBuf;

pub const DEFAULT_USERS_ROOT: &str = "/users";
pub const CIRCUS_DIR: &str = "circus";
pub const CIRCUS_CONFIG_FILE: &str = "circus.ini";

pub struct Config {
    /// Trace every constructed command and forward `--verbose` to the delegate.
    pub verbose: bool,
    /// Build and print commands without executing them.
    ///
    /// Unit listings that stay on this host still run; remote ones are printed.
    pub dry_run: bool,
    /// Dispatch one target after another instead of concurrently.
    pub no_threads: bool,
    /// Root of the shared tree holding `<user>/circus/<host>/circus.ini`.
    pub users_root: PathBuf,
    pub tools: ToolPaths,
    pub status: StatusOptions,
    /// Look up the systemd unit of a named instance before addressing it.
    pub check_unit: bool,
}

/// Status switches honoured locally and forwarded to the delegate as given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusOptions {
    /// One line per instance with watcher state counts.
    pub short: bool,
    /// Include the systemd unit state in `short` lines.
    pub systemd_status: bool,
    /// Address an instance that has no systemd unit at all.
    pub allow_missing_unit: bool,
}

impl StatusOptions {
    /// The delegate's flags for these options.
    pub fn to_args(&self) -> Vec<String> {
        [
            (self.short, "--short"),
            (self.systemd_status, "--get-systemd-status"),
            (self.allow_missing_unit, "--allow-missing-systemd-unit"),
        ]
        .into_iter()
        .filter(|(set, _)| *set)
        .map(|(_, flag)| flag.to_string())
        .collect()
    }
}

/// Executables invoked on the far side of a dispatch.
#[derive(Debug, Clone)]
pub struct ToolPaths {
    pub ssh: String,
    pub bailey: String,
    pub circusctl: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ssh: "ssh".to_string(),
            bailey: "bailey".to_string(),
            circusctl: "circusctl".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: false,
            dry_run: false,
            no_threads: false,
            users_root: PathBuf::from(DEFAULT_USERS_ROOT),
            tools: ToolPaths::default(),
            status: StatusOptions::default(),
            check_unit: false,
        }
    }
}
