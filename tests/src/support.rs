use std::fs;
use std::path::Path;
use std::sync::Mutex;

use barnum_common::circus::target::Target;
use barnum_common::config::Config;
use barnum_common::dispatch::{CommandLine, CommandRunner, ExecOutput};
use barnum_common::errors::{DiscoveryError, DispatchError};
use barnum_core::circus_config::config_path;
use barnum_core::units::UnitSource;
use tempfile::TempDir;

/// A throwaway `<root>/<user>/circus/<host>/circus.ini` tree.
pub struct UsersTree {
    root: TempDir,
}

impl UsersTree {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("temporary users root"),
        }
    }

    pub fn with_circus(self, user: &str, host: &str, endpoint: &str) -> Self {
        let path = config_path(self.path(), &Target::new(user, host));
        fs::create_dir_all(path.parent().expect("config has a parent")).expect("host dir");
        fs::write(
            &path,
            format!("[circus]\nendpoint = {endpoint}\n\n[watcher:web]\ncmd = run-web\n"),
        )
        .expect("circus.ini");
        self
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn config(&self, dry_run: bool) -> Config {
        Config {
            dry_run,
            users_root: self.path().to_path_buf(),
            ..Config::default()
        }
    }
}

type Reply = Box<dyn Fn(&CommandLine) -> Result<ExecOutput, DispatchError> + Send + Sync>;

/// Records every command it is asked to run and answers through `reply`.
pub struct RecordingRunner {
    calls: Mutex<Vec<CommandLine>>,
    reply: Reply,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::replying(|command| {
            Ok(ExecOutput {
                stdout: format!("ran {}", command.program),
                stderr: String::new(),
                exit_code: Some(0),
            })
        })
    }

    pub fn replying(
        reply: impl Fn(&CommandLine) -> Result<ExecOutput, DispatchError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            reply: Box::new(reply),
        }
    }

    pub fn calls(&self) -> Vec<CommandLine> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &CommandLine) -> Result<ExecOutput, DispatchError> {
        self.calls.lock().expect("calls lock").push(command.clone());
        (self.reply)(command)
    }
}

/// Canned `systemctl` listings, one per host.
pub struct StaticUnits(pub Vec<(&'static str, &'static str)>);

impl UnitSource for StaticUnits {
    fn list_units(&self, host: &str) -> Result<String, DiscoveryError> {
        self.0
            .iter()
            .find(|(h, _)| *h == host)
            .map(|(_, listing)| listing.to_string())
            .ok_or_else(|| DiscoveryError::RemoteFailure {
                host: host.to_string(),
                reason: "ssh: Could not resolve hostname".to_string(),
            })
    }
}

pub fn words(s: &str) -> Vec<String> {
    s.split_whitespace().map(String::from).collect()
}
