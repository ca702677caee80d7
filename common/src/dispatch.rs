//! Dispatch vocabulary: constructed command lines, the port that executes them
//! and the per-target results the dispatcher hands back.

use std::fmt;

use crate::circus::target::Target;
use crate::errors::DispatchError;
use crate::utils::shell;

/// A fully constructed invocation.
///
/// `wrapper` holds the remote-shell prefix (`ssh -q ... <host>`) and is empty
/// for commands that run on the local host. `program` and `args` are the
/// command run at the far end; `args` are forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub wrapper: Vec<String>,
    pub program: String,
    pub args: Vec<String>,
    /// Built for display only, must never be executed.
    pub dry_run: bool,
}

impl CommandLine {
    pub fn is_remote(&self) -> bool {
        !self.wrapper.is_empty()
    }

    /// The command run at the far end of the wrapper, unquoted.
    pub fn inner(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }

    /// The argv handed to the operating system.
    ///
    /// The remote shell re-splits whatever follows the host, so the inner
    /// command travels as one pre-quoted word.
    pub fn argv(&self) -> Vec<String> {
        if self.is_remote() {
            let mut argv = self.wrapper.clone();
            argv.push(shell::join(&self.inner()));
            argv
        } else {
            self.inner()
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_remote() {
            write!(
                f,
                "{} {}",
                shell::join(&self.wrapper),
                shell::join(&self.inner())
            )
        } else {
            write!(f, "{}", shell::join(&self.inner()))
        }
    }
}

/// Captured output of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Executes a command line to completion. Implementations block.
///
/// A non-zero exit is *not* an error here; it is returned in [`ExecOutput`].
/// `Err` is reserved for failures to run the command at all.
pub trait CommandRunner: Send + Sync {
    fn run(&self, command: &CommandLine) -> Result<ExecOutput, DispatchError>;
}

/// Status the remote shell exits with when it fails itself (connection, auth).
pub const REMOTE_SHELL_FAILURE: i32 = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    DryRun,
    Failed(DispatchError),
}

#[derive(Debug, Clone)]
pub struct DispatchResult {
    pub target: Target,
    /// Rendered form of the command that was (or would have been) run.
    pub command: String,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub outcome: Outcome,
}

impl DispatchResult {
    pub fn dry_run(target: Target, command: &CommandLine) -> Self {
        Self {
            target,
            command: command.to_string(),
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            outcome: Outcome::DryRun,
        }
    }

    pub fn from_exec(
        target: Target,
        command: &CommandLine,
        exec: Result<ExecOutput, DispatchError>,
    ) -> Self {
        match exec {
            Ok(output) => {
                let outcome = match output.exit_code {
                    Some(0) => Outcome::Success,
                    Some(REMOTE_SHELL_FAILURE) if command.is_remote() => {
                        Outcome::Failed(DispatchError::TransportFailure {
                            reason: match output.stderr.trim() {
                                "" => format!("{} exited with status {REMOTE_SHELL_FAILURE}", command.wrapper[0]),
                                stderr => stderr.to_string(),
                            },
                        })
                    }
                    code => Outcome::Failed(DispatchError::NonZeroExit { code }),
                };
                Self {
                    target,
                    command: command.to_string(),
                    stdout: output.stdout,
                    stderr: output.stderr,
                    exit_code: output.exit_code,
                    outcome,
                }
            }
            Err(err) => Self {
                target,
                command: command.to_string(),
                stdout: String::new(),
                stderr: String::new(),
                exit_code: None,
                outcome: Outcome::Failed(err),
            },
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_))
    }
}
