use std::process::Command;

use anyhow::Context;
use barnum_common::dispatch::{CommandLine, CommandRunner, ExecOutput};
use barnum_common::errors::DispatchError;

/// Runs command lines as child processes of this one.
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &CommandLine) -> Result<ExecOutput, DispatchError> {
        let argv = command.argv();
        let Some((program, args)) = argv.split_first() else {
            return Err(DispatchError::TransportFailure {
                reason: "empty command line".to_string(),
            });
        };

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|err| DispatchError::TransportFailure {
                reason: format!("failed to spawn {program}: {err}"),
            })?;

        Ok(ExecOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }
}

/// Name of the machine this process runs on, as reported by `hostname`.
pub fn local_hostname() -> anyhow::Result<String> {
    let output = Command::new("hostname")
        .output()
        .context("running 'hostname'")?;
    anyhow::ensure!(output.status.success(), "'hostname' exited with {}", output.status);

    let hostname = String::from_utf8_lossy(&output.stdout).trim().to_string();
    anyhow::ensure!(!hostname.is_empty(), "'hostname' printed nothing");
    Ok(hostname)
}
