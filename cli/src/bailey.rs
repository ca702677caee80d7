//! Host-level delegate: the same orchestration as `barnum`, run on the host
//! itself without a remote shell. With `--user` the user's systemd unit is
//! checked before its circus is addressed.

use std::process::ExitCode;
use std::sync::Arc;

use barnum_cli::commands::{BaileyLine, run};
use barnum_cli::terminal::logging;
use barnum_core::command::Transport;
use barnum_core::system::{self, ProcessRunner};
use tracing::{debug, error};

#[tokio::main]
async fn main() -> ExitCode {
    let (line, delegate_args) = BaileyLine::parse_args();

    if line.no_colors {
        colored::control::set_override(false);
    }
    logging::init_logging("bailey", line.verbose);
    debug!("args: {line:?}, delegate args: {delegate_args:?}");

    match bailey(line, delegate_args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn bailey(line: BaileyLine, delegate_args: Vec<String>) -> anyhow::Result<bool> {
    let host = match &line.host {
        Some(host) => host.clone(),
        None => system::local_hostname()?,
    };
    let scope = line.scope_on(host);

    let cfg = line.config();
    run::run(&[scope], &[], &delegate_args, &cfg, Transport::Local, Arc::new(ProcessRunner)).await
}
