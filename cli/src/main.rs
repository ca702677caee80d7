use std::process::ExitCode;
use std::sync::Arc;

use barnum_cli::commands::{self, CommandLine, list, run};
use barnum_cli::terminal::logging;
use barnum_core::command::Transport;
use barnum_core::system::ProcessRunner;
use tracing::{debug, error};

#[tokio::main]
async fn main() -> ExitCode {
    let (commands, delegate_args) = CommandLine::parse_args();

    if commands.no_colors {
        colored::control::set_override(false);
    }
    logging::init_logging("barnum", commands.verbose);
    debug!("args: {commands:?}, delegate args: {delegate_args:?}");

    match barnum(commands, delegate_args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn barnum(commands: CommandLine, delegate_args: Vec<String>) -> anyhow::Result<bool> {
    let cfg = commands.config();
    let scopes = commands.scopes();

    let roster = if commands.needs_roster() {
        commands::load_roster(commands.config_path.as_deref())?
    } else {
        Vec::new()
    };

    if commands.list {
        let mut ok = true;
        for scope in &scopes {
            ok &= list::list(scope, &roster, &cfg)?;
        }
        return Ok(ok);
    }

    let transport = Transport::ssh(cfg.tools.ssh.clone());
    run::run(&scopes, &roster, &delegate_args, &cfg, transport, Arc::new(ProcessRunner)).await
}
