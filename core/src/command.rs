//! # Command Construction
//!
//! Builds the exact command line dispatched for a target. Two layers exist:
//! * **Delegate**: run `bailey` on the host and let it handle its own units.
//! * **Direct**: run `circusctl` on the host against an already resolved endpoint.
//!
//! Either is wrapped in a remote shell unless the builder runs locally.

use barnum_common::circus::endpoint::Endpoint;
use barnum_common::circus::target::Target;
use barnum_common::config::{Config, StatusOptions, ToolPaths};
use barnum_common::dispatch::CommandLine;
use tracing::debug;

/// How a command reaches its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    /// `<program> -q <options...> <host> <command>`
    Ssh { program: String, options: Vec<String> },
    /// Already on the host; no wrapper.
    Local,
}

impl Transport {
    pub fn ssh(program: impl Into<String>) -> Self {
        Transport::Ssh {
            program: program.into(),
            options: vec!["-o".to_string(), "BatchMode=yes".to_string()],
        }
    }
}

/// What runs at the far end of the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layer<'a> {
    /// Delegate tool, receiving the delegate arguments verbatim.
    Delegate { delegate_args: &'a [String] },
    /// Control tool against `endpoint`, receiving the control arguments verbatim.
    Direct {
        endpoint: &'a Endpoint,
        control_args: &'a [String],
    },
}

pub struct CommandBuilder {
    transport: Transport,
    tools: ToolPaths,
    verbose: bool,
    dry_run: bool,
    status: StatusOptions,
}

impl CommandBuilder {
    pub fn new(transport: Transport, tools: ToolPaths, verbose: bool, dry_run: bool) -> Self {
        Self {
            transport,
            tools,
            verbose,
            dry_run,
            status: StatusOptions::default(),
        }
    }

    pub fn from_config(transport: Transport, config: &Config) -> Self {
        Self::new(transport, config.tools.clone(), config.verbose, config.dry_run)
            .with_status_options(config.status)
    }

    /// Flags forwarded to the delegate on every call.
    pub fn with_status_options(mut self, status: StatusOptions) -> Self {
        self.status = status;
        self
    }

    pub fn build(&self, target: &Target, layer: Layer<'_>) -> CommandLine {
        let (program, args) = match layer {
            Layer::Delegate { delegate_args } => {
                let mut args = vec![
                    "--user".to_string(),
                    target.user.clone(),
                    "--host".to_string(),
                    target.host.clone(),
                ];
                if self.verbose {
                    args.push("--verbose".to_string());
                }
                args.extend(self.status.to_args());
                args.push("--circusctl-path".to_string());
                args.push(self.tools.circusctl.clone());
                args.extend(delegate_args.iter().cloned());
                (self.tools.bailey.clone(), args)
            }
            Layer::Direct {
                endpoint,
                control_args,
            } => {
                let mut args = vec!["--endpoint".to_string(), endpoint.to_string()];
                args.extend(control_args.iter().cloned());
                (self.tools.circusctl.clone(), args)
            }
        };

        let command = CommandLine {
            wrapper: self.wrapper(&target.host),
            program,
            args,
            dry_run: self.dry_run,
        };
        debug!("{target}: constructed command $ {command}");
        command
    }

    /// A shell snippet run on `host`, for discovery rather than dispatch.
    ///
    /// Under dry-run only the remote form is marked; a local snippet still runs.
    pub fn shell(&self, host: &str, script: &str) -> CommandLine {
        let wrapper = self.wrapper(host);
        let command = CommandLine {
            dry_run: self.dry_run && !wrapper.is_empty(),
            wrapper,
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
        };
        debug!("{host}: constructed discovery command $ {command}");
        command
    }

    fn wrapper(&self, host: &str) -> Vec<String> {
        match &self.transport {
            Transport::Ssh { program, options } => {
                let mut wrapper = vec![program.clone(), "-q".to_string()];
                wrapper.extend(options.iter().cloned());
                wrapper.push(host.to_string());
                wrapper
            }
            Transport::Local => Vec::new(),
        }
    }
}
