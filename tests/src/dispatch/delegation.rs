#![cfg(test)]
use std::path::PathBuf;
use std::sync::Arc;

use barnum_cli::commands::{BaileyLine, CommandLine};
use barnum_common::dispatch::{
    CommandLine as Invocation, CommandRunner, DispatchResult, ExecOutput, Outcome,
};
use barnum_common::errors::DispatchError;
use barnum_core::command::{CommandBuilder, Transport};
use barnum_core::orchestrator::{Entry, Orchestrator, Report};
use tokio::runtime::Handle;

use crate::support::{RecordingRunner, StaticUnits, UsersTree, words};

/// Stands in for the far side of the remote shell: delegate calls are parsed
/// like the `bailey` binary parses them and run through a local orchestrator
/// whose control-tool calls land in `control`. Answers with one word per entry.
struct DelegatingRunner {
    users_root: PathBuf,
    /// Unit listing per host, as `systemctl` on that host would print it.
    units: Vec<(&'static str, &'static str)>,
    control: Arc<RecordingRunner>,
}

impl CommandRunner for DelegatingRunner {
    fn run(&self, command: &Invocation) -> Result<ExecOutput, DispatchError> {
        let argv = std::iter::once(command.program.clone()).chain(command.args.iter().cloned());
        let (line, delegate_args) = BaileyLine::parse_words(argv);
        let Some(host) = line.host.clone() else {
            return Err(DispatchError::TransportFailure {
                reason: "delegate was not told its host".to_string(),
            });
        };

        let mut cfg = line.config();
        cfg.users_root = self.users_root.clone();
        cfg.no_threads = true;

        let builder = Arc::new(CommandBuilder::from_config(Transport::Local, &cfg));
        let units = StaticUnits(self.units.clone());
        let orchestrator = Orchestrator::with_parts(&cfg, builder, Arc::new(units), self.control.clone());

        let scope = line.scope_on(host);
        match Handle::current().block_on(orchestrator.run(&scope, &[], &delegate_args)) {
            Ok(report) => Ok(ExecOutput {
                stdout: report
                    .entries()
                    .map(|entry| match entry {
                        Entry::Dispatched { .. } => "dispatched",
                        Entry::Inactive { .. } => "inactive",
                        Entry::Unresolved { .. } => "unresolved",
                        Entry::Planned { .. } => "planned",
                    })
                    .collect::<Vec<&str>>()
                    .join(" "),
                stderr: String::new(),
                exit_code: Some(if report.has_failures() { 1 } else { 0 }),
            }),
            Err(err) => Ok(ExecOutput {
                stdout: String::new(),
                stderr: err.to_string(),
                exit_code: Some(1),
            }),
        }
    }
}

fn fleet() -> UsersTree {
    UsersTree::new().with_circus("user1", "host1", "tcp://0.0.0.0:5555")
}

async fn run_barnum(tree: &UsersTree, argv: &str, runner: Arc<dyn CommandRunner>) -> Report {
    let (line, delegate_args) = CommandLine::parse_words(words(argv));
    let mut cfg = line.config();
    cfg.users_root = tree.path().to_path_buf();

    let builder = Arc::new(CommandBuilder::from_config(
        Transport::ssh(cfg.tools.ssh.clone()),
        &cfg,
    ));
    let orchestrator =
        Orchestrator::with_parts(&cfg, builder, Arc::new(StaticUnits(Vec::new())), runner);

    orchestrator
        .run(&line.scopes()[0], &words("user1"), &delegate_args)
        .await
        .expect("barnum run")
}

fn delegating_with(
    tree: &UsersTree,
    control: &Arc<RecordingRunner>,
    listing: &'static str,
) -> Arc<dyn CommandRunner> {
    Arc::new(DelegatingRunner {
        users_root: tree.path().to_path_buf(),
        units: vec![("host1", listing)],
        control: control.clone(),
    })
}

fn delegating(tree: &UsersTree, control: &Arc<RecordingRunner>) -> Arc<dyn CommandRunner> {
    delegating_with(tree, control, "circus_user1_host1.service enabled active\n")
}

/// What the delegate answered for the only fleet target.
fn delegate_answer(report: &Report) -> &DispatchResult {
    let mut entries = report.entries();
    let (Some(Entry::Dispatched { result, .. }), None) = (entries.next(), entries.next()) else {
        panic!("expected exactly one delegate call in {report:?}");
    };
    result
}

#[tokio::test(flavor = "multi_thread")]
async fn double_separator_reaches_control_tool_through_delegate() {
    let tree = fleet();
    let control = Arc::new(RecordingRunner::new());

    let report = run_barnum(&tree, "barnum -- -- stats", delegating(&tree, &control)).await;

    assert!(!report.has_failures());
    let calls = control.calls();
    assert_eq!(calls.len(), 1);
    assert!(!calls[0].is_remote());
    assert_eq!(calls[0].inner(), words("circusctl --endpoint tcp://host1:5555 stats"));
}

#[tokio::test(flavor = "multi_thread")]
async fn single_separator_becomes_delegate_command() {
    let tree = fleet();
    let control = Arc::new(RecordingRunner::new());

    run_barnum(&tree, "barnum -- stats", delegating(&tree, &control)).await;

    assert_eq!(control.calls()[0].args[2..].to_vec(), words("stats"));
}

#[tokio::test(flavor = "multi_thread")]
async fn delegate_uses_forwarded_control_tool_path() {
    let tree = fleet();
    let control = Arc::new(RecordingRunner::new());

    run_barnum(
        &tree,
        "barnum --circusctl-path /opt/circus/bin/circusctl -v",
        delegating(&tree, &control),
    )
    .await;

    let calls = control.calls();
    assert_eq!(calls[0].program, "/opt/circus/bin/circusctl");
    assert_eq!(calls[0].args[2..].to_vec(), words("status"));
}

#[tokio::test]
async fn direct_target_skips_the_delegate() {
    let tree = fleet();
    let runner = Arc::new(RecordingRunner::new());

    run_barnum(&tree, "barnum user1@host1 -- stats", runner.clone()).await;

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].argv(),
        vec![
            "ssh".to_string(),
            "-q".to_string(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "host1".to_string(),
            "circusctl --endpoint tcp://host1:5555 stats".to_string(),
        ]
    );
}

#[tokio::test]
async fn dry_run_never_reaches_the_delegate() {
    let tree = fleet();
    let runner = Arc::new(RecordingRunner::new());

    let report = run_barnum(&tree, "barnum -D -- -- stats", runner.clone()).await;

    assert!(runner.calls().is_empty());
    let answer = delegate_answer(&report);
    assert_eq!(answer.outcome, Outcome::DryRun);
    assert_eq!(
        answer.command,
        "ssh -q -o BatchMode=yes host1 bailey --user user1 --host host1 --circusctl-path circusctl -- stats"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn delegate_reports_idle_unit_instead_of_dispatching() {
    let tree = fleet();
    let control = Arc::new(RecordingRunner::new());

    let report = run_barnum(
        &tree,
        "barnum",
        delegating_with(&tree, &control, "circus_user1_host1.service disabled inactive\n"),
    )
    .await;

    assert!(control.calls().is_empty());
    let answer = delegate_answer(&report);
    assert_eq!(answer.outcome, Outcome::Success);
    assert_eq!(answer.stdout, "inactive");
    assert!(!report.has_failures());
}

#[tokio::test(flavor = "multi_thread")]
async fn delegate_without_unit_needs_allow_missing() {
    let tree = fleet();
    let control = Arc::new(RecordingRunner::new());

    let report = run_barnum(&tree, "barnum", delegating_with(&tree, &control, "")).await;

    assert!(control.calls().is_empty());
    let answer = delegate_answer(&report);
    assert_eq!(answer.outcome, Outcome::Failed(DispatchError::NonZeroExit { code: Some(1) }));
    assert!(answer.stderr.contains("circus_user1_host1.service"));

    let report = run_barnum(
        &tree,
        "barnum --allow-missing-systemd-unit",
        delegating_with(&tree, &control, ""),
    )
    .await;

    assert_eq!(delegate_answer(&report).stdout, "dispatched");
    let calls = control.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].inner(), words("circusctl --endpoint tcp://host1:5555 status"));
}

#[tokio::test(flavor = "multi_thread")]
async fn delegate_acts_as_the_discovered_host() {
    let tree = UsersTree::new().with_circus("user1", "gbo-web01.example.org", "tcp://0.0.0.0:5555");
    let control = Arc::new(RecordingRunner::new());
    let runner = Arc::new(DelegatingRunner {
        users_root: tree.path().to_path_buf(),
        units: vec![(
            "gbo-web01.example.org",
            "circus_user1_gbo-web01.example.org.service enabled active\n",
        )],
        control: control.clone(),
    });

    let report = run_barnum(&tree, "barnum", runner).await;

    assert!(!report.has_failures());
    assert_eq!(
        control.calls()[0].inner(),
        words("circusctl --endpoint tcp://gbo-web01.example.org:5555 status")
    );
}
