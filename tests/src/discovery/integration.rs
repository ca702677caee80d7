#![cfg(test)]
use std::sync::Arc;

use barnum_common::circus::scope::Scope;
use barnum_common::circus::target::Target;
use barnum_common::dispatch::{ExecOutput, Outcome};
use barnum_common::errors::{DiscoveryError, DispatchError, ResolutionError};
use barnum_core::command::{CommandBuilder, Transport};
use barnum_core::orchestrator::{Entry, Orchestrator, RunError};
use barnum_core::resolver::EndpointResolver;

use crate::support::{RecordingRunner, StaticUnits, UsersTree, words};

fn orchestrator(
    tree: &UsersTree,
    dry_run: bool,
    units: StaticUnits,
    runner: Arc<RecordingRunner>,
) -> Orchestrator {
    let cfg = tree.config(dry_run);
    let builder = Arc::new(CommandBuilder::from_config(Transport::ssh("ssh"), &cfg));
    Orchestrator::with_parts(&cfg, builder, Arc::new(units), runner)
}

fn two_host_fleet() -> UsersTree {
    UsersTree::new()
        .with_circus("user1", "host1", "tcp://0.0.0.0:5555")
        .with_circus("user2", "host2", "tcp://0.0.0.0:5556")
}

/// The whole fleet is reached through one delegate call per (user, host),
/// grouped under the host that runs it.
#[tokio::test]
async fn fleet_run_groups_delegate_calls_by_host() {
    let tree = two_host_fleet();
    let runner = Arc::new(RecordingRunner::new());
    let orchestrator = orchestrator(&tree, false, StaticUnits(Vec::new()), runner.clone());

    let report = orchestrator
        .run(&Scope::Fleet, &words("user1 user2 user3"), &[])
        .await
        .expect("fleet run");

    let hosts: Vec<&str> = report.groups.iter().map(|g| g.host.as_str()).collect();
    assert_eq!(hosts, vec!["host1", "host2"]);
    assert!(!report.has_failures());

    let calls = runner.calls();
    assert_eq!(calls.len(), 2);
    for (call, (user, host)) in calls.iter().zip([("user1", "host1"), ("user2", "host2")]) {
        assert_eq!(call.wrapper.last().map(String::as_str), Some(host));
        assert_eq!(call.program, "bailey");
        assert_eq!(call.args[..2].to_vec(), words(&format!("--user {user}")));
    }
}

#[tokio::test]
async fn unknown_instance_is_not_found_before_any_dispatch() {
    let tree = two_host_fleet();
    let runner = Arc::new(RecordingRunner::new());
    let orchestrator = orchestrator(&tree, false, StaticUnits(Vec::new()), runner.clone());

    let result = orchestrator
        .run(&Scope::UserAtHost(Target::new("user3", "host2")), &[], &[])
        .await;

    match result {
        Err(RunError::Resolution(ResolutionError::NotFound { target, path })) => {
            assert_eq!(target, Target::new("user3", "host2"));
            assert!(path.ends_with("user3/circus/host2/circus.ini"));
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn host_run_addresses_each_running_circus_on_that_host() {
    let tree = UsersTree::new()
        .with_circus("user1", "host1", "tcp://0.0.0.0:5555")
        .with_circus("user2", "host1", "tcp://127.0.0.1:5600");
    let units = StaticUnits(vec![(
        "host1",
        "circus_user1_host1.service enabled active\n\
         circus_user2_host1.service enabled active\n\
         circus_user4_host1.service disabled inactive\n",
    )]);
    let runner = Arc::new(RecordingRunner::new());
    let orchestrator = orchestrator(&tree, false, units, runner.clone());

    let report = orchestrator
        .run(&Scope::Host("host1".to_string()), &[], &words("-- stats"))
        .await
        .expect("host run");

    let rendered: Vec<String> = runner.calls().iter().map(|c| c.to_string()).collect();
    assert_eq!(
        rendered,
        vec![
            "ssh -q -o BatchMode=yes host1 circusctl --endpoint tcp://host1:5555 stats",
            "ssh -q -o BatchMode=yes host1 circusctl --endpoint tcp://127.0.0.1:5600 stats",
        ]
    );
    assert!(matches!(
        report.groups[0].entries.last(),
        Some(Entry::Inactive { unit, .. }) if unit.name == "circus_user4_host1.service"
    ));
    assert!(!report.has_failures());
}

#[tokio::test]
async fn unreachable_host_is_fatal() {
    let tree = two_host_fleet();
    let runner = Arc::new(RecordingRunner::new());
    let orchestrator = orchestrator(&tree, false, StaticUnits(Vec::new()), runner.clone());

    let err = orchestrator
        .run(&Scope::Host("host9".to_string()), &[], &[])
        .await
        .expect_err("listing fails");

    assert!(matches!(
        err,
        RunError::Discovery(DiscoveryError::RemoteFailure { ref host, .. }) if host == "host9"
    ));
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn failing_target_leaves_siblings_intact() {
    let tree = two_host_fleet();
    let runner = Arc::new(RecordingRunner::replying(|command| {
        let host = command.wrapper.last().cloned().unwrap_or_default();
        Ok(ExecOutput {
            stdout: format!("status of {host}"),
            stderr: if host == "host1" { "error: timed out".to_string() } else { String::new() },
            exit_code: Some(if host == "host1" { 1 } else { 0 }),
        })
    }));
    let orchestrator = orchestrator(&tree, false, StaticUnits(Vec::new()), runner.clone());

    let report = orchestrator
        .run(&Scope::Fleet, &words("user1 user2"), &[])
        .await
        .expect("fleet run");

    let outcomes: Vec<(&str, &Outcome, &str)> = report
        .entries()
        .map(|entry| match entry {
            Entry::Dispatched { result, .. } => {
                (result.target.host.as_str(), &result.outcome, result.stderr.as_str())
            }
            other => panic!("unexpected entry {other:?}"),
        })
        .collect();

    assert_eq!(
        outcomes,
        vec![
            (
                "host1",
                &Outcome::Failed(DispatchError::NonZeroExit { code: Some(1) }),
                "error: timed out"
            ),
            ("host2", &Outcome::Success, ""),
        ]
    );
    assert!(report.has_failures());
}

/// Fleet discovery, host unit discovery and direct addressing agree on every
/// instance's endpoint.
#[tokio::test]
async fn every_strategy_resolves_the_same_endpoint() {
    let tree = two_host_fleet();
    let units = StaticUnits(vec![
        ("host1", "circus_user1_host1.service enabled active\n"),
        ("host2", "circus_user2_host2.service enabled active\n"),
    ]);
    let runner = Arc::new(RecordingRunner::new());
    let orchestrator = orchestrator(&tree, true, units, runner.clone());
    let resolver = EndpointResolver::new(tree.path());

    let fleet = orchestrator
        .run(&Scope::Fleet, &words("user1 user2"), &[])
        .await
        .expect("fleet run");

    for entry in fleet.entries() {
        let target = entry.target().cloned().expect("fleet entries name their instance");
        let expected = resolver.resolve(&target).expect("resolvable").to_string();

        let by_host = orchestrator
            .run(&Scope::Host(target.host.clone()), &[], &[])
            .await
            .expect("host run");
        let direct = orchestrator
            .run(&Scope::UserAtHost(target.clone()), &[], &[])
            .await
            .expect("direct run");

        for report in [&by_host, &direct] {
            let Some(Entry::Dispatched { result, .. }) = report.entries().next() else {
                panic!("{target} was not dispatched");
            };
            assert_eq!(result.outcome, Outcome::DryRun);
            assert!(result.command.contains(&format!("--endpoint {expected} status")));
        }
    }
    assert!(runner.calls().is_empty());
}
