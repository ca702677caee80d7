use std::sync::Arc;
use std::time::{Duration, Instant};

use colored::*;
use tracing::error;

use crate::terminal::{colors, print, spinner};
use barnum_common::circus::scope::Scope;
use barnum_common::circus::target::Target;
use barnum_common::circus::unit::UnitDescriptor;
use barnum_common::config::{Config, StatusOptions};
use barnum_common::dispatch::{CommandRunner, DispatchResult, Outcome};
use barnum_common::passthrough;
use barnum_core::command::Transport;
use barnum_core::orchestrator::{Entry, Orchestrator, Report};
use barnum_core::status::{Health, StateCounts};

/// How dispatched results are turned into report lines.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub status: StatusOptions,
    pub verbose: bool,
    /// What the control tool was asked to do, `status` by default.
    pub control_args: Vec<String>,
}

impl RenderOptions {
    pub fn new(cfg: &Config, delegate_args: &[String]) -> Self {
        Self {
            status: cfg.status,
            verbose: cfg.verbose,
            control_args: passthrough::control_args(delegate_args),
        }
    }

    fn is_status(&self) -> bool {
        self.control_args.first().map(String::as_str) == Some(passthrough::DEFAULT_CONTROL_COMMAND)
    }
}

/// Runs every scope in turn and renders the reports.
///
/// A scope that fails before dispatch is logged and the rest still run.
/// Returns `Ok(false)` when any scope failed or any report carries a failure.
pub async fn run(
    scopes: &[Scope],
    roster: &[String],
    delegate_args: &[String],
    cfg: &Config,
    transport: Transport,
    runner: Arc<dyn CommandRunner>,
) -> anyhow::Result<bool> {
    let orchestrator = Orchestrator::new(cfg, transport, runner)
        .with_progress(Arc::new(spinner::report_dispatch_progress));
    let options = RenderOptions::new(cfg, delegate_args);

    let label = scopes.iter().map(Scope::to_string).collect::<Vec<String>>().join(", ");
    spinner::start(&format!("Reaching circus instances for {label}..."));
    let start_time: Instant = Instant::now();

    let mut reports: Vec<Report> = Vec::new();
    let mut ok = true;
    for scope in scopes {
        match orchestrator.run(scope, roster, delegate_args).await {
            Ok(report) => reports.push(report),
            Err(err) if scopes.len() == 1 => {
                spinner::finish();
                return Err(err.into());
            }
            Err(err) => {
                error!("{scope}: {err}");
                ok = false;
            }
        }
    }
    spinner::finish();

    if reports.iter().all(Report::is_empty) {
        print::no_results();
        return Ok(ok);
    }

    for report in &reports {
        print::print_lines(&render_report(report, &options));
    }
    print_summary(&reports, start_time.elapsed());
    Ok(ok && !reports.iter().any(Report::has_failures))
}

/// One banner per host followed by its entries; hosts are separated by a blank line.
pub fn render_report(report: &Report, options: &RenderOptions) -> Vec<String> {
    let delegated = report.scope.is_delegated();
    let mut lines: Vec<String> = Vec::new();
    for (group_idx, group) in report.groups.iter().enumerate() {
        lines.push(print::header(&group.host));
        for (idx, entry) in group.entries.iter().enumerate() {
            render_entry(&mut lines, idx, entry, delegated, options);
        }
        if group_idx + 1 != report.groups.len() {
            lines.push(String::new());
        }
    }
    lines
}

fn render_entry(
    lines: &mut Vec<String>,
    idx: usize,
    entry: &Entry,
    delegated: bool,
    options: &RenderOptions,
) {
    // The delegate already rendered its own output.
    if options.status.short
        && !delegated
        && let Some(line) = short_line(entry, options)
    {
        lines.push(line);
        return;
    }

    match entry {
        Entry::Dispatched { unit, result } => {
            lines.push(match unit {
                Some(unit) => print::unit_summary(unit),
                None => print::tree_head(idx, &result.target.to_string()),
            });
            render_result(lines, result, delegated, options);
        }
        Entry::Inactive { unit, .. } => {
            lines.push(print::unit_summary(unit));
            lines.push(print::no_circus_expected());
        }
        Entry::Unresolved { unit, error } => {
            lines.push(match unit {
                Some(unit) => print::unit_summary(unit),
                None => print::tree_head(idx, &error.target().to_string()),
            });
            lines.push(print::inline_error(error));
        }
        Entry::Planned { command, .. } => lines.push(print::dry_run(command)),
    }
}

fn render_result(
    lines: &mut Vec<String>,
    result: &DispatchResult,
    delegated: bool,
    options: &RenderOptions,
) {
    if result.outcome == Outcome::DryRun {
        lines.push(print::dry_run(&result.command));
        return;
    }
    if !delegated && !options.is_status() {
        lines.push(print::command_verdict(&verdict_label(result, options), !result.is_failure()));
    }
    lines.extend(print::indented(&result.stdout, false));
    lines.extend(print::indented(&result.stderr, true));
    if let Outcome::Failed(err) = &result.outcome {
        lines.push(print::inline_error(err));
    }
}

fn verdict_label(result: &DispatchResult, options: &RenderOptions) -> String {
    if options.verbose {
        format!("$ {}", result.command)
    } else {
        options.control_args.join(" ")
    }
}

/// `<user@host>: [Systemd Status: ...; ]<summary>` for `--short`; `None` for
/// entries that read the same either way.
fn short_line(entry: &Entry, options: &RenderOptions) -> Option<String> {
    let (target, unit, summary): (&Target, Option<&UnitDescriptor>, String) = match entry {
        Entry::Dispatched { result, .. } if result.outcome == Outcome::DryRun => return None,
        Entry::Dispatched { unit, result } if options.is_status() => {
            (&result.target, unit.as_ref(), watcher_summary(result))
        }
        Entry::Dispatched { unit, result } => {
            let verdict = print::command_verdict(&verdict_label(result, options), !result.is_failure());
            (&result.target, unit.as_ref(), verdict.trim_start().to_string())
        }
        Entry::Inactive { unit, target } => (
            target,
            Some(unit),
            "No circus expected".color(colors::UNIT_INACTIVE).to_string(),
        ),
        Entry::Unresolved { .. } | Entry::Planned { .. } => return None,
    };

    let mut parts: Vec<String> = Vec::new();
    if options.status.systemd_status
        && let Some(unit) = unit
    {
        let color = if unit.is_active() { colors::UNIT_ACTIVE } else { colors::UNIT_INACTIVE };
        let state = format!("Systemd Status: {} {}", unit.enabled_state, unit.active_state);
        parts.push(state.color(color).to_string());
    }
    parts.push(summary);
    Some(format!("{}: {}", target.to_string().color(colors::PRIMARY), parts.join("; ")))
}

fn watcher_summary(result: &DispatchResult) -> String {
    if result.is_failure() {
        return "Circus Watchers: ERROR".color(colors::ERROR).to_string();
    }
    let counts = StateCounts::from_status(&result.stdout);
    if counts.is_empty() {
        return "No Circus Watchers found".color(colors::UNIT_INACTIVE).to_string();
    }

    let color = health_color(counts.health());
    let states: Vec<String> = counts
        .iter()
        .map(|(state, count)| {
            let color = health_color(Health::of_state(state));
            format!("{state}: {count}").color(color).to_string()
        })
        .collect();
    format!("{}: {}", "Circus Status".color(color), states.join("; "))
}

fn health_color(health: Health) -> Color {
    match health {
        Health::Running => colors::UNIT_ACTIVE,
        Health::Degraded => colors::WATCHERS_DEGRADED,
        Health::Error => colors::ERROR,
    }
}

fn print_summary(reports: &[Report], total_time: Duration) {
    let (mut answered, mut failed, mut idle) = (0usize, 0usize, 0usize);
    for entry in reports.iter().flat_map(Report::entries) {
        match entry {
            Entry::Inactive { .. } => idle += 1,
            entry if entry.is_failure() => failed += 1,
            _ => answered += 1,
        }
    }

    let answered: ColoredString = format!("{answered} ok").bold().green();
    let failed: ColoredString = match failed {
        0 => format!("{failed} failed").normal(),
        _ => format!("{failed} failed").bold().red(),
    };
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: ColoredString =
        format!("{answered}, {failed}, {idle} not running in {total_time}").color(colors::TEXT_DEFAULT);

    print::fat_separator();
    print::centerln(&output.to_string());
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
