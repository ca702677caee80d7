//! Report pieces are formatted as lines first and written by [`print`], so a
//! whole report can be rendered without a terminal.

use std::fmt::Display;

use crate::terminal::{colors, spinner};
use barnum_common::circus::unit::UnitDescriptor;
use colored::*;

pub const TOTAL_WIDTH: usize = 64;

/// Report output goes to stdout; the spinner is parked while it is written.
pub fn print(msg: &str) {
    spinner::suspend(|| println!("{msg}"));
}

pub fn print_lines(lines: &[String]) {
    spinner::suspend(|| {
        for line in lines {
            println!("{line}");
        }
    });
}

pub fn header(msg: &str) -> String {
    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = console::measure_text_width(&formatted);

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right)
    )
    .bright_black();

    format!("{}", line)
}

pub fn fat_separator() {
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH).bright_black();
    print(&format!("{}", sep));
}

pub fn tree_head(idx: usize, name: &str) -> String {
    let idx_str: String = format!("[{}]", idx.to_string().color(colors::ACCENT));
    format!(
        "{} {}",
        idx_str.color(colors::SEPARATOR),
        name.color(colors::PRIMARY)
    )
}

/// `unit<TAB>enabled<TAB>active`, green when running and red otherwise.
pub fn unit_summary(unit: &UnitDescriptor) -> String {
    let color = if unit.is_active() {
        colors::UNIT_ACTIVE
    } else {
        colors::UNIT_INACTIVE
    };
    format!("{}", unit.to_string().color(color))
}

pub fn no_circus_expected() -> String {
    format!("{}", "  No circus expected".color(colors::UNIT_INACTIVE))
}

pub fn dry_run(command: &str) -> String {
    format!(
        "  {} {}",
        "DRY RUN; would execute:".color(colors::DRY_RUN).bold(),
        command
    )
}

pub fn inline_error(err: impl Display) -> String {
    format!("  {} {}", "[-]".color(colors::ERROR).bold(), err)
}

/// `Circus command '<cmd>': SUCCESS` (or `FAILED`) for non-status commands.
pub fn command_verdict(command: &str, success: bool) -> String {
    let line = format!("Circus command '{command}': {}", if success { "SUCCESS" } else { "FAILED" });
    let color = if success { colors::UNIT_ACTIVE } else { colors::ERROR };
    format!("  {}", line.color(color))
}

/// Command output, indented under its heading. `stderr` lines are tinted.
pub fn indented(output: &str, is_stderr: bool) -> Vec<String> {
    output
        .lines()
        .map(|line| {
            if is_stderr {
                format!("  {}", line.color(colors::STDERR))
            } else {
                format!("  {line}")
            }
        })
        .collect()
}

pub fn centerln(msg: &str) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{}{}{}", space, msg, space));
}

pub fn no_results() {
    print(&header("no circus instances found"));
}
