use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

const TICK_STRINGS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

static SPINNER: Mutex<Option<ProgressBar>> = Mutex::new(None);

fn active() -> Option<ProgressBar> {
    SPINNER.lock().ok().and_then(|slot| slot.clone())
}

/// Shows the spinner on stderr until [`finish`] is called.
pub fn start(message: &str) {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICK_STRINGS);

    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));

    if let Ok(mut slot) = SPINNER.lock()
        && let Some(previous) = slot.replace(pb)
    {
        previous.finish_and_clear();
    }
}

pub fn report_dispatch_progress(done: usize) {
    if let Some(pb) = active() {
        pb.set_message(format!(
            "{} targets answered so far...",
            done.to_string().green().bold()
        ));
    }
}

pub fn finish() {
    if let Ok(mut slot) = SPINNER.lock()
        && let Some(pb) = slot.take()
    {
        pb.finish_and_clear();
    }
}

/// Runs `f` with the spinner hidden so stdout writes don't tear it.
pub fn suspend<F: FnOnce() -> R, R>(f: F) -> R {
    match active() {
        Some(pb) => pb.suspend(f),
        None => f(),
    }
}

/// Log sink that prints above the spinner while one is running.
pub struct SpinnerWriter;

impl Write for SpinnerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match active() {
            Some(pb) => {
                let msg = String::from_utf8_lossy(buf);
                pb.println(msg.trim_end());
            }
            None => io::stderr().write_all(buf)?,
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}
