//! Condenses `circusctl status` output (`<watcher>: <state>` per line) into
//! state counts for one-line summaries.

/// Overall condition of an instance's watchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    /// Every watcher is active.
    Running,
    /// Some watcher is stopped or in transition, none errored.
    Degraded,
    Error,
}

pub const ACTIVE: &str = "active";
pub const ERROR: &str = "error";

impl Health {
    /// Condition a single watcher state stands for.
    pub fn of_state(state: &str) -> Self {
        match state {
            ACTIVE => Health::Running,
            ERROR => Health::Error,
            _ => Health::Degraded,
        }
    }
}

/// Watcher state counts in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateCounts {
    counts: Vec<(String, usize)>,
}

impl StateCounts {
    /// Lines without a `: ` separator are ignored.
    pub fn from_status(output: &str) -> Self {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for line in output.lines() {
            let Some((_, state)) = line.split_once(": ") else {
                continue;
            };
            let state = state.trim();
            match counts.iter_mut().find(|(known, _)| known == state) {
                Some((_, count)) => *count += 1,
                None => counts.push((state.to_string(), 1)),
            }
        }
        Self { counts }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(state, count)| (state.as_str(), *count))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The worst state present; no watchers at all counts as running.
    pub fn health(&self) -> Health {
        let states: Vec<Health> = self.iter().map(|(state, _)| Health::of_state(state)).collect();
        if states.contains(&Health::Error) {
            Health::Error
        } else if states.contains(&Health::Degraded) {
            Health::Degraded
        } else {
            Health::Running
        }
    }
}
