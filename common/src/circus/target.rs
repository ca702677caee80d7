//! # Dispatch Target Model
//!
//! A [`Target`] names exactly one circus instance: the account that owns it and
//! the host it runs on. It is the unit every discovery strategy produces and
//! the unit the dispatcher fans out over.

use std::fmt;
use std::str::FromStr;

use crate::errors::ScopeError;

/// A `(user, host)` pair identifying one circus instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Target {
    pub user: String,
    pub host: String,
}

impl Target {
    pub fn new(user: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            host: host.into(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.host)
    }
}

impl FromStr for Target {
    type Err = ScopeError;

    /// Parses `user@host`. Both halves must be non-empty and only one `@` is allowed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((user, host)) = s.split_once('@') else {
            return Err(ScopeError::Invalid(s.to_string()));
        };

        if user.is_empty() || host.is_empty() || host.contains('@') {
            return Err(ScopeError::Invalid(s.to_string()));
        }

        Ok(Self::new(user, host))
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
