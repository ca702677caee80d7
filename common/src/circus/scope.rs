//! # Invocation Scope
//!
//! The positional target of a barnum invocation selects one of these scopes:
//! * Nothing (or `*`, `*@*`): every circus the roster knows about.
//! * A bare host: every circus installed on that host.
//! * `user@host`: a single circus.
//! * `*@host`: the roster's circus instances configured for that host.
//! * `user@*`: every host one user has a circus configured on.

use std::fmt;
use std::str::FromStr;

use crate::circus::target::Target;
use crate::errors::ScopeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// The whole fleet, discovered from the shared users tree.
    Fleet,
    /// All circus units installed on one host.
    Host(String),
    /// Exactly one circus instance.
    UserAtHost(Target),
    /// Roster users with a circus configured for one host.
    AnyUserOn(String),
    /// Every configured host of one user.
    AnyHostOf(String),
}

const WILDCARD: &str = "*";

impl Scope {
    /// True when the user named a specific host or instance.
    pub fn is_explicit(&self) -> bool {
        !matches!(self, Scope::Fleet)
    }

    /// Scopes found in the users tree and handed to the delegate per host.
    pub fn is_delegated(&self) -> bool {
        matches!(self, Scope::Fleet | Scope::AnyUserOn(_) | Scope::AnyHostOf(_))
    }

    /// Whether the roster is needed to expand this scope.
    pub fn uses_roster(&self) -> bool {
        matches!(self, Scope::Fleet | Scope::AnyUserOn(_))
    }
}

impl FromStr for Scope {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == WILDCARD {
            return Ok(Scope::Fleet);
        }

        if let Some((user, host)) = s.split_once('@') {
            return match (user, host) {
                (WILDCARD, WILDCARD) => Ok(Scope::Fleet),
                (WILDCARD, host) if !host.is_empty() && !host.contains(['@', '*']) => {
                    Ok(Scope::AnyUserOn(host.to_string()))
                }
                (user, WILDCARD) if !user.is_empty() && !user.contains('*') => {
                    Ok(Scope::AnyHostOf(user.to_string()))
                }
                _ if s.contains('*') => Err(ScopeError::Invalid(s.to_string())),
                _ => s.parse().map(Scope::UserAtHost),
            };
        }

        if s.contains('*') {
            return Err(ScopeError::Invalid(s.to_string()));
        }

        Ok(Scope::Host(s.to_string()))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Fleet => write!(f, "fleet"),
            Scope::Host(host) => write!(f, "{host}"),
            Scope::UserAtHost(target) => write!(f, "{target}"),
            Scope::AnyUserOn(host) => write!(f, "{WILDCARD}@{host}"),
            Scope::AnyHostOf(user) => write!(f, "{user}@{WILDCARD}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_wildcard_mean_fleet() {
        assert_eq!("*".parse::<Scope>().unwrap(), Scope::Fleet);
        assert_eq!("".parse::<Scope>().unwrap(), Scope::Fleet);
    }

    #[test]
    fn bare_name_is_host_scope() {
        assert_eq!(
            "host1".parse::<Scope>().unwrap(),
            Scope::Host("host1".to_string())
        );
    }

    #[test]
    fn user_at_host_is_single_target() {
        let scope: Scope = "user1@host1".parse().unwrap();
        assert_eq!(scope, Scope::UserAtHost(Target::new("user1", "host1")));
        assert!(scope.is_explicit());
    }

    #[test]
    fn malformed_user_at_host_is_rejected() {
        assert!("user1@".parse::<Scope>().is_err());
        assert!("a@b@c".parse::<Scope>().is_err());
    }

    #[test]
    fn wildcard_halves_select_roster_scans() {
        let on_host: Scope = "*@host1".parse().unwrap();
        assert_eq!(on_host, Scope::AnyUserOn("host1".to_string()));
        assert_eq!(on_host.to_string(), "*@host1");
        assert!(on_host.uses_roster());

        let of_user: Scope = "user1@*".parse().unwrap();
        assert_eq!(of_user, Scope::AnyHostOf("user1".to_string()));
        assert!(!of_user.uses_roster());
        assert!(of_user.is_delegated() && of_user.is_explicit());

        assert_eq!("*@*".parse::<Scope>().unwrap(), Scope::Fleet);
    }

    #[test]
    fn stray_wildcards_are_rejected() {
        assert!("host*".parse::<Scope>().is_err());
        assert!("us*r@host1".parse::<Scope>().is_err());
        assert!("*@".parse::<Scope>().is_err());
    }
}
