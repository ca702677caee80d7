//! # Systemd Unit Model
//!
//! Every circus instance is started by a systemd unit named
//! `circus_<user>_<host>.service`. The name is the only place the owning user
//! is recorded on the host, so host-level discovery recovers targets from it.

use std::fmt;

use crate::circus::target::Target;

pub const UNIT_PREFIX: &str = "circus_";
pub const UNIT_SUFFIX: &str = ".service";

/// One line of the host's unit listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitDescriptor {
    pub name: String,
    pub enabled_state: String,
    pub active_state: String,
}

/// Outcome of matching a unit name against the naming convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitMatch {
    Matched(Target),
    Unmatched,
}

impl UnitDescriptor {
    pub fn new(
        name: impl Into<String>,
        enabled_state: impl Into<String>,
        active_state: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            enabled_state: enabled_state.into(),
            active_state: active_state.into(),
        }
    }

    /// Parses `<unit> <enabled-state> <active-state>`; extra columns are ignored.
    pub fn from_listing_line(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();
        let name = fields.next()?;
        let enabled_state = fields.next()?;
        let active_state = fields.next()?;
        Some(Self::new(name, enabled_state, active_state))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled_state == "enabled"
    }

    pub fn is_active(&self) -> bool {
        self.active_state == "active"
    }

    pub fn target(&self) -> UnitMatch {
        parse_unit_name(&self.name)
    }
}

impl fmt::Display for UnitDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.name, self.enabled_state, self.active_state)
    }
}

/// Splits `circus_<user>_<host>[.service]` into its target.
///
/// The host is taken after the *last* underscore, so user names may contain
/// underscores while host names may not. Fleet discovery skips host
/// directories with an underscore for the same reason.
pub fn parse_unit_name(name: &str) -> UnitMatch {
    let Some(rest) = name.strip_prefix(UNIT_PREFIX) else {
        return UnitMatch::Unmatched;
    };
    let rest = rest.strip_suffix(UNIT_SUFFIX).unwrap_or(rest);

    match rest.rsplit_once('_') {
        Some((user, host)) if !user.is_empty() && !host.is_empty() => {
            UnitMatch::Matched(Target::new(user, host))
        }
        _ => UnitMatch::Unmatched,
    }
}

/// Builds the unit name that owns `target`.
pub fn unit_name(target: &Target) -> String {
    format!("{UNIT_PREFIX}{}_{}{UNIT_SUFFIX}", target.user, target.host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_user_and_host_from_name() {
        assert_eq!(
            parse_unit_name("circus_user2_host1.service"),
            UnitMatch::Matched(Target::new("user2", "host1"))
        );
        assert_eq!(
            parse_unit_name("circus_user2_host1"),
            UnitMatch::Matched(Target::new("user2", "host1"))
        );
    }

    #[test]
    fn underscores_belong_to_the_user() {
        assert_eq!(
            parse_unit_name("circus_web_admin_host1.service"),
            UnitMatch::Matched(Target::new("web_admin", "host1"))
        );
    }

    #[test]
    fn missing_delimiter_is_unmatched() {
        assert_eq!(parse_unit_name("circus_user2.service"), UnitMatch::Unmatched);
        assert_eq!(parse_unit_name("circus-beta.service"), UnitMatch::Unmatched);
        assert_eq!(parse_unit_name("circus__host1"), UnitMatch::Unmatched);
        assert_eq!(parse_unit_name("sshd.service"), UnitMatch::Unmatched);
    }

    #[test]
    fn unit_name_is_inverse_of_parse() {
        let target = Target::new("user1", "host9");
        assert_eq!(parse_unit_name(&unit_name(&target)), UnitMatch::Matched(target));
    }

    #[test]
    fn listing_line_needs_three_columns() {
        let unit = UnitDescriptor::from_listing_line("circus_u_h.service enabled active").unwrap();
        assert!(unit.is_enabled());
        assert!(unit.is_active());
        assert!(UnitDescriptor::from_listing_line("circus_u_h.service enabled").is_none());
        assert!(UnitDescriptor::from_listing_line("").is_none());
    }
}
