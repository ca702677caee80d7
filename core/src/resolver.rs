//! # Endpoint Resolution
//!
//! Turns a [`Target`] into the control [`Endpoint`] of its circus instance by
//! reading `<users_root>/<user>/circus/<host>/circus.ini`.
//!
//! Both discovery strategies end here, which is what keeps them consistent: a
//! target found by the fleet scan and the same target named on the command
//! line resolve through the exact same path.

use std::path::PathBuf;

use barnum_common::circus::endpoint::Endpoint;
use barnum_common::circus::target::Target;
use barnum_common::errors::ResolutionError;
use tracing::debug;

use crate::circus_config::CircusConfig;

pub struct EndpointResolver {
    users_root: PathBuf,
}

impl EndpointResolver {
    pub fn new(users_root: impl Into<PathBuf>) -> Self {
        Self {
            users_root: users_root.into(),
        }
    }

    /// Resolves the endpoint for `target`. Read-only; errors are never defaulted.
    pub fn resolve(&self, target: &Target) -> Result<Endpoint, ResolutionError> {
        let config = CircusConfig::load(&self.users_root, target)?;
        let endpoint = config.endpoint()?.for_host(&target.host);
        debug!("Resolved {target} to {endpoint} via {}", config.path.display());
        Ok(endpoint)
    }
}
