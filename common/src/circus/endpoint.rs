use std::fmt;
use std::str::FromStr;

/// Address circus binds to when it listens on every interface.
pub const WILDCARD_ADDR: &str = "0.0.0.0";

/// Control endpoint of a circus instance, e.g. `tcp://10.0.0.4:5555`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub transport: String,
    pub address: String,
    pub port: u16,
}

impl Endpoint {
    /// Replaces a wildcard bind address with `host`, so the endpoint can be
    /// dialled from a shell running on that host.
    pub fn for_host(mut self, host: &str) -> Self {
        if self.address == WILDCARD_ADDR {
            tracing::debug!("Converting {} to explicit host reference {host}", self.address);
            self.address = host.to_string();
        }
        self
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.transport, self.address, self.port)
    }
}

impl FromStr for Endpoint {
    type Err = String;

    /// Parses `transport://address:port`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (transport, rest) = s
            .split_once("://")
            .ok_or_else(|| format!("missing transport in endpoint {s:?}"))?;
        let (address, port) = rest
            .rsplit_once(':')
            .ok_or_else(|| format!("missing port in endpoint {s:?}"))?;

        if transport.is_empty() || !transport.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(format!("invalid transport in endpoint {s:?}"));
        }
        if address.is_empty() {
            return Err(format!("missing address in endpoint {s:?}"));
        }
        let port: u16 = port
            .parse()
            .map_err(|_| format!("invalid port in endpoint {s:?}"))?;

        Ok(Self {
            transport: transport.to_string(),
            address: address.to_string(),
            port,
        })
    }
}
