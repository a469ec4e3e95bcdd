//! Sink-layer value types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Address of a Wavefront proxy's metrics port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProxyEndpoint {
    pub host: String,
    pub port: u16,
}

impl ProxyEndpoint {
    pub fn new(host: &str, port: u16) -> Self {
        ProxyEndpoint {
            host: host.to_string(),
            port,
        }
    }

    /// An endpoint with an empty host is treated as "not configured".
    pub fn is_configured(&self) -> bool {
        !self.host.trim().is_empty()
    }
}

impl fmt::Display for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
