//! Client configuration.

use serde::{Deserialize, Serialize};

/// Where the broker lives and where this client listens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Host name or address of the broker.
    pub server_host: String,

    /// Broker port for control-plane (TCP) requests.
    pub control_port: u16,

    /// Broker port for data-plane (UDP) datagrams.
    pub data_port: u16,

    /// Local address the inbound listener binds to. Port 0 picks a free
    /// port; the bound port is what gets registered.
    pub listen_addr: String,

    /// Upper bound for a single control response read and for one
    /// inbound datagram.
    pub max_response_bytes: usize,
}

impl ClientConfig {
    /// Config for a broker at `server_host` with the default ports.
    pub fn new(server_host: impl Into<String>) -> Self {
        Self {
            server_host: server_host.into(),
            control_port: 1234,
            data_port: 1234,
            listen_addr: "0.0.0.0:1235".to_string(),
            max_response_bytes: 1024,
        }
    }

    #[must_use]
    pub fn with_control_port(mut self, port: u16) -> Self {
        self.control_port = port;
        self
    }

    #[must_use]
    pub fn with_data_port(mut self, port: u16) -> Self {
        self.data_port = port;
        self
    }

    #[must_use]
    pub fn with_listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = addr.into();
        self
    }

    #[must_use]
    pub fn with_max_response_bytes(mut self, max: usize) -> Self {
        self.max_response_bytes = max;
        self
    }
}
