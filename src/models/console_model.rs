use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use scdtr_link::core::constants::{
    DEFAULT_COMMAND_IP, DEFAULT_COMMAND_PORT, DEFAULT_FORWARD_IP, DEFAULT_FORWARD_PORT,
};
use scdtr_link::{ConsoleError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub command: Endpoint,
    pub forwarding: Endpoint,
    pub csv_dir: String,
    pub show_messages: bool,
    pub forward_on_start: bool,
    pub connect_on_start: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            command: Endpoint::new(DEFAULT_COMMAND_IP, DEFAULT_COMMAND_PORT),
            forwarding: Endpoint::new(DEFAULT_FORWARD_IP, DEFAULT_FORWARD_PORT),
            csv_dir: ".".to_string(),
            show_messages: true,
            forward_on_start: false,
            connect_on_start: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    pub ip: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(ip: &str, port: u16) -> Self {
        Self {
            ip: ip.to_string(),
            port,
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.ip, self.port);
        addr.parse::<SocketAddr>()
            .or_else(|_| format!("[{}]:{}", self.ip, self.port).parse())
            .map_err(|_| ConsoleError::InvalidAddress(addr))
    }
}
