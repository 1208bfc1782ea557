// Forwarding of measurements to an external plotting tool

use crate::core::constants::TIMESTAMP_FIELD;
use crate::core::error::Result;
use crate::core::extractor::parse_tagged_value;
use crate::core::presence::{BeaconPayload, PresenceBeacon};
use serde_json::{Map, Number, Value};
use std::net::{Ipv6Addr, SocketAddr, UdpSocket};
use std::sync::Arc;
use tracing::{debug, warn};

/// `{ "<name>": value, "timestamp": timestamp }`
///
/// A value that JSON cannot carry (NaN, infinity) is sent as `null`.
pub fn envelope(name: &str, value: f64, timestamp: i64) -> String {
    let mut map = Map::new();
    map.insert(
        name.to_string(),
        Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null),
    );
    map.insert(TIMESTAMP_FIELD.to_string(), Value::from(timestamp));
    Value::Object(map).to_string()
}

/// Anything that accepts named measurements, fire-and-forget.
pub trait TelemetrySink {
    fn forward(&self, name: &str, value: f64, timestamp: i64);

    /// Forwards a `<tag>:<name>:<value>` line. Other shapes are dropped.
    fn forward_tagged_line(&self, line: &str, timestamp: i64) {
        match parse_tagged_value(line) {
            Some((name, value)) => self.forward(name, value, timestamp),
            None => debug!("Not forwarding untagged line: {:?}", line),
        }
    }
}

/// Sends envelopes as single UDP datagrams to one peer.
pub struct TelemetryForwarder {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
}

impl TelemetryForwarder {
    pub fn new(peer: SocketAddr) -> Result<Self> {
        let bind_addr: SocketAddr = if peer.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(bind_addr)?;
        socket.set_nonblocking(true)?;
        Ok(Self {
            socket: Arc::new(socket),
            peer,
        })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Timestamped presence beacon sharing this forwarder's socket.
    pub fn beacon(&self) -> PresenceBeacon {
        PresenceBeacon::new(Arc::clone(&self.socket), self.peer, BeaconPayload::Timestamped)
    }

    /// Sends raw bytes, logging instead of returning failures.
    pub fn send_raw(&self, payload: &[u8]) {
        if let Err(e) = self.socket.send_to(payload, self.peer) {
            warn!("Forward to {} failed: {}", self.peer, e);
        }
    }
}

impl TelemetrySink for TelemetryForwarder {
    fn forward(&self, name: &str, value: f64, timestamp: i64) {
        self.send_raw(envelope(name, value, timestamp).as_bytes());
    }
}
