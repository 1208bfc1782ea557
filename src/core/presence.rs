// Liveness datagrams

use crate::core::constants::{COMMAND_PRESENCE_PAYLOAD, PRESENCE_FIELD};
use chrono::Utc;
use serde_json::{Map, Value};
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum BeaconPayload {
    /// Same bytes on every firing.
    Fixed(Vec<u8>),
    /// `{"presence": <wall-clock ms>}`
    Timestamped,
}

impl BeaconPayload {
    /// The beacon a node expects on its command port.
    pub fn command_presence() -> Self {
        BeaconPayload::Fixed(COMMAND_PRESENCE_PAYLOAD.to_vec())
    }

    pub fn render(&self) -> Vec<u8> {
        match self {
            BeaconPayload::Fixed(bytes) => bytes.clone(),
            BeaconPayload::Timestamped => {
                let mut map = Map::new();
                map.insert(
                    PRESENCE_FIELD.to_string(),
                    Value::from(Utc::now().timestamp_millis()),
                );
                Value::Object(map).to_string().into_bytes()
            }
        }
    }
}

/// Emits one payload per call to a fixed peer. The caller owns the timing.
pub struct PresenceBeacon {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
    payload: BeaconPayload,
}

impl PresenceBeacon {
    pub fn new(socket: Arc<UdpSocket>, peer: SocketAddr, payload: BeaconPayload) -> Self {
        Self {
            socket,
            peer,
            payload,
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Best effort: a failed send is logged and otherwise ignored.
    pub fn emit(&self) {
        match self.socket.send_to(&self.payload.render(), self.peer) {
            Ok(_) => debug!("Presence sent to {}", self.peer),
            Err(e) => warn!("Presence to {} failed: {}", self.peer, e),
        }
    }
}
