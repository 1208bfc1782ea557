use std::net::{SocketAddr, UdpSocket as StdUdpSocket};
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use scdtr_link::core::constants::RECV_BUF_SIZE;
use scdtr_link::{BeaconPayload, PresenceBeacon, Result};

use crate::routes::dispatch::Event;

/// UDP session with the node's command port.
///
/// Commands, presence beacons and inbound telemetry all use one local port so
/// the node answers to the address it hears from.
pub struct CommandLink {
    id: u64,
    socket: Arc<StdUdpSocket>,
    server: SocketAddr,
    reader: JoinHandle<()>,
}

impl CommandLink {
    /// Opens a session whose datagrams are tagged with `id` on the queue.
    pub fn connect(id: u64, server: SocketAddr, events: mpsc::Sender<Event>) -> Result<Self> {
        let bind_addr: SocketAddr = if server.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            (std::net::Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = StdUdpSocket::bind(bind_addr)?;
        socket.set_nonblocking(true)?;

        let recv_socket = UdpSocket::from_std(socket.try_clone()?)?;
        let reader = tokio::spawn(read_datagrams(recv_socket, id, events));

        let local = socket.local_addr()?;
        info!("Command link #{} {} -> {}", id, local, server);

        Ok(Self {
            id,
            socket: Arc::new(socket),
            server,
            reader,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Sends one encoded command as a single datagram.
    pub fn send_command(&self, wire: &str) -> Result<()> {
        self.socket.send_to(wire.as_bytes(), self.server)?;
        info!("Sent {:?} to {}", wire, self.server);
        Ok(())
    }

    /// Fixed `Presence` beacon on the command socket.
    pub fn beacon(&self) -> PresenceBeacon {
        PresenceBeacon::new(
            Arc::clone(&self.socket),
            self.server,
            BeaconPayload::command_presence(),
        )
    }
}

impl Drop for CommandLink {
    fn drop(&mut self) {
        self.reader.abort();
        info!("Command link to {} closed", self.server);
    }
}

/// Drains the socket into the dispatch queue, one event per datagram.
async fn read_datagrams(socket: UdpSocket, link: u64, events: mpsc::Sender<Event>) {
    let mut buf = vec![0u8; RECV_BUF_SIZE];
    loop {
        match socket.recv_from(&mut buf).await {
            Ok((size, src)) => {
                debug!("{} bytes from {}", size, src);
                let event = Event::Datagram {
                    link,
                    bytes: buf[..size].to_vec(),
                };
                if events.send(event).await.is_err() {
                    // dispatch loop is gone
                    return;
                }
            }
            Err(e) => {
                // ICMP port-unreachable surfaces here on some platforms
                warn!("Error receiving from command socket: {}", e);
                if e.kind() != std::io::ErrorKind::ConnectionReset
                    && e.kind() != std::io::ErrorKind::ConnectionRefused
                {
                    error!("Command socket reader stopped");
                    return;
                }
            }
        }
    }
}
