use std::path::Path;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use scdtr_link::core::constants::BEACON_PERIOD;
use scdtr_link::{
    encode, session_date_stamp, CommandCatalog, FlushReport, InboundMessage, PresenceBeacon,
    ProtocolEngine, SignalStore, TelemetryForwarder, TelemetrySink,
};

use crate::client::link::CommandLink;
use crate::models::console_model::ConsoleConfig;
use crate::routes::dispatch::Event;
use crate::routes::operator_routes::{self, OperatorAction, HELP};

/// A beacon and the timer that drives it. Dropping it stops both.
pub struct Armed {
    beacon: PresenceBeacon,
    ticker: Interval,
}

impl Armed {
    fn new(beacon: PresenceBeacon) -> Self {
        let mut ticker = interval_at(Instant::now() + BEACON_PERIOD, BEACON_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { beacon, ticker }
    }

    pub async fn tick(&mut self) {
        self.ticker.tick().await;
    }

    pub fn emit(&self) {
        self.beacon.emit();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Everything the dispatch loop mutates. Only that loop touches it.
pub struct AppState {
    config: &'static ConsoleConfig,
    events: mpsc::Sender<Event>,
    store: SignalStore,
    engine: ProtocolEngine,
    catalog: CommandCatalog,
    link: Option<CommandLink>,
    // id handed to the next link; datagrams tagged with any other id are stale
    next_link_id: u64,
    forwarder: Option<TelemetryForwarder>,
    pub link_beacon: Option<Armed>,
    pub forward_beacon: Option<Armed>,
    show_messages: bool,
}

impl AppState {
    pub fn new(config: &'static ConsoleConfig, events: mpsc::Sender<Event>) -> Self {
        Self {
            config,
            events,
            store: SignalStore::new(),
            engine: ProtocolEngine::new(),
            catalog: CommandCatalog::standard(),
            link: None,
            next_link_id: 1,
            forwarder: None,
            link_beacon: None,
            forward_beacon: None,
            show_messages: config.show_messages,
        }
    }

    /// Feeds one datagram read by link `link` and prints what it produced.
    ///
    /// Datagrams from a link that has since been closed or replaced are still
    /// queued behind it; they are dropped so they never reach the new session.
    /// Returns the lines that were printed.
    pub fn handle_datagram(&mut self, link: u64, bytes: &[u8]) -> Vec<String> {
        match &self.link {
            Some(current) if current.id() == link => {}
            _ => {
                debug!("Dropped {} byte(s) from closed link #{}", bytes.len(), link);
                return Vec::new();
            }
        }

        let sink = self.forwarder.as_ref().map(|f| f as &dyn TelemetrySink);
        let messages = self.engine.ingest(bytes, &mut self.store, sink);
        let shown: Vec<String> = messages
            .into_iter()
            .filter_map(|message| match message {
                InboundMessage::Response { line, .. } => Some(format!("<< {}", line)),
                InboundMessage::Plain(line) => self.show_messages.then_some(line),
            })
            .collect();
        for line in &shown {
            println!("{}", line);
        }
        shown
    }

    pub fn handle_operator(&mut self, line: &str) -> Flow {
        let action = match operator_routes::parse(line) {
            Ok(Some(action)) => action,
            Ok(None) => return Flow::Continue,
            Err(e) => {
                warn!("{}", e);
                return Flow::Continue;
            }
        };

        match action {
            OperatorAction::Help => println!("{}", HELP),
            OperatorAction::Catalog => self.print_catalog(),
            OperatorAction::Send {
                template,
                luminaire,
                extra,
            } => self.send(template, &luminaire, &extra),
            OperatorAction::Connect => self.connect(),
            OperatorAction::Disconnect => self.disconnect(),
            OperatorAction::Forward(on) => self.set_forwarding(on),
            OperatorAction::Messages(on) => self.show_messages = on,
            OperatorAction::Signals => self.print_signals(),
            OperatorAction::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    fn print_catalog(&self) {
        for (n, (template, description)) in self.catalog.iter().enumerate() {
            println!("{:>3}  {:<12} {}", n, template, description);
        }
    }

    fn print_signals(&self) {
        if self.store.is_empty() {
            println!("no signals recorded");
            return;
        }
        for (key, series) in self.store.iter() {
            match series.last() {
                Some(last) => println!(
                    "{:<6} {:>7} samples, last {} @ {} ms",
                    key,
                    series.len(),
                    last.value,
                    last.timestamp
                ),
                None => println!("{:<6} empty", key),
            }
        }
    }

    fn send(&self, template: usize, luminaire: &str, extra: &str) {
        let template = match self.catalog.get(template) {
            Ok(t) => t,
            Err(e) => {
                warn!("{}", e);
                return;
            }
        };
        let wire = match encode(template, luminaire, extra) {
            Ok(wire) => wire,
            Err(e) => {
                warn!("{}", e);
                return;
            }
        };
        match &self.link {
            Some(link) => {
                if let Err(e) = link.send_command(&wire) {
                    error!("Command send failed: {}", e);
                }
            }
            None => warn!("Not connected, 'connect' first"),
        }
    }

    pub fn connect(&mut self) {
        // Reconnecting replaces the previous session.
        self.disconnect();

        let server = match self.config.command.socket_addr() {
            Ok(addr) => addr,
            Err(e) => {
                error!("{}", e);
                return;
            }
        };
        let id = self.next_link_id;
        self.next_link_id += 1;
        match CommandLink::connect(id, server, self.events.clone()) {
            Ok(link) => {
                // Nothing buffered from an earlier session belongs to this one.
                self.engine.reset();
                self.link_beacon = Some(Armed::new(link.beacon()));
                self.link = Some(link);
            }
            Err(e) => error!("Connect to {} failed: {}", server, e),
        }
    }

    pub fn disconnect(&mut self) {
        self.link_beacon = None;
        self.link = None;
    }

    pub fn set_forwarding(&mut self, on: bool) {
        self.forward_beacon = None;
        self.forwarder = None;
        if !on {
            info!("Forwarding off");
            return;
        }

        let peer = match self.config.forwarding.socket_addr() {
            Ok(addr) => addr,
            Err(e) => {
                error!("{}", e);
                return;
            }
        };
        match TelemetryForwarder::new(peer) {
            Ok(forwarder) => {
                info!("Forwarding samples to {}", forwarder.peer());
                self.forward_beacon = Some(Armed::new(forwarder.beacon()));
                self.forwarder = Some(forwarder);
            }
            Err(e) => error!("Forwarding to {} unavailable: {}", peer, e),
        }
    }

    /// Stops all outbound traffic and writes every series to disk.
    pub fn shutdown(&mut self) -> FlushReport {
        self.disconnect();
        self.set_forwarding(false);

        let report = self
            .store
            .flush_all(Path::new(&self.config.csv_dir), &session_date_stamp());
        info!(
            "Flushed {} signal(s), {} failed",
            report.written.len(),
            report.failed.len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::net::UdpSocket as StdUdpSocket;
    use std::time::Duration;

    use tempfile::TempDir;
    use tokio::time::timeout;

    use crate::models::console_model::Endpoint;
    use crate::routes::dispatch::next_tick;

    const STREAM_LINE: &[u8] = b"[RESPONSE]s l 1 10.0 1.0\n";

    struct Bench {
        state: AppState,
        node: StdUdpSocket,
        _sink: StdUdpSocket,
        _events: mpsc::Receiver<Event>,
        csv_dir: TempDir,
    }

    fn bench() -> Bench {
        let node = StdUdpSocket::bind("127.0.0.1:0").unwrap();
        node.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let sink = StdUdpSocket::bind("127.0.0.1:0").unwrap();
        let csv_dir = TempDir::new().unwrap();

        let config: &'static ConsoleConfig = Box::leak(Box::new(ConsoleConfig {
            command: Endpoint::new("127.0.0.1", node.local_addr().unwrap().port()),
            forwarding: Endpoint::new("127.0.0.1", sink.local_addr().unwrap().port()),
            csv_dir: csv_dir.path().to_string_lossy().into_owned(),
            ..ConsoleConfig::default()
        }));
        let (tx, rx) = mpsc::channel(16);

        Bench {
            state: AppState::new(config, tx),
            node,
            _sink: sink,
            _events: rx,
            csv_dir,
        }
    }

    fn link_id(state: &AppState) -> u64 {
        state.link.as_ref().map(CommandLink::id).unwrap()
    }

    #[tokio::test]
    async fn test_reconnect_drops_stale_partial_line() {
        let mut b = bench();
        b.state.connect();
        let old = link_id(&b.state);

        // Partial line read by the old link before the reconnect.
        b.state.handle_datagram(old, b"[INFO] partial tail no newline");
        b.state.connect();
        let new = link_id(&b.state);
        assert_ne!(old, new);

        // More of the old session still queued behind the reconnect.
        assert!(b.state.handle_datagram(old, b" more stale bytes").is_empty());

        let shown = b.state.handle_datagram(new, STREAM_LINE);
        assert_eq!(shown, vec!["<< [RESPONSE]s l 1 10.0 1.0".to_string()]);

        let last = b.state.store.series("l1").and_then(|s| s.last()).copied();
        assert_eq!(last.map(|s| (s.timestamp, s.value)), Some((1000, 10.0)));
    }

    #[tokio::test]
    async fn test_datagrams_dropped_while_disconnected() {
        let mut b = bench();
        assert!(b.state.handle_datagram(0, STREAM_LINE).is_empty());

        b.state.connect();
        let id = link_id(&b.state);
        b.state.disconnect();

        assert!(b.state.handle_datagram(id, STREAM_LINE).is_empty());
        assert!(b.state.store.is_empty());
        assert!(b.state.engine.pending().is_empty());
    }

    #[tokio::test]
    async fn test_messages_off_mutes_plain_lines_only() {
        let mut b = bench();
        b.state.connect();
        let id = link_id(&b.state);

        let shown = b.state.handle_datagram(id, b"desk 1 ready\n");
        assert_eq!(shown, vec!["desk 1 ready".to_string()]);

        assert_eq!(b.state.handle_operator("messages off"), Flow::Continue);
        let shown = b
            .state
            .handle_datagram(id, b"desk 2 ready\n[RESPONSE]s l 1 10.0 1.0\n");
        assert_eq!(shown, vec!["<< [RESPONSE]s l 1 10.0 1.0".to_string()]);

        // Muted lines are still consumed, not buffered.
        assert!(b.state.engine.pending().is_empty());
        assert_eq!(b.state.store.total_samples(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_writes_csv_to_configured_dir() {
        let mut b = bench();
        b.state.connect();
        b.state.set_forwarding(true);
        let id = link_id(&b.state);
        b.state
            .handle_datagram(id, b"[RESPONSE]s l 1 10.0 1.0\n[RESPONSE]s d 2 0.5 1.5\n");

        let report = b.state.shutdown();
        assert!(report.is_complete());
        assert_eq!(report.written.len(), 2);
        assert!(b.state.link.is_none());
        assert!(b.state.forwarder.is_none());
        assert!(b.state.link_beacon.is_none());
        assert!(b.state.forward_beacon.is_none());

        let stamp = session_date_stamp();
        let l1 = b.csv_dir.path().join(format!("{}l1.csv", stamp));
        let d2 = b.csv_dir.path().join(format!("{}d2.csv", stamp));
        assert_eq!(
            fs::read_to_string(l1).unwrap(),
            "timestamp , sig_val\n1000,10\n"
        );
        assert_eq!(
            fs::read_to_string(d2).unwrap(),
            "timestamp , sig_val\n1500,0.5\n"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_link_beacon_stops_after_disconnect() {
        let mut b = bench();
        b.state.handle_operator("connect");

        timeout(Duration::from_secs(2), next_tick(&mut b.state.link_beacon))
            .await
            .unwrap();
        b.state.link_beacon.as_ref().unwrap().emit();

        let mut buf = [0u8; 64];
        let (n, _) = b.node.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"Presence");

        b.state.handle_operator("disconnect");
        assert!(b.state.link_beacon.is_none());
        assert!(
            timeout(Duration::from_secs(10), next_tick(&mut b.state.link_beacon))
                .await
                .is_err()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_forward_beacon_stops_after_forward_off() {
        let mut b = bench();
        b.state.handle_operator("forward on");
        assert!(b.state.forwarder.is_some());

        timeout(Duration::from_secs(2), next_tick(&mut b.state.forward_beacon))
            .await
            .unwrap();

        b.state.handle_operator("forward off");
        assert!(b.state.forwarder.is_none());
        assert!(b.state.forward_beacon.is_none());
        assert!(
            timeout(Duration::from_secs(10), next_tick(&mut b.state.forward_beacon))
                .await
                .is_err()
        );
    }
}
