// Wire constants for the luminaire line protocol

use std::time::Duration;

/// Marker carried by every tagged response line.
pub const RESPONSE_MARKER: &str = "[RESPONSE]";

/// Prefix of a streamed sample once the marker is removed.
pub const STREAM_PREFIX: &str = "s ";

// "s <kind> <index> <value> <seconds>"
pub const STREAM_TOKEN_COUNT: usize = 5;

pub const LINE_TERMINATOR: u8 = b'\n';

// Command template placeholders, substituted in this order
pub const PLACEHOLDER_INDEX: &str = "<i>";
pub const PLACEHOLDER_VALUE: &str = "<val>";
pub const PLACEHOLDER_KIND: &str = "<x>";

/// Value an operator field holds when nothing was selected.
pub const EMPTY_SELECTION: &str = "<empty>";

// Raw tagged lines: "<tag>:<name>:<value>"
pub const TAGGED_SEPARATOR: char = ':';
pub const TAGGED_FIELD_COUNT: usize = 3;

pub const TIMESTAMP_FIELD: &str = "timestamp";
pub const PRESENCE_FIELD: &str = "presence";

pub const COMMAND_PRESENCE_PAYLOAD: &[u8] = b"Presence";
pub const BEACON_PERIOD: Duration = Duration::from_secs(1);

pub const CSV_HEADER: &str = "timestamp , sig_val";
pub const CSV_EXTENSION: &str = "csv";

pub const DEFAULT_COMMAND_IP: &str = "127.0.0.1";
pub const DEFAULT_COMMAND_PORT: u16 = 58000;
pub const DEFAULT_FORWARD_IP: &str = "127.0.0.1";
pub const DEFAULT_FORWARD_PORT: u16 = 9870;

// Largest UDP payload; a shorter buffer silently truncates datagrams
pub const RECV_BUF_SIZE: usize = 65_535;
