// SCDTR console link
// Line protocol engine for the luminaire testbed

pub mod core;

// Re-export main types
pub use crate::core::classifier::{classify, Category};
pub use crate::core::command::{encode, CommandCatalog};
pub use crate::core::engine::{InboundMessage, ProtocolEngine};
pub use crate::core::error::{ConsoleError, Result};
pub use crate::core::extractor::try_extract_sample;
pub use crate::core::format::{Sample, SignalKey, SignalSeries, StreamSample};
pub use crate::core::presence::{BeaconPayload, PresenceBeacon};
pub use crate::core::reassembler::FrameReassembler;
pub use crate::core::signal_store::{session_date_stamp, FlushReport, SignalStore};
pub use crate::core::telemetry::{envelope, TelemetryForwarder, TelemetrySink};

#[cfg(test)]
mod tests {
    #[test]
    fn test_constants() {
        use crate::core::constants::*;
        assert_eq!(RESPONSE_MARKER, "[RESPONSE]");
        assert_eq!(STREAM_PREFIX, "s ");
        assert_eq!(COMMAND_PRESENCE_PAYLOAD, b"Presence");
    }
}
