// Inbound pipeline: bytes -> lines -> categories -> samples

use crate::core::classifier::{classify, strip_marker, Category};
use crate::core::extractor::try_extract_sample;
use crate::core::format::StreamSample;
use crate::core::reassembler::FrameReassembler;
use crate::core::signal_store::SignalStore;
use crate::core::telemetry::TelemetrySink;
use chrono::Utc;

/// One complete inbound line after processing, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    Response {
        line: String,
        sample: Option<StreamSample>,
    },
    Plain(String),
}

impl InboundMessage {
    pub fn category(&self) -> Category {
        match self {
            InboundMessage::Response { .. } => Category::Response,
            InboundMessage::Plain(_) => Category::Plain,
        }
    }

    pub fn line(&self) -> &str {
        match self {
            InboundMessage::Response { line, .. } => line,
            InboundMessage::Plain(line) => line,
        }
    }
}

/// Turns one line into a message without touching any sink.
pub fn interpret(line: String) -> InboundMessage {
    match classify(&line) {
        Category::Response => {
            let sample = try_extract_sample(&strip_marker(&line));
            InboundMessage::Response { line, sample }
        }
        Category::Plain => InboundMessage::Plain(line),
    }
}

/// Reassembly state for one input channel.
#[derive(Debug, Default)]
pub struct ProtocolEngine {
    framer: FrameReassembler,
}

impl ProtocolEngine {
    pub fn new() -> Self {
        Self {
            framer: FrameReassembler::new(),
        }
    }

    /// Processes every line completed by `chunk`, strictly in arrival order.
    ///
    /// Stream samples are recorded in `store` and, when a sink is given,
    /// forwarded with the wall-clock receipt time.
    pub fn ingest(
        &mut self,
        chunk: &[u8],
        store: &mut SignalStore,
        sink: Option<&dyn TelemetrySink>,
    ) -> Vec<InboundMessage> {
        let mut messages = Vec::new();

        for line in self.framer.feed(chunk) {
            let message = interpret(line);
            if let InboundMessage::Response {
                sample: Some(sample),
                ..
            } = &message
            {
                if let Some(sink) = sink {
                    sink.forward(&sample.key, sample.value, Utc::now().timestamp_millis());
                }
                store.record(&sample.key, sample.timestamp, sample.value);
            }
            messages.push(message);
        }

        messages
    }

    pub fn pending(&self) -> &[u8] {
        self.framer.pending()
    }

    /// Drops any partial line, e.g. after the channel is reconnected.
    pub fn reset(&mut self) {
        self.framer.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        names: RefCell<Vec<(String, f64)>>,
    }

    impl TelemetrySink for Recorder {
        fn forward(&self, name: &str, value: f64, _timestamp: i64) {
            self.names.borrow_mut().push((name.to_string(), value));
        }
    }

    #[test]
    fn test_stream_line_is_recorded() {
        let mut engine = ProtocolEngine::new();
        let mut store = SignalStore::new();

        let messages = engine.ingest(b"[RESPONSE]s l 3 45.6 12.000\n", &mut store, None);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].category(), Category::Response);
        assert_eq!(messages[0].line(), "[RESPONSE]s l 3 45.6 12.000");

        let series = store.series("l3").unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.samples()[0].timestamp, 12000);
        assert_eq!(series.samples()[0].value, 45.6);
    }

    #[test]
    fn test_malformed_response_is_shown_not_recorded() {
        let mut engine = ProtocolEngine::new();
        let mut store = SignalStore::new();

        let messages = engine.ingest(b"[RESPONSE]s l 3 45.6\n", &mut store, None);
        assert_eq!(
            messages,
            vec![InboundMessage::Response {
                line: "[RESPONSE]s l 3 45.6".to_string(),
                sample: None,
            }]
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_plain_lines_pass_through() {
        let mut engine = ProtocolEngine::new();
        let mut store = SignalStore::new();

        let messages = engine.ingest(b"s l 3 45.6 12.0\n[INFO] hello\n", &mut store, None);
        assert_eq!(
            messages,
            vec![
                InboundMessage::Plain("s l 3 45.6 12.0".to_string()),
                InboundMessage::Plain("[INFO] hello".to_string()),
            ]
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_fragmented_datagrams_keep_order() {
        let mut engine = ProtocolEngine::new();
        let mut store = SignalStore::new();
        let sink = Recorder::default();

        let mut all = Vec::new();
        for chunk in [
            &b"[RESPONSE]s d 1 0.1 1.0\n[RESPO"[..],
            &b"NSE]s d 1 0.2 0.5\nboot"[..],
            &b"ing\n[RESPONSE]s d 1 0.3 2.0\n"[..],
        ] {
            all.extend(engine.ingest(chunk, &mut store, Some(&sink)));
        }

        let lines: Vec<&str> = all.iter().map(InboundMessage::line).collect();
        assert_eq!(
            lines,
            vec![
                "[RESPONSE]s d 1 0.1 1.0",
                "[RESPONSE]s d 1 0.2 0.5",
                "booting",
                "[RESPONSE]s d 1 0.3 2.0",
            ]
        );

        let stamps: Vec<i64> = store
            .series("d1")
            .unwrap()
            .samples()
            .iter()
            .map(|s| s.timestamp)
            .collect();
        assert_eq!(stamps, vec![1000, 500, 2000]);

        let values: Vec<f64> = sink.names.borrow().iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![0.1, 0.2, 0.3]);
        assert!(engine.pending().is_empty());
    }

    #[test]
    fn test_reset_drops_partial_line() {
        let mut engine = ProtocolEngine::new();
        let mut store = SignalStore::new();
        assert!(engine.ingest(b"[RESPONSE]s l 1 1", &mut store, None).is_empty());
        engine.reset();
        let messages = engine.ingest(b" 2\n", &mut store, None);
        assert_eq!(messages, vec![InboundMessage::Plain(" 2".to_string())]);
        assert!(store.is_empty());
    }
}
