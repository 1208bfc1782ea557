// Data structures shared by the protocol engine

use serde::Serialize;

/// Opaque signal identifier, e.g. `"l3"` for illuminance of desk 3.
pub type SignalKey = String;

/// One (timestamp, value) point. Timestamps are milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: i64,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Append-only series of samples for one key, kept in arrival order.
///
/// Timestamps are not required to increase: a device that reconnects may
/// restart its clock.
#[derive(Debug, Clone, Default)]
pub struct SignalSeries {
    samples: Vec<Sample>,
}

impl SignalSeries {
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// A sample pulled out of a stream line, before it is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamSample {
    pub key: SignalKey,
    pub value: f64,
    pub timestamp: i64,
}
