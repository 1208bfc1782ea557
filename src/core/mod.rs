pub mod classifier;
pub mod command;
pub mod constants;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod format;
pub mod presence;
pub mod reassembler;
pub mod signal_store;
pub mod telemetry;
