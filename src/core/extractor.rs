// Stream line parsing

use crate::core::constants::{STREAM_PREFIX, STREAM_TOKEN_COUNT, TAGGED_FIELD_COUNT, TAGGED_SEPARATOR};
use crate::core::format::StreamSample;
use tracing::debug;

/// Numbers that fail to parse read as zero.
pub fn parse_lenient(token: &str) -> f64 {
    token.trim().parse::<f64>().unwrap_or(0.0)
}

/// Seconds as sent by a node, rounded to whole milliseconds.
pub fn seconds_to_millis(seconds: f64) -> i64 {
    (seconds * 1000.0).round() as i64
}

/// Parses `s <kind> <index> <value> <seconds>` from a line whose response
/// marker has already been removed.
///
/// Any line with the wrong prefix or token count yields `None`.
pub fn try_extract_sample(line: &str) -> Option<StreamSample> {
    if !line.starts_with(STREAM_PREFIX) {
        return None;
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != STREAM_TOKEN_COUNT {
        debug!("Dropping stream line with {} tokens: {:?}", tokens.len(), line);
        return None;
    }

    Some(StreamSample {
        key: format!("{}{}", tokens[1], tokens[2]),
        value: parse_lenient(tokens[3]),
        timestamp: seconds_to_millis(parse_lenient(tokens[4])),
    })
}

/// Splits a `<tag>:<name>:<value>` line into its name and value.
pub fn parse_tagged_value(line: &str) -> Option<(&str, f64)> {
    let fields: Vec<&str> = line.split(TAGGED_SEPARATOR).collect();
    if fields.len() != TAGGED_FIELD_COUNT {
        return None;
    }
    Some((fields[1], parse_lenient(fields[2])))
}
