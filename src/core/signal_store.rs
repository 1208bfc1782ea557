// Per-signal time series and CSV export

use crate::core::constants::{CSV_EXTENSION, CSV_HEADER};
use crate::core::error::{ConsoleError, Result};
use crate::core::format::{Sample, SignalKey, SignalSeries};
use chrono::Local;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Outcome of `SignalStore::flush_all`.
#[derive(Debug, Default)]
pub struct FlushReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(SignalKey, ConsoleError)>,
}

impl FlushReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Owns every series recorded during a session.
#[derive(Debug, Default)]
pub struct SignalStore {
    series: BTreeMap<SignalKey, SignalSeries>,
}

impl SignalStore {
    pub fn new() -> Self {
        Self {
            series: BTreeMap::new(),
        }
    }

    /// Appends to the series for `key`, creating it on first use.
    pub fn record(&mut self, key: &str, timestamp: i64, value: f64) {
        let sample = Sample::new(timestamp, value);
        match self.series.get_mut(key) {
            Some(series) => series.push(sample),
            None => {
                let mut series = SignalSeries::new();
                series.push(sample);
                self.series.insert(key.to_string(), series);
            }
        }
    }

    pub fn series(&self, key: &str) -> Option<&SignalSeries> {
        self.series.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SignalSeries)> {
        self.series.iter().map(|(k, s)| (k.as_str(), s))
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn total_samples(&self) -> usize {
        self.series.values().map(SignalSeries::len).sum()
    }

    /// Writes one `<date_stamp><key>.csv` per non-empty series into `dir`.
    ///
    /// A key that cannot be written is logged and skipped; the others are
    /// still written.
    pub fn flush_all(&self, dir: &Path, date_stamp: &str) -> FlushReport {
        let mut report = FlushReport::default();

        for (key, series) in &self.series {
            if series.is_empty() {
                continue;
            }

            let path = dir.join(format!("{}{}.{}", date_stamp, key, CSV_EXTENSION));
            match write_series(&path, series) {
                Ok(()) => {
                    info!("Wrote {} samples of {} to {}", series.len(), key, path.display());
                    report.written.push(path);
                }
                Err(e) => {
                    error!("Error creating file for {}: {}", key, e);
                    report.failed.push((key.clone(), e));
                }
            }
        }

        report
    }
}

fn write_series(path: &Path, series: &SignalSeries) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{}", CSV_HEADER)?;
    for sample in series.samples() {
        writeln!(out, "{},{}", sample.timestamp, sample.value)?;
    }
    out.flush()?;
    Ok(())
}

/// Date prefix used for the CSV files of the current session.
///
/// Produces `YYYY-MM-DD_`; the trailing underscore separates the date from
/// the signal key, so `l1` is written as `2024-05-01_l1.csv`.
pub fn session_date_stamp() -> String {
    Local::now().format("%Y-%m-%d_").to_string()
}
