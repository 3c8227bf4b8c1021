//! One persisted row of the time series.

use crate::collectors::{ProcessSnapshot, ResourceSample};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Column names, in file order.
pub const COLUMNS: [&str; 8] = [
    "timestamp",
    "port",
    "pid",
    "process",
    "cpu_percent",
    "memory_mb",
    "threads",
    "bandwidth_kbps",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub timestamp: DateTime<Utc>,
    pub port: Option<u16>,
    pub pid: u32,
    pub process: String,
    pub cpu_percent: f64,
    pub memory_mb: f64,
    pub threads: usize,
    /// Reserved; always 0.
    pub bandwidth_kbps: u64,
}

impl MetricRecord {
    pub fn new(
        timestamp: DateTime<Utc>,
        port: Option<u16>,
        proc_: &ProcessSnapshot,
        sample: &ResourceSample,
    ) -> Self {
        Self {
            timestamp,
            port,
            pid: proc_.pid,
            process: sanitize_field(&proc_.name),
            cpu_percent: sample.cpu_percent.max(0.0),
            memory_mb: sample.memory_bytes as f64 / BYTES_PER_MB,
            threads: proc_.threads,
            bandwidth_kbps: 0,
        }
    }

    /// The CSV line for this record, newline-terminated.
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{},{},{:.2},{:.2},{},{}\n",
            format_timestamp(&self.timestamp),
            self.port.map(|p| p.to_string()).unwrap_or_default(),
            self.pid,
            sanitize_field(&self.process),
            self.cpu_percent,
            self.memory_mb,
            self.threads,
            self.bandwidth_kbps,
        )
    }
}

/// ISO-8601 UTC with millisecond precision, e.g. `2024-05-01T10:00:00.000Z`.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Commas and line breaks would break the row boundary.
pub fn sanitize_field(s: &str) -> String {
    s.replace([',', '\n', '\r'], " ")
}
