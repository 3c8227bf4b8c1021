//! Filtered reads of the CSV store. Tolerates a concurrent appender: a
//! trailing line without its newline is not yet a row.

use crate::error::{PortwatchError, Result};
use crate::storage::header_line;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A stored row as returned to query clients. Values are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRow {
    pub timestamp: String,
    pub port: String,
    pub pid: String,
    pub process: String,
    pub cpu_percent: String,
    pub memory_mb: String,
    pub threads: String,
    pub bandwidth_kbps: String,
}

impl LogRow {
    fn parse(line: &str) -> Option<(DateTime<Utc>, Self)> {
        let mut f = line.split(',');
        let row = LogRow {
            timestamp: f.next()?.to_string(),
            port: f.next()?.to_string(),
            pid: f.next()?.to_string(),
            process: f.next()?.to_string(),
            cpu_percent: f.next()?.to_string(),
            memory_mb: f.next()?.to_string(),
            threads: f.next()?.to_string(),
            bandwidth_kbps: f.next()?.to_string(),
        };
        if f.next().is_some() {
            return None;
        }
        let ts = DateTime::parse_from_rfc3339(&row.timestamp)
            .ok()?
            .with_timezone(&Utc);
        Some((ts, row))
    }
}

/// Every row with `timestamp >= since`, in file order.
pub fn read_since(path: &Path, since: DateTime<Utc>) -> Result<Vec<LogRow>> {
    let body = std::fs::read_to_string(path).map_err(|e| PortwatchError::store_io(path, e))?;
    let mut lines = body.split_inclusive('\n');

    let header = lines.next().unwrap_or_default();
    if header.trim_end() != header_line() {
        return Err(PortwatchError::StoreHeader {
            path: path.to_path_buf(),
        });
    }

    let rows = lines
        .filter(|l| l.ends_with('\n'))
        .filter_map(|l| LogRow::parse(l.trim_end()))
        .filter(|(ts, _)| *ts >= since)
        .map(|(_, row)| row)
        .collect();
    Ok(rows)
}
