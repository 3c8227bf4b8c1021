//! Append-only CSV time series.
//!
//! The header is checked on open; a missing or mismatched header replaces the
//! file with an empty, well-formed one. A store removed while running is
//! recreated on the next append. Appends are serialized by a mutex and
//! synced before returning.

use super::record::{MetricRecord, COLUMNS};
use crate::error::{PortwatchError, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};

/// What `ensure_initialized` found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreInit {
    Created,
    Recreated,
    Existing,
}

pub fn header_line() -> String {
    COLUMNS.join(",")
}

pub struct CsvStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvStore {
    /// Open or create the store at `path`, repairing a bad header.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        };
        store.ensure_initialized()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Idempotent: a correctly headed store is left untouched.
    pub fn ensure_initialized(&self) -> Result<StoreInit> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        if !self.path.exists() {
            self.write_fresh()?;
            info!(path = ?self.path, "store created");
            return Ok(StoreInit::Created);
        }
        if self.header_matches()? {
            return Ok(StoreInit::Existing);
        }
        warn!(path = ?self.path, "store header mismatch, recreating");
        self.write_fresh()?;
        Ok(StoreInit::Recreated)
    }

    /// Append a single record.
    pub fn append(&self, record: &MetricRecord) -> Result<()> {
        self.append_batch(std::slice::from_ref(record)).map(|_| ())
    }

    /// Append all of a cycle's records in one write. Returns rows written.
    pub fn append_batch(&self, records: &[MetricRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        let buf: String = records.iter().map(MetricRecord::to_csv_line).collect();

        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        if !self.path.exists() {
            warn!(path = ?self.path, "store missing, recreating");
            self.write_fresh()?;
        }
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| PortwatchError::store_io(&self.path, e))?;
        file.write_all(buf.as_bytes())
            .and_then(|_| file.flush())
            .and_then(|_| file.sync_data())
            .map_err(|e| PortwatchError::store_io(&self.path, e))?;
        Ok(records.len())
    }

    fn header_matches(&self) -> Result<bool> {
        let file = File::open(&self.path).map_err(|e| PortwatchError::store_io(&self.path, e))?;
        let mut first = String::new();
        BufReader::new(file)
            .read_line(&mut first)
            .map_err(|e| PortwatchError::store_io(&self.path, e))?;
        Ok(first.trim_end() == header_line())
    }

    /// Write a header-only file beside the store and rename it into place, so
    /// concurrent readers see either the old file or the new one.
    fn write_fresh(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| PortwatchError::store_io(dir, e))?;
        }
        let tmp = tmp_path(&self.path);
        let write = || -> std::io::Result<()> {
            let mut f = File::create(&tmp)?;
            f.write_all(header_line().as_bytes())?;
            f.write_all(b"\n")?;
            f.sync_all()?;
            std::fs::rename(&tmp, &self.path)
        };
        write().map_err(|e| PortwatchError::store_io(&self.path, e))
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
