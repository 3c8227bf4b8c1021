//! Error types for portwatch.
//!
//! Per-process sampling failures are their own type so the cycle can skip a
//! process without touching the crate-wide error path.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for portwatch operations.
pub type Result<T> = std::result::Result<T, PortwatchError>;

#[derive(Error, Debug)]
pub enum PortwatchError {
    #[error("Process table unavailable: {reason}")]
    Platform { reason: String },

    #[error("Store I/O error at {path:?}: {source}")]
    StoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store header mismatch at {path:?}")]
    StoreHeader { path: PathBuf },

    #[error("Invalid config at {path:?}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PortwatchError {
    pub fn store_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StoreIo {
            path: path.into(),
            source,
        }
    }
}

/// Why a single process could not be sampled this tick.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleError {
    #[error("process {pid} not found")]
    NotFound { pid: u32 },

    #[error("permission denied for process {pid}")]
    PermissionDenied { pid: u32 },
}

impl SampleError {
    pub fn pid(&self) -> u32 {
        match self {
            SampleError::NotFound { pid } | SampleError::PermissionDenied { pid } => *pid,
        }
    }
}
