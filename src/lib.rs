//! portwatch — samples processes that own listening ports and records their
//! CPU, memory and thread count to an append-only CSV time series.
//!
//! Modular structure:
//! - [`collectors`] — Listening sockets, process inventory, per-process samples
//! - [`filter`] — Keyword importance filter
//! - [`cycle`] — One discovery → filter → sample → persist pass
//! - [`storage`] — Append-only CSV store
//! - [`scheduler`] — Fixed-interval driver with overlap guard
//! - [`query`] — Range-filtered reads and the `/logs` endpoint
//! - [`logging`] — Structured JSON logging

pub mod collectors;
pub mod config;
pub mod cycle;
pub mod error;
pub mod filter;
pub mod logging;
pub mod query;
pub mod scheduler;
pub mod storage;

pub use collectors::{ProcessInventory, ResourceSampler, SocketResolver};
pub use config::AgentConfig;
pub use cycle::{CollectionCycle, CycleReport};
pub use error::{PortwatchError, Result, SampleError};
pub use filter::ImportanceFilter;
pub use logging::StructuredLogger;
pub use scheduler::Scheduler;
pub use storage::{CsvStore, MetricRecord};
