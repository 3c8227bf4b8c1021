//! Durable, append-only time series of per-process samples.

mod csv_log;
mod record;

pub use csv_log::{header_line, CsvStore, StoreInit};
pub use record::{format_timestamp, sanitize_field, MetricRecord, COLUMNS};
