//! Read side of the time series: range selection, row filtering and the
//! `/logs` HTTP endpoint.

mod range;
mod reader;
mod server;

pub use range::{parse_range, range_start, DEFAULT_RANGE};
pub use reader::{read_since, LogRow};
pub use server::{router, QueryState};
