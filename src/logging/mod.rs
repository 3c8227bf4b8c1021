//! Structured logging setup shared by the agent and the query server.

mod format;

pub use format::StructuredLogger;
