//! LeadFlow Telemetry
//!
//! Structured logging for the server and the migration CLI.

pub mod tracer;

pub use tracer::{init_tracing, LogFormat, TelemetryConfig};
