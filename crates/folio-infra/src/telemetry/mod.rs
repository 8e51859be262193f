//! Tracing subscriber initialization

mod init;

pub use init::{init_telemetry, LogFormat, DEFAULT_LOG_FILTER};
