//! Shared utilities for fabkv.

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingError};
