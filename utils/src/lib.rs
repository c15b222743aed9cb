//! Shared utilities for the tessera ledger core.

pub mod logging;
pub mod time;

pub use logging::{init_logging, init_tracing, LogFormat};
pub use time::format_duration;
