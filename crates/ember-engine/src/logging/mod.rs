//! Logging setup.
//!
//! Centralizes logger initialization on top of the standard `log` facade.
//! All diagnostics (negotiation messages, observer reports, loop statistics)
//! go through `log`, never straight to stdout.

mod init;

pub use init::{init_logging, LoggingConfig};
