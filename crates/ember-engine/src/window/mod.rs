//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the single demo window, and wires them to
//! the boot task and the frame driver.

mod runtime;

pub use runtime::{process_exit_code, BootStrategy, Runtime, RuntimeConfig, RunOutcome};
