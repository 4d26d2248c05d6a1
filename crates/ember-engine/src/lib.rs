//! Ember engine crate.
//!
//! Owns the GPU bootstrap handshake (instance → adapter → device → queue),
//! the bounded frame driver, and the windowed runtime that wires both to the
//! platform event loop.

pub mod boot;
pub mod device;
pub mod frame;
pub mod render;
pub mod window;

pub mod logging;
