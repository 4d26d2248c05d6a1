//! Bounded frame loop.
//!
//! `FrameDriver` is the render-loop state machine (monotonic counter, frame
//! cap, `Done` signalled exactly once); `FrameClock` provides the timing
//! snapshots used for loop statistics. Both are pure and testable without a
//! GPU.

mod clock;
mod driver;

pub use clock::{FrameClock, FrameTime};
pub use driver::{DriveState, FrameDriver, FrameStamp, PresentOutcome, Tick};
