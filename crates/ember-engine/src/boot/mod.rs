//! GPU bootstrap handshake.
//!
//! Control flows strictly Instance → Adapter → Device → frame driver; each
//! stage proceeds only once its predecessor resolves. `handshake` is the
//! pure state machine, `negotiate` binds it to wgpu, and `task` provides the
//! two scheduling variants (blocking wait, cooperative per-tick pump).

mod handshake;
mod negotiate;
mod task;

pub use handshake::{
    AdapterOutcome, AdapterStep, DeviceOutcome, DeviceStep, Handshake, NegotiationError, Phase,
    ProtocolViolation, Stage,
};
pub use negotiate::{negotiate, BootOutcome, GpuHandles};
pub use task::{BootReport, BootTask};
