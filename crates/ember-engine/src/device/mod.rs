//! GPU device + surface management.
//!
//! This module owns the negotiated wgpu handles after boot:
//! - binds Instance/Adapter/Device/Queue to a configured surface
//! - acquires frames and provides encoders/views for rendering
//! - tracks device health reported by the installed observers

mod error;
mod frame;
mod gpu;
mod init;
mod surface;
mod watch;

pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::GpuInit;
pub use watch::{DeviceHealth, DeviceWatch};
