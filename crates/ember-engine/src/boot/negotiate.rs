use crate::device::{DeviceWatch, GpuInit};

use super::handshake::{
    AdapterOutcome, AdapterStep, DeviceOutcome, DeviceStep, Handshake, NegotiationError,
};

/// Handles produced by a successful negotiation.
///
/// The queue is derived from the device synchronously; no further asynchrony
/// exists past this point.
pub struct GpuHandles {
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub watch: DeviceWatch,
}

/// Final result of the two-stage negotiation.
pub enum BootOutcome {
    Ready(GpuHandles),
    /// No usable backend; the program should terminate cleanly (exit 0).
    Unavailable { message: String },
    Failed(NegotiationError),
}

/// Runs the adapter and device stages against wgpu, in order, driving the
/// [`Handshake`] machine so ordering and exactly-once delivery hold even if
/// this function is refactored.
///
/// Adapter/device acquisition is asynchronous under wgpu; the caller chooses
/// how to schedule this future (see `boot::task`).
pub async fn negotiate(
    instance: &wgpu::Instance,
    surface: &wgpu::Surface<'_>,
    init: &GpuInit,
) -> BootOutcome {
    let mut handshake = Handshake::new();

    log::debug!("requesting adapter");
    let requested = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: init.power_preference,
            compatible_surface: Some(surface),
            force_fallback_adapter: false,
        })
        .await;

    // wgpu reports a single error when no suitable adapter exists; that is
    // the handshake's clean "unavailable" exit, not a failure.
    let outcome = match requested {
        Ok(adapter) => AdapterOutcome::Ready(adapter),
        Err(err) => AdapterOutcome::Unavailable { message: err.to_string() },
    };

    let step = match handshake.adapter_resolved(outcome) {
        Ok(step) => step,
        Err(violation) => return BootOutcome::Failed(violation.into()),
    };

    let adapter = match step {
        AdapterStep::RequestDevice(adapter) => adapter,
        AdapterStep::ExitCleanly { message } => {
            log::info!("no usable GPU backend: {message}");
            return BootOutcome::Unavailable { message };
        }
        AdapterStep::Abort(err) => {
            log::error!("{err}");
            return BootOutcome::Failed(err);
        }
    };

    let info = adapter.get_info();
    log::info!("adapter: {} ({:?} / {:?})", info.name, info.backend, info.device_type);

    log::debug!("requesting device");
    let requested = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("ember device"),
            required_features: init.required_features,
            required_limits: init.required_limits.clone(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        })
        .await;

    let outcome = match requested {
        Ok(pair) => DeviceOutcome::Ready(pair),
        Err(err) => DeviceOutcome::Failed { message: err.to_string() },
    };

    let step = match handshake.device_resolved(outcome) {
        Ok(step) => step,
        Err(violation) => return BootOutcome::Failed(violation.into()),
    };

    let (device, queue) = match step {
        DeviceStep::StartRendering(pair) => pair,
        DeviceStep::Abort(err) => {
            log::error!("{err}");
            return BootOutcome::Failed(err);
        }
    };

    let watch = DeviceWatch::new();
    install_observers(&device, &watch);

    log::debug!("device and queue ready");
    BootOutcome::Ready(GpuHandles { adapter, device, queue, watch })
}

/// Installs the two permanent observers the handshake contract requires.
///
/// Both record into the shared [`DeviceWatch`]; the runtime reads it each
/// tick and propagates any condition to top-level shutdown.
fn install_observers(device: &wgpu::Device, watch: &DeviceWatch) {
    let errors = watch.clone();
    device.on_uncaptured_error(std::sync::Arc::new(move |error: wgpu::Error| {
        log::error!("uncaptured device error: {error}");
        errors.record_uncaptured(error.to_string());
    }));

    let loss = watch.clone();
    device.set_device_lost_callback(move |reason, message| {
        log::error!("device lost ({reason:?}): {message}");
        loss.record_loss(format!("{reason:?}: {message}"));
    });
}
