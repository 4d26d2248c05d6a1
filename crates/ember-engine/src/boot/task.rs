use std::io;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::device::GpuInit;

use super::negotiate::{negotiate, BootOutcome};

/// Report delivered exactly once by a finished [`BootTask`].
pub enum BootReport {
    /// Negotiation ran to completion; the surface travels back with the
    /// outcome so the runtime can configure it against the new device.
    Resolved {
        instance: wgpu::Instance,
        surface: wgpu::Surface<'static>,
        outcome: BootOutcome,
    },
    /// The worker thread died before reporting.
    WorkerLost,
}

/// An in-flight bootstrap negotiation.
///
/// The negotiation runs on a dedicated worker thread and reports through a
/// one-shot channel, which gives both scheduling variants a single
/// implementation: [`BootTask::wait`] blocks the caller until resolution,
/// [`BootTask::try_take`] is the per-tick pump for an event-driven loop.
pub struct BootTask {
    rx: Receiver<BootReport>,
    taken: bool,
}

impl BootTask {
    /// Starts the negotiation. The surface must be `'static` (window held by
    /// `Arc`) because it crosses into the worker thread and back.
    pub fn spawn(
        instance: wgpu::Instance,
        surface: wgpu::Surface<'static>,
        init: GpuInit,
    ) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel();

        thread::Builder::new().name("ember-boot".to_string()).spawn(move || {
            let outcome = pollster::block_on(negotiate(&instance, &surface, &init));
            // The receiver may already be gone if the runtime shut down early.
            let _ = tx.send(BootReport::Resolved { instance, surface, outcome });
        })?;

        Ok(Self { rx, taken: false })
    }

    /// Non-blocking pump. Returns the report the first time it is available
    /// and `None` on every later call.
    pub fn try_take(&mut self) -> Option<BootReport> {
        if self.taken {
            return None;
        }
        match self.rx.try_recv() {
            Ok(report) => {
                self.taken = true;
                Some(report)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.taken = true;
                Some(BootReport::WorkerLost)
            }
        }
    }

    /// Blocks the calling thread until the negotiation resolves.
    pub fn wait(self) -> BootReport {
        match self.rx.recv() {
            Ok(report) => report,
            Err(_) => BootReport::WorkerLost,
        }
    }

    #[cfg(test)]
    fn from_receiver(rx: Receiver<BootReport>) -> Self {
        Self { rx, taken: false }
    }
}
