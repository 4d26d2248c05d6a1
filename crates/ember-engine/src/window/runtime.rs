use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::boot::{BootOutcome, BootReport, BootTask};
use crate::device::{DeviceHealth, Gpu, GpuInit, SurfaceErrorAction};
use crate::frame::{FrameClock, FrameDriver, PresentOutcome, Tick};
use crate::render::TriangleScene;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Number of frames to present before the loop finishes.
    pub frame_cap: u32,
    pub boot: BootStrategy,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "ember".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            frame_cap: FrameDriver::DEFAULT_CAP,
            boot: BootStrategy::Cooperative,
        }
    }
}

/// How GPU negotiation is scheduled relative to the event loop.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BootStrategy {
    /// Block at startup until the negotiation resolves, then render.
    Blocking,
    /// Pump the in-flight negotiation each pass of the event loop; the
    /// frame driver is only installed once it resolves.
    Cooperative,
}

/// How a run ended (the non-error cases).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RunOutcome {
    /// Frame budget reached, or the window was closed.
    Completed,
    /// No usable GPU backend on this machine. A clean shutdown, not an
    /// error: callers must not turn this into a failing exit code.
    NoBackend,
}

/// Maps a finished run to a process exit code: any clean outcome (including
/// `NoBackend`) is 0, errors are 1.
pub fn process_exit_code(result: &Result<RunOutcome>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Runs the windowed demo loop to completion.
    pub fn run(config: RuntimeConfig, gpu_init: GpuInit) -> Result<RunOutcome> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        if let Some(err) = state.failure.take() {
            return Err(err);
        }
        Ok(state.outcome.unwrap_or(RunOutcome::Completed))
    }
}

enum Stage {
    /// Before `resumed`.
    Idle,
    /// Negotiation in flight (cooperative strategy).
    Booting { task: BootTask },
    /// Device resolved; the frame driver is installed.
    Rendering {
        gpu: Gpu,
        scene: TriangleScene,
        driver: FrameDriver,
        clock: FrameClock,
    },
    Finished,
}

struct AppState {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    window: Option<Arc<Window>>,
    stage: Stage,
    outcome: Option<RunOutcome>,
    failure: Option<anyhow::Error>,
}

impl AppState {
    fn new(config: RuntimeConfig, gpu_init: GpuInit) -> Self {
        Self {
            config,
            gpu_init,
            window: None,
            stage: Stage::Idle,
            outcome: None,
            failure: None,
        }
    }

    fn finish(&mut self, event_loop: &ActiveEventLoop, outcome: RunOutcome) {
        self.outcome.get_or_insert(outcome);
        self.stage = Stage::Finished;
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        if self.failure.is_none() {
            self.failure = Some(err);
        }
        self.stage = Stage::Finished;
        event_loop.exit();
    }

    /// Creates the window, instance, and surface, and starts the boot task.
    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        // All backends so wgpu can pick the optimal platform backend.
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create wgpu surface")?;

        self.window = Some(window.clone());

        let task = BootTask::spawn(instance, surface, self.gpu_init.clone())
            .context("failed to spawn bootstrap worker")?;

        match self.config.boot {
            BootStrategy::Blocking => {
                // Synchronous variant: the whole handshake resolves before
                // the first event-loop pass.
                let report = task.wait();
                self.handle_report(event_loop, report);
            }
            BootStrategy::Cooperative => {
                self.stage = Stage::Booting { task };
            }
        }

        window.request_redraw();
        Ok(())
    }

    /// Delivers a pending boot report, if any, to `handle_report`.
    fn pump(&mut self, event_loop: &ActiveEventLoop) {
        let report = match &mut self.stage {
            Stage::Booting { task } => task.try_take(),
            _ => None,
        };
        if let Some(report) = report {
            self.handle_report(event_loop, report);
        }
    }

    fn handle_report(&mut self, event_loop: &ActiveEventLoop, report: BootReport) {
        let BootReport::Resolved { instance, surface, outcome } = report else {
            self.fail(
                event_loop,
                anyhow!("bootstrap worker thread exited without reporting"),
            );
            return;
        };

        match outcome {
            BootOutcome::Unavailable { message } => {
                log::info!("no usable GPU backend ({message}); exiting cleanly");
                self.finish(event_loop, RunOutcome::NoBackend);
            }
            BootOutcome::Failed(err) => {
                self.fail(
                    event_loop,
                    anyhow::Error::new(err).context("GPU negotiation failed"),
                );
            }
            BootOutcome::Ready(handles) => {
                let size = match &self.window {
                    Some(window) => window.inner_size(),
                    None => return,
                };

                match Gpu::assemble(instance, surface, handles, size, &self.gpu_init) {
                    Ok(gpu) => {
                        // Pipeline and depth resources are created exactly
                        // once, here, after device resolution.
                        let scene = TriangleScene::new(gpu.device(), gpu.surface_format(), size);
                        let cap = self.config.frame_cap;
                        log::info!("GPU ready; rendering {cap} frames");
                        self.stage = Stage::Rendering {
                            gpu,
                            scene,
                            driver: FrameDriver::new(cap),
                            clock: FrameClock::new(),
                        };
                        if let Some(window) = &self.window {
                            window.request_redraw();
                        }
                    }
                    Err(err) => self.fail(event_loop, err),
                }
            }
        }
    }

    /// Drives one frame-driver tick.
    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.pump(event_loop);

        // Observer-reported conditions surface here, once per tick, before
        // any further GPU work.
        let health = match &self.stage {
            Stage::Rendering { gpu, .. } => gpu.health(),
            _ => return,
        };
        match health {
            DeviceHealth::Ok => {}
            DeviceHealth::Uncaptured(message) => {
                self.fail(event_loop, anyhow!("uncaptured device error: {message}"));
                return;
            }
            DeviceHealth::Lost(message) => {
                self.fail(event_loop, anyhow!("device lost: {message}"));
                return;
            }
        }

        let window = self.window.clone();
        let (tick, stats) = {
            let Stage::Rendering { gpu, scene, driver, clock } = &mut self.stage else {
                return;
            };

            let tick = driver.tick(|stamp| {
                let mut frame = match gpu.begin_frame() {
                    Ok(frame) => frame,
                    Err(err) => {
                        let message = format!("surface error: {err}");
                        return match gpu.handle_surface_error(err) {
                            SurfaceErrorAction::Fatal => PresentOutcome::Fatal(message),
                            SurfaceErrorAction::Reconfigure => {
                                log::debug!("surface reconfigured; skipping frame");
                                PresentOutcome::Skipped
                            }
                            SurfaceErrorAction::SkipFrame => PresentOutcome::Skipped,
                        };
                    }
                };

                scene.encode(&mut frame, stamp);

                if let Some(window) = &window {
                    window.pre_present_notify();
                }
                gpu.submit(frame);
                PresentOutcome::Presented
            });

            if matches!(tick, Tick::Rendered { .. }) {
                clock.tick();
            }

            (tick, (driver.presented(), clock.elapsed()))
        };

        match tick {
            Tick::Rendered { index } => log::trace!("frame {index} submitted"),
            Tick::Skipped | Tick::Idle => {}
            Tick::Finished => {
                let (frames, elapsed) = stats;
                log::info!(
                    "frame budget reached: {frames} frames in {:.2}s",
                    elapsed.as_secs_f64()
                );
                self.finish(event_loop, RunOutcome::Completed);
            }
            Tick::Fatal(message) => self.fail(event_loop, anyhow!(message)),
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !matches!(self.stage, Stage::Idle) {
            return;
        }
        if let Err(err) = self.start(event_loop) {
            log::error!("initialization failed: {err:#}");
            self.fail(event_loop, err);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.pump(event_loop);

        match &self.stage {
            Stage::Booting { .. } => {
                // Keep the loop spinning so the boot task is pumped even
                // without window events.
                event_loop.set_control_flow(ControlFlow::Poll);
            }
            Stage::Rendering { .. } => {
                event_loop.set_control_flow(ControlFlow::Wait);
                // Continuous redraw until the frame budget is exhausted.
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            Stage::Idle | Stage::Finished => {}
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };
        if window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("window closed");
                self.finish(event_loop, RunOutcome::Completed);
            }

            WindowEvent::Resized(new_size) => {
                if let Stage::Rendering { gpu, scene, .. } = &mut self.stage {
                    gpu.resize(new_size);
                    scene.resize(gpu.device(), new_size);
                }
                window.request_redraw();
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = window.inner_size();
                if let Stage::Rendering { gpu, scene, .. } = &mut self.stage {
                    gpu.resize(new_size);
                    scene.resize(gpu.device(), new_size);
                }
                window.request_redraw();
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── exit-code mapping ─────────────────────────────────────────────────

    #[test]
    fn completed_run_exits_zero() {
        assert_eq!(process_exit_code(&Ok(RunOutcome::Completed)), 0);
    }

    #[test]
    fn unavailable_backend_exits_zero_never_one() {
        assert_eq!(process_exit_code(&Ok(RunOutcome::NoBackend)), 0);
    }

    #[test]
    fn failures_exit_one() {
        assert_eq!(process_exit_code(&Err(anyhow!("negotiation failed"))), 1);
    }

    // ── configuration ─────────────────────────────────────────────────────

    #[test]
    fn default_config_matches_the_demo_loop() {
        let config = RuntimeConfig::default();
        assert_eq!(config.frame_cap, 60);
        assert_eq!(config.boot, BootStrategy::Cooperative);
    }
}
