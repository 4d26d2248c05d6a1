/// Identity of the frame being presented.
///
/// `index` is 1-based; the cap travels along so presenters can derive
/// frame-dependent values (the demo's clear color) without extra state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FrameStamp {
    pub index: u32,
    pub cap: u32,
}

/// What the presenter did with one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum PresentOutcome {
    /// One unit of GPU work was recorded and submitted.
    Presented,
    /// The surface was not ready; zero draws were issued this tick.
    Skipped,
    /// Unrecoverable presentation failure.
    Fatal(String),
}

/// Driver state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DriveState {
    Rendering,
    Done,
}

/// Result of one driver tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// Frame `index` was presented.
    Rendered { index: u32 },
    /// Nothing was drawn; the counter did not advance.
    Skipped,
    /// The frame budget was reached. Signalled exactly once; the host loop
    /// should cancel on this.
    Finished,
    /// Tick after completion; no work was performed.
    Idle,
    Fatal(String),
}

/// Render-loop state machine.
///
/// Each tick performs at most one unit of GPU work through the supplied
/// presenter. The frame counter only advances on presented frames, so a run
/// always produces exactly `cap` frames regardless of how many ticks were
/// skipped while the surface was stale.
#[derive(Debug)]
pub struct FrameDriver {
    presented: u32,
    cap: u32,
    state: DriveState,
}

impl FrameDriver {
    /// Frame budget of the original demo loop.
    pub const DEFAULT_CAP: u32 = 60;

    pub fn new(cap: u32) -> Self {
        Self { presented: 0, cap, state: DriveState::Rendering }
    }

    pub fn state(&self) -> DriveState {
        self.state
    }

    /// Frames presented so far. Monotonic.
    pub fn presented(&self) -> u32 {
        self.presented
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }

    /// Advances the loop by one tick.
    pub fn tick(&mut self, present: impl FnOnce(FrameStamp) -> PresentOutcome) -> Tick {
        if self.state == DriveState::Done {
            return Tick::Idle;
        }

        if self.presented == self.cap {
            self.state = DriveState::Done;
            return Tick::Finished;
        }

        let stamp = FrameStamp { index: self.presented + 1, cap: self.cap };
        match present(stamp) {
            PresentOutcome::Presented => {
                self.presented += 1;
                Tick::Rendered { index: stamp.index }
            }
            PresentOutcome::Skipped => Tick::Skipped,
            PresentOutcome::Fatal(message) => {
                self.state = DriveState::Done;
                Tick::Fatal(message)
            }
        }
    }
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn present_ok(_: FrameStamp) -> PresentOutcome {
        PresentOutcome::Presented
    }

    // ── counting and termination ──────────────────────────────────────────

    #[test]
    fn counter_is_monotonic_and_indices_are_one_based() {
        let mut driver = FrameDriver::new(3);
        assert_eq!(driver.tick(present_ok), Tick::Rendered { index: 1 });
        assert_eq!(driver.tick(present_ok), Tick::Rendered { index: 2 });
        assert_eq!(driver.tick(present_ok), Tick::Rendered { index: 3 });
        assert_eq!(driver.presented(), 3);
    }

    #[test]
    fn finished_is_signalled_exactly_once_at_the_cap() {
        let mut driver = FrameDriver::new(2);
        driver.tick(present_ok);
        driver.tick(present_ok);
        assert_eq!(driver.state(), DriveState::Rendering);

        assert_eq!(driver.tick(present_ok), Tick::Finished);
        assert_eq!(driver.state(), DriveState::Done);

        // Later ticks are idle and never invoke the presenter.
        assert_eq!(
            driver.tick(|_| panic!("presenter called after completion")),
            Tick::Idle
        );
        assert_eq!(driver.presented(), 2);
    }

    #[test]
    fn zero_cap_finishes_without_presenting() {
        let mut driver = FrameDriver::new(0);
        assert_eq!(driver.tick(|_| panic!("presenter called with zero cap")), Tick::Finished);
    }

    #[test]
    fn default_cap_terminates_after_sixty_frames() {
        let mut driver = FrameDriver::default();
        let mut rendered = 0;
        loop {
            match driver.tick(present_ok) {
                Tick::Rendered { .. } => rendered += 1,
                Tick::Finished => break,
                other => panic!("unexpected tick {other:?}"),
            }
        }
        assert_eq!(rendered, 60);
    }

    // ── skip-frame property ───────────────────────────────────────────────

    #[test]
    fn skipped_tick_draws_nothing_and_does_not_advance() {
        let mut driver = FrameDriver::new(2);
        driver.tick(present_ok);

        assert_eq!(driver.tick(|_| PresentOutcome::Skipped), Tick::Skipped);
        assert_eq!(driver.presented(), 1);

        // The next tick retries the same frame index and succeeds.
        assert_eq!(driver.tick(present_ok), Tick::Rendered { index: 2 });
    }

    #[test]
    fn skips_do_not_shrink_the_frame_budget() {
        let mut driver = FrameDriver::new(3);
        let mut rendered = 0;
        let mut ticks = 0;
        loop {
            // Every other tick skips.
            let outcome = if ticks % 2 == 0 {
                driver.tick(|_| PresentOutcome::Skipped)
            } else {
                driver.tick(present_ok)
            };
            ticks += 1;
            match outcome {
                Tick::Rendered { .. } => rendered += 1,
                Tick::Finished => break,
                Tick::Skipped => {}
                other => panic!("unexpected tick {other:?}"),
            }
        }
        assert_eq!(rendered, 3);
    }

    // ── fatal path ────────────────────────────────────────────────────────

    #[test]
    fn fatal_presentation_ends_the_loop() {
        let mut driver = FrameDriver::new(5);
        driver.tick(present_ok);

        let tick = driver.tick(|_| PresentOutcome::Fatal("out of memory".into()));
        assert_eq!(tick, Tick::Fatal("out of memory".into()));
        assert_eq!(driver.state(), DriveState::Done);
        assert_eq!(driver.presented(), 1);
        assert_eq!(driver.tick(present_ok), Tick::Idle);
    }
}
