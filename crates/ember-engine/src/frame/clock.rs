use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,
    /// Monotonic timestamp taken at the tick.
    pub now: Instant,
    /// Monotonic tick counter, starting at 0.
    pub frame_index: u64,
}

/// Per-loop frame clock.
///
/// Delta time is clamped so a debugger pause or a minimized window does not
/// produce pathological values downstream.
#[derive(Debug, Clone)]
pub struct FrameClock {
    started: Instant,
    last: Instant,
    frame_index: u64,
}

impl FrameClock {
    const DT_MIN: Duration = Duration::from_micros(100);
    const DT_MAX: Duration = Duration::from_millis(250);

    pub fn new() -> Self {
        let now = Instant::now();
        Self { started: now, last: now, frame_index: 0 }
    }

    /// Time since the clock was created.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Advances the clock and returns a snapshot for the tick.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(Self::DT_MIN, Self::DT_MAX);
        self.last = now;

        let snapshot = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        snapshot
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_index_is_monotonic() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick().frame_index, 0);
        assert_eq!(clock.tick().frame_index, 1);
        assert_eq!(clock.tick().frame_index, 2);
    }

    #[test]
    fn dt_is_clamped_to_a_sane_range() {
        let mut clock = FrameClock::new();
        // Back-to-back ticks would otherwise report ~0.
        let ft = clock.tick();
        assert!(ft.dt >= FrameClock::DT_MIN.as_secs_f32());
        assert!(ft.dt <= FrameClock::DT_MAX.as_secs_f32());
    }
}
