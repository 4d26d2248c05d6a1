/// High-level response after a surface acquisition error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// The surface needs reconfiguration; the current frame is skipped and
    /// rendering resumes on the next tick.
    Reconfigure,
    /// Transient error; skip the current frame without reconfiguring.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}
