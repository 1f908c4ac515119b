/// What the device did in response to a failed acquire or present.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// The surface was reconfigured; the next frame may be attempted.
    Reconfigured,
    /// Transient failure; only the current frame is dropped.
    SkipFrame,
    /// Unrecoverable (commonly out of memory); the host should exit.
    Fatal,
}
