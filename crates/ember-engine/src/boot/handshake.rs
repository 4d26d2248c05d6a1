use std::fmt;

/// Negotiation stage of the bootstrap handshake.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Stage {
    Adapter,
    Device,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Adapter => write!(f, "adapter"),
            Stage::Device => write!(f, "device"),
        }
    }
}

/// Diagnostic from a failed negotiation stage.
#[derive(Debug, Clone, PartialEq)]
pub struct NegotiationError {
    pub stage: Stage,
    pub message: String,
}

impl NegotiationError {
    pub(crate) fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self { stage, message: message.into() }
    }
}

impl fmt::Display for NegotiationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} negotiation failed: {}", self.stage, self.message)
    }
}

impl std::error::Error for NegotiationError {}

/// Delivery the handshake cannot accept: a second outcome for a stage that
/// already resolved, or a device outcome while the adapter is still pending.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolViolation {
    pub stage: Stage,
    pub phase: Phase,
}

impl fmt::Display for ProtocolViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} outcome delivered in phase {:?}", self.stage, self.phase)
    }
}

impl std::error::Error for ProtocolViolation {}

impl From<ProtocolViolation> for NegotiationError {
    fn from(v: ProtocolViolation) -> Self {
        NegotiationError::new(v.stage, v.to_string())
    }
}

/// Phase of the bootstrap handshake.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Phase {
    AwaitingAdapter,
    AwaitingDevice,
    Ready,
    /// Terminal: no usable backend was found at the adapter stage.
    Unavailable,
    /// Terminal: a stage reported an explicit failure.
    Failed,
}

/// Resolution of an adapter request. Exactly one is delivered per request.
#[derive(Debug)]
pub enum AdapterOutcome<A> {
    Ready(A),
    /// No usable backend on this machine. A clean termination, not an error.
    Unavailable { message: String },
    Failed { message: String },
}

/// Resolution of a device request. The adapter stage already proved a
/// backend exists, so there is no unavailable case here.
#[derive(Debug)]
pub enum DeviceOutcome<D> {
    Ready(D),
    Failed { message: String },
}

/// Caller direction after an accepted adapter outcome.
#[derive(Debug)]
pub enum AdapterStep<A> {
    /// Proceed to the device stage. The adapter handle is transient; it is
    /// handed back only so the caller can request a device from it.
    RequestDevice(A),
    /// Terminate the whole program cleanly (exit code 0).
    ExitCleanly { message: String },
    Abort(NegotiationError),
}

/// Caller direction after an accepted device outcome.
#[derive(Debug)]
pub enum DeviceStep<D> {
    StartRendering(D),
    Abort(NegotiationError),
}

/// Two-stage bootstrap state machine:
/// `AwaitingAdapter → AwaitingDevice → Ready`, with `Unavailable` and
/// `Failed` as terminal side exits.
///
/// At most one request is outstanding per stage. Delivering an outcome twice,
/// or out of order, is rejected as a [`ProtocolViolation`] instead of being
/// absorbed, so double-delivery bugs surface at the call site.
#[derive(Debug)]
pub struct Handshake {
    phase: Phase,
}

impl Handshake {
    pub fn new() -> Self {
        Self { phase: Phase::AwaitingAdapter }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True once the device stage resolved successfully. Rendering must not
    /// begin before this.
    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    /// Feeds the adapter-stage resolution into the machine.
    pub fn adapter_resolved<A>(
        &mut self,
        outcome: AdapterOutcome<A>,
    ) -> Result<AdapterStep<A>, ProtocolViolation> {
        if self.phase != Phase::AwaitingAdapter {
            return Err(ProtocolViolation { stage: Stage::Adapter, phase: self.phase });
        }

        Ok(match outcome {
            AdapterOutcome::Ready(adapter) => {
                self.phase = Phase::AwaitingDevice;
                AdapterStep::RequestDevice(adapter)
            }
            AdapterOutcome::Unavailable { message } => {
                self.phase = Phase::Unavailable;
                AdapterStep::ExitCleanly { message }
            }
            AdapterOutcome::Failed { message } => {
                self.phase = Phase::Failed;
                AdapterStep::Abort(NegotiationError::new(Stage::Adapter, message))
            }
        })
    }

    /// Feeds the device-stage resolution into the machine.
    pub fn device_resolved<D>(
        &mut self,
        outcome: DeviceOutcome<D>,
    ) -> Result<DeviceStep<D>, ProtocolViolation> {
        if self.phase != Phase::AwaitingDevice {
            return Err(ProtocolViolation { stage: Stage::Device, phase: self.phase });
        }

        Ok(match outcome {
            DeviceOutcome::Ready(device) => {
                self.phase = Phase::Ready;
                DeviceStep::StartRendering(device)
            }
            DeviceOutcome::Failed { message } => {
                self.phase = Phase::Failed;
                DeviceStep::Abort(NegotiationError::new(Stage::Device, message))
            }
        })
    }
}

impl Default for Handshake {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_adapter() -> AdapterOutcome<&'static str> {
        AdapterOutcome::Ready("adapter")
    }

    fn ready_device() -> DeviceOutcome<&'static str> {
        DeviceOutcome::Ready("device")
    }

    // ── ordering ──────────────────────────────────────────────────────────

    #[test]
    fn happy_path_walks_all_three_phases() {
        let mut hs = Handshake::new();
        assert_eq!(hs.phase(), Phase::AwaitingAdapter);
        assert!(!hs.is_ready());

        let step = hs.adapter_resolved(ready_adapter()).unwrap();
        assert!(matches!(step, AdapterStep::RequestDevice("adapter")));
        assert_eq!(hs.phase(), Phase::AwaitingDevice);
        assert!(!hs.is_ready());

        let step = hs.device_resolved(ready_device()).unwrap();
        assert!(matches!(step, DeviceStep::StartRendering("device")));
        assert_eq!(hs.phase(), Phase::Ready);
        assert!(hs.is_ready());
    }

    #[test]
    fn device_outcome_before_adapter_is_rejected() {
        let mut hs = Handshake::new();
        let err = hs.device_resolved(ready_device()).unwrap_err();
        assert_eq!(err.stage, Stage::Device);
        assert_eq!(err.phase, Phase::AwaitingAdapter);
        // The machine is left where it was.
        assert_eq!(hs.phase(), Phase::AwaitingAdapter);
    }

    // ── exactly-once delivery ─────────────────────────────────────────────

    #[test]
    fn second_adapter_delivery_is_rejected() {
        let mut hs = Handshake::new();
        hs.adapter_resolved(ready_adapter()).unwrap();

        let err = hs.adapter_resolved(ready_adapter()).unwrap_err();
        assert_eq!(err.stage, Stage::Adapter);
        assert_eq!(err.phase, Phase::AwaitingDevice);
    }

    #[test]
    fn second_device_delivery_is_rejected() {
        let mut hs = Handshake::new();
        hs.adapter_resolved(ready_adapter()).unwrap();
        hs.device_resolved(ready_device()).unwrap();

        let err = hs.device_resolved(ready_device()).unwrap_err();
        assert_eq!(err.phase, Phase::Ready);
    }

    #[test]
    fn no_delivery_is_accepted_after_a_terminal_phase() {
        let mut hs = Handshake::new();
        hs.adapter_resolved::<&str>(AdapterOutcome::Unavailable { message: "none".into() })
            .unwrap();

        assert!(hs.adapter_resolved(ready_adapter()).is_err());
        assert!(hs.device_resolved(ready_device()).is_err());
        assert_eq!(hs.phase(), Phase::Unavailable);
    }

    // ── terminal side exits ───────────────────────────────────────────────

    #[test]
    fn unavailable_is_a_clean_exit_not_an_error() {
        let mut hs = Handshake::new();
        let step = hs
            .adapter_resolved::<&str>(AdapterOutcome::Unavailable { message: "no backend".into() })
            .unwrap();

        match step {
            AdapterStep::ExitCleanly { message } => assert_eq!(message, "no backend"),
            other => panic!("expected ExitCleanly, got {other:?}"),
        }
        assert_eq!(hs.phase(), Phase::Unavailable);
    }

    #[test]
    fn adapter_failure_aborts_with_stage_tagged_error() {
        let mut hs = Handshake::new();
        let step = hs
            .adapter_resolved::<&str>(AdapterOutcome::Failed { message: "driver bug".into() })
            .unwrap();

        match step {
            AdapterStep::Abort(err) => {
                assert_eq!(err.stage, Stage::Adapter);
                assert_eq!(err.to_string(), "adapter negotiation failed: driver bug");
            }
            other => panic!("expected Abort, got {other:?}"),
        }
        assert_eq!(hs.phase(), Phase::Failed);
    }

    #[test]
    fn device_failure_aborts_with_stage_tagged_error() {
        let mut hs = Handshake::new();
        hs.adapter_resolved(ready_adapter()).unwrap();
        let step = hs
            .device_resolved::<&str>(DeviceOutcome::Failed { message: "limits".into() })
            .unwrap();

        match step {
            DeviceStep::Abort(err) => assert_eq!(err.stage, Stage::Device),
            other => panic!("expected Abort, got {other:?}"),
        }
        assert!(!hs.is_ready());
    }
}
