//! Actuator acknowledgment tracking
//!
//! Exactly one actuator request may be outstanding. The tracker moves
//! through three states:
//!
//! ```text
//!  Idle --begin--> Waiting --on_ack--> Resolving
//!   ^                 |                    |
//!   |   hard timeout  |   evaluate         |
//!   +-----------------+--------------------+
//! ```
//!
//! A request acknowledged after the soft threshold counts as a failure and
//! triggers the same failsafe as a request that was never acknowledged.

use core::fmt::Write;

use heapless::String;

use super::command::CommandKind;
use crate::mode::FlightMode;
use crate::parameters::{FailsafeAction, NotifyFlags, ParamSource, SprayParams};
use crate::vehicle::{Autopilot, Severity};

/// Result code carried by an acknowledgment (MAV_RESULT numbering)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckResult {
    Accepted,
    TemporarilyRejected,
    Denied,
    Unsupported,
    Failed,
    InProgress,
    Cancelled,
    Other(u8),
}

impl AckResult {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => AckResult::Accepted,
            1 => AckResult::TemporarilyRejected,
            2 => AckResult::Denied,
            3 => AckResult::Unsupported,
            4 => AckResult::Failed,
            5 => AckResult::InProgress,
            6 => AckResult::Cancelled,
            other => AckResult::Other(other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AckResult::Accepted => "ACCEPTED",
            AckResult::TemporarilyRejected => "TEMPORARILY_REJECTED",
            AckResult::Denied => "DENIED",
            AckResult::Unsupported => "UNSUPPORTED",
            AckResult::Failed => "FAILED",
            AckResult::InProgress => "IN_PROGRESS",
            AckResult::Cancelled => "CANCELLED",
            AckResult::Other(_) => "OTHER",
        }
    }
}

/// Soft and hard acknowledgment thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AckTimeouts {
    /// Acks slower than this are treated as failures (ms)
    pub soft_ms: u64,
    /// Requests without an ack for this long time out (ms)
    pub hard_ms: u64,
}

impl Default for AckTimeouts {
    fn default() -> Self {
        Self {
            soft_ms: 3500,
            hard_ms: 10_000,
        }
    }
}

/// Acknowledgment received for the outstanding request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AckRecord {
    /// Time the ack was drained from the link
    pub at_ms: u64,
    pub result: AckResult,
}

/// The single in-flight request to the actuator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorRequest {
    /// Script command id this request serves
    pub id: u16,
    pub kind: CommandKind,
    pub issued_at_ms: u64,
    pub ack: Option<AckRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckState {
    Idle,
    Waiting,
    Resolving,
}

/// A request is already outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPending {
    pub outstanding_id: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    /// Acked within the soft threshold
    Success { delay_ms: u64 },
    /// Acked, but after the soft threshold
    SlowAck { delay_ms: u64 },
    /// Never acked before the hard timeout
    Timeout { elapsed_ms: u64 },
}

impl AckOutcome {
    pub fn is_failure(&self) -> bool {
        !matches!(self, AckOutcome::Success { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AckOutcome::Success { .. } => "SUCCESS",
            AckOutcome::SlowAck { .. } => "SLOW_ACK",
            AckOutcome::Timeout { .. } => "TIMEOUT",
        }
    }

    fn notify_flag(&self) -> NotifyFlags {
        match self {
            AckOutcome::Success { .. } => NotifyFlags::SUCCESS,
            AckOutcome::SlowAck { .. } => NotifyFlags::SLOW_ACK,
            AckOutcome::Timeout { .. } => NotifyFlags::TIMEOUT,
        }
    }
}

/// A request leaving the tracker, with how it ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub request: ActuatorRequest,
    pub outcome: AckOutcome,
}

/// Owns the outstanding request and decides when it is resolved
#[derive(Debug, Clone, Default)]
pub struct AckTracker {
    timeouts: AckTimeouts,
    request: Option<ActuatorRequest>,
}

impl AckTracker {
    pub fn new(timeouts: AckTimeouts) -> Self {
        Self {
            timeouts,
            request: None,
        }
    }

    pub fn state(&self) -> AckState {
        match self.request {
            None => AckState::Idle,
            Some(ActuatorRequest { ack: None, .. }) => AckState::Waiting,
            Some(_) => AckState::Resolving,
        }
    }

    pub fn outstanding(&self) -> Option<&ActuatorRequest> {
        self.request.as_ref()
    }

    pub fn timeouts(&self) -> AckTimeouts {
        self.timeouts
    }

    /// Start tracking a request sent at `now_ms`.
    pub fn begin(&mut self, id: u16, kind: CommandKind, now_ms: u64) -> Result<(), RequestPending> {
        if let Some(current) = &self.request {
            return Err(RequestPending {
                outstanding_id: current.id,
            });
        }
        self.request = Some(ActuatorRequest {
            id,
            kind,
            issued_at_ms: now_ms,
            ack: None,
        });
        Ok(())
    }

    /// Move the dispatch time of an unacknowledged request to `now_ms`.
    ///
    /// Used when the mission resumes: the sprayer is woken again, so the
    /// hard timeout restarts from the Resume. Returns `false` when there is
    /// no request waiting on an ack.
    pub fn restamp(&mut self, now_ms: u64) -> bool {
        match self.request.as_mut() {
            Some(request) if request.ack.is_none() => {
                request.issued_at_ms = now_ms;
                true
            }
            _ => false,
        }
    }

    /// Record an acknowledgment drained at `now_ms`.
    ///
    /// Returns `false` (ack dropped) when nothing is waiting, an ack was
    /// already recorded, or the kind does not match.
    pub fn on_ack(&mut self, kind: CommandKind, result: AckResult, now_ms: u64) -> bool {
        let Some(request) = self.request.as_mut() else {
            log_debug!("Ack for {} dropped: no request outstanding", kind.as_str());
            return false;
        };
        if request.ack.is_some() || request.kind != kind {
            log_debug!(
                "Ack for {} dropped while waiting on {} (id {})",
                kind.as_str(),
                request.kind.as_str(),
                request.id
            );
            return false;
        }
        request.ack = Some(AckRecord {
            at_ms: now_ms,
            result,
        });
        true
    }

    /// Resolve the outstanding request if it is acked or timed out.
    ///
    /// Resolution clears the tracker back to Idle.
    pub fn evaluate(&mut self, now_ms: u64) -> Option<Resolution> {
        let request = self.request?;
        let outcome = match request.ack {
            Some(ack) => {
                let delay_ms = ack.at_ms.saturating_sub(request.issued_at_ms);
                if delay_ms > self.timeouts.soft_ms {
                    AckOutcome::SlowAck { delay_ms }
                } else {
                    AckOutcome::Success { delay_ms }
                }
            }
            None => {
                let elapsed_ms = now_ms.saturating_sub(request.issued_at_ms);
                if elapsed_ms < self.timeouts.hard_ms {
                    return None;
                }
                AckOutcome::Timeout { elapsed_ms }
            }
        };
        self.request = None;
        Some(Resolution { request, outcome })
    }

    /// Evaluate and carry out the consequences of a resolution.
    ///
    /// Failures apply the configured failsafe action. The script command
    /// is completed in every case so the mission sequencer moves on.
    pub fn service<A, P>(
        &mut self,
        now_ms: u64,
        autopilot: &mut A,
        params: &P,
    ) -> Option<Resolution>
    where
        A: Autopilot + ?Sized,
        P: ParamSource + ?Sized,
    {
        let resolution = self.evaluate(now_ms)?;
        let request = resolution.request;
        let outcome = resolution.outcome;
        let spray = SprayParams::from_source(params);

        match outcome {
            AckOutcome::Success { delay_ms } => {
                log_info!(
                    "Sprayer {} (id {}) acked in {} ms",
                    request.kind.as_str(),
                    request.id,
                    delay_ms
                );
            }
            AckOutcome::SlowAck { delay_ms } => {
                log_warn!(
                    "Sprayer {} (id {}) acked late ({} ms), failsafe {}",
                    request.kind.as_str(),
                    request.id,
                    delay_ms,
                    spray.fs_action.as_str()
                );
            }
            AckOutcome::Timeout { elapsed_ms } => {
                log_warn!(
                    "Sprayer {} (id {}) timed out after {} ms, failsafe {}",
                    request.kind.as_str(),
                    request.id,
                    elapsed_ms,
                    spray.fs_action.as_str()
                );
            }
        }
        if let Some(ack) = request.ack {
            log_debug!("Ack result {}", ack.result.as_str());
        }

        if spray.notify.contains(outcome.notify_flag()) {
            notify(autopilot, &request, &outcome, spray.fs_action);
        }
        if outcome.is_failure() {
            apply_failsafe(spray.fs_action, autopilot);
        }

        autopilot.complete_script_command(request.id);
        Some(resolution)
    }
}

/// Carry out a failsafe action. Mode changes are not retried if refused.
pub fn apply_failsafe<A: Autopilot + ?Sized>(action: FailsafeAction, autopilot: &mut A) {
    let mode = match action {
        FailsafeAction::ContinueMission => return,
        FailsafeAction::ReturnToLaunch => FlightMode::Rtl,
        FailsafeAction::Loiter => FlightMode::Loiter,
        FailsafeAction::LandAndDisarm => FlightMode::Land,
    };

    if !autopilot.set_mode(mode) {
        log_error!("Failsafe: autopilot refused mode {}", mode.as_str());
    }
    if action == FailsafeAction::LandAndDisarm && !autopilot.disarm() {
        log_error!("Failsafe: autopilot refused disarm");
    }
}

fn notify<A: Autopilot + ?Sized>(
    autopilot: &mut A,
    request: &ActuatorRequest,
    outcome: &AckOutcome,
    action: FailsafeAction,
) {
    let kind = request.kind.as_str();
    let mut text: String<64> = String::new();
    let (severity, written) = match outcome {
        AckOutcome::Success { delay_ms } => (
            Severity::Info,
            write!(text, "Sprayer {} ok ({} ms)", kind, delay_ms),
        ),
        AckOutcome::SlowAck { delay_ms } => (
            Severity::Warning,
            write!(
                text,
                "Sprayer {} slow ack ({} ms), {}",
                kind,
                delay_ms,
                action.as_str()
            ),
        ),
        AckOutcome::Timeout { .. } => (
            Severity::Warning,
            write!(text, "Sprayer {} timeout, {}", kind, action.as_str()),
        ),
    };
    // A truncated message is still worth sending
    let _ = written;
    autopilot.send_text(severity, &text);
}
