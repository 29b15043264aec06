//! Autopilot collaborator interface
//!
//! The controller never owns vehicle state. Mode, arm state, mission
//! progress and the script command queue are read from the autopilot each
//! tick, and every vehicle action goes back through the same trait.

mod mock;

pub use mock::MockAutopilot;

use crate::mission::MissionSnapshot;
use crate::mode::FlightMode;
use crate::spray::{FlowReading, ScriptCommand};

/// Status text severity (MAV_SEVERITY numbering)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Severity {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Emergency => "EMERGENCY",
            Severity::Alert => "ALERT",
            Severity::Critical => "CRITICAL",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Notice => "NOTICE",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
        }
    }
}

/// Everything the spray controller needs from the autopilot
pub trait Autopilot {
    /// Current flight mode
    fn flight_mode(&self) -> FlightMode;

    fn is_armed(&self) -> bool;

    /// Mission status, current sequence index and the surrounding nav commands
    fn mission_snapshot(&self) -> MissionSnapshot;

    /// Script command waiting for the sprayer, if any.
    ///
    /// The same command keeps being returned until it is completed.
    fn pending_script_command(&mut self) -> Option<ScriptCommand>;

    /// Tell the mission sequencer the script command `id` is finished.
    fn complete_script_command(&mut self, id: u16);

    /// Request a mode change; returns `false` if the autopilot refused it.
    fn set_mode(&mut self, mode: FlightMode) -> bool;

    /// Request a disarm; returns `false` if the autopilot refused it.
    fn disarm(&mut self) -> bool;

    /// Send a status text to the ground station.
    fn send_text(&mut self, severity: Severity, text: &str);

    /// Append a flow telemetry record to the onboard log.
    fn log_flow(&mut self, now_ms: u64, reading: &FlowReading);
}

impl<A: Autopilot + ?Sized> Autopilot for &mut A {
    fn flight_mode(&self) -> FlightMode {
        (**self).flight_mode()
    }

    fn is_armed(&self) -> bool {
        (**self).is_armed()
    }

    fn mission_snapshot(&self) -> MissionSnapshot {
        (**self).mission_snapshot()
    }

    fn pending_script_command(&mut self) -> Option<ScriptCommand> {
        (**self).pending_script_command()
    }

    fn complete_script_command(&mut self, id: u16) {
        (**self).complete_script_command(id)
    }

    fn set_mode(&mut self, mode: FlightMode) -> bool {
        (**self).set_mode(mode)
    }

    fn disarm(&mut self) -> bool {
        (**self).disarm()
    }

    fn send_text(&mut self, severity: Severity, text: &str) {
        (**self).send_text(severity, text)
    }

    fn log_flow(&mut self, now_ms: u64, reading: &FlowReading) {
        (**self).log_flow(now_ms, reading)
    }
}
