//! Scriptable autopilot for host tests

use heapless::{String, Vec};

use super::{Autopilot, Severity};
use crate::mission::{MissionSnapshot, NavCommand, RawMissionStatus};
use crate::mode::FlightMode;
use crate::spray::{FlowReading, ScriptCommand};

/// Status text length kept by the mock (MAVLink STATUSTEXT payload)
pub const TEXT_LEN: usize = 50;

/// Autopilot whose state is set directly by the test and whose actions are recorded
#[derive(Debug)]
pub struct MockAutopilot {
    pub mode: FlightMode,
    pub armed: bool,
    pub mission: MissionSnapshot,
    /// Script command returned by `pending_script_command` until completed
    pub pending: Option<ScriptCommand>,
    /// Whether `set_mode` and `disarm` succeed
    pub accept_commands: bool,

    pub completed: Vec<u16, 16>,
    pub mode_requests: Vec<FlightMode, 8>,
    pub disarm_count: u32,
    pub texts: Vec<(Severity, String<TEXT_LEN>), 16>,
    pub flow_log: Vec<(u64, FlowReading), 16>,
}

impl Default for MockAutopilot {
    fn default() -> Self {
        Self {
            mode: FlightMode::Auto,
            armed: true,
            mission: MissionSnapshot {
                status: RawMissionStatus::Running,
                seq: 0,
                prev_nav: NavCommand::Takeoff,
                current_nav: NavCommand::Waypoint,
            },
            pending: None,
            accept_commands: true,
            completed: Vec::new(),
            mode_requests: Vec::new(),
            disarm_count: 0,
            texts: Vec::new(),
            flow_log: Vec::new(),
        }
    }
}

impl MockAutopilot {
    /// Armed, in Auto, mission running at sequence 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a script command for the sprayer
    pub fn queue_script(&mut self, id: u16, cmd: u16, arg1: f32, arg2: f32) {
        self.pending = Some(ScriptCommand {
            id,
            cmd,
            arg1,
            arg2,
        });
    }

    pub fn set_mission(
        &mut self,
        status: RawMissionStatus,
        seq: u16,
        prev: NavCommand,
        current: NavCommand,
    ) {
        self.mission = MissionSnapshot {
            status,
            seq,
            prev_nav: prev,
            current_nav: current,
        };
    }

    /// True if any recorded status text contains `needle`
    pub fn has_text(&self, needle: &str) -> bool {
        self.texts.iter().any(|(_, text)| text.contains(needle))
    }
}

impl Autopilot for MockAutopilot {
    fn flight_mode(&self) -> FlightMode {
        self.mode
    }

    fn is_armed(&self) -> bool {
        self.armed
    }

    fn mission_snapshot(&self) -> MissionSnapshot {
        self.mission
    }

    fn pending_script_command(&mut self) -> Option<ScriptCommand> {
        self.pending
    }

    fn complete_script_command(&mut self, id: u16) {
        let _ = self.completed.push(id);
        if self.pending.is_some_and(|cmd| cmd.id == id) {
            self.pending = None;
        }
    }

    fn set_mode(&mut self, mode: FlightMode) -> bool {
        let _ = self.mode_requests.push(mode);
        if self.accept_commands {
            self.mode = mode;
        }
        self.accept_commands
    }

    fn disarm(&mut self) -> bool {
        self.disarm_count += 1;
        if self.accept_commands {
            self.armed = false;
        }
        self.accept_commands
    }

    fn send_text(&mut self, severity: Severity, text: &str) {
        let mut stored = String::new();
        for c in text.chars() {
            if stored.push(c).is_err() {
                break;
            }
        }
        let _ = self.texts.push((severity, stored));
    }

    fn log_flow(&mut self, now_ms: u64, reading: &FlowReading) {
        let _ = self.flow_log.push((now_ms, *reading));
    }
}
