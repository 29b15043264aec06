//! Simulated autopilot
//!
//! Runs a scripted mission: timed items advance on their own, script items
//! issue a sprayer command and hold until the controller completes it.
//! Progress only happens while armed, in Auto, with the mission running.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use agrispray_core::mission::{MissionSnapshot, NavCommand, RawMissionStatus};
use agrispray_core::mode::FlightMode;
use agrispray_core::spray::{CommandKind, FlowReading, ScriptCommand};
use agrispray_core::vehicle::{Autopilot, Severity};
use serde::Serialize;

use crate::config::MissionItem;
use crate::error::Result;

/// Entries kept by each in-memory recorder; older entries are dropped
pub const HISTORY_LEN: usize = 64;

/// One line of the flow log
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlowRecord {
    pub time_ms: u64,
    pub flowrate: f32,
    pub volume: f32,
}

/// Flow telemetry appended to a file as JSON lines
pub struct FlowLog {
    writer: BufWriter<File>,
}

impl FlowLog {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    pub fn append(&mut self, record: &FlowRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptState {
    NotIssued,
    Pending(u16),
}

pub struct SimAutopilot {
    mode: FlightMode,
    armed: bool,
    status: RawMissionStatus,
    items: Vec<MissionItem>,
    /// Index into `items`; mission seq is index + 1 (0 is home)
    index: usize,
    item_started_ms: u64,
    prev_nav: NavCommand,
    script: ScriptState,
    pending: Option<ScriptCommand>,
    next_script_id: u16,
    now_ms: u64,

    texts: VecDeque<(Severity, String)>,
    mode_changes: VecDeque<FlightMode>,
    disarms: u32,
    completed: VecDeque<u16>,
    flow_records: VecDeque<FlowRecord>,
    flow_log: Option<FlowLog>,
}

impl SimAutopilot {
    /// Armed in Auto at the first item of a running mission.
    pub fn new(items: Vec<MissionItem>) -> Self {
        Self {
            mode: FlightMode::Auto,
            armed: true,
            status: RawMissionStatus::Running,
            items,
            index: 0,
            item_started_ms: 0,
            prev_nav: NavCommand::Other(0),
            script: ScriptState::NotIssued,
            pending: None,
            next_script_id: 1,
            now_ms: 0,
            texts: VecDeque::new(),
            mode_changes: VecDeque::new(),
            disarms: 0,
            completed: VecDeque::new(),
            flow_records: VecDeque::new(),
            flow_log: None,
        }
    }

    pub fn with_flow_log(mut self, log: FlowLog) -> Self {
        self.flow_log = Some(log);
        self
    }

    pub fn is_complete(&self) -> bool {
        self.status == RawMissionStatus::Complete
    }

    /// Most recent status texts, oldest first
    pub fn texts(&self) -> &VecDeque<(Severity, String)> {
        &self.texts
    }

    /// Mode changes requested through the autopilot interface
    pub fn mode_changes(&self) -> &VecDeque<FlightMode> {
        &self.mode_changes
    }

    pub fn disarms(&self) -> u32 {
        self.disarms
    }

    /// Script command ids completed by the controller, in order
    pub fn completed(&self) -> &VecDeque<u16> {
        &self.completed
    }

    /// Most recent flow readings; the flow log keeps the full history
    pub fn flow_records(&self) -> &VecDeque<FlowRecord> {
        &self.flow_records
    }

    /// Pilot or GCS mode change
    pub fn switch_mode(&mut self, mode: FlightMode) {
        self.mode = mode;
    }

    pub fn set_armed(&mut self, armed: bool) {
        self.armed = armed;
    }

    /// Stop the mission where it is
    pub fn stop_mission(&mut self) {
        if self.status == RawMissionStatus::Running {
            self.status = RawMissionStatus::Stopped;
        }
    }

    /// Continue a stopped mission from its current item
    pub fn resume_mission(&mut self) {
        if self.status == RawMissionStatus::Stopped {
            self.status = RawMissionStatus::Running;
            self.item_started_ms = self.now_ms;
        }
    }

    /// Jump back to the first item
    pub fn restart_mission(&mut self) {
        self.index = 0;
        self.prev_nav = NavCommand::Other(0);
        self.script = ScriptState::NotIssued;
        self.pending = None;
        self.item_started_ms = self.now_ms;
        self.status = RawMissionStatus::Running;
    }

    /// Advance the mission to `now_ms`.
    pub fn step(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
        let running = self.status == RawMissionStatus::Running;
        if !running || !self.armed || self.mode != FlightMode::Auto {
            return;
        }
        let Some(item) = self.items.get(self.index) else {
            self.status = RawMissionStatus::Complete;
            return;
        };

        match (item.spray, self.script) {
            (Some(step), ScriptState::NotIssued) => {
                let id = self.next_script_id;
                self.next_script_id = self.next_script_id.wrapping_add(1);
                self.pending = Some(ScriptCommand {
                    id,
                    cmd: CommandKind::from(step.kind).code(),
                    arg1: step.arg1,
                    arg2: step.arg2,
                });
                self.script = ScriptState::Pending(id);
                tracing::debug!(id, seq = self.seq(), "script command issued");
            }
            (Some(_), ScriptState::Pending(_)) => {}
            (None, _) => {
                if now_ms.saturating_sub(self.item_started_ms) >= item.duration_ms {
                    self.advance();
                }
            }
        }
    }

    fn advance(&mut self) {
        if let Some(item) = self.items.get(self.index) {
            self.prev_nav = item.nav_command();
        }
        self.index += 1;
        self.item_started_ms = self.now_ms;
        self.script = ScriptState::NotIssued;
        if self.index >= self.items.len() {
            tracing::info!("mission complete");
            self.status = RawMissionStatus::Complete;
        }
    }

    fn seq(&self) -> u16 {
        (self.index + 1).min(u16::MAX as usize) as u16
    }
}

impl Autopilot for SimAutopilot {
    fn flight_mode(&self) -> FlightMode {
        self.mode
    }

    fn is_armed(&self) -> bool {
        self.armed
    }

    fn mission_snapshot(&self) -> MissionSnapshot {
        let current_nav = self
            .items
            .get(self.index)
            .map(MissionItem::nav_command)
            .unwrap_or(NavCommand::Other(0));
        MissionSnapshot {
            status: self.status,
            seq: self.seq(),
            prev_nav: self.prev_nav,
            current_nav,
        }
    }

    fn pending_script_command(&mut self) -> Option<ScriptCommand> {
        self.pending
    }

    fn complete_script_command(&mut self, id: u16) {
        remember(&mut self.completed, id);
        if self.script == ScriptState::Pending(id) {
            self.pending = None;
            self.advance();
        } else {
            tracing::debug!(id, "completion for a script command no longer pending");
        }
    }

    fn set_mode(&mut self, mode: FlightMode) -> bool {
        tracing::info!(mode = mode.as_str(), "mode change requested");
        remember(&mut self.mode_changes, mode);
        self.mode = mode;
        true
    }

    fn disarm(&mut self) -> bool {
        tracing::info!("disarm requested");
        self.disarms += 1;
        self.armed = false;
        true
    }

    fn send_text(&mut self, severity: Severity, text: &str) {
        tracing::info!(severity = severity.as_str(), "STATUSTEXT: {text}");
        remember(&mut self.texts, (severity, text.to_owned()));
    }

    fn log_flow(&mut self, now_ms: u64, reading: &FlowReading) {
        let record = FlowRecord {
            time_ms: now_ms,
            flowrate: reading.flowrate,
            volume: reading.volume,
        };
        remember(&mut self.flow_records, record);
        if let Some(log) = self.flow_log.as_mut() {
            if let Err(e) = log.append(&record) {
                tracing::warn!(error = %e, "flow log write failed");
            }
        }
    }
}

fn remember<T>(history: &mut VecDeque<T>, item: T) {
    if history.len() == HISTORY_LEN {
        history.pop_front();
    }
    history.push_back(item);
}

impl Drop for SimAutopilot {
    fn drop(&mut self) {
        if let Some(log) = self.flow_log.as_mut() {
            let _ = log.flush();
        }
    }
}
