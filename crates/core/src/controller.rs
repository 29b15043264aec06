//! Spray controller
//!
//! Owns every piece of sprayer state and advances it once per tick.
//! Within a tick the order is fixed:
//!
//! 1. mode/arm watcher (may send a manual command or stop dispatch)
//! 2. mission progress tracker (may send Resume/Restart; a sent Resume
//!    restarts the outstanding request's hard timeout)
//! 3. flow ingest (drains one inbound message)
//! 4. in Auto and not just disarmed: script dispatch, then ack
//!    evaluation (drains one inbound message)
//!
//! Both drains route whatever they receive to the right consumer, so a
//! flow sample drained in step 4 or an ack drained in step 3 is not lost.

use core::fmt::Write;

use heapless::String;

use crate::link::SprayLink;
use crate::mission::{MissionState, MissionStatus};
use crate::mode::{ModeArmWatcher, ModeEvent};
use crate::parameters::ParamSource;
use crate::spray::{
    AckTimeouts, AckTracker, ActuatorCommand, CommandCodec, FlowIngest, FlowReading, InboundEvent,
    KindMap, ManualAction, Resolution,
};
use crate::traits::TimeSource;
use crate::vehicle::{Autopilot, Severity};

/// Status text sent when the vehicle disarms
pub const DISARM_TEXT: &str = "Disarmed, spray stopped";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerConfig {
    pub timeouts: AckTimeouts,
    /// Ack command code numbering used by the link
    pub kinds: KindMap,
}

/// Counters accumulated over the controller's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub ticks: u64,
    /// Script commands sent to the sprayer
    pub commands_sent: u32,
    /// Watcher and mission tracker commands sent
    pub manual_sent: u32,
    pub acks_matched: u32,
    pub failsafes: u32,
    /// Script commands completed without sending
    pub refusals: u32,
    /// Inbound messages that were unknown or matched nothing
    pub dropped_inbound: u32,
    pub send_failures: u32,
}

/// Per-tick coordinator between autopilot, mission and sprayer
#[derive(Debug, Clone)]
pub struct SprayController {
    watcher: ModeArmWatcher,
    mission: MissionState,
    ack: AckTracker,
    flow: FlowIngest,
    codec: CommandCodec,
    last_script_id: Option<u16>,
    stats: TickStats,
}

impl SprayController {
    /// Snapshot the autopilot's current mode, arm state and mission.
    pub fn new<A: Autopilot + ?Sized>(autopilot: &A, config: ControllerConfig) -> Self {
        let mission = MissionState::new(&autopilot.mission_snapshot());
        log_info!(
            "Spray controller started: mode {}, mission {}",
            autopilot.flight_mode().as_str(),
            mission.status().as_str()
        );
        Self {
            watcher: ModeArmWatcher::new(autopilot.flight_mode(), autopilot.is_armed()),
            mission,
            ack: AckTracker::new(config.timeouts),
            flow: FlowIngest::new(),
            codec: CommandCodec::new(config.kinds),
            last_script_id: None,
            stats: TickStats::default(),
        }
    }

    pub fn stats(&self) -> &TickStats {
        &self.stats
    }

    pub fn mission(&self) -> &MissionState {
        &self.mission
    }

    pub fn ack(&self) -> &AckTracker {
        &self.ack
    }

    pub fn flow(&self) -> FlowReading {
        self.flow.reading()
    }

    /// Script id of the last command sent to the sprayer
    pub fn last_script_id(&self) -> Option<u16> {
        self.last_script_id
    }

    /// Run one tick. Returns the request resolved in this tick, if any.
    pub fn tick<A, L, P, T>(
        &mut self,
        autopilot: &mut A,
        link: &mut L,
        params: &P,
        time: &T,
    ) -> Option<Resolution>
    where
        A: Autopilot + ?Sized,
        L: SprayLink + ?Sized,
        P: ParamSource + ?Sized,
        T: TimeSource + ?Sized,
    {
        let now = time.now_ms();
        self.stats.ticks = self.stats.ticks.wrapping_add(1);

        let mode = autopilot.flight_mode();
        let event = self.watcher.observe(mode, autopilot.is_armed());
        match event {
            ModeEvent::Disarmed => {
                log_info!("Vehicle disarmed");
                autopilot.send_text(Severity::Info, DISARM_TEXT);
            }
            ModeEvent::ModeChanged {
                from,
                to,
                action: Some(action),
            } => {
                log_info!(
                    "Mode {} -> {}: sprayer {}",
                    from.as_str(),
                    to.as_str(),
                    action.as_str()
                );
                self.send_manual(action, link, time);
                let mut text: String<50> = String::new();
                let _ = write!(text, "Spray {} in {}", action.as_str(), to.as_str());
                autopilot.send_text(Severity::Info, &text);
            }
            ModeEvent::ModeChanged {
                from,
                to,
                action: None,
            } => {
                log_info!(
                    "Mode {} -> {}: mission dispatch",
                    from.as_str(),
                    to.as_str()
                );
            }
            ModeEvent::Steady => {}
        }

        let snapshot = autopilot.mission_snapshot();
        for action in self.mission.update(&snapshot) {
            if self.send_manual(action, link, time)
                && action == ManualAction::Resume
                && self.ack.restamp(now)
            {
                log_debug!("Resume sent, outstanding request restamped at {}", now);
            }
        }

        self.pump_inbound(now, autopilot, link);

        if event == ModeEvent::Disarmed || !mode.is_mission_mode() {
            return None;
        }

        self.dispatch(now, autopilot, link, time);
        self.pump_inbound(now, autopilot, link);

        let resolution = self.ack.service(now, autopilot, params);
        if resolution.is_some_and(|r| r.outcome.is_failure()) {
            self.stats.failsafes += 1;
        }
        resolution
    }

    fn dispatch<A, L, T>(&mut self, now: u64, autopilot: &mut A, link: &mut L, time: &T)
    where
        A: Autopilot + ?Sized,
        L: SprayLink + ?Sized,
        T: TimeSource + ?Sized,
    {
        let Some(script) = autopilot.pending_script_command() else {
            return;
        };
        if self.last_script_id == Some(script.id) {
            return;
        }
        if let Some(outstanding) = self.ack.outstanding() {
            log_debug!(
                "Script command {} deferred behind {}",
                script.id,
                outstanding.id
            );
            return;
        }
        if self.mission.status() != MissionStatus::Active {
            log_warn!(
                "Script command {} refused: mission {}",
                script.id,
                self.mission.status().as_str()
            );
            self.refuse(script.id, autopilot);
            return;
        }

        let command = match ActuatorCommand::try_from(&script) {
            Ok(command) => command,
            Err(err) => {
                log_warn!("Script command {} refused: {}", script.id, err.as_str());
                self.refuse(script.id, autopilot);
                return;
            }
        };

        self.send(&command, link, time);
        if let Err(pending) = self.ack.begin(script.id, command.kind(), now) {
            log_error!("Request {} still outstanding", pending.outstanding_id);
            return;
        }
        self.last_script_id = Some(script.id);
        self.stats.commands_sent += 1;
        log_info!(
            "Sent {} for script command {}",
            command.kind().as_str(),
            script.id
        );
    }

    fn refuse<A: Autopilot + ?Sized>(&mut self, id: u16, autopilot: &mut A) {
        autopilot.complete_script_command(id);
        self.stats.refusals += 1;
    }

    fn pump_inbound<A, L>(&mut self, now: u64, autopilot: &mut A, link: &mut L)
    where
        A: Autopilot + ?Sized,
        L: SprayLink + ?Sized,
    {
        let Some(raw) = link.try_recv() else {
            return;
        };
        match self.codec.decode(&raw) {
            Some(InboundEvent::Flow(sample)) => {
                let reading = self.flow.apply(sample);
                autopilot.log_flow(now, &reading);
            }
            Some(InboundEvent::Ack { kind, result }) => {
                if self.ack.on_ack(kind, result, now) {
                    self.stats.acks_matched += 1;
                } else {
                    self.stats.dropped_inbound += 1;
                }
            }
            None => {
                log_debug!("Unrecognised inbound message dropped");
                self.stats.dropped_inbound += 1;
            }
        }
    }

    fn send_manual<L, T>(&mut self, action: ManualAction, link: &mut L, time: &T) -> bool
    where
        L: SprayLink + ?Sized,
        T: TimeSource + ?Sized,
    {
        let sent = self.send(&ActuatorCommand::Manual(action), link, time);
        if sent {
            self.stats.manual_sent += 1;
        }
        sent
    }

    fn send<L, T>(&mut self, command: &ActuatorCommand, link: &mut L, time: &T) -> bool
    where
        L: SprayLink + ?Sized,
        T: TimeSource + ?Sized,
    {
        let message = self.codec.encode(command, time.wire_timestamp());
        match link.send(&message) {
            Ok(()) => true,
            Err(err) => {
                log_warn!("Send {} failed: {}", message.name, err.as_str());
                self.stats.send_failures += 1;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::{MockLink, RawMessage};
    use crate::mode::FlightMode;
    use crate::parameters::{ParameterStore, SprayParams};
    use crate::spray::{unpack_blanket, AckOutcome, AckState, CommandKind};
    use crate::traits::MockTime;
    use crate::vehicle::MockAutopilot;

    struct Rig {
        ap: MockAutopilot,
        link: MockLink,
        params: ParameterStore,
        time: MockTime,
        ctl: SprayController,
    }

    impl Rig {
        fn new() -> Self {
            let ap = MockAutopilot::new();
            let mut params = ParameterStore::new();
            SprayParams::register_defaults(&mut params).unwrap();
            let ctl = SprayController::new(&ap, ControllerConfig::default());
            Self {
                ap,
                link: MockLink::new(),
                params,
                time: MockTime::with_initial(1_000),
                ctl,
            }
        }

        fn tick(&mut self) -> Option<Resolution> {
            self.ctl.tick(&mut self.ap, &mut self.link, &self.params, &self.time)
        }
    }

    #[test]
    fn test_dispatch_sends_once_and_waits() {
        let mut rig = Rig::new();
        rig.ap.queue_script(1, CommandKind::Blanket.code(), 2.5, 1.0);

        rig.tick();
        assert_eq!(rig.link.sent_names().as_slice(), &["BLANKET"]);
        let bits = rig.link.sent[0].value.to_bits();
        assert_eq!(unpack_blanket(bits), (2500, true));
        assert_eq!(rig.link.sent[0].timestamp_ms, 1_000);
        assert_eq!(rig.ctl.ack().state(), AckState::Waiting);

        // Still pending at the autopilot: nothing new goes out
        rig.time.advance_ms(3);
        rig.tick();
        assert_eq!(rig.link.sent.len(), 1);
        assert_eq!(rig.ctl.stats().commands_sent, 1);
    }

    #[test]
    fn test_ack_completes_script_command() {
        let mut rig = Rig::new();
        rig.ap.queue_script(1, CommandKind::Spot.code(), 100.0, 0.0);
        rig.tick();

        rig.time.advance_ms(500);
        rig.link.push_inbound(RawMessage::CommandAck {
            command: 1,
            result: 0,
        });
        let res = rig.tick().unwrap();

        assert_eq!(res.outcome, AckOutcome::Success { delay_ms: 500 });
        assert_eq!(rig.ap.completed.as_slice(), &[1]);
        assert!(rig.ap.pending.is_none());
        assert_eq!(rig.ctl.stats().acks_matched, 1);
    }

    #[test]
    fn test_flow_sample_logged() {
        let mut rig = Rig::new();
        rig.link.push_inbound(RawMessage::named_float("FLOWRATE", 1.75));
        rig.tick();

        assert_eq!(rig.ctl.flow().flowrate, 1.75);
        assert_eq!(rig.ap.flow_log.len(), 1);
        assert_eq!(rig.ap.flow_log[0].0, 1_000);
    }

    #[test]
    fn test_flow_ingest_runs_outside_auto() {
        let mut rig = Rig::new();
        rig.ap.mode = FlightMode::Loiter;
        rig.tick();
        rig.link.push_inbound(RawMessage::named_float("VOLUME", 12.0));
        rig.link.push_inbound(RawMessage::named_float("FLOWRATE", 3.0));
        rig.tick();
        // One message per tick outside Auto
        assert_eq!(rig.ctl.flow().volume, 12.0);
        assert_eq!(rig.link.pending_inbound(), 1);
    }

    #[test]
    fn test_mode_change_sends_manual() {
        let mut rig = Rig::new();
        rig.ap.mode = FlightMode::Loiter;
        rig.tick();
        assert_eq!(rig.link.sent_names().as_slice(), &["MANUAL"]);
        let pause = ManualAction::PauseWithControl.code() as f32;
        assert_eq!(rig.link.sent[0].value, pause);
        assert!(rig.ap.has_text("PAUSE_CTRL"));
    }

    #[test]
    fn test_unknown_inbound_counted() {
        let mut rig = Rig::new();
        rig.link.push_inbound(RawMessage::Other { msg_id: 0 });
        rig.tick();
        assert_eq!(rig.ctl.stats().dropped_inbound, 1);
    }

    #[test]
    fn test_send_failure_left_to_timeout() {
        let mut rig = Rig::new();
        rig.link.fail_with = Some(crate::link::LinkError::NotConnected);
        rig.ap.queue_script(3, CommandKind::Spot.code(), 50.0, 0.0);
        rig.tick();

        assert_eq!(rig.ctl.stats().send_failures, 1);
        assert_eq!(rig.ctl.ack().state(), AckState::Waiting);

        rig.time.advance_ms(10_000);
        let res = rig.tick().unwrap();
        assert!(matches!(res.outcome, AckOutcome::Timeout { .. }));
        assert_eq!(rig.ap.completed.as_slice(), &[3]);
        assert_eq!(rig.ctl.stats().failsafes, 1);
    }
}
