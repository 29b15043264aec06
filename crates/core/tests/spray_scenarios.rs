//! End-to-end controller scenarios on mock collaborators

use agrispray_core::controller::DISARM_TEXT;
use agrispray_core::link::{MockLink, RawMessage};
use agrispray_core::mission::MissionStatus;
use agrispray_core::mission::NavCommand::{Other, Takeoff, Waypoint};
use agrispray_core::mission::RawMissionStatus::{Running, Stopped};
use agrispray_core::mode::FlightMode;
use agrispray_core::parameters::{ParamValue, ParameterStore, SprayParams, PARAM_FS_ACTION};
use agrispray_core::spray::{
    unpack_blanket, AckOutcome, AckState, CommandKind, ManualAction, Resolution,
};
use agrispray_core::traits::MockTime;
use agrispray_core::vehicle::MockAutopilot;
use agrispray_core::{ControllerConfig, SprayController};

const T0: u64 = 50_000;

struct Bench {
    ap: MockAutopilot,
    link: MockLink,
    params: ParameterStore,
    time: MockTime,
    ctl: SprayController,
}

impl Bench {
    fn new() -> Self {
        Self::with_autopilot(MockAutopilot::new())
    }

    fn with_autopilot(ap: MockAutopilot) -> Self {
        let mut params = ParameterStore::new();
        SprayParams::register_defaults(&mut params).unwrap();
        let ctl = SprayController::new(&ap, ControllerConfig::default());
        Self {
            ap,
            link: MockLink::new(),
            params,
            time: MockTime::with_initial(T0),
            ctl,
        }
    }

    fn fs_action(mut self, action: i32) -> Self {
        self.params.set(PARAM_FS_ACTION, ParamValue::Int(action)).unwrap();
        self
    }

    fn tick(&mut self) -> Option<Resolution> {
        self.ctl.tick(&mut self.ap, &mut self.link, &self.params, &self.time)
    }

    fn tick_at(&mut self, ms: u64) -> Option<Resolution> {
        self.time.set_ms(ms);
        self.tick()
    }

    fn ack(&mut self, kind: CommandKind) {
        self.link.push_inbound(RawMessage::CommandAck {
            command: kind.code(),
            result: 0,
        });
    }

    fn issued_at(&self) -> Option<u64> {
        self.ctl.ack().outstanding().map(|r| r.issued_at_ms)
    }

    fn manual_sent(&self) -> Vec<f32> {
        self.link
            .sent
            .iter()
            .filter(|m| m.name == "MANUAL")
            .map(|m| m.value)
            .collect()
    }
}

#[test]
fn blanket_rate_survives_the_wire() {
    let cases = [
        (0.0, false, 0u16),
        (1.25, true, 1250),
        (0.5, false, 500),
        (65.535, true, 65535),
        (80.0, true, 65535),
    ];
    for (rate, enabled, expected) in cases {
        let mut bench = Bench::new();
        let arg2 = if enabled { 1.0 } else { 0.0 };
        bench.ap.queue_script(1, CommandKind::Blanket.code(), rate, arg2);
        bench.tick();

        let sent = bench.link.sent.last().unwrap();
        assert_eq!(sent.name, "BLANKET");
        assert_eq!(unpack_blanket(sent.value.to_bits()), (expected, enabled));
    }
}

#[test]
fn new_script_command_waits_for_outstanding_request() {
    let mut bench = Bench::new();
    bench.ap.queue_script(1, CommandKind::Spot.code(), 10.0, 0.0);
    bench.tick();
    assert_eq!(bench.link.sent.len(), 1);

    // A different id shows up while the first is unanswered
    bench.ap.queue_script(2, CommandKind::Spot.code(), 20.0, 0.0);
    for step in 1..=20 {
        bench.tick_at(T0 + step * 3);
    }
    assert_eq!(bench.link.sent.len(), 1);
    assert_eq!(bench.ctl.ack().outstanding().map(|r| r.id), Some(1));

    // Ack for the first unblocks; the second goes out on the following tick
    bench.ack(CommandKind::Spot);
    let res = bench.tick_at(T0 + 100).unwrap();
    assert_eq!(res.request.id, 1);
    assert_eq!(bench.link.sent.len(), 1);

    bench.tick_at(T0 + 103);
    assert_eq!(bench.link.sent.len(), 2);
    assert_eq!(bench.link.sent[1].value, 20.0);
    assert_eq!(bench.ctl.ack().outstanding().map(|r| r.id), Some(2));
}

#[test]
fn ack_at_soft_threshold_is_success() {
    let mut bench = Bench::new().fs_action(1);
    bench.ap.queue_script(1, CommandKind::Spot.code(), 10.0, 0.0);
    bench.tick();

    bench.ack(CommandKind::Spot);
    let res = bench.tick_at(T0 + 3_500).unwrap();
    assert_eq!(res.outcome, AckOutcome::Success { delay_ms: 3_500 });
    assert!(bench.ap.mode_requests.is_empty());
    assert_eq!(bench.ap.completed, [1]);
}

#[test]
fn ack_past_soft_threshold_triggers_failsafe() {
    let mut bench = Bench::new().fs_action(1);
    bench.ap.queue_script(1, CommandKind::Spot.code(), 10.0, 0.0);
    bench.tick();

    bench.ack(CommandKind::Spot);
    let res = bench.tick_at(T0 + 3_501).unwrap();
    assert_eq!(res.outcome, AckOutcome::SlowAck { delay_ms: 3_501 });
    assert_eq!(bench.ap.mode_requests, [FlightMode::Rtl]);
    assert_eq!(bench.ap.completed, [1]);
    // Slow acks are silent with the default notify mask
    assert!(bench.ap.texts.is_empty());
}

#[test]
fn hard_timeout_boundary() {
    let mut bench = Bench::new().fs_action(3);
    bench.ap.queue_script(1, CommandKind::Blanket.code(), 1.0, 1.0);
    bench.tick();

    assert!(bench.tick_at(T0 + 9_999).is_none());
    assert_eq!(bench.ctl.ack().state(), AckState::Waiting);
    assert!(bench.ap.completed.is_empty());

    let res = bench.tick_at(T0 + 10_000).unwrap();
    assert_eq!(res.outcome, AckOutcome::Timeout { elapsed_ms: 10_000 });
    assert_eq!(bench.ap.mode_requests, [FlightMode::Land]);
    assert_eq!(bench.ap.disarm_count, 1);
    assert_eq!(bench.ap.completed, [1]);
    assert!(bench.ap.has_text("timeout"));
    assert_eq!(bench.ctl.stats().failsafes, 1);
}

#[test]
fn mismatched_ack_is_ignored() {
    let mut bench = Bench::new();
    bench.ap.queue_script(1, CommandKind::Spot.code(), 10.0, 0.0);
    bench.tick();

    bench.ack(CommandKind::Blanket);
    assert!(bench.tick_at(T0 + 10).is_none());
    assert_eq!(bench.ctl.ack().state(), AckState::Waiting);
    assert_eq!(bench.ctl.stats().dropped_inbound, 1);
}

#[test]
fn mode_change_table() {
    let cases = [
        (FlightMode::Loiter, Some(ManualAction::PauseWithControl)),
        (FlightMode::AltHold, Some(ManualAction::PauseWithControl)),
        (FlightMode::Rtl, Some(ManualAction::Pause)),
        (FlightMode::Land, Some(ManualAction::Pause)),
        (FlightMode::Stabilize, Some(ManualAction::Pause)),
        (FlightMode::Guided, Some(ManualAction::Pause)),
        (FlightMode::PosHold, Some(ManualAction::Pause)),
    ];
    for (mode, expected) in cases {
        let mut bench = Bench::new();
        bench.ap.mode = mode;
        bench.tick();
        let expected: Vec<f32> = expected.map(|a| a.code() as f32).into_iter().collect();
        assert_eq!(bench.manual_sent(), expected, "mode {}", mode);
    }

    // Back into Auto sends nothing
    let mut bench = Bench::new();
    bench.ap.mode = FlightMode::Loiter;
    bench.tick();
    bench.link.clear_sent();
    bench.ap.mode = FlightMode::Auto;
    bench.tick();
    assert!(bench.manual_sent().is_empty());
}

#[test]
fn mode_change_while_disarmed_is_quiet() {
    let mut ap = MockAutopilot::new();
    ap.armed = false;
    let mut bench = Bench::with_autopilot(ap);
    bench.ap.mode = FlightMode::Loiter;
    bench.tick();
    assert!(bench.link.sent.is_empty());
}

#[test]
fn rewind_to_takeoff_restarts_sprayer_once() {
    let mut ap = MockAutopilot::new();
    ap.set_mission(Running, 1, Takeoff, Waypoint);
    let mut bench = Bench::with_autopilot(ap);

    for seq in 2..=6 {
        bench.ap.set_mission(Running, seq, Waypoint, Waypoint);
        bench.tick();
    }
    assert!(bench.manual_sent().is_empty());

    bench.ap.set_mission(Running, 1, Other(0), Takeoff);
    for _ in 0..5 {
        bench.tick();
    }
    assert_eq!(bench.manual_sent(), [ManualAction::Restart.code() as f32]);
    assert_eq!(bench.ctl.mission().status(), MissionStatus::Restarting);

    // Spray commands are refused until the first waypoint after takeoff
    bench.ap.queue_script(9, CommandKind::Spot.code(), 5.0, 0.0);
    bench.tick();
    assert_eq!(bench.ap.completed, [9]);
    assert_eq!(bench.ctl.stats().refusals, 1);

    bench.ap.set_mission(Running, 2, Takeoff, Waypoint);
    bench.tick();
    bench.ap.set_mission(Running, 3, Waypoint, Waypoint);
    bench.tick();
    assert_eq!(bench.ctl.mission().status(), MissionStatus::Active);
}

#[test]
fn stop_and_resume_sends_resume() {
    let mut bench = Bench::new();
    bench.ap.set_mission(Stopped, 0, Takeoff, Waypoint);
    bench.tick();
    assert_eq!(bench.ctl.mission().status(), MissionStatus::Paused);

    bench.ap.set_mission(Running, 0, Waypoint, Waypoint);
    bench.tick();
    assert_eq!(bench.manual_sent(), [ManualAction::Resume.code() as f32]);
}

#[test]
fn resume_restarts_hard_timeout() {
    let mut bench = Bench::new().fs_action(1);
    bench.ap.queue_script(1, CommandKind::Spot.code(), 10.0, 0.0);
    bench.tick();
    assert_eq!(bench.issued_at(), Some(T0));

    bench.ap.set_mission(Stopped, 0, Takeoff, Waypoint);
    bench.tick_at(T0 + 5_000);
    bench.ap.set_mission(Running, 0, Waypoint, Waypoint);
    assert_eq!(bench.tick_at(T0 + 8_000), None);
    assert_eq!(bench.manual_sent(), [ManualAction::Resume.code() as f32]);
    assert_eq!(bench.issued_at(), Some(T0 + 8_000));

    // Ten seconds after the first send, but only two after the Resume
    assert_eq!(bench.tick_at(T0 + 10_000), None);
    assert_eq!(bench.tick_at(T0 + 17_999), None);
    assert!(bench.ap.mode_requests.is_empty());

    let res = bench.tick_at(T0 + 18_000).unwrap();
    assert_eq!(res.outcome, AckOutcome::Timeout { elapsed_ms: 10_000 });
    assert_eq!(bench.ap.mode_requests, [FlightMode::Rtl]);
    assert_eq!(bench.ap.completed, [1]);
}

#[test]
fn disarm_short_circuits_dispatch() {
    let mut bench = Bench::new();
    bench.ap.queue_script(1, CommandKind::Spot.code(), 10.0, 0.0);
    bench.ap.armed = false;
    bench.link.push_inbound(RawMessage::named_float("VOLUME", 3.0));

    assert!(bench.tick().is_none());
    assert!(bench.link.sent.is_empty());
    assert!(bench.ap.completed.is_empty());
    assert!(bench.ap.has_text(DISARM_TEXT));
    // Flow ingest still ran
    assert_eq!(bench.ctl.flow().volume, 3.0);
}

#[test]
fn disarm_does_not_resolve_outstanding_request() {
    let mut bench = Bench::new();
    bench.ap.queue_script(1, CommandKind::Spot.code(), 10.0, 0.0);
    bench.tick();

    bench.ap.armed = false;
    assert!(bench.tick_at(T0 + 20_000).is_none());
    assert_eq!(bench.ctl.ack().state(), AckState::Waiting);
}

#[test]
fn commands_refused_while_paused() {
    let mut bench = Bench::new();
    bench.ap.set_mission(Stopped, 0, Takeoff, Waypoint);
    bench.tick();

    bench.ap.queue_script(4, CommandKind::Blanket.code(), 2.0, 1.0);
    bench.tick();
    assert!(bench.link.sent.is_empty());
    assert_eq!(bench.ap.completed, [4]);
    assert_eq!(bench.ctl.ack().state(), AckState::Idle);
    assert_eq!(bench.ctl.last_script_id(), None);
}

#[test]
fn malformed_script_command_refused() {
    let mut bench = Bench::new();
    bench.ap.queue_script(5, 77, 1.0, 0.0);
    bench.tick();
    assert!(bench.link.sent.is_empty());
    assert_eq!(bench.ap.completed, [5]);
    assert_eq!(bench.ctl.stats().refusals, 1);
}

#[test]
fn no_dispatch_outside_auto() {
    let mut bench = Bench::new();
    bench.ap.mode = FlightMode::Guided;
    bench.tick();
    bench.link.clear_sent();

    bench.ap.queue_script(1, CommandKind::Spot.code(), 10.0, 0.0);
    bench.tick();
    assert!(bench.link.sent.is_empty());
    assert!(bench.ap.completed.is_empty());
    assert!(bench.ap.pending.is_some());
}
