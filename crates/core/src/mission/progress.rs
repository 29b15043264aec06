//! Mission progress tracker
//!
//! Derives the sprayer's view of the mission from the autopilot's raw
//! status and sequence index. Besides following start/stop/complete, it
//! recognises two situations the autopilot does not report directly:
//!
//! - **Resume**: the mission runs again after a stop. Spraying stays
//!   refused until the vehicle passes the item it had reached before.
//! - **Restart**: the mission jumps back to its takeoff item. The sprayer
//!   is told to restart and spraying stays refused until the first
//!   waypoint after takeoff.

use heapless::Vec;

use super::{MissionSnapshot, MissionStatus, NavCommand, RawMissionStatus};
use crate::spray::ManualAction;

/// Manual actions produced by one update
pub type ProgressActions = Vec<ManualAction, 2>;

/// Mission progress state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissionState {
    status: MissionStatus,
    raw_status: RawMissionStatus,
    last_seq: u16,
    reached_seq: u16,
}

impl MissionState {
    /// Build from the autopilot's mission at start-up.
    pub fn new(snapshot: &MissionSnapshot) -> Self {
        Self {
            status: snapshot.status.into(),
            raw_status: snapshot.status,
            last_seq: snapshot.seq,
            reached_seq: 0,
        }
    }

    pub fn status(&self) -> MissionStatus {
        self.status
    }

    /// Last raw status observed
    pub fn raw_status(&self) -> RawMissionStatus {
        self.raw_status
    }

    pub fn last_seq(&self) -> u16 {
        self.last_seq
    }

    /// Highest item the vehicle had moved past while spraying was allowed
    pub fn reached_seq(&self) -> u16 {
        self.reached_seq
    }

    /// Spray commands may only be dispatched while active
    pub fn allows_dispatch(&self) -> bool {
        self.status == MissionStatus::Active
    }

    /// Advance with this tick's snapshot; returns the manual actions to send.
    pub fn update(&mut self, snapshot: &MissionSnapshot) -> ProgressActions {
        let mut actions = ProgressActions::new();
        let before = self.status;

        if snapshot.status != self.raw_status {
            self.status = match snapshot.status {
                RawMissionStatus::Complete => MissionStatus::Completed,
                RawMissionStatus::Stopped => MissionStatus::Paused,
                RawMissionStatus::Running if self.raw_status == RawMissionStatus::Stopped => {
                    push_once(&mut actions, ManualAction::Resume);
                    MissionStatus::Resuming
                }
                RawMissionStatus::Running => MissionStatus::Active,
            };
            self.raw_status = snapshot.status;
        }

        if self.status == MissionStatus::Restarting && snapshot.prev_nav == NavCommand::Waypoint {
            self.status = MissionStatus::Active;
        } else if self.status == MissionStatus::Resuming {
            if snapshot.prev_nav == NavCommand::Takeoff {
                self.restart(&mut actions);
            } else if snapshot.seq > self.reached_seq {
                self.status = MissionStatus::Active;
            }
        }

        if snapshot.seq != self.last_seq {
            if self.status == MissionStatus::Active || self.status == MissionStatus::Completed {
                self.reached_seq = self.last_seq;
            }
            let went_back = snapshot.seq < self.last_seq;
            let at_takeoff = snapshot.prev_nav == NavCommand::Takeoff
                || snapshot.current_nav == NavCommand::Takeoff;
            if went_back && at_takeoff {
                self.restart(&mut actions);
            }
            self.last_seq = snapshot.seq;
        }

        if self.status != before {
            log_info!(
                "Mission {} -> {} (seq {}, reached {})",
                before.as_str(),
                self.status.as_str(),
                snapshot.seq,
                self.reached_seq
            );
        }

        actions
    }

    fn restart(&mut self, actions: &mut ProgressActions) {
        self.status = MissionStatus::Restarting;
        self.reached_seq = 0;
        push_once(actions, ManualAction::Restart);
    }
}

// A tick that both resumes into takeoff and rewinds the sequence still sends one Restart
fn push_once(actions: &mut ProgressActions, action: ManualAction) {
    if !actions.contains(&action) {
        let _ = actions.push(action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(
        status: RawMissionStatus,
        seq: u16,
        prev: NavCommand,
        current: NavCommand,
    ) -> MissionSnapshot {
        MissionSnapshot {
            status,
            seq,
            prev_nav: prev,
            current_nav: current,
        }
    }

    fn running(seq: u16, prev: NavCommand, current: NavCommand) -> MissionSnapshot {
        snap(RawMissionStatus::Running, seq, prev, current)
    }

    fn stopped(seq: u16) -> MissionSnapshot {
        let wp = NavCommand::Waypoint;
        snap(RawMissionStatus::Stopped, seq, wp, wp)
    }

    #[test]
    fn test_initial_state_from_snapshot() {
        let state = MissionState::new(&running(4, NavCommand::Waypoint, NavCommand::Waypoint));
        assert_eq!(state.status(), MissionStatus::Active);
        assert_eq!(state.last_seq(), 4);
        assert_eq!(state.reached_seq(), 0);

        let state = MissionState::new(&stopped(0));
        assert_eq!(state.status(), MissionStatus::Inactive);
        assert!(!state.allows_dispatch());
    }

    #[test]
    fn test_unchanged_snapshot_keeps_status() {
        let s = running(2, NavCommand::Waypoint, NavCommand::Waypoint);
        let mut state = MissionState::new(&s);
        for _ in 0..10 {
            assert!(state.update(&s).is_empty());
        }
        assert_eq!(state.status(), MissionStatus::Active);
    }

    #[test]
    fn test_start_after_complete_is_active() {
        let mut state = MissionState::new(&snap(
            RawMissionStatus::Complete,
            0,
            NavCommand::Waypoint,
            NavCommand::Waypoint,
        ));
        assert_eq!(state.status(), MissionStatus::Completed);

        let actions = state.update(&running(1, NavCommand::Takeoff, NavCommand::Waypoint));
        assert!(actions.is_empty());
        assert_eq!(state.status(), MissionStatus::Active);
    }

    #[test]
    fn test_reached_seq_follows_progress() {
        let mut state = MissionState::new(&running(1, NavCommand::Takeoff, NavCommand::Waypoint));
        state.update(&running(2, NavCommand::Waypoint, NavCommand::Waypoint));
        state.update(&running(3, NavCommand::Waypoint, NavCommand::Waypoint));
        assert_eq!(state.reached_seq(), 2);
        assert_eq!(state.last_seq(), 3);
    }

    #[test]
    fn test_stop_then_resume() {
        let mut state = MissionState::new(&running(1, NavCommand::Takeoff, NavCommand::Waypoint));
        state.update(&running(2, NavCommand::Waypoint, NavCommand::Waypoint));
        state.update(&running(3, NavCommand::Waypoint, NavCommand::Waypoint));

        assert!(state.update(&stopped(3)).is_empty());
        assert_eq!(state.status(), MissionStatus::Paused);

        // Item 3 is already past reached_seq 2
        let actions = state.update(&running(3, NavCommand::Waypoint, NavCommand::Waypoint));
        assert_eq!(actions.as_slice(), &[ManualAction::Resume]);
        assert_eq!(state.status(), MissionStatus::Active);
    }

    #[test]
    fn test_resume_waits_until_past_reached_item() {
        let mut state = MissionState::new(&running(1, NavCommand::Takeoff, NavCommand::Waypoint));
        for seq in 2..=6 {
            state.update(&running(seq, NavCommand::Waypoint, NavCommand::Waypoint));
        }
        assert_eq!(state.reached_seq(), 5);

        state.update(&stopped(6));
        // Operator rewound the mission to item 3 before restarting it
        let actions = state.update(&running(3, NavCommand::Waypoint, NavCommand::Waypoint));
        assert_eq!(actions.as_slice(), &[ManualAction::Resume]);
        assert_eq!(state.status(), MissionStatus::Resuming);
        assert!(!state.allows_dispatch());

        state.update(&running(4, NavCommand::Waypoint, NavCommand::Waypoint));
        state.update(&running(5, NavCommand::Waypoint, NavCommand::Waypoint));
        assert_eq!(state.status(), MissionStatus::Resuming);

        state.update(&running(6, NavCommand::Waypoint, NavCommand::Waypoint));
        assert_eq!(state.status(), MissionStatus::Active);
    }

    #[test]
    fn test_resume_into_takeoff_restarts() {
        let mut state = MissionState::new(&running(4, NavCommand::Waypoint, NavCommand::Waypoint));
        state.update(&stopped(4));

        let actions = state.update(&running(4, NavCommand::Takeoff, NavCommand::Waypoint));
        let expected = [ManualAction::Resume, ManualAction::Restart];
        assert_eq!(actions.as_slice(), &expected);
        assert_eq!(state.status(), MissionStatus::Restarting);
        assert_eq!(state.reached_seq(), 0);
    }

    #[test]
    fn test_rewind_to_takeoff_sends_exactly_one_restart() {
        let mut state = MissionState::new(&running(1, NavCommand::Takeoff, NavCommand::Waypoint));
        for seq in 2..=5 {
            state.update(&running(seq, NavCommand::Waypoint, NavCommand::Waypoint));
        }

        // Mission reset clears the previous nav command
        let rewind = running(1, NavCommand::Other(0), NavCommand::Takeoff);
        let actions = state.update(&rewind);
        assert_eq!(actions.as_slice(), &[ManualAction::Restart]);
        assert_eq!(state.status(), MissionStatus::Restarting);
        assert_eq!(state.reached_seq(), 0);

        // Still climbing: no further restart
        let actions = state.update(&rewind);
        assert!(actions.is_empty());
        let actions = state.update(&running(2, NavCommand::Takeoff, NavCommand::Waypoint));
        assert!(actions.is_empty());
        assert_eq!(state.status(), MissionStatus::Restarting);

        // First waypoint after takeoff reached
        state.update(&running(3, NavCommand::Waypoint, NavCommand::Waypoint));
        assert_eq!(state.status(), MissionStatus::Active);
    }

    #[test]
    fn test_resume_and_rewind_in_one_tick_sends_single_restart() {
        let mut state = MissionState::new(&running(5, NavCommand::Waypoint, NavCommand::Waypoint));
        state.update(&stopped(5));

        let actions = state.update(&running(1, NavCommand::Takeoff, NavCommand::Waypoint));
        let expected = [ManualAction::Resume, ManualAction::Restart];
        assert_eq!(actions.as_slice(), &expected);
    }

    #[test]
    fn test_rewind_without_takeoff_is_not_restart() {
        let mut state = MissionState::new(&running(5, NavCommand::Waypoint, NavCommand::Waypoint));
        let actions = state.update(&running(2, NavCommand::Waypoint, NavCommand::Waypoint));
        assert!(actions.is_empty());
        assert_eq!(state.status(), MissionStatus::Active);
    }

    #[test]
    fn test_complete() {
        let mut state = MissionState::new(&running(5, NavCommand::Waypoint, NavCommand::Waypoint));
        let wp = NavCommand::Waypoint;
        state.update(&snap(RawMissionStatus::Complete, 6, wp, NavCommand::Land));
        assert_eq!(state.status(), MissionStatus::Completed);
        assert_eq!(state.reached_seq(), 5);
    }
}
