//! Mode/arm watcher
//!
//! Compares the autopilot's mode and arm state with the previous tick and
//! decides which sprayer permission command, if any, the transition implies.

use super::FlightMode;
use crate::spray::ManualAction;

/// Outcome of observing one tick's mode and arm state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeEvent {
    /// No transition that concerns the sprayer
    Steady,
    /// Vehicle went from armed to disarmed; mode handling and mission
    /// dispatch are skipped for the rest of the tick
    Disarmed,
    /// Mode changed while armed
    ModeChanged {
        from: FlightMode,
        to: FlightMode,
        /// Permission command for the sprayer; `None` when entering the
        /// mission mode, where dispatch takes over
        action: Option<ManualAction>,
    },
}

/// Tracks previous mode and arm snapshots
#[derive(Debug, Clone, Copy)]
pub struct ModeArmWatcher {
    prev_mode: FlightMode,
    prev_armed: bool,
}

impl ModeArmWatcher {
    /// Start from the autopilot's current state so the first tick sees no transition.
    pub fn new(mode: FlightMode, armed: bool) -> Self {
        Self {
            prev_mode: mode,
            prev_armed: armed,
        }
    }

    /// Observe the current state and update the snapshots.
    pub fn observe(&mut self, mode: FlightMode, armed: bool) -> ModeEvent {
        let prev_mode = self.prev_mode;
        let was_armed = self.prev_armed;
        self.prev_mode = mode;
        self.prev_armed = armed;

        if was_armed && !armed {
            return ModeEvent::Disarmed;
        }

        if mode == prev_mode || !armed {
            return ModeEvent::Steady;
        }

        let action = if mode.is_mission_mode() {
            None
        } else if mode.allows_pilot_spray() {
            Some(ManualAction::PauseWithControl)
        } else {
            Some(ManualAction::Pause)
        };

        ModeEvent::ModeChanged {
            from: prev_mode,
            to: mode,
            action,
        }
    }

    /// Mode seen on the last observation
    pub fn mode(&self) -> FlightMode {
        self.prev_mode
    }

    /// Arm state seen on the last observation
    pub fn armed(&self) -> bool {
        self.prev_armed
    }
}
