//! Mission tracking
//!
//! The autopilot owns the mission. This module only classifies its nav
//! commands and derives, tick by tick, whether spray commands may be
//! dispatched.

pub mod command;
pub mod progress;
pub mod state;

pub use command::{NavCommand, MAV_CMD_NAV_LAST, MAV_CMD_NAV_SCRIPT_TIME};
pub use progress::{MissionState, ProgressActions};
pub use state::{MissionSnapshot, MissionStatus, RawMissionStatus};
