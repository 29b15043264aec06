//! Flight modes and mode/arm transition handling
//!
//! - [`FlightMode`]: closed enumeration of autopilot mode ids
//! - [`ModeArmWatcher`]: turns mode and arm transitions into sprayer
//!   permission commands

mod flight_mode;
mod watcher;

pub use flight_mode::{FlightMode, UnknownMode};
pub use watcher::{ModeArmWatcher, ModeEvent};
