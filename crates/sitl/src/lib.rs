//! agrispray_sitl - host runtime for the spray controller
//!
//! Runs `agrispray_core::SprayController` on a tokio interval against a
//! simulated autopilot and either a simulated sprayer (in-process loopback)
//! or a real one over MAVLink UDP.

pub mod actuator;
pub mod autopilot;
pub mod clock;
pub mod config;
pub mod error;
pub mod link;
pub mod logging;
pub mod runner;

pub use actuator::{ActuatorStats, SimActuator};
pub use autopilot::{FlowLog, FlowRecord, SimAutopilot};
pub use clock::MonotonicClock;
pub use config::{
    ActuatorConfig, LinkConfig, MissionItem, SitlConfig, SprayKind, SprayStep, Transport,
};
pub use error::{Result, SitlError};
pub use link::{loopback, ActuatorPort, LoopbackLink, MavlinkUdpLink};
pub use runner::{RunSummary, Runner};
