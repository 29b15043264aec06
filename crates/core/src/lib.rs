//! agrispray_core - Pure no_std spray mission logic
//!
//! This crate contains the platform-agnostic state machines that coordinate
//! an autopilot mission with a remote liquid-dispensing actuator. Everything
//! here can be tested on host; the autopilot, the message link, the clock and
//! parameter storage are injected through traits.
//!
//! # Design Principles
//!
//! - **Pure no_std**: std is only linked for unit tests
//! - **Single owner**: all runtime state lives in [`controller::SprayController`]
//! - **Trait abstractions**: collaborators injected via [`vehicle::Autopilot`],
//!   [`link::SprayLink`], [`traits::TimeSource`] and [`parameters::ParamSource`]
//!
//! # Modules
//!
//! - [`traits`]: Time source abstraction and mock clock
//! - [`logging`]: `log_*!` macros (defmt, tracing or println backends)
//! - [`parameters`]: Parameter store and spray parameters (failsafe action, notify policy)
//! - [`mode`]: Flight modes and the mode/arm watcher
//! - [`mission`]: Nav command ids and the mission progress tracker
//! - [`spray`]: Actuator commands, payload codec, ack tracker, flow ingest
//! - [`link`]: Message link abstraction between controller and actuator
//! - [`vehicle`]: Autopilot collaborator interface and mock autopilot
//! - [`scheduler`]: Task timing metadata and statistics
//! - [`controller`]: Per-tick sequencing of all of the above

#![cfg_attr(not(test), no_std)]

#[macro_use]
pub mod logging;

pub mod controller;
pub mod link;
pub mod mission;
pub mod mode;
pub mod parameters;
pub mod scheduler;
pub mod spray;
pub mod traits;
pub mod vehicle;

pub use controller::{ControllerConfig, SprayController, TickStats};
