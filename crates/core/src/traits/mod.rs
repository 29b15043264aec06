//! Core traits for platform-agnostic spray control.
//!
//! - Trait definitions are pure and have no feature gates
//! - Mock implementations are always available for host testing
//! - Platform implementations live in the runtime crates

pub mod time;

pub use time::{MockTime, TimeSource};
