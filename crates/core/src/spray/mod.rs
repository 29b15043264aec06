//! Sprayer protocol
//!
//! - [`command`]: actuator commands and conversion from script-time commands
//! - [`codec`]: bit-exact payload encoding and inbound message decoding
//! - [`ack`]: single in-flight request tracking with soft/hard timeouts
//! - [`flow`]: last-known flow telemetry

pub mod ack;
pub mod codec;
pub mod command;
pub mod flow;

pub use ack::{
    apply_failsafe, AckOutcome, AckRecord, AckResult, AckState, AckTimeouts, AckTracker,
    ActuatorRequest, RequestPending, Resolution,
};
pub use codec::{
    pack_blanket, unpack_blanket, CommandCodec, FlowSample, InboundEvent, KindMap, MAX_RATE_LPM,
    TAG_BLANKET, TAG_FLOWRATE, TAG_MANUAL, TAG_SPOT, TAG_VOLUME,
};
pub use command::{ActuatorCommand, CommandError, CommandKind, ManualAction, ScriptCommand};
pub use flow::{FlowIngest, FlowReading};
