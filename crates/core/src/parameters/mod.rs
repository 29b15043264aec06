//! Parameter management types
//!
//! Parameter storage is an external collaborator of the controller; this
//! module provides the in-memory `ParameterStore` used on host and in tests,
//! plus the spray parameter definitions.

pub mod error;
pub mod failsafe;
pub mod storage;

pub use error::ParameterError;
pub use failsafe::{FailsafeAction, NotifyFlags, SprayParams, PARAM_FS_ACTION, PARAM_NOTIFY};
pub use storage::{ParamFlags, ParamSource, ParamValue, ParameterStore, MAX_PARAMS, PARAM_NAME_LEN};
