//! Spray Failsafe Parameter Definitions
//!
//! # Parameters
//!
//! - `SPR_FS_ACTION` - Vehicle action when the sprayer does not confirm a
//!   command in time (0=Continue, 1=RTL, 2=Loiter, 3=Land and disarm)
//! - `SPR_NOTIFY` - Bitmask of ack outcomes announced to the GCS
//!   (1=success, 2=slow ack, 4=timeout)
//!
//! Both are read from the store at each evaluation, so a change made by the
//! operator mid-mission applies to the next resolved command.

use bitflags::bitflags;

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamSource, ParamValue, ParameterStore};

/// Parameter name for the failsafe action
pub const PARAM_FS_ACTION: &str = "SPR_FS_ACTION";

/// Parameter name for the notification policy
pub const PARAM_NOTIFY: &str = "SPR_NOTIFY";

/// Vehicle action taken when an actuator command fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailsafeAction {
    /// No vehicle action, mission proceeds to the next item
    #[default]
    ContinueMission = 0,
    /// Switch to RTL
    ReturnToLaunch = 1,
    /// Switch to Loiter
    Loiter = 2,
    /// Switch to Land, then disarm
    LandAndDisarm = 3,
}

impl FailsafeAction {
    /// Convert a raw parameter value; unknown values fall back to `ContinueMission`.
    pub fn from_param(value: i32) -> Self {
        match value {
            1 => FailsafeAction::ReturnToLaunch,
            2 => FailsafeAction::Loiter,
            3 => FailsafeAction::LandAndDisarm,
            _ => FailsafeAction::ContinueMission,
        }
    }

    /// Variant name as a static string (usable with defmt on embedded)
    pub fn as_str(&self) -> &'static str {
        match self {
            FailsafeAction::ContinueMission => "CONTINUE",
            FailsafeAction::ReturnToLaunch => "RTL",
            FailsafeAction::Loiter => "LOITER",
            FailsafeAction::LandAndDisarm => "LAND",
        }
    }
}

bitflags! {
    /// Ack outcomes that produce a GCS status text
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NotifyFlags: u8 {
        /// Command acknowledged within the soft threshold
        const SUCCESS = 0b001;
        /// Command acknowledged after the soft threshold
        const SLOW_ACK = 0b010;
        /// No acknowledgment before the hard timeout
        const TIMEOUT = 0b100;
    }
}

impl Default for NotifyFlags {
    fn default() -> Self {
        NotifyFlags::TIMEOUT
    }
}

/// Spray parameters loaded from a parameter source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SprayParams {
    /// Failsafe action
    pub fs_action: FailsafeAction,
    /// Notification policy
    pub notify: NotifyFlags,
}

impl SprayParams {
    /// Register spray parameters with default values
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        store.register(
            PARAM_FS_ACTION,
            ParamValue::Int(FailsafeAction::default() as i32),
            ParamFlags::empty(),
        )?;
        store.register(
            PARAM_NOTIFY,
            ParamValue::Int(NotifyFlags::default().bits() as i32),
            ParamFlags::empty(),
        )?;
        Ok(())
    }

    /// Load spray parameters, using defaults for anything missing
    pub fn from_source<P: ParamSource + ?Sized>(source: &P) -> Self {
        let fs_action = source
            .param_int(PARAM_FS_ACTION)
            .map(FailsafeAction::from_param)
            .unwrap_or_default();

        let notify = source
            .param_int(PARAM_NOTIFY)
            .map(|bits| NotifyFlags::from_bits_truncate(bits as u8))
            .unwrap_or_default();

        Self { fs_action, notify }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_defaults() {
        let mut store = ParameterStore::new();
        SprayParams::register_defaults(&mut store).unwrap();

        assert_eq!(store.get(PARAM_FS_ACTION), Some(ParamValue::Int(0)));
        assert_eq!(store.get(PARAM_NOTIFY), Some(ParamValue::Int(4)));
    }

    #[test]
    fn test_from_source_defaults() {
        let mut store = ParameterStore::new();
        SprayParams::register_defaults(&mut store).unwrap();

        let params = SprayParams::from_source(&store);
        assert_eq!(params.fs_action, FailsafeAction::ContinueMission);
        assert_eq!(params.notify, NotifyFlags::TIMEOUT);
    }

    #[test]
    fn test_from_source_empty_store() {
        let store = ParameterStore::new();
        assert_eq!(SprayParams::from_source(&store), SprayParams::default());
    }

    #[test]
    fn test_from_source_custom_values() {
        let mut store = ParameterStore::new();
        SprayParams::register_defaults(&mut store).unwrap();
        store.set(PARAM_FS_ACTION, ParamValue::Int(3)).unwrap();
        store.set(PARAM_NOTIFY, ParamValue::Int(7)).unwrap();

        let params = SprayParams::from_source(&store);
        assert_eq!(params.fs_action, FailsafeAction::LandAndDisarm);
        assert_eq!(params.notify, NotifyFlags::all());
    }

    #[test]
    fn test_unknown_action_continues_mission() {
        let fallback = FailsafeAction::ContinueMission;
        assert_eq!(FailsafeAction::from_param(9), fallback);
        assert_eq!(FailsafeAction::from_param(-1), fallback);
        assert_eq!(FailsafeAction::from_param(2), FailsafeAction::Loiter);
    }
}
