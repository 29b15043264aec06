//! Mission state types

use super::NavCommand;

/// Mission status as reported by the autopilot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RawMissionStatus {
    Stopped = 0,
    Running = 1,
    Complete = 2,
}

impl RawMissionStatus {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(RawMissionStatus::Stopped),
            1 => Some(RawMissionStatus::Running),
            2 => Some(RawMissionStatus::Complete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RawMissionStatus::Stopped => "STOPPED",
            RawMissionStatus::Running => "RUNNING",
            RawMissionStatus::Complete => "COMPLETE",
        }
    }
}

/// One tick's view of the autopilot mission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissionSnapshot {
    pub status: RawMissionStatus,
    /// Current mission item index
    pub seq: u16,
    /// Previously executed nav command
    pub prev_nav: NavCommand,
    /// Nav command currently executing
    pub current_nav: NavCommand,
}

/// Mission status as seen by the sprayer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissionStatus {
    #[default]
    Inactive,
    /// Running; spray commands are dispatched
    Active,
    /// Stopped by the autopilot
    Paused,
    /// Running again after a stop, waiting to pass the last reached item
    Resuming,
    Completed,
    /// Mission jumped back to takeoff; waiting for the first waypoint
    Restarting,
}

impl MissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissionStatus::Inactive => "INACTIVE",
            MissionStatus::Active => "ACTIVE",
            MissionStatus::Paused => "PAUSED",
            MissionStatus::Resuming => "RESUMING",
            MissionStatus::Completed => "COMPLETED",
            MissionStatus::Restarting => "RESTARTING",
        }
    }
}

impl From<RawMissionStatus> for MissionStatus {
    fn from(raw: RawMissionStatus) -> Self {
        match raw {
            RawMissionStatus::Running => MissionStatus::Active,
            RawMissionStatus::Complete => MissionStatus::Completed,
            RawMissionStatus::Stopped => MissionStatus::Inactive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_status_mapping() {
        let cases = [
            (RawMissionStatus::Running, MissionStatus::Active),
            (RawMissionStatus::Complete, MissionStatus::Completed),
            (RawMissionStatus::Stopped, MissionStatus::Inactive),
        ];
        for (raw, expected) in cases {
            assert_eq!(MissionStatus::from(raw), expected, "{}", raw.as_str());
        }
    }

    #[test]
    fn test_raw_status_codes() {
        let running = RawMissionStatus::from_code(1);
        assert_eq!(running, Some(RawMissionStatus::Running));
        assert_eq!(RawMissionStatus::from_code(3), None);
    }
}
