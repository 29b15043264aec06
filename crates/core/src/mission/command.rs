//! Mission nav command ids
//!
//! Only the ids the progress tracker reasons about get their own variant;
//! everything else is carried as `Other`. Ids at or below
//! `MAV_CMD_NAV_LAST` are navigation commands in ArduPilot's convention.

/// MAV_CMD_NAV_LAST: command ids at or below this value are NAV commands
pub const MAV_CMD_NAV_LAST: u16 = 95;

/// MAV_CMD_NAV_SCRIPT_TIME: hands control to a companion script
pub const MAV_CMD_NAV_SCRIPT_TIME: u16 = 42702;

/// Navigation command of a mission item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    Waypoint,
    LoiterUnlimited,
    LoiterTurns,
    LoiterTime,
    ReturnToLaunch,
    Land,
    Takeoff,
    SplineWaypoint,
    Delay,
    /// Companion script step; this is where spray commands come from
    ScriptTime,
    Other(u16),
}

impl NavCommand {
    pub fn from_id(id: u16) -> Self {
        match id {
            16 => NavCommand::Waypoint,
            17 => NavCommand::LoiterUnlimited,
            18 => NavCommand::LoiterTurns,
            19 => NavCommand::LoiterTime,
            20 => NavCommand::ReturnToLaunch,
            21 => NavCommand::Land,
            22 => NavCommand::Takeoff,
            82 => NavCommand::SplineWaypoint,
            93 => NavCommand::Delay,
            MAV_CMD_NAV_SCRIPT_TIME => NavCommand::ScriptTime,
            other => NavCommand::Other(other),
        }
    }

    pub fn id(self) -> u16 {
        match self {
            NavCommand::Waypoint => 16,
            NavCommand::LoiterUnlimited => 17,
            NavCommand::LoiterTurns => 18,
            NavCommand::LoiterTime => 19,
            NavCommand::ReturnToLaunch => 20,
            NavCommand::Land => 21,
            NavCommand::Takeoff => 22,
            NavCommand::SplineWaypoint => 82,
            NavCommand::Delay => 93,
            NavCommand::ScriptTime => MAV_CMD_NAV_SCRIPT_TIME,
            NavCommand::Other(id) => id,
        }
    }

    /// Whether this id drives navigation (as opposed to a DO command)
    pub fn is_nav(self) -> bool {
        self.id() <= MAV_CMD_NAV_LAST || self == NavCommand::ScriptTime
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NavCommand::Waypoint => "WAYPOINT",
            NavCommand::LoiterUnlimited => "LOITER_UNLIM",
            NavCommand::LoiterTurns => "LOITER_TURNS",
            NavCommand::LoiterTime => "LOITER_TIME",
            NavCommand::ReturnToLaunch => "RTL",
            NavCommand::Land => "LAND",
            NavCommand::Takeoff => "TAKEOFF",
            NavCommand::SplineWaypoint => "SPLINE_WAYPOINT",
            NavCommand::Delay => "DELAY",
            NavCommand::ScriptTime => "SCRIPT_TIME",
            NavCommand::Other(_) => "OTHER",
        }
    }
}

impl From<u16> for NavCommand {
    fn from(id: u16) -> Self {
        NavCommand::from_id(id)
    }
}
