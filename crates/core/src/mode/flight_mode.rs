//! Flight mode identifiers
//!
//! Numbering follows the ArduCopter `custom_mode` values reported in
//! HEARTBEAT, converted at the autopilot boundary.

use core::fmt;

/// Autopilot flight mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FlightMode {
    Stabilize = 0,
    Acro = 1,
    AltHold = 2,
    Auto = 3,
    Guided = 4,
    Loiter = 5,
    Rtl = 6,
    Circle = 7,
    Land = 9,
    Drift = 11,
    Sport = 13,
    Flip = 14,
    AutoTune = 15,
    PosHold = 16,
    Brake = 17,
    Throw = 18,
    AvoidAdsb = 19,
    GuidedNoGps = 20,
    SmartRtl = 21,
    FlowHold = 22,
    Follow = 23,
    ZigZag = 24,
    SystemId = 25,
    Autorotate = 26,
    AutoRtl = 27,
    Turtle = 28,
}

/// Raw mode id with no `FlightMode` counterpart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMode(pub u32);

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown flight mode id {}", self.0)
    }
}

impl FlightMode {
    /// Raw mode id
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Mode in which the autopilot executes the uploaded mission.
    pub fn is_mission_mode(self) -> bool {
        self == FlightMode::Auto
    }

    /// Manual-assist modes in which the pilot keeps control of the sprayer
    /// after the mission is interrupted.
    pub fn allows_pilot_spray(self) -> bool {
        matches!(self, FlightMode::Loiter | FlightMode::AltHold)
    }

    /// Mode name as a static string (usable with defmt on embedded)
    pub fn as_str(self) -> &'static str {
        match self {
            FlightMode::Stabilize => "STABILIZE",
            FlightMode::Acro => "ACRO",
            FlightMode::AltHold => "ALT_HOLD",
            FlightMode::Auto => "AUTO",
            FlightMode::Guided => "GUIDED",
            FlightMode::Loiter => "LOITER",
            FlightMode::Rtl => "RTL",
            FlightMode::Circle => "CIRCLE",
            FlightMode::Land => "LAND",
            FlightMode::Drift => "DRIFT",
            FlightMode::Sport => "SPORT",
            FlightMode::Flip => "FLIP",
            FlightMode::AutoTune => "AUTOTUNE",
            FlightMode::PosHold => "POSHOLD",
            FlightMode::Brake => "BRAKE",
            FlightMode::Throw => "THROW",
            FlightMode::AvoidAdsb => "AVOID_ADSB",
            FlightMode::GuidedNoGps => "GUIDED_NOGPS",
            FlightMode::SmartRtl => "SMART_RTL",
            FlightMode::FlowHold => "FLOWHOLD",
            FlightMode::Follow => "FOLLOW",
            FlightMode::ZigZag => "ZIGZAG",
            FlightMode::SystemId => "SYSTEMID",
            FlightMode::Autorotate => "AUTOROTATE",
            FlightMode::AutoRtl => "AUTO_RTL",
            FlightMode::Turtle => "TURTLE",
        }
    }
}

impl TryFrom<u32> for FlightMode {
    type Error = UnknownMode;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        let mode = match id {
            0 => FlightMode::Stabilize,
            1 => FlightMode::Acro,
            2 => FlightMode::AltHold,
            3 => FlightMode::Auto,
            4 => FlightMode::Guided,
            5 => FlightMode::Loiter,
            6 => FlightMode::Rtl,
            7 => FlightMode::Circle,
            9 => FlightMode::Land,
            11 => FlightMode::Drift,
            13 => FlightMode::Sport,
            14 => FlightMode::Flip,
            15 => FlightMode::AutoTune,
            16 => FlightMode::PosHold,
            17 => FlightMode::Brake,
            18 => FlightMode::Throw,
            19 => FlightMode::AvoidAdsb,
            20 => FlightMode::GuidedNoGps,
            21 => FlightMode::SmartRtl,
            22 => FlightMode::FlowHold,
            23 => FlightMode::Follow,
            24 => FlightMode::ZigZag,
            25 => FlightMode::SystemId,
            26 => FlightMode::Autorotate,
            27 => FlightMode::AutoRtl,
            28 => FlightMode::Turtle,
            other => return Err(UnknownMode(other)),
        };
        Ok(mode)
    }
}

impl fmt::Display for FlightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
