//! Actuator commands
//!
//! The mission sequencer asks for sprayer actions through script-time
//! commands `(id, cmd, arg1, arg2)`; `cmd` carries a [`CommandKind`] code:
//!
//! | cmd | command | arg1 | arg2 |
//! |-----|---------|------|------|
//! | 0 | Manual | action code | - |
//! | 1 | Spot | volume (ml) | - |
//! | 2 | Blanket | rate (l/min) | enabled (non-zero) |

use core::fmt;

/// Kind of actuator command; also the correlation key for acknowledgments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Manual = 0,
    Spot = 1,
    Blanket = 2,
}

impl CommandKind {
    /// All kinds, in code order
    pub const ALL: [CommandKind; 3] =
        [CommandKind::Manual, CommandKind::Spot, CommandKind::Blanket];

    /// Convert a script-time `cmd` code
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(CommandKind::Manual),
            1 => Some(CommandKind::Spot),
            2 => Some(CommandKind::Blanket),
            _ => None,
        }
    }

    /// Script-time `cmd` code
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Kind name as a static string (usable with defmt on embedded)
    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::Manual => "MANUAL",
            CommandKind::Spot => "SPOT",
            CommandKind::Blanket => "BLANKET",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Manual-control permission sent to the sprayer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManualAction {
    /// Stop spraying
    Pause = 0,
    /// Stop the mission spray pattern, hand the sprayer to the pilot
    PauseWithControl = 1,
    /// Continue the interrupted spray pattern
    Resume = 2,
    /// Mission restarted from takeoff; reset the spray pattern
    Restart = 3,
}

impl ManualAction {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(ManualAction::Pause),
            1 => Some(ManualAction::PauseWithControl),
            2 => Some(ManualAction::Resume),
            3 => Some(ManualAction::Restart),
            _ => None,
        }
    }

    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Action name as a static string (usable with defmt on embedded)
    pub fn as_str(self) -> &'static str {
        match self {
            ManualAction::Pause => "PAUSE",
            ManualAction::PauseWithControl => "PAUSE_CTRL",
            ManualAction::Resume => "RESUME",
            ManualAction::Restart => "RESTART",
        }
    }
}

/// Command for the remote sprayer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorCommand {
    Manual(ManualAction),
    /// Dispense a fixed volume at the current position
    Spot { volume_ml: f32 },
    /// Continuous spraying at a fixed rate
    Blanket { rate_lpm: f32, enabled: bool },
}

impl ActuatorCommand {
    pub fn kind(&self) -> CommandKind {
        match self {
            ActuatorCommand::Manual(_) => CommandKind::Manual,
            ActuatorCommand::Spot { .. } => CommandKind::Spot,
            ActuatorCommand::Blanket { .. } => CommandKind::Blanket,
        }
    }
}

/// Script-time command pending at the autopilot's mission sequencer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptCommand {
    /// Correlation id; completing it lets the mission continue
    pub id: u16,
    /// [`CommandKind`] code
    pub cmd: u16,
    pub arg1: f32,
    pub arg2: f32,
}

/// A script-time command that cannot be turned into an actuator command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandError {
    /// `cmd` is not a known [`CommandKind`] code
    UnknownKind(u16),
    /// Manual action code out of range
    UnknownAction(i32),
    /// Spot volume negative or not finite
    InvalidVolume(f32),
}

impl CommandError {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandError::UnknownKind(_) => "UNKNOWN_KIND",
            CommandError::UnknownAction(_) => "UNKNOWN_ACTION",
            CommandError::InvalidVolume(_) => "INVALID_VOLUME",
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnknownKind(code) => write!(f, "unknown command kind {}", code),
            CommandError::UnknownAction(code) => write!(f, "unknown manual action {}", code),
            CommandError::InvalidVolume(volume) => write!(f, "invalid spot volume {}", volume),
        }
    }
}

impl TryFrom<&ScriptCommand> for ActuatorCommand {
    type Error = CommandError;

    fn try_from(script: &ScriptCommand) -> Result<Self, Self::Error> {
        let kind = CommandKind::from_code(script.cmd).ok_or(CommandError::UnknownKind(script.cmd))?;
        match kind {
            CommandKind::Manual => {
                let code = script.arg1 as i32;
                ManualAction::from_code(code)
                    .map(ActuatorCommand::Manual)
                    .ok_or(CommandError::UnknownAction(code))
            }
            CommandKind::Spot => {
                if !script.arg1.is_finite() || script.arg1 < 0.0 {
                    return Err(CommandError::InvalidVolume(script.arg1));
                }
                Ok(ActuatorCommand::Spot {
                    volume_ml: script.arg1,
                })
            }
            CommandKind::Blanket => Ok(ActuatorCommand::Blanket {
                rate_lpm: script.arg1,
                enabled: script.arg2 != 0.0,
            }),
        }
    }
}
