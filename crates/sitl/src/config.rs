//! Runtime configuration
//!
//! Loaded from a TOML file; every field has a default so a partial file
//! (or none at all) gives a runnable simulation.
//!
//! ```toml
//! tick_ms = 3
//! stop_when_complete = true
//!
//! [params]
//! SPR_FS_ACTION = 1
//!
//! [actuator]
//! ack_delay_ms = 400
//! drop_probability = 0.1
//! seed = 7
//!
//! [[mission]]
//! nav = 22
//! duration_ms = 2000
//!
//! [[mission]]
//! nav = 42702
//! spray = { kind = "spot", arg1 = 250.0 }
//! ```

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use agrispray_core::mission::{NavCommand, MAV_CMD_NAV_SCRIPT_TIME};
use agrispray_core::scheduler::TICK_PERIOD_MS;
use agrispray_core::spray::CommandKind;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SitlError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SitlConfig {
    /// Controller tick period (ms)
    pub tick_ms: u64,
    /// Period of the status summary log line (ms)
    pub status_interval_ms: u64,
    /// Stop the runner once the simulated mission completes
    pub stop_when_complete: bool,
    pub link: LinkConfig,
    /// Integer parameter overrides, applied over the defaults
    pub params: BTreeMap<String, i32>,
    /// Append flow telemetry to this file as JSON lines
    pub flow_log: Option<PathBuf>,
    pub actuator: ActuatorConfig,
    pub mission: Vec<MissionItem>,
}

impl Default for SitlConfig {
    fn default() -> Self {
        Self {
            tick_ms: TICK_PERIOD_MS,
            status_interval_ms: 10_000,
            stop_when_complete: false,
            link: LinkConfig::default(),
            params: BTreeMap::new(),
            flow_log: None,
            actuator: ActuatorConfig::default(),
            mission: default_mission(),
        }
    }
}

impl SitlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: SitlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_ms == 0 {
            return Err(SitlError::invalid("tick_ms must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.actuator.drop_probability) {
            return Err(SitlError::invalid(format!(
                "actuator.drop_probability {} is outside [0, 1]",
                self.actuator.drop_probability
            )));
        }
        if self.mission.is_empty() {
            return Err(SitlError::invalid("mission has no items"));
        }
        if self.link.transport == Transport::Loopback && self.link.capacity == 0 {
            return Err(SitlError::invalid("link.capacity must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// In-process link to the simulated actuator
    Loopback,
    /// MAVLink over UDP to an external actuator
    Udp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub transport: Transport,
    /// Loopback queue depth per direction
    pub capacity: usize,
    /// Local UDP address
    pub bind: SocketAddr,
    /// Actuator address; discovered from the first datagram when unset
    pub peer: Option<SocketAddr>,
    pub system_id: u8,
    pub component_id: u8,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            transport: Transport::Loopback,
            capacity: 16,
            bind: SocketAddr::from(([0, 0, 0, 0], 14560)),
            peer: None,
            system_id: 1,
            // MAV_COMP_ID_ONBOARD_COMPUTER
            component_id: 191,
        }
    }
}

/// Simulated sprayer behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorConfig {
    /// Delay between receiving a command and acknowledging it (ms)
    pub ack_delay_ms: u64,
    /// Probability that a command is never acknowledged
    pub drop_probability: f64,
    /// RNG seed; entropy when unset
    pub seed: Option<u64>,
    /// Period of FLOWRATE / VOLUME telemetry (ms)
    pub telemetry_interval_ms: u64,
    /// Also acknowledge manual commands
    pub ack_manual: bool,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            ack_delay_ms: 150,
            drop_probability: 0.0,
            seed: None,
            telemetry_interval_ms: 200,
            ack_manual: false,
        }
    }
}

/// One item of the simulated mission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionItem {
    /// MAV_CMD id of the nav command
    pub nav: u16,
    /// Time spent on the item; script items wait for completion instead
    #[serde(default)]
    pub duration_ms: u64,
    /// Sprayer command issued when this item runs
    #[serde(default)]
    pub spray: Option<SprayStep>,
}

impl MissionItem {
    pub fn nav_command(&self) -> NavCommand {
        NavCommand::from_id(self.nav)
    }

    fn timed(nav: NavCommand, duration_ms: u64) -> Self {
        Self {
            nav: nav.id(),
            duration_ms,
            spray: None,
        }
    }

    fn script(kind: SprayKind, arg1: f32, arg2: f32) -> Self {
        Self {
            nav: MAV_CMD_NAV_SCRIPT_TIME,
            duration_ms: 0,
            spray: Some(SprayStep { kind, arg1, arg2 }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SprayStep {
    pub kind: SprayKind,
    #[serde(default)]
    pub arg1: f32,
    #[serde(default)]
    pub arg2: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SprayKind {
    Manual,
    Spot,
    Blanket,
}

impl From<SprayKind> for CommandKind {
    fn from(kind: SprayKind) -> Self {
        match kind {
            SprayKind::Manual => CommandKind::Manual,
            SprayKind::Spot => CommandKind::Spot,
            SprayKind::Blanket => CommandKind::Blanket,
        }
    }
}

/// Takeoff, a spot, a blanket pass, land
fn default_mission() -> Vec<MissionItem> {
    vec![
        MissionItem::timed(NavCommand::Takeoff, 2_000),
        MissionItem::timed(NavCommand::Waypoint, 2_000),
        MissionItem::script(SprayKind::Spot, 250.0, 0.0),
        MissionItem::timed(NavCommand::Waypoint, 2_000),
        MissionItem::script(SprayKind::Blanket, 1.5, 1.0),
        MissionItem::timed(NavCommand::Waypoint, 4_000),
        MissionItem::script(SprayKind::Blanket, 0.0, 0.0),
        MissionItem::timed(NavCommand::Land, 2_000),
    ]
}
