//! Simulated sprayer
//!
//! Consumes the controller's commands from the loopback link, acknowledges
//! them after a fixed delay (or drops them at random) and reports flow rate
//! and dispensed volume at a fixed period.

use std::collections::VecDeque;

use agrispray_core::link::{OutboundMessage, RawMessage};
use agrispray_core::spray::{
    unpack_blanket, CommandKind, KindMap, ManualAction, TAG_BLANKET, TAG_FLOWRATE, TAG_MANUAL,
    TAG_SPOT, TAG_VOLUME,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ActuatorConfig;
use crate::link::ActuatorPort;

// MAV_RESULT_ACCEPTED
const RESULT_ACCEPTED: u8 = 0;

/// Sprayer counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActuatorStats {
    pub commands: u32,
    pub acks_sent: u32,
    pub acks_dropped: u32,
    pub unknown: u32,
}

pub struct SimActuator {
    config: ActuatorConfig,
    kinds: KindMap,
    rng: StdRng,
    scheduled: VecDeque<(u64, RawMessage)>,
    rate_lpm: f32,
    blanket_on: bool,
    paused: bool,
    /// Dispensed volume (l)
    volume_l: f32,
    last_update_ms: Option<u64>,
    last_telemetry_ms: u64,
    stats: ActuatorStats,
}

impl SimActuator {
    pub fn new(config: ActuatorConfig, kinds: KindMap) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            kinds,
            rng,
            scheduled: VecDeque::new(),
            rate_lpm: 0.0,
            blanket_on: false,
            paused: false,
            volume_l: 0.0,
            last_update_ms: None,
            last_telemetry_ms: 0,
            stats: ActuatorStats::default(),
        }
    }

    pub fn stats(&self) -> ActuatorStats {
        self.stats
    }

    /// Current flow rate (l/min)
    pub fn flowrate(&self) -> f32 {
        if self.blanket_on && !self.paused {
            self.rate_lpm
        } else {
            0.0
        }
    }

    /// Dispensed volume (l)
    pub fn volume(&self) -> f32 {
        self.volume_l
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Advance to `now_ms`: take new commands, integrate flow, deliver due replies.
    pub fn step(&mut self, now_ms: u64, port: &mut ActuatorPort) {
        self.integrate(now_ms);

        while let Some(message) = port.recv() {
            self.handle(now_ms, &message);
        }

        while let Some((due, _)) = self.scheduled.front() {
            if *due > now_ms {
                break;
            }
            if let Some((_, reply)) = self.scheduled.pop_front() {
                if port.reply(reply) {
                    self.stats.acks_sent += 1;
                }
            }
        }

        if now_ms.saturating_sub(self.last_telemetry_ms) >= self.config.telemetry_interval_ms {
            self.last_telemetry_ms = now_ms;
            port.reply(RawMessage::named_float(TAG_FLOWRATE, self.flowrate()));
            port.reply(RawMessage::named_float(TAG_VOLUME, self.volume_l));
        }
    }

    /// Apply one command received at `now_ms` and schedule its ack.
    pub fn handle(&mut self, now_ms: u64, message: &OutboundMessage) {
        self.stats.commands += 1;
        let kind = match message.name {
            TAG_SPOT => {
                if !self.paused {
                    self.volume_l += message.value / 1000.0;
                }
                CommandKind::Spot
            }
            TAG_BLANKET => {
                let (rate_int, enabled) = unpack_blanket(message.value.to_bits());
                self.rate_lpm = rate_int as f32 / 1000.0;
                self.blanket_on = enabled;
                CommandKind::Blanket
            }
            TAG_MANUAL => {
                match ManualAction::from_code(message.value as i32) {
                    Some(action) => self.apply_manual(action),
                    None => tracing::warn!(value = message.value, "unknown manual action"),
                }
                CommandKind::Manual
            }
            other => {
                tracing::warn!(name = other, "unknown command ignored");
                self.stats.unknown += 1;
                return;
            }
        };
        tracing::debug!(
            kind = kind.as_str(),
            value = message.value,
            "sprayer command"
        );

        if kind == CommandKind::Manual && !self.config.ack_manual {
            return;
        }
        if self.rng.gen_bool(self.config.drop_probability) {
            tracing::debug!(kind = kind.as_str(), "ack dropped");
            self.stats.acks_dropped += 1;
            return;
        }
        let ack = RawMessage::CommandAck {
            command: self.kinds.code_for(kind),
            result: RESULT_ACCEPTED,
        };
        self.scheduled.push_back((now_ms + self.config.ack_delay_ms, ack));
    }

    fn apply_manual(&mut self, action: ManualAction) {
        match action {
            ManualAction::Pause | ManualAction::PauseWithControl => self.paused = true,
            ManualAction::Resume => self.paused = false,
            ManualAction::Restart => {
                self.paused = false;
                self.blanket_on = false;
                self.volume_l = 0.0;
            }
        }
    }

    fn integrate(&mut self, now_ms: u64) {
        if let Some(last) = self.last_update_ms {
            let dt_min = now_ms.saturating_sub(last) as f32 / 60_000.0;
            self.volume_l += self.flowrate() * dt_min;
        }
        self.last_update_ms = Some(now_ms);
    }
}
