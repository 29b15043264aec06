//! Sprayer payload codec
//!
//! Every command travels as a single named-float record. The float carries
//! either a plain value or, for blanket spraying, a packed bit pattern:
//!
//! ```text
//!  31                16 15               1   0
//! +--------------------+-----------------+---+
//! |  rate_lpm * 1000   |        0        | on|
//! +--------------------+-----------------+---+
//! ```
//!
//! The packed word is sent as the float's raw bits, so the receiver must
//! reinterpret rather than convert it.

use super::ack::AckResult;
use super::command::{ActuatorCommand, CommandKind, ManualAction};
use crate::link::{OutboundMessage, RawMessage};

pub const TAG_SPOT: &str = "SPOT";
pub const TAG_BLANKET: &str = "BLANKET";
pub const TAG_MANUAL: &str = "MANUAL";
pub const TAG_FLOWRATE: &str = "FLOWRATE";
pub const TAG_VOLUME: &str = "VOLUME";

/// Largest blanket rate representable in the 16-bit rate field (l/min)
pub const MAX_RATE_LPM: f32 = 65.535;

/// Pack a blanket rate and on/off flag into a 32-bit word.
///
/// The rate is clamped to `[0, MAX_RATE_LPM]` (NaN counts as 0) and
/// truncated to thousandths.
pub fn pack_blanket(rate_lpm: f32, enabled: bool) -> u32 {
    let rate = if rate_lpm.is_nan() {
        0.0
    } else {
        rate_lpm.clamp(0.0, MAX_RATE_LPM)
    };
    let rate_int = ((rate as f64 * 1000.0) as u32).min(0xFFFF);
    (rate_int << 16) | enabled as u32
}

/// Recover `(rate * 1000, enabled)` from a packed blanket word.
pub fn unpack_blanket(bits: u32) -> (u16, bool) {
    ((bits >> 16) as u16, bits & 1 == 1)
}

/// Maps acknowledgment command codes to command kinds
///
/// The actuator echoes a per-kind command code in its acknowledgment; the
/// transport decides the numbering (plain kind codes by default, MAVLink
/// user command ids over MAVLink).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindMap {
    pub manual: u16,
    pub spot: u16,
    pub blanket: u16,
}

impl Default for KindMap {
    fn default() -> Self {
        Self {
            manual: CommandKind::Manual.code(),
            spot: CommandKind::Spot.code(),
            blanket: CommandKind::Blanket.code(),
        }
    }
}

impl KindMap {
    pub fn kind_for(&self, code: u16) -> Option<CommandKind> {
        CommandKind::ALL
            .into_iter()
            .find(|kind| self.code_for(*kind) == code)
    }

    pub fn code_for(&self, kind: CommandKind) -> u16 {
        match kind {
            CommandKind::Manual => self.manual,
            CommandKind::Spot => self.spot,
            CommandKind::Blanket => self.blanket,
        }
    }
}

/// Flow telemetry sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlowSample {
    /// Current flow rate (l/min)
    Rate(f32),
    /// Dispensed volume
    Volume(f32),
}

/// Decoded inbound event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InboundEvent {
    Ack {
        kind: CommandKind,
        result: AckResult,
    },
    Flow(FlowSample),
}

/// Encodes actuator commands and decodes sprayer replies
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandCodec {
    kinds: KindMap,
}

impl CommandCodec {
    pub fn new(kinds: KindMap) -> Self {
        Self { kinds }
    }

    pub fn kinds(&self) -> &KindMap {
        &self.kinds
    }

    /// Encode `command` into an outgoing record stamped with `timestamp_ms`.
    pub fn encode(&self, command: &ActuatorCommand, timestamp_ms: u32) -> OutboundMessage {
        let (name, value) = match *command {
            ActuatorCommand::Spot { volume_ml } => (TAG_SPOT, volume_ml),
            ActuatorCommand::Blanket { rate_lpm, enabled } => {
                if !(0.0..=MAX_RATE_LPM).contains(&rate_lpm) {
                    crate::log_warn!("Blanket rate {} l/min clamped", rate_lpm);
                }
                (TAG_BLANKET, f32::from_bits(pack_blanket(rate_lpm, enabled)))
            }
            ActuatorCommand::Manual(action) => (TAG_MANUAL, manual_value(action)),
        };

        OutboundMessage {
            timestamp_ms,
            value,
            name,
        }
    }

    /// Decode an inbound message.
    ///
    /// Returns `None` for message ids, names and command codes this codec
    /// does not recognise.
    pub fn decode(&self, raw: &RawMessage) -> Option<InboundEvent> {
        match raw {
            RawMessage::CommandAck { command, result } => {
                let kind = self.kinds.kind_for(*command)?;
                Some(InboundEvent::Ack {
                    kind,
                    result: AckResult::from_code(*result),
                })
            }
            RawMessage::NamedFloat { name, value } => match name.as_str() {
                TAG_FLOWRATE => Some(InboundEvent::Flow(FlowSample::Rate(*value))),
                TAG_VOLUME => Some(InboundEvent::Flow(FlowSample::Volume(*value))),
                _ => None,
            },
            RawMessage::Other { .. } => None,
        }
    }
}

fn manual_value(action: ManualAction) -> f32 {
    action.code() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_spot() {
        let codec = CommandCodec::default();
        let msg = codec.encode(&ActuatorCommand::Spot { volume_ml: 125.5 }, 1234);
        assert_eq!(msg.name, "SPOT");
        assert_eq!(msg.value, 125.5);
        assert_eq!(msg.timestamp_ms, 1234);
    }

    #[test]
    fn test_encode_manual_codes() {
        let codec = CommandCodec::default();
        let cases = [
            (ManualAction::Pause, 0.0),
            (ManualAction::PauseWithControl, 1.0),
            (ManualAction::Resume, 2.0),
            (ManualAction::Restart, 3.0),
        ];
        for (action, expected) in cases {
            let msg = codec.encode(&ActuatorCommand::Manual(action), 0);
            assert_eq!(msg.name, "MANUAL");
            assert_eq!(msg.value, expected);
        }
    }

    #[test]
    fn test_encode_blanket_bit_pattern() {
        let codec = CommandCodec::default();
        let msg = codec.encode(
            &ActuatorCommand::Blanket {
                rate_lpm: 1.5,
                enabled: true,
            },
            0,
        );
        assert_eq!(msg.name, "BLANKET");
        assert_eq!(msg.value.to_bits(), (1500 << 16) | 1);
    }

    #[test]
    fn test_pack_blanket_known_values() {
        assert_eq!(pack_blanket(0.0, false), 0);
        assert_eq!(pack_blanket(0.0, true), 1);
        assert_eq!(pack_blanket(12.5, true), (12_500 << 16) | 1);
        assert_eq!(pack_blanket(0.25, false), 250 << 16);
        assert_eq!(pack_blanket(MAX_RATE_LPM, true), 0xFFFF_0001);
    }

    #[test]
    fn test_blanket_round_trip_recovers_truncated_rate() {
        // Every thousandth step across the representable range, both flags
        for step in (0..=65_535u32).step_by(7) {
            let rate = step as f32 / 1000.0;
            let expected = (rate as f64 * 1000.0) as u16;
            for enabled in [false, true] {
                let command = ActuatorCommand::Blanket {
                    rate_lpm: rate,
                    enabled,
                };
                let bits = CommandCodec::default().encode(&command, 0).value.to_bits();
                assert_eq!(unpack_blanket(bits), (expected, enabled), "rate {}", rate);
            }
        }
    }

    #[test]
    fn test_pack_blanket_truncates_toward_zero() {
        let (rate_int, _) = unpack_blanket(pack_blanket(2.0009, true));
        assert_eq!(rate_int, 2000);
    }

    #[test]
    fn test_pack_blanket_clamps_out_of_range() {
        assert_eq!(unpack_blanket(pack_blanket(-3.0, true)), (0, true));
        assert_eq!(unpack_blanket(pack_blanket(100.0, false)), (0xFFFF, false));
        assert_eq!(unpack_blanket(pack_blanket(f32::NAN, true)), (0, true));
    }

    #[test]
    fn test_decode_ack() {
        let codec = CommandCodec::default();
        let event = codec.decode(&RawMessage::CommandAck {
            command: 1,
            result: 0,
        });
        assert_eq!(
            event,
            Some(InboundEvent::Ack {
                kind: CommandKind::Spot,
                result: AckResult::Accepted
            })
        );
    }

    #[test]
    fn test_decode_ack_with_custom_kind_map() {
        let codec = CommandCodec::new(KindMap {
            manual: 31010,
            spot: 31011,
            blanket: 31012,
        });
        assert!(matches!(
            codec.decode(&RawMessage::CommandAck {
                command: 31012,
                result: 4
            }),
            Some(InboundEvent::Ack {
                kind: CommandKind::Blanket,
                result: AckResult::Failed
            })
        ));
        assert_eq!(
            codec.decode(&RawMessage::CommandAck {
                command: 1,
                result: 0
            }),
            None
        );
    }

    #[test]
    fn test_decode_flow() {
        let codec = CommandCodec::default();
        assert_eq!(
            codec.decode(&RawMessage::named_float("FLOWRATE", 2.5)),
            Some(InboundEvent::Flow(FlowSample::Rate(2.5)))
        );
        assert_eq!(
            codec.decode(&RawMessage::named_float("VOLUME", 10.0)),
            Some(InboundEvent::Flow(FlowSample::Volume(10.0)))
        );
    }

    #[test]
    fn test_decode_unrecognised_is_dropped() {
        let codec = CommandCodec::default();
        assert_eq!(codec.decode(&RawMessage::named_float("BATTERY", 1.0)), None);
        assert_eq!(codec.decode(&RawMessage::Other { msg_id: 0 }), None);
        assert_eq!(
            codec.decode(&RawMessage::CommandAck {
                command: 99,
                result: 0
            }),
            None
        );
    }
}
