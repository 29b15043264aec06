//! Message link between the controller and the sprayer
//!
//! The transport (MAVLink over UDP, serial, an in-process loopback) is an
//! external collaborator. The controller only needs a non-blocking receive
//! that yields at most one message per call and a typed send.

mod mock;

use core::fmt;

use heapless::String;

pub use mock::MockLink;

/// Maximum name length of a named-float record (MAVLink NAMED_VALUE_FLOAT)
pub const NAME_LEN: usize = 10;

/// Named-float name
pub type Name = String<NAME_LEN>;

/// Outgoing named-float record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutboundMessage {
    /// Sender timestamp (`time_boot_ms`)
    pub timestamp_ms: u32,
    /// Packed payload
    pub value: f32,
    /// Command tag
    pub name: &'static str,
}

/// Inbound message as delivered by the transport
#[derive(Debug, Clone, PartialEq)]
pub enum RawMessage {
    /// Named-float telemetry record
    NamedFloat { name: Name, value: f32 },
    /// Command acknowledgment
    CommandAck { command: u16, result: u8 },
    /// Any other message id received on the channel
    Other { msg_id: u32 },
}

impl RawMessage {
    /// Build a named-float message; the name is truncated to [`NAME_LEN`]
    /// and trailing NUL padding is removed.
    pub fn named_float(name: &str, value: f32) -> Self {
        let mut owned = Name::new();
        for ch in name.trim_end_matches('\0').chars() {
            if owned.push(ch).is_err() {
                break;
            }
        }
        RawMessage::NamedFloat { name: owned, value }
    }
}

/// Link failure reported by `send`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// No peer to send to yet
    NotConnected,
    /// Outgoing queue full
    QueueFull,
    /// Transport I/O failure
    Io,
}

impl LinkError {
    /// Variant name as a static string (usable with defmt on embedded)
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkError::NotConnected => "not connected",
            LinkError::QueueFull => "queue full",
            LinkError::Io => "i/o error",
        }
    }
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-blocking message channel to the sprayer
pub trait SprayLink {
    /// Queue one message for transmission.
    fn send(&mut self, message: &OutboundMessage) -> Result<(), LinkError>;

    /// Return the next received message, if any, without blocking.
    fn try_recv(&mut self) -> Option<RawMessage>;
}

impl<L: SprayLink + ?Sized> SprayLink for &mut L {
    fn send(&mut self, message: &OutboundMessage) -> Result<(), LinkError> {
        (**self).send(message)
    }

    fn try_recv(&mut self) -> Option<RawMessage> {
        (**self).try_recv()
    }
}
