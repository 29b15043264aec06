//! Link implementations for the host runtime

pub mod loopback;
pub mod udp;

pub use loopback::{loopback, ActuatorPort, LoopbackLink};
pub use udp::{MavlinkUdpLink, ACK_KIND_MAP};
