//! MAVLink UDP link to a real sprayer
//!
//! Commands go out as NAMED_VALUE_FLOAT; COMMAND_ACK and the sprayer's
//! NAMED_VALUE_FLOAT telemetry come back. The socket is non-blocking and
//! each `try_recv` reads at most one datagram.

use std::io::{self, Cursor};
use std::net::{SocketAddr, UdpSocket};

use agrispray_core::link::{LinkError, OutboundMessage, RawMessage, SprayLink, NAME_LEN};
use agrispray_core::spray::KindMap;
use mavlink::common::{MavCmd, MavMessage, NAMED_VALUE_FLOAT_DATA};
use mavlink::peek_reader::PeekReader;
use mavlink::{MavHeader, Message};

use crate::config::LinkConfig;

/// Ack command codes used by the sprayer: MAV_CMD_USER_1..3
pub const ACK_KIND_MAP: KindMap = KindMap {
    manual: MavCmd::MAV_CMD_USER_1 as u16,
    spot: MavCmd::MAV_CMD_USER_2 as u16,
    blanket: MavCmd::MAV_CMD_USER_3 as u16,
};

// MAVLink v2 maximum frame length
const FRAME_LEN: usize = 280;

pub struct MavlinkUdpLink {
    socket: UdpSocket,
    system_id: u8,
    component_id: u8,
    sequence: u8,
    peer: Option<SocketAddr>,
    recv_buf: Vec<u8>,
}

impl MavlinkUdpLink {
    /// Bind the local socket in non-blocking mode.
    pub fn bind(config: &LinkConfig) -> io::Result<Self> {
        let socket = UdpSocket::bind(config.bind)?;
        socket.set_nonblocking(true)?;
        tracing::info!(
            local = %socket.local_addr()?,
            peer = ?config.peer,
            "MAVLink UDP link bound"
        );

        Ok(Self {
            socket,
            system_id: config.system_id,
            component_id: config.component_id,
            sequence: 0,
            peer: config.peer,
            recv_buf: vec![0u8; FRAME_LEN],
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Actuator address, configured or discovered
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    fn send_message(&mut self, peer: SocketAddr, msg: &MavMessage) -> io::Result<()> {
        let header = MavHeader {
            system_id: self.system_id,
            component_id: self.component_id,
            sequence: self.sequence,
        };
        self.sequence = self.sequence.wrapping_add(1);

        let mut buf = Cursor::new(Vec::with_capacity(FRAME_LEN));
        mavlink::write_v2_msg(&mut buf, header, msg)
            .map_err(|e| io::Error::other(format!("{e:?}")))?;
        self.socket.send_to(&buf.into_inner(), peer)?;
        Ok(())
    }
}

impl SprayLink for MavlinkUdpLink {
    fn send(&mut self, message: &OutboundMessage) -> Result<(), LinkError> {
        let peer = self.peer.ok_or(LinkError::NotConnected)?;
        let msg = MavMessage::NAMED_VALUE_FLOAT(NAMED_VALUE_FLOAT_DATA {
            time_boot_ms: message.timestamp_ms,
            value: message.value,
            name: encode_name(message.name),
        });
        self.send_message(peer, &msg).map_err(|e| {
            tracing::debug!(error = %e, "UDP send failed");
            LinkError::Io
        })
    }

    fn try_recv(&mut self) -> Option<RawMessage> {
        let (len, addr) = match self.socket.recv_from(&mut self.recv_buf) {
            Ok(received) => received,
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => return None,
            Err(e) => {
                tracing::debug!(error = %e, "UDP receive failed");
                return None;
            }
        };
        if self.peer.is_none() {
            tracing::info!(%addr, "sprayer discovered");
            self.peer = Some(addr);
        }

        let mut reader = PeekReader::new(Cursor::new(&self.recv_buf[..len]));
        match mavlink::read_v2_msg::<MavMessage, _>(&mut reader) {
            Ok((_, msg)) => Some(to_raw(&msg)),
            Err(e) => {
                tracing::debug!(error = ?e, "undecodable datagram dropped");
                None
            }
        }
    }
}

/// Map a MAVLink message onto the link's message model
pub fn to_raw(msg: &MavMessage) -> RawMessage {
    match msg {
        MavMessage::COMMAND_ACK(ack) => RawMessage::CommandAck {
            command: ack.command as u16,
            result: ack.result as u8,
        },
        MavMessage::NAMED_VALUE_FLOAT(data) => {
            RawMessage::named_float(&decode_name(&data.name), data.value)
        }
        other => RawMessage::Other {
            msg_id: other.message_id(),
        },
    }
}

fn encode_name(name: &str) -> [u8; NAME_LEN] {
    let mut out = [0u8; NAME_LEN];
    let bytes = name.as_bytes();
    let len = bytes.len().min(NAME_LEN);
    out[..len].copy_from_slice(&bytes[..len]);
    out
}

fn decode_name(raw: &[u8; NAME_LEN]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
    String::from_utf8_lossy(&raw[..end]).into_owned()
}
