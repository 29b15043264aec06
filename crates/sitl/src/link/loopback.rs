//! In-process link between the controller and the simulated actuator
//!
//! Two bounded tokio channels, one per direction. Both ends are polled
//! with `try_*` calls, so the controller tick never waits on the actuator.

use agrispray_core::link::{LinkError, OutboundMessage, RawMessage, SprayLink};
use tokio::sync::mpsc::{self, error::TrySendError};

/// Controller end
#[derive(Debug)]
pub struct LoopbackLink {
    tx: mpsc::Sender<OutboundMessage>,
    rx: mpsc::Receiver<RawMessage>,
}

/// Actuator end
#[derive(Debug)]
pub struct ActuatorPort {
    tx: mpsc::Sender<RawMessage>,
    rx: mpsc::Receiver<OutboundMessage>,
}

/// Create a connected pair with `capacity` slots per direction.
pub fn loopback(capacity: usize) -> (LoopbackLink, ActuatorPort) {
    let (cmd_tx, cmd_rx) = mpsc::channel(capacity);
    let (reply_tx, reply_rx) = mpsc::channel(capacity);
    (
        LoopbackLink {
            tx: cmd_tx,
            rx: reply_rx,
        },
        ActuatorPort {
            tx: reply_tx,
            rx: cmd_rx,
        },
    )
}

impl SprayLink for LoopbackLink {
    fn send(&mut self, message: &OutboundMessage) -> Result<(), LinkError> {
        self.tx.try_send(*message).map_err(|e| match e {
            TrySendError::Full(_) => LinkError::QueueFull,
            TrySendError::Closed(_) => LinkError::NotConnected,
        })
    }

    fn try_recv(&mut self) -> Option<RawMessage> {
        self.rx.try_recv().ok()
    }
}

impl ActuatorPort {
    /// Next command sent by the controller
    pub fn recv(&mut self) -> Option<OutboundMessage> {
        self.rx.try_recv().ok()
    }

    /// Deliver a reply to the controller; returns `false` if the queue is full or closed.
    pub fn reply(&self, message: RawMessage) -> bool {
        match self.tx.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!("loopback reply queue full, message dropped");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}
