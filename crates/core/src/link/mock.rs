//! In-memory link for host tests

use heapless::{Deque, Vec};

use super::{LinkError, OutboundMessage, RawMessage, SprayLink};

/// Link that records sent messages and replays queued inbound ones
#[derive(Debug, Default)]
pub struct MockLink {
    /// Messages passed to `send`, oldest first
    pub sent: Vec<OutboundMessage, 32>,
    inbox: Deque<RawMessage, 16>,
    /// When set, `send` fails with this error (nothing is recorded)
    pub fail_with: Option<LinkError>,
}

impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message to be returned by `try_recv`.
    pub fn push_inbound(&mut self, message: RawMessage) {
        // Tests never queue more than a handful
        let _ = self.inbox.push_back(message);
    }

    /// Number of inbound messages not yet received
    pub fn pending_inbound(&self) -> usize {
        self.inbox.len()
    }

    /// Names of all sent messages, oldest first
    pub fn sent_names(&self) -> Vec<&'static str, 32> {
        self.sent.iter().map(|m| m.name).collect()
    }

    pub fn clear_sent(&mut self) {
        self.sent.clear();
    }
}

impl SprayLink for MockLink {
    fn send(&mut self, message: &OutboundMessage) -> Result<(), LinkError> {
        if let Some(err) = self.fail_with {
            return Err(err);
        }
        self.sent.push(*message).map_err(|_| LinkError::QueueFull)
    }

    fn try_recv(&mut self) -> Option<RawMessage> {
        self.inbox.pop_front()
    }
}
