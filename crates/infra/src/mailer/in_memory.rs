//! In-memory notifier for tests/dev.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use super::{Mailer, NotifyError, OutboundMessage};

/// In-memory notifier for tests/dev.
///
/// Records every accepted message; addresses registered via `reject` fail
/// the send instead, so tests can exercise the notification retry path.
#[derive(Debug, Default)]
pub struct InMemoryMailer {
    sent: RwLock<Vec<OutboundMessage>>,
    rejected: RwLock<HashSet<String>>,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Make sends to this address fail until `accept` is called.
    pub fn reject(&self, address: &str) {
        self.rejected.write().unwrap().insert(address.to_string());
    }

    /// Stop failing sends to this address.
    pub fn accept(&self, address: &str) {
        self.rejected.write().unwrap().remove(address);
    }

    /// All accepted messages, in send order.
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.read().unwrap().clone()
    }

    /// Number of accepted messages to one address.
    pub fn sent_to(&self, address: &str) -> usize {
        self.sent
            .read()
            .unwrap()
            .iter()
            .filter(|m| m.to == address)
            .count()
    }
}

impl Mailer for InMemoryMailer {
    fn send(&self, message: OutboundMessage) -> Result<(), NotifyError> {
        if self.rejected.read().unwrap().contains(&message.to) {
            return Err(NotifyError::Rejected(message.to));
        }
        self.sent.write().unwrap().push(message);
        Ok(())
    }
}

impl Mailer for Arc<InMemoryMailer> {
    fn send(&self, message: OutboundMessage) -> Result<(), NotifyError> {
        (**self).send(message)
    }
}
