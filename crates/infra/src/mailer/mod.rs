//! Notifier port.

use crate::document_store::Blob;

pub mod in_memory;

pub use in_memory::InMemoryMailer;

/// Notifier error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NotifyError {
    #[error("recipient rejected: {0}")]
    Rejected(String),
    #[error("transport error: {0}")]
    Transport(String),
}

/// One named attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub blob: Blob,
}

/// One outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub html_body: Option<String>,
    pub attachment: Option<Attachment>,
    pub sender_name: String,
}

/// Notifier abstraction.
pub trait Mailer: Send + Sync {
    fn send(&self, message: OutboundMessage) -> Result<(), NotifyError>;
}
