//! Job descriptor type and storage-key construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use certforge_certs::Category;
use certforge_core::{ContainerId, TemplateId};

/// Namespace prefix for queued job descriptors.
pub const JOBS_PREFIX: &str = "jobs/";

/// One pending certificate-creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateJob {
    /// Subject the certificate is issued to.
    pub subject_name: String,
    /// Certification category.
    pub category: Category,
    /// Template to render from.
    pub template: TemplateId,
    /// Container the artifact lands in.
    pub container: ContainerId,
    /// Preformatted issue date, captured at enqueue time.
    pub issue_date: String,
    /// Recipient address, if one was resolved.
    pub recipient: Option<String>,
    /// Whether to notify the recipient once the artifact exists.
    pub notify: bool,
}

impl CertificateJob {
    pub fn new(
        subject_name: impl Into<String>,
        category: Category,
        template: TemplateId,
        container: ContainerId,
        issue_date: impl Into<String>,
    ) -> Self {
        Self {
            subject_name: subject_name.into(),
            category,
            template,
            container,
            issue_date: issue_date.into(),
            recipient: None,
            notify: false,
        }
    }

    pub fn with_recipient(mut self, recipient: impl Into<String>, notify: bool) -> Self {
        self.recipient = Some(recipient.into());
        self.notify = notify;
        self
    }

    /// Storage key for this descriptor, unique per (subject, category,
    /// enqueue time) by construction.
    pub fn storage_key(&self, enqueued_at: DateTime<Utc>) -> String {
        format!(
            "{}{}/{}/{}",
            JOBS_PREFIX,
            self.category,
            key_segment(&self.subject_name),
            enqueued_at.timestamp_millis()
        )
    }
}

/// Normalize a name for use inside a storage key: whitespace runs collapse
/// to single underscores.
pub fn key_segment(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("_")
}
