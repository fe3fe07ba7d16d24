//! Shared idempotency primitives.
//!
//! Both side effects the engine performs — creating an artifact and sending
//! a notification — are guarded here by *reconciliation*: externally
//! observable state is consulted before acting, so the engine's own lack of
//! memory about prior runs is irrelevant.
//!
//! - Artifact creation reconciles against a container listing taken by the
//!   caller (`ContainerSnapshot`), compared case-insensitively by display
//!   name. The invariant "at most one artifact per (category, subject)" is
//!   enforced here, not by the store.
//! - Notification dispatch reconciles against the persisted marker ledger.
//!   The marker is written only *after* a successful send: a crash between
//!   send and write risks one duplicate, never zero notifications.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use certforge_certs::{Category, CategoryBinding, certificate_file_name, completion_notice, draft_file_name};
use certforge_core::EntryId;

use super::AutomationError;
use crate::document_store::{DocumentStore, StoreError};
use crate::jobs::key_segment;
use crate::mailer::{Attachment, Mailer, OutboundMessage};
use crate::properties::{PropertyError, PropertyStore};
use crate::renderer::{CertificateFields, TemplateRenderer};

/// Namespace prefix for completion-notice markers.
pub const SENT_PREFIX: &str = "notice/sent/";

/// One container's listing, keyed by lowercased display name.
///
/// Taken once per run and updated as the run creates artifacts, so later
/// descriptors in the same drain reconcile against earlier creations without
/// re-listing.
#[derive(Debug, Clone, Default)]
pub struct ContainerSnapshot {
    entries: HashMap<String, (EntryId, DateTime<Utc>)>,
}

impl ContainerSnapshot {
    /// List a container into a snapshot.
    pub fn list<S: DocumentStore>(
        store: &S,
        container: &certforge_core::ContainerId,
    ) -> Result<Self, StoreError> {
        let mut entries = HashMap::new();
        for meta in store.list(container)? {
            entries.insert(meta.name.to_lowercase(), (meta.id, meta.created_at));
        }
        Ok(Self { entries })
    }

    /// Case-insensitive lookup by display name.
    pub fn lookup(&self, file_name: &str) -> Option<(EntryId, DateTime<Utc>)> {
        self.entries.get(&file_name.to_lowercase()).copied()
    }

    fn insert(&mut self, file_name: &str, id: EntryId, created_at: DateTime<Utc>) {
        self.entries.insert(file_name.to_lowercase(), (id, created_at));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of the artifact-creation primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// The container already held the artifact; the existing entry is
    /// authoritative.
    AlreadyExists {
        entry: EntryId,
        created_at: DateTime<Utc>,
    },
    /// A fresh artifact was rendered and stored.
    Created {
        entry: EntryId,
        created_at: DateTime<Utc>,
    },
}

impl EnsureOutcome {
    pub fn entry(&self) -> EntryId {
        match self {
            EnsureOutcome::AlreadyExists { entry, .. } | EnsureOutcome::Created { entry, .. } => {
                *entry
            }
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            EnsureOutcome::AlreadyExists { created_at, .. }
            | EnsureOutcome::Created { created_at, .. } => *created_at,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, EnsureOutcome::Created { .. })
    }
}

/// Ensure the certificate for (category, subject) exists in the container.
///
/// If the snapshot already knows the display name, no side effect happens.
/// Otherwise: render, persist the draft under a timestamped temp name,
/// persist the final blob under the display name, trash the draft, and add
/// the new entry to the snapshot.
pub fn ensure_certificate<S, R>(
    store: &S,
    renderer: &R,
    snapshot: &mut ContainerSnapshot,
    binding: &CategoryBinding,
    category: Category,
    subject_name: &str,
    issue_date: &str,
) -> Result<EnsureOutcome, AutomationError>
where
    S: DocumentStore,
    R: TemplateRenderer,
{
    let file_name = certificate_file_name(category, subject_name);
    if let Some((entry, created_at)) = snapshot.lookup(&file_name) {
        debug!(%category, subject = subject_name, "certificate already exists, reusing");
        return Ok(EnsureOutcome::AlreadyExists { entry, created_at });
    }

    let rendered = renderer.render(
        &binding.template,
        &CertificateFields {
            subject_name: subject_name.to_string(),
            issue_date: issue_date.to_string(),
        },
    )?;

    let now = Utc::now();
    let draft_name = draft_file_name(category, subject_name, now.timestamp_millis());
    let draft = store.create(&binding.container, &draft_name, rendered.draft)?;
    let entry = store.create(&binding.container, &file_name, rendered.artifact)?;
    store.trash(&draft)?;

    snapshot.insert(&file_name, entry, now);
    info!(%category, subject = subject_name, %entry, "certificate created");
    Ok(EnsureOutcome::Created {
        entry,
        created_at: now,
    })
}

/// Outcome of the notification primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeOutcome {
    /// The ledger already proves a send for this triple.
    AlreadySent,
    /// A notice went out and the marker was written.
    Sent,
}

/// Marker key for a completion notice.
pub fn completion_marker_key(subject_name: &str, category: Category, recipient: &str) -> String {
    format!(
        "{}{}/{}/{}",
        SENT_PREFIX,
        category,
        key_segment(subject_name),
        recipient
    )
}

/// Send the completion notice for an issued certificate, at most once per
/// (subject, category, recipient).
pub fn send_completion_notice<P, M, S>(
    props: &P,
    mailer: &M,
    store: &S,
    category: Category,
    subject_name: &str,
    recipient: &str,
    entry: EntryId,
) -> Result<NoticeOutcome, AutomationError>
where
    P: PropertyStore,
    M: Mailer,
    S: DocumentStore,
{
    let marker = completion_marker_key(subject_name, category, recipient);
    if props.get(&marker)?.is_some() {
        debug!(%category, subject = subject_name, recipient, "notice already sent, skipping");
        return Ok(NoticeOutcome::AlreadySent);
    }

    let blob = store.fetch(&entry)?;
    let content = completion_notice(subject_name, category);
    mailer.send(OutboundMessage {
        to: recipient.to_string(),
        subject: content.subject,
        body: content.body,
        html_body: Some(content.html_body),
        attachment: Some(Attachment {
            file_name: certificate_file_name(category, subject_name),
            blob,
        }),
        sender_name: certforge_certs::SENDER_NAME.to_string(),
    })?;

    // Marker after send: a crash in between means one duplicate, not zero.
    write_marker(props, &marker)?;
    info!(%category, subject = subject_name, recipient, "completion notice sent");
    Ok(NoticeOutcome::Sent)
}

/// Whether a completion marker exists for the triple.
pub fn completion_marker_exists<P: PropertyStore>(
    props: &P,
    subject_name: &str,
    category: Category,
    recipient: &str,
) -> Result<bool, PropertyError> {
    Ok(props
        .get(&completion_marker_key(subject_name, category, recipient))?
        .is_some())
}

pub(crate) fn write_marker<P: PropertyStore>(props: &P, key: &str) -> Result<(), PropertyError> {
    props.set(key, &Utc::now().to_rfc3339())
}
