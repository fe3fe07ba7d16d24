//! The certificate automation engine.
//!
//! This module implements the deferred, idempotent job-execution protocol:
//!
//! ```text
//! tracker edit
//!   ↓
//! 1. Classify (pure: column + value → pass/fail)
//!   ↓
//! 2. Enqueue descriptor + arm one-shot trigger   (edit handler budget ends)
//!   ↓  … later, out of band …
//! 3. Snapshot containers → drain descriptors → disarm   (processor)
//! ```
//!
//! ## Why this orchestration?
//!
//! - **Deferred execution**: the edit handler runs under a hard wall-clock
//!   budget; rendering and notification are moved into the processor's own
//!   separately budgeted invocation
//! - **Idempotent effects**: artifact creation reconciles against a fresh
//!   container listing, notification dispatch against the persisted marker
//!   ledger — neither trusts local memory, so re-invocation and overlap are
//!   safe
//! - **Partial-failure isolation**: one failing descriptor or row never
//!   aborts the rest of a drain or sweep
//!
//! The bulk job and the expiry scan bypass the queue and call the same
//! reconciliation primitives synchronously.

pub mod bulk;
pub mod edit;
pub mod expiry;
pub mod processor;
pub mod reconcile;
pub mod settings;
pub mod single;

pub use bulk::{BulkReconciler, BulkReport, CategorySelection};
pub use edit::{CellEdit, EditHandler, EditOutcome, PROCESS_CALLBACK, PROCESS_DELAY};
pub use expiry::{EXPIRY_CALLBACK, EXPIRY_SCAN_PERIOD, ExpiryReport, ExpiryScan};
pub use processor::{DrainReport, JobProcessor};
pub use reconcile::{ContainerSnapshot, EnsureOutcome, NoticeOutcome};
pub use settings::AutomationSettings;
pub use single::{SingleOutcome, SingleRequest, reconcile_single};

use certforge_core::DomainError;

use crate::document_store::StoreError;
use crate::jobs::QueueError;
use crate::mailer::NotifyError;
use crate::properties::PropertyError;
use crate::renderer::RenderError;
use crate::scheduler::ScheduleError;
use crate::spreadsheet::SheetError;

/// Engine-level error: any collaborator failure, plus the domain-level
/// lookup failures entry points report to their callers.
#[derive(Debug, thiserror::Error)]
pub enum AutomationError {
    #[error("tabular store error: {0}")]
    Sheet(#[from] SheetError),
    #[error("object store error: {0}")]
    Store(#[from] StoreError),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    #[error("notification error: {0}")]
    Notify(#[from] NotifyError),
    #[error("property store error: {0}")]
    Property(#[from] PropertyError),
    #[error("scheduler error: {0}")]
    Schedule(#[from] ScheduleError),
    #[error("job queue error: {0}")]
    Queue(#[from] QueueError),
    #[error("no recipient address for {name} in {roster}")]
    RecipientNotFound { name: String, roster: String },
    #[error(transparent)]
    Domain(#[from] DomainError),
}
