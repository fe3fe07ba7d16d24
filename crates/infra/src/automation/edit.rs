//! Score-edit handling: classification and deferred enqueue.
//!
//! This is the path with the hard execution-time budget. It recolors the
//! edited cell, and on a PASS persists a job descriptor and arms a one-shot
//! trigger for the processor — nothing slower happens inline.

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info};

use certforge_certs::{CategoryBindings, display_date};
use certforge_scoring::{
    CellRef, CellValue, Classification, FAIL_BACKGROUND, FAILED_SCORE_STATUS, NAME_COLUMN,
    PASS_BACKGROUND, STATUS_COLUMN, TRACKER_SHEET, classify,
};

use super::AutomationError;
use super::settings::AutomationSettings;
use crate::jobs::{CertificateJob, JobQueue};
use crate::properties::PropertyStore;
use crate::scheduler::TriggerScheduler;
use crate::spreadsheet::Spreadsheet;

/// Callback name the processor registers under.
pub const PROCESS_CALLBACK: &str = "process-certificate-jobs";

/// Delay between enqueue and the deferred processor run.
pub const PROCESS_DELAY: Duration = Duration::from_secs(1);

/// One edit event as reported by the tabular store.
#[derive(Debug, Clone, PartialEq)]
pub struct CellEdit {
    pub sheet: String,
    pub cell: CellRef,
    pub value: CellValue,
}

/// What the handler did with an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Wrong sheet, non-score column, header row, or a row without a name.
    Ignored,
    /// Score deleted: nothing changed.
    Cleared,
    /// Unparseable value: cell recolored, no certificate path.
    MarkedFailure,
    /// Below threshold: cell recolored, status annotated.
    Failed { score: i64 },
    /// At or above threshold, but auto-generation is disabled.
    Passed { score: i64 },
    /// At or above threshold: descriptor enqueued and trigger armed.
    Scheduled { job_key: String, recipient: String },
}

/// Edit entry point: classify, recolor, and (on PASS) enqueue-and-defer.
pub struct EditHandler<Sh, P, T> {
    sheet: Sh,
    props: P,
    queue: JobQueue<P>,
    scheduler: T,
    bindings: CategoryBindings,
}

impl<Sh, P, T> EditHandler<Sh, P, T>
where
    Sh: Spreadsheet,
    P: PropertyStore + Clone,
    T: TriggerScheduler,
{
    pub fn new(sheet: Sh, props: P, scheduler: T, bindings: CategoryBindings) -> Self {
        let queue = JobQueue::new(props.clone());
        Self {
            sheet,
            props,
            queue,
            scheduler,
            bindings,
        }
    }

    /// Handle one edit.
    ///
    /// A missing recipient on a PASS is a hard stop reported to the caller;
    /// no job is enqueued.
    pub fn handle(&self, edit: &CellEdit) -> Result<EditOutcome, AutomationError> {
        if edit.sheet != TRACKER_SHEET {
            return Ok(EditOutcome::Ignored);
        }

        let (category, score) = match classify(edit.cell, &edit.value) {
            Classification::NotAScore => return Ok(EditOutcome::Ignored),
            Classification::Cleared => {
                debug!(row = edit.cell.row, col = edit.cell.col, "score cleared, no action");
                return Ok(EditOutcome::Cleared);
            }
            Classification::FailureMarker { .. } => {
                self.sheet
                    .set_background(TRACKER_SHEET, edit.cell, FAIL_BACKGROUND)?;
                return Ok(EditOutcome::MarkedFailure);
            }
            Classification::Fail { score, .. } => {
                self.sheet
                    .set_background(TRACKER_SHEET, edit.cell, FAIL_BACKGROUND)?;
                self.sheet.set_cell_value(
                    TRACKER_SHEET,
                    CellRef::new(edit.cell.row, STATUS_COLUMN),
                    CellValue::text(FAILED_SCORE_STATUS),
                )?;
                return Ok(EditOutcome::Failed { score });
            }
            Classification::Pass { category, score } => (category, score),
        };

        self.sheet
            .set_background(TRACKER_SHEET, edit.cell, PASS_BACKGROUND)?;

        let settings = AutomationSettings::load(&self.props)?;
        if !settings.auto_generate {
            return Ok(EditOutcome::Passed { score });
        }

        let name_cell = CellRef::new(edit.cell.row, NAME_COLUMN);
        let name = match self.sheet.cell_value(TRACKER_SHEET, name_cell)? {
            CellValue::Text(s) if !s.trim().is_empty() => s.trim().to_string(),
            _ => {
                debug!(row = edit.cell.row, "passing score on a row without a name, skipping");
                return Ok(EditOutcome::Ignored);
            }
        };

        let roster = category.roster_sheet();
        let recipient = self
            .sheet
            .roster_email(roster, &name)?
            .ok_or_else(|| AutomationError::RecipientNotFound {
                name: name.clone(),
                roster: roster.to_string(),
            })?;

        let binding = self.bindings.get(category);
        let job = CertificateJob::new(
            name.clone(),
            category,
            binding.template.clone(),
            binding.container.clone(),
            display_date(Utc::now()),
        )
        .with_recipient(recipient.clone(), settings.auto_notify);

        let job_key = self.queue.push(&job, Utc::now())?;
        self.scheduler.register(PROCESS_CALLBACK, PROCESS_DELAY)?;
        info!(%category, subject = %name, job_key = %job_key, "certificate job scheduled");

        Ok(EditOutcome::Scheduled {
            job_key,
            recipient,
        })
    }
}
