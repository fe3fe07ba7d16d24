//! Bulk reconciliation sweep.
//!
//! A synchronous, operator-invoked pass over the tracker: every row whose
//! score cell carries the pass background gets the same creation and
//! notification protocol as the deferred processor, plus a human-readable
//! status annotation written back into the status column.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{info, warn};

use certforge_certs::{Category, CategoryBindings, display_date, expiry_date};
use certforge_scoring::{
    CellRef, CellValue, HEADER_ROWS, NAME_COLUMN, PASS_BACKGROUND, STATUS_COLUMN, TRACKER_SHEET,
    score_column,
};

use super::AutomationError;
use super::reconcile::{
    ContainerSnapshot, completion_marker_exists, ensure_certificate, send_completion_notice,
};
use super::settings::AutomationSettings;
use crate::document_store::DocumentStore;
use crate::mailer::Mailer;
use crate::properties::PropertyStore;
use crate::renderer::TemplateRenderer;
use crate::spreadsheet::{SheetRow, Spreadsheet};

/// Status annotation: a fresh artifact was stored for the row.
pub const STATUS_CREATED: &str = "Certificate created";

/// Status annotation: the artifact was already in the container.
pub const STATUS_EXISTS: &str = "Certificate already exists";

/// Prefix of the sent annotation; the guard keys on it.
pub const STATUS_SENT_PREFIX: &str = "Certificate already sent";

/// Status annotation: the roster join produced no address.
pub const STATUS_NO_EMAIL: &str = "Email not found";

/// Which categories a bulk run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorySelection {
    All,
    One(Category),
}

impl CategorySelection {
    fn categories(&self) -> Vec<Category> {
        match self {
            CategorySelection::All => Category::ALL.to_vec(),
            CategorySelection::One(category) => vec![*category],
        }
    }
}

/// Summary of one bulk run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct BulkReport {
    /// Fresh artifacts stored.
    pub generated: usize,
    /// Rows whose artifact already existed.
    pub skipped: usize,
    /// Completion notices dispatched.
    pub notices_sent: usize,
    /// Eligible rows with no roster address.
    pub missing_email: usize,
    /// Row/category items aborted by a collaborator error.
    pub failures: usize,
}

/// The bulk reconciliation job.
pub struct BulkReconciler<Sh, S, R, M, P> {
    sheet: Sh,
    store: S,
    renderer: R,
    mailer: M,
    props: P,
    bindings: CategoryBindings,
}

impl<Sh, S, R, M, P> BulkReconciler<Sh, S, R, M, P>
where
    Sh: Spreadsheet,
    S: DocumentStore,
    R: TemplateRenderer,
    M: Mailer,
    P: PropertyStore,
{
    pub fn new(
        sheet: Sh,
        store: S,
        renderer: R,
        mailer: M,
        props: P,
        bindings: CategoryBindings,
    ) -> Self {
        Self {
            sheet,
            store,
            renderer,
            mailer,
            props,
            bindings,
        }
    }

    /// Run one sweep over the tracker.
    ///
    /// Each (row, category) item is isolated: a collaborator error there is
    /// logged and the sweep continues.
    pub fn run(&self, selection: CategorySelection) -> Result<BulkReport, AutomationError> {
        let settings = AutomationSettings::load(&self.props)?;
        let issue_date = display_date(Utc::now());
        let categories = selection.categories();

        let mut snapshots: HashMap<Category, ContainerSnapshot> = HashMap::new();
        for category in &categories {
            let binding = self.bindings.get(*category);
            snapshots.insert(
                *category,
                ContainerSnapshot::list(&self.store, &binding.container)?,
            );
        }

        let mut report = BulkReport::default();
        for row in self.sheet.rows(TRACKER_SHEET)? {
            if row.row <= HEADER_ROWS {
                continue;
            }
            let name = match row.value(NAME_COLUMN) {
                CellValue::Text(s) if !s.trim().is_empty() => s.trim().to_string(),
                _ => continue,
            };

            for category in &categories {
                if row.background(score_column(*category)) != PASS_BACKGROUND {
                    continue;
                }
                if let Err(e) = self.reconcile_row(
                    &mut snapshots,
                    &row,
                    &name,
                    *category,
                    &issue_date,
                    settings,
                    &mut report,
                ) {
                    warn!(row = row.row, category = %category, subject = %name, error = %e,
                        "bulk reconciliation item failed");
                    report.failures += 1;
                }
            }
        }

        info!(
            generated = report.generated,
            skipped = report.skipped,
            notices = report.notices_sent,
            missing_email = report.missing_email,
            failures = report.failures,
            "bulk reconciliation complete"
        );
        Ok(report)
    }

    #[allow(clippy::too_many_arguments)]
    fn reconcile_row(
        &self,
        snapshots: &mut HashMap<Category, ContainerSnapshot>,
        row: &SheetRow,
        name: &str,
        category: Category,
        issue_date: &str,
        settings: AutomationSettings,
        report: &mut BulkReport,
    ) -> Result<(), AutomationError> {
        let roster = category.roster_sheet();
        let Some(recipient) = self.sheet.roster_email(roster, name)? else {
            report.missing_email += 1;
            self.write_status(row.row, STATUS_NO_EMAIL)?;
            return Ok(());
        };

        let binding = self.bindings.get(category);
        let snapshot = snapshots.entry(category).or_default();
        let ensured = ensure_certificate(
            &self.store,
            &self.renderer,
            snapshot,
            binding,
            category,
            name,
            issue_date,
        )?;
        if ensured.was_created() {
            report.generated += 1;
        } else {
            report.skipped += 1;
        }

        let mut marked_sent = completion_marker_exists(&self.props, name, category, &recipient)?;
        if settings.auto_notify && !marked_sent {
            match send_completion_notice(
                &self.props,
                &self.mailer,
                &self.store,
                category,
                name,
                &recipient,
                ensured.entry(),
            ) {
                Ok(_) => {
                    report.notices_sent += 1;
                    marked_sent = true;
                }
                Err(e) => {
                    // Marker withheld; the next run retries the send.
                    warn!(category = %category, subject = %name, error = %e,
                        "bulk completion notice failed");
                }
            }
        }

        let status = if marked_sent {
            let valid_until = display_date(expiry_date(ensured.created_at()));
            format!("{STATUS_SENT_PREFIX} (Valid until {valid_until})")
        } else if ensured.was_created() {
            STATUS_CREATED.to_string()
        } else {
            STATUS_EXISTS.to_string()
        };
        self.write_status(row.row, &status)
    }

    /// Write a status annotation, never downgrading a row already marked as
    /// sent: evidence that a notification went out must survive re-runs.
    fn write_status(&self, row: u32, status: &str) -> Result<(), AutomationError> {
        let cell = CellRef::new(row, STATUS_COLUMN);
        if !status.starts_with(STATUS_SENT_PREFIX) {
            if let CellValue::Text(current) = self.sheet.cell_value(TRACKER_SHEET, cell)? {
                if current.starts_with(STATUS_SENT_PREFIX) {
                    return Ok(());
                }
            }
        }
        self.sheet
            .set_cell_value(TRACKER_SHEET, cell, CellValue::text(status))?;
        Ok(())
    }
}
