//! Periodic expiry scan.
//!
//! Expiry is always recomputed from the artifact's creation timestamp — no
//! ledger of expiry dates exists to drift out of sync. Warnings are guarded
//! by markers keyed on the *formatted expiry date*, so a later expiry (after
//! recertification produces a new artifact) generates a fresh warning
//! instead of being suppressed by a stale marker.

use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use certforge_certs::{
    Category, CategoryBindings, days_until, display_date, expiry_date, expiry_notice,
    in_warning_window, is_certificate_file, subject_from_file_name,
};
use certforge_core::TriggerId;

use super::AutomationError;
use super::reconcile::write_marker;
use crate::document_store::DocumentStore;
use crate::jobs::key_segment;
use crate::mailer::{Mailer, OutboundMessage};
use crate::properties::{PropertyError, PropertyStore, purge_prefix};
use crate::scheduler::TriggerScheduler;
use crate::spreadsheet::Spreadsheet;

/// Callback name the scan registers under.
pub const EXPIRY_CALLBACK: &str = "certificate-expiry-scan";

/// Scan cadence.
pub const EXPIRY_SCAN_PERIOD: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Namespace prefix for expiry-warning markers.
pub const EXPIRY_PREFIX: &str = "notice/expiry/";

/// Marker key for one expiry warning.
pub fn expiry_marker_key(subject_name: &str, category: Category, expiry_display: &str) -> String {
    format!(
        "{}{}/{}/{}",
        EXPIRY_PREFIX,
        category,
        key_segment(subject_name),
        key_segment(expiry_display)
    )
}

/// Summary of one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ExpiryReport {
    /// Artifacts matching the certificate naming convention.
    pub scanned: usize,
    /// Artifacts whose remaining validity fell inside the warning window.
    pub in_window: usize,
    /// Warnings dispatched.
    pub notices_sent: usize,
    /// Warnings suppressed by an existing marker.
    pub already_warned: usize,
    /// In-window artifacts whose roster join produced no address.
    pub missing_recipient: usize,
}

/// The weekly expiry scan.
pub struct ExpiryScan<Sh, S, M, P> {
    sheet: Sh,
    store: S,
    mailer: M,
    props: P,
    bindings: CategoryBindings,
}

impl<Sh, S, M, P> ExpiryScan<Sh, S, M, P>
where
    Sh: Spreadsheet,
    S: DocumentStore,
    M: Mailer,
    P: PropertyStore,
{
    pub fn new(sheet: Sh, store: S, mailer: M, props: P, bindings: CategoryBindings) -> Self {
        Self {
            sheet,
            store,
            mailer,
            props,
            bindings,
        }
    }

    /// Arm the weekly schedule.
    ///
    /// Idempotent: existing registrations for the scan callback are removed
    /// first, so repeated setup calls never stack weekly firings.
    pub fn arm<T: TriggerScheduler>(scheduler: &T) -> Result<TriggerId, AutomationError> {
        scheduler.clear(EXPIRY_CALLBACK)?;
        Ok(scheduler.register_recurring(EXPIRY_CALLBACK, EXPIRY_SCAN_PERIOD)?)
    }

    /// Run one scan over every destination container.
    ///
    /// A container that fails to list is logged and skipped; the scan
    /// continues with the remaining categories.
    pub fn run(&self) -> Result<ExpiryReport, AutomationError> {
        let now = Utc::now();
        let mut report = ExpiryReport::default();

        for (category, binding) in self.bindings.iter() {
            let entries = match self.store.list(&binding.container) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(%category, container = %binding.container, error = %e,
                        "expiry scan could not list container");
                    continue;
                }
            };

            for entry in entries {
                if !is_certificate_file(&entry.name) {
                    continue;
                }
                report.scanned += 1;

                let expiry = expiry_date(entry.created_at);
                let days_remaining = days_until(expiry, now);
                if !in_warning_window(days_remaining) {
                    continue;
                }
                report.in_window += 1;

                let Some(subject) = subject_from_file_name(&entry.name) else {
                    continue;
                };
                let expiry_display = display_date(expiry);
                let marker = expiry_marker_key(subject, category, &expiry_display);
                if self.props.get(&marker)?.is_some() {
                    report.already_warned += 1;
                    continue;
                }

                let roster = category.roster_sheet();
                let recipient = match self.sheet.roster_email(roster, subject) {
                    Ok(Some(address)) => address,
                    Ok(None) => {
                        warn!(%category, subject, "no roster address for expiring certificate");
                        report.missing_recipient += 1;
                        continue;
                    }
                    Err(e) => {
                        warn!(%category, subject, error = %e, "roster lookup failed");
                        report.missing_recipient += 1;
                        continue;
                    }
                };

                let content = expiry_notice(subject, category, &expiry_display, days_remaining);
                match self.mailer.send(OutboundMessage {
                    to: recipient.clone(),
                    subject: content.subject,
                    body: content.body,
                    html_body: Some(content.html_body),
                    attachment: None,
                    sender_name: certforge_certs::SENDER_NAME.to_string(),
                }) {
                    Ok(()) => {
                        write_marker(&self.props, &marker)?;
                        report.notices_sent += 1;
                        info!(%category, subject, recipient = %recipient,
                            expiry = %expiry_display, "expiry warning sent");
                    }
                    Err(e) => {
                        // Marker withheld; next week's scan retries.
                        warn!(%category, subject, error = %e, "expiry warning failed");
                    }
                }
            }
        }

        info!(
            scanned = report.scanned,
            in_window = report.in_window,
            notices = report.notices_sent,
            "expiry scan complete"
        );
        Ok(report)
    }
}

/// Purge all expiry-warning markers; returns how many were removed.
///
/// Markers are never destroyed by normal processing — only by this explicit
/// cleanup.
pub fn purge_expiry_markers<P: PropertyStore>(props: &P) -> Result<usize, PropertyError> {
    purge_prefix(props, EXPIRY_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_store::{Blob, InMemoryDocumentStore};
    use crate::mailer::InMemoryMailer;
    use crate::properties::InMemoryPropertyStore;
    use crate::scheduler::InMemoryTriggerScheduler;
    use crate::spreadsheet::InMemorySpreadsheet;
    use certforge_certs::{CategoryBinding, certificate_file_name};
    use certforge_core::ContainerId;
    use std::sync::Arc;

    type TestScan = ExpiryScan<
        Arc<InMemorySpreadsheet>,
        Arc<InMemoryDocumentStore>,
        Arc<InMemoryMailer>,
        Arc<InMemoryPropertyStore>,
    >;

    struct Fixture {
        scan: TestScan,
        sheet: Arc<InMemorySpreadsheet>,
        store: Arc<InMemoryDocumentStore>,
        mailer: Arc<InMemoryMailer>,
        props: Arc<InMemoryPropertyStore>,
    }

    fn bindings() -> CategoryBindings {
        CategoryBindings::new(
            CategoryBinding::new("tpl-basic", "folder-basic"),
            CategoryBinding::new("tpl-intermediate", "folder-intermediate"),
            CategoryBinding::new("tpl-advanced", "folder-advanced"),
        )
    }

    fn fixture() -> Fixture {
        let sheet = InMemorySpreadsheet::arc();
        let store = InMemoryDocumentStore::arc();
        for (_, binding) in bindings().iter() {
            store.add_container(&binding.container);
        }
        let mailer = InMemoryMailer::arc();
        let props = InMemoryPropertyStore::arc();
        let scan = ExpiryScan::new(
            Arc::clone(&sheet),
            Arc::clone(&store),
            Arc::clone(&mailer),
            Arc::clone(&props),
            bindings(),
        );
        Fixture {
            scan,
            sheet,
            store,
            mailer,
            props,
        }
    }

    fn seed_certificate(f: &Fixture, category: Category, subject: &str, age_days: i64) {
        let container = bindings().get(category).container.clone();
        f.store
            .create_backdated(
                &container,
                &certificate_file_name(category, subject),
                Blob::new("application/pdf", b"pdf".to_vec()),
                Utc::now() - chrono::Duration::days(age_days),
            )
            .unwrap();
    }

    #[test]
    fn certificate_inside_the_window_triggers_one_warning() {
        let f = fixture();
        // 350 days old: ~15 days from a 365-day expiry.
        seed_certificate(&f, Category::Basic, "Jane Doe", 350);
        f.sheet
            .add_roster_entry(Category::Basic.roster_sheet(), 2, "Jane Doe", "jane@example.com");

        let report = f.scan.run().unwrap();
        assert_eq!(report.scanned, 1);
        assert_eq!(report.in_window, 1);
        assert_eq!(report.notices_sent, 1);
        assert_eq!(f.mailer.sent_to("jane@example.com"), 1);

        let message = &f.mailer.sent()[0];
        assert!(message.subject.contains("About to Expire"));
        assert!(message.attachment.is_none());

        // The next scan is suppressed by the marker.
        let report = f.scan.run().unwrap();
        assert_eq!(report.notices_sent, 0);
        assert_eq!(report.already_warned, 1);
        assert_eq!(f.mailer.sent_to("jane@example.com"), 1);
    }

    #[test]
    fn fresh_and_expired_certificates_are_outside_the_window() {
        let f = fixture();
        seed_certificate(&f, Category::Basic, "Fresh", 10);
        seed_certificate(&f, Category::Basic, "Long Gone", 400);
        f.sheet.add_sheet(Category::Basic.roster_sheet());

        let report = f.scan.run().unwrap();
        assert_eq!(report.scanned, 2);
        assert_eq!(report.in_window, 0);
        assert!(f.mailer.sent().is_empty());
    }

    #[test]
    fn non_certificate_files_are_ignored() {
        let f = fixture();
        f.store
            .create_backdated(
                &ContainerId::new("folder-basic"),
                "notes.txt",
                Blob::new("text/plain", vec![]),
                Utc::now() - chrono::Duration::days(350),
            )
            .unwrap();

        let report = f.scan.run().unwrap();
        assert_eq!(report.scanned, 0);
    }

    #[test]
    fn a_newer_artifact_earns_a_fresh_warning() {
        let f = fixture();
        seed_certificate(&f, Category::Basic, "Jane Doe", 350);
        f.sheet
            .add_roster_entry(Category::Basic.roster_sheet(), 2, "Jane Doe", "jane@example.com");
        f.scan.run().unwrap();
        assert_eq!(f.mailer.sent_to("jane@example.com"), 1);

        // Recertification: the old artifact is replaced by a newer one that
        // itself ages into the window. The marker keys on the formatted
        // expiry date, so the new expiry is not suppressed.
        let listed = f.store.list(&ContainerId::new("folder-basic")).unwrap();
        f.store.trash(&listed[0].id).unwrap();
        seed_certificate(&f, Category::Basic, "Jane Doe", 340);

        let report = f.scan.run().unwrap();
        assert_eq!(report.notices_sent, 1);
        assert_eq!(f.mailer.sent_to("jane@example.com"), 2);
    }

    #[test]
    fn missing_roster_address_skips_only_that_artifact() {
        let f = fixture();
        seed_certificate(&f, Category::Basic, "Nobody", 350);
        seed_certificate(&f, Category::Basic, "Jane Doe", 350);
        f.sheet
            .add_roster_entry(Category::Basic.roster_sheet(), 2, "Jane Doe", "jane@example.com");

        let report = f.scan.run().unwrap();
        assert_eq!(report.missing_recipient, 1);
        assert_eq!(report.notices_sent, 1);
        assert_eq!(f.mailer.sent_to("jane@example.com"), 1);
    }

    #[test]
    fn failed_warning_retries_on_the_next_scan() {
        let f = fixture();
        seed_certificate(&f, Category::Basic, "Jane Doe", 350);
        f.sheet
            .add_roster_entry(Category::Basic.roster_sheet(), 2, "Jane Doe", "jane@example.com");
        f.mailer.reject("jane@example.com");

        let report = f.scan.run().unwrap();
        assert_eq!(report.notices_sent, 0);

        f.mailer.accept("jane@example.com");
        let report = f.scan.run().unwrap();
        assert_eq!(report.notices_sent, 1);
    }

    #[test]
    fn arming_is_idempotent() {
        let scheduler = InMemoryTriggerScheduler::new();
        TestScan::arm(&scheduler).unwrap();
        TestScan::arm(&scheduler).unwrap();
        TestScan::arm(&scheduler).unwrap();
        assert_eq!(scheduler.pending(EXPIRY_CALLBACK), 1);
    }

    #[test]
    fn purge_clears_only_expiry_markers() {
        let f = fixture();
        f.props.set("notice/expiry/Basic/a/March_4,_2026", "t").unwrap();
        f.props.set("notice/sent/Basic/a/a@example.com", "t").unwrap();

        let removed = purge_expiry_markers(f.props.as_ref()).unwrap();
        assert_eq!(removed, 1);
        assert!(f.props.get("notice/sent/Basic/a/a@example.com").unwrap().is_some());
    }
}
