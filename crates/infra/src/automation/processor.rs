//! Deferred job processor.
//!
//! Invoked by the scheduler with no input: it discovers all pending work
//! itself, reconciles each descriptor against external state, and disarms
//! its own schedule when done.

use std::collections::HashMap;

use tracing::{info, warn};

use certforge_certs::{Category, CategoryBindings};

use super::AutomationError;
use super::edit::PROCESS_CALLBACK;
use super::reconcile::{ContainerSnapshot, NoticeOutcome, ensure_certificate, send_completion_notice};
use crate::document_store::DocumentStore;
use crate::jobs::{CertificateJob, JobQueue};
use crate::mailer::Mailer;
use crate::properties::PropertyStore;
use crate::renderer::TemplateRenderer;
use crate::scheduler::TriggerScheduler;

/// Summary of one drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct DrainReport {
    /// Descriptors taken off the queue (each deleted exactly once).
    pub processed: usize,
    /// Fresh artifacts stored.
    pub certificates_created: usize,
    /// Completion notices dispatched.
    pub notices_sent: usize,
    /// Descriptors whose processing raised an error (still deleted).
    pub failures: usize,
    /// Scheduler registrations removed while disarming.
    pub triggers_cleared: usize,
}

#[derive(Debug, Clone, Copy)]
struct JobOutcome {
    created: bool,
    sent: bool,
    notify_failed: bool,
}

/// The deferred entry point: drains every queued descriptor.
pub struct JobProcessor<P, S, R, M, T> {
    props: P,
    queue: JobQueue<P>,
    store: S,
    renderer: R,
    mailer: M,
    scheduler: T,
    bindings: CategoryBindings,
}

impl<P, S, R, M, T> JobProcessor<P, S, R, M, T>
where
    P: PropertyStore + Clone,
    S: DocumentStore,
    R: TemplateRenderer,
    M: Mailer,
    T: TriggerScheduler,
{
    pub fn new(
        props: P,
        store: S,
        renderer: R,
        mailer: M,
        scheduler: T,
        bindings: CategoryBindings,
    ) -> Self {
        let queue = JobQueue::new(props.clone());
        Self {
            props,
            queue,
            store,
            renderer,
            mailer,
            scheduler,
            bindings,
        }
    }

    /// Run one drain.
    ///
    /// Containers are listed once up front; per-descriptor failures are
    /// logged and do not abort the rest of the drain; every descriptor is
    /// deleted after its single attempt.
    pub fn run(&self) -> Result<DrainReport, AutomationError> {
        let mut snapshots: HashMap<Category, ContainerSnapshot> = HashMap::new();
        for (category, binding) in self.bindings.iter() {
            let snapshot = ContainerSnapshot::list(&self.store, &binding.container)?;
            snapshots.insert(category, snapshot);
        }

        let mut report = DrainReport::default();
        for queued in self.queue.pending()? {
            match self.process_one(&mut snapshots, &queued.job) {
                Ok(outcome) => {
                    if outcome.created {
                        report.certificates_created += 1;
                    }
                    if outcome.sent {
                        report.notices_sent += 1;
                    }
                    if outcome.notify_failed {
                        report.failures += 1;
                    }
                }
                Err(e) => {
                    warn!(job_key = %queued.key, error = %e, "certificate job failed");
                    report.failures += 1;
                }
            }
            // At-most-one-attempt: the descriptor goes away no matter what.
            self.queue.remove(&queued.key)?;
            report.processed += 1;
        }

        report.triggers_cleared = self.scheduler.clear(PROCESS_CALLBACK)?;

        if report.processed > 0 {
            info!(
                processed = report.processed,
                created = report.certificates_created,
                notices = report.notices_sent,
                failures = report.failures,
                "certificate job drain complete"
            );
        }
        Ok(report)
    }

    fn process_one(
        &self,
        snapshots: &mut HashMap<Category, ContainerSnapshot>,
        job: &CertificateJob,
    ) -> Result<JobOutcome, AutomationError> {
        let binding = self.bindings.get(job.category);
        let snapshot = snapshots.entry(job.category).or_default();

        let ensured = ensure_certificate(
            &self.store,
            &self.renderer,
            snapshot,
            binding,
            job.category,
            &job.subject_name,
            &job.issue_date,
        )?;

        let mut outcome = JobOutcome {
            created: ensured.was_created(),
            sent: false,
            notify_failed: false,
        };
        if job.notify {
            if let Some(recipient) = &job.recipient {
                // A failed send never fails the descriptor: the marker stays
                // withheld and a future pass retries.
                match send_completion_notice(
                    &self.props,
                    &self.mailer,
                    &self.store,
                    job.category,
                    &job.subject_name,
                    recipient,
                    ensured.entry(),
                ) {
                    Ok(notice) => outcome.sent = notice == NoticeOutcome::Sent,
                    Err(e) => {
                        warn!(
                            category = %job.category,
                            subject = %job.subject_name,
                            recipient = %recipient,
                            error = %e,
                            "completion notice failed"
                        );
                        outcome.notify_failed = true;
                    }
                }
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_store::{Blob, InMemoryDocumentStore};
    use crate::mailer::InMemoryMailer;
    use crate::properties::InMemoryPropertyStore;
    use crate::renderer::InMemoryRenderer;
    use crate::scheduler::InMemoryTriggerScheduler;
    use certforge_certs::CategoryBinding;
    use certforge_core::{ContainerId, TemplateId};
    use chrono::Utc;
    use std::sync::Arc;
    use std::time::Duration;

    type TestProcessor = JobProcessor<
        Arc<InMemoryPropertyStore>,
        Arc<InMemoryDocumentStore>,
        Arc<InMemoryRenderer>,
        Arc<InMemoryMailer>,
        Arc<InMemoryTriggerScheduler>,
    >;

    struct Fixture {
        processor: TestProcessor,
        props: Arc<InMemoryPropertyStore>,
        store: Arc<InMemoryDocumentStore>,
        mailer: Arc<InMemoryMailer>,
        scheduler: Arc<InMemoryTriggerScheduler>,
        queue: JobQueue<Arc<InMemoryPropertyStore>>,
    }

    fn bindings() -> CategoryBindings {
        CategoryBindings::new(
            CategoryBinding::new("tpl-basic", "folder-basic"),
            CategoryBinding::new("tpl-intermediate", "folder-intermediate"),
            CategoryBinding::new("tpl-advanced", "folder-advanced"),
        )
    }

    fn fixture() -> Fixture {
        let props = InMemoryPropertyStore::arc();
        let store = InMemoryDocumentStore::arc();
        for (_, binding) in bindings().iter() {
            store.add_container(&binding.container);
        }
        let renderer = InMemoryRenderer::arc();
        for (_, binding) in bindings().iter() {
            renderer.register_template(&binding.template, "To <<NAME>> on <<DATE>>");
        }
        let mailer = InMemoryMailer::arc();
        let scheduler = InMemoryTriggerScheduler::arc();
        let processor = JobProcessor::new(
            Arc::clone(&props),
            Arc::clone(&store),
            Arc::clone(&renderer),
            Arc::clone(&mailer),
            Arc::clone(&scheduler),
            bindings(),
        );
        let queue = JobQueue::new(Arc::clone(&props));
        Fixture {
            processor,
            props,
            store,
            mailer,
            scheduler,
            queue,
        }
    }

    fn basic_job(name: &str) -> CertificateJob {
        CertificateJob::new(
            name,
            Category::Basic,
            TemplateId::new("tpl-basic"),
            ContainerId::new("folder-basic"),
            "March 4, 2026",
        )
        .with_recipient(format!("{}@example.com", name.to_lowercase().replace(' ', ".")), true)
    }

    #[test]
    fn drain_creates_notifies_deletes_and_disarms() {
        let f = fixture();
        f.queue.push(&basic_job("Jane Doe"), Utc::now()).unwrap();
        f.scheduler
            .register(PROCESS_CALLBACK, Duration::from_secs(1))
            .unwrap();

        let report = f.processor.run().unwrap();
        assert_eq!(report.processed, 1);
        assert_eq!(report.certificates_created, 1);
        assert_eq!(report.notices_sent, 1);
        assert_eq!(report.failures, 0);
        assert_eq!(report.triggers_cleared, 1);

        assert_eq!(f.store.live_count(&ContainerId::new("folder-basic")), 1);
        assert_eq!(f.mailer.sent_to("jane.doe@example.com"), 1);
        assert!(f.queue.pending().unwrap().is_empty());
        assert_eq!(f.scheduler.pending(PROCESS_CALLBACK), 0);
    }

    #[test]
    fn second_drain_is_a_no_op() {
        let f = fixture();
        f.queue.push(&basic_job("Jane Doe"), Utc::now()).unwrap();
        f.processor.run().unwrap();

        let report = f.processor.run().unwrap();
        assert_eq!(report.processed, 0);
        assert_eq!(report.certificates_created, 0);
        assert_eq!(report.notices_sent, 0);
        assert_eq!(f.store.live_count(&ContainerId::new("folder-basic")), 1);
        assert_eq!(f.mailer.sent_to("jane.doe@example.com"), 1);
    }

    #[test]
    fn existing_artifact_suppresses_creation_but_not_notification() {
        let f = fixture();
        f.store
            .create(
                &ContainerId::new("folder-basic"),
                "Basic Certificate - Jane Doe.pdf",
                Blob::new("application/pdf", b"existing".to_vec()),
            )
            .unwrap();
        f.queue.push(&basic_job("Jane Doe"), Utc::now()).unwrap();

        let report = f.processor.run().unwrap();
        assert_eq!(report.certificates_created, 0);
        assert_eq!(report.notices_sent, 1);
        assert_eq!(f.store.live_count(&ContainerId::new("folder-basic")), 1);
        // The attached blob is the existing artifact, not a re-render.
        let sent = f.mailer.sent();
        assert_eq!(
            sent[0].attachment.as_ref().unwrap().blob.bytes,
            b"existing".to_vec()
        );
    }

    #[test]
    fn marker_suppresses_notification() {
        let f = fixture();
        let job = basic_job("Jane Doe");
        f.queue.push(&job, Utc::now()).unwrap();
        f.processor.run().unwrap();

        // Same triple again: artifact and marker both already present.
        f.queue.push(&job, Utc::now()).unwrap();
        let report = f.processor.run().unwrap();
        assert_eq!(report.certificates_created, 0);
        assert_eq!(report.notices_sent, 0);
        assert_eq!(f.mailer.sent_to("jane.doe@example.com"), 1);
    }

    #[test]
    fn two_descriptors_for_one_subject_create_one_artifact() {
        let f = fixture();
        let job = basic_job("Jane Doe");
        f.queue.push(&job, Utc::now()).unwrap();
        f.queue
            .push(&job, Utc::now() + chrono::Duration::milliseconds(5))
            .unwrap();

        let report = f.processor.run().unwrap();
        assert_eq!(report.processed, 2);
        // The in-run snapshot update catches the second descriptor.
        assert_eq!(report.certificates_created, 1);
        assert_eq!(report.notices_sent, 1);
        assert_eq!(f.store.live_count(&ContainerId::new("folder-basic")), 1);
    }

    #[test]
    fn failing_descriptor_is_deleted_and_isolated() {
        let f = fixture();
        // Unregistered template makes the render fail.
        let broken = CertificateJob::new(
            "Broken",
            Category::Basic,
            TemplateId::new("no-such-template"),
            ContainerId::new("folder-basic"),
            "March 4, 2026",
        );
        f.queue.push(&broken, Utc::now()).unwrap();
        f.queue
            .push(&basic_job("Jane Doe"), Utc::now() + chrono::Duration::milliseconds(5))
            .unwrap();

        let report = f.processor.run().unwrap();
        assert_eq!(report.processed, 2);
        assert_eq!(report.failures, 1);
        // The healthy descriptor still went through.
        assert_eq!(report.certificates_created, 1);
        // The failing descriptor is gone: no retry loop.
        assert!(f.queue.pending().unwrap().is_empty());
    }

    #[test]
    fn notification_failure_leaves_retry_open() {
        let f = fixture();
        f.mailer.reject("jane.doe@example.com");
        f.queue.push(&basic_job("Jane Doe"), Utc::now()).unwrap();

        let report = f.processor.run().unwrap();
        assert_eq!(report.certificates_created, 1);
        assert_eq!(report.notices_sent, 0);
        assert_eq!(report.failures, 1);

        // A later job for the same triple retries the send (marker absent).
        f.mailer.accept("jane.doe@example.com");
        f.queue.push(&basic_job("Jane Doe"), Utc::now()).unwrap();
        let report = f.processor.run().unwrap();
        assert_eq!(report.notices_sent, 1);
        assert_eq!(f.mailer.sent_to("jane.doe@example.com"), 1);
        // No duplicate artifact either.
        assert_eq!(f.store.live_count(&ContainerId::new("folder-basic")), 1);
    }

    #[test]
    fn descriptor_without_notify_sends_nothing() {
        let f = fixture();
        let mut job = basic_job("Jane Doe");
        job.notify = false;
        f.queue.push(&job, Utc::now()).unwrap();

        let report = f.processor.run().unwrap();
        assert_eq!(report.certificates_created, 1);
        assert_eq!(report.notices_sent, 0);
        assert!(f.mailer.sent().is_empty());
        // No marker written: a later notify-enabled run may still send.
        assert!(f.props.get("notice/sent/Basic/Jane_Doe/jane.doe@example.com").unwrap().is_none());
    }
}
