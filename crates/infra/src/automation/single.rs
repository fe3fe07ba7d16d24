//! Single-subject reconciliation.
//!
//! The targeted counterpart of the bulk sweep: one subject, one category,
//! one fresh container listing, the same two idempotency primitives.

use certforge_certs::{Category, CategoryBindings};
use tracing::warn;

use super::AutomationError;
use super::reconcile::{ContainerSnapshot, NoticeOutcome, ensure_certificate, send_completion_notice};
use crate::document_store::DocumentStore;
use crate::mailer::Mailer;
use crate::properties::PropertyStore;
use crate::renderer::TemplateRenderer;

/// One targeted reconciliation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleRequest {
    pub subject_name: String,
    pub category: Category,
    /// Preformatted issue date.
    pub issue_date: String,
    pub recipient: Option<String>,
    pub notify: bool,
}

/// What the targeted run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleOutcome {
    pub created: bool,
    pub notice: Option<NoticeOutcome>,
}

/// Reconcile one subject synchronously.
///
/// A failed send is logged and reported as `notice: None`; the marker stays
/// withheld so a later run retries.
pub fn reconcile_single<S, R, M, P>(
    store: &S,
    renderer: &R,
    mailer: &M,
    props: &P,
    bindings: &CategoryBindings,
    request: &SingleRequest,
) -> Result<SingleOutcome, AutomationError>
where
    S: DocumentStore,
    R: TemplateRenderer,
    M: Mailer,
    P: PropertyStore,
{
    let binding = bindings.get(request.category);
    let mut snapshot = ContainerSnapshot::list(store, &binding.container)?;

    let ensured = ensure_certificate(
        store,
        renderer,
        &mut snapshot,
        binding,
        request.category,
        &request.subject_name,
        &request.issue_date,
    )?;

    let mut notice = None;
    if request.notify {
        if let Some(recipient) = &request.recipient {
            match send_completion_notice(
                props,
                mailer,
                store,
                request.category,
                &request.subject_name,
                recipient,
                ensured.entry(),
            ) {
                Ok(outcome) => notice = Some(outcome),
                Err(e) => {
                    warn!(
                        category = %request.category,
                        subject = %request.subject_name,
                        error = %e,
                        "completion notice failed"
                    );
                }
            }
        }
    }

    Ok(SingleOutcome {
        created: ensured.was_created(),
        notice,
    })
}
