//! In-memory renderer for tests/dev.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use certforge_core::TemplateId;

use super::{CertificateFields, RenderError, RenderedCertificate, TemplateRenderer};
use crate::document_store::Blob;

/// Placeholder replaced by the subject name.
pub const NAME_PLACEHOLDER: &str = "<<NAME>>";

/// Placeholder replaced by the issue date.
pub const DATE_PLACEHOLDER: &str = "<<DATE>>";

/// In-memory renderer: registered templates are text bodies with
/// `<<NAME>>`/`<<DATE>>` placeholders; the "pdf" is the substituted text.
#[derive(Debug, Default)]
pub struct InMemoryRenderer {
    templates: RwLock<HashMap<TemplateId, String>>,
}

impl InMemoryRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn register_template(&self, template: &TemplateId, body: &str) {
        let mut templates = self.templates.write().unwrap();
        templates.insert(template.clone(), body.to_string());
    }
}

impl TemplateRenderer for InMemoryRenderer {
    fn render(
        &self,
        template: &TemplateId,
        fields: &CertificateFields,
    ) -> Result<RenderedCertificate, RenderError> {
        let templates = self.templates.read().unwrap();
        let body = templates
            .get(template)
            .ok_or_else(|| RenderError::TemplateNotFound(template.clone()))?;

        let substituted = body
            .replace(NAME_PLACEHOLDER, &fields.subject_name)
            .replace(DATE_PLACEHOLDER, &fields.issue_date);

        Ok(RenderedCertificate {
            draft: Blob::new("application/vnd.certforge.draft", substituted.clone()),
            artifact: Blob::new("application/pdf", substituted),
        })
    }
}

impl TemplateRenderer for Arc<InMemoryRenderer> {
    fn render(
        &self,
        template: &TemplateId,
        fields: &CertificateFields,
    ) -> Result<RenderedCertificate, RenderError> {
        (**self).render(template, fields)
    }
}
