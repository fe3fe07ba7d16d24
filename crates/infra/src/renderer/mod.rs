//! Renderer port.
//!
//! Given a template and the subject fields, the renderer produces the
//! intermediate editable document and the final-form blob. Where those land
//! is the engine's business: the draft is persisted under a temp name and
//! discarded once the final artifact is stored.

use certforge_core::TemplateId;

use crate::document_store::Blob;

pub mod in_memory;

pub use in_memory::InMemoryRenderer;

/// Renderer error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RenderError {
    #[error("template not found: {0}")]
    TemplateNotFound(TemplateId),
    #[error("render failed: {0}")]
    Render(String),
}

/// Substitution fields for one certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateFields {
    pub subject_name: String,
    pub issue_date: String,
}

/// Output of one render: the editable draft and the finalized artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCertificate {
    pub draft: Blob,
    pub artifact: Blob,
}

/// Renderer abstraction.
pub trait TemplateRenderer: Send + Sync {
    fn render(
        &self,
        template: &TemplateId,
        fields: &CertificateFields,
    ) -> Result<RenderedCertificate, RenderError>;
}
