//! Artifact naming convention.
//!
//! The display name is the externally visible identity of a certificate:
//! `"<category> Certificate - <name>.pdf"`. Duplicate detection compares
//! display names case-insensitively, so callers should treat the lowercased
//! form as the lookup key.

use crate::category::Category;

const CERTIFICATE_MARKER: &str = " Certificate - ";
const PDF_SUFFIX: &str = ".pdf";

/// Display name of the finalized certificate artifact.
pub fn certificate_file_name(category: Category, subject_name: &str) -> String {
    format!("{}{}{}{}", category, CERTIFICATE_MARKER, subject_name, PDF_SUFFIX)
}

/// Name for the intermediate editable copy, unique per attempt.
///
/// The millisecond timestamp keeps concurrent attempts from colliding before
/// the draft is trashed.
pub fn draft_file_name(category: Category, subject_name: &str, millis: i64) -> String {
    format!(
        "{}{}{} (temp-{})",
        category, CERTIFICATE_MARKER, subject_name, millis
    )
}

/// Whether a display name follows the certificate naming convention.
pub fn is_certificate_file(file_name: &str) -> bool {
    file_name.contains(CERTIFICATE_MARKER) && file_name.ends_with(PDF_SUFFIX)
}

/// Extract the subject name back out of a certificate display name.
///
/// Returns `None` for names outside the convention (including temp drafts,
/// which do not carry the `.pdf` suffix).
pub fn subject_from_file_name(file_name: &str) -> Option<&str> {
    let stem = file_name.strip_suffix(PDF_SUFFIX)?;
    let marker = stem.find(CERTIFICATE_MARKER)?;
    let subject = &stem[marker + CERTIFICATE_MARKER.len()..];
    if subject.is_empty() { None } else { Some(subject) }
}
