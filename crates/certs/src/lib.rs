//! `certforge-certs` — certificate domain model.
//!
//! Categories and their external bindings, artifact naming, validity
//! arithmetic, and notification message content. Pure domain logic; all IO
//! lives behind the infra ports.

pub mod category;
pub mod messages;
pub mod naming;
pub mod validity;

pub use category::{Category, CategoryBinding, CategoryBindings};
pub use messages::{NoticeContent, SENDER_NAME, completion_notice, expiry_notice};
pub use naming::{certificate_file_name, draft_file_name, is_certificate_file, subject_from_file_name};
pub use validity::{days_until, display_date, expiry_date, in_warning_window};
