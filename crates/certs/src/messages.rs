//! Notification message content.

use crate::category::Category;

/// Display name messages are sent under.
pub const SENDER_NAME: &str = "Training Certification Team";

/// Rendered subject and bodies of one outbound notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeContent {
    pub subject: String,
    pub body: String,
    pub html_body: String,
}

/// Congratulation notice sent with the freshly issued certificate attached.
pub fn completion_notice(subject_name: &str, category: Category) -> NoticeContent {
    let subject = format!("{category} Certification Training Completed");
    let body = format!(
        "Dear {subject_name},\n\n\
         Congratulations on successfully completing the {category} Certification Training.\n\n\
         We are pleased to present your official certification document, which is attached to \
         this email. This certification validates your expertise at the {category} level.\n\n\
         If you have any questions regarding your certification or wish to explore additional \
         training opportunities, please do not hesitate to contact us.\n\n\
         Best regards,\n{SENDER_NAME}"
    );
    let html_body = format!(
        "<p>Dear {subject_name},</p>\
         <p>Congratulations on successfully completing the <strong>{category} Certification \
         Training</strong>.</p>\
         <p>We are pleased to present your official certification document, which is attached to \
         this email. This certification validates your expertise at the {category} level.</p>\
         <p>If you have any questions regarding your certification or wish to explore additional \
         training opportunities, please do not hesitate to contact us.</p>\
         <p>Best regards,<br>{SENDER_NAME}</p>"
    );
    NoticeContent {
        subject,
        body,
        html_body,
    }
}

/// Warning notice sent when a certificate approaches expiry.
pub fn expiry_notice(
    subject_name: &str,
    category: Category,
    expiry_display: &str,
    days_remaining: i64,
) -> NoticeContent {
    let subject = format!("Your {category} Certification is About to Expire");
    let body = format!(
        "Dear {subject_name},\n\n\
         Your {category} Certification will expire on {expiry_display} (in approximately \
         {days_remaining} days).\n\n\
         To maintain your certified status, please consider scheduling a recertification exam \
         at your earliest convenience.\n\n\
         Best regards,\n{SENDER_NAME}"
    );
    let html_body = format!(
        "<p>Dear {subject_name},</p>\
         <p>Your <strong>{category} Certification</strong> will expire on \
         <strong>{expiry_display}</strong> (in approximately <strong>{days_remaining} days</strong>).</p>\
         <p>To maintain your certified status, please consider scheduling a recertification exam \
         at your earliest convenience.</p>\
         <p>Best regards,<br>{SENDER_NAME}</p>"
    );
    NoticeContent {
        subject,
        body,
        html_body,
    }
}
