//! Contact submission flow: validate, render the two email documents,
//! dispatch both through the mail relay.
//!
//! Submissions are ephemeral. They are validated, rendered, sent, and
//! discarded; nothing is persisted and resubmission sends duplicate mail.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::constants::{
    CRISIS_HOTLINE, EMERGENCY_SERVICES, EMERGENCY_SUBJECT, PRACTICE_NAME, RESPONSE_TIME_PROMISE,
};
use crate::services::error::ApiError;
use crate::services::mail::{Mailer, OutboundEmail};

/// Raw request body. Fields are optional so that absent keys fall through
/// to the required-fields check instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// A validated submission. All fields are trimmed; `phone` is dropped
/// entirely when blank.
#[derive(Debug, Clone)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
}

impl ContactSubmission {
    fn is_emergency(&self) -> bool {
        self.subject == EMERGENCY_SUBJECT
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Check the submission shape. Order matters: missing fields are reported
/// before a malformed email address.
pub fn validate(req: &ContactRequest) -> Result<ContactSubmission, ApiError> {
    let name = req.name.as_deref().unwrap_or("").trim();
    let email = req.email.as_deref().unwrap_or("").trim();
    let subject = req.subject.as_deref().unwrap_or("").trim();
    let message = req.message.as_deref().unwrap_or("").trim();

    if name.is_empty() || email.is_empty() || subject.is_empty() || message.is_empty() {
        return Err(ApiError::Validation("Missing required fields"));
    }

    if !is_valid_email(email) {
        return Err(ApiError::Validation("Invalid email format"));
    }

    let phone = req
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string);

    Ok(ContactSubmission {
        name: name.to_string(),
        email: email.to_string(),
        phone,
        subject: subject.to_string(),
        message: message.to_string(),
    })
}

/// Simple `local@domain.tld` shape check: no whitespace, exactly one `@`
/// with a non-empty local part, and a domain containing an interior dot.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rfind('.') {
        Some(i) => i > 0 && i + 1 < domain.len(),
        None => false,
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Escape user-supplied text for interpolation into email HTML.
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// The notice sent to the practice inbox. Reply-To is the visitor, so the
/// operator can answer directly from their mail client.
pub fn operator_notice(
    submission: &ContactSubmission,
    operator_address: &str,
    received_at: DateTime<Utc>,
) -> OutboundEmail {
    let urgency_prefix = if submission.is_emergency() {
        "URGENT - "
    } else {
        ""
    };
    let priority_label = if submission.is_emergency() {
        "URGENT - Emergency"
    } else {
        "Normal Priority"
    };

    let phone_row = match &submission.phone {
        Some(phone) => format!(
            "<p><strong>Phone:</strong> {}</p>\n",
            escape_html(phone)
        ),
        None => String::new(),
    };
    let message_html = escape_html(&submission.message).replace('\n', "<br>");

    let html_body = format!(
        "<!DOCTYPE html>\n<html>\n<body>\n\
         <h1>New Contact Form Submission</h1>\n\
         <p><strong>Priority:</strong> {priority}</p>\n\
         <p><strong>Name:</strong> {name}</p>\n\
         <p><strong>Email:</strong> {email}</p>\n\
         {phone_row}\
         <p><strong>Subject:</strong> {subject}</p>\n\
         <p><strong>Message:</strong><br>{message}</p>\n\
         <hr>\n\
         <p><strong>{practice} Contact Form</strong><br>\n\
         <em>Received at: {received_at}</em></p>\n\
         </body>\n</html>\n",
        priority = priority_label,
        name = escape_html(&submission.name),
        email = escape_html(&submission.email),
        phone_row = phone_row,
        subject = escape_html(&submission.subject),
        message = message_html,
        practice = PRACTICE_NAME,
        received_at = received_at.format("%Y-%m-%d %H:%M:%S UTC"),
    );

    OutboundEmail {
        to: operator_address.to_string(),
        reply_to: Some(submission.email.clone()),
        subject: format!(
            "{}New Contact: {} - {}",
            urgency_prefix, submission.subject, submission.name
        ),
        html_body,
    }
}

/// The automated acknowledgment sent back to the visitor. Emergency
/// submissions additionally get crisis-hotline contact information.
pub fn visitor_acknowledgment(submission: &ContactSubmission) -> OutboundEmail {
    let crisis_block = if submission.is_emergency() {
        format!(
            "<div>\n\
             <h3>Important - Emergency Support</h3>\n\
             <p><strong>If you are experiencing a mental health crisis, please do not wait for a response.</strong></p>\n\
             <p>Call <strong>{hotline}</strong> for immediate crisis support or <strong>{services}</strong> for emergency services.</p>\n\
             <p>Your safety and wellbeing are the top priority.</p>\n\
             </div>\n",
            hotline = CRISIS_HOTLINE,
            services = EMERGENCY_SERVICES,
        )
    } else {
        String::new()
    };

    let html_body = format!(
        "<!DOCTYPE html>\n<html>\n<body>\n\
         <h1>Thank You, {name}!</h1>\n\
         <p>I have received your message regarding \"{subject}\" and truly appreciate you reaching out to {practice}.</p>\n\
         <p><strong>What happens next:</strong></p>\n\
         <ul>\n\
         <li>I will review your message with careful attention</li>\n\
         <li>You will receive a personal response within {promise}</li>\n\
         <li>We can schedule a consultation if appropriate</li>\n\
         <li>All communications remain strictly confidential</li>\n\
         </ul>\n\
         {crisis_block}\
         <hr>\n\
         <p><strong>{practice}</strong><br>\n\
         <em>This is an automated response. Please do not reply to this email directly.</em></p>\n\
         </body>\n</html>\n",
        name = escape_html(&submission.name),
        subject = escape_html(&submission.subject),
        practice = PRACTICE_NAME,
        promise = RESPONSE_TIME_PROMISE,
        crisis_block = crisis_block,
    );

    OutboundEmail {
        to: submission.email.clone(),
        reply_to: None,
        subject: format!("Thank you for contacting {}", PRACTICE_NAME),
        html_body,
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Render both documents and hand them to the relay. Both sends are always
/// attempted; failures are logged individually and collapsed into one
/// generic upstream error for the caller.
pub async fn notify<M: Mailer>(
    mailer: &M,
    operator_address: &str,
    submission: &ContactSubmission,
) -> Result<(), ApiError> {
    let notice = operator_notice(submission, operator_address, Utc::now());
    let ack = visitor_acknowledgment(submission);

    let notice_result = mailer.send(&notice).await;
    let ack_result = mailer.send(&ack).await;

    if let Err(e) = &notice_result {
        eprintln!("[contact] Operator notice to {} failed: {}", notice.to, e);
    }
    if let Err(e) = &ack_result {
        eprintln!("[contact] Acknowledgment to {} failed: {}", ack.to, e);
    }

    if notice_result.is_err() || ack_result.is_err() {
        return Err(ApiError::Upstream("Failed to send email"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mail::MailError;
    use std::sync::Mutex;

    fn request(
        name: Option<&str>,
        email: Option<&str>,
        subject: Option<&str>,
        message: Option<&str>,
    ) -> ContactRequest {
        ContactRequest {
            name: name.map(str::to_string),
            email: email.map(str::to_string),
            phone: None,
            subject: subject.map(str::to_string),
            message: message.map(str::to_string),
        }
    }

    fn submission(subject: &str) -> ContactSubmission {
        ContactSubmission {
            name: "Alex Rivera".to_string(),
            email: "alex@example.com".to_string(),
            phone: Some("+1 555 0100".to_string()),
            subject: subject.to_string(),
            message: "First line.\nSecond line.".to_string(),
        }
    }

    // A mailer that records every send and fails for configured recipients.
    struct RecordingMailer {
        sent: Mutex<Vec<OutboundEmail>>,
        fail_to: Option<String>,
    }

    impl RecordingMailer {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_to: None,
            }
        }

        fn failing_for(recipient: &str) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_to: Some(recipient.to_string()),
            }
        }

        fn sent(&self) -> Vec<OutboundEmail> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Mailer for RecordingMailer {
        async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
            self.sent.lock().unwrap().push(email.clone());
            if self.fail_to.as_deref() == Some(email.to.as_str()) {
                let bad: Result<lettre::Address, _> = "not an address".parse();
                return Err(MailError::Address(bad.unwrap_err()));
            }
            Ok(())
        }
    }

    #[test]
    fn test_missing_fields_rejected() {
        let missing_name = request(None, Some("a@b.com"), Some("booking"), Some("hi"));
        let blank_message = request(Some("A"), Some("a@b.com"), Some("booking"), Some("   "));
        let blank_subject = request(Some("A"), Some("a@b.com"), Some(" "), Some("hi"));

        for req in [missing_name, blank_message, blank_subject] {
            assert_eq!(
                validate(&req).unwrap_err(),
                ApiError::Validation("Missing required fields")
            );
        }
    }

    #[test]
    fn test_missing_fields_reported_before_bad_email() {
        let req = request(None, Some("not-an-email"), Some("booking"), Some("hi"));
        assert_eq!(
            validate(&req).unwrap_err(),
            ApiError::Validation("Missing required fields")
        );
    }

    #[test]
    fn test_invalid_email_rejected() {
        for email in ["no-at-sign", "a@b", "a@.c", "a b@c.d", "a@b.", "a@@b.c", "@b.c"] {
            let req = request(Some("A"), Some(email), Some("booking"), Some("hi"));
            assert_eq!(
                validate(&req).unwrap_err(),
                ApiError::Validation("Invalid email format"),
                "expected rejection for {:?}",
                email
            );
        }
    }

    #[test]
    fn test_valid_submission_trimmed() {
        let req = ContactRequest {
            name: Some("  Alex  ".to_string()),
            email: Some(" alex@example.com ".to_string()),
            phone: Some("   ".to_string()),
            subject: Some("booking".to_string()),
            message: Some("hello\n".to_string()),
        };
        let submission = validate(&req).unwrap();
        assert_eq!(submission.name, "Alex");
        assert_eq!(submission.email, "alex@example.com");
        assert_eq!(submission.phone, None);
        assert_eq!(submission.message, "hello");
    }

    #[test]
    fn test_email_shape_accepts_subdomains() {
        assert!(is_valid_email("a@mail.example.com"));
        assert!(is_valid_email("first.last@example.co.uk"));
    }

    #[test]
    fn test_operator_notice_normal_priority() {
        let notice = operator_notice(&submission("booking"), "doctor@example.com", Utc::now());
        assert_eq!(notice.to, "doctor@example.com");
        assert_eq!(notice.reply_to.as_deref(), Some("alex@example.com"));
        assert_eq!(notice.subject, "New Contact: booking - Alex Rivera");
        assert!(notice.html_body.contains("Normal Priority"));
        assert!(!notice.html_body.contains("URGENT"));
        // Message newlines become <br>
        assert!(notice.html_body.contains("First line.<br>Second line."));
        // Phone row present when supplied
        assert!(notice.html_body.contains("+1 555 0100"));
    }

    #[test]
    fn test_operator_notice_emergency_marked_urgent() {
        let notice = operator_notice(&submission("emergency"), "doctor@example.com", Utc::now());
        assert_eq!(
            notice.subject,
            "URGENT - New Contact: emergency - Alex Rivera"
        );
        assert!(notice.html_body.contains("URGENT - Emergency"));
    }

    #[test]
    fn test_acknowledgment_normal_has_no_crisis_text() {
        let ack = visitor_acknowledgment(&submission("booking"));
        assert_eq!(ack.to, "alex@example.com");
        assert_eq!(ack.reply_to, None);
        assert!(ack.html_body.contains("24 hours"));
        assert!(!ack.html_body.contains("988"));
        assert!(!ack.html_body.contains("911"));
    }

    #[test]
    fn test_acknowledgment_emergency_has_crisis_text() {
        let ack = visitor_acknowledgment(&submission("emergency"));
        assert!(ack.html_body.contains("988"));
        assert!(ack.html_body.contains("911"));
        assert!(ack.html_body.contains("Emergency Support"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let mut s = submission("booking");
        s.name = "<script>alert(1)</script>".to_string();
        s.message = "a < b & c".to_string();

        let notice = operator_notice(&s, "doctor@example.com", Utc::now());
        let ack = visitor_acknowledgment(&s);
        for body in [&notice.html_body, &ack.html_body] {
            assert!(!body.contains("<script>"));
        }
        assert!(notice.html_body.contains("&lt;script&gt;"));
        assert!(notice.html_body.contains("a &lt; b &amp; c"));
    }

    #[tokio::test]
    async fn test_notify_sends_both_documents() {
        let mailer = RecordingMailer::new();
        notify(&mailer, "doctor@example.com", &submission("booking"))
            .await
            .unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "doctor@example.com");
        assert_eq!(sent[1].to, "alex@example.com");
    }

    #[tokio::test]
    async fn test_notify_attempts_second_send_after_first_fails() {
        let mailer = RecordingMailer::failing_for("doctor@example.com");
        let err = notify(&mailer, "doctor@example.com", &submission("booking"))
            .await
            .unwrap_err();

        assert_eq!(err, ApiError::Upstream("Failed to send email"));
        // Acknowledgment was still attempted
        assert_eq!(mailer.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_notify_collapses_partial_success_to_failure() {
        let mailer = RecordingMailer::failing_for("alex@example.com");
        let err = notify(&mailer, "doctor@example.com", &submission("booking"))
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::Upstream("Failed to send email"));
    }
}
