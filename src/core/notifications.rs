use crate::config::NotificationConfig;
use crate::domain::model::{ContactSubmission, OutgoingEmail};
use chrono::{DateTime, Utc};

/// Builds the two notification emails sent for a stored submission.
#[derive(Debug, Clone)]
pub struct NotificationTemplates {
    admin_email: String,
    client_name: String,
}

impl NotificationTemplates {
    pub fn new(admin_email: impl Into<String>, client_name: impl Into<String>) -> Self {
        Self {
            admin_email: admin_email.into(),
            client_name: client_name.into(),
        }
    }

    pub fn from_config(config: &NotificationConfig) -> Self {
        Self::new(config.admin_email.clone(), config.client_name.clone())
    }

    /// `None` when the submitter left no address to reply to.
    pub fn thank_you(&self, submission: &ContactSubmission) -> Option<OutgoingEmail> {
        let to = submission
            .email
            .as_deref()
            .map(str::trim)
            .filter(|address| !address.is_empty())?;

        let body = format!(
            "Hi {},\n\n\
             Thank you for reaching out! We received your message and will get back to you soon.\n\n\
             Best regards,\n{} Team",
            field(&submission.name),
            self.client_name
        );

        Some(OutgoingEmail::plain(to, "Thank you for contacting us!", body))
    }

    pub fn admin_alert(&self, submission: &ContactSubmission, received_at: DateTime<Utc>) -> OutgoingEmail {
        let subject = format!("New Contact Form - {}", field(&submission.subject));
        let body = format!(
            "📧 NEW CONTACT FORM SUBMISSION\n\n\
             Name:    {}\n\
             Phone:   {}\n\
             Email:   {}\n\
             Subject: {}\n\n\
             Message:\n{}\n\n\
             ---\n\
             IP:        {}\n\
             Timestamp: {}",
            field(&submission.name),
            field(&submission.phone),
            field(&submission.email),
            field(&submission.subject),
            field(&submission.message),
            submission.ip_address,
            received_at.to_rfc3339(),
        );

        OutgoingEmail::plain(self.admin_email.clone(), subject, body)
    }
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}
