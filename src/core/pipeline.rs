use crate::core::notifications::NotificationTemplates;
use crate::domain::model::{ContactSubmission, Delivery, SavedSubmission};
use crate::domain::ports::{EmailSender, SubmissionStore};
use crate::utils::error::Result;
use std::sync::Arc;

/// What happened to one submission after it left the HTTP path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub saved: Option<SavedSubmission>,
    /// `None` when the email was not attempted.
    pub thank_you: Option<Delivery>,
    pub admin_alert: Option<Delivery>,
}

impl PipelineReport {
    /// One-line outcome, e.g. `-Nx1 stored, thank-you primary, admin alert failed`.
    pub fn summary(&self) -> String {
        match &self.saved {
            Some(saved) => format!(
                "{} stored, thank-you {}, admin alert {}",
                saved.key,
                delivery_label(self.thank_you),
                delivery_label(self.admin_alert)
            ),
            None => "not stored, notifications skipped".to_string(),
        }
    }
}

fn delivery_label(delivery: Option<Delivery>) -> &'static str {
    match delivery {
        None => "skipped",
        Some(Delivery::Primary) => "primary",
        Some(Delivery::Fallback) => "fallback",
        Some(Delivery::Failed) => "failed",
    }
}

/// Persist first, then notify. Emails are only attempted for stored
/// submissions and a failed email never touches the stored record.
pub struct SubmissionPipeline {
    store: Arc<dyn SubmissionStore>,
    mailer: Arc<dyn EmailSender>,
    templates: NotificationTemplates,
}

impl SubmissionPipeline {
    pub fn new(
        store: Arc<dyn SubmissionStore>,
        mailer: Arc<dyn EmailSender>,
        templates: NotificationTemplates,
    ) -> Self {
        Self {
            store,
            mailer,
            templates,
        }
    }

    pub async fn persist(&self, submission: &ContactSubmission) -> Result<SavedSubmission> {
        self.store.save(submission).await
    }

    /// Sends the thank-you and admin emails concurrently; either may fail
    /// without affecting the other.
    pub async fn notify(
        &self,
        submission: &ContactSubmission,
        saved: &SavedSubmission,
    ) -> (Option<Delivery>, Delivery) {
        let thank_you = self.templates.thank_you(submission);
        let admin_alert = self.templates.admin_alert(submission, saved.created_at);

        let thank_you_delivery = async {
            match &thank_you {
                Some(email) => Some(self.mailer.send(email).await),
                None => {
                    tracing::warn!("Submission {} has no email address, skipping thank-you", saved.key);
                    None
                }
            }
        };

        tokio::join!(thank_you_delivery, self.mailer.send(&admin_alert))
    }

    pub async fn process(&self, submission: &ContactSubmission) -> PipelineReport {
        let saved = match self.persist(submission).await {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!(
                    "Submission from {} was not stored ({}), notifications skipped",
                    submission.ip_address,
                    e
                );
                return PipelineReport {
                    saved: None,
                    thank_you: None,
                    admin_alert: None,
                };
            }
        };

        let (thank_you, admin_alert) = self.notify(submission, &saved).await;
        PipelineReport {
            saved: Some(saved),
            thank_you,
            admin_alert: Some(admin_alert),
        }
    }
}
