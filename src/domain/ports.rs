use crate::domain::model::{ContactSubmission, Delivery, OutgoingEmail, SavedSubmission};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Append-only store for contact submissions.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Persists the submission, stamping `created_at`, and returns the key
    /// the store generated for it.
    async fn save(&self, submission: &ContactSubmission) -> Result<SavedSubmission>;
}

/// Sends a single notification. Implementations swallow their own failures.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Delivery;
}
