use crate::config::AckPolicy;
use crate::core::queue::{SubmissionJob, SubmissionQueue};
use crate::domain::model::{ContactPayload, ContactSubmission, SubmitResponse};
use tokio::sync::oneshot;

/// Entry point for contact form submissions.
///
/// Under [`AckPolicy::Acknowledged`] a success response only means the
/// submission reached the queue; it may still fail to be stored. Under
/// [`AckPolicy::Persisted`] the response waits for the database write.
#[derive(Clone)]
pub struct ContactHandler {
    queue: SubmissionQueue,
    policy: AckPolicy,
}

impl ContactHandler {
    pub fn new(queue: SubmissionQueue, policy: AckPolicy) -> Self {
        Self { queue, policy }
    }

    pub async fn submit(&self, payload: ContactPayload, ip_address: impl Into<String>) -> SubmitResponse {
        let submission = ContactSubmission::from_payload(payload, ip_address);
        tracing::debug!("Contact submission from {}", submission.ip_address);

        match self.policy {
            AckPolicy::Acknowledged => self.hand_off(submission),
            AckPolicy::Persisted => self.hand_off_and_wait(submission).await,
        }
    }

    fn hand_off(&self, submission: ContactSubmission) -> SubmitResponse {
        let ip_address = submission.ip_address.clone();
        match self.queue.enqueue(SubmissionJob::new(submission)) {
            Ok(()) => {
                tracing::info!("📨 Contact submission from {} queued", ip_address);
                SubmitResponse::received()
            }
            Err(e) => {
                tracing::error!("Contact submission from {} rejected: {}", ip_address, e);
                SubmitResponse::failed(e.user_friendly_message())
            }
        }
    }

    async fn hand_off_and_wait(&self, submission: ContactSubmission) -> SubmitResponse {
        let ip_address = submission.ip_address.clone();
        let (ack, stored) = oneshot::channel();

        if let Err(e) = self.queue.enqueue(SubmissionJob::with_ack(submission, ack)) {
            tracing::error!("Contact submission from {} rejected: {}", ip_address, e);
            return SubmitResponse::failed(e.user_friendly_message());
        }

        match stored.await {
            Ok(Ok(saved)) => {
                tracing::info!("📨 Contact submission from {} stored as {}", ip_address, saved.key);
                SubmitResponse::received()
            }
            Ok(Err(message)) => SubmitResponse::failed(message),
            Err(_) => SubmitResponse::failed("Submission was not processed"),
        }
    }
}
