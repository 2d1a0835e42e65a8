pub mod handler;
pub mod notifications;
pub mod pipeline;
pub mod queue;

pub use crate::domain::model::{ContactPayload, ContactSubmission, SubmitResponse};
pub use crate::domain::ports::{EmailSender, SubmissionStore};
pub use crate::utils::error::Result;
