use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Contact form body as posted by the browser. Every field is optional and
/// nothing about its content is checked.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContactPayload {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub message: Option<String>,
}

// Phone numbers in particular tend to arrive as JSON numbers.
fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactSubmission {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    /// Remote address of the connection, never read from the body.
    pub ip_address: String,
}

impl ContactSubmission {
    pub fn from_payload(payload: ContactPayload, ip_address: impl Into<String>) -> Self {
        Self {
            name: payload.name,
            phone: payload.phone,
            email: payload.email,
            subject: payload.subject,
            message: payload.message,
            ip_address: ip_address.into(),
        }
    }
}

/// Flat mapping written under the `contacts` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub ip_address: String,
}

impl ContactRecord {
    pub fn new(submission: &ContactSubmission, created_at: DateTime<Utc>) -> Self {
        Self {
            name: submission.name.clone(),
            phone: submission.phone.clone(),
            email: submission.email.clone(),
            subject: submission.subject.clone(),
            message: submission.message.clone(),
            created_at,
            ip_address: submission.ip_address.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedSubmission {
    pub key: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl OutgoingEmail {
    pub fn plain(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Outcome of one notification email. Failures never leave the sender as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Primary,
    Fallback,
    Failed,
}

impl Delivery {
    pub fn is_delivered(&self) -> bool {
        !matches!(self, Delivery::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
}

impl SubmitResponse {
    pub const RECEIVED: &'static str = "Message received!";

    pub fn received() -> Self {
        Self {
            success: true,
            message: Self::RECEIVED.to_string(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
