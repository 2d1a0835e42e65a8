use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContactError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("SMTP error: {0}")]
    SmtpError(#[from] lettre::transport::smtp::Error),

    #[error("Token signing error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Authentication error: {message}")]
    AuthError { message: String },

    #[error("Firebase error: {message}")]
    FirebaseError { message: String },

    #[error("Email error: {message}")]
    EmailError { message: String },

    #[error("Submission queue is full")]
    QueueFull,

    #[error("Submission queue is closed")]
    QueueClosed,
}

impl ContactError {
    /// Message safe to hand back to a form submitter.
    pub fn user_friendly_message(&self) -> String {
        match self {
            ContactError::QueueFull => {
                "We are receiving a lot of messages right now, please try again shortly".to_string()
            }
            ContactError::QueueClosed => "The service is shutting down, please try again later".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ContactError>;
