//! SMTP notification sender.
//!
//! Every message is tried once over implicit TLS on the primary port and, if
//! that fails for any reason, exactly once more over STARTTLS on the fallback
//! port. Whatever happens, [`EmailSender::send`] reports a [`Delivery`] and
//! never an error.

use crate::config::SmtpConfig;
use crate::domain::model::{Delivery, OutgoingEmail};
use crate::domain::ports::EmailSender;
use crate::utils::error::{ContactError, Result};
use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// One way of reaching the relay.
#[async_trait]
pub trait MailTransport: Send + Sync {
    fn describe(&self) -> String;
    async fn deliver(&self, message: &Message) -> Result<()>;
}

pub struct SmtpRelay {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    description: String,
}

impl SmtpRelay {
    /// TLS from the first byte, usually port 465.
    pub fn implicit_tls(config: &SmtpConfig) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
            .port(config.port)
            .credentials(credentials(config))
            .timeout(Some(config.timeout()))
            .build();

        Ok(Self {
            transport,
            description: format!("implicit TLS {}:{}", config.host, config.port),
        })
    }

    /// Plain connection upgraded with STARTTLS, usually port 587.
    pub fn starttls(config: &SmtpConfig) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.fallback_port)
            .credentials(credentials(config))
            .timeout(Some(config.timeout()))
            .build();

        Ok(Self {
            transport,
            description: format!("STARTTLS {}:{}", config.host, config.fallback_port),
        })
    }
}

fn credentials(config: &SmtpConfig) -> Credentials {
    Credentials::new(config.username.clone(), config.password.clone())
}

#[async_trait]
impl MailTransport for SmtpRelay {
    fn describe(&self) -> String {
        self.description.clone()
    }

    async fn deliver(&self, message: &Message) -> Result<()> {
        self.transport.send(message.clone()).await?;
        Ok(())
    }
}

pub struct SmtpEmailSender {
    from: Mailbox,
    primary: Box<dyn MailTransport>,
    fallback: Box<dyn MailTransport>,
}

impl SmtpEmailSender {
    /// Builds both relay transports from the configured credentials. The
    /// sender address is the SMTP account itself.
    pub fn from_config(config: &SmtpConfig) -> Result<Self> {
        let from = parse_mailbox(&config.username)?;
        Ok(Self::with_transports(
            from,
            Box::new(SmtpRelay::implicit_tls(config)?),
            Box::new(SmtpRelay::starttls(config)?),
        ))
    }

    pub fn with_transports(
        from: Mailbox,
        primary: Box<dyn MailTransport>,
        fallback: Box<dyn MailTransport>,
    ) -> Self {
        Self {
            from,
            primary,
            fallback,
        }
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(&email.to)?)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(|e| ContactError::EmailError {
                message: format!("Error building message: {}", e),
            })
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|e| ContactError::EmailError {
            message: format!("Invalid email address '{}': {}", address, e),
        })
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, email: &OutgoingEmail) -> Delivery {
        let message = match self.build_message(email) {
            Ok(message) => message,
            Err(e) => {
                tracing::error!("❌ Email error ({}): {}", email.to, e);
                return Delivery::Failed;
            }
        };

        match self.primary.deliver(&message).await {
            Ok(()) => {
                tracing::info!("✅ Email sent → {} via {}", email.to, self.primary.describe());
                return Delivery::Primary;
            }
            Err(e) => {
                tracing::warn!(
                    "❌ Email error ({}) via {}: {}; retrying via {}",
                    email.to,
                    self.primary.describe(),
                    e,
                    self.fallback.describe()
                );
            }
        }

        match self.fallback.deliver(&message).await {
            Ok(()) => {
                tracing::info!("✅ Email sent → {} via {}", email.to, self.fallback.describe());
                Delivery::Fallback
            }
            Err(e) => {
                tracing::error!(
                    "❌ Email error ({}) via {}: {}; giving up",
                    email.to,
                    self.fallback.describe(),
                    e
                );
                Delivery::Failed
            }
        }
    }
}
