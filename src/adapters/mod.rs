// Adapters layer: concrete implementations of the domain ports for the
// outside world (SMTP relay, Realtime Database).

pub mod email;
pub mod firebase;

pub use email::{MailTransport, SmtpEmailSender, SmtpRelay};
pub use firebase::RealtimeDatabaseStore;
