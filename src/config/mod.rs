#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::utils::error::{ContactError, Result};
use crate::utils::validation::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Whole-process configuration, built once at startup and handed to each
/// component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub smtp: SmtpConfig,
    pub notifications: NotificationConfig,
    pub firebase: FirebaseConfig,
    #[serde(default)]
    pub queue: QueueConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub debug: bool,
    pub json_logs: bool,
    pub static_dir: String,
    pub allowed_origins: Vec<String>,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            debug: false,
            json_logs: false,
            static_dir: "frontend".to_string(),
            allowed_origins: vec!["*".to_string()],
            max_body_bytes: 16 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    #[serde(default = "default_smtp_host")]
    pub host: String,
    /// Implicit TLS port tried first.
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// STARTTLS port used for the single retry.
    #[serde(default = "default_smtp_fallback_port")]
    pub fallback_port: u16,
    /// Account name, also used as the sender address.
    pub username: String,
    pub password: String,
    #[serde(default = "default_smtp_timeout")]
    pub timeout_seconds: u64,
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("fallback_port", &self.fallback_port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl SmtpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    465
}

fn default_smtp_fallback_port() -> u16 {
    587
}

fn default_smtp_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    pub admin_email: String,
    #[serde(default = "default_client_name")]
    pub client_name: String,
}

fn default_client_name() -> String {
    "MNPIEPL".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseConfig {
    pub database_url: String,
    pub service_account_path: Option<String>,
    /// Talk to a local emulator without credentials.
    #[serde(default)]
    pub emulator: bool,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_firebase_timeout")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub public: PublicClientConfig,
}

impl FirebaseConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn default_collection() -> String {
    "contacts".to_string()
}

fn default_firebase_timeout() -> u64 {
    15
}

/// Browser-side client settings. These are public identifiers, not secrets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicClientConfig {
    pub api_key: Option<String>,
    pub auth_domain: Option<String>,
    pub project_id: Option<String>,
    pub storage_bucket: Option<String>,
    pub messaging_sender_id: Option<String>,
    pub app_id: Option<String>,
    #[serde(rename = "databaseURL")]
    pub database_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub workers: usize,
    pub capacity: usize,
    pub drain_timeout_seconds: u64,
    pub ack_policy: AckPolicy,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            workers: 5,
            capacity: 100,
            drain_timeout_seconds: 30,
            ack_policy: AckPolicy::default(),
        }
    }
}

impl QueueConfig {
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_seconds)
    }
}

/// What a successful response to the form certifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckPolicy {
    /// The submission was handed to the background queue.
    #[default]
    Acknowledged,
    /// The submission was written to the store.
    Persisted,
}

impl FromStr for AckPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "acknowledged" | "ack" => Ok(AckPolicy::Acknowledged),
            "persisted" | "sync" => Ok(AckPolicy::Persisted),
            other => Err(format!("expected 'acknowledged' or 'persisted', got '{}'", other)),
        }
    }
}

impl AppConfig {
    /// Loads configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from any key lookup, so tests do not have to
    /// mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| ContactError::MissingConfigError {
                field: key.to_string(),
            })
        };

        let server_defaults = ServerConfig::default();
        let server = ServerConfig {
            host: get("HOST").unwrap_or(server_defaults.host),
            port: parse_or(&get, "PORT", server_defaults.port)?,
            debug: parse_flag(&get, "DEBUG")?,
            json_logs: get("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            static_dir: get("STATIC_DIR").unwrap_or(server_defaults.static_dir),
            allowed_origins: get("ALLOWED_ORIGINS")
                .map(|v| split_origins(&v))
                .unwrap_or(server_defaults.allowed_origins),
            max_body_bytes: parse_or(&get, "MAX_CONTENT_LENGTH", server_defaults.max_body_bytes)?,
        };

        let smtp = SmtpConfig {
            host: get("SMTP_HOST").unwrap_or_else(default_smtp_host),
            port: parse_or(&get, "SMTP_PORT", default_smtp_port())?,
            fallback_port: parse_or(&get, "SMTP_FALLBACK_PORT", default_smtp_fallback_port())?,
            username: required("SMTP_USER")?,
            password: required("SMTP_PASSWORD")?,
            timeout_seconds: parse_or(&get, "SMTP_TIMEOUT_SECONDS", default_smtp_timeout())?,
        };

        let notifications = NotificationConfig {
            admin_email: required("ADMIN_EMAIL")?,
            client_name: get("CLIENT_NAME").unwrap_or_else(default_client_name),
        };

        let database_url = required("FIREBASE_DATABASE_URL")?;
        let firebase = FirebaseConfig {
            service_account_path: get("FIREBASE_SERVICE_ACCOUNT_PATH"),
            emulator: parse_flag(&get, "FIREBASE_EMULATOR")?,
            collection: default_collection(),
            timeout_seconds: parse_or(&get, "FIREBASE_TIMEOUT_SECONDS", default_firebase_timeout())?,
            public: PublicClientConfig {
                api_key: get("FIREBASE_API_KEY"),
                auth_domain: get("FIREBASE_AUTH_DOMAIN"),
                project_id: get("FIREBASE_PROJECT_ID"),
                storage_bucket: get("FIREBASE_STORAGE_BUCKET"),
                messaging_sender_id: get("FIREBASE_MESSAGING_SENDER_ID"),
                app_id: get("FIREBASE_APP_ID"),
                database_url: Some(database_url.clone()),
            },
            database_url,
        };

        let queue_defaults = QueueConfig::default();
        let queue = QueueConfig {
            workers: parse_or(&get, "WORKER_COUNT", queue_defaults.workers)?,
            capacity: parse_or(&get, "QUEUE_CAPACITY", queue_defaults.capacity)?,
            drain_timeout_seconds: parse_or(
                &get,
                "DRAIN_TIMEOUT_SECONDS",
                queue_defaults.drain_timeout_seconds,
            )?,
            ack_policy: parse_or(&get, "ACK_POLICY", queue_defaults.ack_policy)?,
        };

        Ok(Self {
            server,
            smtp,
            notifications,
            firebase,
            queue,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ContactError::InvalidConfigValueError {
                field: key.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}

fn parse_flag<G>(get: &G, key: &str) -> Result<bool>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) if matches!(v.as_str(), "true" | "1" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "false" | "0" | "no" | "off") => Ok(false),
        Some(v) => Err(ContactError::InvalidConfigValueError {
            field: key.to_string(),
            value: v,
            reason: "Expected a boolean".to_string(),
        }),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

/// Upper bound for every configured timeout.
const MAX_TIMEOUT_SECONDS: u64 = 3600;

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_range("server.port", self.server.port, 1, u16::MAX)?;
        validate_positive_number("server.max_body_bytes", self.server.max_body_bytes, 1)?;

        validate_non_empty_string("smtp.host", &self.smtp.host)?;
        validate_mailbox("smtp.username", &self.smtp.username)?;
        validate_non_empty_string("smtp.password", &self.smtp.password)?;
        validate_range("smtp.port", self.smtp.port, 1, u16::MAX)?;
        validate_range("smtp.fallback_port", self.smtp.fallback_port, 1, u16::MAX)?;
        validate_range("smtp.timeout_seconds", self.smtp.timeout_seconds, 1, MAX_TIMEOUT_SECONDS)?;

        validate_mailbox("notifications.admin_email", &self.notifications.admin_email)?;

        validate_url("firebase.database_url", &self.firebase.database_url)?;
        validate_non_empty_string("firebase.collection", &self.firebase.collection)?;
        validate_range(
            "firebase.timeout_seconds",
            self.firebase.timeout_seconds,
            1,
            MAX_TIMEOUT_SECONDS,
        )?;
        if !self.firebase.emulator {
            let path = validate_required_field(
                "firebase.service_account_path",
                &self.firebase.service_account_path,
            )?;
            validate_existing_file("firebase.service_account_path", path)?;
        }

        validate_positive_number("queue.workers", self.queue.workers, 1)?;
        validate_positive_number("queue.capacity", self.queue.capacity, 1)?;
        validate_range(
            "queue.drain_timeout_seconds",
            self.queue.drain_timeout_seconds,
            1,
            MAX_TIMEOUT_SECONDS,
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn minimal_env() -> Vec<(&'static str, &'static str)> {
        vec![
            ("SMTP_USER", "noreply@example.com"),
            ("SMTP_PASSWORD", "app-password"),
            ("ADMIN_EMAIL", "admin@example.com"),
            ("FIREBASE_DATABASE_URL", "https://demo-default-rtdb.firebaseio.com"),
            ("FIREBASE_EMULATOR", "true"),
        ]
    }

    #[test]
    fn test_defaults_from_minimal_env() {
        let config = AppConfig::from_lookup(lookup_from(&minimal_env())).unwrap();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.max_body_bytes, 16 * 1024 * 1024);
        assert_eq!(config.server.allowed_origins, vec!["*".to_string()]);
        assert_eq!(config.smtp.host, "smtp.gmail.com");
        assert_eq!(config.smtp.port, 465);
        assert_eq!(config.smtp.fallback_port, 587);
        assert_eq!(config.notifications.client_name, "MNPIEPL");
        assert_eq!(config.firebase.collection, "contacts");
        assert_eq!(
            config.firebase.public.database_url.as_deref(),
            Some("https://demo-default-rtdb.firebaseio.com")
        );
        assert_eq!(config.queue.workers, 5);
        assert_eq!(config.queue.ack_policy, AckPolicy::Acknowledged);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_credentials_is_an_error() {
        let env: Vec<_> = minimal_env()
            .into_iter()
            .filter(|(k, _)| *k != "SMTP_PASSWORD")
            .collect();

        let err = AppConfig::from_lookup(lookup_from(&env)).unwrap_err();
        assert!(matches!(err, ContactError::MissingConfigError { ref field } if field == "SMTP_PASSWORD"));
    }

    #[test]
    fn test_origins_ports_and_policy_are_parsed() {
        let mut env = minimal_env();
        env.push(("ALLOWED_ORIGINS", "https://a.example, https://b.example ,"));
        env.push(("SMTP_PORT", "2465"));
        env.push(("ACK_POLICY", "Persisted"));
        env.push(("DEBUG", "True"));

        let config = AppConfig::from_lookup(lookup_from(&env)).unwrap();

        assert_eq!(
            config.server.allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert_eq!(config.smtp.port, 2465);
        assert_eq!(config.queue.ack_policy, AckPolicy::Persisted);
        assert!(config.server.debug);
    }

    #[test]
    fn test_invalid_number_is_reported_with_field() {
        let mut env = minimal_env();
        env.push(("WORKER_COUNT", "many"));

        let err = AppConfig::from_lookup(lookup_from(&env)).unwrap_err();
        assert!(matches!(err, ContactError::InvalidConfigValueError { ref field, .. } if field == "WORKER_COUNT"));
    }

    #[test]
    fn test_service_account_required_outside_emulator() {
        let env: Vec<_> = minimal_env()
            .into_iter()
            .filter(|(k, _)| *k != "FIREBASE_EMULATOR")
            .collect();
        let config = AppConfig::from_lookup(lookup_from(&env)).unwrap();
        assert!(config.validate().is_err());

        let mut env = env;
        env.push(("FIREBASE_SERVICE_ACCOUNT_PATH", "/definitely/missing.json"));
        let config = AppConfig::from_lookup(lookup_from(&env)).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeouts_fail_validation() {
        for (key, field) in [
            ("SMTP_TIMEOUT_SECONDS", "smtp.timeout_seconds"),
            ("FIREBASE_TIMEOUT_SECONDS", "firebase.timeout_seconds"),
            ("DRAIN_TIMEOUT_SECONDS", "queue.drain_timeout_seconds"),
        ] {
            let mut env = minimal_env();
            env.push((key, "0"));
            let config = AppConfig::from_lookup(lookup_from(&env)).unwrap();

            let err = config.validate().unwrap_err();
            assert!(
                matches!(err, ContactError::InvalidConfigValueError { field: ref f, .. } if f == field),
                "{} = 0 should be rejected",
                key
            );
        }
    }

    #[test]
    fn test_debug_output_redacts_password() {
        let config = AppConfig::from_lookup(lookup_from(&minimal_env())).unwrap();
        let rendered = format!("{:?}", config.smtp);
        assert!(!rendered.contains("app-password"));
        assert!(rendered.contains("<redacted>"));
    }
}
