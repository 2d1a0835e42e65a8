//! Realtime Database submission store.
//!
//! Records are appended with a REST `POST` to `<database>/<collection>.json`;
//! the database answers with `{"name": "<push id>"}`, a unique key that sorts
//! roughly by creation time.

pub mod auth;

use crate::config::FirebaseConfig;
use crate::domain::model::{ContactRecord, ContactSubmission, SavedSubmission};
use crate::domain::ports::SubmissionStore;
use crate::utils::error::{ContactError, Result};
use crate::utils::validation::validate_required_field;
use async_trait::async_trait;
use auth::{DatabaseAuth, ServiceAccount, ServiceAccountAuth};
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

#[derive(Deserialize)]
struct PushResponse {
    name: String,
}

pub struct RealtimeDatabaseStore {
    client: Client,
    collection_url: Url,
    auth: DatabaseAuth,
}

impl RealtimeDatabaseStore {
    pub fn new(
        database_url: &str,
        collection: &str,
        timeout: Duration,
        auth: DatabaseAuth,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            collection_url: collection_url(database_url, collection)?,
            auth,
        })
    }

    /// Loads the service account (unless running against the emulator) and
    /// prepares the HTTP client. Any problem here is a startup error.
    pub fn from_config(config: &FirebaseConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        let auth = if config.emulator {
            tracing::warn!("Firebase emulator mode: database requests are unauthenticated");
            DatabaseAuth::Anonymous
        } else {
            let path = validate_required_field(
                "firebase.service_account_path",
                &config.service_account_path,
            )?;
            let account = ServiceAccount::from_file(path).map_err(|e| ContactError::ConfigError {
                message: format!("Firebase credentials file could not be loaded from {}: {}", path, e),
            })?;
            let auth = ServiceAccountAuth::new(account, client.clone())?;
            tracing::info!("Firebase authenticated as {}", auth.client_email());
            DatabaseAuth::ServiceAccount(auth)
        };

        Ok(Self {
            client,
            collection_url: collection_url(&config.database_url, &config.collection)?,
            auth,
        })
    }

    async fn push(&self, record: &ContactRecord) -> Result<String> {
        let mut request = self.client.post(self.collection_url.clone()).json(record);
        if let Some(token) = self.auth.bearer_token().await? {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ContactError::FirebaseError {
                message: format!("{} returned {}: {}", self.collection_url.path(), status, body),
            });
        }

        let PushResponse { name } = response.json().await?;
        Ok(name)
    }
}

/// Keeps any query string (the emulator needs `?ns=`) and appends
/// `/<collection>.json` to the path.
fn collection_url(database_url: &str, collection: &str) -> Result<Url> {
    let mut url = Url::parse(database_url).map_err(|e| ContactError::InvalidConfigValueError {
        field: "firebase.database_url".to_string(),
        value: database_url.to_string(),
        reason: e.to_string(),
    })?;

    let path = format!(
        "{}/{}.json",
        url.path().trim_end_matches('/'),
        collection.trim_matches('/')
    );
    url.set_path(&path);
    Ok(url)
}

#[async_trait]
impl SubmissionStore for RealtimeDatabaseStore {
    async fn save(&self, submission: &ContactSubmission) -> Result<SavedSubmission> {
        let created_at = Utc::now();
        let record = ContactRecord::new(submission, created_at);

        match self.push(&record).await {
            Ok(key) => {
                tracing::info!("✅ Saved to Firebase → {}", key);
                Ok(SavedSubmission { key, created_at })
            }
            Err(e) => {
                tracing::error!("❌ Firebase error: {}", e);
                Err(e)
            }
        }
    }
}
