use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::extract::ConnectInfo;
use axum::http::{header::CONTENT_TYPE, Method, Request, StatusCode};
use chrono::Utc;
use contact_backend::domain::model::{
    ContactRecord, ContactSubmission, Delivery, OutgoingEmail, SavedSubmission,
};
use contact_backend::domain::ports::{EmailSender, SubmissionStore};
use contact_backend::{AppConfig, Application, ContactError, Result};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tower::ServiceExt;

#[derive(Default)]
struct MemoryStore {
    records: Mutex<Vec<ContactRecord>>,
    unavailable: bool,
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn save(&self, submission: &ContactSubmission) -> Result<SavedSubmission> {
        if self.unavailable {
            return Err(ContactError::FirebaseError {
                message: "503 Service Unavailable".to_string(),
            });
        }
        let created_at = Utc::now();
        let mut records = self.records.lock().await;
        records.push(ContactRecord::new(submission, created_at));
        Ok(SavedSubmission {
            key: format!("-Nx{}", records.len()),
            created_at,
        })
    }
}

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Delivery {
        self.sent.lock().await.push(email.clone());
        Delivery::Primary
    }
}

fn config(static_dir: &str, extra: &[(&str, &str)]) -> AppConfig {
    let mut env: HashMap<String, String> = [
        ("SMTP_USER", "noreply@example.com"),
        ("SMTP_PASSWORD", "app-password"),
        ("ADMIN_EMAIL", "admin@example.com"),
        ("FIREBASE_DATABASE_URL", "https://demo-default-rtdb.firebaseio.com"),
        ("FIREBASE_EMULATOR", "true"),
        ("FIREBASE_API_KEY", "public-api-key"),
        ("FIREBASE_PROJECT_ID", "demo"),
        ("STATIC_DIR", static_dir),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in extra {
        env.insert(k.to_string(), v.to_string());
    }
    AppConfig::from_lookup(|key| env.get(key).cloned()).unwrap()
}

fn frontend() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html>home</html>").unwrap();
    std::fs::write(dir.path().join("app.js"), "console.log('app')").unwrap();
    dir
}

fn from_remote(mut request: Request<Body>, ip: [u8; 4]) -> Request<Body> {
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((ip, 52000))));
    request
}

fn post_contact(body: &str) -> Request<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/contact")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    from_remote(request, [10, 0, 0, 5])
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn text_body(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health_is_always_ok() {
    let dir = frontend();
    let store = Arc::new(MemoryStore {
        unavailable: true,
        ..Default::default()
    });
    let app = Application::with_components(
        config(dir.path().to_str().unwrap(), &[]),
        store,
        Arc::new(RecordingMailer::default()),
    );

    let response = app
        .router()
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        serde_json::json!({"status": "ok", "message": "Backend running"})
    );
}

#[tokio::test]
async fn test_firebase_config_exposes_public_fields_only() {
    let dir = frontend();
    let app = Application::with_components(
        config(dir.path().to_str().unwrap(), &[]),
        Arc::new(MemoryStore::default()),
        Arc::new(RecordingMailer::default()),
    );

    let response = app
        .router()
        .oneshot(Request::get("/api/firebase-config").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["config"]["apiKey"], "public-api-key");
    assert_eq!(body["config"]["projectId"], "demo");
    assert_eq!(body["config"]["databaseURL"], "https://demo-default-rtdb.firebaseio.com");
    assert!(body["config"]["appId"].is_null());

    let rendered = body.to_string();
    assert!(!rendered.contains("app-password"));
}

#[tokio::test]
async fn test_contact_example_is_acknowledged_and_stored() {
    let dir = frontend();
    let store = Arc::new(MemoryStore::default());
    let mailer = Arc::new(RecordingMailer::default());
    let app = Application::with_components(
        config(dir.path().to_str().unwrap(), &[]),
        store.clone(),
        mailer.clone(),
    );

    let started = Utc::now();
    let response = app
        .router()
        .oneshot(post_contact(
            r#"{"name":"Jo","phone":"555","email":"jo@x.com","subject":"Hi","message":"Test"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        serde_json::json!({"success": true, "message": "Message received!"})
    );

    app.shutdown().await;
    let finished = Utc::now();

    let records = store.records.lock().await;
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.name.as_deref(), Some("Jo"));
    assert_eq!(record.phone.as_deref(), Some("555"));
    assert_eq!(record.email.as_deref(), Some("jo@x.com"));
    assert_eq!(record.subject.as_deref(), Some("Hi"));
    assert_eq!(record.message.as_deref(), Some("Test"));
    assert_eq!(record.ip_address, "10.0.0.5");
    assert!(record.created_at >= started && record.created_at <= finished);

    let sent = mailer.sent.lock().await;
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().any(|e| e.to == "jo@x.com"));
    assert!(sent.iter().any(|e| e.to == "admin@example.com"));
}

#[tokio::test]
async fn test_ip_address_in_body_is_ignored() {
    let dir = frontend();
    let store = Arc::new(MemoryStore::default());
    let app = Application::with_components(
        config(dir.path().to_str().unwrap(), &[]),
        store.clone(),
        Arc::new(RecordingMailer::default()),
    );

    let response = app
        .router()
        .oneshot(post_contact(r#"{"name":"Jo","ip_address":"6.6.6.6"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    app.shutdown().await;
    let records = store.records.lock().await;
    assert_eq!(records[0].ip_address, "10.0.0.5");
}

#[tokio::test]
async fn test_malformed_json_is_a_bad_request() {
    let dir = frontend();
    let store = Arc::new(MemoryStore::default());
    let app = Application::with_components(
        config(dir.path().to_str().unwrap(), &[]),
        store.clone(),
        Arc::new(RecordingMailer::default()),
    );

    let response = app
        .router()
        .oneshot(post_contact(r#"{"name": "Jo""#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().starts_with("Malformed payload"));

    app.shutdown().await;
    assert!(store.records.lock().await.is_empty());
}

#[tokio::test]
async fn test_persisted_policy_reports_store_outage() {
    let dir = frontend();
    let store = Arc::new(MemoryStore {
        unavailable: true,
        ..Default::default()
    });
    let mailer = Arc::new(RecordingMailer::default());
    let app = Application::with_components(
        config(dir.path().to_str().unwrap(), &[("ACK_POLICY", "persisted")]),
        store,
        mailer.clone(),
    );

    let response = app
        .router()
        .oneshot(post_contact(r#"{"name":"Jo","email":"jo@x.com"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("503"));

    app.shutdown().await;
    assert!(mailer.sent.lock().await.is_empty());
}

#[tokio::test]
async fn test_static_files_and_spa_fallback() {
    let dir = frontend();
    let app = Application::with_components(
        config(dir.path().to_str().unwrap(), &[]),
        Arc::new(MemoryStore::default()),
        Arc::new(RecordingMailer::default()),
    );

    let asset = app
        .router()
        .oneshot(Request::get("/app.js").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(asset.status(), StatusCode::OK);
    assert_eq!(text_body(asset).await, "console.log('app')");

    let deep_link = app
        .router()
        .oneshot(Request::get("/projects/42").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(text_body(deep_link).await, "<html>home</html>");
}
