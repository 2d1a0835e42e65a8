//! Process wiring: configuration in, running server out.

use crate::adapters::{RealtimeDatabaseStore, SmtpEmailSender};
use crate::config::AppConfig;
use crate::core::handler::ContactHandler;
use crate::core::notifications::NotificationTemplates;
use crate::core::pipeline::SubmissionPipeline;
use crate::core::queue::{self, QueueHandle};
use crate::domain::ports::{EmailSender, SubmissionStore};
use crate::http::{self, state::State};
use crate::utils::error::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct Application {
    config: AppConfig,
    router: Router,
    queue: QueueHandle,
}

impl Application {
    /// Connects the real store and relay. Credential problems surface here,
    /// before the server binds.
    pub fn build(config: AppConfig) -> Result<Self> {
        let store: Arc<dyn SubmissionStore> = Arc::new(RealtimeDatabaseStore::from_config(&config.firebase)?);
        let mailer: Arc<dyn EmailSender> = Arc::new(SmtpEmailSender::from_config(&config.smtp)?);
        Ok(Self::with_components(config, store, mailer))
    }

    pub fn with_components(
        config: AppConfig,
        store: Arc<dyn SubmissionStore>,
        mailer: Arc<dyn EmailSender>,
    ) -> Self {
        let templates = NotificationTemplates::from_config(&config.notifications);
        let pipeline = Arc::new(SubmissionPipeline::new(store, mailer, templates));
        let (queue, handle) = queue::start(pipeline, &config.queue);

        let state = State::new(
            ContactHandler::new(queue, config.queue.ack_policy),
            config.firebase.public.clone(),
        );
        let router = http::router(state, &config.server);

        Self {
            config,
            router,
            queue: handle,
        }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Closes the queue and waits for outstanding submissions.
    pub async fn shutdown(self) -> Option<usize> {
        self.queue.drain(self.config.queue.drain_timeout()).await
    }

    pub async fn run(self) -> Result<()> {
        let address = self.config.server.bind_address();
        tracing::info!("Binding to {}", address);
        let listener = TcpListener::bind(&address).await?;

        tracing::info!(
            "Serving frontend from {} (acknowledgement policy: {:?})",
            self.config.server.static_dir,
            self.config.queue.ack_policy
        );
        let served = http::serve(listener, self.router.clone()).await;

        self.shutdown().await;
        served
    }
}
