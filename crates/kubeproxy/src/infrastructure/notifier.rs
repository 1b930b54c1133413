//! Best-effort delivery of lifecycle notifications to the game-server plugin.

use core::error::Error;
use std::time::Duration;

use error_stack::Report;
use error_stack::ResultExt;
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use reqwest::StatusCode;
use tracing::debug;
use tracing::warn;

use crate::domain::dispatcher::NotificationSink;
use crate::domain::types::Notification;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Errors raised while delivering a notification.
#[derive(Debug, derive_more::Display)]
pub enum NotifyError {
    #[display("Failed to create HTTP client: {message}")]
    ClientBuild { message: String },
    #[display("Failed to send notification to {endpoint}")]
    Request { endpoint: String },
    #[display("Notification rejected by {endpoint} with status {status}")]
    Rejected { endpoint: String, status: u16 },
}

impl Error for NotifyError {}

/// Where and how notifications are delivered.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub endpoint: String,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8080/webadmin/Docker/Docker".to_string(),
            username: "admin".to_string(),
            password: "admin".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Posts form-encoded notifications with basic credentials. No retries.
pub struct HttpNotifier {
    client: Client,
    config: NotifierConfig,
}

impl HttpNotifier {
    pub fn new(config: NotifierConfig) -> Result<Self, Report<NotifyError>> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .change_context(NotifyError::ClientBuild {
                message: format!("timeout {:?}", config.timeout),
            })?;

        Ok(Self { client, config })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Deliver one notification, reporting transport and HTTP-level failures.
    pub async fn deliver(
        &self,
        notification: &Notification,
    ) -> Result<StatusCode, Report<NotifyError>> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .body(notification.encode())
            .send()
            .await
            .change_context_lazy(|| NotifyError::Request {
                endpoint: self.config.endpoint.clone(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Report::new(NotifyError::Rejected {
                endpoint: self.config.endpoint.clone(),
                status: status.as_u16(),
            }));
        }

        Ok(status)
    }
}

impl NotificationSink for HttpNotifier {
    fn send<'a>(&'a self, notification: &'a Notification) -> BoxFuture<'a, ()> {
        async move {
            match self.deliver(notification).await {
                Ok(status) => debug!(
                    id = %notification.record.id,
                    action = %notification.action,
                    %status,
                    "Notification delivered"
                ),
                Err(e) => warn!(
                    id = %notification.record.id,
                    action = %notification.action,
                    "Notification dropped: {e:?}"
                ),
            }
        }
        .boxed()
    }
}
