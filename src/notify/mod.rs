pub mod dto;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use crate::error::AppError;
use crate::models::{ClassSession, format_hhmm};

/// What a channel sends for one upcoming session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub subject: String,
    pub body: String,
}

impl Reminder {
    pub fn for_session(session: &ClassSession, minutes_left: i64) -> Self {
        let subject = format!(
            "Class reminder: {} at {}",
            session.course_name,
            format_hhmm(session.start_time)
        );
        let body = format!(
            "{} starts in {} minute(s).\nTime: {}\nLocation: {}\nTeacher: {}",
            session.course_name,
            minutes_left,
            session.span(),
            session.location,
            session.teacher
        );
        Self { subject, body }
    }
}

/// One outbound delivery path. Sends are fire-and-forget: callers log the
/// outcome and never retry.
#[async_trait]
pub trait ReminderChannel: Send + Sync {
    fn name(&self) -> &'static str;
    async fn deliver(&self, reminder: &Reminder) -> Result<(), AppError>;
}

pub struct WebhookChannel {
    client: Client,
    url: String,
}

impl WebhookChannel {
    pub fn new(url: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl ReminderChannel for WebhookChannel {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn deliver(&self, reminder: &Reminder) -> Result<(), AppError> {
        let message = dto::WebhookMessage::text(format!("{}\n{}", reminder.subject, reminder.body));

        let response = self
            .client
            .post(&self.url)
            .json(&message)
            .send()
            .await
            .map_err(|e| AppError::delivery(self.name(), e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::delivery(
                self.name(),
                format!("webhook returned {}: {}", status, body),
            ));
        }

        Ok(())
    }
}

/// Mail delivery capability. Actual sending lives outside this crate.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), AppError>;
}

/// Transport that only records the mail in the log.
pub struct LogMailTransport;

#[async_trait]
impl MailTransport for LogMailTransport {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), AppError> {
        info!(recipient, subject, body_len = body.len(), "mail handed to log transport");
        Ok(())
    }
}

pub struct EmailChannel {
    recipient: String,
    transport: Arc<dyn MailTransport>,
}

impl EmailChannel {
    pub fn new(recipient: impl Into<String>, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            recipient: recipient.into(),
            transport,
        }
    }
}

#[async_trait]
impl ReminderChannel for EmailChannel {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn deliver(&self, reminder: &Reminder) -> Result<(), AppError> {
        self.transport
            .send(&self.recipient, &reminder.subject, &reminder.body)
            .await
            .map_err(|e| match e {
                AppError::Delivery { .. } => e,
                other => AppError::delivery(self.name(), other.to_string()),
            })
    }
}
