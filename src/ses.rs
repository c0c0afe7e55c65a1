use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::backend::MailBackend;
use crate::client::{RawEmailClient, SesClient};
use crate::config::SesConfig;
use crate::error::MailerError;
use crate::message::EmailMessage;
use crate::observer::SendObserver;

/// A mail backend that delivers messages through the Amazon SES raw email
/// API, one remote call per message.
///
/// The SES client handle is created exactly once at construction and reused
/// for every send. Per-message SES rejections either propagate (aborting the
/// rest of the batch) or, with `fail_silently` enabled, degrade to a
/// "not sent" outcome while the batch continues.
///
/// # Examples
///
/// ```no_run
/// use ses_mailer::{EmailMessage, MailBackend, SesBackend, SesConfig};
///
/// # async fn example() -> Result<(), ses_mailer::MailerError> {
/// let backend = SesBackend::new(&SesConfig::new("us-east-1")).await?;
/// let message = EmailMessage::new("sender@example.com", "Hello")
///     .with_to("someone@example.com")
///     .with_body("Hi!");
/// let sent = backend.send_messages(&[message]).await?;
/// assert_eq!(sent, 1);
/// # Ok(())
/// # }
/// ```
pub struct SesBackend {
    fail_silently: bool,
    client: Arc<dyn RawEmailClient>,
    observers: Vec<Arc<dyn SendObserver>>,
}

impl std::fmt::Debug for SesBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SesBackend")
            .field("fail_silently", &self.fail_silently)
            .field("client", &self.client)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl SesBackend {
    /// Create a new `SesBackend` by building an SES client from the config.
    ///
    /// Returns [`MailerError::Configuration`] if the config is malformed.
    /// Construction either succeeds fully or errors; the backend never holds
    /// an absent client.
    pub async fn new(config: &SesConfig) -> Result<Self, MailerError> {
        let client = SesClient::new(config).await?;
        Ok(Self::with_client(config.fail_silently, Arc::new(client)))
    }

    /// Create a `SesBackend` with a pre-built client (for testing).
    pub fn with_client(fail_silently: bool, client: Arc<dyn RawEmailClient>) -> Self {
        Self {
            fail_silently,
            client,
            observers: Vec::new(),
        }
    }

    /// Register an observer, invoked synchronously around each send attempt
    /// in registration order.
    pub fn add_observer(&mut self, observer: Arc<dyn SendObserver>) {
        self.observers.push(observer);
    }

    /// Verify SES is reachable with the configured credentials.
    pub async fn health_check(&self) -> Result<(), MailerError> {
        self.client.health_check().await
    }

    fn notify_pre_send(&self, message: &EmailMessage) {
        for observer in &self.observers {
            observer.on_pre_send(message);
        }
    }

    fn notify_post_send(&self, message: &EmailMessage, message_id: &str) {
        for observer in &self.observers {
            observer.on_post_send(message, message_id);
        }
    }

    /// Attempt delivery of one message. Returns `Ok(true)` if SES accepted
    /// it, `Ok(false)` if it was skipped (no recipients) or its rejection
    /// was silenced.
    async fn send(&self, message: &EmailMessage) -> Result<bool, MailerError> {
        self.notify_pre_send(message);

        if message.recipients().is_empty() {
            debug!(subject = %message.subject, "skipping message with no recipients");
            return Ok(false);
        }

        let source = message.sanitized_source()?;
        let destinations = message.sanitized_recipients()?;
        let raw = message.formatted()?;

        match self.client.send_raw(&source, &destinations, raw).await {
            Ok(message_id) => {
                self.notify_post_send(message, &message_id);
                Ok(true)
            }
            Err(err) if self.fail_silently && err.is_client_error() => {
                warn!(subject = %message.subject, error = %err, "send failed, continuing");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl MailBackend for SesBackend {
    #[instrument(skip(self, messages), fields(backend = "ses", message_count = messages.len()))]
    async fn send_messages(&self, messages: &[EmailMessage]) -> Result<usize, MailerError> {
        if messages.is_empty() {
            return Ok(0);
        }

        let mut sent_message_count = 0;
        for message in messages {
            if self.send(message).await? {
                sent_message_count += 1;
            }
        }

        info!(sent = sent_message_count, total = messages.len(), "batch complete");
        Ok(sent_message_count)
    }

    fn backend_name(&self) -> &'static str {
        "ses"
    }
}
