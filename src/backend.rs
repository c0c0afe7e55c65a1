use async_trait::async_trait;

use crate::error::MailerError;
use crate::message::EmailMessage;

/// Trait for pluggable mail delivery backends.
///
/// Batch delivery is the sole required capability: callers hand over an
/// ordered slice of messages and get back the number SES (or whatever
/// transport an implementation wraps) accepted. Implementations attempt
/// messages in input order, each as an independent send with no atomicity
/// across the batch.
#[async_trait]
pub trait MailBackend: Send + Sync + std::fmt::Debug {
    /// Send a batch of messages and return how many were delivered.
    ///
    /// An empty batch returns `Ok(0)` without any processing.
    async fn send_messages(&self, messages: &[EmailMessage]) -> Result<usize, MailerError>;

    /// Return the backend name (e.g. `"ses"`).
    fn backend_name(&self) -> &'static str;
}
