use crate::message::EmailMessage;

/// Callbacks invoked synchronously around each send attempt.
///
/// Observers are registered with
/// [`SesBackend::add_observer`](crate::SesBackend::add_observer) and invoked
/// in registration order. [`SendObserver::on_pre_send`] fires before every
/// attempt, including messages later skipped for lacking recipients;
/// [`SendObserver::on_post_send`] fires only after SES confirms the send.
///
/// Return values are not observed and observers must not fail; both methods
/// default to no-ops so implementations can subscribe to a single point.
pub trait SendObserver: Send + Sync {
    /// Called before any recipient check or network activity for a message.
    fn on_pre_send(&self, message: &EmailMessage) {
        let _ = message;
    }

    /// Called after a confirmed send, with the SES-assigned message id.
    fn on_post_send(&self, message: &EmailMessage, message_id: &str) {
        let _ = (message, message_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;

    impl SendObserver for Silent {}

    #[test]
    fn default_methods_are_no_ops() {
        let observer = Silent;
        let message = EmailMessage::new("sender@example.com", "Quiet");
        observer.on_pre_send(&message);
        observer.on_post_send(&message, "id-1");
    }
}
