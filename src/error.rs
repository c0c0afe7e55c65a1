use thiserror::Error;

/// Errors that can occur while configuring the backend or sending mail.
#[derive(Debug, Error)]
pub enum MailerError {
    /// The backend was given invalid configuration. Raised at construction
    /// time and never subject to the fail-silently flag.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A sender or recipient address failed mailbox parsing.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The message could not be assembled or serialized to RFC 5322 form.
    #[error("message serialization failed: {0}")]
    Serialization(String),

    /// SES rejected or could not process the send request (auth failure,
    /// throttling, malformed address, oversized message, ...). No further
    /// classification is attempted here.
    #[error("SES client error: {0}")]
    Client(String),

    /// A transport-level error occurred communicating with SES.
    #[error("SES connection error: {0}")]
    Connection(String),
}

impl MailerError {
    /// Returns `true` if the error is a remote rejection of a single send,
    /// the only kind of failure the fail-silently flag swallows.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Client(_))
    }
}
