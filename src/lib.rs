//! Amazon SES mail backend.
//!
//! This crate transmits already-constructed email messages through the SES
//! v2 HTTP API instead of SMTP. Each [`EmailMessage`] is serialized into a
//! raw RFC 5322 byte stream (CRLF line endings, as the raw-message endpoint
//! requires) and submitted in its own `SendEmail` call; a batch of N
//! messages is N sequential round-trips, with no atomicity across the batch.
//!
//! - [`SesBackend`] — the backend itself, constructed once per [`SesConfig`]
//!   and reused for every batch.
//! - [`MailBackend`] — the delivery trait callers depend on, so application
//!   code stays decoupled from the concrete transport.
//! - [`SendObserver`] — synchronous pre-send / post-send callbacks, the
//!   post-send one carrying the SES-assigned message id.
//! - [`RawEmailClient`] — the seam in front of `aws-sdk-sesv2`, replaceable
//!   in tests.

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod observer;
pub mod ses;

// Re-exports for convenience.
pub use backend::MailBackend;
pub use client::{RawEmailClient, SesClient};
pub use config::{DEFAULT_REGION, REGION_ENV, SesConfig};
pub use error::MailerError;
pub use message::{Attachment, EmailMessage};
pub use observer::SendObserver;
pub use ses::SesBackend;
