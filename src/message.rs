use lettre::Message;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart, SinglePart};

use crate::error::MailerError;

/// A file attached to an outbound message.
#[derive(Clone)]
pub struct Attachment {
    /// Filename presented to the recipient.
    pub filename: String,
    /// MIME type of the content (e.g. `"application/pdf"`).
    pub content_type: String,
    /// Raw attachment bytes.
    pub data: Vec<u8>,
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("data", &format!("<{} bytes>", self.data.len()))
            .finish()
    }
}

impl Attachment {
    /// Create an attachment from a filename, MIME type, and content bytes.
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            data,
        }
    }
}

/// One outbound email message.
///
/// The backend only reads it: it enumerates the effective recipients with
/// [`EmailMessage::recipients`] and asks for the wire form with
/// [`EmailMessage::formatted`]. Header assembly, body encoding, and MIME
/// structure are delegated to `lettre`'s message builder.
///
/// # Examples
///
/// ```
/// use ses_mailer::EmailMessage;
///
/// let message = EmailMessage::new("sender@example.com", "Hello")
///     .with_to("first@example.com")
///     .with_cc("second@example.com")
///     .with_body("Hi there");
/// assert_eq!(message.recipients().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// Sender email address.
    pub from: String,
    /// Primary recipient addresses.
    pub to: Vec<String>,
    /// CC recipient addresses.
    pub cc: Vec<String>,
    /// BCC recipient addresses.
    pub bcc: Vec<String>,
    /// Optional reply-to address.
    pub reply_to: Option<String>,
    /// Email subject line.
    pub subject: String,
    /// Optional plain-text body.
    pub body: Option<String>,
    /// Optional HTML body.
    pub html_body: Option<String>,
    /// Attached files.
    pub attachments: Vec<Attachment>,
}

impl EmailMessage {
    /// Create a message with a sender and subject and no recipients yet.
    pub fn new(from: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            reply_to: None,
            subject: subject.into(),
            body: None,
            html_body: None,
            attachments: Vec::new(),
        }
    }

    /// Add a primary recipient.
    #[must_use]
    pub fn with_to(mut self, to: impl Into<String>) -> Self {
        self.to.push(to.into());
        self
    }

    /// Add a CC recipient.
    #[must_use]
    pub fn with_cc(mut self, cc: impl Into<String>) -> Self {
        self.cc.push(cc.into());
        self
    }

    /// Add a BCC recipient.
    #[must_use]
    pub fn with_bcc(mut self, bcc: impl Into<String>) -> Self {
        self.bcc.push(bcc.into());
        self
    }

    /// Set the reply-to address.
    #[must_use]
    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    /// Set the plain-text body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the HTML body.
    #[must_use]
    pub fn with_html_body(mut self, html_body: impl Into<String>) -> Self {
        self.html_body = Some(html_body.into());
        self
    }

    /// Attach a file.
    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// The effective recipients, in to, cc, bcc order.
    pub fn recipients(&self) -> Vec<&str> {
        self.to
            .iter()
            .chain(self.cc.iter())
            .chain(self.bcc.iter())
            .map(String::as_str)
            .collect()
    }

    /// The sender address, parsed and re-rendered through a mailbox.
    pub fn sanitized_source(&self) -> Result<String, MailerError> {
        Ok(parse_mailbox(&self.from)?.to_string())
    }

    /// All recipient addresses, each parsed and re-rendered through a
    /// mailbox, in the same order as [`EmailMessage::recipients`].
    pub fn sanitized_recipients(&self) -> Result<Vec<String>, MailerError> {
        self.recipients()
            .into_iter()
            .map(|addr| Ok(parse_mailbox(addr)?.to_string()))
            .collect()
    }

    /// Serialize the full message (headers, body, attachments) into a raw
    /// RFC 5322 byte stream.
    ///
    /// Line separators are CRLF, which the SES raw-message endpoint requires;
    /// `lettre` guarantees wire-format line endings rather than the host
    /// platform's native ones.
    pub fn formatted(&self) -> Result<Vec<u8>, MailerError> {
        let mut builder = Message::builder()
            .from(parse_mailbox(&self.from)?)
            .subject(&self.subject);

        for addr in &self.to {
            builder = builder.to(parse_mailbox(addr)?);
        }
        for addr in &self.cc {
            builder = builder.cc(parse_mailbox(addr)?);
        }
        for addr in &self.bcc {
            builder = builder.bcc(parse_mailbox(addr)?);
        }
        if let Some(reply_to) = &self.reply_to {
            builder = builder.reply_to(parse_mailbox(reply_to)?);
        }

        let message = if self.attachments.is_empty() {
            match (&self.body, &self.html_body) {
                (Some(text), Some(html)) => builder
                    .multipart(alternative_part(text, html))
                    .map_err(serialization_error)?,
                (Some(text), None) => builder.body(text.clone()).map_err(serialization_error)?,
                (None, Some(html)) => builder
                    .singlepart(html_part(html))
                    .map_err(serialization_error)?,
                (None, None) => builder.body(String::new()).map_err(serialization_error)?,
            }
        } else {
            let mut mixed = match (&self.body, &self.html_body) {
                (Some(text), Some(html)) => {
                    MultiPart::mixed().multipart(alternative_part(text, html))
                }
                (Some(text), None) => MultiPart::mixed().singlepart(text_part(text)),
                (None, Some(html)) => MultiPart::mixed().singlepart(html_part(html)),
                (None, None) => MultiPart::mixed().singlepart(text_part("")),
            };
            for attachment in &self.attachments {
                let content_type =
                    ContentType::parse(&attachment.content_type).map_err(|e| {
                        MailerError::Serialization(format!(
                            "bad attachment content type {}: {e}",
                            attachment.content_type
                        ))
                    })?;
                mixed = mixed.singlepart(
                    lettre::message::Attachment::new(attachment.filename.clone())
                        .body(attachment.data.clone(), content_type),
                );
            }
            builder.multipart(mixed).map_err(serialization_error)?
        };

        Ok(message.formatted())
    }
}

fn parse_mailbox(addr: &str) -> Result<Mailbox, MailerError> {
    addr.parse::<Mailbox>()
        .map_err(|e| MailerError::InvalidAddress(format!("{addr}: {e}")))
}

fn serialization_error(e: lettre::error::Error) -> MailerError {
    MailerError::Serialization(e.to_string())
}

fn text_part(text: &str) -> SinglePart {
    SinglePart::builder()
        .header(ContentType::TEXT_PLAIN)
        .body(text.to_owned())
}

fn html_part(html: &str) -> SinglePart {
    SinglePart::builder()
        .header(ContentType::TEXT_HTML)
        .body(html.to_owned())
}

fn alternative_part(text: &str, html: &str) -> MultiPart {
    MultiPart::alternative()
        .singlepart(text_part(text))
        .singlepart(html_part(html))
}
