use async_trait::async_trait;
use aws_sdk_sesv2::primitives::Blob;
use aws_sdk_sesv2::types::{Destination, EmailContent, RawMessage};
use tracing::{debug, error, info};

use crate::config::SesConfig;
use crate::error::MailerError;

/// The raw-message send operation the backend needs from SES.
///
/// [`SesClient`] is the production implementation; tests substitute an
/// in-memory fake through
/// [`SesBackend::with_client`](crate::SesBackend::with_client).
#[async_trait]
pub trait RawEmailClient: Send + Sync + std::fmt::Debug {
    /// Submit one raw RFC 5322 message and return the SES-assigned
    /// message id.
    async fn send_raw(
        &self,
        source: &str,
        destinations: &[String],
        raw: Vec<u8>,
    ) -> Result<String, MailerError>;

    /// Verify the remote service is reachable.
    async fn health_check(&self) -> Result<(), MailerError>;
}

/// AWS SES v2 client wrapper for sending raw email.
pub struct SesClient {
    client: aws_sdk_sesv2::Client,
}

impl std::fmt::Debug for SesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SesClient")
            .field("client", &"<SesV2Client>")
            .finish()
    }
}

impl SesClient {
    /// Create a new `SesClient` from the given configuration.
    ///
    /// Resolves the effective region (explicit config value, then the
    /// `AMAZON_SES_REGION` environment variable, then `us-east-1`), wires in
    /// static credentials when the config carries them, and builds one SDK
    /// client reused for every send.
    ///
    /// Returns [`MailerError::Configuration`] if the config is malformed;
    /// the fail-silently flag never applies here.
    pub async fn new(config: &SesConfig) -> Result<Self, MailerError> {
        config.validate()?;
        let region = config.resolve_region();

        let mut loader =
            aws_config::from_env().region(aws_config::Region::new(region.clone()));

        if let Some(endpoint) = &config.endpoint_url {
            debug!(endpoint = %endpoint, "using custom SES endpoint");
            loader = loader.endpoint_url(endpoint);
        }

        if let (Some(access_key_id), Some(secret_access_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            let credentials = aws_sdk_sesv2::config::Credentials::new(
                access_key_id.clone(),
                secret_access_key.clone(),
                None,
                None,
                "ses-mailer-static",
            );
            loader = loader.credentials_provider(credentials);
        }

        let sdk_config = loader.load().await;
        debug!(region = %region, "SES client ready");
        Ok(Self {
            client: aws_sdk_sesv2::Client::new(&sdk_config),
        })
    }

    /// Create a `SesClient` with a pre-built SDK client (for testing).
    pub fn with_client(client: aws_sdk_sesv2::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RawEmailClient for SesClient {
    async fn send_raw(
        &self,
        source: &str,
        destinations: &[String],
        raw: Vec<u8>,
    ) -> Result<String, MailerError> {
        debug!(source = %source, recipients = destinations.len(), "sending raw email via SES");

        let raw_message = RawMessage::builder()
            .data(Blob::new(raw))
            .build()
            .map_err(|e| MailerError::Serialization(e.to_string()))?;

        let destination = Destination::builder()
            .set_to_addresses(Some(destinations.to_vec()))
            .build();

        let result = self
            .client
            .send_email()
            .from_email_address(source)
            .destination(destination)
            .content(EmailContent::builder().raw(raw_message).build())
            .send()
            .await
            .map_err(|e| {
                let err_str = e.to_string();
                error!(error = %err_str, "SES send_email failed");
                MailerError::Client(err_str)
            })?;

        let message_id = result.message_id().unwrap_or("unknown").to_owned();
        info!(message_id = %message_id, "SES accepted raw email");

        Ok(message_id)
    }

    async fn health_check(&self) -> Result<(), MailerError> {
        debug!("performing SES health check");
        self.client.get_account().send().await.map_err(|e| {
            error!(error = %e, "SES health check failed");
            MailerError::Connection(format!("SES health check failed: {e}"))
        })?;
        info!("SES health check passed");
        Ok(())
    }
}
