use serde::{Deserialize, Serialize};

use crate::error::MailerError;

/// Region used when neither the config nor the environment names one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Environment variable consulted when the config carries no region.
pub const REGION_ENV: &str = "AMAZON_SES_REGION";

/// Configuration for the SES mail backend.
///
/// Immutable once the backend is constructed. Region resolution follows a
/// fixed precedence: an explicit [`SesConfig::region`], then the
/// [`REGION_ENV`] environment variable, then [`DEFAULT_REGION`].
///
/// Credentials are optional: when both halves of the static key pair are
/// set they are used directly, otherwise the AWS SDK's default environment
/// credential chain applies (`AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`).
///
/// # Examples
///
/// ```
/// use ses_mailer::SesConfig;
///
/// let config = SesConfig::new("eu-west-1").with_fail_silently(true);
/// assert_eq!(config.resolve_region(), "eu-west-1");
/// assert!(config.fail_silently);
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct SesConfig {
    /// AWS region for the SES endpoint (e.g. `"us-east-1"`).
    pub region: Option<String>,

    /// Optional static AWS access key id.
    pub access_key_id: Option<String>,

    /// Optional static AWS secret access key.
    pub secret_access_key: Option<String>,

    /// Optional endpoint URL override for local development (e.g. `LocalStack`).
    pub endpoint_url: Option<String>,

    /// When `true`, SES client errors on individual messages are swallowed
    /// and the batch continues. Defaults to `false` (propagate).
    #[serde(default)]
    pub fail_silently: bool,
}

impl std::fmt::Debug for SesConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SesConfig")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("endpoint_url", &self.endpoint_url)
            .field("fail_silently", &self.fail_silently)
            .finish()
    }
}

impl SesConfig {
    /// Create a new `SesConfig` with an explicit AWS region.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: Some(region.into()),
            ..Self::default()
        }
    }

    /// Set a static AWS credential pair.
    #[must_use]
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    /// Set the endpoint URL override (for `LocalStack`).
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Set whether per-message SES client errors are swallowed.
    #[must_use]
    pub fn with_fail_silently(mut self, fail_silently: bool) -> Self {
        self.fail_silently = fail_silently;
        self
    }

    /// Resolve the effective region: explicit config value, then the
    /// [`REGION_ENV`] environment variable, then [`DEFAULT_REGION`].
    pub fn resolve_region(&self) -> String {
        resolve_region(self.region.as_deref(), std::env::var(REGION_ENV).ok())
    }

    /// Check the config for mistakes the SES client would otherwise carry
    /// silently until the first send.
    pub fn validate(&self) -> Result<(), MailerError> {
        if let Some(region) = &self.region
            && region.trim().is_empty()
        {
            return Err(MailerError::Configuration("region must not be empty".to_owned()));
        }
        if self.access_key_id.is_some() != self.secret_access_key.is_some() {
            return Err(MailerError::Configuration(
                "access_key_id and secret_access_key must be set together".to_owned(),
            ));
        }
        Ok(())
    }
}

impl Default for SesConfig {
    fn default() -> Self {
        Self {
            region: None,
            access_key_id: None,
            secret_access_key: None,
            endpoint_url: None,
            fail_silently: false,
        }
    }
}

fn resolve_region(explicit: Option<&str>, env_region: Option<String>) -> String {
    if let Some(region) = explicit {
        return region.to_owned();
    }
    if let Some(region) = env_region
        && !region.is_empty()
    {
        return region;
    }
    DEFAULT_REGION.to_owned()
}
