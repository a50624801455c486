//! MoMo provider configuration

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use crate::adapters::momo::{MomoConfig, PRODUCTION_BASE_URL, SANDBOX_BASE_URL};

/// MoMo environment selecting the default API base URL
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderEnvironment {
    #[default]
    Sandbox,
    Production,
}

/// Merchant credentials and client settings for the MoMo API
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub environment: ProviderEnvironment,

    /// Overrides the environment's base URL when set
    pub base_url: Option<String>,

    #[serde(default)]
    pub partner_code: String,

    #[serde(default)]
    pub access_key: String,

    #[serde(default = "empty_secret")]
    pub secret_key: SecretString,

    /// Language of provider-rendered messages
    #[serde(default = "default_lang")]
    pub lang: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Whether the merchant's account tier exposes the refund API
    #[serde(default = "default_refunds_supported")]
    pub refunds_supported: bool,
}

impl ProviderConfig {
    /// API base URL; `create`, `query` and `refund` are appended to it.
    pub fn base_url(&self) -> &str {
        match (&self.base_url, self.environment) {
            (Some(url), _) if !url.trim().is_empty() => url,
            (_, ProviderEnvironment::Sandbox) => SANDBOX_BASE_URL,
            (_, ProviderEnvironment::Production) => PRODUCTION_BASE_URL,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build the HTTP client configuration.
    pub fn momo_config(&self) -> MomoConfig {
        MomoConfig::new(
            &self.partner_code,
            &self.access_key,
            self.secret_key.expose_secret().as_str(),
            self.base_url(),
        )
        .with_lang(&self.lang)
        .with_timeout(self.timeout())
        .with_max_redirects(self.max_redirects)
    }

    /// Validate provider configuration
    ///
    /// The gateway is unavailable without all three merchant credentials.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.partner_code.trim().is_empty() {
            return Err(ValidationError::MissingRequired("PROVIDER__PARTNER_CODE"));
        }
        if self.access_key.trim().is_empty() {
            return Err(ValidationError::MissingRequired("PROVIDER__ACCESS_KEY"));
        }
        if self.secret_key.expose_secret().trim().is_empty() {
            return Err(ValidationError::MissingRequired("PROVIDER__SECRET_KEY"));
        }
        super::require_http_url(self.base_url(), "PROVIDER__BASE_URL")?;
        if self.lang != "vi" && self.lang != "en" {
            return Err(ValidationError::InvalidLanguage);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            environment: ProviderEnvironment::default(),
            base_url: None,
            partner_code: String::new(),
            access_key: String::new(),
            secret_key: empty_secret(),
            lang: default_lang(),
            timeout_secs: default_timeout(),
            max_redirects: default_max_redirects(),
            refunds_supported: default_refunds_supported(),
        }
    }
}

fn empty_secret() -> SecretString {
    SecretString::new(String::new())
}

fn default_lang() -> String {
    "vi".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_max_redirects() -> usize {
    5
}

fn default_refunds_supported() -> bool {
    true
}
