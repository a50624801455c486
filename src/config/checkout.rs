//! Checkout callback configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::application::GatewaySettings;
use crate::domain::payment::RequestType;

/// Shop-side URLs MoMo and the customer's browser are sent to
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutConfig {
    /// Public browser-return URL handed to MoMo as `redirectUrl`
    #[serde(default)]
    pub redirect_url: String,

    /// Public notify URL handed to MoMo as `ipnUrl`
    #[serde(default)]
    pub ipn_url: String,

    /// Order confirmation page for successful payments
    #[serde(default)]
    pub confirmation_url: String,

    /// Checkout page customers return to after a failed payment
    #[serde(default)]
    pub checkout_url: String,

    #[serde(default)]
    pub request_type: RequestType,
}

impl CheckoutConfig {
    pub fn gateway_settings(&self, refunds_supported: bool) -> GatewaySettings {
        GatewaySettings {
            redirect_url: self.redirect_url.clone(),
            ipn_url: self.ipn_url.clone(),
            confirmation_url: self.confirmation_url.clone(),
            checkout_url: self.checkout_url.clone(),
            request_type: self.request_type,
            refunds_supported,
        }
    }

    /// Validate checkout URLs
    ///
    /// MoMo calls `redirect_url` and `ipn_url` from the public internet, so in
    /// production they must be HTTPS.
    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        let urls = [
            (&self.redirect_url, "CHECKOUT__REDIRECT_URL"),
            (&self.ipn_url, "CHECKOUT__IPN_URL"),
            (&self.confirmation_url, "CHECKOUT__CONFIRMATION_URL"),
            (&self.checkout_url, "CHECKOUT__CHECKOUT_URL"),
        ];
        for (url, name) in urls {
            if url.trim().is_empty() {
                return Err(ValidationError::MissingRequired(name));
            }
            super::require_http_url(url, name)?;
        }

        if production {
            for (url, name) in [
                (&self.redirect_url, "CHECKOUT__REDIRECT_URL"),
                (&self.ipn_url, "CHECKOUT__IPN_URL"),
            ] {
                if !url.starts_with("https://") {
                    return Err(ValidationError::CallbackMustBeHttps(name));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local() -> CheckoutConfig {
        CheckoutConfig {
            redirect_url: "http://localhost:8080/payments/momo/return".to_string(),
            ipn_url: "http://localhost:8080/payments/momo/notify".to_string(),
            confirmation_url: "http://localhost:3000/order-received".to_string(),
            checkout_url: "http://localhost:3000/checkout".to_string(),
            request_type: RequestType::CaptureWallet,
        }
    }

    #[test]
    fn test_plain_http_allowed_outside_production() {
        assert!(local().validate(false).is_ok());
    }

    #[test]
    fn test_plain_http_callbacks_rejected_in_production() {
        assert_eq!(
            local().validate(true),
            Err(ValidationError::CallbackMustBeHttps("CHECKOUT__REDIRECT_URL"))
        );
    }

    #[test]
    fn test_missing_ipn_url() {
        let config = CheckoutConfig {
            ipn_url: String::new(),
            ..local()
        };
        assert_eq!(
            config.validate(false),
            Err(ValidationError::MissingRequired("CHECKOUT__IPN_URL"))
        );
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let config = CheckoutConfig {
            checkout_url: "ftp://shop.example/checkout".to_string(),
            ..local()
        };
        assert_eq!(
            config.validate(false),
            Err(ValidationError::InvalidUrl("CHECKOUT__CHECKOUT_URL"))
        );
    }

    #[test]
    fn test_gateway_settings_copy_urls() {
        let settings = local().gateway_settings(false);
        assert_eq!(settings.ipn_url, "http://localhost:8080/payments/momo/notify");
        assert_eq!(settings.request_type, RequestType::CaptureWallet);
        assert!(!settings.refunds_supported);
    }
}
