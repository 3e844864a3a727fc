//! Messaging gateway configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Messaging gateway configuration (provider API and webhook ingress)
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Bearer token for the provider API
    pub access_token: String,

    /// Provider-assigned sender (phone number) id
    pub sender_id: String,

    /// Token the provider echoes during the webhook handshake
    pub verify_token: String,

    /// App secret used to verify inbound webhook signatures
    pub app_secret: String,

    /// Base URL of the provider API
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl GatewayConfig {
    /// Validate gateway configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.access_token.is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_ACCESS_TOKEN"));
        }
        if self.sender_id.is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_SENDER_ID"));
        }
        if self.verify_token.is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_VERIFY_TOKEN"));
        }
        if self.app_secret.is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_APP_SECRET"));
        }
        Ok(())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            sender_id: String::new(),
            verify_token: String::new(),
            app_secret: String::new(),
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "https://graph.facebook.com/v19.0".to_string()
}
