//! Configuration for the booking widgets.
//!
//! Loads configuration from environment variables with sensible defaults.
//! The backend section points the hosted collaborator implementations at the
//! organization's API; the embed section feeds snippet generation.

use serde::{Deserialize, Serialize};
use std::env;
use uuid::Uuid;

use crate::types::OrganizationId;

/// Widget configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Hosted backend configuration
    pub backend: BackendConfig,
    /// Checkout behavior configuration
    pub checkout: CheckoutConfig,
    /// Embed surface configuration
    pub embed: EmbedConfig,
}

/// Hosted backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the hosted backend API
    pub base_url: String,
    /// Publishable API key sent with collaborator requests
    pub api_key: Option<String>,
    /// Organization scope for discount validation
    ///
    /// When absent, widgets fall back to the demo validators and run
    /// without a backend.
    pub organization_id: Option<OrganizationId>,
}

/// Checkout behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Bound on a checkout submission round-trip, in seconds
    pub submit_timeout_secs: u64,
}

/// Embed surface configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedConfig {
    /// Base URL the embed snippet points at
    pub base_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            backend: BackendConfig {
                base_url: env::var("BOOKFLOW_API_URL")
                    .unwrap_or_else(|_| "http://localhost:54321".to_string()),
                api_key: env::var("BOOKFLOW_API_KEY").ok(),
                organization_id: env::var("BOOKFLOW_ORGANIZATION_ID")
                    .ok()
                    .and_then(|s| s.parse::<Uuid>().ok())
                    .map(OrganizationId::from_uuid),
            },
            checkout: CheckoutConfig {
                submit_timeout_secs: env::var("BOOKFLOW_SUBMIT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            },
            embed: EmbedConfig {
                base_url: env::var("BOOKFLOW_EMBED_BASE_URL")
                    .unwrap_or_else(|_| "https://widgets.bookflow.app".to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_env() {
        // Other tests don't set these vars, so defaults should hold.
        let config = Config::from_env();
        assert_eq!(config.checkout.submit_timeout_secs, 30);
        assert!(!config.embed.base_url.is_empty());
    }
}
