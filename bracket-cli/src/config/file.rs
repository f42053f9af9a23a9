//! TOML file configuration structures.
//!
//! These structs directly map to the `bracket-config.toml` file format.
//! Every section is optional.

use bracket_core::bracket::ByePolicy;
use bracket_sdk::objects::DEFAULT_EXCHANGE;
use serde::{Deserialize, Serialize};
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub events: EventsConfig,
    #[serde(default)]
    pub bracket: BracketConfig,
}

/// Tournament service section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the tournament service. May also come from the command
    /// line or `TOURNAMENT_SERVICE_URL`.
    pub tournament_service_url: Option<Url>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            tournament_service_url: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    10
}

/// Event relay section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Endpoint receiving the events. Unset means log only.
    pub relay_url: Option<Url>,
    #[serde(default = "default_exchange")]
    pub exchange: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            relay_url: None,
            exchange: default_exchange(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_exchange() -> String {
    DEFAULT_EXCHANGE.to_string()
}

fn default_max_retries() -> u32 {
    3
}

/// Bracket generation section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BracketConfig {
    #[serde(default)]
    pub bye_policy: ByePolicy,
    pub seed: Option<u64>,
}
