//! Event relay configuration.

use bracket_sdk::objects::DEFAULT_EXCHANGE;
use url::Url;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Where events are POSTed. `None` logs them instead.
    pub relay_url: Option<Url>,
    /// Exchange name carried in the `Bracket-Exchange` header.
    pub exchange: String,
    /// Delivery attempts after the first one.
    pub max_retries: u32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            relay_url: None,
            exchange: DEFAULT_EXCHANGE.to_string(),
            max_retries: 3,
        }
    }
}
