//! Tournament service configuration.

use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL of the tournament service. Participants are read from
    /// `{base}/tournaments/{id}/participants`.
    pub tournament_service_url: Url,
    /// Per-request timeout for participant lookups.
    pub request_timeout: Duration,
}
