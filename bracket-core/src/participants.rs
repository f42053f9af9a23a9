//! Participant lookup against the tournament service.
//!
//! The participant list is fetched before any transaction starts; every
//! failure here aborts bracket generation with nothing written.

use crate::config::UpstreamConfig;
use bracket_sdk::objects::Participant;
use std::future::Future;
use thiserror::Error;
use tracing::debug;
use url::Url;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ParticipantSourceError {
    /// Transport failure, including timeouts.
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("tournament service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed participant list: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid participant url: {0}")]
    Url(#[from] url::ParseError),
}

/// Where participants come from.
pub trait ParticipantSource: Send + Sync {
    fn participants(
        &self,
        tournament_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Participant>, ParticipantSourceError>> + Send;
}

/// Reads `GET {base}/tournaments/{id}/participants`.
#[derive(Debug, Clone)]
pub struct HttpParticipantSource {
    http_client: reqwest::Client,
    base_url: Url,
}

impl HttpParticipantSource {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ParticipantSourceError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http_client,
            base_url: config.tournament_service_url.clone(),
        })
    }

    pub fn participants_url(&self, tournament_id: Uuid) -> Result<Url, ParticipantSourceError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!(
            "{base}/tournaments/{tournament_id}/participants"
        ))?)
    }
}

impl ParticipantSource for HttpParticipantSource {
    #[tracing::instrument(skip(self), err)]
    async fn participants(
        &self,
        tournament_id: Uuid,
    ) -> Result<Vec<Participant>, ParticipantSourceError> {
        let url = self.participants_url(tournament_id)?;
        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ParticipantSourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let participants: Vec<Participant> = serde_json::from_str(&body)?;
        debug!(count = participants.len(), "Fetched participants");
        Ok(participants)
    }
}
