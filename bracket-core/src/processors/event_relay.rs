//! EventRelay processor.
//!
//! The EventRelay is responsible for:
//! - Receiving `BracketEvent` from the channel
//! - Building the notification payload for its routing key
//! - POSTing it to the configured relay endpoint, tagged with the routing key
//!   and exchange headers
//! - Retrying failed deliveries with exponential backoff
//!
//! Without a relay endpoint every event is logged and dropped. Delivery never
//! touches the store, so a failure here cannot affect committed data.

use crate::config::RelayConfig;
use crate::events::{BracketEvent, BracketEventReceiver};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use url::Url;

/// Backoff cap: 2^6 = 64 seconds.
const MAX_BACKOFF_EXPONENT: u32 = 6;

pub const ROUTING_KEY_HEADER: &str = "Bracket-Routing-Key";
pub const EXCHANGE_HEADER: &str = "Bracket-Exchange";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("relay rejected event with status {status}: {body}")]
    DeliveryFailed { status: u16, body: String },

    #[error("payload serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("relay shut down before delivery")]
    ShutDown,
}

pub struct EventRelay {
    config: RelayConfig,
    event_rx: BracketEventReceiver,
    shutdown_rx: watch::Receiver<bool>,
    http_client: reqwest::Client,
}

impl EventRelay {
    pub fn new(
        config: RelayConfig,
        event_rx: BracketEventReceiver,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            config,
            event_rx,
            shutdown_rx,
            http_client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Run until shutdown is signalled or every sender is dropped. Events
    /// already queued when the senders go away are still delivered.
    pub async fn run(mut self) {
        info!(exchange = %self.config.exchange, "EventRelay started");

        loop {
            tokio::select! {
                biased;

                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        info!("EventRelay received shutdown signal");
                        break;
                    }
                }

                Some(event) = self.event_rx.recv() => {
                    debug!(event = ?event, "Received BracketEvent");

                    if let Err(e) = self.process_event(&event).await {
                        error!(
                            routing_key = event.routing_key(),
                            tournament_id = %event.tournament_id(),
                            error = %e,
                            "Failed to relay BracketEvent"
                        );
                    }
                }

                else => {
                    info!("BracketEvent channel closed");
                    break;
                }
            }
        }

        info!("EventRelay shutdown complete");
    }

    async fn process_event(&mut self, event: &BracketEvent) -> Result<(), RelayError> {
        let body = event.body()?;

        let Some(url) = self.config.relay_url.clone() else {
            info!(
                exchange = %self.config.exchange,
                routing_key = event.routing_key(),
                body = %body,
                "Event published (no relay configured)"
            );
            return Ok(());
        };

        let mut attempt = 0;
        loop {
            match self.deliver(&url, event.routing_key(), &body).await {
                Ok(()) => {
                    info!(
                        routing_key = event.routing_key(),
                        tournament_id = %event.tournament_id(),
                        "Event relayed"
                    );
                    return Ok(());
                }
                Err(e) if attempt < self.config.max_retries => {
                    let delay = calculate_retry_delay(attempt);
                    warn!(
                        routing_key = event.routing_key(),
                        error = %e,
                        retry_count = attempt + 1,
                        delay_secs = delay.as_secs(),
                        "Event relay failed, retrying"
                    );
                    attempt += 1;

                    tokio::select! {
                        biased;
                        changed = self.shutdown_rx.changed() => {
                            if changed.is_err() || *self.shutdown_rx.borrow() {
                                return Err(RelayError::ShutDown);
                            }
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn deliver(&self, url: &Url, routing_key: &str, body: &str) -> Result<(), RelayError> {
        let response = self
            .http_client
            .post(url.clone())
            .header("Content-Type", "application/json")
            .header(ROUTING_KEY_HEADER, routing_key)
            .header(EXCHANGE_HEADER, &self.config.exchange)
            .body(body.to_string())
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(RelayError::DeliveryFailed {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Calculate the next retry delay based on retry count.
///
/// Uses exponential backoff: 2^retry_count seconds.
pub fn calculate_retry_delay(retry_count: u32) -> std::time::Duration {
    let seconds = 2u64.pow(retry_count.min(MAX_BACKOFF_EXPONENT));
    std::time::Duration::from_secs(seconds)
}
