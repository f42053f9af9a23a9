//! Event channel factory and handles.

use super::types::BracketEvent;
use tokio::sync::mpsc;

/// Default buffer size for the event channel.
///
/// Enough to absorb a burst of results while the relay is retrying.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for BracketEvent events.
pub type BracketEventSender = mpsc::Sender<BracketEvent>;
/// Receiver handle for BracketEvent events.
pub type BracketEventReceiver = mpsc::Receiver<BracketEvent>;

/// Create a new BracketEvent channel.
pub fn bracket_event_channel() -> (BracketEventSender, BracketEventReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
