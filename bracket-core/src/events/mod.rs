//! Post-commit notifications.
//!
//! The service hands a [`BracketEvent`] to an [`EventSink`] once the write it
//! describes is committed. In the binary the sink is the sending half of a
//! bounded channel drained by the
//! [`EventRelay`](crate::processors::event_relay::EventRelay).
//!
//! Events are fire-and-forget: a failed publish is logged by the caller and
//! never affects committed data.

pub mod channels;
pub mod sink;
pub mod types;

pub use channels::{
    BracketEventReceiver, BracketEventSender, DEFAULT_CHANNEL_BUFFER, bracket_event_channel,
};
pub use sink::{EventSink, EventSinkError};
pub use types::BracketEvent;
