//! Long-running background processors.

pub mod event_relay;

pub use event_relay::{EventRelay, RelayError, calculate_retry_delay};
