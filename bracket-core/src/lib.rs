//! Single-elimination bracket generation and result progression.
//!
//! The crate is split along the flow of a bracket:
//!
//! - [`bracket`]: pure planning of the match tree and the result state machine
//! - [`entities`] / [`store`]: transactional persistence behind `kanau` processors
//! - [`participants`]: the participant source consumed before anything is written
//! - [`events`] / [`processors`]: post-commit, best-effort notifications
//! - [`service`]: the orchestration tying the above together

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod bracket;
pub mod config;
pub mod entities;
pub mod error;
pub mod events;
pub mod framework;
pub mod participants;
pub mod processors;
pub mod service;
pub mod store;

pub use error::{BracketError, ErrorKind};
pub use service::BracketService;
