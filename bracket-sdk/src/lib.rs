//! Wire types for the bracket service.
//!
//! Everything in here is plain serde data: the participant list served by the
//! tournament service, the match representation returned to callers, and the
//! notification payloads published after a commit.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod objects;
