//! Configuration types for the bracket service.
//!
//! These are the validated runtime values. Reading and overriding them from
//! the TOML file and the command line is the binary's job.

mod bracket;
mod relay;
mod upstream;

pub use bracket::BracketConfig;
pub use relay::RelayConfig;
pub use upstream::UpstreamConfig;

/// Everything the core needs, as one value.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub upstream: UpstreamConfig,
    pub relay: RelayConfig,
    pub bracket: BracketConfig,
}
