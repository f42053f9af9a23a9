use crate::bracket::{BuilderOptions, ByePolicy};

/// Bracket generation settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct BracketConfig {
    pub bye_policy: ByePolicy,
    /// Fixed shuffle seed. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl BracketConfig {
    pub fn builder_options(&self) -> BuilderOptions {
        BuilderOptions {
            bye_policy: self.bye_policy,
        }
    }
}
