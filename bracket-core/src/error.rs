//! Service-level errors and their classification.

use crate::bracket::{AdvanceError, PlanError};
use crate::participants::ParticipantSourceError;
use crate::store::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Coarse failure category, stable across variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request cannot be honored as given.
    Validation,
    NotFound,
    /// The tournament service failed or answered nonsense.
    Upstream,
    /// The store failed; the write was rolled back.
    Persistence,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::NotFound => write!(f, "not_found"),
            ErrorKind::Upstream => write!(f, "upstream"),
            ErrorKind::Persistence => write!(f, "persistence"),
        }
    }
}

#[derive(Debug, Error)]
pub enum BracketError {
    #[error("not enough participants to generate a bracket: need at least 2, got {0}")]
    NotEnoughParticipants(usize),

    #[error("participant {0} appears more than once")]
    DuplicateParticipant(Uuid),

    #[error("a bracket already exists for tournament {0}")]
    AlreadyGenerated(Uuid),

    #[error("match {0} not found")]
    MatchNotFound(Uuid),

    #[error("result rejected: {0}")]
    ResultRejected(AdvanceError),

    #[error("tournament service unavailable: {0}")]
    Upstream(#[from] ParticipantSourceError),

    #[error("persistence failure: {0}")]
    Persistence(StoreError),
}

impl BracketError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BracketError::NotEnoughParticipants(_)
            | BracketError::DuplicateParticipant(_)
            | BracketError::AlreadyGenerated(_)
            | BracketError::ResultRejected(_) => ErrorKind::Validation,
            BracketError::MatchNotFound(_) => ErrorKind::NotFound,
            BracketError::Upstream(_) => ErrorKind::Upstream,
            BracketError::Persistence(_) => ErrorKind::Persistence,
        }
    }
}

impl From<PlanError> for BracketError {
    fn from(value: PlanError) -> Self {
        match value {
            PlanError::NotEnoughParticipants(n) => BracketError::NotEnoughParticipants(n),
            PlanError::DuplicateParticipant(id) => BracketError::DuplicateParticipant(id),
        }
    }
}

impl From<StoreError> for BracketError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::MatchNotFound(id) => BracketError::MatchNotFound(id),
            StoreError::AlreadyGenerated(id) => BracketError::AlreadyGenerated(id),
            StoreError::Rejected(e) => BracketError::ResultRejected(e),
            StoreError::Conflict(id) => BracketError::ResultRejected(AdvanceError::AlreadyCompleted(id)),
            other => BracketError::Persistence(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_are_classified() {
        let id = Uuid::new_v4();
        assert_eq!(
            BracketError::from(StoreError::MatchNotFound(id)).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            BracketError::from(StoreError::AlreadyGenerated(id)).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            BracketError::from(StoreError::Conflict(id)).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            BracketError::from(StoreError::Backend("disk full".to_string())).kind(),
            ErrorKind::Persistence
        );
        assert_eq!(
            BracketError::from(StoreError::Database(sqlx::Error::PoolTimedOut)).kind(),
            ErrorKind::Persistence
        );
    }

    #[test]
    fn test_plan_errors_are_validation() {
        assert_eq!(
            BracketError::from(PlanError::NotEnoughParticipants(1)).kind(),
            ErrorKind::Validation
        );
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
    }
}
