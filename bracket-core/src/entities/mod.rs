pub mod matches;

use bracket_sdk::objects::MatchStatus as SdkMatchStatus;

/// Match status for database operations.
///
/// This is the sqlx::Type version. For API/DTO use, see `bracket_sdk::objects::MatchStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "match_status")]
pub enum MatchStatus {
    Scheduled,
    Completed,
}

impl From<MatchStatus> for SdkMatchStatus {
    fn from(value: MatchStatus) -> Self {
        match value {
            MatchStatus::Scheduled => SdkMatchStatus::Scheduled,
            MatchStatus::Completed => SdkMatchStatus::Completed,
        }
    }
}

impl From<SdkMatchStatus> for MatchStatus {
    fn from(value: SdkMatchStatus) -> Self {
        match value {
            SdkMatchStatus::Scheduled => MatchStatus::Scheduled,
            SdkMatchStatus::Completed => MatchStatus::Completed,
        }
    }
}
