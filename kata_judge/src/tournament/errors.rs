//! Tournament error types.

use super::models::TournamentId;
use crate::storage::StorageError;
use thiserror::Error;

/// Tournament errors
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("Tournament not found: {0}")]
    NotFound(TournamentId),

    #[error("Mat {mat} not found")]
    MatNotFound { mat: usize },

    #[error("Group {group} not found on mat {mat}")]
    GroupNotFound { mat: usize, group: usize },

    #[error("Match {index} not found in group {group} on mat {mat}")]
    MatchNotFound {
        mat: usize,
        group: usize,
        index: usize,
    },

    #[error("Match {index} in group {group} on mat {mat} is already completed")]
    AlreadyCompleted {
        mat: usize,
        group: usize,
        index: usize,
    },

    #[error("No pending match on mat {mat}")]
    NoPendingMatch { mat: usize },

    #[error("Judge slot {slot} out of range: match has {number_of_judges} judges")]
    JudgeSlotOutOfRange {
        slot: usize,
        number_of_judges: usize,
    },

    #[error("Invalid number of judges {number_of_judges}: mat seats 1 to {max}")]
    InvalidJudgeCount { number_of_judges: usize, max: usize },

    #[error("Unknown judge code on mat {mat}")]
    UnknownJudgeCode { mat: usize },

    #[error("Invalid score sheet: {0}")]
    InvalidScoreSheet(String),

    #[error("Tournament {id} was modified concurrently: loaded version {expected}, stored version {found}")]
    Conflict {
        id: TournamentId,
        expected: u64,
        found: u64,
    },

    #[error("No unused tournament id found after {attempts} attempts")]
    IdsExhausted { attempts: usize },

    #[error("No archive storage configured")]
    ArchiveUnavailable,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TournamentError {
    /// Whether the error means some addressed entity does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TournamentError::NotFound(_)
                | TournamentError::MatNotFound { .. }
                | TournamentError::GroupNotFound { .. }
                | TournamentError::MatchNotFound { .. }
                | TournamentError::NoPendingMatch { .. }
                | TournamentError::UnknownJudgeCode { .. }
        )
    }

    /// Whether retrying the same request can never succeed
    ///
    /// A completed match stays completed, unlike a version conflict which
    /// goes away after reloading the tournament.
    pub fn is_final(&self) -> bool {
        matches!(self, TournamentError::AlreadyCompleted { .. })
    }

    /// Get a client-safe error message that doesn't leak storage internals
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::Storage(e) => e.client_message(),
            TournamentError::Serialization(_) => "Internal server error".to_string(),
            TournamentError::NotFound(_) => "Tournament not found".to_string(),
            TournamentError::Conflict { .. } => {
                "Tournament was modified concurrently, reload and retry".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;
