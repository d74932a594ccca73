//! Error types for the battle core

use thiserror::Error;

use crate::moves::Move;

/// Errors surfaced by the rules, the opponent engine and the match controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleError {
    /// A move label or code outside rock/paper/scissors/special.
    #[error("invalid move: {0}")]
    InvalidMove(String),

    /// The special move was submitted while it is still locked.
    #[error("move {0} is not available")]
    MoveLocked(Move),

    /// Settings that leave the core unable to produce a move or a score.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The previous round's result has not been acknowledged yet.
    #[error("previous round is still being resolved")]
    RoundInProgress,

    /// Best-of-N match already has a winner.
    #[error("match is over")]
    MatchOver,

    /// A persisted record that does not parse.
    #[error("corrupt player record: {0}")]
    CorruptRecord(String),
}

pub type Result<T> = std::result::Result<T, BattleError>;
