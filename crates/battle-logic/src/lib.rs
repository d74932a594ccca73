//! Match Logic for Rock Paper Battle
//!
//! Rules, opponent AI, special rounds and match flow for the browser game.
//! This crate is compiled to:
//! - Native (for tests and tooling)
//! - WASM (for the browser front end, `wasm` feature)

mod config;
mod error;
mod game;
mod history;
mod modifier;
mod moves;
mod random;
mod stats;
mod strategy;

#[cfg(feature = "wasm")]
mod wasm;

pub use config::{GameConfig, BEST_OF, SPECIAL_UNLOCK_WINS};
pub use error::{BattleError, Result};
pub use game::{MatchController, MatchMode, MatchState, RoundReport};
pub use history::{MoveHistory, HISTORY_WINDOW};
pub use modifier::{
    apply, score_multiplier, RoundModifier, SpecialRound, SpecialRoundKind, SCORE_MULTIPLIER,
    SPECIAL_ROUND_PROBABILITY,
};
pub use moves::{available_moves, resolve, Move, Outcome};
pub use random::SeededRng;
pub use stats::{Achievement, MemoryStore, PlayerStats, StatsStore};
pub use strategy::{DifficultyTier, OpponentEngine, OUTCOME_WINDOW};
