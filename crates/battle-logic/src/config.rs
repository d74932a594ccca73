//! Tunable game settings

use serde::{Deserialize, Serialize};

use crate::error::{BattleError, Result};
use crate::history::HISTORY_WINDOW;
use crate::modifier::{SCORE_MULTIPLIER, SPECIAL_ROUND_PROBABILITY};
use crate::strategy::OUTCOME_WINDOW;

/// Rounds in a best-of match unless configured otherwise.
pub const BEST_OF: u32 = 5;

/// Cumulative wins that unlock the special move.
pub const SPECIAL_UNLOCK_WINS: u32 = 10;

/// Game settings. Missing JSON fields fall back to the classic preset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Human moves kept for pattern detection.
    pub history_window: usize,
    /// Round outcomes the opponent remembers.
    pub outcome_window: usize,
    /// Chance (0-1) that a round is special.
    pub special_round_probability: f64,
    /// Points for a win during a score multiplier round.
    pub score_multiplier: u32,
    /// Round count for best-of matches.
    pub best_of: u32,
    pub special_unlock_wins: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::classic()
    }
}

impl GameConfig {
    pub fn classic() -> Self {
        Self {
            history_window: HISTORY_WINDOW,
            outcome_window: OUTCOME_WINDOW,
            special_round_probability: SPECIAL_ROUND_PROBABILITY,
            score_multiplier: SCORE_MULTIPLIER,
            best_of: BEST_OF,
            special_unlock_wins: SPECIAL_UNLOCK_WINS,
        }
    }

    /// Classic rules without special rounds.
    pub fn no_specials() -> Self {
        Self {
            special_round_probability: 0.0,
            ..Self::classic()
        }
    }

    /// Parse a (possibly partial) JSON document and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: GameConfig = serde_json::from_str(json)
            .map_err(|e| BattleError::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.history_window < 3 {
            return Err(BattleError::InvalidConfiguration(
                "history_window must be at least 3".into(),
            ));
        }
        if self.outcome_window == 0 {
            return Err(BattleError::InvalidConfiguration(
                "outcome_window must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.special_round_probability) {
            return Err(BattleError::InvalidConfiguration(format!(
                "special_round_probability {} outside [0, 1]",
                self.special_round_probability
            )));
        }
        if self.score_multiplier == 0 {
            return Err(BattleError::InvalidConfiguration(
                "score_multiplier must be at least 1".into(),
            ));
        }
        if self.best_of == 0 {
            return Err(BattleError::InvalidConfiguration(
                "best_of must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
