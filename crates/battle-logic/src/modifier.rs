//! Special rounds
//!
//! A special round lives for exactly one round. It is rolled when the
//! round begins and torn down once the result has been scored and shown.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BattleError, Result};
use crate::moves::{resolve, Move, Outcome};
use crate::random::SeededRng;

/// Default chance that a round is special.
pub const SPECIAL_ROUND_PROBABILITY: f64 = 0.2;

/// Default points for a win during a score multiplier round.
pub const SCORE_MULTIPLIER: u32 = 2;

/// Which effect a special round carries
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialRoundKind {
    ScoreMultiplier,
    RuleReversal,
    CosmeticShuffle,
}

impl SpecialRoundKind {
    pub const ALL: [SpecialRoundKind; 3] = [
        SpecialRoundKind::ScoreMultiplier,
        SpecialRoundKind::RuleReversal,
        SpecialRoundKind::CosmeticShuffle,
    ];
}

impl fmt::Display for SpecialRoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SpecialRoundKind::ScoreMultiplier => "score_multiplier",
            SpecialRoundKind::RuleReversal => "rule_reversal",
            SpecialRoundKind::CosmeticShuffle => "cosmetic_shuffle",
        };
        f.write_str(s)
    }
}

/// An active special round
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpecialRound {
    /// Wins this round are worth `factor` points.
    ScoreMultiplier { factor: u32 },
    /// Rock/paper/scissors beat relations are inverted.
    RuleReversal,
    /// Display order of the move buttons. Presentation only.
    CosmeticShuffle { labels: Vec<Move> },
}

impl SpecialRound {
    pub fn kind(&self) -> SpecialRoundKind {
        match self {
            SpecialRound::ScoreMultiplier { .. } => SpecialRoundKind::ScoreMultiplier,
            SpecialRound::RuleReversal => SpecialRoundKind::RuleReversal,
            SpecialRound::CosmeticShuffle { .. } => SpecialRoundKind::CosmeticShuffle,
        }
    }

    pub fn banner(&self) -> &'static str {
        match self {
            SpecialRound::ScoreMultiplier { .. } => "Double points!",
            SpecialRound::RuleReversal => "Rules reversed!",
            SpecialRound::CosmeticShuffle { .. } => "Buttons shuffled!",
        }
    }
}

/// Adjust a raw outcome for the active special round.
///
/// Rule reversal re-resolves the moves instead of swapping win and lose,
/// so draws and special-move matchups are unaffected.
pub fn apply(outcome: Outcome, human: Move, opponent: Move, state: Option<&SpecialRound>) -> Outcome {
    match state {
        Some(SpecialRound::RuleReversal) => resolve(human, opponent, true),
        _ => outcome,
    }
}

/// Multiplier for a human win under `state`. 1 outside multiplier rounds.
pub fn score_multiplier(state: Option<&SpecialRound>) -> u32 {
    match state {
        Some(SpecialRound::ScoreMultiplier { factor }) => *factor,
        _ => 1,
    }
}

/// Rolls and holds the special round for the current round.
#[derive(Clone, Debug)]
pub struct RoundModifier {
    probability: f64,
    factor: u32,
    active: Option<SpecialRound>,
}

impl Default for RoundModifier {
    fn default() -> Self {
        Self {
            probability: SPECIAL_ROUND_PROBABILITY,
            factor: SCORE_MULTIPLIER,
            active: None,
        }
    }
}

impl RoundModifier {
    pub fn new(probability: f64, factor: u32) -> Result<Self> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(BattleError::InvalidConfiguration(format!(
                "special round probability {} outside [0, 1]",
                probability
            )));
        }
        if factor == 0 {
            return Err(BattleError::InvalidConfiguration(
                "score multiplier must be at least 1".into(),
            ));
        }
        Ok(Self {
            probability,
            factor,
            active: None,
        })
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// One Bernoulli trial for this round. Any round still active is ended first.
    pub fn maybe_activate(&mut self, available: &[Move], rng: &mut SeededRng) -> Option<SpecialRound> {
        if let Some(prev) = self.active.take() {
            log::debug!("[modifier] replacing unfinished {} round", prev.kind());
        }

        if !rng.chance(self.probability) {
            return None;
        }

        let special = match SpecialRoundKind::ALL[rng.next_range(3) as usize] {
            SpecialRoundKind::ScoreMultiplier => SpecialRound::ScoreMultiplier {
                factor: self.factor,
            },
            SpecialRoundKind::RuleReversal => SpecialRound::RuleReversal,
            SpecialRoundKind::CosmeticShuffle => {
                let mut labels = available.to_vec();
                rng.shuffle(&mut labels);
                SpecialRound::CosmeticShuffle { labels }
            }
        };
        log::debug!("[modifier] activated {}", special.kind());
        self.active = Some(special.clone());
        Some(special)
    }

    pub fn active(&self) -> Option<&SpecialRound> {
        self.active.as_ref()
    }

    /// Tear down the round's special state.
    pub fn end_round(&mut self) -> Option<SpecialRound> {
        self.active.take()
    }
}
