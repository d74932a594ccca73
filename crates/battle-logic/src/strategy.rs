//! Opponent move selection
//!
//! The opponent watches the human's throws through a [`MoveHistory`] and
//! picks a reply according to a [`DifficultyTier`]. Each tier maps to a
//! plain selection function; the engine only owns the state they read.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BattleError, Result};
use crate::history::{MoveHistory, HISTORY_WINDOW};
use crate::moves::{Move, Outcome};
use crate::random::SeededRng;

/// Default number of round outcomes the engine remembers.
pub const OUTCOME_WINDOW: usize = 5;

/// Percentage gates for the hard heuristic stages.
const PREDICT_CHANCE: u8 = 30;
const FREQUENT_CHANCE: u8 = 40;
const PATTERN_CHANCE: u8 = 30;
/// Minimum history before the transition and pattern stages apply.
const MIN_PATTERN_MOVES: usize = 3;
/// Medium plays randomly this often, otherwise like hard.
const MEDIUM_RANDOM_CHANCE: u8 = 50;

/// Opponent skill setting
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    /// Uniform random throws.
    Easy,
    /// Coin flip between random and the hard heuristics.
    #[default]
    Medium,
    /// Transition prediction, frequency counter and pattern detection.
    Hard,
    /// Counters the move the human just made.
    Impossible,
}

impl DifficultyTier {
    pub const ALL: [DifficultyTier; 4] = [
        DifficultyTier::Easy,
        DifficultyTier::Medium,
        DifficultyTier::Hard,
        DifficultyTier::Impossible,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DifficultyTier::Easy => "easy",
            DifficultyTier::Medium => "medium",
            DifficultyTier::Hard => "hard",
            DifficultyTier::Impossible => "impossible",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            DifficultyTier::Easy => "Throws completely at random.",
            DifficultyTier::Medium => "Half random, half reading your habits.",
            DifficultyTier::Hard => "Tracks your favourite moves and patterns and counters them.",
            DifficultyTier::Impossible => "Knows what you threw. Good luck.",
        }
    }

    fn selector(self) -> Selector {
        match self {
            DifficultyTier::Easy => select_easy,
            DifficultyTier::Medium => select_medium,
            DifficultyTier::Hard => select_hard,
            DifficultyTier::Impossible => select_impossible,
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DifficultyTier {
    type Err = BattleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(DifficultyTier::Easy),
            "medium" => Ok(DifficultyTier::Medium),
            "hard" => Ok(DifficultyTier::Hard),
            "impossible" => Ok(DifficultyTier::Impossible),
            _ => Err(BattleError::InvalidConfiguration(format!(
                "unknown difficulty: {}",
                s
            ))),
        }
    }
}

/// Tier selection function.
///
/// Arguments are the history, the human's move for the current round if
/// known, the non-empty set of legal replies and the rng.
type Selector = fn(&MoveHistory, Option<Move>, &[Move], &mut SeededRng) -> Move;

fn select_random(available: &[Move], rng: &mut SeededRng) -> Move {
    available[rng.next_range(available.len() as u32) as usize]
}

fn select_easy(_: &MoveHistory, _: Option<Move>, available: &[Move], rng: &mut SeededRng) -> Move {
    select_random(available, rng)
}

fn select_medium(
    history: &MoveHistory,
    current: Option<Move>,
    available: &[Move],
    rng: &mut SeededRng,
) -> Move {
    if rng.next_percent() < MEDIUM_RANDOM_CHANCE {
        select_random(available, rng)
    } else {
        select_hard(history, current, available, rng)
    }
}

fn select_hard(
    history: &MoveHistory,
    _: Option<Move>,
    available: &[Move],
    rng: &mut SeededRng,
) -> Move {
    let playable = |m: Option<Move>| m.map(Move::counter).filter(|c| available.contains(c));

    if history.total() as usize >= MIN_PATTERN_MOVES && rng.next_percent() < PREDICT_CHANCE {
        if let Some(m) = playable(history.predicted_next()) {
            log::debug!("[engine] countering predicted transition with {}", m);
            return m;
        }
    }

    if rng.next_percent() < FREQUENT_CHANCE {
        if let Some(m) = playable(history.most_frequent()) {
            log::debug!("[engine] countering most frequent move with {}", m);
            return m;
        }
    }

    if history.recent_len() >= MIN_PATTERN_MOVES && rng.next_percent() < PATTERN_CHANCE {
        let pattern = history.repeated().or_else(|| history.alternating());
        if let Some(m) = playable(pattern) {
            log::debug!("[engine] countering pattern with {}", m);
            return m;
        }
    }

    select_random(available, rng)
}

fn select_impossible(
    history: &MoveHistory,
    current: Option<Move>,
    available: &[Move],
    rng: &mut SeededRng,
) -> Move {
    match current.map(Move::counter).filter(|c| available.contains(c)) {
        Some(m) => m,
        None => select_hard(history, current, available, rng),
    }
}

/// Opponent state for one session.
///
/// Must be `reset` whenever the tier changes or a new match starts so no
/// history carries over between unrelated matches.
#[derive(Clone, Debug)]
pub struct OpponentEngine {
    history: MoveHistory,
    /// Human move for the round being played, consumed by `select_move`.
    current: Option<Move>,
    outcomes: VecDeque<Outcome>,
    outcome_window: usize,
    rng: SeededRng,
}

impl OpponentEngine {
    pub fn new(rng: SeededRng) -> Self {
        Self::with_windows(HISTORY_WINDOW, OUTCOME_WINDOW, rng)
    }

    pub fn with_windows(history_window: usize, outcome_window: usize, rng: SeededRng) -> Self {
        Self {
            history: MoveHistory::with_window(history_window),
            current: None,
            outcomes: VecDeque::with_capacity(outcome_window + 1),
            outcome_window,
            rng,
        }
    }

    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    pub fn record_human_move(&mut self, m: Move) {
        self.history.record(m);
        self.current = Some(m);
    }

    /// Pick the opponent's reply from `available` for the given tier.
    ///
    /// Works on an empty history: the heuristic stages simply do not fire.
    pub fn select_move(&mut self, available: &[Move], tier: DifficultyTier) -> Result<Move> {
        if available.is_empty() {
            return Err(BattleError::InvalidConfiguration(
                "no moves available to the opponent".into(),
            ));
        }
        let current = self.current.take();
        let m = (tier.selector())(&self.history, current, available, &mut self.rng);
        log::debug!("[engine] {} opponent selected {}", tier, m);
        Ok(m)
    }

    /// Remember a round result, seen from the opponent's side.
    pub fn record_round_outcome(&mut self, outcome: Outcome) {
        self.outcomes.push_back(outcome);
        while self.outcomes.len() > self.outcome_window {
            self.outcomes.pop_front();
        }
    }

    /// Latest outcomes, oldest first.
    pub fn recent_outcomes(&self) -> impl Iterator<Item = Outcome> + '_ {
        self.outcomes.iter().copied()
    }

    /// Opponent wins minus losses over the outcome window.
    pub fn opponent_form(&self) -> i32 {
        self.outcomes
            .iter()
            .map(|o| match o {
                Outcome::Win => 1,
                Outcome::Lose => -1,
                Outcome::Draw => 0,
            })
            .sum()
    }

    pub fn reset(&mut self) {
        self.history.reset();
        self.current = None;
        self.outcomes.clear();
    }
}
