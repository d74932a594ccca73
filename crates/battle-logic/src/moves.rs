//! Moves, outcomes and the rules that decide a round

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BattleError;

/// A move a player can throw in a round
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Rock,
    Paper,
    Scissors,
    /// Unlockable move. Beats paper and scissors, loses to rock.
    Special,
}

impl Move {
    /// Every move, in code order.
    pub const ALL: [Move; 4] = [Move::Rock, Move::Paper, Move::Scissors, Move::Special];

    /// The classic triangle, available from the start.
    pub const BASIC: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    /// Stable numeric code (0-3), used as a table index.
    pub fn code(self) -> u8 {
        match self {
            Move::Rock => 0,
            Move::Paper => 1,
            Move::Scissors => 2,
            Move::Special => 3,
        }
    }

    pub(crate) fn index(self) -> usize {
        self.code() as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Move::Rock => "rock",
            Move::Paper => "paper",
            Move::Scissors => "scissors",
            Move::Special => "special",
        }
    }

    /// The move that beats this one under the normal rules.
    pub fn counter(self) -> Move {
        match self {
            Move::Rock => Move::Paper,
            Move::Paper => Move::Scissors,
            Move::Scissors => Move::Rock,
            Move::Special => Move::Rock,
        }
    }

    /// True if `self` beats `other` under the normal rules.
    pub fn beats(self, other: Move) -> bool {
        resolve(self, other, false) == Outcome::Win
    }

    pub fn is_special(self) -> bool {
        self == Move::Special
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Move {
    type Err = BattleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rock" => Ok(Move::Rock),
            "paper" => Ok(Move::Paper),
            "scissors" => Ok(Move::Scissors),
            "special" => Ok(Move::Special),
            _ => Err(BattleError::InvalidMove(s.to_string())),
        }
    }
}

impl TryFrom<u8> for Move {
    type Error = BattleError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Move::ALL
            .get(code as usize)
            .copied()
            .ok_or_else(|| BattleError::InvalidMove(format!("code {}", code)))
    }
}

/// Result of a round, always from the human player's side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Lose,
    Draw,
}

impl Outcome {
    /// Same round seen from the other player.
    pub fn flip(self) -> Outcome {
        match self {
            Outcome::Win => Outcome::Lose,
            Outcome::Lose => Outcome::Win,
            Outcome::Draw => Outcome::Draw,
        }
    }

    pub fn is_win(self) -> bool {
        self == Outcome::Win
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Lose => "lose",
            Outcome::Draw => "draw",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Decide a round between `human` and `opponent`.
///
/// `reversed` flips the rock/paper/scissors triangle only. Equal moves
/// always draw and the special move's matchups never change.
pub fn resolve(human: Move, opponent: Move, reversed: bool) -> Outcome {
    if human == opponent {
        return Outcome::Draw;
    }

    match (human, opponent) {
        (Move::Special, Move::Rock) => Outcome::Lose,
        (Move::Special, _) => Outcome::Win,
        (Move::Rock, Move::Special) => Outcome::Win,
        (_, Move::Special) => Outcome::Lose,
        (h, o) => {
            let base = matches!(
                (h, o),
                (Move::Rock, Move::Scissors)
                    | (Move::Scissors, Move::Paper)
                    | (Move::Paper, Move::Rock)
            );
            if base != reversed {
                Outcome::Win
            } else {
                Outcome::Lose
            }
        }
    }
}

/// Moves a player may throw, given the unlock gate for the special move.
pub fn available_moves(special_unlocked: bool) -> Vec<Move> {
    if special_unlocked {
        Move::ALL.to_vec()
    } else {
        Move::BASIC.to_vec()
    }
}
