//! Cumulative player statistics and achievements
//!
//! The core only defines the record and how a round updates it. Where the
//! record lives (localStorage in the browser) is up to a [`StatsStore`].

use serde::{Deserialize, Serialize};

use crate::error::{BattleError, Result};
use crate::game::RoundReport;
use crate::modifier::SpecialRound;
use crate::moves::Outcome;
use crate::strategy::DifficultyTier;

/// Rounds played before `Veteran` unlocks.
const VETERAN_ROUNDS: u32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    FirstWin,
    /// Five round wins in a row.
    HotStreak,
    /// Ten round wins in a row.
    Unstoppable,
    Veteran,
    /// First best-of match won.
    Champion,
    /// Win during a score multiplier round.
    BonusHunter,
    /// Win during a rule reversal round.
    Contrarian,
}

impl Achievement {
    pub fn title(self) -> &'static str {
        match self {
            Achievement::FirstWin => "First Blood",
            Achievement::HotStreak => "Hot Streak",
            Achievement::Unstoppable => "Unstoppable",
            Achievement::Veteran => "Veteran",
            Achievement::Champion => "Champion",
            Achievement::BonusHunter => "Bonus Hunter",
            Achievement::Contrarian => "Contrarian",
        }
    }
}

/// Persisted record for one player
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    /// Longest round-win streak ever reached.
    pub best_streak: u32,
    pub tier: DifficultyTier,
    pub matches_won: u32,
    pub matches_lost: u32,
    pub matches_drawn: u32,
    pub achievements: Vec<Achievement>,
}

impl PlayerStats {
    pub fn rounds_played(&self) -> u32 {
        self.wins + self.losses + self.draws
    }

    pub fn has(&self, a: Achievement) -> bool {
        self.achievements.contains(&a)
    }

    /// Unlock gate for the special move.
    pub fn special_unlocked(&self, threshold: u32) -> bool {
        self.wins >= threshold
    }

    /// Fold a finished round into the record. Returns achievements unlocked by it.
    pub fn record_round(&mut self, report: &RoundReport) -> Vec<Achievement> {
        match report.outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Lose => self.losses += 1,
            Outcome::Draw => self.draws += 1,
        }
        self.best_streak = self.best_streak.max(report.current_streak);

        match report.match_result {
            Some(Outcome::Win) => self.matches_won += 1,
            Some(Outcome::Lose) => self.matches_lost += 1,
            Some(Outcome::Draw) => self.matches_drawn += 1,
            None => {}
        }

        let won = report.outcome.is_win();
        let candidates = [
            (Achievement::FirstWin, won),
            (Achievement::HotStreak, report.current_streak >= 5),
            (Achievement::Unstoppable, report.current_streak >= 10),
            (Achievement::Veteran, self.rounds_played() >= VETERAN_ROUNDS),
            (Achievement::Champion, report.match_result == Some(Outcome::Win)),
            (
                Achievement::BonusHunter,
                won && matches!(report.special, Some(SpecialRound::ScoreMultiplier { .. })),
            ),
            (
                Achievement::Contrarian,
                won && report.special == Some(SpecialRound::RuleReversal),
            ),
        ];

        let mut unlocked = Vec::new();
        for (achievement, earned) in candidates {
            if earned && !self.has(achievement) {
                log::info!("[stats] achievement unlocked: {}", achievement.title());
                self.achievements.push(achievement);
                unlocked.push(achievement);
            }
        }
        unlocked
    }

    /// Zero the counters but keep tier and achievements.
    pub fn reset_scores(&mut self) {
        *self = Self {
            tier: self.tier,
            achievements: std::mem::take(&mut self.achievements),
            ..Self::default()
        };
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| BattleError::CorruptRecord(e.to_string()))
    }

    /// Parse a stored record. Only a JSON object is accepted: serde would
    /// otherwise read a struct positionally from an array.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| BattleError::CorruptRecord(e.to_string()))?;
        if !value.is_object() {
            return Err(BattleError::CorruptRecord(
                "player record must be a JSON object".into(),
            ));
        }
        serde_json::from_value(value).map_err(|e| BattleError::CorruptRecord(e.to_string()))
    }
}

/// Storage backend for [`PlayerStats`]
pub trait StatsStore {
    fn load(&self) -> Result<Option<PlayerStats>>;
    fn save(&mut self, stats: &PlayerStats) -> Result<()>;
}

/// In-process store holding the serialized record.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    blob: Option<String>,
}

impl StatsStore for MemoryStore {
    fn load(&self) -> Result<Option<PlayerStats>> {
        self.blob.as_deref().map(PlayerStats::from_json).transpose()
    }

    fn save(&mut self, stats: &PlayerStats) -> Result<()> {
        self.blob = Some(stats.to_json()?);
        Ok(())
    }
}
