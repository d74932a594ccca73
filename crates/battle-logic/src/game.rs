//! Match controllers
//!
//! One round runs as a single step: record the human move, pick the
//! opponent reply, resolve, apply the special round, score. The result then
//! stays "in flight" until the presentation layer calls `finish_round`, and
//! no new move is accepted before that.

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::{BattleError, Result};
use crate::modifier::{self, RoundModifier, SpecialRound};
use crate::moves::{available_moves, resolve, Move, Outcome};
use crate::random::SeededRng;
use crate::strategy::{DifficultyTier, OpponentEngine};

/// How a match ends
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "rounds", rename_all = "snake_case")]
pub enum MatchMode {
    /// Play until the user leaves.
    Endless,
    /// First to a majority of `n` points, or `n` rounds played.
    BestOf(u32),
}

impl MatchMode {
    /// Points needed to take a best-of match outright.
    pub fn winning_score(self) -> Option<u32> {
        match self {
            MatchMode::Endless => None,
            MatchMode::BestOf(n) => Some(n.div_ceil(2)),
        }
    }
}

/// Scoreboard for the active match
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    pub human_score: u32,
    pub opponent_score: u32,
    pub rounds_played: u32,
    pub max_rounds: Option<u32>,
    pub is_over: bool,
}

impl MatchState {
    fn new(mode: MatchMode) -> Self {
        Self {
            max_rounds: match mode {
                MatchMode::Endless => None,
                MatchMode::BestOf(n) => Some(n),
            },
            ..Default::default()
        }
    }

    /// Match-level result from the human's side, once the match is over.
    pub fn result(&self) -> Option<Outcome> {
        if !self.is_over {
            return None;
        }
        Some(match self.human_score.cmp(&self.opponent_score) {
            std::cmp::Ordering::Greater => Outcome::Win,
            std::cmp::Ordering::Less => Outcome::Lose,
            std::cmp::Ordering::Equal => Outcome::Draw,
        })
    }
}

/// Everything the presentation layer needs about a finished round
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    /// 1-based round number within the match.
    pub round: u32,
    pub human_move: Move,
    pub opponent_move: Move,
    pub outcome: Outcome,
    pub special: Option<SpecialRound>,
    pub human_points: u32,
    pub opponent_points: u32,
    pub state: MatchState,
    pub current_streak: u32,
    pub best_streak: u32,
    /// Set on the round that ends a best-of match.
    pub match_result: Option<Outcome>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    AwaitingMove,
    Resolving,
}

/// Owns one match: score, streaks, opponent engine and special rounds.
#[derive(Clone, Debug)]
pub struct MatchController {
    mode: MatchMode,
    tier: DifficultyTier,
    state: MatchState,
    engine: OpponentEngine,
    modifier: RoundModifier,
    rng: SeededRng,
    phase: Phase,
    special_unlocked: bool,
    current_streak: u32,
    best_streak: u32,
}

impl MatchController {
    pub fn new(
        mode: MatchMode,
        tier: DifficultyTier,
        config: &GameConfig,
        mut rng: SeededRng,
    ) -> Result<Self> {
        config.validate()?;
        if mode == MatchMode::BestOf(0) {
            return Err(BattleError::InvalidConfiguration(
                "best-of match needs at least one round".into(),
            ));
        }
        let engine_rng = SeededRng::new(rng.next_u64());
        Ok(Self {
            mode,
            tier,
            state: MatchState::new(mode),
            engine: OpponentEngine::with_windows(
                config.history_window,
                config.outcome_window,
                engine_rng,
            ),
            modifier: RoundModifier::new(
                config.special_round_probability,
                config.score_multiplier,
            )?,
            rng,
            phase: Phase::Idle,
            special_unlocked: false,
            current_streak: 0,
            best_streak: 0,
        })
    }

    /// Endless match with the classic settings.
    pub fn endless(tier: DifficultyTier, rng: SeededRng) -> Result<Self> {
        Self::new(MatchMode::Endless, tier, &GameConfig::classic(), rng)
    }

    /// Best-of match using `config.best_of` rounds.
    pub fn best_of(tier: DifficultyTier, config: &GameConfig, rng: SeededRng) -> Result<Self> {
        Self::new(MatchMode::BestOf(config.best_of), tier, config, rng)
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn tier(&self) -> DifficultyTier {
        self.tier
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn engine(&self) -> &OpponentEngine {
        &self.engine
    }

    pub fn current_streak(&self) -> u32 {
        self.current_streak
    }

    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    pub fn special_round(&self) -> Option<&SpecialRound> {
        self.modifier.active()
    }

    pub fn is_resolving(&self) -> bool {
        self.phase == Phase::Resolving
    }

    pub fn available_moves(&self) -> Vec<Move> {
        available_moves(self.special_unlocked)
    }

    pub fn set_special_unlocked(&mut self, unlocked: bool) {
        self.special_unlocked = unlocked;
    }

    /// Switch opponent tier. Clears the opponent's history.
    pub fn set_tier(&mut self, tier: DifficultyTier) {
        if tier != self.tier {
            log::info!("[match] tier changed {} -> {}", self.tier, tier);
        }
        self.tier = tier;
        self.engine.reset();
    }

    /// Start the next round and roll for a special round.
    ///
    /// Calling it again before a move is submitted keeps the rolled round.
    pub fn begin_round(&mut self) -> Result<Option<SpecialRound>> {
        match self.phase {
            Phase::Resolving => Err(BattleError::RoundInProgress),
            _ if self.state.is_over => Err(BattleError::MatchOver),
            Phase::AwaitingMove => Ok(self.modifier.active().cloned()),
            Phase::Idle => {
                let available = self.available_moves();
                let special = self.modifier.maybe_activate(&available, &mut self.rng);
                self.phase = Phase::AwaitingMove;
                Ok(special)
            }
        }
    }

    /// Play one round with the human's move.
    pub fn submit_move(&mut self, human: Move) -> Result<RoundReport> {
        if self.phase == Phase::Resolving {
            return Err(BattleError::RoundInProgress);
        }
        if self.state.is_over {
            return Err(BattleError::MatchOver);
        }
        let available = self.available_moves();
        if !available.contains(&human) {
            return Err(BattleError::MoveLocked(human));
        }
        if self.phase == Phase::Idle {
            self.begin_round()?;
        }

        self.engine.record_human_move(human);
        let opponent = self.engine.select_move(&available, self.tier)?;

        let special = self.modifier.active().cloned();
        let raw = resolve(human, opponent, false);
        let outcome = modifier::apply(raw, human, opponent, special.as_ref());
        self.engine.record_round_outcome(outcome.flip());

        let (human_points, opponent_points) = match outcome {
            Outcome::Win => (modifier::score_multiplier(special.as_ref()), 0),
            Outcome::Lose => (0, 1),
            Outcome::Draw => (0, 0),
        };
        self.state.human_score += human_points;
        self.state.opponent_score += opponent_points;
        self.state.rounds_played += 1;

        if outcome.is_win() {
            self.current_streak += 1;
            self.best_streak = self.best_streak.max(self.current_streak);
        } else {
            self.current_streak = 0;
        }

        self.check_match_end();
        self.phase = Phase::Resolving;

        log::debug!(
            "[match] round {}: {} vs {} -> {}",
            self.state.rounds_played,
            human,
            opponent,
            outcome
        );

        Ok(RoundReport {
            round: self.state.rounds_played,
            human_move: human,
            opponent_move: opponent,
            outcome,
            special,
            human_points,
            opponent_points,
            state: self.state,
            current_streak: self.current_streak,
            best_streak: self.best_streak,
            match_result: self.state.result(),
        })
    }

    /// Acknowledge the displayed result and drop the round's special state.
    ///
    /// Does nothing unless a result is waiting, so a special round rolled by
    /// `begin_round` survives until a move is played.
    pub fn finish_round(&mut self) {
        if self.phase != Phase::Resolving {
            return;
        }
        self.modifier.end_round();
        self.phase = Phase::Idle;
    }

    /// Throw away the match and start over with the same mode and tier.
    pub fn restart(&mut self) {
        log::info!("[match] restarting {:?} match", self.mode);
        self.state = MatchState::new(self.mode);
        self.modifier.end_round();
        self.engine.reset();
        self.phase = Phase::Idle;
        self.current_streak = 0;
        self.best_streak = 0;
    }

    fn check_match_end(&mut self) {
        let MatchMode::BestOf(n) = self.mode else {
            return;
        };
        let target = n.div_ceil(2);
        if self.state.human_score >= target
            || self.state.opponent_score >= target
            || self.state.rounds_played >= n
        {
            self.state.is_over = true;
            log::info!(
                "[match] best of {} over after {} rounds: {}-{}",
                n,
                self.state.rounds_played,
                self.state.human_score,
                self.state.opponent_score
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(mode: MatchMode, tier: DifficultyTier, config: &GameConfig) -> MatchController {
        MatchController::new(mode, tier, config, SeededRng::new(42)).unwrap()
    }

    fn play(c: &mut MatchController, m: Move) -> RoundReport {
        let report = c.submit_move(m).unwrap();
        c.finish_round();
        report
    }

    #[test]
    fn test_best_of_five_three_straight_wins() {
        // impossible always counters, so only reversed rounds hand the human a win
        let config = GameConfig {
            special_round_probability: 1.0,
            ..GameConfig::classic()
        };
        let mut c = controller(MatchMode::BestOf(5), DifficultyTier::Impossible, &config);
        let mut last = None;
        let mut rounds = 0;
        while !c.state().is_over {
            let special = c.begin_round().unwrap();
            if special != Some(SpecialRound::RuleReversal) {
                c.restart();
                rounds = 0;
                continue;
            }
            last = Some(play(&mut c, Move::Rock));
            rounds += 1;
        }
        let last = last.unwrap();
        assert_eq!(rounds, 3);
        assert_eq!(last.state.rounds_played, 3);
        assert_eq!(last.state.human_score, 3);
        assert_eq!(last.match_result, Some(Outcome::Win));
        assert_eq!(c.state().result(), Some(Outcome::Win));
        assert!(matches!(c.submit_move(Move::Rock), Err(BattleError::MatchOver)));
    }

    #[test]
    fn test_impossible_opponent_takes_best_of() {
        let mut c = controller(
            MatchMode::BestOf(5),
            DifficultyTier::Impossible,
            &GameConfig::no_specials(),
        );
        for i in 1..=3 {
            let r = play(&mut c, Move::Paper);
            assert_eq!(r.opponent_move, Move::Scissors);
            assert_eq!(r.outcome, Outcome::Lose);
            assert_eq!(r.match_result.is_some(), i == 3);
        }
        assert_eq!(c.state().result(), Some(Outcome::Lose));
        assert_eq!(c.state().rounds_played, 3);
    }

    #[test]
    fn test_best_of_ends_after_n_rounds() {
        let mut c = controller(MatchMode::BestOf(5), DifficultyTier::Easy, &GameConfig::no_specials());
        let mut rounds = 0;
        while !c.state().is_over {
            play(&mut c, Move::Rock);
            rounds += 1;
        }
        assert!(rounds <= 5);
        let s = c.state();
        assert!(s.human_score >= 3 || s.opponent_score >= 3 || s.rounds_played == 5);
        let expected = match s.human_score.cmp(&s.opponent_score) {
            std::cmp::Ordering::Greater => Outcome::Win,
            std::cmp::Ordering::Less => Outcome::Lose,
            std::cmp::Ordering::Equal => Outcome::Draw,
        };
        assert_eq!(s.result(), Some(expected));
    }

    #[test]
    fn test_multiplier_awards_double_points() {
        let config = GameConfig {
            special_round_probability: 1.0,
            ..GameConfig::classic()
        };
        let mut c = controller(MatchMode::Endless, DifficultyTier::Easy, &config);
        let mut checked = false;
        for _ in 0..200 {
            let before = c.state().human_score;
            let report = play(&mut c, Move::Rock);
            if report.outcome == Outcome::Win {
                let expected = match report.special {
                    Some(SpecialRound::ScoreMultiplier { factor }) => {
                        checked = true;
                        assert_eq!(factor, 2);
                        2
                    }
                    _ => 1,
                };
                assert_eq!(report.human_points, expected);
                assert_eq!(report.state.human_score, before + expected);
            } else {
                assert_eq!(report.human_points, 0);
            }
        }
        assert!(checked, "never saw a multiplied win");
    }

    #[test]
    fn test_overlapping_rounds_rejected() {
        let mut c = controller(MatchMode::Endless, DifficultyTier::Easy, &GameConfig::classic());
        c.submit_move(Move::Rock).unwrap();
        assert!(c.is_resolving());
        assert_eq!(c.submit_move(Move::Paper), Err(BattleError::RoundInProgress));
        assert_eq!(c.begin_round(), Err(BattleError::RoundInProgress));
        c.finish_round();
        assert!(c.submit_move(Move::Paper).is_ok());
    }

    #[test]
    fn test_special_round_cleared_before_next_move() {
        let config = GameConfig {
            special_round_probability: 1.0,
            ..GameConfig::classic()
        };
        let mut c = controller(MatchMode::Endless, DifficultyTier::Easy, &config);
        let report = c.submit_move(Move::Rock).unwrap();
        assert!(report.special.is_some());
        assert_eq!(c.special_round(), report.special.as_ref());
        c.finish_round();
        assert_eq!(c.special_round(), None);
    }

    #[test]
    fn test_begin_round_is_idempotent() {
        let config = GameConfig {
            special_round_probability: 1.0,
            ..GameConfig::classic()
        };
        let mut c = controller(MatchMode::Endless, DifficultyTier::Easy, &config);
        let first = c.begin_round().unwrap();
        let second = c.begin_round().unwrap();
        assert_eq!(first, second);
        let report = c.submit_move(Move::Paper).unwrap();
        assert_eq!(report.special, first);
    }

    #[test]
    fn test_special_move_gate() {
        let mut c = controller(MatchMode::Endless, DifficultyTier::Easy, &GameConfig::classic());
        assert_eq!(
            c.submit_move(Move::Special),
            Err(BattleError::MoveLocked(Move::Special))
        );
        c.set_special_unlocked(true);
        assert_eq!(c.available_moves(), Move::ALL.to_vec());
        assert!(c.submit_move(Move::Special).is_ok());
    }

    #[test]
    fn test_endless_streaks() {
        let mut c = controller(MatchMode::Endless, DifficultyTier::Easy, &GameConfig::no_specials());
        let mut streak = 0;
        let mut best = 0;
        for _ in 0..100 {
            let r = play(&mut c, Move::Scissors);
            if r.outcome == Outcome::Win {
                streak += 1;
                best = best.max(streak);
            } else {
                streak = 0;
            }
            assert_eq!(r.current_streak, streak);
            assert_eq!(r.best_streak, best);
            assert!(!r.state.is_over);
            assert_eq!(r.match_result, None);
        }
        assert_eq!(c.state().rounds_played, 100);
        assert_eq!(c.state().max_rounds, None);
    }

    #[test]
    fn test_restart_tears_everything_down() {
        let config = GameConfig {
            special_round_probability: 1.0,
            ..GameConfig::classic()
        };
        let mut c = controller(MatchMode::BestOf(3), DifficultyTier::Hard, &config);
        c.submit_move(Move::Rock).unwrap();
        c.restart();
        assert_eq!(*c.state(), MatchState::new(MatchMode::BestOf(3)));
        assert_eq!(c.special_round(), None);
        assert_eq!(c.engine().history().total(), 0);
        assert!(!c.is_resolving());
        assert_eq!(c.current_streak(), 0);
        assert!(c.submit_move(Move::Paper).is_ok());
    }

    #[test]
    fn test_tier_change_resets_history() {
        let mut c = controller(MatchMode::Endless, DifficultyTier::Hard, &GameConfig::classic());
        play(&mut c, Move::Rock);
        play(&mut c, Move::Rock);
        assert_eq!(c.engine().history().total(), 2);
        c.set_tier(DifficultyTier::Easy);
        assert_eq!(c.tier(), DifficultyTier::Easy);
        assert_eq!(c.engine().history().total(), 0);
    }

    #[test]
    fn test_invalid_setup() {
        assert!(MatchController::new(
            MatchMode::BestOf(0),
            DifficultyTier::Easy,
            &GameConfig::classic(),
            SeededRng::new(1)
        )
        .is_err());
        let bad = GameConfig {
            score_multiplier: 0,
            ..GameConfig::classic()
        };
        assert!(MatchController::endless(DifficultyTier::Easy, SeededRng::new(1)).is_ok());
        assert!(MatchController::best_of(DifficultyTier::Easy, &bad, SeededRng::new(1)).is_err());
    }

    #[test]
    fn test_winning_score() {
        assert_eq!(MatchMode::BestOf(5).winning_score(), Some(3));
        assert_eq!(MatchMode::BestOf(4).winning_score(), Some(2));
        assert_eq!(MatchMode::Endless.winning_score(), None);
    }

    #[test]
    fn test_report_serializes() {
        let mut c = controller(MatchMode::BestOf(5), DifficultyTier::Medium, &GameConfig::classic());
        let report = c.submit_move(Move::Rock).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        let back: RoundReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_finish_round_before_move_keeps_special() {
        let config = GameConfig {
            special_round_probability: 1.0,
            ..GameConfig::classic()
        };
        let mut c = controller(MatchMode::Endless, DifficultyTier::Easy, &config);
        let rolled = c.begin_round().unwrap();
        assert!(rolled.is_some());
        c.finish_round();
        assert_eq!(c.special_round(), rolled.as_ref());
        assert_eq!(c.begin_round().unwrap(), rolled);
        let report = c.submit_move(Move::Rock).unwrap();
        assert_eq!(report.special, rolled);
        c.finish_round();
        assert_eq!(c.special_round(), None);
    }

    #[test]
    fn test_multiplied_wins_reach_target_early() {
        // best-of counts score units: two doubled wins take a best of 5
        let config = GameConfig {
            special_round_probability: 1.0,
            ..GameConfig::classic()
        };
        let mut c = MatchController::new(
            MatchMode::BestOf(5),
            DifficultyTier::Easy,
            &config,
            SeededRng::new(99),
        )
        .unwrap();
        let mut found = false;
        for _ in 0..5000 {
            c.restart();
            let first = play(&mut c, Move::Rock);
            let second = play(&mut c, Move::Rock);
            let doubled = |r: &RoundReport| {
                r.outcome == Outcome::Win
                    && matches!(r.special, Some(SpecialRound::ScoreMultiplier { .. }))
            };
            if doubled(&first) && doubled(&second) {
                assert_eq!(second.human_points, 2);
                assert_eq!(second.state.human_score, 4);
                assert_eq!(second.state.rounds_played, 2);
                assert!(second.state.is_over);
                assert_eq!(second.match_result, Some(Outcome::Win));
                assert_eq!(c.submit_move(Move::Rock), Err(BattleError::MatchOver));
                found = true;
                break;
            }
            // one doubled win alone is not enough
            if doubled(&first) {
                assert!(!first.state.is_over);
            }
        }
        assert!(found, "never saw two doubled wins in a row");
    }
}
