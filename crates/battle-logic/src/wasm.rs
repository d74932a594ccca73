//! WASM bindings for the browser front end

#![cfg(feature = "wasm")]

use wasm_bindgen::prelude::*;

use crate::{
    resolve, BattleError, DifficultyTier, GameConfig, MatchController, MatchMode, Move,
    PlayerStats, SeededRng,
};

fn js_err(e: BattleError) -> JsError {
    JsError::new(&e.to_string())
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

fn browser_seed() -> u64 {
    (js_sys::Math::random() * u64::MAX as f64) as u64
}

fn parse_mode(mode: &str, config: &GameConfig) -> Result<MatchMode, JsError> {
    match mode {
        "endless" => Ok(MatchMode::Endless),
        "best_of" => Ok(MatchMode::BestOf(config.best_of)),
        _ => Err(JsError::new(&format!("Unknown mode: {}", mode))),
    }
}

/// One browser session: the active match plus the player's record.
#[wasm_bindgen]
pub struct BattleSession {
    controller: MatchController,
    stats: PlayerStats,
    config: GameConfig,
    timer_rng: SeededRng,
}

#[wasm_bindgen]
impl BattleSession {
    /// `mode` is "endless" or "best_of". `config_json` may be empty for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(mode: &str, tier: &str, config_json: &str) -> Result<BattleSession, JsError> {
        let config = if config_json.trim().is_empty() {
            GameConfig::classic()
        } else {
            GameConfig::from_json(config_json).map_err(js_err)?
        };
        let tier: DifficultyTier = tier.parse().map_err(js_err)?;
        let mode = parse_mode(mode, &config)?;
        let controller =
            MatchController::new(mode, tier, &config, SeededRng::new(browser_seed())).map_err(js_err)?;
        Ok(BattleSession {
            controller,
            stats: PlayerStats {
                tier,
                ..Default::default()
            },
            config,
            timer_rng: SeededRng::new(browser_seed()),
        })
    }

    /// Roll the next round's special state. Returns it or `null`.
    pub fn begin_round(&mut self) -> Result<JsValue, JsError> {
        let special = self.controller.begin_round().map_err(js_err)?;
        to_js(&special)
    }

    /// Play a round. Returns `{ report, unlocked }`.
    pub fn play(&mut self, human: &str) -> Result<JsValue, JsError> {
        let human: Move = human.parse().map_err(js_err)?;
        self.play_move(human)
    }

    /// Time ran out: throw a random legal move through the normal path.
    pub fn play_timeout(&mut self) -> Result<JsValue, JsError> {
        let available = self.controller.available_moves();
        let human = self
            .timer_rng
            .pick(&available)
            .ok_or_else(|| JsError::new("no moves available"))?;
        self.play_move(human)
    }

    /// Result has been shown; clear the round.
    pub fn finish_round(&mut self) {
        self.controller.finish_round();
    }

    pub fn set_tier(&mut self, tier: &str) -> Result<(), JsError> {
        let tier: DifficultyTier = tier.parse().map_err(js_err)?;
        self.controller.set_tier(tier);
        self.stats.tier = tier;
        Ok(())
    }

    pub fn restart(&mut self) {
        self.controller.restart();
    }

    /// Zero cumulative counters and start a fresh match.
    pub fn reset_scores(&mut self) {
        self.stats.reset_scores();
        self.controller.restart();
        self.sync_unlock();
    }

    pub fn state(&self) -> Result<JsValue, JsError> {
        to_js(self.controller.state())
    }

    pub fn available_moves(&self) -> Result<JsValue, JsError> {
        to_js(&self.controller.available_moves())
    }

    pub fn stats_json(&self) -> Result<String, JsError> {
        self.stats.to_json().map_err(js_err)
    }

    /// Restore a record saved with `stats_json`. Applies its tier and unlocks.
    pub fn load_stats(&mut self, json: &str) -> Result<(), JsError> {
        self.stats = PlayerStats::from_json(json).map_err(js_err)?;
        self.controller.set_tier(self.stats.tier);
        self.sync_unlock();
        Ok(())
    }
}

impl BattleSession {
    fn play_move(&mut self, human: Move) -> Result<JsValue, JsError> {
        let report = self.controller.submit_move(human).map_err(js_err)?;
        let unlocked = self.stats.record_round(&report);
        self.sync_unlock();
        to_js(&PlayResult { report, unlocked })
    }

    fn sync_unlock(&mut self) {
        let unlocked = self.stats.special_unlocked(self.config.special_unlock_wins);
        self.controller.set_special_unlocked(unlocked);
    }
}

#[derive(serde::Serialize)]
struct PlayResult {
    report: crate::RoundReport,
    unlocked: Vec<crate::Achievement>,
}

/// Decide a round outside a match. Returns "win", "lose" or "draw".
#[wasm_bindgen]
pub fn resolve_moves(human: &str, opponent: &str, reversed: bool) -> Result<String, JsError> {
    let human: Move = human.parse().map_err(js_err)?;
    let opponent: Move = opponent.parse().map_err(js_err)?;
    Ok(resolve(human, opponent, reversed).to_string())
}

/// The move that beats `m`.
#[wasm_bindgen]
pub fn counter_move(m: &str) -> Result<String, JsError> {
    let m: Move = m.parse().map_err(js_err)?;
    Ok(m.counter().to_string())
}

#[derive(serde::Serialize)]
struct TierInfo {
    id: &'static str,
    description: &'static str,
}

/// Difficulty tiers for the settings menu
#[wasm_bindgen]
pub fn get_tier_types() -> Result<JsValue, JsError> {
    let tiers: Vec<TierInfo> = DifficultyTier::ALL
        .iter()
        .map(|t| TierInfo {
            id: t.label(),
            description: t.describe(),
        })
        .collect();
    to_js(&tiers)
}
