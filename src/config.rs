//! Tunable parameters.
//!
//! Every knob lives in an immutable [`Config`] value that callers build once
//! and pass by reference. Each section deserializes from JSON with per-field
//! defaults, so a config file only needs the values it changes.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::state::{PlayerId, MAX_PLAYERS};
use crate::board::tile::RESOURCE_COUNT;
use crate::error::{PlacementError, Result};

/// Settlement scoring weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvalConfig {
    /// Intrinsic value per resource: wood, brick, wool, grain, ore.
    pub base_resource_strength: [f64; RESOURCE_COUNT],
    /// Exponent applied to raw strengths; below 1 compresses.
    pub dampening_factor: f64,
    /// Multiplier on port strength for a port spot.
    pub port_bonus: f64,
    /// Flat bonus for 10+ pips over 3+ resources.
    pub prime_variate_bonus: f64,
    /// Multiplier on the smaller side of each produced complement pair.
    pub parity_preference: f64,
    /// Weights of raw, scarcity-weighted, port, prime-variate and parity.
    pub eval_weights: [f64; 5],
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            base_resource_strength: [1.0, 1.0, 0.9, 1.1, 1.1],
            dampening_factor: 0.5,
            port_bonus: 2.0,
            prime_variate_bonus: 2.0,
            parity_preference: 0.8,
            eval_weights: [1.0, 1.5, 1.0, 1.0, 1.0],
        }
    }
}

/// Prediction and simulation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Softmax margin: `k` times the last kept score is subtracted first.
    pub k: f64,
    /// Number of top-level options to simulate.
    pub x: usize,
    /// Live branches kept after each seat-turn.
    pub max_window: usize,
    /// Roads a player looks ahead when aiming their first road.
    pub road_reach: u8,
    /// Best open spots nobody aims a road at (saved for a settlement).
    pub reserved_spots: usize,
    /// Seat acting at each setup placement.
    pub turn_order: Vec<PlayerId>,
    /// Expand sibling branches on the rayon pool.
    pub parallel: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            k: 2.5,
            x: 6,
            max_window: 20,
            road_reach: 3,
            reserved_spots: 9,
            turn_order: vec![0, 1, 2, 3, 3, 2, 1, 0],
            parallel: true,
        }
    }
}

/// Weights of the finished-setup evaluator and its robber model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaceoutConfig {
    /// Strength dampening used by the robber model.
    pub robber_dampening: f64,
    /// Added to every robber strength so raw output still counts.
    pub raw_power_preference: f64,
    /// Softmax spread over a player's robber targets.
    pub robber_spread: f64,
    /// Strength dampening used when valuing a player's production.
    pub dampening: f64,
    /// Production multiplier for complements sharing a dice number.
    pub prod_pair_bonus: f64,
    pub total_multiplier: f64,
    pub total_valued_multiplier: f64,
    /// Most wood/brick-leaning player.
    pub wb_bonus: f64,
    /// Most ore/grain/wool-leaning player.
    pub ows_bonus: f64,
    /// Most polarised strategy.
    pub extreme_bonus: f64,
    pub best_road_bonus: f64,
    pub best_city_bonus: f64,
    pub portability_bonus: f64,
    /// Port distance window, in roads, for portability and the grain check.
    pub port_reach_min: u8,
    pub port_reach_max: u8,
    /// Pips of a port's resource that make a 2:1 port worth reaching.
    pub port_min_pips: f64,
    /// Grain pips at or below which the no-grain penalty applies.
    pub no_wheat_threshold: f64,
    pub no_wheat: f64,
    pub target_penalty: f64,
}

impl Default for PlaceoutConfig {
    fn default() -> Self {
        PlaceoutConfig {
            robber_dampening: 0.6,
            raw_power_preference: 0.3,
            robber_spread: 0.2,
            dampening: 0.7,
            prod_pair_bonus: 1.3,
            total_multiplier: 0.5,
            total_valued_multiplier: 0.8,
            wb_bonus: 2.0,
            ows_bonus: 2.0,
            extreme_bonus: 1.5,
            best_road_bonus: 1.5,
            best_city_bonus: 1.5,
            portability_bonus: 2.0,
            port_reach_min: 2,
            port_reach_max: 3,
            port_min_pips: 5.0,
            no_wheat_threshold: 2.0,
            no_wheat: 1.0,
            target_penalty: 1.5,
        }
    }
}

/// All parameters, threaded by reference through every call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub eval: EvalConfig,
    pub search: SearchConfig,
    pub placeout: PlaceoutConfig,
}

fn finite(name: &str, values: &[f64]) -> Result<()> {
    match values.iter().find(|v| !v.is_finite()) {
        Some(v) => Err(PlacementError::Configuration(format!("{} is not finite ({})", name, v))),
        None => Ok(()),
    }
}

impl EvalConfig {
    pub fn validate(&self) -> Result<()> {
        finite("base_resource_strength", &self.base_resource_strength)?;
        finite("eval_weights", &self.eval_weights)?;
        finite(
            "eval scalars",
            &[
                self.dampening_factor,
                self.port_bonus,
                self.prime_variate_bonus,
                self.parity_preference,
            ],
        )?;
        if self.base_resource_strength.iter().any(|&s| s < 0.0) {
            return Err(PlacementError::Configuration(
                "base_resource_strength must be non-negative".into(),
            ));
        }
        Ok(())
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        finite("k", &[self.k])?;
        if self.x == 0 {
            return Err(PlacementError::Configuration("x must be at least 1".into()));
        }
        if self.max_window == 0 {
            return Err(PlacementError::Configuration(
                "max_window must be at least 1".into(),
            ));
        }
        if self.road_reach == 0 {
            return Err(PlacementError::Configuration(
                "road_reach must be at least 1".into(),
            ));
        }
        if self.turn_order.is_empty() {
            return Err(PlacementError::Configuration("turn_order is empty".into()));
        }
        if let Some(seat) = self.turn_order.iter().find(|&&s| s as usize >= MAX_PLAYERS) {
            return Err(PlacementError::Configuration(format!(
                "turn_order names seat {}",
                seat
            )));
        }
        Ok(())
    }
}

impl PlaceoutConfig {
    pub fn validate(&self) -> Result<()> {
        finite(
            "placeout weights",
            &[
                self.robber_dampening,
                self.raw_power_preference,
                self.robber_spread,
                self.dampening,
                self.prod_pair_bonus,
                self.total_multiplier,
                self.total_valued_multiplier,
                self.wb_bonus,
                self.ows_bonus,
                self.extreme_bonus,
                self.best_road_bonus,
                self.best_city_bonus,
                self.portability_bonus,
                self.port_min_pips,
                self.no_wheat_threshold,
                self.no_wheat,
                self.target_penalty,
            ],
        )?;
        if self.port_reach_min > self.port_reach_max {
            return Err(PlacementError::Configuration(format!(
                "port reach window {}..={} is empty",
                self.port_reach_min, self.port_reach_max
            )));
        }
        Ok(())
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.eval.validate()?;
        self.search.validate()?;
        self.placeout.validate()
    }

    /// Parses and validates a JSON config.
    pub fn from_json(json: &str) -> Result<Config> {
        let config: Config = serde_json::from_str(json)
            .map_err(|e| PlacementError::Configuration(format!("failed to parse config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a JSON config file.
    pub fn load(path: &Path) -> Result<Config> {
        let data = fs::read_to_string(path).map_err(|e| {
            PlacementError::Configuration(format!("failed to read {}: {}", path.display(), e))
        })?;
        Config::from_json(&data)
    }
}
