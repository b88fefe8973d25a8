//! Settlement spot scoring.
//!
//! Five metrics, each scaled by its entry in `eval_weights`:
//! raw pips, strength-weighted pips, port value, a flat bonus for rich
//! diverse spots, and a parity bonus for producing both halves of a
//! complement pair.

use serde::Serialize;

use crate::board::keys::NodeKey;
use crate::board::state::BoardState;
use crate::board::tile::{COMPLEMENT_PAIRS, RESOURCE_COUNT};
use crate::board::topology::topology;
use crate::config::EvalConfig;
use crate::error::Result;

use super::strength::ResourceStrengths;

/// Pips a spot needs before it can earn the prime-variate bonus.
pub const PRIME_MIN_PIPS: f64 = 10.0;

/// Distinct resources a spot needs for the prime-variate bonus.
pub const PRIME_MIN_RESOURCES: usize = 3;

/// Per-resource pips from the three tiles of `node`. Water, desert and the
/// robber's tile contribute nothing.
pub fn spot_production(board: &BoardState, node: &NodeKey) -> [f64; RESOURCE_COUNT] {
    let mut production = [0.0; RESOURCE_COUNT];
    for id in node.tiles() {
        if board.robber() == Some(id) {
            continue;
        }
        if let Some(tile) = board.tile(id) {
            if let Some(r) = tile.produces() {
                production[r.index()] += tile.pips() as f64;
            }
        }
    }
    production
}

/// Metric breakdown for one spot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SettlementScore {
    pub raw_production: f64,
    pub scarcity_weighted: f64,
    pub port: f64,
    pub prime_variate: f64,
    pub parity: f64,
    pub total: f64,
}

impl SettlementScore {
    /// The five unweighted metrics in `eval_weights` order.
    pub fn metrics(&self) -> [f64; 5] {
        [
            self.raw_production,
            self.scarcity_weighted,
            self.port,
            self.prime_variate,
            self.parity,
        ]
    }
}

/// Scores `node` on `board`.
///
/// Fails with `InvalidSpot` if the key is not a settlement spot. Occupancy
/// is not checked here.
pub fn score_settlement(
    board: &BoardState,
    node: &NodeKey,
    strengths: &ResourceStrengths,
    config: &EvalConfig,
) -> Result<SettlementScore> {
    topology().validate_node(board.tiles(), node)?;
    let p = spot_production(board, node);

    let raw_production: f64 = p.iter().sum();
    let scarcity_weighted: f64 = p.iter().zip(&strengths.values).map(|(a, s)| a * s).sum();

    let port = board
        .port_at(node)
        .map_or(0.0, |kind| strengths.ports[kind.index()] * config.port_bonus);

    let distinct = p.iter().filter(|&&x| x > 0.0).count();
    let prime_variate = if raw_production >= PRIME_MIN_PIPS && distinct >= PRIME_MIN_RESOURCES {
        config.prime_variate_bonus
    } else {
        0.0
    };

    let parity: f64 = COMPLEMENT_PAIRS
        .iter()
        .map(|&(a, b)| (p[a.index()], p[b.index()]))
        .filter(|&(a, b)| a > 0.0 && b > 0.0)
        .map(|(a, b)| config.parity_preference * a.min(b))
        .sum();

    let mut score = SettlementScore {
        raw_production,
        scarcity_weighted,
        port,
        prime_variate,
        parity,
        total: 0.0,
    };
    score.total = score
        .metrics()
        .iter()
        .zip(&config.eval_weights)
        .map(|(m, w)| m * w)
        .sum();
    Ok(score)
}
