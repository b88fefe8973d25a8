//! Robber pressure.
//!
//! Predicts where each player would most like to put the robber once play
//! starts: tiles that feed many buildings and make strong resources, never a
//! tile the player itself builds on.

use serde::Serialize;

use crate::board::state::{BoardState, PlayerId};
use crate::board::tile::{RESOURCE_COUNT, TILE_COUNT};
use crate::config::{EvalConfig, PlaceoutConfig};
use crate::error::Result;

use super::softmax_weights;
use super::strength::relative_strengths;

/// How many robber targets are kept per player.
pub const ROBBER_CHOICES: usize = 3;

/// One candidate robber tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RobberTarget {
    pub tile: u8,
    pub probability: f64,
}

/// Expected pips per producing tile: pips times the buildings touching it.
/// Cities count once, like settlements.
fn tile_pressure(board: &BoardState) -> Vec<(u8, usize, f64)> {
    let mut out = Vec::new();
    for id in 0..TILE_COUNT as u8 {
        let Some(tile) = board.tile(id) else { continue };
        let Some(r) = tile.produces() else { continue };
        let touching = board.nodes().keys().filter(|n| n.contains(id)).count();
        out.push((id, r.index(), tile.pips() as f64 * touching as f64));
    }
    out
}

/// Top robber targets for every seated player, in seat-list order.
///
/// Each list holds three entries whose probabilities sum to 1. When fewer
/// than three tiles qualify the last one is repeated; a player with no
/// eligible tile gets an empty list.
pub fn predict_robber(
    board: &BoardState,
    eval: &EvalConfig,
    config: &PlaceoutConfig,
) -> Result<Vec<(PlayerId, Vec<RobberTarget>)>> {
    let pressure = tile_pressure(board);

    let mut production = [0.0; RESOURCE_COUNT];
    for &(_, r, expected) in &pressure {
        production[r] += expected;
    }
    let strengths = relative_strengths(
        &production,
        &eval.base_resource_strength,
        config.robber_dampening,
    )?;

    let scores: Vec<(u8, f64)> = pressure
        .iter()
        .map(|&(id, r, expected)| (id, expected * (strengths[r] + config.raw_power_preference)))
        .collect();

    let mut out = Vec::with_capacity(board.players().len());
    for &player in board.players() {
        let mut eligible: Vec<(u8, f64)> = scores
            .iter()
            .copied()
            .filter(|&(id, _)| !board.buildings_of(player).any(|(n, _)| n.contains(id)))
            .collect();
        // stable: equal scores keep tile order
        eligible.sort_by(|a, b| b.1.total_cmp(&a.1));
        eligible.truncate(ROBBER_CHOICES);

        let Some(&last) = eligible.last() else {
            out.push((player, Vec::new()));
            continue;
        };
        eligible.resize(ROBBER_CHOICES, last);

        let raw: Vec<f64> = eligible.iter().map(|&(_, s)| s).collect();
        let probs = softmax_weights(&raw, config.robber_spread);
        let targets = eligible
            .iter()
            .zip(probs)
            .map(|(&(tile, _), probability)| RobberTarget { tile, probability })
            .collect();
        out.push((player, targets));
    }
    Ok(out)
}
