//! Setup simulation.
//!
//! Every top-level option is played forward through the remaining setup
//! seat-turns. The live branches of one depth are held in a flat list;
//! each seat-turn expands every branch by the predictor's distribution and
//! then prunes the list to `max_window`, renormalizing what survives.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::board::state::{BoardState, Placement, PlayerId};
use crate::config::Config;
use crate::error::Result;
use crate::eval::strength::ResourceStrengths;

use super::options::{rank_open_spots, OptionSource};
use super::predict::{pick_road, predict};

/// One hypothetical line of play.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Branch {
    #[serde(skip)]
    pub board: BoardState,
    pub probability: f64,
    /// Seat-turns expanded since the option was placed.
    pub depth: usize,
    /// Every placement made since the option, the option first.
    pub trail: Vec<Placement>,
}

impl Branch {
    pub fn root(board: BoardState, placement: Placement) -> Self {
        Branch {
            board,
            probability: 1.0,
            depth: 0,
            trail: vec![placement],
        }
    }
}

/// A top-level option and the placeouts it leads to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionResult {
    pub placement: Placement,
    /// Settlement score of the option's spot.
    pub score: f64,
    pub placeouts: Vec<Branch>,
}

/// Seat that makes the next placement on `board`, if setup is not over.
pub fn next_seat(board: &BoardState, config: &Config) -> Option<PlayerId> {
    config.search.turn_order.get(board.settlement_count()).copied()
}

/// The `x` best (settlement, road) pairs for `player`, with their spot
/// scores. Unlike opponent moves these are not weighted. Spots with no free
/// edge left are skipped.
pub fn top_options(
    board: &BoardState,
    player: PlayerId,
    config: &Config,
    source: &dyn OptionSource,
) -> Result<Vec<(Placement, f64)>> {
    let ranked = rank_open_spots(board, &config.eval, source)?;
    if ranked.is_empty() {
        return Ok(Vec::new());
    }
    let strengths = ResourceStrengths::compute(board, &config.eval)?;
    ranked
        .iter()
        .filter(|spot| board.has_free_road(&spot.node))
        .take(config.search.x)
        .map(|spot| {
            let road = pick_road(board, &spot.node, &ranked, &strengths, config)?;
            let placement = Placement {
                settlement: spot.node,
                road,
                player,
            };
            Ok((placement, spot.total()))
        })
        .collect()
}

fn expand_branch(branch: &Branch, player: PlayerId, config: &Config) -> Result<Vec<Branch>> {
    let predictions = predict(&branch.board, config.search.k, config)?;
    if predictions.is_empty() {
        // nothing left to place: the branch survives unchanged
        let mut carried = branch.clone();
        carried.depth += 1;
        return Ok(vec![carried]);
    }
    predictions
        .iter()
        .map(|p| {
            let placement = Placement {
                settlement: p.settlement,
                road: p.road,
                player,
            };
            let mut trail = branch.trail.clone();
            trail.push(placement);
            Ok(Branch {
                board: branch.board.with_placement(&placement)?,
                probability: branch.probability * p.probability,
                depth: branch.depth + 1,
                trail,
            })
        })
        .collect()
}

/// Expands every branch by one placement for `player`. Children keep the
/// order of their parents whether or not the work runs in parallel.
pub fn expand(branches: &[Branch], player: PlayerId, config: &Config) -> Result<Vec<Branch>> {
    let children: Vec<Vec<Branch>> = if config.search.parallel {
        branches
            .par_iter()
            .map(|b| expand_branch(b, player, config))
            .collect::<Result<_>>()?
    } else {
        branches
            .iter()
            .map(|b| expand_branch(b, player, config))
            .collect::<Result<_>>()?
    };
    Ok(children.into_iter().flatten().collect())
}

/// Keeps the `max_window` likeliest branches and rescales them to sum to 1.
/// Equal probabilities are ordered by trail. A list already within the
/// window is returned untouched.
pub fn prune(mut branches: Vec<Branch>, max_window: usize) -> Vec<Branch> {
    if branches.len() <= max_window {
        return branches;
    }
    branches.sort_by(|a, b| {
        b.probability
            .total_cmp(&a.probability)
            .then_with(|| a.trail.cmp(&b.trail))
    });
    branches.truncate(max_window);

    let total: f64 = branches.iter().map(|b| b.probability).sum();
    if total > 0.0 {
        for b in &mut branches {
            b.probability /= total;
        }
    } else {
        let uniform = 1.0 / branches.len() as f64;
        for b in &mut branches {
            b.probability = uniform;
        }
    }
    branches
}

/// Plays `placement` forward through the rest of the turn order.
pub fn simulate_option(
    board: &BoardState,
    placement: Placement,
    config: &Config,
) -> Result<Vec<Branch>> {
    let root = board.with_placement(&placement)?;
    let mut branches = vec![Branch::root(root, placement)];

    let first = board.settlement_count() + 1;
    for &seat in config.search.turn_order.iter().skip(first) {
        let expanded = expand(&branches, seat, config)?;
        let live = expanded.len();
        branches = prune(expanded, config.search.max_window);
        debug!(
            option = %placement.settlement,
            seat,
            expanded = live,
            kept = branches.len(),
            "seat-turn"
        );
    }
    Ok(branches)
}

/// Simulates the `x` best options for the seat to move.
///
/// Returns one result per option, best option first. Each result holds at
/// most `max_window` placeouts whose probabilities sum to 1. The list is
/// empty when the turn order is used up or no open spot is left.
pub fn simulate(
    board: &BoardState,
    config: &Config,
    source: &dyn OptionSource,
) -> Result<Vec<OptionResult>> {
    config.validate()?;
    let Some(me) = next_seat(board, config) else {
        warn!(
            settlements = board.settlement_count(),
            "turn order exhausted, nothing to simulate"
        );
        return Ok(Vec::new());
    };

    let options = top_options(board, me, config, source)?;
    let run = |(placement, score): (Placement, f64)| -> Result<OptionResult> {
        let placeouts = simulate_option(board, placement, config)?;
        info!(
            option = %placement.settlement,
            road = %placement.road,
            placeouts = placeouts.len(),
            "simulated option"
        );
        Ok(OptionResult {
            placement,
            score,
            placeouts,
        })
    };

    if config.search.parallel {
        options.into_par_iter().map(run).collect()
    } else {
        options.into_iter().map(run).collect()
    }
}
