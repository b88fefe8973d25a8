//! Settlement option generation.
//!
//! Scores every open spot, merges in candidates from an injectable
//! [`OptionSource`], and ranks the pool best-first.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::board::keys::NodeKey;
use crate::board::state::BoardState;
use crate::board::topology::topology;
use crate::config::EvalConfig;
use crate::error::{PlacementError, Result};
use crate::eval::settlement::{score_settlement, SettlementScore};
use crate::eval::strength::ResourceStrengths;

/// Extra candidate spots beyond the open-spot scan.
///
/// Implemented for any `Fn(&BoardState) -> Vec<NodeKey>`, so a closure can
/// be passed directly. Sources run on worker threads and must be `Sync`.
pub trait OptionSource: Sync {
    fn extend(&self, board: &BoardState) -> Vec<NodeKey>;
}

/// The default source: contributes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoExtension;

impl OptionSource for NoExtension {
    fn extend(&self, _board: &BoardState) -> Vec<NodeKey> {
        Vec::new()
    }
}

impl<F> OptionSource for F
where
    F: Fn(&BoardState) -> Vec<NodeKey> + Sync,
{
    fn extend(&self, board: &BoardState) -> Vec<NodeKey> {
        self(board)
    }
}

/// A candidate spot and its score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredSpot {
    pub node: NodeKey,
    pub score: SettlementScore,
}

impl ScoredSpot {
    #[inline]
    pub fn total(&self) -> f64 {
        self.score.total
    }
}

/// Best score first; equal scores by smallest key.
pub fn rank_order(a: &ScoredSpot, b: &ScoredSpot) -> Ordering {
    b.total()
        .total_cmp(&a.total())
        .then_with(|| a.node.cmp(&b.node))
}

/// Scores and ranks every open spot plus whatever `source` adds.
///
/// Extension spots must be real, open spots: a key that is not a vertex fails
/// with `InvalidSpot`, an occupied or blocked one with `OccupiedSpot`. An
/// empty result is not an error. A non-finite eval setting fails with
/// `Configuration` before anything is scored.
pub fn rank_open_spots(
    board: &BoardState,
    config: &EvalConfig,
    source: &dyn OptionSource,
) -> Result<Vec<ScoredSpot>> {
    config.validate()?;
    let mut pool: BTreeSet<NodeKey> = board.open_nodes().into_iter().collect();
    for node in source.extend(board) {
        topology().validate_node(board.tiles(), &node)?;
        if !board.is_open(&node) {
            return Err(PlacementError::OccupiedSpot(node.to_string()));
        }
        pool.insert(node);
    }
    if pool.is_empty() {
        return Ok(Vec::new());
    }

    let strengths = ResourceStrengths::compute(board, config)?;
    let mut ranked = pool
        .into_iter()
        .map(|node| {
            score_settlement(board, &node, &strengths, config).map(|score| ScoredSpot { node, score })
        })
        .collect::<Result<Vec<_>>>()?;
    ranked.sort_by(rank_order);
    Ok(ranked)
}

/// The best `x` candidate spots.
///
/// Fails with `OccupiedSpot` when the board has no open spot at all.
pub fn top_open_spots(
    board: &BoardState,
    x: usize,
    config: &EvalConfig,
    source: &dyn OptionSource,
) -> Result<Vec<ScoredSpot>> {
    let mut ranked = rank_open_spots(board, config, source)?;
    if ranked.is_empty() {
        return Err(PlacementError::OccupiedSpot("no open settlement spot".into()));
    }
    ranked.truncate(x);
    Ok(ranked)
}
