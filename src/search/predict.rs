//! One-move placement prediction.
//!
//! The three best open spots become a softmax distribution over
//! (settlement, road) pairs. Each road heads for the best spot reachable in
//! a few roads that is not reserved as a future settlement.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::board::keys::{EdgeKey, NodeKey};
use crate::board::state::BoardState;
use crate::board::topology::topology;
use crate::config::Config;
use crate::error::{PlacementError, Result};
use crate::eval::settlement::score_settlement;
use crate::eval::softmax_weights;
use crate::eval::strength::ResourceStrengths;

use super::options::{rank_open_spots, NoExtension, ScoredSpot};

/// Spots a single placement is spread over.
pub const PREDICTED_SPOTS: usize = 3;

/// A weighted guess at the next placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub settlement: NodeKey,
    pub road: EdgeKey,
    pub probability: f64,
    /// Settlement score the probability was derived from.
    pub score: f64,
}

/// Softmax of `s_i - k * s_last` over best-first `scores`.
///
/// A margin that is not finite, from a NaN or huge `k` or score, fails with
/// `Configuration` instead of flattening into a uniform split.
pub fn margin_probabilities(scores: &[f64], k: f64) -> Result<Vec<f64>> {
    let Some(&last) = scores.last() else {
        return Ok(Vec::new());
    };
    let adjusted: Vec<f64> = scores.iter().map(|s| s - k * last).collect();
    if let Some(bad) = adjusted.iter().find(|a| !a.is_finite()) {
        return Err(PlacementError::Configuration(format!(
            "margin score {} is not finite (k = {})",
            bad, k
        )));
    }
    Ok(softmax_weights(&adjusted, 1.0))
}

/// Chooses the road that goes with a settlement on `settlement`.
///
/// `ranked` is the board's ranked open-spot list. The first spot in it that
/// is outside the top `reserved_spots` and reachable over
/// `1..=road_reach` free roads is the target; the road is the first step of
/// the shortest route there. Without a target the free incident road whose
/// far end scores best is taken, smallest key on ties. Fails with
/// `OccupiedSpot` when every incident road is taken.
pub fn pick_road(
    board: &BoardState,
    settlement: &NodeKey,
    ranked: &[ScoredSpot],
    strengths: &ResourceStrengths,
    config: &Config,
) -> Result<EdgeKey> {
    let reserved: BTreeSet<NodeKey> = ranked
        .iter()
        .take(config.search.reserved_spots)
        .map(|s| s.node)
        .collect();
    let reach = board.road_reach(settlement, config.search.road_reach);

    let target = ranked
        .iter()
        .filter(|s| !reserved.contains(&s.node))
        .find_map(|s| reach.get(&s.node).filter(|r| r.distance >= 1));
    if let Some(edge) = target.and_then(|r| r.first_edge) {
        return Ok(edge);
    }

    let mut best: Option<(f64, EdgeKey)> = None;
    // edges() is in key order, so ties keep the smaller edge
    for edge in settlement.edges() {
        if !board.is_free_road(&edge) {
            continue;
        }
        let Some(other) = topology().across(settlement, &edge) else {
            continue;
        };
        let score = score_settlement(board, &other, strengths, &config.eval)
            .map_or(f64::NEG_INFINITY, |s| s.total);
        if best.map_or(true, |(b, _)| score > b) {
            best = Some((score, edge));
        }
    }
    best.map(|(_, edge)| edge)
        .ok_or_else(|| PlacementError::OccupiedSpot(format!("no free road at {}", settlement)))
}

/// Predicts the next placement on `board`.
///
/// Returns up to three entries, best first, with probabilities summing to
/// one. Open spots whose every edge already carries a road are passed over.
/// An empty list means no placeable spot is left. A non-finite `k` or eval
/// setting fails with `Configuration`.
pub fn predict(board: &BoardState, k: f64, config: &Config) -> Result<Vec<Prediction>> {
    if !k.is_finite() {
        return Err(PlacementError::Configuration(format!("k is not finite ({})", k)));
    }
    let ranked = rank_open_spots(board, &config.eval, &NoExtension)?;
    let top: Vec<&ScoredSpot> = ranked
        .iter()
        .filter(|s| board.has_free_road(&s.node))
        .take(PREDICTED_SPOTS)
        .collect();
    if top.is_empty() {
        return Ok(Vec::new());
    }
    let strengths = ResourceStrengths::compute(board, &config.eval)?;

    let scores: Vec<f64> = top.iter().map(|s| s.total()).collect();
    let probabilities = margin_probabilities(&scores, k)?;

    top.iter()
        .zip(probabilities)
        .map(|(spot, probability)| {
            let road = pick_road(board, &spot.node, &ranked, &strengths, config)?;
            Ok(Prediction {
                settlement: spot.node,
                road,
                probability,
                score: spot.total(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::board::generate::beginner_board;
    use crate::board::state::{Building, Placement};
    use crate::board::tile::{Resource, Tile, TILE_COUNT};

    fn node(s: &str) -> NodeKey {
        s.parse().unwrap()
    }

    fn edge(s: &str) -> EdgeKey {
        s.parse().unwrap()
    }

    /// Wood 6, brick 2 and grain 3 around `5_10_11`, water elsewhere.
    fn three_tile_board() -> BoardState {
        let mut tiles = vec![Tile::ocean(); TILE_COUNT];
        tiles[5] = Tile::land(Resource::Wood, 6);
        tiles[10] = Tile::land(Resource::Brick, 2);
        tiles[11] = Tile::land(Resource::Grain, 3);
        BoardState::new(tiles, BTreeMap::new(), vec![0, 1, 2, 3]).unwrap()
    }

    fn road_for(board: &BoardState, settlement: &str, config: &Config) -> Result<EdgeKey> {
        let ranked = rank_open_spots(board, &config.eval, &NoExtension).unwrap();
        let strengths = ResourceStrengths::compute(board, &config.eval).unwrap();
        pick_road(board, &node(settlement), &ranked, &strengths, config)
    }

    #[test]
    fn margin_softmax_matches_worked_example() {
        let p = margin_probabilities(&[10.0, 8.0, 5.0], 0.3).unwrap();
        let exps = [8.5_f64.exp(), 6.5_f64.exp(), 3.5_f64.exp()];
        let sum: f64 = exps.iter().sum();
        for (got, e) in p.iter().zip(exps) {
            assert!((got - e / sum).abs() < 1e-12);
        }
        assert!(p[0] > p[1] && p[1] > p[2]);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(margin_probabilities(&[], 0.3).unwrap().is_empty());
    }

    #[test]
    fn prediction_is_a_distribution_over_legal_moves() {
        let board = beginner_board();
        let config = Config::default();
        let predictions = predict(&board, config.search.k, &config).unwrap();
        assert_eq!(predictions.len(), PREDICTED_SPOTS);
        let total: f64 = predictions.iter().map(|p| p.probability).sum();
        assert!((total - 1.0).abs() < 1e-6);
        for w in predictions.windows(2) {
            assert!(w[0].score >= w[1].score);
            assert!(w[0].probability >= w[1].probability);
        }
        for p in &predictions {
            board
                .with_placement(&Placement {
                    settlement: p.settlement,
                    road: p.road,
                    player: 0,
                })
                .unwrap();
        }
    }

    #[test]
    fn road_heads_for_best_unreserved_spot() {
        let board = three_tile_board();
        let mut config = Config::default();

        config.search.reserved_spots = 0;
        // 5_6_11 is the best spot after the settlement itself
        assert_eq!(road_for(&board, "5_10_11", &config).unwrap(), edge("5_11"));

        // with the top two reserved, 4_5_10 is next
        config.search.reserved_spots = 2;
        assert_eq!(road_for(&board, "5_10_11", &config).unwrap(), edge("5_10"));
    }

    #[test]
    fn road_falls_back_to_best_neighbour() {
        let board = three_tile_board();
        let mut config = Config::default();
        config.search.reserved_spots = 100;
        assert_eq!(road_for(&board, "5_10_11", &config).unwrap(), edge("5_11"));

        let blocked = board.with_road(edge("5_11"), 1).unwrap();
        assert_eq!(road_for(&blocked, "5_10_11", &config).unwrap(), edge("5_10"));

        let boxed_in = blocked
            .with_road(edge("5_10"), 1)
            .unwrap()
            .with_road(edge("10_11"), 2)
            .unwrap();
        assert!(matches!(
            road_for(&boxed_in, "5_10_11", &config),
            Err(PlacementError::OccupiedSpot(_))
        ));
    }

    #[test]
    fn saturated_board_shrinks_the_prediction() {
        let config = Config::default();
        let mut board = beginner_board();
        let mut owner = 0;
        while board.open_nodes().len() > 2 {
            let best = rank_open_spots(&board, &config.eval, &NoExtension).unwrap()[0].node;
            board = board.with_building(best, Building::settlement(owner % 4)).unwrap();
            owner += 1;
        }
        let open = board.open_nodes().len();
        let predictions = predict(&board, config.search.k, &config).unwrap();
        assert_eq!(predictions.len(), open);
        if open > 0 {
            let total: f64 = predictions.iter().map(|p| p.probability).sum();
            assert!((total - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn runaway_margins_are_a_configuration_error() {
        for k in [f64::NAN, f64::INFINITY] {
            assert!(matches!(
                margin_probabilities(&[10.0, 8.0, 5.0], k),
                Err(PlacementError::Configuration(_))
            ));
        }
        // 1e308 * 5 overflows the margin
        assert!(matches!(
            margin_probabilities(&[10.0, 8.0, 5.0], 1e308),
            Err(PlacementError::Configuration(_))
        ));
        assert!(matches!(
            margin_probabilities(&[f64::NAN, 1.0], 0.3),
            Err(PlacementError::Configuration(_))
        ));
    }

    #[test]
    fn bad_numbers_are_rejected_not_flattened() {
        let board = beginner_board();
        let config = Config::default();
        for k in [f64::NAN, f64::NEG_INFINITY, 1e308] {
            assert!(matches!(
                predict(&board, k, &config),
                Err(PlacementError::Configuration(_))
            ));
        }

        let mut nan_weights = Config::default();
        nan_weights.eval.eval_weights[0] = f64::NAN;
        assert!(matches!(
            predict(&board, nan_weights.search.k, &nan_weights),
            Err(PlacementError::Configuration(_))
        ));
    }

    #[test]
    fn spot_with_every_road_taken_is_passed_over() {
        let config = Config::default();
        let mut board = beginner_board();
        let best = predict(&board, config.search.k, &config).unwrap()[0].settlement;
        for e in best.edges() {
            if board.is_free_road(&e) {
                board = board.with_road(e, 1).unwrap();
            }
        }
        assert!(!board.has_free_road(&best));
        assert!(board.is_open(&best));

        let predictions = predict(&board, config.search.k, &config).unwrap();
        assert_eq!(predictions.len(), PREDICTED_SPOTS);
        assert!(predictions.iter().all(|p| p.settlement != best));
        let total: f64 = predictions.iter().map(|p| p.probability).sum();
        assert!((total - 1.0).abs() < 1e-6);
    }
}
