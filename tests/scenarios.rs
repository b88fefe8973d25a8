//! End-to-end scenarios for scoring, prediction, pruning and simulation.

use std::collections::BTreeMap;

use settlers::board::checker::SettlementChecker;
use settlers::board::generate::beginner_board;
use settlers::board::keys::{EdgeKey, NodeKey};
use settlers::board::state::{BoardState, Building, Placement, PlayerId};
use settlers::board::tile::{Resource, Tile, TILE_COUNT};
use settlers::eval::{score_settlement, ResourceStrengths};
use settlers::search::{
    margin_probabilities, prune, rank_open_spots, simulate, Branch, NoExtension,
};
use settlers::{Config, PlacementError};

fn node(s: &str) -> NodeKey {
    s.parse().unwrap()
}

fn edge(s: &str) -> EdgeKey {
    s.parse().unwrap()
}

#[test]
fn scenario_a_wood_brick_grain_spot() {
    let mut tiles = vec![Tile::ocean(); TILE_COUNT];
    tiles[5] = Tile::land(Resource::Wood, 5);
    tiles[10] = Tile::land(Resource::Brick, 4);
    tiles[11] = Tile::land(Resource::Grain, 6);
    let board = BoardState::new(tiles, BTreeMap::new(), vec![0, 1, 2, 3]).unwrap();

    let config = Config::default();
    let strengths = ResourceStrengths::compute(&board, &config.eval).unwrap();
    let score = score_settlement(&board, &node("5_10_11"), &strengths, &config.eval).unwrap();

    assert_eq!(score.raw_production, 12.0);
    assert_eq!(score.prime_variate, config.eval.prime_variate_bonus);
    assert!((score.parity - config.eval.parity_preference * 3.0).abs() < 1e-12);
    assert_eq!(score.port, 0.0);
}

#[test]
fn scenario_b_margin_softmax() {
    let p = margin_probabilities(&[10.0, 8.0, 5.0], 0.3).unwrap();
    assert_eq!(p.len(), 3);
    assert!(p[0] > p[1] && p[1] > p[2]);
    assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-6);
    // adjusted scores 8.5, 6.5, 3.5
    assert!((p[0] / p[1] - 2.0_f64.exp()).abs() < 1e-9);
    assert!((p[1] / p[2] - 3.0_f64.exp()).abs() < 1e-9);
}

#[test]
fn scenario_c_window_of_five() {
    let board = beginner_board();
    let spots = ["5_10_11", "12_18_19", "23_24_29"];
    let roads = ["10_11", "12_18", "23_24"];
    let mut branches = Vec::new();
    for (parent, weight) in [(0 as PlayerId, 0.5), (1, 0.5)] {
        for (i, child) in [0.6, 0.3, 0.1].into_iter().enumerate() {
            branches.push(Branch {
                board: board.clone(),
                probability: weight * child,
                depth: 1,
                trail: vec![Placement {
                    settlement: node(spots[i]),
                    road: edge(roads[i]),
                    player: parent,
                }],
            });
        }
    }
    assert_eq!(branches.len(), 6);

    let kept = prune(branches, 5);
    assert_eq!(kept.len(), 5);
    let total: f64 = kept.iter().map(|b| b.probability).sum();
    assert!((total - 1.0).abs() < 1e-6);
    // the two 0.05 children tie; the smaller trail survives
    assert_eq!(kept[4].trail[0].player, 0);
    assert!((kept[0].probability - 0.3 / 0.95).abs() < 1e-9);
}

#[test]
fn scenario_d_complete_placeout_is_clean() {
    let mut config = Config::default();
    config.search.x = 1;
    config.search.max_window = 3;
    config.search.parallel = false;
    let results = simulate(&beginner_board(), &config, &NoExtension).unwrap();
    let placeout = &results[0].placeouts[0].board;
    assert_eq!(placeout.settlement_count(), 8);
    assert!(SettlementChecker.conflicts(placeout).is_empty());

    // a hand-made board that breaks the distance rule is caught
    let crowded = beginner_board()
        .with_building(node("5_10_11"), Building::settlement(0))
        .unwrap()
        .with_building(node("5_6_11"), Building::settlement(1))
        .unwrap();
    assert_eq!(
        SettlementChecker.conflicts(&crowded),
        vec![(node("5_6_11"), node("5_10_11"))]
    );
}

#[test]
fn extension_hook_feeds_the_option_pool() {
    let board = beginner_board()
        .with_building(node("5_10_11"), Building::settlement(0))
        .unwrap();
    let config = Config::default();

    let valid = |_: &BoardState| vec![node("23_24_29")];
    let ranked = rank_open_spots(&board, &config.eval, &valid).unwrap();
    assert!(ranked.iter().any(|s| s.node == node("23_24_29")));

    let blocked = |_: &BoardState| vec![node("4_5_10")];
    assert!(matches!(
        rank_open_spots(&board, &config.eval, &blocked),
        Err(PlacementError::OccupiedSpot(_))
    ));
}

#[test]
fn every_option_has_its_own_tree() {
    let mut config = Config::default();
    config.search.x = 3;
    config.search.max_window = 6;
    let board = beginner_board();
    let results = simulate(&board, &config, &NoExtension).unwrap();
    assert_eq!(results.len(), 3);
    for w in results.windows(2) {
        assert!(w[0].score >= w[1].score);
        assert_ne!(w[0].placement.settlement, w[1].placement.settlement);
    }
    for result in &results {
        assert!(result.placeouts.len() <= 6);
        let total: f64 = result.placeouts.iter().map(|b| b.probability).sum();
        assert!((total - 1.0).abs() < 1e-6);
        for placeout in &result.placeouts {
            assert_eq!(placeout.trail[0], result.placement);
            assert!(placeout.board.is_occupied(&result.placement.settlement));
        }
    }
    // the caller's board is never touched
    assert_eq!(board.settlement_count(), 0);
}
