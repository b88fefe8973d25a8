use proptest::prelude::*;

use settlers::board::checker::SettlementChecker;
use settlers::board::generate::random_board;
use settlers::board::state::{BoardState, Placement};
use settlers::board::topology::topology;
use settlers::eval::{score_settlement, ResourceStrengths};
use settlers::search::{predict, rank_open_spots, simulate, NoExtension};
use settlers::Config;

/// Plays `moves` greedy placements so the properties also see crowded boards.
fn crowded(seed: u64, moves: usize, config: &Config) -> BoardState {
    let mut board = random_board(seed);
    for seat in config.search.turn_order.iter().take(moves) {
        let predictions = predict(&board, config.search.k, config).unwrap();
        let Some(best) = predictions.first() else { break };
        board = board
            .with_placement(&Placement {
                settlement: best.settlement,
                road: best.road,
                player: *seat,
            })
            .unwrap();
    }
    board
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prediction_is_a_distribution(seed in any::<u64>(), moves in 0usize..8, k in 0.0f64..4.0) {
        let config = Config::default();
        let board = crowded(seed, moves, &config);
        let predictions = predict(&board, k, &config).unwrap();
        prop_assert!(predictions.len() <= 3);
        if !predictions.is_empty() {
            let total: f64 = predictions.iter().map(|p| p.probability).sum();
            prop_assert!((total - 1.0).abs() < 1e-6, "sum {}", total);
        }
        for p in &predictions {
            prop_assert!(p.settlement.touches(&p.road));
            prop_assert!(board.is_open(&p.settlement));
            prop_assert!(board.is_free_road(&p.road));
        }
    }

    #[test]
    fn open_spots_respect_the_distance_rule(seed in any::<u64>(), moves in 0usize..8) {
        let config = Config::default();
        let board = crowded(seed, moves, &config);
        let topo = topology();
        for spot in rank_open_spots(&board, &config.eval, &NoExtension).unwrap() {
            prop_assert!(spot.node.tiles().iter().any(|&t| !board.tiles()[t as usize].is_water()));
            for occupied in board.nodes().keys() {
                let d = topo.node_distance(&spot.node, occupied);
                prop_assert!(d.map_or(true, |d| d >= 2), "{} next to {}", spot.node, occupied);
            }
        }
        prop_assert!(SettlementChecker.is_clean(&board));
    }

    #[test]
    fn scoring_is_bit_identical(seed in any::<u64>()) {
        let board = random_board(seed);
        let config = Config::default();
        let strengths = ResourceStrengths::compute(&board, &config.eval).unwrap();
        for node in board.open_nodes() {
            let a = score_settlement(&board, &node, &strengths, &config.eval).unwrap();
            let b = score_settlement(&board, &node, &strengths, &config.eval).unwrap();
            prop_assert_eq!(a.total.to_bits(), b.total.to_bits());
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn placeouts_are_bounded_and_normalized(seed in any::<u64>(), window in 1usize..8) {
        let mut config = Config::default();
        config.search.x = 2;
        config.search.max_window = window;
        config.search.parallel = false;
        let board = random_board(seed);
        let results = simulate(&board, &config, &NoExtension).unwrap();
        prop_assert_eq!(results.len(), 2);
        for result in &results {
            prop_assert!(!result.placeouts.is_empty());
            prop_assert!(result.placeouts.len() <= window);
            let total: f64 = result.placeouts.iter().map(|b| b.probability).sum();
            prop_assert!((total - 1.0).abs() < 1e-6, "sum {}", total);
            for placeout in &result.placeouts {
                prop_assert_eq!(placeout.board.settlement_count(), 8);
                prop_assert!(SettlementChecker.is_clean(&placeout.board));
            }
        }
    }
}
