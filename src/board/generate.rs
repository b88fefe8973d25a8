//! Standard board layouts.
//!
//! `beginner_board` is the fixed layout from the base-game rulebook. The
//! seeded `random_board` shuffles the same tile, number and port sets, which
//! is enough for benches and property tests; it does not enforce the
//! "no adjacent red numbers" house rule.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::state::{BoardState, PlayerId};
use super::tile::{PortKind, Resource, Tile, TILE_COUNT};
use super::topology::PORT_ACCESS;
use crate::error::Result;

/// Land tiles in row-major order.
pub const LAND_TILES: [u8; 19] = [
    5, 6, 7, 10, 11, 12, 13, 16, 17, 18, 19, 20, 23, 24, 25, 26, 29, 30, 31,
];

/// Seats used by generated boards.
pub const DEFAULT_PLAYERS: [PlayerId; 4] = [0, 1, 2, 3];

const BEGINNER_LAND: [Option<(Resource, i8)>; 19] = {
    use Resource::*;
    [
        Some((Ore, 10)),
        Some((Wool, 2)),
        Some((Wood, 9)),
        Some((Grain, 12)),
        Some((Brick, 6)),
        Some((Wool, 4)),
        Some((Brick, 10)),
        Some((Grain, 9)),
        Some((Wood, 11)),
        None,
        Some((Wood, 3)),
        Some((Ore, 8)),
        Some((Wood, 8)),
        Some((Ore, 3)),
        Some((Grain, 4)),
        Some((Wool, 5)),
        Some((Brick, 5)),
        Some((Grain, 6)),
        Some((Wool, 11)),
    ]
};

/// Port kinds on the port tiles of [`PORT_ACCESS`], in the same order.
const BEGINNER_PORTS: [PortKind; 9] = [
    PortKind::General,
    PortKind::Specific(Resource::Wool),
    PortKind::General,
    PortKind::Specific(Resource::Ore),
    PortKind::General,
    PortKind::Specific(Resource::Grain),
    PortKind::Specific(Resource::Brick),
    PortKind::General,
    PortKind::Specific(Resource::Wood),
];

const LAND_RESOURCES: [Option<Resource>; 19] = {
    use Resource::*;
    [
        Some(Wood), Some(Wood), Some(Wood), Some(Wood),
        Some(Brick), Some(Brick), Some(Brick),
        Some(Wool), Some(Wool), Some(Wool), Some(Wool),
        Some(Grain), Some(Grain), Some(Grain), Some(Grain),
        Some(Ore), Some(Ore), Some(Ore),
        None,
    ]
};

const NUMBER_TOKENS: [i8; 18] = [2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

/// Lays out land and ports and returns the finished empty board.
fn assemble(land: &[Option<(Resource, i8)>], ports: &[PortKind]) -> Result<BoardState> {
    let mut tiles = vec![Tile::ocean(); TILE_COUNT];
    let mut desert = None;
    for (&id, slot) in LAND_TILES.iter().zip(land) {
        tiles[id as usize] = match slot {
            Some((resource, number)) => Tile::land(*resource, *number),
            None => {
                desert = Some(id);
                Tile::desert()
            }
        };
    }
    for ((tile, _), kind) in PORT_ACCESS.iter().zip(ports) {
        tiles[*tile as usize] = Tile::port(*kind);
    }

    let port_map = BoardState::ports_from_tiles(&tiles);
    let board = BoardState::new(tiles, port_map, DEFAULT_PLAYERS.to_vec())?;
    match desert {
        Some(tile) => board.with_robber(tile),
        None => Ok(board),
    }
}

/// The rulebook's beginner layout, robber on the desert, four empty seats.
pub fn beginner_board() -> BoardState {
    assemble(&BEGINNER_LAND, &BEGINNER_PORTS).expect("beginner layout is well formed")
}

/// A standard-distribution board shuffled from `seed`.
pub fn random_board(seed: u64) -> BoardState {
    let mut rng = SmallRng::seed_from_u64(seed);

    let mut resources = LAND_RESOURCES;
    resources.shuffle(&mut rng);
    let mut numbers = NUMBER_TOKENS;
    numbers.shuffle(&mut rng);
    let mut ports = BEGINNER_PORTS;
    ports.shuffle(&mut rng);

    let mut next_number = numbers.iter();
    let land: Vec<Option<(Resource, i8)>> = resources
        .iter()
        .map(|r| r.and_then(|r| next_number.next().map(|&n| (r, n))))
        .collect();
    assemble(&land, &ports).expect("shuffled standard sets form a legal board")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tile::{pips, ALL_RESOURCES};

    fn production(board: &BoardState) -> [u32; 5] {
        let mut out = [0u32; 5];
        for tile in board.tiles() {
            if let Some(r) = tile.produces() {
                out[r.index()] += pips(tile.number) as u32;
            }
        }
        out
    }

    #[test]
    fn beginner_layout() {
        let board = beginner_board();
        assert_eq!(board.robber(), Some(18));
        assert_eq!(board.tile(18), Some(Tile::desert()));
        assert_eq!(board.tile(5), Some(Tile::land(Resource::Ore, 10)));
        assert_eq!(board.tile(31), Some(Tile::land(Resource::Wool, 11)));
        assert_eq!(board.players(), &DEFAULT_PLAYERS);
        // wood, brick, wool, grain, ore
        assert_eq!(production(&board), [13, 12, 10, 13, 10]);
    }

    #[test]
    fn random_boards_keep_the_standard_sets() {
        for seed in 0..20 {
            let board = random_board(seed);
            assert_eq!(production(&board).iter().sum::<u32>(), 58);
            let land = board.tiles().iter().filter(|t| !t.is_water()).count();
            assert_eq!(land, 19);
            assert_eq!(board.ports().len(), 18);
            let desert = board.robber().expect("robber on the desert");
            assert_eq!(board.tile(desert), Some(Tile::desert()));
            for r in ALL_RESOURCES {
                let tiles = board.tiles().iter().filter(|t| t.produces() == Some(r)).count();
                assert!((3..=4).contains(&tiles));
            }
        }
    }

    #[test]
    fn random_board_is_deterministic() {
        assert_eq!(random_board(7), random_board(7));
        assert_ne!(random_board(7), random_board(8));
    }
}
