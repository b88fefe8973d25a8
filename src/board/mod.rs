//! Board representation.
//!
//! Tile and key types, the static hex geometry, and the immutable snapshot
//! that placements are applied to.

pub mod checker;
pub mod generate;
pub mod keys;
pub mod state;
pub mod tile;
pub mod topology;

pub use checker::SettlementChecker;
pub use generate::{beginner_board, random_board};
pub use keys::{EdgeKey, NodeKey};
pub use state::{BoardState, Building, BuildingKind, Placement, PlayerId, Reach, MAX_PLAYERS};
pub use tile::{pips, PortKind, Resource, Tile, ALL_RESOURCES, RESOURCE_COUNT, TILE_COUNT};
pub use topology::{topology, Topology};
