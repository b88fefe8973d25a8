//! HDCS board snapshots.
//!
//! HDCS is the positional JSON document the game-state collector produces:
//! `meta` (turn bookkeeping), `map` (tiles as `[resource, token]` pairs,
//! port, node and edge maps keyed by sorted tile ids) and `players`. The
//! document is taken as given; missing ports or players are not inferred.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::board::keys::{EdgeKey, NodeKey};
use crate::board::state::{BoardState, Building, PlayerId};
use crate::board::tile::{PortKind, Tile};
use crate::config::Config;
use crate::error::{PlacementError, Result};
use crate::search::simulate::next_seat;

/// Robber value meaning "not on the board".
pub const NO_ROBBER: i8 = -1;

/// Development cards left in a fresh deck:
/// knight, victory point, road building, year of plenty, monopoly.
pub const FULL_DEV_DECK: [u8; 5] = [14, 5, 2, 2, 2];

/// Turn bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub t: u32,
    /// Seat the collector believes is to move.
    pub p_curr: PlayerId,
    #[serde(default)]
    pub phase: String,
    /// Recent dice rolls, newest first.
    #[serde(default)]
    pub dice: Vec<u8>,
    #[serde(default)]
    pub dev_rem: Vec<u8>,
}

/// The `map` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSection {
    #[serde(default = "no_robber")]
    pub robber: i8,
    pub tiles: Vec<Tile>,
    #[serde(default)]
    pub ports: BTreeMap<NodeKey, PortKind>,
    #[serde(default)]
    pub nodes: BTreeMap<NodeKey, Building>,
    #[serde(default)]
    pub edges: BTreeMap<EdgeKey, PlayerId>,
}

fn no_robber() -> i8 {
    NO_ROBBER
}

/// One seat. Only `id` matters for setup; the hand fields are carried so a
/// document survives a round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerEntry {
    pub id: PlayerId,
    /// Victory points, army size, road length, card count.
    #[serde(default)]
    pub public: Vec<i32>,
    /// Known resource counts.
    #[serde(default)]
    pub res_k: Vec<i32>,
    /// Unknown cards as per-resource probabilities.
    #[serde(default)]
    pub res_u: Vec<[f64; 5]>,
    /// Development cards as age plus per-kind probabilities.
    #[serde(default)]
    pub devs: Vec<[f64; 6]>,
}

impl PlayerEntry {
    pub fn new(id: PlayerId) -> Self {
        PlayerEntry {
            id,
            ..Default::default()
        }
    }
}

/// A whole HDCS document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HdcsDocument {
    pub meta: Meta,
    pub map: MapSection,
    #[serde(default)]
    pub players: Vec<PlayerEntry>,
}

/// Parses an HDCS document. Malformed JSON, keys or ids fail with
/// `MalformedBoard`.
pub fn parse_hdcs(json: &str) -> Result<HdcsDocument> {
    serde_json::from_str(json)
        .map_err(|e| PlacementError::MalformedBoard(format!("invalid HDCS document: {}", e)))
}

/// Parses an HDCS document straight into a board.
pub fn parse_board(json: &str) -> Result<BoardState> {
    parse_hdcs(json)?.to_board()
}

impl HdcsDocument {
    /// Wraps `board` in a setup-phase document with `p_curr` to move.
    pub fn from_board(board: &BoardState, p_curr: PlayerId) -> Self {
        HdcsDocument {
            meta: Meta {
                t: 0,
                p_curr,
                phase: "settle".into(),
                dice: Vec::new(),
                dev_rem: FULL_DEV_DECK.to_vec(),
            },
            map: MapSection {
                robber: board.robber().map_or(NO_ROBBER, |r| r as i8),
                tiles: board.tiles().to_vec(),
                ports: board.ports().clone(),
                nodes: board.nodes().clone(),
                edges: board.edges().clone(),
            },
            players: board.players().iter().map(|&id| PlayerEntry::new(id)).collect(),
        }
    }

    /// Builds the board snapshot. Every key is checked against the
    /// topology; the distance rule is not.
    pub fn to_board(&self) -> Result<BoardState> {
        let players = self.players.iter().map(|p| p.id).collect();
        let mut board = BoardState::new(self.map.tiles.clone(), self.map.ports.clone(), players)?;
        match self.map.robber {
            NO_ROBBER => {}
            r if r >= 0 => board = board.with_robber(r as u8)?,
            r => {
                return Err(PlacementError::MalformedBoard(format!("robber on tile {}", r)));
            }
        }
        for (&node, &building) in &self.map.nodes {
            board = board.with_building(node, building)?;
        }
        for (&edge, &owner) in &self.map.edges {
            board = board.with_road(edge, owner)?;
        }
        Ok(board)
    }

    /// Compares `p_curr` with the seat the turn order puts on move. A
    /// mismatch is logged and reported, not fatal: the turn order wins.
    pub fn check_turn(&self, board: &BoardState, config: &Config) -> bool {
        match next_seat(board, config) {
            Some(seat) if seat != self.meta.p_curr => {
                warn!(
                    p_curr = self.meta.p_curr,
                    seat,
                    settlements = board.settlement_count(),
                    "p_curr disagrees with the turn order"
                );
                false
            }
            _ => true,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| PlacementError::MalformedBoard(format!("cannot encode HDCS: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::generate::beginner_board;
    use crate::board::state::BuildingKind;

    const SNAPSHOT: &str = r#"{
        "meta": {"t": 3, "p_curr": 1, "phase": "settle", "dice": [], "dev_rem": [14, 5, 2, 2, 2]},
        "map": {
            "robber": 18,
            "tiles": [
                [5, -1], [6, 0], [2, -1], [6, 0],
                [6, 0], [3, 6], [2, 2], [0, 5], [3, -1],
                [5, -1], [4, 3], [4, 9], [1, 10], [1, 8], [6, 0],
                [6, 0], [0, 8], [0, 4], [5, 0], [2, 3], [4, 11], [1, -1],
                [5, -1], [2, 10], [3, 5], [1, 6], [3, 4], [6, 0],
                [6, 0], [0, 9], [2, 12], [3, 11], [4, -1],
                [5, -1], [6, 0], [0, -1], [6, 0]
            ],
            "ports": {"0_1_5": 5, "0_4_5": 5},
            "nodes": {"5_10_11": [0, 1]},
            "edges": {"10_11": 0}
        },
        "players": [{"id": 0}, {"id": 1}, {"id": 2}, {"id": 3}]
    }"#;

    fn node(s: &str) -> NodeKey {
        s.parse().unwrap()
    }

    #[test]
    fn snapshot_becomes_a_board() {
        let board = parse_board(SNAPSHOT).unwrap();
        assert_eq!(board.robber(), Some(18));
        assert_eq!(board.players(), &[0, 1, 2, 3]);
        assert_eq!(board.ports().len(), 2);
        assert_eq!(board.port_at(&node("0_4_5")), Some(PortKind::General));
        let building = board.nodes()[&node("5_10_11")];
        assert_eq!(building.owner, 0);
        assert_eq!(building.kind, BuildingKind::Settlement);
        assert_eq!(board.edges().len(), 1);
        assert_eq!(board.settlement_count(), 1);
    }

    #[test]
    fn ports_are_not_inferred() {
        let json = SNAPSHOT.replace(r#""ports": {"0_1_5": 5, "0_4_5": 5},"#, "");
        let board = parse_board(&json).unwrap();
        assert!(board.ports().is_empty());
    }

    #[test]
    fn missing_robber_is_allowed() {
        let json = SNAPSHOT.replace(r#""robber": 18"#, r#""robber": -1"#);
        assert_eq!(parse_board(&json).unwrap().robber(), None);
    }

    #[test]
    fn malformed_documents_are_rejected() {
        let bad_key = SNAPSHOT.replace(r#""10_11": 0"#, r#""10_x": 0"#);
        assert!(matches!(parse_board(&bad_key), Err(PlacementError::MalformedBoard(_))));

        let bad_building = SNAPSHOT.replace("[0, 1]}", "[0, 3]}");
        assert!(matches!(parse_board(&bad_building), Err(PlacementError::MalformedBoard(_))));

        let short = SNAPSHOT.replace("[5, -1], [6, 0], [0, -1], [6, 0]", "[5, -1], [6, 0], [0, -1]");
        assert!(matches!(parse_board(&short), Err(PlacementError::MalformedBoard(_))));

        // 10 and 12 are not neighbours
        let not_a_vertex = SNAPSHOT.replace("5_10_11", "10_11_12");
        assert!(matches!(parse_board(&not_a_vertex), Err(PlacementError::InvalidSpot(_))));

        assert!(parse_hdcs("{}").is_err());
    }

    #[test]
    fn board_survives_encoding() {
        let board = beginner_board();
        let json = HdcsDocument::from_board(&board, 0).to_json().unwrap();
        assert_eq!(parse_board(&json).unwrap(), board);
    }

    #[test]
    fn turn_check_follows_the_turn_order() {
        let doc = parse_hdcs(SNAPSHOT).unwrap();
        let board = doc.to_board().unwrap();
        let config = Config::default();
        // one settlement down: seat 1 is next
        assert!(doc.check_turn(&board, &config));

        let mut wrong = doc.clone();
        wrong.meta.p_curr = 3;
        assert!(!wrong.check_turn(&board, &config));
    }
}
