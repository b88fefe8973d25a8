//! Board snapshot.
//!
//! A `BoardState` is immutable once built: applying a placement returns a new
//! snapshot. The static parts (tiles, ports) sit behind `Arc` so every branch
//! of a simulation shares them and only clones its own buildings and roads.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::keys::{EdgeKey, NodeKey};
use super::tile::{PortKind, Tile, PORT_TOKEN, TILE_COUNT};
use super::topology::{port_access, topology};
use crate::error::{PlacementError, Result};

/// Seat number of a player, 0-3.
pub type PlayerId = u8;

/// Maximum number of seats at the table.
pub const MAX_PLAYERS: usize = 4;

/// Kind of building on a node. Discriminants match the HDCS building ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BuildingKind {
    Settlement = 1,
    City = 2,
}

impl BuildingKind {
    /// Resource cards collected per roll of an adjacent tile.
    pub const fn multiplier(self) -> u8 {
        match self {
            BuildingKind::Settlement => 1,
            BuildingKind::City => 2,
        }
    }
}

impl TryFrom<u8> for BuildingKind {
    type Error = String;

    fn try_from(id: u8) -> std::result::Result<Self, Self::Error> {
        match id {
            1 => Ok(BuildingKind::Settlement),
            2 => Ok(BuildingKind::City),
            other => Err(format!("unknown building type {}", other)),
        }
    }
}

impl From<BuildingKind> for u8 {
    fn from(kind: BuildingKind) -> u8 {
        kind as u8
    }
}

/// A settlement or city and its owner, serialized as `[owner, kind]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(PlayerId, BuildingKind)", into = "(PlayerId, BuildingKind)")]
pub struct Building {
    pub owner: PlayerId,
    pub kind: BuildingKind,
}

impl Building {
    pub const fn settlement(owner: PlayerId) -> Self {
        Building {
            owner,
            kind: BuildingKind::Settlement,
        }
    }
}

impl From<(PlayerId, BuildingKind)> for Building {
    fn from((owner, kind): (PlayerId, BuildingKind)) -> Self {
        Building { owner, kind }
    }
}

impl From<Building> for (PlayerId, BuildingKind) {
    fn from(b: Building) -> Self {
        (b.owner, b.kind)
    }
}

/// One setup move: a settlement and the road built with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Placement {
    pub settlement: NodeKey,
    pub road: EdgeKey,
    pub player: PlayerId,
}

/// Shortest unoccupied road route from a start node to some other node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reach {
    /// Number of roads needed.
    pub distance: u8,
    /// The road leaving the start node on that route; `None` for the start.
    pub first_edge: Option<EdgeKey>,
}

/// Immutable snapshot of the board during setup.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardState {
    tiles: Arc<[Tile]>,
    ports: Arc<BTreeMap<NodeKey, PortKind>>,
    nodes: BTreeMap<NodeKey, Building>,
    edges: BTreeMap<EdgeKey, PlayerId>,
    players: Vec<PlayerId>,
    robber: Option<u8>,
}

impl BoardState {
    /// Builds an empty board from its tiles and port map.
    ///
    /// Fails with `MalformedBoard` if the tile list does not hold 37 legal
    /// tiles, a port key is not a settlement spot, or the seat list is bad.
    pub fn new(
        tiles: Vec<Tile>,
        ports: BTreeMap<NodeKey, PortKind>,
        players: Vec<PlayerId>,
    ) -> Result<Self> {
        if tiles.len() != TILE_COUNT {
            return Err(PlacementError::MalformedBoard(format!(
                "expected {} tiles, got {}",
                TILE_COUNT,
                tiles.len()
            )));
        }
        for (id, tile) in tiles.iter().enumerate() {
            tile.check()
                .map_err(|e| PlacementError::MalformedBoard(format!("tile {}: {}", id, e)))?;
        }
        let topo = topology();
        for node in ports.keys() {
            topo.validate_node(&tiles, node)
                .map_err(|_| PlacementError::MalformedBoard(format!("port on unknown spot {}", node)))?;
        }
        if players.len() > MAX_PLAYERS {
            return Err(PlacementError::MalformedBoard(format!(
                "{} players, at most {} supported",
                players.len(),
                MAX_PLAYERS
            )));
        }
        let mut seen = [false; MAX_PLAYERS];
        for &p in &players {
            match seen.get_mut(p as usize) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(PlacementError::MalformedBoard(format!(
                        "bad or duplicate player id {}",
                        p
                    )))
                }
            }
        }

        Ok(BoardState {
            tiles: tiles.into(),
            ports: Arc::new(ports),
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            players,
            robber: None,
        })
    }

    /// Derives the port map from the port tiles in `tiles`.
    pub fn ports_from_tiles(tiles: &[Tile]) -> BTreeMap<NodeKey, PortKind> {
        let mut ports = BTreeMap::new();
        for (id, tile) in tiles.iter().enumerate() {
            if tile.number != PORT_TOKEN {
                continue;
            }
            let (Ok(kind), Some(access)) = (PortKind::try_from(tile.resource), port_access(id as u8)) else {
                continue;
            };
            for node in access {
                ports.insert(node, kind);
            }
        }
        ports
    }

    /// Places the robber. Fails if `tile` is not a board tile.
    pub fn with_robber(mut self, tile: u8) -> Result<Self> {
        if tile as usize >= TILE_COUNT {
            return Err(PlacementError::MalformedBoard(format!("robber on tile {}", tile)));
        }
        self.robber = Some(tile);
        Ok(self)
    }

    /// Records an existing building, as read from a snapshot. Only topology
    /// is checked; the distance rule is the game's business.
    pub fn with_building(mut self, node: NodeKey, building: Building) -> Result<Self> {
        topology().validate_node(&self.tiles, &node)?;
        self.check_player(building.owner)?;
        self.nodes.insert(node, building);
        Ok(self)
    }

    /// Records an existing road, as read from a snapshot.
    pub fn with_road(mut self, edge: EdgeKey, owner: PlayerId) -> Result<Self> {
        topology().validate_edge(&self.tiles, &edge)?;
        self.check_player(owner)?;
        self.edges.insert(edge, owner);
        Ok(self)
    }

    fn check_player(&self, id: PlayerId) -> Result<()> {
        if (id as usize) < MAX_PLAYERS {
            Ok(())
        } else {
            Err(PlacementError::MalformedBoard(format!("player id {}", id)))
        }
    }

    /// Returns a new snapshot with `placement` applied.
    ///
    /// The settlement must be a legal open spot and the road a free,
    /// road-legal edge of that spot.
    pub fn with_placement(&self, placement: &Placement) -> Result<BoardState> {
        let topo = topology();
        topo.validate_node(&self.tiles, &placement.settlement)?;
        topo.validate_edge(&self.tiles, &placement.road)?;
        if !placement.settlement.touches(&placement.road) {
            return Err(PlacementError::DisconnectedRoad {
                node: placement.settlement.to_string(),
                edge: placement.road.to_string(),
            });
        }
        if !self.is_open(&placement.settlement) {
            return Err(PlacementError::OccupiedSpot(placement.settlement.to_string()));
        }
        if self.edges.contains_key(&placement.road) {
            return Err(PlacementError::OccupiedSpot(placement.road.to_string()));
        }
        self.check_player(placement.player)?;

        let mut next = self.clone();
        next.nodes
            .insert(placement.settlement, Building::settlement(placement.player));
        next.edges.insert(placement.road, placement.player);
        Ok(next)
    }

    #[inline]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    #[inline]
    pub fn tile(&self, id: u8) -> Option<Tile> {
        self.tiles.get(id as usize).copied()
    }

    #[inline]
    pub fn ports(&self) -> &BTreeMap<NodeKey, PortKind> {
        &self.ports
    }

    #[inline]
    pub fn port_at(&self, node: &NodeKey) -> Option<PortKind> {
        self.ports.get(node).copied()
    }

    #[inline]
    pub fn nodes(&self) -> &BTreeMap<NodeKey, Building> {
        &self.nodes
    }

    #[inline]
    pub fn edges(&self) -> &BTreeMap<EdgeKey, PlayerId> {
        &self.edges
    }

    #[inline]
    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    #[inline]
    pub fn robber(&self) -> Option<u8> {
        self.robber
    }

    /// Number of buildings on the board. During setup this is the number of
    /// placements made so far.
    #[inline]
    pub fn settlement_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_occupied(&self, node: &NodeKey) -> bool {
        self.nodes.contains_key(node)
    }

    /// Buildings owned by `player`, in key order.
    pub fn buildings_of(&self, player: PlayerId) -> impl Iterator<Item = (&NodeKey, &Building)> + '_ {
        self.nodes.iter().filter(move |(_, b)| b.owner == player)
    }

    /// True when a settlement could go on `node`: the spot is a valid vertex,
    /// unoccupied and not next to any building.
    pub fn is_open(&self, node: &NodeKey) -> bool {
        let topo = topology();
        topo.validate_node(&self.tiles, node).is_ok()
            && !self.is_occupied(node)
            && topo.node_neighbors(node).all(|(_, n)| !self.is_occupied(&n))
    }

    /// Every open settlement spot, ascending.
    pub fn open_nodes(&self) -> Vec<NodeKey> {
        topology()
            .all_nodes(&self.tiles)
            .into_iter()
            .filter(|n| self.is_open(n))
            .collect()
    }

    /// True when a road could be built on `edge`: road-legal and free.
    pub fn is_free_road(&self, edge: &EdgeKey) -> bool {
        topology().validate_edge(&self.tiles, edge).is_ok() && !self.edges.contains_key(edge)
    }

    /// True when at least one edge of `node` could still take a road.
    pub fn has_free_road(&self, node: &NodeKey) -> bool {
        node.edges().iter().any(|e| self.is_free_road(e))
    }

    /// Breadth-first search over free road-legal edges from `start`, up to
    /// `max_roads` roads. Edges are tried in key order, so each reached node
    /// records the smallest first road among its shortest routes.
    pub fn road_reach(&self, start: &NodeKey, max_roads: u8) -> BTreeMap<NodeKey, Reach> {
        let topo = topology();
        let mut reached = BTreeMap::new();
        reached.insert(
            *start,
            Reach {
                distance: 0,
                first_edge: None,
            },
        );
        let mut queue = VecDeque::from([(*start, 0u8, None::<EdgeKey>)]);

        while let Some((current, dist, first)) = queue.pop_front() {
            if dist >= max_roads {
                continue;
            }
            for (edge, next) in topo.node_neighbors(&current) {
                if !self.is_free_road(&edge) || reached.contains_key(&next) {
                    continue;
                }
                let first_edge = first.or(Some(edge));
                reached.insert(
                    next,
                    Reach {
                        distance: dist + 1,
                        first_edge,
                    },
                );
                queue.push_back((next, dist + 1, first_edge));
            }
        }
        reached
    }
}
