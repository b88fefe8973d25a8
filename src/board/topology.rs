//! Static hex-grid geometry.
//!
//! Tiles are numbered row-major over a 4,5,6,7,6,5,4 layout (the 19 land hexes
//! plus the surrounding ocean ring). A node is any triple of mutually adjacent
//! tiles and an edge any adjacent pair. The geometry never changes, so the
//! tile adjacency, the node graph and its all-pairs BFS distance matrix are
//! built once behind a `LazyLock` and shared read-only.
//!
//! Which nodes and edges are *legal* also depends on which tiles are water: a
//! node is valid unless all three of its tiles are water, an edge unless both
//! of its tiles are. Those checks take the tile slice as an argument.

use std::collections::{HashMap, VecDeque};
use std::sync::LazyLock;

use super::keys::{EdgeKey, NodeKey};
use super::tile::{Tile, TILE_COUNT};
use crate::error::{PlacementError, Result};

/// Tiles per row, top to bottom.
pub const ROW_SIZES: [usize; 7] = [4, 5, 6, 7, 6, 5, 4];

/// Id of the first tile in each row.
pub const ROW_STARTS: [usize; 7] = [0, 4, 9, 15, 22, 28, 33];

/// Number of tile triples that form a vertex on this layout.
pub const NODE_COUNT: usize = 54;

/// Number of adjacent tile pairs on this layout.
pub const EDGE_COUNT: usize = 90;

/// Marker for "no path" in the distance matrix.
const UNREACHABLE: u8 = u8::MAX;

/// The nine ocean tiles that can carry a port, each with the two settlement
/// spots that use it.
pub const PORT_ACCESS: [(u8, [[u8; 3]; 2]); 9] = [
    (0, [[0, 1, 5], [0, 4, 5]]),
    (2, [[1, 2, 6], [2, 6, 7]]),
    (8, [[7, 8, 13], [8, 13, 14]]),
    (9, [[4, 9, 10], [9, 10, 16]]),
    (21, [[14, 20, 21], [20, 21, 27]]),
    (22, [[16, 22, 23], [22, 23, 28]]),
    (32, [[26, 27, 32], [26, 31, 32]]),
    (33, [[28, 29, 33], [29, 33, 34]]),
    (35, [[30, 31, 35], [30, 34, 35]]),
];

/// Access nodes of a port tile, or `None` if ports never sit there.
pub fn port_access(tile: u8) -> Option<[NodeKey; 2]> {
    PORT_ACCESS
        .iter()
        .find(|(t, _)| *t == tile)
        .map(|(_, [a, b])| [NodeKey::sorted(a[0], a[1], a[2]), NodeKey::sorted(b[0], b[1], b[2])])
}

static TOPOLOGY: LazyLock<Topology> = LazyLock::new(Topology::build);

/// Returns the shared board geometry.
#[inline]
pub fn topology() -> &'static Topology {
    &TOPOLOGY
}

/// Converts a tile id to its (row, column).
fn row_col(tile: usize) -> (usize, usize) {
    let row = ROW_STARTS
        .iter()
        .rposition(|&start| tile >= start)
        .unwrap_or(0);
    (row, tile - ROW_STARTS[row])
}

/// Tiles sharing a hex side with `tile`.
///
/// Same row: column +/- 1. A wider neighbouring row touches columns c and
/// c + 1, a narrower one columns c - 1 and c.
fn hex_neighbors(tile: usize) -> Vec<u8> {
    let (row, col) = row_col(tile);
    let size = ROW_SIZES[row];
    let mut out = Vec::with_capacity(6);

    if col > 0 {
        out.push((tile - 1) as u8);
    }
    if col + 1 < size {
        out.push((tile + 1) as u8);
    }
    for adj_row in [row.wrapping_sub(1), row + 1] {
        if adj_row >= ROW_SIZES.len() {
            continue;
        }
        let adj_size = ROW_SIZES[adj_row];
        let cols: [isize; 2] = if adj_size > size {
            [col as isize, col as isize + 1]
        } else {
            [col as isize - 1, col as isize]
        };
        for c in cols {
            if c >= 0 && (c as usize) < adj_size {
                out.push((ROW_STARTS[adj_row] + c as usize) as u8);
            }
        }
    }
    out.sort_unstable();
    out
}

/// Precomputed geometry of the board.
pub struct Topology {
    neighbors: Vec<Vec<u8>>,
    adjacent: [[bool; TILE_COUNT]; TILE_COUNT],
    nodes: Vec<NodeKey>,
    edges: Vec<EdgeKey>,
    node_index: HashMap<NodeKey, usize>,
    /// For each node: (edge, neighbouring node index), ordered by edge key.
    links: Vec<Vec<(EdgeKey, usize)>>,
    /// Row-major `NODE_COUNT x NODE_COUNT` hop counts.
    dist: Vec<u8>,
}

impl Topology {
    fn build() -> Self {
        let neighbors: Vec<Vec<u8>> = (0..TILE_COUNT).map(hex_neighbors).collect();
        let mut adjacent = [[false; TILE_COUNT]; TILE_COUNT];
        for (a, list) in neighbors.iter().enumerate() {
            for &b in list {
                adjacent[a][b as usize] = true;
            }
        }

        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        for a in 0..TILE_COUNT {
            for &b in &neighbors[a] {
                let b = b as usize;
                if b <= a {
                    continue;
                }
                edges.push(EdgeKey::sorted(a as u8, b as u8));
                for &c in &neighbors[b] {
                    let c = c as usize;
                    if c > b && adjacent[a][c] {
                        nodes.push(NodeKey::sorted(a as u8, b as u8, c as u8));
                    }
                }
            }
        }
        nodes.sort_unstable();
        edges.sort_unstable();
        debug_assert_eq!(nodes.len(), NODE_COUNT);
        debug_assert_eq!(edges.len(), EDGE_COUNT);

        let node_index: HashMap<NodeKey, usize> =
            nodes.iter().enumerate().map(|(i, n)| (*n, i)).collect();

        let mut links: Vec<Vec<(EdgeKey, usize)>> = vec![Vec::with_capacity(3); nodes.len()];
        for (i, node) in nodes.iter().enumerate() {
            for (j, other) in nodes.iter().enumerate() {
                if i != j && node.shared_tiles(other) == 2 {
                    let [a, b, c] = node.tiles();
                    let shared: Vec<u8> = [a, b, c]
                        .into_iter()
                        .filter(|t| other.contains(*t))
                        .collect();
                    links[i].push((EdgeKey::sorted(shared[0], shared[1]), j));
                }
            }
            links[i].sort_unstable();
        }

        let n = nodes.len();
        let mut dist = vec![UNREACHABLE; n * n];
        let mut queue = VecDeque::with_capacity(n);
        for src in 0..n {
            dist[src * n + src] = 0;
            queue.clear();
            queue.push_back(src);
            while let Some(cur) = queue.pop_front() {
                let d = dist[src * n + cur];
                for &(_, next) in &links[cur] {
                    if dist[src * n + next] == UNREACHABLE {
                        dist[src * n + next] = d + 1;
                        queue.push_back(next);
                    }
                }
            }
        }

        Topology {
            neighbors,
            adjacent,
            nodes,
            edges,
            node_index,
            links,
            dist,
        }
    }

    /// Tiles sharing a side with `tile`, ascending.
    pub fn tile_neighbors(&self, tile: u8) -> &[u8] {
        self.neighbors
            .get(tile as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    #[inline]
    pub fn tiles_adjacent(&self, a: u8, b: u8) -> bool {
        (a as usize) < TILE_COUNT && (b as usize) < TILE_COUNT && self.adjacent[a as usize][b as usize]
    }

    /// True when `node` names a vertex of the hex grid, whatever the tiles hold.
    #[inline]
    pub fn is_vertex(&self, node: &NodeKey) -> bool {
        self.node_index.contains_key(node)
    }

    /// True when `edge` names a side shared by two hexes.
    #[inline]
    pub fn is_side(&self, edge: &EdgeKey) -> bool {
        let [a, b] = edge.tiles();
        self.tiles_adjacent(a, b)
    }

    /// Checks that `node` is a vertex and not surrounded by water.
    pub fn validate_node(&self, tiles: &[Tile], node: &NodeKey) -> Result<()> {
        if !self.is_vertex(node) || all_water(tiles, &node.tiles()) {
            return Err(PlacementError::InvalidSpot(node.to_string()));
        }
        Ok(())
    }

    /// Checks that `edge` is a hex side with at least one land tile.
    pub fn validate_edge(&self, tiles: &[Tile], edge: &EdgeKey) -> Result<()> {
        if !self.is_side(edge) || all_water(tiles, &edge.tiles()) {
            return Err(PlacementError::InvalidSpot(edge.to_string()));
        }
        Ok(())
    }

    /// Builds and validates the node key for three tiles in any order.
    pub fn node_key(&self, tiles: &[Tile], t1: u8, t2: u8, t3: u8) -> Result<NodeKey> {
        let node = NodeKey::sorted(t1, t2, t3);
        self.validate_node(tiles, &node)?;
        Ok(node)
    }

    /// Builds and validates the edge key for two tiles in any order.
    pub fn edge_key(&self, tiles: &[Tile], t1: u8, t2: u8) -> Result<EdgeKey> {
        let edge = EdgeKey::sorted(t1, t2);
        self.validate_edge(tiles, &edge)?;
        Ok(edge)
    }

    /// Every valid node for the given tile contents, ascending.
    pub fn all_nodes(&self, tiles: &[Tile]) -> Vec<NodeKey> {
        self.nodes
            .iter()
            .filter(|n| !all_water(tiles, &n.tiles()))
            .copied()
            .collect()
    }

    /// Every valid edge for the given tile contents, ascending.
    pub fn all_edges(&self, tiles: &[Tile]) -> Vec<EdgeKey> {
        self.edges
            .iter()
            .filter(|e| !all_water(tiles, &e.tiles()))
            .copied()
            .collect()
    }

    /// Shortest path length between two nodes in the node graph (nodes are
    /// linked when they share an edge). `None` if either key is not a vertex.
    pub fn node_distance(&self, a: &NodeKey, b: &NodeKey) -> Option<u8> {
        let ia = *self.node_index.get(a)?;
        let ib = *self.node_index.get(b)?;
        match self.dist[ia * self.nodes.len() + ib] {
            UNREACHABLE => None,
            d => Some(d),
        }
    }

    /// Neighbouring nodes of `node` with the edge joining them, ordered by
    /// edge key. Empty for a key that is not a vertex.
    pub fn node_neighbors(&self, node: &NodeKey) -> impl Iterator<Item = (EdgeKey, NodeKey)> + '_ {
        let links = match self.node_index.get(node) {
            Some(&i) => self.links[i].as_slice(),
            None => &[],
        };
        links.iter().map(move |&(edge, j)| (edge, self.nodes[j]))
    }

    /// The node across `edge` from `node`, if the board has one there.
    pub fn across(&self, node: &NodeKey, edge: &EdgeKey) -> Option<NodeKey> {
        self.node_neighbors(node)
            .find(|(e, _)| e == edge)
            .map(|(_, other)| other)
    }
}

/// True when every listed tile is water. Out-of-range ids count as water.
fn all_water(tiles: &[Tile], ids: &[u8]) -> bool {
    ids.iter().all(|&t| tiles.get(t as usize).map_or(true, |tile| tile.is_water()))
}
