//! Vertex and edge keys.
//!
//! A node (vertex) is named by the three tiles meeting at it and an edge by
//! the two tiles it separates. Tile ids are always stored ascending, so two
//! keys naming the same place compare equal. The textual form joins the ids
//! with `_`, e.g. `5_10_11` and `10_11`.
//!
//! Keys only guarantee shape here; whether a key names a real place on the
//! board is decided by [`crate::board::topology`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::tile::TILE_COUNT;
use crate::error::PlacementError;

/// Separator used in the textual key form.
pub const KEY_SEPARATOR: char = '_';

/// Three ascending tile ids naming a settlement spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey([u8; 3]);

/// Two ascending tile ids naming a road spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey([u8; 2]);

impl NodeKey {
    /// Builds a key from three tile ids in any order.
    pub fn sorted(a: u8, b: u8, c: u8) -> Self {
        let mut tiles = [a, b, c];
        tiles.sort_unstable();
        NodeKey(tiles)
    }

    #[inline]
    pub const fn tiles(&self) -> [u8; 3] {
        self.0
    }

    #[inline]
    pub fn contains(&self, tile: u8) -> bool {
        self.0.contains(&tile)
    }

    /// The three edges bordering this node.
    pub fn edges(&self) -> [EdgeKey; 3] {
        let [a, b, c] = self.0;
        [EdgeKey([a, b]), EdgeKey([a, c]), EdgeKey([b, c])]
    }

    /// True when `edge` is one of this node's three edges.
    pub fn touches(&self, edge: &EdgeKey) -> bool {
        let [a, b] = edge.0;
        a != b && self.contains(a) && self.contains(b)
    }

    /// The tile of this node that is not part of `edge`.
    pub fn opposite(&self, edge: &EdgeKey) -> Option<u8> {
        if !self.touches(edge) {
            return None;
        }
        self.0.iter().copied().find(|t| !edge.0.contains(t))
    }

    /// Number of tiles two nodes have in common. Nodes sharing two tiles are
    /// joined by an edge.
    pub fn shared_tiles(&self, other: &NodeKey) -> usize {
        self.0.iter().filter(|t| other.contains(**t)).count()
    }
}

impl EdgeKey {
    /// Builds a key from two tile ids in any order.
    pub fn sorted(a: u8, b: u8) -> Self {
        if a <= b {
            EdgeKey([a, b])
        } else {
            EdgeKey([b, a])
        }
    }

    #[inline]
    pub const fn tiles(&self) -> [u8; 2] {
        self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "{a}{KEY_SEPARATOR}{b}{KEY_SEPARATOR}{c}")
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b] = self.0;
        write!(f, "{a}{KEY_SEPARATOR}{b}")
    }
}

/// Parses `N` separator-joined tile ids, requiring distinct in-range ids.
fn parse_tile_ids<const N: usize>(s: &str) -> Result<[u8; N], PlacementError> {
    let invalid = || PlacementError::InvalidSpot(s.to_string());
    let mut ids = [0u8; N];
    let mut parts = s.split(KEY_SEPARATOR);
    for slot in ids.iter_mut() {
        let part = parts.next().ok_or_else(invalid)?;
        let id: u8 = part.trim().parse().map_err(|_| invalid())?;
        if id as usize >= TILE_COUNT {
            return Err(invalid());
        }
        *slot = id;
    }
    if parts.next().is_some() {
        return Err(invalid());
    }
    ids.sort_unstable();
    if ids.windows(2).any(|w| w[0] == w[1]) {
        return Err(invalid());
    }
    Ok(ids)
}

impl FromStr for NodeKey {
    type Err = PlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_tile_ids::<3>(s).map(NodeKey)
    }
}

impl FromStr for EdgeKey {
    type Err = PlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_tile_ids::<2>(s).map(EdgeKey)
    }
}

impl Serialize for NodeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for EdgeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EdgeKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
