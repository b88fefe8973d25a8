//! Tiles, resources, and ports.
//!
//! A tile is stored in the positional `[resource_id, number_token]` form used
//! by HDCS snapshots. Resource ids 0-4 are the producing resources, 5 is the
//! desert and 6 is open ocean. A number token of -1 marks a port tile; the
//! resource id is then repurposed as the port type.

use serde::{Deserialize, Serialize};

/// Number of tiles on the board, including the ocean ring.
pub const TILE_COUNT: usize = 37;

/// Number of producing resources.
pub const RESOURCE_COUNT: usize = 5;

/// Resource id of a desert tile.
pub const DESERT_ID: u8 = 5;

/// Resource id of an ocean tile.
pub const OCEAN_ID: u8 = 6;

/// Number token that marks a port tile.
pub const PORT_TOKEN: i8 = -1;

/// A producing resource. Discriminants match the HDCS resource ids, which is
/// also how it serializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "u8")]
#[repr(u8)]
pub enum Resource {
    Wood = 0,
    Brick = 1,
    Wool = 2,
    Grain = 3,
    Ore = 4,
}

/// All resources in id order.
pub const ALL_RESOURCES: [Resource; RESOURCE_COUNT] = [
    Resource::Wood,
    Resource::Brick,
    Resource::Wool,
    Resource::Grain,
    Resource::Ore,
];

/// Complement pairs whose joint availability matters for building costs.
pub const COMPLEMENT_PAIRS: [(Resource, Resource); 2] = [
    (Resource::Wood, Resource::Brick),
    (Resource::Grain, Resource::Ore),
];

impl Resource {
    /// Returns the resource for an HDCS resource id, if it is a producing one.
    pub const fn from_id(id: u8) -> Option<Resource> {
        match id {
            0 => Some(Resource::Wood),
            1 => Some(Resource::Brick),
            2 => Some(Resource::Wool),
            3 => Some(Resource::Grain),
            4 => Some(Resource::Ore),
            _ => None,
        }
    }

    /// Index into per-resource arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The complementary resource, if any. Wool has none.
    pub const fn complement(self) -> Option<Resource> {
        match self {
            Resource::Wood => Some(Resource::Brick),
            Resource::Brick => Some(Resource::Wood),
            Resource::Grain => Some(Resource::Ore),
            Resource::Ore => Some(Resource::Grain),
            Resource::Wool => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Resource::Wood => "wood",
            Resource::Brick => "brick",
            Resource::Wool => "wool",
            Resource::Grain => "grain",
            Resource::Ore => "ore",
        }
    }
}

impl From<Resource> for u8 {
    fn from(r: Resource) -> u8 {
        r as u8
    }
}

/// Pip weight of a dice number: 2->1, 3->2, ..., 6->5, 8->5, ..., 12->1.
/// Seven and anything outside 2..=12 produce nothing.
#[inline]
pub const fn pips(number: i8) -> u8 {
    match number {
        2 | 12 => 1,
        3 | 11 => 2,
        4 | 10 => 3,
        5 | 9 => 4,
        6 | 8 => 5,
        _ => 0,
    }
}

/// One hex of the board in positional `[resource_id, number_token]` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(u8, i8)", into = "(u8, i8)")]
pub struct Tile {
    pub resource: u8,
    pub number: i8,
}

impl From<(u8, i8)> for Tile {
    fn from((resource, number): (u8, i8)) -> Self {
        Tile { resource, number }
    }
}

impl From<Tile> for (u8, i8) {
    fn from(tile: Tile) -> Self {
        (tile.resource, tile.number)
    }
}

impl Tile {
    /// A producing land tile.
    pub const fn land(resource: Resource, number: i8) -> Self {
        Tile {
            resource: resource as u8,
            number,
        }
    }

    pub const fn desert() -> Self {
        Tile {
            resource: DESERT_ID,
            number: 0,
        }
    }

    pub const fn ocean() -> Self {
        Tile {
            resource: OCEAN_ID,
            number: 0,
        }
    }

    /// An ocean tile carrying a port.
    pub fn port(kind: PortKind) -> Self {
        Tile {
            resource: kind.into(),
            number: PORT_TOKEN,
        }
    }

    /// Ocean and port tiles are water; land is everything else.
    #[inline]
    pub const fn is_water(self) -> bool {
        self.resource == OCEAN_ID || self.number == PORT_TOKEN
    }

    /// The resource this tile produces, if it carries a dice number.
    #[inline]
    pub const fn produces(self) -> Option<Resource> {
        if self.number >= 2 {
            Resource::from_id(self.resource)
        } else {
            None
        }
    }

    /// Pip weight of this tile's production (0 for water and desert).
    #[inline]
    pub const fn pips(self) -> u8 {
        match self.produces() {
            Some(_) => pips(self.number),
            None => 0,
        }
    }

    /// Checks the resource/number combination. Returns a description of the
    /// problem when the tile cannot appear on a real board.
    pub fn check(self) -> Result<(), String> {
        match self.number {
            PORT_TOKEN if self.resource <= DESERT_ID => Ok(()),
            PORT_TOKEN => Err(format!("port tile with type {}", self.resource)),
            0 if self.resource <= OCEAN_ID => Ok(()),
            2..=6 | 8..=12 if self.resource <= 4 => Ok(()),
            n => Err(format!(
                "resource {} cannot carry number token {}",
                self.resource, n
            )),
        }
    }
}

/// Trade rate granted by a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PortKind {
    /// 2:1 for one resource.
    Specific(Resource),
    /// 3:1 for any resource.
    General,
}

/// HDCS port type id of a 3:1 port.
pub const GENERAL_PORT_ID: u8 = 5;

impl PortKind {
    /// Index into a six-entry port-strength table (resources 0-4, general 5).
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PortKind::Specific(r) => r as usize,
            PortKind::General => GENERAL_PORT_ID as usize,
        }
    }
}

impl TryFrom<u8> for PortKind {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        if id == GENERAL_PORT_ID {
            return Ok(PortKind::General);
        }
        Resource::from_id(id)
            .map(PortKind::Specific)
            .ok_or_else(|| format!("unknown port type {}", id))
    }
}

impl From<PortKind> for u8 {
    fn from(kind: PortKind) -> u8 {
        kind.index() as u8
    }
}
