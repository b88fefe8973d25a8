//! Board-wide resource strength.
//!
//! A resource is worth more when the board makes little of it overall and
//! when it is plentiful relative to its building complement. Both ratios are
//! multiplied into the base strength and the product is dampened with a
//! power law.

use crate::board::state::BoardState;
use crate::board::tile::{Resource, ALL_RESOURCES, RESOURCE_COUNT};
use crate::config::EvalConfig;
use crate::error::{PlacementError, Result};

/// Stand-in ratio when the denominator resource has no production.
pub const SCARCITY_CAP: f64 = 20.0;

/// Number of entries in a port strength table (five 2:1 ports, then 3:1).
pub const PORT_KINDS: usize = RESOURCE_COUNT + 1;

/// Pip production per resource over every land tile. The robber does not
/// change what the board produces.
pub fn board_production(board: &BoardState) -> [f64; RESOURCE_COUNT] {
    let mut production = [0.0; RESOURCE_COUNT];
    for tile in board.tiles() {
        if let Some(r) = tile.produces() {
            production[r.index()] += tile.pips() as f64;
        }
    }
    production
}

fn check_production(production: &[f64; RESOURCE_COUNT]) -> Result<()> {
    for r in ALL_RESOURCES {
        let p = production[r.index()];
        if !p.is_finite() || p < 0.0 {
            return Err(PlacementError::Configuration(format!(
                "{} production is {}",
                r.name(),
                p
            )));
        }
    }
    Ok(())
}

/// `1 / production`, or the cap when nothing is produced.
fn scarcity(production: f64) -> f64 {
    if production > 0.0 {
        1.0 / production
    } else {
        SCARCITY_CAP
    }
}

/// Production of `r` over that of its complement; 1 for wool.
fn pairwise(production: &[f64; RESOURCE_COUNT], r: Resource) -> f64 {
    match r.complement() {
        None => 1.0,
        Some(c) if production[c.index()] > 0.0 => production[r.index()] / production[c.index()],
        Some(_) => SCARCITY_CAP,
    }
}

/// Dampened relative strength per resource.
///
/// `raw = base * scarcity * pairwise`, then `raw ^ dampening`. A raw value of
/// zero stays zero. Fails on negative or non-finite production, or if the
/// result is not finite.
pub fn relative_strengths(
    production: &[f64; RESOURCE_COUNT],
    base: &[f64; RESOURCE_COUNT],
    dampening: f64,
) -> Result<[f64; RESOURCE_COUNT]> {
    check_production(production)?;
    let mut out = [0.0; RESOURCE_COUNT];
    for r in ALL_RESOURCES {
        let raw = base[r.index()] * scarcity(production[r.index()]) * pairwise(production, r);
        let dampened = if raw > 0.0 { raw.powf(dampening) } else { 0.0 };
        if !dampened.is_finite() {
            return Err(PlacementError::Configuration(format!(
                "{} strength is not finite ({} ^ {})",
                r.name(),
                raw,
                dampening
            )));
        }
        out[r.index()] = dampened;
    }
    Ok(out)
}

/// Strength of each port kind.
///
/// A 2:1 port is worth the dampened production of its resource divided by
/// the second-highest dampened production on the board; a 3:1 port is 1.
pub fn port_strengths(production: &[f64; RESOURCE_COUNT], dampening: f64) -> [f64; PORT_KINDS] {
    let mut yields = [0.0; RESOURCE_COUNT];
    for (y, &p) in yields.iter_mut().zip(production) {
        *y = if p > 0.0 { p.powf(dampening) } else { 0.0 };
    }
    let mut sorted = yields;
    sorted.sort_by(|a, b| b.total_cmp(a));
    let norm = if sorted[1] > 0.0 { sorted[1] } else { 1.0 };

    let mut out = [1.0; PORT_KINDS];
    for (o, y) in out.iter_mut().zip(yields) {
        *o = y / norm;
    }
    out
}

/// Everything the settlement scorer needs from the board as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceStrengths {
    pub production: [f64; RESOURCE_COUNT],
    pub values: [f64; RESOURCE_COUNT],
    pub ports: [f64; PORT_KINDS],
}

impl ResourceStrengths {
    pub fn compute(board: &BoardState, config: &EvalConfig) -> Result<Self> {
        let production = board_production(board);
        let values = relative_strengths(
            &production,
            &config.base_resource_strength,
            config.dampening_factor,
        )?;
        let ports = port_strengths(&production, config.dampening_factor);
        Ok(ResourceStrengths {
            production,
            values,
            ports,
        })
    }

    #[inline]
    pub fn of(&self, r: Resource) -> f64 {
        self.values[r.index()]
    }
}
