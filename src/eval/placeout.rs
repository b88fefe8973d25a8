//! Finished-setup evaluation.
//!
//! Splits a board with every setup placement made into per-player shares
//! that sum to 1. Production is discounted by expected robber pressure,
//! boosted where a player holds both halves of a complement pair on the same
//! number, and combined with flat bonuses for strategy, road and city
//! potential, port access and a penalty for missing grain. Finally every
//! player picks a rival to pressure, and each targeting costs the target.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::board::keys::NodeKey;
use crate::board::state::{BoardState, PlayerId, MAX_PLAYERS};
use crate::board::tile::{PortKind, Resource, COMPLEMENT_PAIRS, RESOURCE_COUNT, TILE_COUNT};
use crate::config::{Config, PlaceoutConfig};
use crate::error::Result;

use super::robber::predict_robber;
use super::strength::relative_strengths;

type Production = [f64; RESOURCE_COUNT];

/// Score breakdown for one player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerEval {
    pub player: PlayerId,
    /// Final score after targeting penalties.
    pub total_score: f64,
    /// Pips before robber pressure and pair bonus.
    pub raw_production: Production,
    /// Pips after robber pressure.
    pub base_production: Production,
    /// Pips after robber pressure and pair bonus.
    pub paired_production: Production,
    /// 0 leans wood/brick, 1 leans ore/grain/wool.
    pub strategy_index: f64,
    pub production_pairs: Vec<(Resource, Resource)>,
    pub has_port_access: bool,
    pub target: Option<PlayerId>,
    pub breakdown: BTreeMap<&'static str, f64>,
}

/// Shares per seat plus the per-player detail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceoutEval {
    /// Indexed by seat; absent seats hold 0.
    pub shares: [f64; MAX_PLAYERS],
    pub players: Vec<PlayerEval>,
}

impl PlaceoutEval {
    #[inline]
    pub fn share(&self, player: PlayerId) -> f64 {
        self.shares.get(player as usize).copied().unwrap_or(0.0)
    }
}

/// Per-tile production a player collects: `tile_value` times the building
/// multiplier, times the pair bonus on `pair_tiles`.
fn player_production(
    board: &BoardState,
    player: PlayerId,
    tile_value: &[f64; TILE_COUNT],
    pair_tiles: &BTreeSet<u8>,
    pair_bonus: f64,
) -> Production {
    let mut production = [0.0; RESOURCE_COUNT];
    for (node, building) in board.buildings_of(player) {
        let mult = building.kind.multiplier() as f64;
        for id in node.tiles() {
            let Some(r) = board.tile(id).and_then(|t| t.produces()) else {
                continue;
            };
            let pair = if pair_tiles.contains(&id) { pair_bonus } else { 1.0 };
            production[r.index()] += tile_value[id as usize] * mult * pair;
        }
    }
    production
}

/// Complement pairs a player touches on the same dice number, and the tiles
/// that form them.
fn production_pairs(board: &BoardState, player: PlayerId) -> (Vec<(Resource, Resource)>, BTreeSet<u8>) {
    let mut by_number: BTreeMap<i8, BTreeMap<Resource, BTreeSet<u8>>> = BTreeMap::new();
    for (node, _) in board.buildings_of(player) {
        for id in node.tiles() {
            let Some(tile) = board.tile(id) else { continue };
            if let Some(r) = tile.produces() {
                by_number
                    .entry(tile.number)
                    .or_default()
                    .entry(r)
                    .or_default()
                    .insert(id);
            }
        }
    }

    let mut pairs = Vec::new();
    let mut tiles = BTreeSet::new();
    for (a, b) in COMPLEMENT_PAIRS {
        for resources in by_number.values() {
            if let (Some(ta), Some(tb)) = (resources.get(&a), resources.get(&b)) {
                pairs.push((a, b));
                tiles.extend(ta);
                tiles.extend(tb);
            }
        }
    }
    (pairs, tiles)
}

/// 0 for pure wood/brick, 1 for pure ore/grain/wool, 0.5 when neither.
fn strategy_index(p: &Production) -> f64 {
    let wb = p[Resource::Wood.index()].min(p[Resource::Brick.index()]);
    let ows = p[Resource::Ore.index()]
        .min(p[Resource::Grain.index()])
        .min(p[Resource::Wool.index()]);
    let total = wb + ows;
    if total <= 0.0 {
        0.5
    } else {
        ows / total
    }
}

/// Open port spots reachable from any of `player`'s buildings within the
/// configured road window.
fn reachable_ports(board: &BoardState, player: PlayerId, config: &PlaceoutConfig) -> Vec<(NodeKey, PortKind)> {
    let mut out = Vec::new();
    for (start, _) in board.buildings_of(player) {
        let reach = board.road_reach(start, config.port_reach_max);
        for (node, kind) in board.ports() {
            if board.is_occupied(node) {
                continue;
            }
            if let Some(r) = reach.get(node) {
                if (config.port_reach_min..=config.port_reach_max).contains(&r.distance) {
                    out.push((*node, *kind));
                }
            }
        }
    }
    out
}

fn has_port_access(
    board: &BoardState,
    player: PlayerId,
    base: &Production,
    config: &PlaceoutConfig,
) -> bool {
    reachable_ports(board, player, config)
        .iter()
        .any(|(_, kind)| match kind {
            PortKind::General => true,
            PortKind::Specific(r) => base[r.index()] >= config.port_min_pips,
        })
}

/// Penalty for a player short on grain: none on a 3:1 port, one unit if an
/// open 3:1 port is within reach, three otherwise.
fn no_wheat_penalty(board: &BoardState, player: PlayerId, raw: &Production, config: &PlaceoutConfig) -> f64 {
    if raw[Resource::Grain.index()] > config.no_wheat_threshold {
        return 0.0;
    }
    let on_general = board
        .buildings_of(player)
        .any(|(n, _)| board.port_at(n) == Some(PortKind::General));
    if on_general {
        return 0.0;
    }
    let incoming = reachable_ports(board, player, config)
        .iter()
        .any(|(_, kind)| *kind == PortKind::General);
    if incoming {
        config.no_wheat
    } else {
        3.0 * config.no_wheat
    }
}

/// Index of the maximum score among `candidates`, first on ties.
fn strongest(candidates: impl Iterator<Item = (usize, f64)>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, s) in candidates {
        if best.map_or(true, |(_, b)| s > b) {
            best = Some((i, s));
        }
    }
    best.map(|(i, _)| i)
}

/// Scores every seated player on a finished setup board.
pub fn evaluate_placeout(board: &BoardState, config: &Config) -> Result<PlaceoutEval> {
    let cfg = &config.placeout;
    let players = board.players();
    if players.is_empty() {
        return Ok(PlaceoutEval {
            shares: [1.0 / MAX_PLAYERS as f64; MAX_PLAYERS],
            players: Vec::new(),
        });
    }

    let mut rob = [0.0; TILE_COUNT];
    for (_, targets) in predict_robber(board, &config.eval, cfg)? {
        for t in targets {
            rob[t.tile as usize] += t.probability / MAX_PLAYERS as f64;
        }
    }

    let mut raw_value = [0.0; TILE_COUNT];
    let mut actual_value = [0.0; TILE_COUNT];
    for id in 0..TILE_COUNT {
        if let Some(tile) = board.tile(id as u8).filter(|t| t.produces().is_some()) {
            raw_value[id] = tile.pips() as f64;
            actual_value[id] = (1.0 - rob[id]) * tile.pips() as f64;
        }
    }

    let no_pairs = BTreeSet::new();
    let mut raw = Vec::with_capacity(players.len());
    let mut base = Vec::with_capacity(players.len());
    let mut paired = Vec::with_capacity(players.len());
    let mut pairs = Vec::with_capacity(players.len());
    for &p in players {
        raw.push(player_production(board, p, &raw_value, &no_pairs, 1.0));
        base.push(player_production(board, p, &actual_value, &no_pairs, 1.0));
        let (found, tiles) = production_pairs(board, p);
        paired.push(player_production(board, p, &actual_value, &tiles, cfg.prod_pair_bonus));
        pairs.push(found);
    }

    let mut board_total = [0.0; RESOURCE_COUNT];
    for b in &base {
        for (t, v) in board_total.iter_mut().zip(b) {
            *t += v;
        }
    }
    let strengths = relative_strengths(&board_total, &config.eval.base_resource_strength, cfg.dampening)?;

    let strategy: Vec<f64> = paired.iter().map(strategy_index).collect();
    let min_strategy = strategy.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_strategy = strategy.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let extremes: Vec<f64> = strategy.iter().map(|s| (s - 0.5).abs()).collect();
    let max_extreme = extremes.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let road: Vec<f64> = paired
        .iter()
        .map(|p| p[Resource::Wood.index()] + p[Resource::Brick.index()])
        .collect();
    let city: Vec<f64> = paired
        .iter()
        .map(|p| p[Resource::Ore.index()] + p[Resource::Grain.index()])
        .collect();
    let max_road = road.iter().cloned().fold(0.0, f64::max);
    let max_city = city.iter().cloned().fold(0.0, f64::max);

    let mut evals = Vec::with_capacity(players.len());
    for (i, &player) in players.iter().enumerate() {
        let mut breakdown = BTreeMap::new();
        let total_prod: f64 = paired[i].iter().sum();
        breakdown.insert("total_prod", total_prod * cfg.total_multiplier);
        let valued: f64 = paired[i].iter().zip(&strengths).map(|(p, s)| p * s).sum();
        breakdown.insert("valued_prod", valued * cfg.total_valued_multiplier);

        if strategy[i] == min_strategy {
            breakdown.insert("wb_bonus", cfg.wb_bonus);
        }
        if strategy[i] == max_strategy {
            breakdown.insert("ows_bonus", cfg.ows_bonus);
        }
        if extremes[i] == max_extreme {
            breakdown.insert("extreme_bonus", cfg.extreme_bonus);
        }
        if max_road > 0.0 && road[i] == max_road {
            breakdown.insert("road_bonus", cfg.best_road_bonus);
        }
        if max_city > 0.0 && city[i] == max_city {
            breakdown.insert("city_bonus", cfg.best_city_bonus);
        }
        let port_access = has_port_access(board, player, &base[i], cfg);
        if port_access {
            breakdown.insert("port_bonus", cfg.portability_bonus);
        }
        let penalty = no_wheat_penalty(board, player, &raw[i], cfg);
        if penalty > 0.0 {
            breakdown.insert("no_wheat_penalty", -penalty);
        }

        evals.push(PlayerEval {
            player,
            total_score: breakdown.values().sum(),
            raw_production: raw[i],
            base_production: base[i],
            paired_production: paired[i],
            strategy_index: strategy[i],
            production_pairs: std::mem::take(&mut pairs[i]),
            has_port_access: port_access,
            target: None,
            breakdown,
        });
    }

    // each player targets the strongest rival on the same side of the
    // strategy split who is ahead of them, else the strongest rival overall
    let before: Vec<f64> = evals.iter().map(|e| e.total_score).collect();
    let mut times_targeted = vec![0usize; evals.len()];
    for i in 0..evals.len() {
        let wb = strategy[i] < 0.5;
        let same_side = strongest(
            (0..evals.len())
                .filter(|&j| j != i && (strategy[j] < 0.5) == wb && before[j] > before[i])
                .map(|j| (j, before[j])),
        );
        let target = same_side.or_else(|| {
            strongest((0..evals.len()).filter(|&j| j != i).map(|j| (j, before[j])))
        });
        if let Some(j) = target {
            evals[i].target = Some(players[j]);
            times_targeted[j] += 1;
        }
    }
    for (e, count) in evals.iter_mut().zip(&times_targeted) {
        if *count > 0 {
            let penalty = cfg.target_penalty * *count as f64;
            e.breakdown.insert("target_penalty", -penalty);
            e.total_score -= penalty;
        }
    }

    let total: f64 = evals.iter().map(|e| e.total_score).sum();
    let mut shares = [0.0; MAX_PLAYERS];
    for e in &evals {
        shares[e.player as usize] = if total > 0.0 {
            e.total_score / total
        } else {
            1.0 / evals.len() as f64
        };
    }

    Ok(PlaceoutEval {
        shares,
        players: evals,
    })
}
