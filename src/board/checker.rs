//! Distance-rule audit for finished placeouts.

use super::keys::NodeKey;
use super::state::BoardState;
use super::topology::topology;

/// Checks that no two buildings on a board share a node or neighbour one
/// another.
#[derive(Debug, Default, Clone, Copy)]
pub struct SettlementChecker;

impl SettlementChecker {
    /// Every pair of buildings closer than two roads apart, in key order.
    pub fn conflicts(&self, board: &BoardState) -> Vec<(NodeKey, NodeKey)> {
        let topo = topology();
        let keys: Vec<&NodeKey> = board.nodes().keys().collect();
        let mut out = Vec::new();
        for (i, a) in keys.iter().enumerate() {
            for b in &keys[i + 1..] {
                if topo.node_distance(a, b).map_or(false, |d| d <= 1) {
                    out.push((**a, **b));
                }
            }
        }
        out
    }

    #[inline]
    pub fn is_clean(&self, board: &BoardState) -> bool {
        self.conflicts(board).is_empty()
    }
}
