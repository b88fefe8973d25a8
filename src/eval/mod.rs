//! Position evaluation.
//!
//! Board-wide resource strengths, the per-spot settlement score used by the
//! search, the robber pressure model, and the evaluator that splits a finished
//! setup into per-player shares.

pub mod placeout;
pub mod robber;
pub mod settlement;
pub mod strength;

pub use placeout::{evaluate_placeout, PlaceoutEval, PlayerEval};
pub use robber::{predict_robber, RobberTarget};
pub use settlement::{score_settlement, spot_production, SettlementScore};
pub use strength::{board_production, relative_strengths, ResourceStrengths};

/// Softmax over `scores` scaled by `spread`. Higher spread sharpens the
/// distribution. Falls back to uniform weights if the exponentials vanish.
pub fn softmax_weights(scores: &[f64], spread: f64) -> Vec<f64> {
    if scores.is_empty() {
        return Vec::new();
    }
    let scaled: Vec<f64> = scores.iter().map(|s| s * spread).collect();
    let max = scaled.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scaled.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        exps.iter().map(|e| e / sum).collect()
    } else {
        vec![1.0 / scores.len() as f64; scores.len()]
    }
}
