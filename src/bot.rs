//! Setup bot.
//!
//! Simulates the top options for the seat to move, scores every placeout
//! with the placeout evaluator and ranks options by the share the mover can
//! expect.

use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::board::state::{BoardState, Placement};
use crate::config::Config;
use crate::error::Result;
use crate::eval::placeout::evaluate_placeout;
use crate::search::options::OptionSource;
use crate::search::simulate::{simulate, Branch, OptionResult};

/// One placeout as seen by the mover.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceoutShare {
    pub probability: f64,
    /// The mover's share of the finished board.
    pub share: f64,
    pub trail: Vec<Placement>,
}

/// A simulated option with its expected share.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionAssessment {
    pub placement: Placement,
    pub score: f64,
    /// Probability-weighted share over the placeouts.
    pub expected_share: f64,
    pub placeouts: Vec<PlaceoutShare>,
}

fn share_of(branch: &Branch, option: &OptionResult, config: &Config) -> Result<PlaceoutShare> {
    let eval = evaluate_placeout(&branch.board, config)?;
    Ok(PlaceoutShare {
        probability: branch.probability,
        share: eval.share(option.placement.player),
        trail: branch.trail.clone(),
    })
}

/// Scores already simulated options. The result is best first; equal
/// expectations are ordered by settlement key.
pub fn assess(results: &[OptionResult], config: &Config) -> Result<Vec<OptionAssessment>> {
    let mut assessed = Vec::with_capacity(results.len());
    for option in results {
        let placeouts: Vec<PlaceoutShare> = if config.search.parallel {
            option
                .placeouts
                .par_iter()
                .map(|b| share_of(b, option, config))
                .collect::<Result<_>>()?
        } else {
            option
                .placeouts
                .iter()
                .map(|b| share_of(b, option, config))
                .collect::<Result<_>>()?
        };
        let expected_share: f64 = placeouts.iter().map(|p| p.probability * p.share).sum();
        assessed.push(OptionAssessment {
            placement: option.placement,
            score: option.score,
            expected_share,
            placeouts,
        });
    }
    assessed.sort_by(|a, b| {
        b.expected_share
            .total_cmp(&a.expected_share)
            .then_with(|| a.placement.settlement.cmp(&b.placement.settlement))
    });
    Ok(assessed)
}

/// Simulates and scores the options for the seat to move.
pub fn assess_options(
    board: &BoardState,
    config: &Config,
    source: &dyn OptionSource,
) -> Result<Vec<OptionAssessment>> {
    let results = simulate(board, config, source)?;
    let assessed = assess(&results, config)?;
    if let Some(best) = assessed.first() {
        info!(
            settlement = %best.placement.settlement,
            road = %best.placement.road,
            expected_share = best.expected_share,
            "best option"
        );
    }
    Ok(assessed)
}

/// The placement with the highest expected share, or `None` once setup is
/// over.
pub fn best_placement(
    board: &BoardState,
    config: &Config,
    source: &dyn OptionSource,
) -> Result<Option<Placement>> {
    Ok(assess_options(board, config, source)?
        .first()
        .map(|a| a.placement))
}
