//! Search and planning.
//!
//! Ranks open settlement spots, predicts how each seat will place, and plays
//! the rest of the setup forward as a pruned probability tree.

pub mod options;
pub mod predict;
pub mod simulate;

pub use options::{rank_open_spots, top_open_spots, NoExtension, OptionSource, ScoredSpot};
pub use predict::{margin_probabilities, pick_road, predict, Prediction};
pub use simulate::{
    expand, next_seat, prune, simulate, simulate_option, top_options, Branch, OptionResult,
};
