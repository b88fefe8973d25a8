//! Settlers setup engine library.
//!
//! Exposes the board model, settlement evaluation, the placement search and
//! the HDCS protocol for use by integration tests and the binary entry point.

pub mod board;
pub mod bot;
pub mod config;
pub mod error;
pub mod eval;
pub mod protocol;
pub mod search;

pub use config::Config;
pub use error::{PlacementError, Result};
