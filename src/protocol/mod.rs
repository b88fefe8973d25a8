//! Input and output formats.
//!
//! HDCS snapshots in, ranked options out as text or JSON.

pub mod hdcs;
pub mod report;

pub use hdcs::{parse_board, parse_hdcs, HdcsDocument, MapSection, Meta, PlayerEntry};
pub use report::{assessments_json, format_assessments, format_placement};
