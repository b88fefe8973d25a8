//! Result rendering for the command line.

use std::fmt::Write;

use serde::Serialize;

use crate::board::state::Placement;
use crate::bot::OptionAssessment;
use crate::error::{PlacementError, Result};

/// Formats one placement as `player:settlement/road`.
pub fn format_placement(p: &Placement) -> String {
    format!("{}:{}/{}", p.player, p.settlement, p.road)
}

/// Human-readable ranking, listing up to `placeouts` likeliest placeouts per
/// option.
pub fn format_assessments(assessed: &[OptionAssessment], placeouts: usize) -> String {
    let mut out = String::new();
    if assessed.is_empty() {
        out.push_str("no setup placements left\n");
        return out;
    }
    for (rank, a) in assessed.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. settle {} road {}  score {:.3}  expected share {:.4}",
            rank + 1,
            a.placement.settlement,
            a.placement.road,
            a.score,
            a.expected_share
        );
        for p in a.placeouts.iter().take(placeouts) {
            let trail: Vec<String> = p.trail.iter().skip(1).map(format_placement).collect();
            let _ = writeln!(
                out,
                "      p={:.4} share={:.4}  {}",
                p.probability,
                p.share,
                trail.join(" ")
            );
        }
    }
    out
}

#[derive(Serialize)]
struct Report<'a> {
    options: &'a [OptionAssessment],
}

/// The ranking as a JSON object `{"options": [...]}`.
pub fn assessments_json(assessed: &[OptionAssessment]) -> Result<String> {
    serde_json::to_string_pretty(&Report { options: assessed })
        .map_err(|e| PlacementError::Configuration(format!("cannot encode report: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::PlaceoutShare;

    fn placement(settlement: &str, road: &str, player: u8) -> Placement {
        Placement {
            settlement: settlement.parse().unwrap(),
            road: road.parse().unwrap(),
            player,
        }
    }

    fn sample() -> Vec<OptionAssessment> {
        let option = placement("5_10_11", "10_11", 0);
        vec![OptionAssessment {
            placement: option,
            score: 20.5,
            expected_share: 0.3,
            placeouts: vec![PlaceoutShare {
                probability: 1.0,
                share: 0.3,
                trail: vec![option, placement("12_18_19", "12_18", 1)],
            }],
        }]
    }

    #[test]
    fn text_lists_options_and_placeouts() {
        let text = format_assessments(&sample(), 3);
        assert!(text.contains(" 1. settle 5_10_11 road 10_11"));
        assert!(text.contains("expected share 0.3000"));
        assert!(text.contains("p=1.0000 share=0.3000  1:12_18_19/12_18"));
        assert_eq!(format_assessments(&[], 3), "no setup placements left\n");
    }

    #[test]
    fn json_uses_key_strings() {
        let json = assessments_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = &value["options"][0];
        assert_eq!(first["placement"]["settlement"], "5_10_11");
        assert_eq!(first["placement"]["road"], "10_11");
        assert_eq!(first["placeouts"][0]["trail"][1]["player"], 1);
    }
}
