//! Knockout bracket generation: an automatic seeded scheduler and a static,
//! declaratively-described one, sharing display-name and ranking helpers.

pub mod automatic;
pub mod seeding;
pub mod static_;

use crate::ids::Tla;

/// Placeholder used where a bracket slot cannot yet be resolved to a real
/// team (e.g. an incomplete league, or a still-unplayed earlier match).
pub const UNKNOWABLE_TEAM: &str = "???";

pub fn unknowable_tla() -> Tla {
    Tla::new(UNKNOWABLE_TEAM)
}

/// The standard display name for a knockout match, keyed off how many
/// rounds remain (including this one) before the final.
///
/// `rounds_remaining == 0` is the final; `1` is a semi-final, `2` a
/// quarter-final; anything further back just gets "Match {num}".
/// `round_match_index` numbers a match within its own round, starting at 0,
/// and is only used for semi/quarter labels.
pub fn knockout_display_name(
    rounds_remaining: u32,
    round_match_index: usize,
    match_number: crate::ids::MatchNumber,
) -> String {
    match rounds_remaining {
        0 => format!("Final (#{})", match_number),
        1 => format!("Semi {} (#{})", round_match_index + 1, match_number),
        2 => format!("Quarter {} (#{})", round_match_index + 1, match_number),
        _ => format!("Match {}", match_number),
    }
}
