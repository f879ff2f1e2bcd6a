//! Cross-checks the venue layout against the shepherding file and the team
//! roster. Grounded on `sr/comp/venue.py`'s `Venue` (no source survives in
//! the retrieved pack, only `tests/test_venue.py`'s expectations).

use crate::documents::{LayoutDocument, ShepherdingDocument};
use crate::errors::{EngineError, EngineResult};
use crate::ids::Tla;
use crate::validation::{FieldError, ValidationErrors};
use std::collections::HashSet;

/// Runs every venue cross-check, in the order a caller would want to see
/// them reported: unknown region references first, then the layout/roster
/// partition, then the shepherding/layout region match.
pub fn validate_venue(layout: &LayoutDocument, shepherding: &ShepherdingDocument, roster: &[Tla]) -> EngineResult<()> {
    check_known_regions(layout, shepherding)?;
    check_layout_covers_roster(layout, roster)?;
    check_shepherding_areas_match_regions(layout, shepherding)?;
    Ok(())
}

/// Every region a shepherding area names must be a region the layout
/// actually defines.
fn check_known_regions(layout: &LayoutDocument, shepherding: &ShepherdingDocument) -> EngineResult<()> {
    let region_names: HashSet<&str> = layout.teams.iter().map(|r| r.name.as_str()).collect();
    let mut errors = ValidationErrors::new();
    for area in &shepherding.shepherds {
        for region in &area.regions {
            if !region_names.contains(region.as_str()) {
                errors.add(
                    FieldError::builder()
                        .set_field("region")
                        .add_user_defined_code("unknown_region")
                        .add_message(format!("shepherding area '{}' references unknown region '{region}'", area.name))
                        .add_params("area".into(), area.name.clone())
                        .add_params("region".into(), region.clone())
                        .build(),
                );
            }
        }
    }
    errors.into_result().map_err(EngineError::InvalidRegion)
}

/// The layout's regions, taken together, must contain every roster team
/// exactly once: no team missing, none extra, none duplicated across
/// regions.
fn check_layout_covers_roster(layout: &LayoutDocument, roster: &[Tla]) -> EngineResult<()> {
    let roster_set: HashSet<&Tla> = roster.iter().collect();
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    let mut all_layout_teams = HashSet::new();

    for region in &layout.teams {
        for team in &region.teams {
            if !seen.insert(team.clone()) {
                duplicates.push(team.clone());
            }
            all_layout_teams.insert(team.clone());
        }
    }

    let extras: Vec<Tla> = all_layout_teams.iter().filter(|t| !roster_set.contains(*t)).cloned().collect();
    let missing: Vec<Tla> = roster.iter().filter(|t| !all_layout_teams.contains(*t)).cloned().collect();

    if extras.is_empty() && missing.is_empty() && duplicates.is_empty() {
        Ok(())
    } else {
        Err(EngineError::LayoutTeams { missing, extras, duplicates })
    }
}

/// The shepherding file's area names must match the layout's region names
/// exactly — same set, neither side missing an entry.
fn check_shepherding_areas_match_regions(layout: &LayoutDocument, shepherding: &ShepherdingDocument) -> EngineResult<()> {
    let region_names: HashSet<&str> = layout.teams.iter().map(|r| r.name.as_str()).collect();
    let area_names: HashSet<&str> = shepherding.shepherds.iter().flat_map(|s| s.regions.iter().map(String::as_str)).collect();

    let missing: Vec<String> = region_names.iter().filter(|r| !area_names.contains(*r)).map(|s| s.to_string()).collect();
    let extras: Vec<String> = area_names.iter().filter(|a| !region_names.contains(*a)).map(|s| s.to_string()).collect();

    if missing.is_empty() && extras.is_empty() {
        Ok(())
    } else {
        Err(EngineError::ShepherdingAreas { missing, extras })
    }
}
