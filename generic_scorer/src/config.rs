//! Configuration for the generic, zone-weighted [`crate::GenericScorer`].
//!
//! Example configuration:
//! ```json
//! {
//!     "zone_points": { "low": 4, "high": 10 },
//!     "bonus_per_team_in_zone": 2
//! }
//! ```

use serde::{Deserialize, Serialize};
use srcomp_engine::validation::{FieldError, ValidationErrors};
use std::collections::HashMap;

/// Points awarded per occupied zone, plus a flat bonus counted once per
/// team per zone it occupies alongside at least one other team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericScorerConfig {
    pub zone_points: HashMap<String, i64>,
    #[serde(default)]
    pub bonus_per_team_in_zone: i64,
}

impl Default for GenericScorerConfig {
    fn default() -> Self {
        Self {
            zone_points: HashMap::new(),
            bonus_per_team_in_zone: 0,
        }
    }
}

impl GenericScorerConfig {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errs = ValidationErrors::new();
        if self.zone_points.is_empty() {
            errs.add(
                FieldError::builder()
                    .set_field("zone_points")
                    .add_user_defined_code("invalid_value")
                    .add_message("at least one zone must carry a point value")
                    .build(),
            );
        }
        for (zone, points) in &self.zone_points {
            if *points < 0 {
                errs.add(
                    FieldError::builder()
                        .set_field("zone_points")
                        .add_user_defined_code("invalid_value")
                        .add_message(format!("zone \"{zone}\" carries a negative point value"))
                        .build(),
                );
            }
        }
        if self.bonus_per_team_in_zone < 0 {
            errs.add(
                FieldError::builder()
                    .set_field("bonus_per_team_in_zone")
                    .add_user_defined_code("invalid_value")
                    .add_message("bonus_per_team_in_zone cannot be negative")
                    .build(),
            );
        }
        errs.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_rejected_for_having_no_zones() {
        assert!(GenericScorerConfig::default().validate().is_err());
    }

    #[test]
    fn negative_zone_points_are_rejected() {
        let config = GenericScorerConfig {
            zone_points: [("low".to_string(), -1)].into_iter().collect(),
            bonus_per_team_in_zone: 0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn sensible_config_passes() {
        let config = GenericScorerConfig {
            zone_points: [("low".to_string(), 4), ("high".to_string(), 10)].into_iter().collect(),
            bonus_per_team_in_zone: 2,
        };
        assert!(config.validate().is_ok());
    }
}
