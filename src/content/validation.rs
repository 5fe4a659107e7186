//! Validation for cross-references and value ranges in content definitions.

use super::data::*;
use super::registry::ContentRegistry;
use crate::abilities::Stat;

/// A validation error with context about what failed.
#[derive(Debug)]
pub struct ValidationError {
    pub source_type: &'static str,
    pub source_id: String,
    pub field: &'static str,
    pub detail: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} '{}' field '{}': {}",
            self.source_type, self.source_id, self.field, self.detail
        )
    }
}

/// Helper macro for checking a reference exists
macro_rules! check_ref {
    ($errors:expr, $registry_map:expr, $source_type:expr, $source_id:expr, $field:expr, $target_type:expr, $ref_id:expr) => {
        if !$registry_map.contains_key($ref_id) {
            $errors.push(ValidationError {
                source_type: $source_type,
                source_id: $source_id.to_string(),
                field: $field,
                detail: format!("references missing {} '{:?}'", $target_type, $ref_id),
            });
        }
    };
}

/// Helper macro for range checks
macro_rules! check_value {
    ($errors:expr, $cond:expr, $source_type:expr, $source_id:expr, $field:expr, $($detail:tt)+) => {
        if !$cond {
            $errors.push(ValidationError {
                source_type: $source_type,
                source_id: $source_id.to_string(),
                field: $field,
                detail: format!($($detail)+),
            });
        }
    };
}

/// Validate all cross-references in the registry.
/// Returns a list of validation errors, empty if all references are valid.
pub fn validate_content(registry: &ContentRegistry) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    // Roster
    let mut controlled = Vec::new();
    for (id, character) in &registry.characters {
        check_ref!(
            errors,
            registry.roles,
            "Character",
            id,
            "role",
            "Role",
            &character.role
        );
        check_value!(
            errors,
            character.max_health > 0.0,
            "Character",
            id,
            "max_health",
            "must be positive, got {}",
            character.max_health
        );
        if character.controlled {
            controlled.push(id.as_str());
        }
    }
    controlled.sort_unstable();
    if controlled.len() > 1 {
        errors.push(ValidationError {
            source_type: "Roster",
            source_id: controlled.join(","),
            field: "controlled",
            detail: "more than one locally controlled character".to_string(),
        });
    }

    // Roles
    for (role, def) in &registry.roles {
        let mut abilities = def.abilities.clone();
        abilities.sort_by_key(|ability| *ability as u8);
        abilities.dedup();
        check_value!(
            errors,
            abilities.len() == def.abilities.len(),
            "Role",
            format!("{:?}", role),
            "abilities",
            "lists an ability more than once"
        );
    }

    // Tuning tables
    for (id, def) in &registry.tuning {
        if let Some(role) = &def.role {
            check_ref!(errors, registry.roles, "Tuning", id, "role", "Role", role);
        }
        for (stat, values) in &def.stats {
            check_value!(
                errors,
                !values.is_empty(),
                "Tuning",
                id,
                "stats",
                "{:?} has no tiers",
                stat
            );
            check_value!(
                errors,
                values.iter().all(|value| value.is_finite() && *value >= 0.0),
                "Tuning",
                id,
                "stats",
                "{:?} has a negative or non-finite value",
                stat
            );
        }
        check_charge_range(
            &mut errors,
            id,
            def,
            Stat::TeleportMinCharge,
            Stat::TeleportMaxCharge,
        );
        check_charge_range(&mut errors, id, def, Stat::BounceMinCharge, Stat::BounceMaxCharge);
    }

    errors
}

/// Charge fractions divide by max, and charging starts at min.
fn check_charge_range(
    errors: &mut Vec<ValidationError>,
    id: &str,
    def: &TuningDef,
    min_stat: Stat,
    max_stat: Stat,
) {
    let (Some(min), Some(max)) = (def.stats.get(&min_stat), def.stats.get(&max_stat)) else {
        return;
    };
    for (tier, (min, max)) in min.iter().zip(max).enumerate() {
        check_value!(
            errors,
            *max > 0.0 && min <= max,
            "Tuning",
            id,
            "stats",
            "{:?}/{:?} tier {} needs min <= max and max > 0, got {} and {}",
            min_stat,
            max_stat,
            tier,
            min,
            max
        );
    }
}
