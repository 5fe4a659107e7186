//! ContentRegistry resource providing HashMap lookups for all loaded content.

use bevy::prelude::*;
use std::collections::HashMap;

use super::data::*;
use crate::abilities::{CapabilityTable, Role, RoleCapabilities, Stat, TuningTables};

/// Central registry for all loaded game content.
#[derive(Resource, Default)]
pub struct ContentRegistry {
    pub roles: HashMap<Role, RoleDef>,
    pub tuning: HashMap<String, TuningDef>,
    pub characters: HashMap<String, CharacterDef>,
}

impl ContentRegistry {
    /// Content used when the data files cannot be loaded: the shipped role
    /// table, an empty tuning table (every stat falls back to its built-in
    /// value) and one character per role, the first of them controlled.
    pub fn builtin() -> Self {
        let mut registry = Self::default();

        for (role, caps) in CapabilityTable::default().roles() {
            let mut abilities: Vec<_> = caps.abilities.iter().copied().collect();
            abilities.sort_by_key(|ability| *ability as u8);
            registry.roles.insert(
                *role,
                RoleDef {
                    role: *role,
                    abilities,
                    hovers: caps.hovers,
                },
            );
        }

        for (index, role) in Role::ALL.into_iter().enumerate() {
            let id = format!("{:?}", role).to_lowercase();
            registry.characters.insert(
                id.clone(),
                CharacterDef {
                    id,
                    name: format!("{:?}", role),
                    role,
                    tiers: Default::default(),
                    max_health: 100.0,
                    spawn: (-180.0 + 120.0 * index as f32, 0.0),
                    controlled: index == 0,
                },
            );
        }

        registry
    }

    /// Role permission matrix built from `roles.ron`.
    pub fn capability_table(&self) -> CapabilityTable {
        let roles = self
            .roles
            .values()
            .map(|def| {
                (
                    def.role,
                    RoleCapabilities::new(def.abilities.iter().copied(), def.hovers),
                )
            })
            .collect();
        CapabilityTable::new(roles)
    }

    /// Merges every tuning table. Later ids win on duplicate stats, so the
    /// merge order is sorted by id to stay deterministic.
    pub fn tuning_tables(&self) -> TuningTables {
        let mut defs: Vec<&TuningDef> = self.tuning.values().collect();
        defs.sort_by(|a, b| a.id.cmp(&b.id));

        let mut tables = TuningTables::default();
        for def in defs {
            let target: &mut HashMap<Stat, Vec<f32>> = match def.role {
                Some(role) => tables.per_role.entry(role).or_default(),
                None => &mut tables.base,
            };
            for (stat, values) in &def.stats {
                target.insert(*stat, values.clone());
            }
        }
        tables
    }

    /// Characters in a stable order (by id).
    pub fn roster(&self) -> Vec<&CharacterDef> {
        let mut roster: Vec<_> = self.characters.values().collect();
        roster.sort_by(|a, b| a.id.cmp(&b.id));
        roster
    }

    /// Returns a summary of loaded content counts for logging.
    pub fn summary(&self) -> String {
        format!(
            "ContentRegistry loaded:\n\
             - Roles: {}\n\
             - Tuning Tables: {}\n\
             - Characters: {}",
            self.roles.len(),
            self.tuning.len(),
            self.characters.len(),
        )
    }

    /// Returns total count of all loaded items.
    pub fn total_count(&self) -> usize {
        self.roles.len() + self.tuning.len() + self.characters.len()
    }
}
