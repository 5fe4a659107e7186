//! Data definitions for all RON content files.
//!
//! These structs mirror the structure in assets/data/*.ron and are used
//! for deserialization. The ContentRegistry provides lookup by id.

use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::abilities::{Ability, AttributeTiers, Role, Stat};

// ============================================================================
// Common wrapper for RON files with schema_version and items
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataFile<T> {
    pub schema_version: u32,
    pub items: Vec<T>,
}

// ============================================================================
// Roles (roles.ron)
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoleDef {
    pub role: Role,
    pub abilities: Vec<Ability>,
    #[serde(default)]
    pub hovers: bool,
}

// ============================================================================
// Tuning tables (tuning.ron)
// ============================================================================

/// One tuning table. `role: None` is the shared base table; a role table
/// overrides individual stats for that role only.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TuningDef {
    pub id: String,
    #[serde(default)]
    pub role: Option<Role>,
    /// Per-tier values, indexed by the stat's governing attribute tier.
    pub stats: HashMap<Stat, Vec<f32>>,
}

// ============================================================================
// Roster (characters.ron)
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CharacterDef {
    pub id: String,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub tiers: AttributeTiers,
    pub max_health: f32,
    pub spawn: (f32, f32),
    /// Driven by local input rather than left idle as a link target.
    #[serde(default)]
    pub controlled: bool,
}

// ============================================================================
// Gameplay defaults (gameplay_defaults.ron)
// ============================================================================

#[derive(Resource, Debug, Clone, Deserialize, Serialize)]
pub struct GameplayDefaults {
    pub schema_version: u32,
    /// Character collider size; also the teleport-destination footprint.
    pub character_size: (f32, f32),
    /// Box swept along the aim when searching for a link peer.
    pub link_probe_size: (f32, f32),
}

impl GameplayDefaults {
    pub fn character_size(&self) -> Vec2 {
        Vec2::new(self.character_size.0, self.character_size.1)
    }

    pub fn link_probe_size(&self) -> Vec2 {
        Vec2::new(self.link_probe_size.0, self.link_probe_size.1)
    }
}

impl Default for GameplayDefaults {
    fn default() -> Self {
        Self {
            schema_version: 1,
            character_size: (24.0, 24.0),
            link_probe_size: (16.0, 16.0),
        }
    }
}
