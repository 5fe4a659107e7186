//! Abilities domain: attribute tiers and per-tier tuning lookup.

use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::abilities::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Attribute {
    Mobility,
    Intelligence,
    Strength,
    Steadfastness,
}

/// Integer levels indexing the tuning tables. No upper bound is assumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct AttributeTiers {
    pub mobility: u32,
    pub intelligence: u32,
    pub strength: u32,
    pub steadfastness: u32,
}

impl AttributeTiers {
    pub fn tier(&self, attribute: Attribute) -> u32 {
        match attribute {
            Attribute::Mobility => self.mobility,
            Attribute::Intelligence => self.intelligence,
            Attribute::Strength => self.strength,
            Attribute::Steadfastness => self.steadfastness,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Stat {
    WalkSpeed,
    SprintSpeed,
    SprintDuration,
    DashSpeed,
    DashDuration,
    DashCooldown,
    TeleportDistance,
    TeleportCooldown,
    TeleportMinCharge,
    TeleportMaxCharge,
    BounceSpeed,
    BounceDuration,
    BounceCooldown,
    BounceMinCharge,
    BounceMaxCharge,
    GrappleRange,
    GrappleSpeed,
    GrappleDuration,
    GrappleCooldown,
    SteadyDuration,
    SteadyCooldown,
    LinkRange,
    FallDamage,
    FallRecoverTime,
}

impl Stat {
    /// The attribute whose tier selects this stat's value.
    pub fn attribute(self) -> Attribute {
        use Stat::*;
        match self {
            WalkSpeed | SprintSpeed | SprintDuration | DashSpeed | DashDuration | DashCooldown
            | BounceSpeed | BounceDuration | BounceCooldown | BounceMinCharge
            | BounceMaxCharge => Attribute::Mobility,
            TeleportDistance | TeleportCooldown | TeleportMinCharge | TeleportMaxCharge
            | LinkRange => Attribute::Intelligence,
            GrappleRange | GrappleSpeed | GrappleDuration | GrappleCooldown => Attribute::Strength,
            SteadyDuration | SteadyCooldown | FallDamage | FallRecoverTime => {
                Attribute::Steadfastness
            }
        }
    }
}

/// `table[stat][tier]` with optional per-role overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TuningTables {
    pub base: HashMap<Stat, Vec<f32>>,
    pub per_role: HashMap<Role, HashMap<Stat, Vec<f32>>>,
}

impl TuningTables {
    /// Tiers past the end of a table clamp to its last entry.
    pub fn lookup(&self, role: Role, stat: Stat, tier: u32) -> Option<f32> {
        let table = self
            .per_role
            .get(&role)
            .and_then(|overrides| overrides.get(&stat))
            .or_else(|| self.base.get(&stat))?;
        let last = table.len().checked_sub(1)?;
        table.get((tier as usize).min(last)).copied()
    }
}

/// Every tuning value a character needs, resolved once at spawn.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterStats {
    pub walk_speed: f32,
    pub sprint_speed: f32,
    pub sprint_duration: f32,
    pub dash_speed: f32,
    pub dash_duration: f32,
    pub dash_cooldown: f32,
    pub teleport_distance: f32,
    pub teleport_cooldown: f32,
    pub teleport_min_charge: f32,
    pub teleport_max_charge: f32,
    pub bounce_speed: f32,
    pub bounce_duration: f32,
    pub bounce_cooldown: f32,
    pub bounce_min_charge: f32,
    pub bounce_max_charge: f32,
    pub grapple_range: f32,
    pub grapple_speed: f32,
    pub grapple_duration: f32,
    pub grapple_cooldown: f32,
    pub steady_duration: f32,
    pub steady_cooldown: f32,
    pub link_range: f32,
    pub fall_damage: f32,
    pub fall_recover_time: f32,
}

impl Default for CharacterStats {
    fn default() -> Self {
        Self {
            walk_speed: 160.0,
            sprint_speed: 280.0,
            sprint_duration: 2.0,
            dash_speed: 640.0,
            dash_duration: 0.2,
            dash_cooldown: 1.0,
            teleport_distance: 200.0,
            teleport_cooldown: 2.0,
            teleport_min_charge: 1.0,
            teleport_max_charge: 2.0,
            bounce_speed: 420.0,
            bounce_duration: 1.0,
            bounce_cooldown: 2.0,
            bounce_min_charge: 1.0,
            bounce_max_charge: 2.0,
            grapple_range: 320.0,
            grapple_speed: 520.0,
            grapple_duration: 0.8,
            grapple_cooldown: 1.5,
            steady_duration: 2.0,
            steady_cooldown: 2.0,
            link_range: 260.0,
            fall_damage: 10.0,
            fall_recover_time: 1.5,
        }
    }
}

impl CharacterStats {
    pub fn get(&self, stat: Stat) -> f32 {
        use Stat::*;
        match stat {
            WalkSpeed => self.walk_speed,
            SprintSpeed => self.sprint_speed,
            SprintDuration => self.sprint_duration,
            DashSpeed => self.dash_speed,
            DashDuration => self.dash_duration,
            DashCooldown => self.dash_cooldown,
            TeleportDistance => self.teleport_distance,
            TeleportCooldown => self.teleport_cooldown,
            TeleportMinCharge => self.teleport_min_charge,
            TeleportMaxCharge => self.teleport_max_charge,
            BounceSpeed => self.bounce_speed,
            BounceDuration => self.bounce_duration,
            BounceCooldown => self.bounce_cooldown,
            BounceMinCharge => self.bounce_min_charge,
            BounceMaxCharge => self.bounce_max_charge,
            GrappleRange => self.grapple_range,
            GrappleSpeed => self.grapple_speed,
            GrappleDuration => self.grapple_duration,
            GrappleCooldown => self.grapple_cooldown,
            SteadyDuration => self.steady_duration,
            SteadyCooldown => self.steady_cooldown,
            LinkRange => self.link_range,
            FallDamage => self.fall_damage,
            FallRecoverTime => self.fall_recover_time,
        }
    }

    /// Resolve every stat for a role at the given tiers. Missing table
    /// entries fall back to the built-in defaults.
    pub fn resolve(tables: &TuningTables, role: Role, tiers: &AttributeTiers) -> Self {
        let fallback = Self::default();
        let get = |stat: Stat| {
            let tier = tiers.tier(stat.attribute());
            tables.lookup(role, stat, tier).unwrap_or_else(|| {
                warn!(
                    "No tuning for {:?} (role {:?}, tier {}), using default",
                    stat, role, tier
                );
                fallback.get(stat)
            })
        };

        Self {
            walk_speed: get(Stat::WalkSpeed),
            sprint_speed: get(Stat::SprintSpeed),
            sprint_duration: get(Stat::SprintDuration),
            dash_speed: get(Stat::DashSpeed),
            dash_duration: get(Stat::DashDuration),
            dash_cooldown: get(Stat::DashCooldown),
            teleport_distance: get(Stat::TeleportDistance),
            teleport_cooldown: get(Stat::TeleportCooldown),
            teleport_min_charge: get(Stat::TeleportMinCharge),
            teleport_max_charge: get(Stat::TeleportMaxCharge),
            bounce_speed: get(Stat::BounceSpeed),
            bounce_duration: get(Stat::BounceDuration),
            bounce_cooldown: get(Stat::BounceCooldown),
            bounce_min_charge: get(Stat::BounceMinCharge),
            bounce_max_charge: get(Stat::BounceMaxCharge),
            grapple_range: get(Stat::GrappleRange),
            grapple_speed: get(Stat::GrappleSpeed),
            grapple_duration: get(Stat::GrappleDuration),
            grapple_cooldown: get(Stat::GrappleCooldown),
            steady_duration: get(Stat::SteadyDuration),
            steady_cooldown: get(Stat::SteadyCooldown),
            link_range: get(Stat::LinkRange),
            fall_damage: get(Stat::FallDamage),
            fall_recover_time: get(Stat::FallRecoverTime),
        }
    }
}
