//! Abilities domain: role-gated locomotion abilities and their shared
//! timers, meters, and mutual-exclusion rules.
//!
//! Engine-independent apart from `bevy::math` and logging; the `movement`
//! domain adapts it to ECS, input, and avian2d.

mod capability;
mod machine;
mod meters;
mod resolver;
mod tether;
mod tuning;

#[cfg(test)]
mod tests;

pub use capability::{Ability, CapabilityTable, Role, RoleCapabilities};
pub use machine::{
    AbilityInput, AbilityStateMachine, AimSample, CastHit, CharacterId, CharacterProfile,
    FallOutcome, PhysicsQueries, QueryMask, RayHit, SurfaceMaterial, TickContext, Trigger,
};
pub use tether::aim_angle;
pub use tuning::{AttributeTiers, CharacterStats, Stat, TuningTables};
