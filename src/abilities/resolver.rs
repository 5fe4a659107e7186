//! Abilities domain: velocity derived from ability state and motion intent.

use bevy::prelude::*;

use crate::abilities::machine::{AbilityStateMachine, ExclusiveAbility};

pub struct MovementResolver;

impl MovementResolver {
    /// The velocity the character should have right now. Dead characters
    /// keep whatever they had.
    pub fn resolve(machine: &AbilityStateMachine) -> Vec2 {
        if !machine.is_alive() {
            return machine.velocity();
        }

        let stats = machine.stats();
        match machine.exclusive_active() {
            Some(ExclusiveAbility::FallRecovery | ExclusiveAbility::Steady) => Vec2::ZERO,
            Some(ExclusiveAbility::Dash) => machine.dash_direction() * stats.dash_speed,
            Some(ExclusiveAbility::Bounce) => machine.bounce_direction() * stats.bounce_speed,
            Some(ExclusiveAbility::Grapple) => machine.grapple_direction() * stats.grapple_speed,
            None => Self::intent_velocity(machine),
        }
    }

    /// Walk or sprint along the move input, zero when idle.
    pub fn intent_velocity(machine: &AbilityStateMachine) -> Vec2 {
        let intent = machine.intent();
        if !intent.moving {
            return Vec2::ZERO;
        }

        let stats = machine.stats();
        let speed = if machine.is_sprinting() {
            stats.sprint_speed
        } else {
            stats.walk_speed
        };
        intent.move_direction * speed
    }
}
