//! Movement domain: collision-event adapters for wall contact and holes.

use avian2d::prelude::*;
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::abilities::{AbilityStateMachine, FallOutcome};
use crate::combat::DeathEvent;
use crate::movement::{Hazard, Wall};

/// Orders a collision pair as (character, other) when one side is a character.
fn character_pair(
    event: &CollisionStart,
    machines: &Query<&mut AbilityStateMachine>,
) -> Option<(Entity, Entity)> {
    if machines.contains(event.collider1) {
        Some((event.collider1, event.collider2))
    } else if machines.contains(event.collider2) {
        Some((event.collider2, event.collider1))
    } else {
        None
    }
}

pub(crate) fn detect_wall_contacts(
    mut collisions: MessageReader<CollisionStart>,
    walls: Query<(), With<Wall>>,
    mut machines: Query<&mut AbilityStateMachine>,
) {
    for event in collisions.read() {
        let Some((character, other)) = character_pair(event, &machines) else {
            continue;
        };
        if !walls.contains(other) {
            continue;
        }
        if let Ok(mut machine) = machines.get_mut(character) {
            machine.on_wall_contact();
        }
    }
}

pub(crate) fn detect_hazard_entry(
    mut collisions: MessageReader<CollisionStart>,
    hazards: Query<(), With<Hazard>>,
    mut machines: Query<&mut AbilityStateMachine>,
    mut deaths: MessageWriter<DeathEvent>,
) {
    for event in collisions.read() {
        let Some((character, other)) = character_pair(event, &machines) else {
            continue;
        };
        if !hazards.contains(other) {
            continue;
        }
        let Ok(mut machine) = machines.get_mut(character) else {
            continue;
        };

        if let FallOutcome::Fell { died: true, .. } = machine.on_hazard_enter() {
            deaths.write(DeathEvent {
                entity: character,
                character: machine.id(),
                cause: "fell into a hole",
            });
        }
    }
}
