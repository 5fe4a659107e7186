//! Movement domain: per-frame ability ticks and physics write-back.

use avian2d::prelude::*;
use bevy::ecs::message::MessageReader;
use bevy::prelude::*;

use crate::abilities::{AbilityStateMachine, SurfaceMaterial, TickContext};
use crate::combat::DeathEvent;
use crate::movement::systems::queries::AvianQueries;
use crate::movement::{CharacterIndex, ControlScheme, ControlState, Player, PointerWorld};

/// Bouncing bodies keep their speed off walls.
fn restitution_for(material: SurfaceMaterial) -> Restitution {
    match material {
        SurfaceMaterial::Normal => Restitution::new(0.0),
        SurfaceMaterial::Bouncy => Restitution::new(1.0).with_combine_rule(CoefficientCombine::Max),
    }
}

/// Pull integrated positions into the machines and rebuild the index the
/// link and peer lookups read.
pub(crate) fn sync_characters(
    mut index: ResMut<CharacterIndex>,
    mut machines: Query<(Entity, &mut AbilityStateMachine, &Transform)>,
) {
    index.clear();
    for (entity, mut machine, transform) in &mut machines {
        let position = transform.translation.truncate();
        machine.sync_position(position);
        index.insert(entity, machine.id(), position);
    }
}

pub(crate) fn tick_abilities(
    time: Res<Time>,
    spatial: SpatialQuery,
    index: Res<CharacterIndex>,
    control: Res<ControlState>,
    pointer: Res<PointerWorld>,
    mut machines: Query<(
        Entity,
        &mut AbilityStateMachine,
        &LinearVelocity,
        Has<Player>,
    )>,
) {
    let dt = time.delta_secs();
    let pointer_aim = match control.scheme {
        ControlScheme::KeyboardMouse => pointer.0,
        ControlScheme::Gamepad => None,
    };

    for (entity, mut machine, velocity, is_player) in &mut machines {
        let world = AvianQueries {
            spatial: &spatial,
            index: &index,
            exclude: entity,
        };
        let ctx = TickContext {
            dt,
            observed_velocity: Some(velocity.0),
            pointer: if is_player { pointer_aim } else { None },
        };
        machine.tick(ctx, &world);
    }
}

/// Push velocity, teleports, and the surface material back to physics.
/// Dead characters are left to physics, see `settle_dead_bodies`.
pub(crate) fn write_back_motion(
    mut bodies: Query<(
        &AbilityStateMachine,
        &mut LinearVelocity,
        &mut Transform,
        &mut Restitution,
    )>,
) {
    for (machine, mut velocity, mut transform, mut restitution) in &mut bodies {
        if !machine.is_alive() {
            continue;
        }

        velocity.0 = machine.velocity();

        let position = machine.position();
        if transform.translation.truncate() != position {
            transform.translation.x = position.x;
            transform.translation.y = position.y;
        }

        let wanted = restitution_for(machine.material());
        if *restitution != wanted {
            *restitution = wanted;
        }
    }
}

/// Push the velocity a character had when it died, once. After this the body
/// is left to physics.
pub(crate) fn settle_dead_bodies(
    mut deaths: MessageReader<DeathEvent>,
    mut bodies: Query<(&AbilityStateMachine, &mut LinearVelocity)>,
) {
    for death in deaths.read() {
        if let Ok((machine, mut velocity)) = bodies.get_mut(death.entity) {
            velocity.0 = machine.velocity();
        }
    }
}
