//! Movement domain: aim cursor and tether sprites.

use bevy::prelude::*;

use crate::abilities::{AbilityStateMachine, aim_angle};
use crate::movement::{AimCursor, TetherKind, TetherSprite};

pub(crate) fn update_aim_cursors(
    owners: Query<&AbilityStateMachine>,
    mut cursors: Query<(&ChildOf, &AimCursor, &mut Transform)>,
) {
    for (child_of, cursor, mut transform) in &mut cursors {
        let Ok(machine) = owners.get(child_of.parent()) else {
            continue;
        };
        let aim = machine.aim_direction();
        transform.translation = (aim * cursor.radius).extend(transform.translation.z);
        transform.rotation = Quat::from_rotation_z(aim_angle(aim));
    }
}

/// Tether sprites are unit-length along X and stretched to the tether.
pub(crate) fn update_tethers(
    owners: Query<&AbilityStateMachine>,
    mut tethers: Query<(&ChildOf, &TetherSprite, &mut Transform, &mut Visibility)>,
) {
    for (child_of, sprite, mut transform, mut visibility) in &mut tethers {
        let Ok(machine) = owners.get(child_of.parent()) else {
            continue;
        };
        let tether = match sprite.0 {
            TetherKind::Grapple => machine.grapple_tether(),
            TetherKind::Link => machine.link_tether(),
        };

        let Some(tether) = tether else {
            *visibility = Visibility::Hidden;
            continue;
        };

        // Children move with the owner, so place the midpoint relative to it.
        let local = tether.midpoint() - machine.position();
        transform.translation = local.extend(transform.translation.z);
        transform.rotation = Quat::from_rotation_z(tether.angle);
        transform.scale.x = tether.length.max(f32::EPSILON);
        *visibility = Visibility::Inherited;
    }
}
