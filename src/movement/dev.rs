//! Movement domain: debug-only test arena.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::abilities::{Ability, AbilityStateMachine};
use crate::movement::{GameLayer, Hazard, Player, Wall};

fn spawn_wall(commands: &mut Commands, center: Vec2, size: Vec2) {
    commands.spawn((
        Wall,
        Sprite {
            color: Color::srgb(0.3, 0.3, 0.4),
            custom_size: Some(size),
            ..default()
        },
        Transform::from_xyz(center.x, center.y, 0.0),
        RigidBody::Static,
        Collider::rectangle(size.x, size.y),
        CollisionLayers::new(GameLayer::Wall, [GameLayer::Character]),
    ));
}

fn spawn_hole(commands: &mut Commands, center: Vec2, size: Vec2) {
    commands.spawn((
        Hazard,
        Sprite {
            color: Color::srgb(0.08, 0.08, 0.1),
            custom_size: Some(size),
            ..default()
        },
        Transform::from_xyz(center.x, center.y, -1.0),
        RigidBody::Static,
        Collider::rectangle(size.x, size.y),
        Sensor,
        CollisionLayers::new(GameLayer::Hazard, [GameLayer::Character]),
    ));
}

/// A walled box with a few pillars to grapple to and holes to fall into.
pub(crate) fn spawn_test_arena(mut commands: Commands) {
    let half = Vec2::new(420.0, 260.0);
    let thickness = 40.0;

    // Boundary
    spawn_wall(
        &mut commands,
        Vec2::new(0.0, half.y),
        Vec2::new(half.x * 2.0 + thickness, thickness),
    );
    spawn_wall(
        &mut commands,
        Vec2::new(0.0, -half.y),
        Vec2::new(half.x * 2.0 + thickness, thickness),
    );
    spawn_wall(
        &mut commands,
        Vec2::new(-half.x, 0.0),
        Vec2::new(thickness, half.y * 2.0),
    );
    spawn_wall(
        &mut commands,
        Vec2::new(half.x, 0.0),
        Vec2::new(thickness, half.y * 2.0),
    );

    // Pillars
    spawn_wall(&mut commands, Vec2::new(-260.0, 120.0), Vec2::new(40.0, 80.0));
    spawn_wall(&mut commands, Vec2::new(260.0, -120.0), Vec2::new(40.0, 80.0));
    spawn_wall(&mut commands, Vec2::new(0.0, -160.0), Vec2::new(120.0, 30.0));

    // Holes
    spawn_hole(&mut commands, Vec2::new(-60.0, -60.0), Vec2::new(80.0, 60.0));
    spawn_hole(&mut commands, Vec2::new(300.0, 140.0), Vec2::new(90.0, 90.0));
    spawn_hole(&mut commands, Vec2::new(-320.0, -170.0), Vec2::new(70.0, 50.0));

    info!("Spawned test arena");
}

/// F1 logs the controlled character's stamina and ability phases.
pub(crate) fn dump_player_abilities(
    keyboard: Res<ButtonInput<KeyCode>>,
    players: Query<&AbilityStateMachine, With<Player>>,
) {
    if !keyboard.just_pressed(KeyCode::F1) {
        return;
    }
    let Ok(machine) = players.single() else {
        return;
    };

    let stamina = machine.stamina();
    info!(
        "[DEBUG] Character {} ({:?}): stamina {:.2}/{:.2}{}, sprinting={}, exclusive={:?}",
        machine.id(),
        machine.role(),
        stamina.value(),
        stamina.capacity(),
        if stamina.is_locked() { " (locked)" } else { "" },
        machine.is_sprinting(),
        machine.exclusive_active()
    );

    for ability in Ability::ALL {
        if !machine.capabilities().permits(ability) {
            continue;
        }
        let Some(phase) = machine.phase(ability) else {
            continue;
        };
        let state = if let Some(charge) = phase.charge() {
            format!("charging {:.2}", charge)
        } else if phase.is_active() {
            format!("active, {:.2}s left", phase.timer())
        } else if phase.cooldown() > 0.0 {
            format!("cooling down, {:.2}s left", phase.cooldown())
        } else {
            "ready".to_string()
        };
        info!("[DEBUG]   {:?}: {}", ability, state);
    }
}
