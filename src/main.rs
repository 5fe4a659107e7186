mod abilities;
mod combat;
mod content;
mod core;
mod movement;

use avian2d::prelude::*;
use bevy::prelude::*;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Role Abilities".to_string(),
                resolution: (1280, 720).into(),
                resizable: true,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(PhysicsPlugins::default().with_length_unit(24.0))
        .insert_resource(Gravity::ZERO)
        .add_plugins((
            core::CorePlugin,
            content::ContentPlugin,
            combat::CombatPlugin,
            movement::MovementPlugin,
        ))
        .run();
}
