//! Movement domain: Bevy and avian2d adapters around the ability state
//! machine. Input, spatial queries, collision events, and visuals live here;
//! the rules live in `abilities`.

mod bootstrap;
mod components;
#[cfg(feature = "dev-tools")]
mod dev;
mod events;
mod resources;
mod systems;


use bevy::prelude::*;

use crate::core::GameState;

pub use components::{AimCursor, GameLayer, Hazard, Player, TetherKind, TetherSprite, Wall};
pub use events::PlayerInput;
pub use resources::{
    CharacterIdAllocator, CharacterIndex, ControlScheme, ControlState, PointerWorld,
};

/// Frame order for the character pipeline.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum MovementSet {
    Sync,
    Input,
    Collisions,
    Tick,
    WriteBack,
    Visuals,
}

pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ControlState>()
            .init_resource::<PointerWorld>()
            .init_resource::<CharacterIndex>()
            .init_resource::<CharacterIdAllocator>()
            .add_message::<PlayerInput>()
            .configure_sets(
                Update,
                (
                    MovementSet::Sync,
                    MovementSet::Input,
                    MovementSet::Collisions,
                    MovementSet::Tick,
                    MovementSet::WriteBack,
                    MovementSet::Visuals,
                )
                    .chain()
                    .run_if(in_state(GameState::Run)),
            )
            .add_systems(OnEnter(GameState::Run), bootstrap::spawn_roster)
            .add_systems(Update, systems::sync_characters.in_set(MovementSet::Sync))
            .add_systems(
                Update,
                (
                    systems::detect_control_scheme,
                    systems::update_pointer_world,
                    systems::keyboard_mouse_input,
                    systems::gamepad_input,
                    systems::apply_player_input,
                )
                    .chain()
                    .in_set(MovementSet::Input),
            )
            .add_systems(
                Update,
                (systems::detect_wall_contacts, systems::detect_hazard_entry)
                    .chain()
                    .in_set(MovementSet::Collisions),
            )
            .add_systems(Update, systems::tick_abilities.in_set(MovementSet::Tick))
            .add_systems(
                Update,
                (systems::write_back_motion, systems::settle_dead_bodies)
                    .chain()
                    .in_set(MovementSet::WriteBack),
            )
            .add_systems(
                Update,
                (systems::update_aim_cursors, systems::update_tethers).in_set(MovementSet::Visuals),
            );

        #[cfg(feature = "dev-tools")]
        app.add_systems(OnEnter(GameState::Run), dev::spawn_test_arena)
            .add_systems(
                Update,
                dev::dump_player_abilities.run_if(in_state(GameState::Run)),
            );
    }
}
