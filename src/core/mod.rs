//! Core domain: app state and shared setup.

mod state;
mod systems;

use bevy::prelude::*;

pub use state::GameState;

pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .add_systems(Startup, systems::setup_camera)
            .add_systems(
                Update,
                systems::finish_boot.run_if(in_state(GameState::Boot)),
            );
    }
}
