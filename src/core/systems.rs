//! Core domain: boot flow and camera setup.

use bevy::prelude::*;

use crate::content::ContentRegistry;
use crate::core::state::GameState;

/// Leave Boot once content (loaded or built-in) is available.
pub(crate) fn finish_boot(
    registry: Option<Res<ContentRegistry>>,
    mut game_state: ResMut<NextState<GameState>>,
) {
    if registry.is_some() {
        info!("Content ready, entering run");
        game_state.set(GameState::Run);
    }
}

pub(crate) fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
