//! Combat domain: health and death notification.

mod events;
mod health;
mod systems;


use bevy::prelude::*;

pub use events::DeathEvent;
pub use health::{Health, Hurtable};

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<DeathEvent>()
            .add_systems(PostUpdate, systems::log_deaths);
    }
}
