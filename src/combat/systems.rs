//! Combat domain: death bookkeeping.

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;

use crate::abilities::AbilityStateMachine;
use crate::combat::events::DeathEvent;

/// Dead characters stay in the world and ignore input; we only report them.
pub(crate) fn log_deaths(
    mut deaths: MessageReader<DeathEvent>,
    machines: Query<&AbilityStateMachine>,
) {
    for death in deaths.read() {
        let role = machines
            .get(death.entity)
            .map(|machine| format!("{:?}", machine.role()))
            .unwrap_or_else(|_| "unknown".to_string());
        info!(
            "Character {} ({}) died: {}",
            death.character, role, death.cause
        );
    }
}
