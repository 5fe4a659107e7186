//! Combat domain: combat-related events.

use bevy::ecs::message::Message;
use bevy::prelude::*;

use crate::abilities::CharacterId;

/// Emitted once when a character's health reaches zero.
#[derive(Debug)]
pub struct DeathEvent {
    pub entity: Entity,
    pub character: CharacterId,
    /// What dealt the killing blow, for the log line.
    pub cause: &'static str,
}

impl Message for DeathEvent {}
