//! Movement domain: input messages for the controlled character.

use bevy::ecs::message::Message;

use crate::abilities::AbilityInput;

/// One sampled input, produced by whichever control scheme is active.
#[derive(Debug, Clone, Copy)]
pub struct PlayerInput(pub AbilityInput);

impl Message for PlayerInput {}
