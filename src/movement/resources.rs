//! Movement domain: control scheme, pointer, and character lookup resources.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::abilities::CharacterId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlScheme {
    #[default]
    KeyboardMouse,
    Gamepad,
}

/// Whichever device was used last drives aim.
#[derive(Resource, Debug, Default)]
pub struct ControlState {
    pub scheme: ControlScheme,
}

/// Pointer position in world space, if the cursor is over the window.
#[derive(Resource, Debug, Default)]
pub struct PointerWorld(pub Option<Vec2>);

/// Non-owning lookup between entities and character ids, rebuilt every
/// frame. A missing id means the character has despawned.
#[derive(Resource, Debug, Default)]
pub struct CharacterIndex {
    pub by_entity: HashMap<Entity, CharacterId>,
    pub positions: HashMap<CharacterId, Vec2>,
}

impl CharacterIndex {
    pub fn clear(&mut self) {
        self.by_entity.clear();
        self.positions.clear();
    }

    pub fn insert(&mut self, entity: Entity, id: CharacterId, position: Vec2) {
        self.by_entity.insert(entity, id);
        self.positions.insert(id, position);
    }

    pub fn id_of(&self, entity: Entity) -> Option<CharacterId> {
        self.by_entity.get(&entity).copied()
    }

    pub fn position_of(&self, id: CharacterId) -> Option<Vec2> {
        self.positions.get(&id).copied()
    }
}

/// Hands out character ids; ids are never reused.
#[derive(Resource, Debug, Default)]
pub struct CharacterIdAllocator {
    next: u32,
}

impl CharacterIdAllocator {
    pub fn allocate(&mut self) -> CharacterId {
        self.next += 1;
        CharacterId(self.next)
    }
}
