//! Movement domain: components and physics layers for characters and the arena.

use avian2d::prelude::*;
use bevy::prelude::*;

/// Physics layers for collision filtering
#[derive(PhysicsLayer, Clone, Copy, Debug, Default)]
pub enum GameLayer {
    #[default]
    Default,
    /// Solid walls; grapple and teleport queries only see these
    Wall,
    /// Character bodies; link casts only see these
    Character,
    /// Holes (sensors) - characters fall in unless hovering
    Hazard,
}

/// The locally controlled character.
#[derive(Component, Debug)]
pub struct Player;

/// Marker for wall colliders
#[derive(Component, Debug)]
pub struct Wall;

/// Marker for hole sensors
#[derive(Component, Debug)]
pub struct Hazard;

/// Child sprite rotated to the owner's aim direction.
#[derive(Component, Debug)]
pub struct AimCursor {
    /// Distance from the owner's center.
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TetherKind {
    Grapple,
    Link,
}

/// Child sprite stretched along a grapple or link tether.
#[derive(Component, Debug)]
pub struct TetherSprite(pub TetherKind);
