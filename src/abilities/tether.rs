//! Abilities domain: tether projection for the grapple hook and link beam.

use bevy::prelude::*;

/// A straight segment from `origin` to `end`, expressed the way sprites
/// consume it: rotation about the origin plus length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TetherVisual {
    pub origin: Vec2,
    pub end: Vec2,
    /// Radians, counter-clockwise from +X.
    pub angle: f32,
    pub length: f32,
}

impl TetherVisual {
    pub fn between(origin: Vec2, end: Vec2) -> Self {
        let offset = end - origin;
        Self {
            origin,
            end,
            angle: aim_angle(offset),
            length: offset.length(),
        }
    }

    pub fn midpoint(&self) -> Vec2 {
        self.origin.lerp(self.end, 0.5)
    }
}

/// Cursor rotation for an aim direction. Zero vectors map to 0.
pub fn aim_angle(direction: Vec2) -> f32 {
    if direction == Vec2::ZERO {
        return 0.0;
    }
    direction.y.atan2(direction.x)
}
