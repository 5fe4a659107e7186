//! Movement domain: avian2d spatial queries behind the ability collaborator trait.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::abilities::{CastHit, CharacterId, PhysicsQueries, QueryMask, RayHit};
use crate::movement::{CharacterIndex, GameLayer};

/// Upper bound on hits collected by one link cast.
const MAX_CAST_HITS: u32 = 16;

/// Physics view for one character; its own collider is never reported.
pub(crate) struct AvianQueries<'a, 'w, 's> {
    pub spatial: &'a SpatialQuery<'w, 's>,
    pub index: &'a CharacterIndex,
    pub exclude: Entity,
}

impl AvianQueries<'_, '_, '_> {
    fn filter(&self, mask: QueryMask) -> SpatialQueryFilter {
        let layer = match mask {
            QueryMask::Walls => GameLayer::Wall,
            QueryMask::Characters => GameLayer::Character,
        };
        SpatialQueryFilter::from_mask(layer).with_excluded_entities([self.exclude])
    }
}

impl PhysicsQueries for AvianQueries<'_, '_, '_> {
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: QueryMask,
    ) -> Option<RayHit> {
        let direction = Dir2::new(direction).ok()?;
        self.spatial
            .cast_ray(origin, direction, max_distance, true, &self.filter(mask))
            .map(|hit| RayHit {
                point: origin + *direction * hit.distance,
                distance: hit.distance,
            })
    }

    fn boxcast(
        &self,
        origin: Vec2,
        size: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: QueryMask,
    ) -> Vec<CastHit> {
        let Ok(direction) = Dir2::new(direction) else {
            return Vec::new();
        };
        let shape = Collider::rectangle(size.x, size.y);
        self.spatial
            .shape_hits(
                &shape,
                origin,
                0.0,
                direction,
                MAX_CAST_HITS,
                &ShapeCastConfig::from_max_distance(max_distance),
                &self.filter(mask),
            )
            .into_iter()
            .map(|hit| CastHit {
                character: self.index.id_of(hit.entity),
                point: hit.point1,
                distance: hit.distance,
            })
            .collect()
    }

    fn overlap(&self, position: Vec2, size: Vec2, mask: QueryMask) -> bool {
        let shape = Collider::rectangle(size.x, size.y);
        !self
            .spatial
            .shape_intersections(&shape, position, 0.0, &self.filter(mask))
            .is_empty()
    }

    fn peer_position(&self, id: CharacterId) -> Option<Vec2> {
        self.index.position_of(id)
    }
}
