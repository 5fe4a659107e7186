//! Movement domain: character bootstrap from roster and tuning data.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::abilities::{
    AbilityStateMachine, CapabilityTable, CharacterProfile, CharacterStats, Role, TuningTables,
};
use crate::content::{CharacterDef, ContentRegistry, GameplayDefaults};
use crate::movement::{
    AimCursor, CharacterIdAllocator, GameLayer, Player, TetherKind, TetherSprite,
};

fn role_color(role: Role) -> Color {
    match role {
        Role::Decoy => Color::srgb(0.95, 0.75, 0.3),
        Role::Support => Color::srgb(0.45, 0.85, 0.55),
        Role::Observer => Color::srgb(0.55, 0.65, 0.95),
        Role::Tank => Color::srgb(0.85, 0.4, 0.4),
    }
}

/// Spawn every roster character. Runs on entering GameState::Run.
pub(crate) fn spawn_roster(
    mut commands: Commands,
    registry: Option<Res<ContentRegistry>>,
    defaults: Option<Res<GameplayDefaults>>,
    mut ids: ResMut<CharacterIdAllocator>,
    existing: Query<(), With<AbilityStateMachine>>,
) {
    if !existing.is_empty() {
        info!("Characters already exist, skipping spawn");
        return;
    }

    let builtin;
    let registry = match registry.as_deref() {
        Some(registry) => registry,
        None => {
            warn!("ContentRegistry not available, using built-in roster");
            builtin = ContentRegistry::builtin();
            &builtin
        }
    };
    let defaults = defaults.as_deref().cloned().unwrap_or_default();

    let capabilities = registry.capability_table();
    let tables = registry.tuning_tables();

    for def in registry.roster() {
        spawn_character(
            &mut commands,
            &mut ids,
            def,
            &capabilities,
            &tables,
            &defaults,
        );
    }
}

fn spawn_character(
    commands: &mut Commands,
    ids: &mut CharacterIdAllocator,
    def: &CharacterDef,
    capabilities: &CapabilityTable,
    tables: &TuningTables,
    defaults: &GameplayDefaults,
) {
    let size = defaults.character_size();
    let position = Vec2::new(def.spawn.0, def.spawn.1);
    let stats = CharacterStats::resolve(tables, def.role, &def.tiers);
    let profile = CharacterProfile {
        id: ids.allocate(),
        role: def.role,
        tiers: def.tiers,
        footprint: size,
        link_probe: defaults.link_probe_size(),
    };

    info!(
        "Spawning character {} '{}': role={:?}, tiers={:?}, health={}, controlled={}",
        profile.id, def.name, def.role, def.tiers, def.max_health, def.controlled
    );

    let machine = AbilityStateMachine::new(
        profile,
        stats,
        capabilities.for_role(def.role),
        position,
        def.max_health,
    );

    let mut entity = commands.spawn((
        Name::new(def.name.clone()),
        machine,
        // Rendering
        Sprite {
            color: role_color(def.role),
            custom_size: Some(size),
            ..default()
        },
        Transform::from_xyz(position.x, position.y, 1.0),
        // Physics
        (
            RigidBody::Dynamic,
            Collider::rectangle(size.x, size.y),
            LockedAxes::ROTATION_LOCKED,
            LinearVelocity::default(),
            GravityScale(0.0),
            Friction::new(0.0),
            Restitution::new(0.0),
            CollisionEventsEnabled,
            CollisionLayers::new(
                GameLayer::Character,
                [GameLayer::Wall, GameLayer::Character, GameLayer::Hazard],
            ),
        ),
    ));

    if def.controlled {
        entity.insert(Player);
    }

    entity.with_children(|parent| {
        parent.spawn((
            AimCursor {
                radius: size.max_element(),
            },
            Sprite {
                color: Color::srgb(0.95, 0.95, 0.95),
                custom_size: Some(Vec2::new(10.0, 4.0)),
                ..default()
            },
            Transform::from_xyz(size.max_element(), 0.0, 0.5),
        ));
        for (kind, color) in [
            (TetherKind::Grapple, Color::srgb(0.8, 0.7, 0.5)),
            (TetherKind::Link, Color::srgb(0.5, 0.9, 0.95)),
        ] {
            parent.spawn((
                TetherSprite(kind),
                Sprite {
                    color,
                    custom_size: Some(Vec2::new(1.0, 2.0)),
                    ..default()
                },
                Transform::from_xyz(0.0, 0.0, -0.5),
                Visibility::Hidden,
            ));
        }
    });
}
