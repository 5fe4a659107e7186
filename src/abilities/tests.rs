//! Abilities domain: tests for meters, role gating, transitions, and the
//! mutual-exclusion invariant.

use std::collections::HashMap;
use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::machine::ExclusiveAbility;
use super::meters::{AbilityPhase, ChargeMeter, Countdown, MeterDirection, PhaseEdge, ResourceMeter};
use super::tether::TetherVisual;
use super::{
    Ability, AbilityInput, AbilityStateMachine, AimSample, AttributeTiers, CapabilityTable,
    CastHit, CharacterId, CharacterProfile, CharacterStats, FallOutcome, PhysicsQueries,
    QueryMask, RayHit, Role, Stat, SurfaceMaterial, TickContext, Trigger, TuningTables,
};
use crate::combat::Hurtable;

// -----------------------------------------------------------------------------
// Fixtures
// -----------------------------------------------------------------------------

/// Tick length that keeps every test timer exactly representable.
const DT: f32 = 0.25;

#[derive(Default)]
struct StubWorld {
    /// Distance to a wall along any ray.
    wall_distance: Option<f32>,
    occluded: bool,
    box_hits: Vec<CastHit>,
    peers: HashMap<CharacterId, Vec2>,
}

impl PhysicsQueries for StubWorld {
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        _mask: QueryMask,
    ) -> Option<RayHit> {
        self.wall_distance
            .filter(|distance| *distance <= max_distance)
            .map(|distance| RayHit {
                point: origin + direction * distance,
                distance,
            })
    }

    fn boxcast(
        &self,
        _origin: Vec2,
        _size: Vec2,
        _direction: Vec2,
        max_distance: f32,
        _mask: QueryMask,
    ) -> Vec<CastHit> {
        self.box_hits
            .iter()
            .copied()
            .filter(|hit| hit.distance <= max_distance)
            .collect()
    }

    fn overlap(&self, _position: Vec2, _size: Vec2, _mask: QueryMask) -> bool {
        self.occluded
    }

    fn peer_position(&self, id: CharacterId) -> Option<Vec2> {
        self.peers.get(&id).copied()
    }
}

fn test_stats() -> CharacterStats {
    CharacterStats {
        walk_speed: 100.0,
        sprint_speed: 200.0,
        sprint_duration: 1.0,
        dash_speed: 500.0,
        dash_duration: 0.5,
        dash_cooldown: 1.0,
        teleport_distance: 80.0,
        teleport_cooldown: 2.0,
        teleport_min_charge: 1.0,
        teleport_max_charge: 2.0,
        bounce_speed: 300.0,
        bounce_duration: 1.0,
        bounce_cooldown: 1.0,
        bounce_min_charge: 1.0,
        bounce_max_charge: 2.0,
        grapple_range: 100.0,
        grapple_speed: 400.0,
        grapple_duration: 1.0,
        grapple_cooldown: 1.0,
        steady_duration: 1.0,
        steady_cooldown: 2.0,
        link_range: 50.0,
        fall_damage: 10.0,
        fall_recover_time: 1.0,
    }
}

fn character_with_id(role: Role, id: u32) -> AbilityStateMachine {
    let profile = CharacterProfile {
        id: CharacterId(id),
        role,
        tiers: AttributeTiers::default(),
        footprint: Vec2::splat(24.0),
        link_probe: Vec2::splat(16.0),
    };
    AbilityStateMachine::new(
        profile,
        test_stats(),
        CapabilityTable::default().for_role(role),
        Vec2::ZERO,
        100.0,
    )
}

fn character(role: Role) -> AbilityStateMachine {
    character_with_id(role, 1)
}

fn run_for(machine: &mut AbilityStateMachine, world: &StubWorld, seconds: f32) {
    let steps = (seconds / DT).round() as usize;
    for _ in 0..steps {
        machine.tick(TickContext::new(DT), world);
    }
}

fn phase(machine: &AbilityStateMachine, ability: Ability) -> AbilityPhase {
    machine.phase(ability).expect("timed ability has a phase")
}

// -----------------------------------------------------------------------------
// Primitive tests
// -----------------------------------------------------------------------------

#[test]
fn test_resource_meter_locks_on_depletion_until_full() {
    let mut meter = ResourceMeter::full(1.0);
    assert!(!meter.is_locked());

    meter.advance(0.75, MeterDirection::Drain);
    assert!(!meter.is_locked());

    meter.advance(0.5, MeterDirection::Drain);
    assert_eq!(meter.value(), 0.0);
    assert!(meter.is_locked());

    meter.advance(0.5, MeterDirection::Regen);
    assert!(meter.is_locked(), "partial recharge keeps the lock");

    meter.advance(0.75, MeterDirection::Regen);
    assert_eq!(meter.value(), 1.0);
    assert!(!meter.is_locked());
}

#[test]
fn test_charge_meter_clamps_and_resets_on_consume() {
    let mut charge = ChargeMeter::new(1.0, 2.0);
    assert_eq!(charge.value(), 1.0);

    charge.advance(5.0);
    assert_eq!(charge.value(), 2.0);

    assert_eq!(charge.consume(), 1.0);
    assert_eq!(charge.value(), 1.0);
    assert_eq!(charge.fraction(), 0.5);
}

#[test]
fn test_countdown_never_goes_negative() {
    let mut timer = Countdown::new(0.5);
    assert!(!timer.ready());
    assert!(!timer.tick(0.25));
    assert!(timer.tick(1.0));
    assert_eq!(timer.remaining(), 0.0);
    assert!(timer.ready());
    assert!(!timer.tick(1.0), "already-finished countdown does not re-fire");
}

#[test]
fn test_zero_length_phases() {
    assert_eq!(AbilityPhase::cooling_down(0.0), AbilityPhase::Ready);

    let mut phase = AbilityPhase::active(0.0);
    assert_eq!(phase.advance(DT), Some(PhaseEdge::Expired));
}

#[test]
fn test_cooldown_phase_returns_to_ready() {
    let mut phase = AbilityPhase::cooling_down(0.5);
    assert_eq!(phase.cooldown(), 0.5);
    assert_eq!(phase.advance(0.25), None);
    assert_eq!(phase.advance(0.25), Some(PhaseEdge::Recovered));
    assert!(phase.is_ready());
}

// -----------------------------------------------------------------------------
// Capability and tuning tests
// -----------------------------------------------------------------------------

#[test]
fn test_default_capability_table() {
    let table = CapabilityTable::default();

    assert!(table.permits(Role::Decoy, Ability::Dash));
    assert!(table.permits(Role::Support, Ability::Dash));
    assert!(!table.permits(Role::Observer, Ability::Dash));
    assert!(!table.permits(Role::Tank, Ability::Dash));

    assert!(table.permits(Role::Decoy, Ability::Grapple));
    assert!(table.permits(Role::Tank, Ability::Grapple));
    assert!(!table.permits(Role::Observer, Ability::Grapple));

    assert!(table.permits(Role::Tank, Ability::Link));
    assert!(table.permits(Role::Support, Ability::Link));

    for role in Role::ALL {
        assert!(table.permits(role, Ability::Sprint));
    }

    assert!(table.for_role(Role::Decoy).hovers);
    assert!(table.for_role(Role::Support).hovers);
    assert!(!table.for_role(Role::Observer).hovers);
    assert!(!table.for_role(Role::Tank).hovers);
}

#[test]
fn test_tuning_lookup_clamps_tier_and_prefers_role_override() {
    let mut tables = TuningTables::default();
    tables.base.insert(Stat::WalkSpeed, vec![100.0, 120.0, 140.0]);
    tables
        .per_role
        .entry(Role::Tank)
        .or_default()
        .insert(Stat::WalkSpeed, vec![80.0]);
    tables.base.insert(Stat::DashSpeed, Vec::new());

    assert_eq!(tables.lookup(Role::Decoy, Stat::WalkSpeed, 1), Some(120.0));
    assert_eq!(tables.lookup(Role::Decoy, Stat::WalkSpeed, 9), Some(140.0));
    assert_eq!(tables.lookup(Role::Tank, Stat::WalkSpeed, 2), Some(80.0));
    assert_eq!(tables.lookup(Role::Decoy, Stat::DashSpeed, 0), None);
    assert_eq!(tables.lookup(Role::Decoy, Stat::LinkRange, 0), None);
}

#[test]
fn test_stats_resolve_uses_attribute_tier_and_defaults() {
    let mut tables = TuningTables::default();
    tables.base.insert(Stat::WalkSpeed, vec![100.0, 150.0]);
    tables.base.insert(Stat::GrappleRange, vec![200.0, 250.0, 300.0]);

    let tiers = AttributeTiers {
        mobility: 1,
        intelligence: 0,
        strength: 2,
        steadfastness: 0,
    };
    let stats = CharacterStats::resolve(&tables, Role::Tank, &tiers);

    assert_eq!(stats.walk_speed, 150.0);
    assert_eq!(stats.grapple_range, 300.0);
    assert_eq!(stats.dash_speed, CharacterStats::default().dash_speed);
}

// -----------------------------------------------------------------------------
// Sprint
// -----------------------------------------------------------------------------

#[test]
fn test_sprint_drains_stamina_then_locks() {
    let world = StubWorld::default();
    let mut decoy = character(Role::Decoy);

    decoy.handle_input(AbilityInput::Move(Vec2::X), &world);
    decoy.handle_input(AbilityInput::Sprint(Trigger::Pressed), &world);
    assert!(decoy.is_sprinting());
    assert_eq!(decoy.velocity().length(), 200.0);

    run_for(&mut decoy, &world, 1.0);

    assert_eq!(decoy.stamina().value(), 0.0);
    assert!(!decoy.is_sprinting());
    assert!(decoy.stamina().is_locked());
    assert_eq!(decoy.velocity(), Vec2::new(100.0, 0.0));
}

#[test]
fn test_sprint_resumes_only_after_full_recharge() {
    let world = StubWorld::default();
    let mut decoy = character(Role::Decoy);

    decoy.handle_input(AbilityInput::Move(Vec2::X), &world);
    decoy.handle_input(AbilityInput::Sprint(Trigger::Pressed), &world);
    run_for(&mut decoy, &world, 1.0);

    run_for(&mut decoy, &world, 0.5);
    assert!(decoy.stamina().is_locked());
    assert!(!decoy.is_sprinting());

    decoy.handle_input(AbilityInput::Sprint(Trigger::Pressed), &world);
    assert!(!decoy.is_sprinting(), "locked stamina rejects sprint");

    run_for(&mut decoy, &world, 0.5);
    assert!(!decoy.stamina().is_locked());
    assert!(decoy.is_sprinting(), "held sprint resumes at full stamina");
}

#[test]
fn test_sprint_press_is_idempotent() {
    let world = StubWorld::default();
    let mut decoy = character(Role::Decoy);
    decoy.handle_input(AbilityInput::Move(Vec2::Y), &world);
    decoy.handle_input(AbilityInput::Sprint(Trigger::Pressed), &world);

    let before = decoy.clone();
    decoy.handle_input(AbilityInput::Sprint(Trigger::Pressed), &world);
    assert_eq!(decoy, before);
}

#[test]
fn test_sprint_waits_for_movement() {
    let world = StubWorld::default();
    let mut tank = character(Role::Tank);

    tank.handle_input(AbilityInput::Sprint(Trigger::Pressed), &world);
    assert!(!tank.is_sprinting());
    assert!(tank.wants_sprint());

    tank.handle_input(AbilityInput::Move(Vec2::NEG_X), &world);
    assert_eq!(tank.velocity(), Vec2::new(-100.0, 0.0));

    tank.tick(TickContext::new(DT), &world);
    assert!(tank.is_sprinting());
    assert_eq!(tank.velocity(), Vec2::new(-200.0, 0.0));
}

#[test]
fn test_sprint_ends_on_release_or_stop() {
    let world = StubWorld::default();
    let mut tank = character(Role::Tank);

    tank.handle_input(AbilityInput::Move(Vec2::X), &world);
    tank.handle_input(AbilityInput::Sprint(Trigger::Pressed), &world);
    tank.handle_input(AbilityInput::Sprint(Trigger::Released), &world);
    assert!(!tank.is_sprinting());
    assert_eq!(tank.velocity(), Vec2::new(100.0, 0.0));

    tank.handle_input(AbilityInput::Sprint(Trigger::Pressed), &world);
    tank.handle_input(AbilityInput::Move(Vec2::ZERO), &world);
    assert!(!tank.is_sprinting());
    assert_eq!(tank.velocity(), Vec2::ZERO);
}

// -----------------------------------------------------------------------------
// Dash
// -----------------------------------------------------------------------------

#[test]
fn test_dash_uses_last_move_direction_and_cools_down() {
    let world = StubWorld::default();
    let mut decoy = character(Role::Decoy);

    decoy.handle_input(AbilityInput::Move(Vec2::Y), &world);
    decoy.handle_input(AbilityInput::Move(Vec2::ZERO), &world);
    decoy.handle_input(AbilityInput::Dash, &world);

    assert_eq!(decoy.exclusive_active(), Some(ExclusiveAbility::Dash));
    assert_eq!(decoy.velocity(), Vec2::new(0.0, 500.0));

    run_for(&mut decoy, &world, 0.5);
    assert_eq!(decoy.exclusive_active(), None);
    assert_eq!(phase(&decoy, Ability::Dash).cooldown(), 1.0);
    assert_eq!(decoy.velocity(), Vec2::ZERO);

    decoy.handle_input(AbilityInput::Dash, &world);
    assert_eq!(decoy.exclusive_active(), None, "dash on cooldown");

    run_for(&mut decoy, &world, 1.0);
    assert!(phase(&decoy, Ability::Dash).is_ready());
    decoy.handle_input(AbilityInput::Dash, &world);
    assert_eq!(decoy.exclusive_active(), Some(ExclusiveAbility::Dash));
}

#[test]
fn test_observer_never_dashes() {
    let world = StubWorld::default();
    let mut observer = character(Role::Observer);

    for _ in 0..8 {
        observer.handle_input(AbilityInput::Dash, &world);
        assert!(phase(&observer, Ability::Dash).is_ready());
        assert_eq!(observer.exclusive_active(), None);
        observer.tick(TickContext::new(DT), &world);
    }
}

#[test]
fn test_dash_preempts_sprint_and_sprint_resumes() {
    let world = StubWorld::default();
    let mut support = character(Role::Support);

    support.handle_input(AbilityInput::Move(Vec2::X), &world);
    support.handle_input(AbilityInput::Sprint(Trigger::Pressed), &world);
    support.handle_input(AbilityInput::Dash, &world);

    assert!(!support.is_sprinting());
    assert!(support.wants_sprint());
    assert_eq!(support.velocity(), Vec2::new(500.0, 0.0));

    run_for(&mut support, &world, 0.5);
    assert!(support.is_sprinting());
    assert_eq!(support.velocity(), Vec2::new(200.0, 0.0));
}

// -----------------------------------------------------------------------------
// Teleport
// -----------------------------------------------------------------------------

#[test]
fn test_teleport_full_charge_moves_full_distance() {
    let world = StubWorld::default();
    let mut observer = character(Role::Observer);

    observer.handle_input(AbilityInput::Move(Vec2::X), &world);
    observer.handle_input(AbilityInput::Move(Vec2::ZERO), &world);
    observer.handle_input(AbilityInput::Teleport(Trigger::Pressed), &world);
    run_for(&mut observer, &world, 2.0);
    assert_eq!(phase(&observer, Ability::Teleport).charge(), Some(2.0));

    observer.handle_input(AbilityInput::Teleport(Trigger::Released), &world);

    assert_eq!(observer.position(), Vec2::new(80.0, 0.0));
    assert_eq!(phase(&observer, Ability::Teleport).cooldown(), 2.0);
}

#[test]
fn test_teleport_min_charge_scales_distance() {
    let world = StubWorld::default();
    let mut support = character(Role::Support);

    support.handle_input(AbilityInput::Move(Vec2::NEG_Y), &world);
    support.handle_input(AbilityInput::Teleport(Trigger::Pressed), &world);
    support.handle_input(AbilityInput::Teleport(Trigger::Released), &world);

    assert_eq!(support.position(), Vec2::new(0.0, -40.0));
}

#[test]
fn test_teleport_into_wall_is_free_retry() {
    let world = StubWorld {
        occluded: true,
        ..default()
    };
    let mut observer = character(Role::Observer);

    observer.handle_input(AbilityInput::Teleport(Trigger::Pressed), &world);
    run_for(&mut observer, &world, 1.0);
    observer.handle_input(AbilityInput::Teleport(Trigger::Released), &world);

    assert_eq!(observer.position(), Vec2::ZERO);
    assert_eq!(phase(&observer, Ability::Teleport), AbilityPhase::Ready);
    assert_eq!(phase(&observer, Ability::Teleport).cooldown(), 0.0);
}

#[test]
fn test_teleport_rejected_while_dashing() {
    let world = StubWorld::default();
    let mut support = character(Role::Support);

    support.handle_input(AbilityInput::Dash, &world);
    support.handle_input(AbilityInput::Teleport(Trigger::Pressed), &world);

    assert!(!support.is_charging());
}

#[test]
fn test_sprint_allowed_while_charging_teleport() {
    let world = StubWorld::default();
    let mut support = character(Role::Support);

    support.handle_input(AbilityInput::Move(Vec2::X), &world);
    support.handle_input(AbilityInput::Teleport(Trigger::Pressed), &world);
    support.handle_input(AbilityInput::Sprint(Trigger::Pressed), &world);

    assert!(support.is_charging());
    assert!(support.is_sprinting());

    support.handle_input(AbilityInput::Dash, &world);
    assert_eq!(support.exclusive_active(), None, "charging blocks dash");
}

// -----------------------------------------------------------------------------
// Bounce
// -----------------------------------------------------------------------------

#[test]
fn test_bounce_partial_charge_shortens_duration() {
    let world = StubWorld::default();
    let mut decoy = character(Role::Decoy);

    decoy.handle_input(AbilityInput::Move(Vec2::X), &world);
    decoy.handle_input(AbilityInput::Bounce(Trigger::Pressed), &world);
    run_for(&mut decoy, &world, 0.5);
    decoy.handle_input(AbilityInput::Bounce(Trigger::Released), &world);

    let bounce = phase(&decoy, Ability::Bounce);
    assert!(bounce.is_active());
    assert_eq!(bounce.timer(), 0.75);
    assert_eq!(decoy.material(), SurfaceMaterial::Bouncy);
    assert_eq!(decoy.velocity(), Vec2::new(300.0, 0.0));
}

#[test]
fn test_bounce_keeps_speed_but_follows_collision_direction() {
    let world = StubWorld::default();
    let mut observer = character(Role::Observer);

    observer.handle_input(AbilityInput::Move(Vec2::X), &world);
    observer.handle_input(AbilityInput::Bounce(Trigger::Pressed), &world);
    run_for(&mut observer, &world, 0.5);
    observer.handle_input(AbilityInput::Bounce(Trigger::Released), &world);
    run_for(&mut observer, &world, DT);

    observer.tick(
        TickContext {
            observed_velocity: Some(Vec2::new(0.0, -50.0)),
            ..TickContext::new(DT)
        },
        &world,
    );
    assert_eq!(observer.velocity(), Vec2::new(0.0, -300.0));

    run_for(&mut observer, &world, DT);
    assert!(!phase(&observer, Ability::Bounce).is_active());
    assert_eq!(phase(&observer, Ability::Bounce).cooldown(), 1.0);
    assert_eq!(observer.material(), SurfaceMaterial::Normal);
    assert_eq!(observer.velocity(), Vec2::new(100.0, 0.0));
}

#[test]
fn test_bounce_launches_along_new_heading_despite_stale_velocity() {
    let world = StubWorld::default();
    let mut decoy = character(Role::Decoy);

    decoy.handle_input(AbilityInput::Move(Vec2::X), &world);
    decoy.handle_input(AbilityInput::Bounce(Trigger::Pressed), &world);
    run_for(&mut decoy, &world, 1.0);

    // Turn and release in the same frame; physics still reports the old walk.
    decoy.handle_input(AbilityInput::Move(Vec2::Y), &world);
    decoy.handle_input(AbilityInput::Bounce(Trigger::Released), &world);
    assert_eq!(decoy.velocity(), Vec2::new(0.0, 300.0));

    decoy.tick(
        TickContext {
            observed_velocity: Some(Vec2::new(100.0, 0.0)),
            ..TickContext::new(DT)
        },
        &world,
    );
    assert_eq!(decoy.bounce_direction(), Vec2::Y);
    assert_eq!(decoy.velocity(), Vec2::new(0.0, 300.0));

    decoy.tick(
        TickContext {
            observed_velocity: Some(Vec2::new(0.0, 300.0)),
            ..TickContext::new(DT)
        },
        &world,
    );
    assert_eq!(decoy.velocity(), Vec2::new(0.0, 300.0));
}

#[test]
fn test_bounce_charge_blocks_dash_and_teleport() {
    let world = StubWorld::default();
    let mut decoy = character(Role::Decoy);

    decoy.handle_input(AbilityInput::Bounce(Trigger::Pressed), &world);
    decoy.handle_input(AbilityInput::Dash, &world);
    assert!(phase(&decoy, Ability::Dash).is_ready());

    let mut observer = character(Role::Observer);
    observer.handle_input(AbilityInput::Bounce(Trigger::Pressed), &world);
    observer.handle_input(AbilityInput::Teleport(Trigger::Pressed), &world);
    assert!(!phase(&observer, Ability::Teleport).is_charging());
}

// -----------------------------------------------------------------------------
// Grapple
// -----------------------------------------------------------------------------

#[test]
fn test_grapple_miss_is_noop() {
    let mut tank = character(Role::Tank);
    tank.handle_input(
        AbilityInput::Aim(AimSample::Stick(Vec2::X)),
        &StubWorld::default(),
    );

    tank.handle_input(AbilityInput::Grapple, &StubWorld::default());
    assert_eq!(phase(&tank, Ability::Grapple), AbilityPhase::Ready);

    let far_wall = StubWorld {
        wall_distance: Some(150.0),
        ..default()
    };
    tank.handle_input(AbilityInput::Grapple, &far_wall);
    assert_eq!(phase(&tank, Ability::Grapple), AbilityPhase::Ready);
    assert_eq!(phase(&tank, Ability::Grapple).cooldown(), 0.0);
}

#[test]
fn test_grapple_wall_contact_ends_early() {
    let world = StubWorld {
        wall_distance: Some(60.0),
        ..default()
    };
    let mut decoy = character(Role::Decoy);

    decoy.handle_input(AbilityInput::Grapple, &world);
    assert_eq!(decoy.exclusive_active(), Some(ExclusiveAbility::Grapple));
    assert_eq!(decoy.velocity(), Vec2::new(400.0, 0.0));

    let tether = decoy.grapple_tether().expect("tether visible while grappling");
    assert_eq!(tether.length, 60.0);

    decoy.tick(TickContext::new(DT), &world);
    decoy.on_wall_contact();

    assert_eq!(decoy.exclusive_active(), None);
    assert_eq!(phase(&decoy, Ability::Grapple).cooldown(), 1.0);
    assert!(decoy.grapple_tether().is_none());
    assert_eq!(decoy.velocity(), Vec2::ZERO);
}

#[test]
fn test_grapple_times_out_into_cooldown() {
    let world = StubWorld {
        wall_distance: Some(90.0),
        ..default()
    };
    let mut tank = character(Role::Tank);

    tank.handle_input(AbilityInput::Grapple, &world);
    run_for(&mut tank, &world, 1.0);

    assert!(!phase(&tank, Ability::Grapple).is_active());
    assert_eq!(phase(&tank, Ability::Grapple).cooldown(), 1.0);
}

#[test]
fn test_grapple_preempts_steady() {
    let world = StubWorld {
        wall_distance: Some(50.0),
        ..default()
    };
    let mut tank = character(Role::Tank);

    tank.handle_input(AbilityInput::Steady, &world);
    assert_eq!(tank.exclusive_active(), Some(ExclusiveAbility::Steady));

    tank.handle_input(AbilityInput::Grapple, &world);
    assert_eq!(tank.active_exclusives(), vec![ExclusiveAbility::Grapple]);
    assert_eq!(phase(&tank, Ability::Steady).cooldown(), 2.0);
}

#[test]
fn test_grapple_role_gating() {
    let world = StubWorld {
        wall_distance: Some(50.0),
        ..default()
    };
    for role in [Role::Observer, Role::Support] {
        let mut machine = character(role);
        machine.handle_input(AbilityInput::Grapple, &world);
        assert_eq!(machine.exclusive_active(), None, "{:?} cannot grapple", role);
    }
}

// -----------------------------------------------------------------------------
// Steady
// -----------------------------------------------------------------------------

#[test]
fn test_steady_toggle_pays_full_cooldown() {
    let world = StubWorld::default();
    let mut observer = character(Role::Observer);

    observer.handle_input(AbilityInput::Move(Vec2::X), &world);
    observer.handle_input(AbilityInput::Steady, &world);
    assert_eq!(observer.velocity(), Vec2::ZERO);

    observer.tick(TickContext::new(DT), &world);
    observer.handle_input(AbilityInput::Steady, &world);

    assert_eq!(observer.exclusive_active(), None);
    assert_eq!(phase(&observer, Ability::Steady).cooldown(), 2.0);
    assert_eq!(observer.velocity(), Vec2::new(100.0, 0.0));
}

#[test]
fn test_steady_auto_exit_matches_manual_exit() {
    let world = StubWorld::default();
    let mut tank = character(Role::Tank);

    tank.handle_input(AbilityInput::Steady, &world);
    run_for(&mut tank, &world, 1.0);

    assert_eq!(tank.exclusive_active(), None);
    assert_eq!(phase(&tank, Ability::Steady).cooldown(), 2.0);

    tank.handle_input(AbilityInput::Steady, &world);
    assert_eq!(tank.exclusive_active(), None, "still cooling down");
}

// -----------------------------------------------------------------------------
// Link
// -----------------------------------------------------------------------------

fn peer_world(peer_position: Vec2) -> StubWorld {
    StubWorld {
        box_hits: vec![
            CastHit {
                character: Some(CharacterId(1)),
                point: Vec2::ZERO,
                distance: 0.0,
            },
            CastHit {
                character: Some(CharacterId(2)),
                point: peer_position,
                distance: peer_position.length(),
            },
        ],
        peers: HashMap::from([(CharacterId(2), peer_position)]),
        ..default()
    }
}

#[test]
fn test_link_breaks_when_peer_leaves_range() {
    let mut world = peer_world(Vec2::new(30.0, 0.0));
    let mut tank = character(Role::Tank);

    tank.handle_input(AbilityInput::Link, &world);
    assert_eq!(tank.linked_peer(), Some(CharacterId(2)));

    tank.tick(TickContext::new(DT), &world);
    assert_eq!(tank.linked_peer(), Some(CharacterId(2)));

    world.peers.insert(CharacterId(2), Vec2::new(80.0, 0.0));
    tank.tick(TickContext::new(DT), &world);

    assert!(tank.linked_peer().is_none());
    assert!(tank.link_tether().is_none());
    assert_eq!(tank.phase(Ability::Link), None);
}

#[test]
fn test_link_picks_nearest_other_character() {
    let world = StubWorld {
        box_hits: vec![
            CastHit {
                character: Some(CharacterId(2)),
                point: Vec2::new(40.0, 0.0),
                distance: 40.0,
            },
            CastHit {
                character: None,
                point: Vec2::new(10.0, 0.0),
                distance: 10.0,
            },
            CastHit {
                character: Some(CharacterId(3)),
                point: Vec2::new(20.0, 0.0),
                distance: 20.0,
            },
        ],
        ..default()
    };
    let mut support = character(Role::Support);

    support.handle_input(AbilityInput::Link, &world);
    assert_eq!(support.linked_peer(), Some(CharacterId(3)));
    let tether = support.link_tether().expect("tether visible while linked");
    assert_eq!(tether.length, 20.0);
}

#[test]
fn test_link_breaks_when_peer_despawns() {
    let mut world = peer_world(Vec2::new(10.0, 0.0));
    let mut tank = character(Role::Tank);

    tank.handle_input(AbilityInput::Link, &world);
    world.peers.clear();
    tank.tick(TickContext::new(DT), &world);

    assert!(tank.linked_peer().is_none());
}

#[test]
fn test_link_press_toggles_off() {
    let world = peer_world(Vec2::new(10.0, 0.0));
    let mut support = character(Role::Support);

    support.handle_input(AbilityInput::Link, &world);
    assert!(support.linked_peer().is_some());
    support.handle_input(AbilityInput::Link, &world);
    assert!(support.linked_peer().is_none());
}

#[test]
fn test_link_ignores_self_only_hits() {
    let world = StubWorld {
        box_hits: vec![CastHit {
            character: Some(CharacterId(1)),
            point: Vec2::ZERO,
            distance: 0.0,
        }],
        ..default()
    };
    let mut tank = character(Role::Tank);

    tank.handle_input(AbilityInput::Link, &world);
    assert!(tank.linked_peer().is_none());
}

// -----------------------------------------------------------------------------
// Fall recovery
// -----------------------------------------------------------------------------

#[test]
fn test_hovering_role_immune_unless_grappling() {
    let world = StubWorld {
        wall_distance: Some(50.0),
        ..default()
    };
    let mut decoy = character(Role::Decoy);

    assert_eq!(decoy.on_hazard_enter(), FallOutcome::Immune);
    assert_eq!(decoy.health().current, 100.0);
    assert!(!decoy.is_recovering());

    decoy.handle_input(AbilityInput::Grapple, &world);
    assert_eq!(
        decoy.on_hazard_enter(),
        FallOutcome::Fell {
            damage: 10.0,
            died: false,
        }
    );
    assert_eq!(decoy.health().current, 90.0);
    assert_eq!(decoy.active_exclusives(), vec![ExclusiveAbility::FallRecovery]);
    assert_eq!(phase(&decoy, Ability::Grapple).cooldown(), 1.0);
    assert_eq!(decoy.velocity(), Vec2::ZERO);
}

#[test]
fn test_fall_breaks_link_and_blocks_abilities() {
    let world = peer_world(Vec2::new(10.0, 0.0));
    let mut tank = character(Role::Tank);

    tank.handle_input(AbilityInput::Move(Vec2::X), &world);
    tank.handle_input(AbilityInput::Link, &world);
    assert!(tank.linked_peer().is_some());

    assert!(matches!(tank.on_hazard_enter(), FallOutcome::Fell { .. }));
    assert!(tank.linked_peer().is_none());
    assert_eq!(tank.velocity(), Vec2::ZERO);
    assert_eq!(tank.on_hazard_enter(), FallOutcome::Ignored);

    tank.handle_input(AbilityInput::Steady, &world);
    tank.handle_input(AbilityInput::Link, &world);
    assert_eq!(tank.active_exclusives(), vec![ExclusiveAbility::FallRecovery]);
    assert!(tank.linked_peer().is_none());

    run_for(&mut tank, &world, 1.0);
    assert!(!tank.is_recovering());
    assert_eq!(tank.velocity(), Vec2::new(100.0, 0.0));
}

#[test]
fn test_fall_cancels_charge_without_cooldown() {
    let world = StubWorld::default();
    let mut observer = character(Role::Observer);

    observer.handle_input(AbilityInput::Teleport(Trigger::Pressed), &world);
    observer.on_hazard_enter();

    assert_eq!(phase(&observer, Ability::Teleport), AbilityPhase::Ready);
    observer.handle_input(AbilityInput::Teleport(Trigger::Released), &world);
    assert_eq!(observer.position(), Vec2::ZERO);
}

#[test]
fn test_fatal_fall_freezes_character() {
    let world = StubWorld::default();
    let mut tank = character(Role::Tank);
    tank.handle_input(AbilityInput::Move(Vec2::X), &world);
    run_for(&mut tank, &world, DT);
    assert_eq!(tank.velocity(), Vec2::new(100.0, 0.0));
    tank.health_mut().hurt(95.0);

    assert_eq!(
        tank.on_hazard_enter(),
        FallOutcome::Fell {
            damage: 10.0,
            died: true,
        }
    );
    assert!(!tank.is_alive());
    assert_eq!(tank.velocity(), Vec2::ZERO);

    let frozen = tank.clone();
    tank.handle_input(AbilityInput::Move(Vec2::X), &world);
    tank.handle_input(AbilityInput::Steady, &world);
    run_for(&mut tank, &world, 2.0);
    tank.on_wall_contact();
    assert_eq!(tank.on_hazard_enter(), FallOutcome::Ignored);
    assert_eq!(tank, frozen);
}

// -----------------------------------------------------------------------------
// Aim and tether projection
// -----------------------------------------------------------------------------

#[test]
fn test_aim_inputs() {
    let world = StubWorld::default();
    let mut tank = character(Role::Tank);

    tank.handle_input(AbilityInput::Aim(AimSample::Stick(Vec2::new(0.0, 0.5))), &world);
    assert_eq!(tank.aim_direction(), Vec2::Y);

    tank.handle_input(AbilityInput::Aim(AimSample::Stick(Vec2::ZERO)), &world);
    assert_eq!(tank.aim_direction(), Vec2::Y, "zero stick keeps last aim");

    tank.handle_input(
        AbilityInput::Aim(AimSample::Pointer(Vec2::new(-10.0, 0.0))),
        &world,
    );
    assert_eq!(tank.aim_direction(), Vec2::NEG_X);
}

#[test]
fn test_pointer_aim_tracks_only_while_moving() {
    let world = StubWorld::default();
    let mut tank = character(Role::Tank);
    let ctx = TickContext {
        pointer: Some(Vec2::new(0.0, 10.0)),
        ..TickContext::new(DT)
    };

    tank.tick(ctx, &world);
    assert_eq!(tank.aim_direction(), Vec2::X);

    tank.handle_input(AbilityInput::Move(Vec2::X), &world);
    tank.tick(ctx, &world);
    assert_eq!(tank.aim_direction(), Vec2::Y);
}

#[test]
fn test_tether_projection() {
    let tether = TetherVisual::between(Vec2::new(1.0, 1.0), Vec2::new(1.0, 11.0));
    assert_eq!(tether.length, 10.0);
    assert!((tether.angle - FRAC_PI_2).abs() < 1e-6);
    assert_eq!(tether.midpoint(), Vec2::new(1.0, 6.0));
}

// -----------------------------------------------------------------------------
// Randomized invariants
// -----------------------------------------------------------------------------

fn random_input(rng: &mut ChaCha8Rng) -> AbilityInput {
    let trigger = if rng.random_bool(0.5) {
        Trigger::Pressed
    } else {
        Trigger::Released
    };
    let direction = match rng.random_range(0..5) {
        0 => Vec2::ZERO,
        1 => Vec2::X,
        2 => Vec2::NEG_Y,
        3 => Vec2::new(0.6, 0.8),
        _ => Vec2::NEG_X,
    };

    match rng.random_range(0..10) {
        0 => AbilityInput::Move(direction),
        1 => AbilityInput::Aim(AimSample::Stick(direction)),
        2 => AbilityInput::Sprint(trigger),
        3 => AbilityInput::Dash,
        4 => AbilityInput::Teleport(trigger),
        5 => AbilityInput::Bounce(trigger),
        6 => AbilityInput::Grapple,
        7 => AbilityInput::Steady,
        8 => AbilityInput::Link,
        _ => AbilityInput::Move(direction),
    }
}

#[test]
fn test_random_event_sequences_preserve_invariants() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);

    for role in Role::ALL {
        let mut machine = character(role);
        let mut world = peer_world(Vec2::new(20.0, 0.0));
        let mut was_locked = false;

        for step in 0..3000 {
            world.wall_distance = rng.random_bool(0.5).then_some(60.0);
            world.occluded = rng.random_bool(0.3);
            if rng.random_bool(0.05) {
                let x = rng.random_range(0.0..100.0);
                world.peers.insert(CharacterId(2), Vec2::new(x, 0.0));
            }

            match rng.random_range(0..10) {
                0..=4 => machine.handle_input(random_input(&mut rng), &world),
                5..=7 => {
                    let dt = rng.random_range(0.01..0.3);
                    machine.tick(TickContext::new(dt), &world);
                }
                8 => machine.on_wall_contact(),
                _ => {
                    if rng.random_bool(0.2) {
                        machine.on_hazard_enter();
                    }
                }
            }

            let exclusives = machine.active_exclusives();
            assert!(
                exclusives.len() <= 1,
                "{:?} step {}: overlapping {:?}",
                role,
                step,
                exclusives
            );

            let stamina = machine.stamina();
            assert!(stamina.value() >= 0.0 && stamina.value() <= stamina.capacity());
            if stamina.is_locked() {
                assert!(stamina.value() < stamina.capacity());
                assert!(!machine.is_sprinting());
                if !was_locked {
                    assert_eq!(stamina.value(), 0.0, "lock only set at zero");
                }
            }
            was_locked = stamina.is_locked();

            if machine.is_sprinting() {
                assert!(machine.exclusive_active().is_none());
            }
            if machine.is_charging() {
                assert!(machine.exclusive_active().is_none());
            }
            for ability in Ability::ALL {
                if !machine.capabilities().permits(ability) {
                    if let Some(phase) = machine.phase(ability) {
                        assert!(phase.is_ready(), "{:?} used {:?}", role, ability);
                    }
                }
            }
        }
    }
}
