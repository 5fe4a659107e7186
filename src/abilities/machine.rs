//! Abilities domain: the per-character ability state machine.
//!
//! One [`AbilityStateMachine`] per character owns every timer, meter, and
//! phase for that character. Input events and collision events are applied
//! synchronously against the current state; `tick` advances everything in a
//! fixed order. Guard failures are silent no-ops.

use std::fmt;

use bevy::prelude::*;

use crate::abilities::meters::{AbilityPhase, MeterDirection, PhaseEdge, ResourceMeter};
use crate::abilities::resolver::MovementResolver;
use crate::abilities::tether::TetherVisual;
use crate::abilities::{Ability, AttributeTiers, CharacterStats, Role, RoleCapabilities};
use crate::combat::{Health, Hurtable};

/// Stable, non-owning handle to a character in the character index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharacterId(pub u32);

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Collaborator boundary
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMask {
    Walls,
    Characters,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec2,
    pub distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastHit {
    /// `None` when the hit collider does not belong to a character.
    pub character: Option<CharacterId>,
    pub point: Vec2,
    pub distance: f32,
}

/// Spatial queries and peer lookups the machine needs from the world.
pub trait PhysicsQueries {
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: QueryMask,
    ) -> Option<RayHit>;

    fn boxcast(
        &self,
        origin: Vec2,
        size: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: QueryMask,
    ) -> Vec<CastHit>;

    fn overlap(&self, position: Vec2, size: Vec2, mask: QueryMask) -> bool;

    /// Current position of another character; `None` once it is despawned.
    fn peer_position(&self, id: CharacterId) -> Option<Vec2>;
}

// ============================================================================
// Inputs and outputs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Pressed,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AimSample {
    /// Directional stick vector.
    Stick(Vec2),
    /// Pointer position in world space.
    Pointer(Vec2),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AbilityInput {
    Move(Vec2),
    Aim(AimSample),
    Sprint(Trigger),
    Dash,
    Teleport(Trigger),
    Bounce(Trigger),
    /// Grapple fires on release.
    Grapple,
    Steady,
    Link,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    pub dt: f32,
    /// Velocity after the physics step, so collisions can redirect a bounce.
    pub observed_velocity: Option<Vec2>,
    /// World-space pointer, present while the pointer scheme is active.
    pub pointer: Option<Vec2>,
}

impl TickContext {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            observed_velocity: None,
            pointer: None,
        }
    }
}

/// States that own the character's motion output. At most one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExclusiveAbility {
    Dash,
    Bounce,
    Grapple,
    Steady,
    FallRecovery,
}

/// Physical-material marker consumed by collision response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceMaterial {
    #[default]
    Normal,
    Bouncy,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionIntent {
    pub move_direction: Vec2,
    pub moving: bool,
    /// Last nonzero move input; directional abilities fire along it.
    pub last_move_direction: Vec2,
    /// Unit vector.
    pub aim_direction: Vec2,
}

impl Default for MotionIntent {
    fn default() -> Self {
        Self {
            move_direction: Vec2::ZERO,
            moving: false,
            last_move_direction: Vec2::X,
            aim_direction: Vec2::X,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LinkState {
    #[default]
    Unlinked,
    Linked {
        peer: CharacterId,
        anchor: Vec2,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FallOutcome {
    /// Dead or already recovering.
    Ignored,
    /// Hovering role, not grappling.
    Immune,
    Fell { damage: f32, died: bool },
}

/// Identity and fixed geometry of a character.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterProfile {
    pub id: CharacterId,
    pub role: Role,
    pub tiers: AttributeTiers,
    /// Collider size; used for teleport-destination occlusion.
    pub footprint: Vec2,
    /// Box swept along the aim when searching for a link peer.
    pub link_probe: Vec2,
}

// ============================================================================
// State machine
// ============================================================================

#[derive(Component, Debug, Clone, PartialEq)]
pub struct AbilityStateMachine {
    profile: CharacterProfile,
    stats: CharacterStats,
    capabilities: RoleCapabilities,
    position: Vec2,
    health: Health,
    intent: MotionIntent,
    velocity: Vec2,
    material: SurfaceMaterial,
    sprinting: bool,
    /// Latched while the sprint trigger is held.
    wants_sprint: bool,
    stamina: ResourceMeter,
    dash: AbilityPhase,
    dash_direction: Vec2,
    teleport: AbilityPhase,
    bounce: AbilityPhase,
    bounce_direction: Vec2,
    /// Set on release until the first tick; the velocity observed on that
    /// tick predates the bounce.
    bounce_launched: bool,
    grapple: AbilityPhase,
    grapple_direction: Vec2,
    grapple_anchor: Option<Vec2>,
    steady: AbilityPhase,
    link: LinkState,
    fall: AbilityPhase,
}

impl AbilityStateMachine {
    pub fn new(
        profile: CharacterProfile,
        stats: CharacterStats,
        capabilities: RoleCapabilities,
        position: Vec2,
        max_health: f32,
    ) -> Self {
        let stamina = ResourceMeter::full(stats.sprint_duration);
        Self {
            profile,
            stats,
            capabilities,
            position,
            health: Health::new(max_health),
            intent: MotionIntent::default(),
            velocity: Vec2::ZERO,
            material: SurfaceMaterial::Normal,
            sprinting: false,
            wants_sprint: false,
            stamina,
            dash: AbilityPhase::Ready,
            dash_direction: Vec2::X,
            teleport: AbilityPhase::Ready,
            bounce: AbilityPhase::Ready,
            bounce_direction: Vec2::X,
            bounce_launched: false,
            grapple: AbilityPhase::Ready,
            grapple_direction: Vec2::X,
            grapple_anchor: None,
            steady: AbilityPhase::Ready,
            link: LinkState::Unlinked,
            fall: AbilityPhase::Ready,
        }
    }

    // ------------------------------------------------------------------
    // Read-only exposure
    // ------------------------------------------------------------------

    pub fn id(&self) -> CharacterId {
        self.profile.id
    }

    pub fn role(&self) -> Role {
        self.profile.role
    }

    pub fn profile(&self) -> &CharacterProfile {
        &self.profile
    }

    pub fn stats(&self) -> &CharacterStats {
        &self.stats
    }

    pub fn capabilities(&self) -> &RoleCapabilities {
        &self.capabilities
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Physics owns integration; the adapter feeds the integrated position
    /// back before events and ticks are applied.
    pub fn sync_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn health(&self) -> &Health {
        &self.health
    }

    #[cfg(test)]
    pub fn health_mut(&mut self) -> &mut Health {
        &mut self.health
    }

    pub fn is_alive(&self) -> bool {
        self.health.is_alive()
    }

    pub fn intent(&self) -> &MotionIntent {
        &self.intent
    }

    pub fn aim_direction(&self) -> Vec2 {
        self.intent.aim_direction
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn material(&self) -> SurfaceMaterial {
        self.material
    }

    pub fn is_sprinting(&self) -> bool {
        self.sprinting
    }

    pub fn wants_sprint(&self) -> bool {
        self.wants_sprint
    }

    pub fn stamina(&self) -> &ResourceMeter {
        &self.stamina
    }

    pub fn dash_direction(&self) -> Vec2 {
        self.dash_direction
    }

    pub fn bounce_direction(&self) -> Vec2 {
        self.bounce_direction
    }

    pub fn grapple_direction(&self) -> Vec2 {
        self.grapple_direction
    }

    pub fn linked_peer(&self) -> Option<CharacterId> {
        match self.link {
            LinkState::Linked { peer, .. } => Some(peer),
            LinkState::Unlinked => None,
        }
    }

    /// Phase of a timed ability. Sprint and Link have none.
    pub fn phase(&self, ability: Ability) -> Option<AbilityPhase> {
        match ability {
            Ability::Dash => Some(self.dash),
            Ability::Teleport => Some(self.teleport),
            Ability::Bounce => Some(self.bounce),
            Ability::Grapple => Some(self.grapple),
            Ability::Steady => Some(self.steady),
            Ability::Sprint | Ability::Link => None,
        }
    }

    pub fn is_recovering(&self) -> bool {
        self.fall.is_active()
    }

    /// Every exclusive state currently active, in evaluation order.
    pub fn active_exclusives(&self) -> Vec<ExclusiveAbility> {
        [
            (self.dash.is_active(), ExclusiveAbility::Dash),
            (self.bounce.is_active(), ExclusiveAbility::Bounce),
            (self.grapple.is_active(), ExclusiveAbility::Grapple),
            (self.steady.is_active(), ExclusiveAbility::Steady),
            (self.fall.is_active(), ExclusiveAbility::FallRecovery),
        ]
        .into_iter()
        .filter_map(|(active, ability)| active.then_some(ability))
        .collect()
    }

    pub fn exclusive_active(&self) -> Option<ExclusiveAbility> {
        self.active_exclusives().into_iter().next()
    }

    /// A Teleport or Bounce trigger is held.
    pub fn is_charging(&self) -> bool {
        self.teleport.is_charging() || self.bounce.is_charging()
    }

    pub fn grapple_tether(&self) -> Option<TetherVisual> {
        if !self.grapple.is_active() {
            return None;
        }
        self.grapple_anchor
            .map(|anchor| TetherVisual::between(self.position, anchor))
    }

    pub fn link_tether(&self) -> Option<TetherVisual> {
        match self.link {
            LinkState::Linked { anchor, .. } => Some(TetherVisual::between(self.position, anchor)),
            LinkState::Unlinked => None,
        }
    }

    // ------------------------------------------------------------------
    // Discrete events
    // ------------------------------------------------------------------

    pub fn handle_input(&mut self, input: AbilityInput, world: &impl PhysicsQueries) {
        if !self.is_alive() {
            return;
        }

        match input {
            AbilityInput::Move(direction) => self.on_move(direction),
            AbilityInput::Aim(sample) => self.on_aim(sample),
            AbilityInput::Sprint(Trigger::Pressed) => self.press_sprint(),
            AbilityInput::Sprint(Trigger::Released) => self.release_sprint(),
            AbilityInput::Dash => self.press_dash(),
            AbilityInput::Teleport(Trigger::Pressed) => self.press_teleport(),
            AbilityInput::Teleport(Trigger::Released) => self.release_teleport(world),
            AbilityInput::Bounce(Trigger::Pressed) => self.press_bounce(),
            AbilityInput::Bounce(Trigger::Released) => self.release_bounce(),
            AbilityInput::Grapple => self.release_grapple(world),
            AbilityInput::Steady => self.press_steady(),
            AbilityInput::Link => self.press_link(world),
        }
    }

    /// The character hit a wall. Ends an active grapple.
    pub fn on_wall_contact(&mut self) {
        if !self.is_alive() || !self.grapple.is_active() {
            return;
        }
        debug!("Character {}: grapple ended on wall contact", self.id());
        self.exit_grapple();
        self.after_exit();
    }

    /// The character's collider entered a hole.
    pub fn on_hazard_enter(&mut self) -> FallOutcome {
        if !self.is_alive() || self.is_recovering() {
            return FallOutcome::Ignored;
        }

        // Grappling characters are over the anchor line, not the floor.
        let grappling = self.grapple.is_active();
        if self.capabilities.hovers && !grappling {
            debug!("Character {}: hovering over hazard", self.id());
            return FallOutcome::Immune;
        }

        let damage = self.stats.fall_damage;
        self.health.hurt(damage);

        if self.teleport.is_charging() {
            self.teleport = AbilityPhase::Ready;
        }
        if self.bounce.is_charging() {
            self.bounce = AbilityPhase::Ready;
        }
        if self.dash.is_active() {
            self.exit_dash();
        }
        if self.bounce.is_active() {
            self.exit_bounce();
        }
        if grappling {
            self.exit_grapple();
        }
        if self.steady.is_active() {
            self.exit_steady();
        }
        self.preempt_sprint();
        self.break_link("fell into hazard");

        // Set directly: the resolver leaves a dead character's velocity as is.
        self.fall = AbilityPhase::active(self.stats.fall_recover_time);
        self.velocity = Vec2::ZERO;

        let died = !self.is_alive();
        debug!(
            "Character {}: fell for {} damage (died={})",
            self.id(),
            damage,
            died
        );
        FallOutcome::Fell { damage, died }
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Advance every timer and meter by `ctx.dt`. Order matters: later
    /// stages read exclusivity freshly updated by earlier ones.
    pub fn tick(&mut self, ctx: TickContext, world: &impl PhysicsQueries) {
        if !self.is_alive() {
            return;
        }
        let dt = ctx.dt.max(0.0);

        if let Some(observed) = ctx.observed_velocity {
            self.velocity = observed;
        }

        if let Some(pointer) = ctx.pointer.filter(|_| self.intent.moving) {
            self.aim_at(pointer);
        }

        self.advance_stamina(dt);

        if self.dash.advance(dt) == Some(PhaseEdge::Expired) {
            debug!("Character {}: dash finished", self.id());
            self.exit_dash();
            self.after_exit();
        }

        self.teleport.advance(dt);

        if self.bounce_launched {
            self.bounce_launched = false;
        } else if self.bounce.is_active() {
            // Collisions may redirect the bounce; only the speed is ours.
            self.bounce_direction = self.velocity.normalize_or(self.bounce_direction);
        }
        if self.bounce.advance(dt) == Some(PhaseEdge::Expired) {
            debug!("Character {}: bounce finished", self.id());
            self.exit_bounce();
            self.after_exit();
        }

        if self.grapple.advance(dt) == Some(PhaseEdge::Expired) {
            debug!("Character {}: grapple timed out", self.id());
            self.exit_grapple();
            self.after_exit();
        }

        if self.steady.advance(dt) == Some(PhaseEdge::Expired) {
            debug!("Character {}: steady finished", self.id());
            self.exit_steady();
            self.after_exit();
        }

        self.check_link_range(world);

        if self.fall.advance(dt) == Some(PhaseEdge::Expired) {
            debug!("Character {}: recovered from fall", self.id());
            self.fall = AbilityPhase::Ready;
            self.after_exit();
        }

        self.refresh_velocity();
    }

    fn advance_stamina(&mut self, dt: f32) {
        if self.sprinting && self.exclusive_active().is_none() {
            self.stamina.advance(dt, MeterDirection::Drain);
            if self.stamina.is_empty() {
                debug!("Character {}: out of stamina", self.id());
                self.sprinting = false;
                self.refresh_velocity();
            }
        } else {
            self.stamina.advance(dt, MeterDirection::Regen);
            if self.stamina.is_full() {
                self.try_start_sprint();
            }
        }
    }

    fn check_link_range(&mut self, world: &impl PhysicsQueries) {
        let LinkState::Linked { peer, .. } = self.link else {
            return;
        };
        let range = self.stats.link_range;

        match world.peer_position(peer) {
            Some(anchor) if anchor.distance_squared(self.position) <= range * range => {
                self.link = LinkState::Linked { peer, anchor };
            }
            Some(_) => self.break_link("peer out of range"),
            None => self.break_link("peer missing"),
        }
    }

    // ------------------------------------------------------------------
    // Motion intent
    // ------------------------------------------------------------------

    fn on_move(&mut self, direction: Vec2) {
        let direction = direction.clamp_length_max(1.0);
        self.intent.move_direction = direction;
        self.intent.moving = direction.length_squared() > f32::EPSILON;
        if self.intent.moving {
            self.intent.last_move_direction = direction;
        } else if self.sprinting {
            self.sprinting = false;
        }
        self.refresh_velocity();
    }

    fn on_aim(&mut self, sample: AimSample) {
        match sample {
            AimSample::Stick(direction) => {
                if direction.length_squared() <= f32::EPSILON {
                    return;
                }
                self.intent.aim_direction = direction.normalize();
            }
            AimSample::Pointer(point) => self.aim_at(point),
        }
    }

    fn aim_at(&mut self, point: Vec2) {
        let offset = point - self.position;
        if offset.length_squared() > f32::EPSILON {
            self.intent.aim_direction = offset.normalize();
        }
    }

    /// Unit direction for abilities that fire along the last movement.
    fn facing(&self) -> Vec2 {
        self.intent.last_move_direction.normalize_or(Vec2::X)
    }

    // ------------------------------------------------------------------
    // Guards and shared transitions
    // ------------------------------------------------------------------

    /// Role gate plus the fall-recovery lockout shared by every entry.
    fn permitted(&self, ability: Ability) -> bool {
        if !self.capabilities.permits(ability) {
            debug!(
                "Character {}: {:?} not permitted for {:?}",
                self.id(),
                ability,
                self.role()
            );
            return false;
        }
        if self.is_recovering() {
            debug!(
                "Character {}: {:?} rejected while recovering",
                self.id(),
                ability
            );
            return false;
        }
        true
    }

    fn reject(&self, ability: Ability, reason: &str) {
        debug!("Character {}: {:?} rejected ({})", self.id(), ability, reason);
    }

    fn refresh_velocity(&mut self) {
        self.velocity = MovementResolver::resolve(self);
    }

    /// Exclusive abilities take over motion; sprint intent stays latched.
    fn preempt_sprint(&mut self) {
        if self.sprinting {
            self.sprinting = false;
            debug!("Character {}: sprint pre-empted", self.id());
        }
    }

    fn try_start_sprint(&mut self) -> bool {
        if self.sprinting
            || !self.wants_sprint
            || !self.intent.moving
            || self.stamina.is_locked()
            || self.stamina.is_empty()
            || self.exclusive_active().is_some()
        {
            return false;
        }
        self.sprinting = true;
        self.refresh_velocity();
        debug!("Character {}: sprinting", self.id());
        true
    }

    /// Common tail of every exit: motion falls back to intent and a held
    /// sprint resumes.
    fn after_exit(&mut self) {
        self.refresh_velocity();
        self.try_start_sprint();
    }

    fn exit_dash(&mut self) {
        self.dash = AbilityPhase::cooling_down(self.stats.dash_cooldown);
    }

    fn exit_bounce(&mut self) {
        self.bounce_launched = false;
        self.material = SurfaceMaterial::Normal;
        self.bounce = AbilityPhase::cooling_down(self.stats.bounce_cooldown);
    }

    fn exit_grapple(&mut self) {
        self.grapple_anchor = None;
        self.grapple = AbilityPhase::cooling_down(self.stats.grapple_cooldown);
    }

    fn exit_steady(&mut self) {
        self.steady = AbilityPhase::cooling_down(self.stats.steady_cooldown);
    }

    fn break_link(&mut self, reason: &str) {
        if let Some(peer) = self.linked_peer() {
            debug!("Character {}: link to {} broken ({})", self.id(), peer, reason);
            self.link = LinkState::Unlinked;
        }
    }

    // ------------------------------------------------------------------
    // Sprint
    // ------------------------------------------------------------------

    fn press_sprint(&mut self) {
        if !self.capabilities.permits(Ability::Sprint) {
            self.reject(Ability::Sprint, "role");
            return;
        }
        self.wants_sprint = true;
        self.try_start_sprint();
    }

    fn release_sprint(&mut self) {
        self.wants_sprint = false;
        self.sprinting = false;
        self.refresh_velocity();
    }

    // ------------------------------------------------------------------
    // Dash
    // ------------------------------------------------------------------

    fn press_dash(&mut self) {
        if !self.permitted(Ability::Dash) {
            return;
        }
        if !self.dash.is_ready() {
            self.reject(Ability::Dash, "not ready");
            return;
        }
        if self.exclusive_active().is_some() || self.is_charging() {
            self.reject(Ability::Dash, "exclusive ability or charge in progress");
            return;
        }

        self.preempt_sprint();
        self.dash_direction = self.facing();
        self.dash = AbilityPhase::active(self.stats.dash_duration);
        self.refresh_velocity();
        debug!(
            "Character {}: dash toward {:?}",
            self.id(),
            self.dash_direction
        );
    }

    // ------------------------------------------------------------------
    // Teleport
    // ------------------------------------------------------------------

    fn press_teleport(&mut self) {
        if !self.permitted(Ability::Teleport) {
            return;
        }
        if !self.teleport.is_ready() {
            self.reject(Ability::Teleport, "charging or cooling down");
            return;
        }
        if self.exclusive_active().is_some() || self.bounce.is_charging() {
            self.reject(Ability::Teleport, "exclusive ability or charge in progress");
            return;
        }

        self.teleport = AbilityPhase::charging(
            self.stats.teleport_min_charge,
            self.stats.teleport_max_charge,
        );
        debug!("Character {}: charging teleport", self.id());
    }

    fn release_teleport(&mut self, world: &impl PhysicsQueries) {
        let AbilityPhase::Charging(mut charge) = self.teleport else {
            return;
        };

        let fraction = charge.consume();
        let destination =
            self.position + self.facing() * self.stats.teleport_distance * fraction;

        // Blocked destinations are a free retry: no cooldown, no movement.
        if world.overlap(destination, self.profile.footprint, QueryMask::Walls) {
            self.teleport = AbilityPhase::Ready;
            debug!(
                "Character {}: teleport to {:?} blocked",
                self.id(),
                destination
            );
            return;
        }

        self.position = destination;
        self.teleport = AbilityPhase::cooling_down(self.stats.teleport_cooldown);
        debug!("Character {}: teleported to {:?}", self.id(), destination);
    }

    // ------------------------------------------------------------------
    // Bounce
    // ------------------------------------------------------------------

    fn press_bounce(&mut self) {
        if !self.permitted(Ability::Bounce) {
            return;
        }
        if !self.bounce.is_ready() {
            self.reject(Ability::Bounce, "not ready");
            return;
        }
        if self.exclusive_active().is_some() || self.teleport.is_charging() {
            self.reject(Ability::Bounce, "exclusive ability or charge in progress");
            return;
        }

        self.bounce =
            AbilityPhase::charging(self.stats.bounce_min_charge, self.stats.bounce_max_charge);
        debug!("Character {}: charging bounce", self.id());
    }

    fn release_bounce(&mut self) {
        let AbilityPhase::Charging(mut charge) = self.bounce else {
            return;
        };

        // Partial charge shortens the bounce; speed is unchanged.
        let duration = self.stats.bounce_duration * charge.consume();

        self.preempt_sprint();
        self.bounce_direction = self.facing();
        self.bounce_launched = true;
        self.bounce = AbilityPhase::active(duration);
        self.material = SurfaceMaterial::Bouncy;
        self.refresh_velocity();
        debug!("Character {}: bouncing for {}s", self.id(), duration);
    }

    // ------------------------------------------------------------------
    // Grapple
    // ------------------------------------------------------------------

    fn release_grapple(&mut self, world: &impl PhysicsQueries) {
        if !self.permitted(Ability::Grapple) {
            return;
        }
        if !self.grapple.is_ready() {
            self.reject(Ability::Grapple, "not ready");
            return;
        }
        match self.exclusive_active() {
            None | Some(ExclusiveAbility::Steady) => {}
            Some(_) => {
                self.reject(Ability::Grapple, "exclusive ability in progress");
                return;
            }
        }
        if self.is_charging() {
            self.reject(Ability::Grapple, "charge in progress");
            return;
        }

        let aim = self.intent.aim_direction;
        let Some(hit) = world.raycast(
            self.position,
            aim,
            self.stats.grapple_range,
            QueryMask::Walls,
        ) else {
            debug!("Character {}: grapple missed", self.id());
            return;
        };

        if self.steady.is_active() {
            self.exit_steady();
        }
        self.preempt_sprint();
        self.grapple_direction = aim;
        self.grapple_anchor = Some(hit.point);
        self.grapple = AbilityPhase::active(self.stats.grapple_duration);
        self.refresh_velocity();
        debug!(
            "Character {}: grappling to {:?} ({} away)",
            self.id(),
            hit.point,
            hit.distance
        );
    }

    // ------------------------------------------------------------------
    // Steady
    // ------------------------------------------------------------------

    fn press_steady(&mut self) {
        if !self.permitted(Ability::Steady) {
            return;
        }

        if self.steady.is_active() {
            debug!("Character {}: steady released early", self.id());
            self.exit_steady();
            self.after_exit();
            return;
        }

        if !self.steady.is_ready() {
            self.reject(Ability::Steady, "cooling down");
            return;
        }
        if self.exclusive_active().is_some() || self.is_charging() {
            self.reject(Ability::Steady, "exclusive ability or charge in progress");
            return;
        }

        self.preempt_sprint();
        self.steady = AbilityPhase::active(self.stats.steady_duration);
        self.refresh_velocity();
        debug!("Character {}: steadying", self.id());
    }

    // ------------------------------------------------------------------
    // Link
    // ------------------------------------------------------------------

    fn press_link(&mut self, world: &impl PhysicsQueries) {
        if !self.permitted(Ability::Link) {
            return;
        }

        if self.link != LinkState::Unlinked {
            self.break_link("toggled off");
            return;
        }

        let own_id = self.id();
        let nearest = world
            .boxcast(
                self.position,
                self.profile.link_probe,
                self.intent.aim_direction,
                self.stats.link_range,
                QueryMask::Characters,
            )
            .into_iter()
            .filter_map(|hit| match hit.character {
                Some(id) if id != own_id => Some((id, hit)),
                _ => None,
            })
            .min_by(|(_, a), (_, b)| a.distance.total_cmp(&b.distance));

        let Some((peer, hit)) = nearest else {
            debug!("Character {}: no link target", self.id());
            return;
        };

        let anchor = world.peer_position(peer).unwrap_or(hit.point);
        self.link = LinkState::Linked { peer, anchor };
        debug!("Character {}: linked to {}", self.id(), peer);
    }
}
