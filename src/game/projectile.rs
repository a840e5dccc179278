//! Projectile Ballistics
//!
//! Server-stepped projectiles. Each step probes ahead along the flight path
//! by `look_ahead` times the step length; a hit freezes the projectile in
//! place, otherwise it advances until `range`. Distance is derived from the
//! whole ticks flown, so it never drifts from `speed * time`.
//!
//! Life cycle: inert → `launch()` → in flight → impact or max-range dud →
//! despawn countdown → expired.

use std::sync::Arc;

use serde::{Serialize, Deserialize};
#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::core::fixed::{fixed_mul, Fixed};
use crate::core::hash::StateHasher;
use crate::core::time::TickRate;
use crate::core::vec3::FixedVec3;
use crate::game::collision::{CollisionProbe, HitTarget, RayHit, RayQuery};
use crate::game::definitions::WeaponDefinition;
use crate::game::events::{EventQueue, GameEventData};
use crate::game::mech::MechId;

/// Unique projectile identifier (monotonic per battle).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectileId(pub u32);

/// Result of one projectile step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Not launched yet
    Inert,
    /// Advanced without hitting anything
    InFlight,
    /// Struck something; payload awaits delivery
    Impact(RayHit),
    /// Reached maximum range without hitting anything
    MaxRange,
    /// Resolved, waiting out the despawn delay
    Lingering,
    /// Ready to be removed
    Expired,
}

/// A projectile in the world.
#[derive(Clone, Debug)]
pub struct Projectile {
    id: ProjectileId,
    owner: Option<MechId>,
    weapon_index: u8,
    definition: Arc<WeaponDefinition>,
    position: FixedVec3,
    forward: FixedVec3,
    flight_ticks: u32,
    distance_traveled: Fixed,
    hit: Option<RayHit>,
    is_hit: bool,
    payload_delivered: bool,
    despawn_ticks: u32,
    launched: bool,
}

impl Projectile {
    /// Create an inert projectile for a weapon type.
    pub fn new(id: ProjectileId, definition: Arc<WeaponDefinition>) -> Self {
        Self {
            id,
            owner: None,
            weapon_index: 0,
            definition,
            position: FixedVec3::ZERO,
            forward: FixedVec3::FORWARD,
            flight_ticks: 0,
            distance_traveled: 0,
            hit: None,
            is_hit: false,
            payload_delivered: false,
            despawn_ticks: 0,
            launched: false,
        }
    }

    /// Arm the projectile at the muzzle.
    pub fn launch(&mut self, owner: MechId, weapon_index: u8, position: FixedVec3, forward: FixedVec3) {
        self.owner = Some(owner);
        self.weapon_index = weapon_index;
        self.position = position;
        self.forward = forward.normalize();
        self.launched = true;
    }

    /// Advance by one tick against `probe`.
    ///
    /// An impact is reported again on every step until its payload is taken
    /// with [`Projectile::deliver_payload`].
    pub fn step(&mut self, rate: TickRate, probe: &dyn CollisionProbe, events: &mut EventQueue) -> StepOutcome {
        if !self.launched {
            return StepOutcome::Inert;
        }

        if self.is_hit {
            if let (Some(hit), false) = (self.hit, self.payload_delivered) {
                return StepOutcome::Impact(hit);
            }
            self.despawn_ticks = self.despawn_ticks.saturating_add(1);
            return if self.despawn_ticks >= rate.ticks(self.definition.projectile.despawn_delay) {
                StepOutcome::Expired
            } else {
                StepOutcome::Lingering
            };
        }

        let params = &self.definition.projectile;
        let flight_ticks = self.flight_ticks.saturating_add(1);
        let traveled = rate
            .distance_wide(params.speed, flight_ticks)
            .clamp(0, Fixed::MAX as i64) as Fixed;
        let step_len = traveled - self.distance_traveled;
        let query = RayQuery {
            origin: self.position,
            direction: self.forward,
            max_distance: fixed_mul(step_len, params.look_ahead),
            mask: params.collision_mask,
            ignore: self.owner,
        };

        if let Some(hit) = probe.cast(&query) {
            self.hit = Some(hit);
            self.is_hit = true;
            events.push(GameEventData::ProjectileImpactEffect {
                projectile: self.id,
                position: hit.point,
                normal: hit.normal,
            });
            return StepOutcome::Impact(hit);
        }

        self.position = self.position + self.forward.scale(step_len);
        self.flight_ticks = flight_ticks;
        self.distance_traveled = traveled;

        #[cfg(feature = "debug-tracing")]
        trace!(projectile = self.id.0, position = %self.position, distance = self.distance_traveled, "projectile step");

        if self.distance_traveled >= self.definition.range {
            // Dud: resolved with no payload
            self.is_hit = true;
            self.payload_delivered = true;
            events.push(GameEventData::ProjectileExpired {
                projectile: self.id,
                position: self.position,
            });
            return StepOutcome::MaxRange;
        }

        StepOutcome::InFlight
    }

    /// Take the payload of a genuine hit. Returns the hit at most once.
    pub fn deliver_payload(&mut self) -> Option<RayHit> {
        if !self.is_hit || self.payload_delivered {
            return None;
        }
        let hit = self.hit?;
        self.payload_delivered = true;
        Some(hit)
    }

    /// Projectile id.
    pub fn id(&self) -> ProjectileId {
        self.id
    }

    /// Firing mech.
    pub fn owner(&self) -> Option<MechId> {
        self.owner
    }

    /// Firing weapon slot.
    pub fn weapon_index(&self) -> u8 {
        self.weapon_index
    }

    /// Weapon that fired this projectile.
    pub fn definition(&self) -> &Arc<WeaponDefinition> {
        &self.definition
    }

    /// Current position.
    pub fn position(&self) -> FixedVec3 {
        self.position
    }

    /// Flight direction.
    pub fn forward(&self) -> FixedVec3 {
        self.forward
    }

    /// Distance covered so far.
    pub fn distance_traveled(&self) -> Fixed {
        self.distance_traveled
    }

    /// Recorded impact, if any.
    pub fn hit(&self) -> Option<RayHit> {
        self.hit
    }

    /// What the recorded impact struck.
    pub fn hit_target(&self) -> Option<HitTarget> {
        self.hit.map(|h| h.target)
    }

    /// Flight resolved (impact or dud).
    pub fn is_hit(&self) -> bool {
        self.is_hit
    }

    /// Payload resolved.
    pub fn payload_delivered(&self) -> bool {
        self.payload_delivered
    }

    /// Armed.
    pub fn launched(&self) -> bool {
        self.launched
    }

    /// Ticks since resolution.
    pub fn despawn_ticks(&self) -> u32 {
        self.despawn_ticks
    }

    /// Hash projectile state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.id.0);
        hasher.update_u32(self.owner.map_or(u32::MAX, |m| m.0));
        hasher.update_u8(self.weapon_index);
        hasher.update_vec3(self.position);
        hasher.update_vec3(self.forward);
        hasher.update_u32(self.flight_ticks);
        hasher.update_fixed(self.distance_traveled);
        hasher.update_bool(self.is_hit);
        hasher.update_bool(self.payload_delivered);
        hasher.update_u32(self.despawn_ticks);
    }
}

// =============================================================================
// TESTS
// =============================================================================
