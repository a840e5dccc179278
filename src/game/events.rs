//! Game Events
//!
//! Every authoritative change is recorded as a `GameEvent`. The effect
//! variants (`*Effect`) are what presentation mirrors play back; the rest
//! form the audit log used by replays and tests.

use serde::{Serialize, Deserialize};

use crate::core::fixed::Fixed;
use crate::core::vec3::FixedVec3;
use crate::game::collision::HitTarget;
use crate::game::definitions::MechTypeId;
use crate::game::mech::{MechId, MechState};
use crate::game::projectile::ProjectileId;
use crate::game::state::PlayerId;

/// Event category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// State transitions (death first among them)
    Lifecycle = 0,
    /// Damage and heat application
    Combat = 1,
    /// Projectile bookkeeping
    Projectile = 2,
    /// Presentation effects
    Effect = 3,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// A mech instance was created and started
    MechSpawned {
        /// New mech
        mech: MechId,
        /// Mech type
        mech_type: MechTypeId,
        /// Controlling player, if any
        controller: Option<PlayerId>,
        /// Spawn position
        position: FixedVec3,
    },

    /// A mech changed life-cycle state
    MechStateChanged {
        /// Mech
        mech: MechId,
        /// Previous state
        from: MechState,
        /// New state
        to: MechState,
    },

    /// Heat reached the mech's maximum
    MechOverheated {
        /// Mech
        mech: MechId,
    },

    /// A player's control moved to a fresh mech
    MechRespawned {
        /// Player
        controller: PlayerId,
        /// Dead instance (left as wreckage)
        old_mech: MechId,
        /// Replacement instance
        new_mech: MechId,
    },

    /// A mech was removed from the world
    MechDespawned {
        /// Mech
        mech: MechId,
    },

    /// Damage and heat applied to a mech
    DamageDealt {
        /// Firing mech
        source: MechId,
        /// Firing weapon slot
        weapon_index: u8,
        /// Damaged mech
        target: MechId,
        /// Damage applied
        damage: Fixed,
        /// Heat applied
        heat: Fixed,
        /// Whether this was splash rather than a direct hit
        splash: bool,
    },

    /// Weapon started firing (muzzle flash, sound)
    WeaponFireEffect {
        /// Firing mech
        mech: MechId,
        /// Weapon slot
        weapon_index: u8,
    },

    /// Projectile struck something
    ProjectileImpactEffect {
        /// Projectile
        projectile: ProjectileId,
        /// Point of impact
        position: FixedVec3,
        /// Surface normal
        normal: FixedVec3,
    },

    /// Instant-hit beam struck something
    BeamImpactEffect {
        /// Firing mech
        mech: MechId,
        /// Weapon slot
        weapon_index: u8,
        /// Point of impact
        position: FixedVec3,
        /// Surface normal
        normal: FixedVec3,
    },

    /// Mech entered `Dying` (explosion)
    MechDeathEffect {
        /// Mech
        mech: MechId,
    },

    /// Projectile armed and in flight
    ProjectileLaunched {
        /// Projectile
        projectile: ProjectileId,
        /// Firing mech
        owner: MechId,
        /// Firing weapon slot
        weapon_index: u8,
        /// Muzzle position
        position: FixedVec3,
        /// Flight direction
        forward: FixedVec3,
    },

    /// Projectile resolved without striking anything
    ProjectileExpired {
        /// Projectile
        projectile: ProjectileId,
        /// Final position
        position: FixedVec3,
    },

    /// Projectile struck a target and its payload was delivered
    ProjectileHit {
        /// Projectile
        projectile: ProjectileId,
        /// What it hit
        target: HitTarget,
    },

    /// Projectile removed from the world
    ProjectileDespawned {
        /// Projectile
        projectile: ProjectileId,
    },
}

impl GameEventData {
    /// Category of this event.
    pub fn priority(&self) -> EventPriority {
        match self {
            Self::MechSpawned { .. }
            | Self::MechStateChanged { .. }
            | Self::MechRespawned { .. }
            | Self::MechDespawned { .. } => EventPriority::Lifecycle,
            Self::DamageDealt { .. } | Self::MechOverheated { .. } => EventPriority::Combat,
            Self::ProjectileLaunched { .. }
            | Self::ProjectileExpired { .. }
            | Self::ProjectileHit { .. }
            | Self::ProjectileDespawned { .. } => EventPriority::Projectile,
            Self::WeaponFireEffect { .. }
            | Self::ProjectileImpactEffect { .. }
            | Self::BeamImpactEffect { .. }
            | Self::MechDeathEffect { .. } => EventPriority::Effect,
        }
    }

    /// Mech this event is about.
    pub fn subject(&self) -> Option<MechId> {
        match self {
            Self::MechSpawned { mech, .. }
            | Self::MechStateChanged { mech, .. }
            | Self::MechOverheated { mech }
            | Self::MechDespawned { mech }
            | Self::WeaponFireEffect { mech, .. }
            | Self::BeamImpactEffect { mech, .. }
            | Self::MechDeathEffect { mech } => Some(*mech),
            Self::MechRespawned { new_mech, .. } => Some(*new_mech),
            Self::DamageDealt { target, .. } => Some(*target),
            Self::ProjectileLaunched { owner, .. } => Some(*owner),
            Self::ProjectileImpactEffect { .. }
            | Self::ProjectileExpired { .. }
            | Self::ProjectileHit { .. }
            | Self::ProjectileDespawned { .. } => None,
        }
    }

    /// Whether observers play this event back.
    pub fn is_effect(&self) -> bool {
        self.priority() == EventPriority::Effect
    }
}

/// A game event stamped with its tick and emission order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Category
    pub priority: EventPriority,

    /// Mech the event is about
    pub mech: Option<MechId>,

    /// Emission order within the tick
    pub sequence: u32,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u32, sequence: u32, data: GameEventData) -> Self {
        Self {
            tick,
            priority: data.priority(),
            mech: data.subject(),
            sequence,
            data,
        }
    }
}

impl PartialEq for GameEvent {
    fn eq(&self, other: &Self) -> bool {
        self.tick == other.tick && self.sequence == other.sequence
    }
}

impl Eq for GameEvent {}

/// Ordered event sink for one battle.
///
/// Components push raw `GameEventData`; the queue stamps tick and sequence.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    tick: u32,
    next_sequence: u32,
    events: Vec<GameEvent>,
}

impl EventQueue {
    /// Create an empty queue at tick 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp subsequent events with `tick`.
    pub fn begin_tick(&mut self, tick: u32) {
        if tick != self.tick {
            self.tick = tick;
            self.next_sequence = 0;
        }
    }

    /// Current tick stamp.
    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// Record an event.
    pub fn push(&mut self, data: GameEventData) {
        let event = GameEvent::new(self.tick, self.next_sequence, data);
        self.next_sequence += 1;
        self.events.push(event);
    }

    /// Take all pending events in emission order.
    pub fn take(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Pending events.
    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if no events are pending.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
