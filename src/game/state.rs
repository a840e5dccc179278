//! Battle State
//!
//! The authoritative world: mech and projectile registries, player control
//! associations and the arena. Uses BTreeMap for deterministic iteration
//! order, so splash scans, collider snapshots and state hashes are stable.

use std::collections::BTreeMap;

use thiserror::Error;
use serde::{Serialize, Deserialize};
use tracing::{info, warn};

use crate::core::hash::{compute_state_hash, StateHash};
use crate::core::rng::{derive_battle_seed, DeterministicRng};
use crate::game::collision::MechCollider;
use crate::game::config::{ArenaLayout, SpawnPoint};
use crate::game::definitions::{DefinitionCatalog, MechTypeId};
use crate::game::events::{EventQueue, GameEvent, GameEventData};
use crate::game::mech::{Mech, MechId};
use crate::game::projectile::{Projectile, ProjectileId};

// =============================================================================
// PLAYER ID
// =============================================================================

/// Unique player identifier (UUID as bytes).
///
/// Implements Ord for deterministic BTreeMap ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct PlayerId(pub [u8; 16]);

impl PlayerId {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Create a fresh random id.
    pub fn random() -> Self {
        Self(*uuid::Uuid::new_v4().as_bytes())
    }

    /// Create from UUID string.
    pub fn from_uuid_str(s: &str) -> Option<Self> {
        uuid::Uuid::parse_str(s)
            .ok()
            .map(|u| Self(*u.as_bytes()))
    }

    /// Convert to UUID string.
    pub fn to_uuid_string(&self) -> String {
        uuid::Uuid::from_bytes(self.0).to_string()
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Reasons a mech could not be spawned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpawnError {
    /// Mech type not in the catalog
    #[error("unknown mech type {0}")]
    UnknownMechType(MechTypeId),
    /// Mech instance not in the registry
    #[error("unknown mech {0:?}")]
    UnknownMech(MechId),
    /// Arena has no spawn points
    #[error("arena has no spawn points")]
    NoSpawnPoint,
    /// Player already controls a mech
    #[error("player {player:?} already controls {mech:?}")]
    AlreadyControlling {
        /// Player
        player: PlayerId,
        /// Mech they control
        mech: MechId,
    },
}

// =============================================================================
// BATTLE STATE
// =============================================================================

/// Complete authoritative state of a battle.
#[derive(Clone, Debug)]
pub struct BattleState {
    /// Battle identifier
    pub battle_id: [u8; 16],

    /// Current tick
    pub tick: u32,

    /// RNG seed (for verification)
    pub rng_seed: u64,

    /// Deterministic RNG state (spawn point selection)
    pub rng: DeterministicRng,

    /// Static arena
    pub arena: ArenaLayout,

    /// All mechs, live and wrecked
    pub mechs: BTreeMap<MechId, Mech>,

    /// All projectiles
    pub projectiles: BTreeMap<ProjectileId, Projectile>,

    /// Which mech each player controls
    pub controllers: BTreeMap<PlayerId, MechId>,

    /// Mech type each player respawns as
    pub loadouts: BTreeMap<PlayerId, MechTypeId>,

    /// Pending events for the current tick
    pub(crate) events: EventQueue,

    catalog: DefinitionCatalog,
    next_mech_id: u32,
    next_projectile_id: u32,
}

impl BattleState {
    /// Create a battle seeded from its id.
    pub fn new(battle_id: [u8; 16], catalog: DefinitionCatalog, arena: ArenaLayout) -> Self {
        Self::with_seed(battle_id, derive_battle_seed(&battle_id), catalog, arena)
    }

    /// Create a battle with an explicit seed.
    pub fn with_seed(battle_id: [u8; 16], rng_seed: u64, catalog: DefinitionCatalog, arena: ArenaLayout) -> Self {
        Self {
            battle_id,
            tick: 0,
            rng_seed,
            rng: DeterministicRng::new(rng_seed),
            arena,
            mechs: BTreeMap::new(),
            projectiles: BTreeMap::new(),
            controllers: BTreeMap::new(),
            loadouts: BTreeMap::new(),
            events: EventQueue::new(),
            catalog,
            next_mech_id: 1,
            next_projectile_id: 1,
        }
    }

    /// Shared definitions.
    pub fn catalog(&self) -> &DefinitionCatalog {
        &self.catalog
    }

    fn pick_spawn_point(&mut self) -> Result<SpawnPoint, SpawnError> {
        self.rng
            .choose(&self.arena.spawn_points)
            .copied()
            .ok_or(SpawnError::NoSpawnPoint)
    }

    /// Spawn a player-controlled mech at a random spawn point.
    pub fn spawn_player(&mut self, player: PlayerId, mech_type: MechTypeId) -> Result<MechId, SpawnError> {
        if let Some(&mech) = self.controllers.get(&player) {
            return Err(SpawnError::AlreadyControlling { player, mech });
        }
        if self.catalog.mech(mech_type).is_none() {
            return Err(SpawnError::UnknownMechType(mech_type));
        }

        let spawn = self.pick_spawn_point()?;
        let id = self.spawn_mech(mech_type, Some(player), spawn)?;
        self.loadouts.insert(player, mech_type);
        info!(player = %player.to_uuid_string(), mech = id.0, mech_type, "player joined");
        Ok(id)
    }

    /// Create, register and start a mech at `spawn`.
    pub fn spawn_mech(
        &mut self,
        mech_type: MechTypeId,
        controller: Option<PlayerId>,
        spawn: SpawnPoint,
    ) -> Result<MechId, SpawnError> {
        let definition = self
            .catalog
            .mech(mech_type)
            .cloned()
            .ok_or(SpawnError::UnknownMechType(mech_type))?;

        let id = MechId(self.next_mech_id);
        self.next_mech_id += 1;

        let mut mech = Mech::new(id, definition, &self.catalog, controller, spawn.position, spawn.forward);
        self.events.push(GameEventData::MechSpawned {
            mech: id,
            mech_type,
            controller,
            position: spawn.position,
        });
        mech.start(&mut self.events);

        self.mechs.insert(id, mech);
        if let Some(player) = controller {
            self.controllers.insert(player, id);
        }
        Ok(id)
    }

    /// Move `player`'s control from the dead `old_mech` to a fresh instance.
    pub fn respawn(&mut self, player: PlayerId, old_mech: MechId) -> Result<MechId, SpawnError> {
        let mech_type = match self.loadouts.get(&player) {
            Some(mech_type) => *mech_type,
            None => self
                .mechs
                .get(&old_mech)
                .map(|m| m.definition().id)
                .ok_or(SpawnError::UnknownMech(old_mech))?,
        };

        if self.catalog.mech(mech_type).is_none() {
            return Err(SpawnError::UnknownMechType(mech_type));
        }
        // Control only moves once the new mech is certain
        let spawn = self.pick_spawn_point()?;

        if self.controllers.get(&player) == Some(&old_mech) {
            self.controllers.remove(&player);
        }
        let new_mech = self.spawn_mech(mech_type, Some(player), spawn)?;
        self.events.push(GameEventData::MechRespawned { controller: player, old_mech, new_mech });
        info!(player = %player.to_uuid_string(), old = old_mech.0, new = new_mech.0, "mech respawned");
        Ok(new_mech)
    }

    /// Remove a mech from the world.
    pub fn despawn_mech(&mut self, id: MechId) -> Option<Mech> {
        let mech = self.mechs.remove(&id)?;
        self.controllers.retain(|_, controlled| *controlled != id);
        self.events.push(GameEventData::MechDespawned { mech: id });
        Some(mech)
    }

    /// Spawn and launch a projectile from a mech's weapon.
    pub fn launch_projectile(&mut self, owner: MechId, weapon_index: u8) -> Option<ProjectileId> {
        let Some(mech) = self.mechs.get(&owner) else {
            warn!(mech = owner.0, "launch from unknown mech");
            return None;
        };
        let definition = mech.weapon(weapon_index as usize)?.definition().clone();
        let (origin, forward) = mech.muzzle();

        let id = ProjectileId(self.next_projectile_id);
        self.next_projectile_id += 1;

        let mut projectile = Projectile::new(id, definition);
        projectile.launch(owner, weapon_index, origin, forward);
        self.events.push(GameEventData::ProjectileLaunched {
            projectile: id,
            owner,
            weapon_index,
            position: origin,
            forward: projectile.forward(),
        });
        self.projectiles.insert(id, projectile);
        Some(id)
    }

    /// Mech controlled by a player.
    pub fn controlled_mech(&self, player: &PlayerId) -> Option<MechId> {
        self.controllers.get(player).copied()
    }

    /// Get a mech by id.
    pub fn mech(&self, id: MechId) -> Option<&Mech> {
        self.mechs.get(&id)
    }

    /// Get a mech mutably by id.
    pub fn mech_mut(&mut self, id: MechId) -> Option<&mut Mech> {
        self.mechs.get_mut(&id)
    }

    /// Apply damage to a mech outside of weapon fire (hazards, admin).
    pub fn damage_mech(&mut self, id: MechId, amount: crate::core::fixed::Fixed) -> bool {
        match self.mechs.get_mut(&id) {
            Some(mech) => mech.apply_damage(amount, &mut self.events),
            None => false,
        }
    }

    /// Collider snapshot of every collidable mech, in id order.
    pub fn mech_colliders(&self) -> Vec<MechCollider> {
        mech_colliders(&self.mechs)
    }

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, self.rng_seed, |hasher| {
            hasher.update_bytes(&self.battle_id);
            hasher.update_bytes(&self.catalog.fingerprint());

            for mech in self.mechs.values() {
                mech.hash_into(hasher);
            }

            for projectile in self.projectiles.values() {
                projectile.hash_into(hasher);
            }

            for (player, mech) in &self.controllers {
                hasher.update_bytes(player.as_bytes());
                hasher.update_u32(mech.0);
            }

            let [s0, s1] = self.rng.state();
            hasher.update_u64(s0);
            hasher.update_u64(s1);
        })
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.events.take()
    }
}

/// Collider snapshot of every collidable mech in a registry, in id order.
pub fn mech_colliders(mechs: &BTreeMap<MechId, Mech>) -> Vec<MechCollider> {
    mechs.values().filter_map(Mech::collider).collect()
}

// =============================================================================
// TESTS
// =============================================================================
