//! Mech Aggregate
//!
//! The authority boundary for one mech instance: replicated health, heat
//! and life-cycle state, two weapon slots, fire-command validation and
//! damage/heat application.
//!
//! ## Life cycle
//!
//! ```text
//!  Inactive ─► Spawning ─► Alive ─► Dying ──(5 s)──► Dead ─► Despawning
//!                 (immediate)   health 0        respawn   wreckage expired
//! ```
//!
//! Only `Alive` mechs take damage or heat, or accept fire commands. All
//! timed transitions count ticks advanced by `update()`.

use std::sync::Arc;

use serde::{Serialize, Deserialize};
use tracing::{debug, info, warn};
#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::core::fixed::{fixed_clamp, Fixed, WORLD_EXTENT};
use crate::core::hash::StateHasher;
use crate::core::time::TickRate;
use crate::core::vec3::FixedVec3;
use crate::game::collision::MechCollider;
use crate::game::config::SimConfig;
use crate::game::definitions::{DefinitionCatalog, MechDefinition};
use crate::game::events::{EventQueue, GameEventData};
use crate::game::state::PlayerId;
use crate::game::weapon::{HitCheck, Weapon, WEAPON_SLOTS};

/// Unique mech instance identifier (monotonic per battle).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MechId(pub u32);

/// Mech life-cycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MechState {
    /// Created, not started
    Inactive = 0,
    /// Transient, resolves to `Alive` immediately
    Spawning = 1,
    /// Controllable and damageable
    Alive = 2,
    /// Destroyed, death effect playing
    Dying = 3,
    /// Wreckage; control has moved on
    Dead = 4,
    /// Being removed from the world
    Despawning = 5,
}

impl MechState {
    /// Whether a mech in this state has a collider in the world.
    pub fn is_collidable(self) -> bool {
        matches!(self, MechState::Alive | MechState::Dying | MechState::Dead)
    }
}

/// Heat dissipation process. At most one per mech.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CoolingProcess {
    elapsed_ticks: u32,
}

/// One mech instance.
#[derive(Clone, Debug)]
pub struct Mech {
    id: MechId,
    definition: Arc<MechDefinition>,
    controller: Option<PlayerId>,

    position: FixedVec3,
    forward: FixedVec3,

    // Replicated
    current_health: Fixed,
    current_heat: Fixed,
    current_speed: Fixed,
    current_turn: Fixed,
    state: MechState,

    weapons: [Option<Weapon>; WEAPON_SLOTS],
    overheated: bool,
    cooling: Option<CoolingProcess>,
    dying_ticks: u32,
    wreck_ticks: u32,
    respawn_pending: bool,
}

impl Mech {
    /// Create an `Inactive` mech and mount its weapons from the catalog.
    pub fn new(
        id: MechId,
        definition: Arc<MechDefinition>,
        catalog: &DefinitionCatalog,
        controller: Option<PlayerId>,
        position: FixedVec3,
        forward: FixedVec3,
    ) -> Self {
        let mut weapons: [Option<Weapon>; WEAPON_SLOTS] = Default::default();
        for (slot, weapon_id) in definition.weapons.iter().take(WEAPON_SLOTS).enumerate() {
            match catalog.weapon(*weapon_id) {
                Some(weapon_def) => {
                    weapons[slot] = Some(Weapon::new(weapon_def.clone(), slot as u8, Some(id)));
                }
                None => warn!(mech = id.0, weapon_id, "mounted weapon missing from catalog"),
            }
        }

        let forward = if forward.is_zero() { FixedVec3::FORWARD } else { forward.normalize() };

        Self {
            id,
            current_health: definition.max_health,
            definition,
            controller,
            position: position.clamp_extent(WORLD_EXTENT),
            forward,
            current_heat: 0,
            current_speed: 0,
            current_turn: 0,
            state: MechState::Inactive,
            weapons,
            overheated: false,
            cooling: None,
            dying_ticks: 0,
            wreck_ticks: 0,
            respawn_pending: false,
        }
    }

    /// Initialise replicated stats and bring the mech to `Alive`.
    pub fn start(&mut self, events: &mut EventQueue) {
        self.current_health = self.definition.max_health;
        self.current_heat = 0;
        self.current_speed = 0;
        self.current_turn = 0;
        self.overheated = false;
        self.cooling = None;
        self.set_state(MechState::Spawning, events);
    }

    // =========================================================================
    // STATE MACHINE
    // =========================================================================

    /// Transition to `new_state`. Setting the current state is a no-op.
    ///
    /// The whole transition (including `Spawning → Alive`) completes before
    /// any event is emitted.
    pub(crate) fn set_state(&mut self, new_state: MechState, events: &mut EventQueue) -> bool {
        if new_state == self.state {
            return false;
        }

        let from = self.state;
        self.state = new_state;
        if self.state == MechState::Spawning {
            self.state = MechState::Alive;
        }

        match self.state {
            MechState::Dying => {
                self.dying_ticks = 0;
                self.current_speed = 0;
                self.current_turn = 0;
                for weapon in self.weapons.iter_mut().flatten() {
                    weapon.cease_fire();
                }
            }
            MechState::Dead => {
                self.wreck_ticks = 0;
                self.respawn_pending = self.controller.is_some();
            }
            _ => {}
        }

        info!(mech = self.id.0, ?from, to = ?self.state, "mech state changed");
        events.push(GameEventData::MechStateChanged { mech: self.id, from, to: self.state });
        if self.state == MechState::Dying {
            events.push(GameEventData::MechDeathEffect { mech: self.id });
        }
        true
    }

    // =========================================================================
    // DAMAGE & HEAT
    // =========================================================================

    /// Apply damage (negative heals). Returns false unless `Alive`.
    ///
    /// Health reaching zero is the only way into `Dying`.
    pub fn apply_damage(&mut self, amount: Fixed, events: &mut EventQueue) -> bool {
        if self.state != MechState::Alive {
            return false;
        }

        let health = self.current_health.saturating_sub(amount);
        self.current_health = fixed_clamp(health, 0, self.definition.max_health);

        if self.current_health <= 0 {
            self.current_health = 0;
            self.set_state(MechState::Dying, events);
        }
        true
    }

    /// Apply heat (negative cools). Returns false unless `Alive`.
    pub fn apply_heat(&mut self, amount: Fixed, events: &mut EventQueue) -> bool {
        if self.state != MechState::Alive {
            return false;
        }

        let previous = self.current_heat;
        let heat = self.current_heat.saturating_add(amount).max(0);
        self.current_heat = heat.min(self.definition.max_heat);
        self.refresh_overheat(events);

        if self.current_heat > 0 && (previous == 0 || self.cooling.is_none()) {
            // (Re)start; any previous process is replaced
            self.cooling = Some(CoolingProcess { elapsed_ticks: 0 });
        }
        true
    }

    fn refresh_overheat(&mut self, events: &mut EventQueue) {
        if self.current_heat >= self.definition.max_heat {
            if !self.overheated {
                self.overheated = true;
                warn!(mech = self.id.0, "mech overheated");
                events.push(GameEventData::MechOverheated { mech: self.id });
            }
        } else {
            self.overheated = false;
        }
    }

    fn advance_cooling(&mut self, interval: u32, events: &mut EventQueue) {
        let Some(mut process) = self.cooling else {
            return;
        };

        process.elapsed_ticks = process.elapsed_ticks.saturating_add(1);
        while interval > 0 && process.elapsed_ticks >= interval && self.current_heat > 0 {
            process.elapsed_ticks -= interval;
            self.current_heat = (self.current_heat - self.definition.cooling_rate).max(0);
        }

        self.cooling = if self.current_heat > 0 { Some(process) } else { None };
        self.refresh_overheat(events);
    }

    // =========================================================================
    // COMMANDS
    // =========================================================================

    fn weapon_slot(&mut self, weapon_index: i32) -> Option<&mut Weapon> {
        let slot = usize::try_from(weapon_index).ok().filter(|i| *i < WEAPON_SLOTS)?;
        self.weapons[slot].as_mut()
    }

    /// Validate and start firing the weapon in `weapon_index`.
    pub fn commence_fire(&mut self, weapon_index: i32, events: &mut EventQueue) -> bool {
        let id = self.id;
        let alive = self.state == MechState::Alive;
        let Some(weapon) = self.weapon_slot(weapon_index) else {
            warn!(mech = id.0, weapon_index, "fire request for invalid weapon index");
            return false;
        };

        if !alive {
            debug!(mech = id.0, weapon_index, "fire request from non-alive mech ignored");
            return false;
        }

        if !weapon.commence_fire() {
            return false;
        }

        events.push(GameEventData::WeaponFireEffect { mech: id, weapon_index: weapon.weapon_index() });
        true
    }

    /// Release the trigger on the weapon in `weapon_index`.
    pub fn cease_fire(&mut self, weapon_index: i32) -> bool {
        let id = self.id;
        let Some(weapon) = self.weapon_slot(weapon_index) else {
            warn!(mech = id.0, weapon_index, "cease fire for invalid weapon index");
            return false;
        };
        weapon.cease_fire()
    }

    /// Accept a pose from the locomotion collaborator. Returns false unless `Alive`.
    ///
    /// The position is clamped to `WORLD_EXTENT` on every axis.
    pub fn set_transform(&mut self, position: FixedVec3, forward: FixedVec3, speed: Fixed, turn: Fixed) -> bool {
        if self.state != MechState::Alive {
            return false;
        }
        self.position = position.clamp_extent(WORLD_EXTENT);
        if !forward.is_zero() {
            self.forward = forward.normalize();
        }
        let max_speed = self.definition.max_speed;
        let max_turn = self.definition.max_turn;
        self.current_speed = fixed_clamp(speed, -max_speed, max_speed);
        self.current_turn = fixed_clamp(turn, -max_turn, max_turn);
        true
    }

    // =========================================================================
    // TICK
    // =========================================================================

    /// Advance by one tick at `config.tick_rate`. Returns the hit checks
    /// weapons requested.
    pub fn update(&mut self, config: &SimConfig, events: &mut EventQueue) -> Vec<(u8, HitCheck)> {
        let mut checks = Vec::new();
        let rate: TickRate = config.tick_rate;

        match self.state {
            MechState::Alive => {
                self.advance_cooling(rate.ticks(config.cooling_interval), events);
                for weapon in self.weapons.iter_mut().flatten() {
                    if let Some(check) = weapon.update(rate) {
                        checks.push((weapon.weapon_index(), check));
                    }
                }
            }
            MechState::Dying => {
                self.dying_ticks = self.dying_ticks.saturating_add(1);
                if self.dying_ticks >= rate.ticks(config.dying_duration) {
                    self.set_state(MechState::Dead, events);
                }
            }
            MechState::Dead => {
                self.wreck_ticks = self.wreck_ticks.saturating_add(1);
                if let Some(lifetime) = config.wreckage_lifetime {
                    if self.wreck_ticks >= rate.ticks(lifetime) {
                        self.set_state(MechState::Despawning, events);
                    }
                }
            }
            MechState::Inactive | MechState::Spawning | MechState::Despawning => {}
        }

        #[cfg(feature = "debug-tracing")]
        trace!(
            mech = self.id.0,
            state = ?self.state,
            health = self.current_health,
            heat = self.current_heat,
            "mech update"
        );

        checks
    }

    /// Consume the pending respawn request raised on entering `Dead`.
    pub fn take_respawn_request(&mut self) -> Option<PlayerId> {
        if !self.respawn_pending {
            return None;
        }
        self.respawn_pending = false;
        self.controller.take()
    }

    /// Put back a respawn request that could not be served.
    pub(crate) fn restore_respawn_request(&mut self, player: PlayerId) {
        self.controller = Some(player);
        self.respawn_pending = true;
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Muzzle origin and firing direction.
    pub fn muzzle(&self) -> (FixedVec3, FixedVec3) {
        let origin = self.position
            + FixedVec3::UP.scale(self.definition.torso_height)
            + self.forward.scale(self.definition.muzzle_distance);
        (origin, self.forward)
    }

    /// Collider sphere, if this mech is in the world.
    pub fn collider(&self) -> Option<MechCollider> {
        self.state.is_collidable().then(|| MechCollider {
            id: self.id,
            center: self.position + FixedVec3::UP.scale(self.definition.torso_height),
            radius: self.definition.collision_radius,
        })
    }

    /// Instance id.
    pub fn id(&self) -> MechId {
        self.id
    }

    /// Static definition.
    pub fn definition(&self) -> &Arc<MechDefinition> {
        &self.definition
    }

    /// Controlling player.
    pub fn controller(&self) -> Option<PlayerId> {
        self.controller
    }

    /// Life-cycle state.
    pub fn state(&self) -> MechState {
        self.state
    }

    /// Current health in `[0, max_health]`.
    pub fn current_health(&self) -> Fixed {
        self.current_health
    }

    /// Current heat in `[0, max_heat]`.
    pub fn current_heat(&self) -> Fixed {
        self.current_heat
    }

    /// Speed reported by locomotion.
    pub fn current_speed(&self) -> Fixed {
        self.current_speed
    }

    /// Turn rate reported by locomotion.
    pub fn current_turn(&self) -> Fixed {
        self.current_turn
    }

    /// Position.
    pub fn position(&self) -> FixedVec3 {
        self.position
    }

    /// Facing.
    pub fn forward(&self) -> FixedVec3 {
        self.forward
    }

    /// Heat is pinned at maximum.
    pub fn is_overheated(&self) -> bool {
        self.overheated
    }

    /// A cooling process is running.
    pub fn is_cooling(&self) -> bool {
        self.cooling.is_some()
    }

    /// Weapon in a slot.
    pub fn weapon(&self, slot: usize) -> Option<&Weapon> {
        self.weapons.get(slot).and_then(Option::as_ref)
    }

    /// Mounted weapons.
    pub fn weapons(&self) -> impl Iterator<Item = &Weapon> {
        self.weapons.iter().flatten()
    }

    /// Hash mech state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.id.0);
        hasher.update_u32(self.definition.id);
        match self.controller {
            Some(player) => hasher.update_bytes(player.as_bytes()),
            None => hasher.update_u8(0),
        }
        hasher.update_vec3(self.position);
        hasher.update_vec3(self.forward);
        hasher.update_fixed(self.current_health);
        hasher.update_fixed(self.current_heat);
        hasher.update_fixed(self.current_speed);
        hasher.update_fixed(self.current_turn);
        hasher.update_u8(self.state as u8);
        hasher.update_bool(self.overheated);
        hasher.update_u32(self.cooling.map_or(u32::MAX, |c| c.elapsed_ticks));
        hasher.update_u32(self.dying_ticks);
        hasher.update_u32(self.wreck_ticks);
        for weapon in self.weapons() {
            weapon.hash_into(hasher);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::from_int;
    use crate::game::test_support::{alive_mech, test_catalog, HEAVY_MECH, SCOUT_MECH};
    use crate::game::weapon::WeaponState;

    /// Config ticking at `hz`, otherwise default.
    fn at_hz(hz: u32) -> SimConfig {
        SimConfig { tick_rate: TickRate::new(hz), ..SimConfig::default() }
    }

    fn state_changes(events: &EventQueue) -> Vec<(MechState, MechState)> {
        events
            .iter()
            .filter_map(|e| match e.data {
                GameEventData::MechStateChanged { from, to, .. } => Some((from, to)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_start_reaches_alive_in_one_transition() {
        let catalog = test_catalog();
        let def = catalog.mech(SCOUT_MECH).unwrap().clone();
        let mut mech = Mech::new(MechId(1), def, &catalog, None, FixedVec3::ZERO, FixedVec3::FORWARD);
        assert_eq!(mech.state(), MechState::Inactive);

        let mut events = EventQueue::new();
        mech.start(&mut events);
        assert_eq!(mech.state(), MechState::Alive);
        assert_eq!(state_changes(&events), vec![(MechState::Inactive, MechState::Alive)]);
        assert_eq!(mech.current_health(), from_int(100));
    }

    #[test]
    fn test_overkill_clamps_and_starts_dying() {
        let (mut mech, mut events) = alive_mech(SCOUT_MECH);

        assert!(mech.apply_damage(from_int(150), &mut events));
        assert_eq!(mech.current_health(), 0);
        assert_eq!(mech.state(), MechState::Dying);
    }

    #[test]
    fn test_exact_lethal_damage_kills() {
        let (mut mech, mut events) = alive_mech(SCOUT_MECH);
        mech.apply_damage(from_int(100), &mut events);
        assert_eq!(mech.state(), MechState::Dying);
    }

    #[test]
    fn test_death_happens_once() {
        let (mut mech, mut events) = alive_mech(SCOUT_MECH);
        mech.apply_damage(from_int(100), &mut events);
        assert!(!mech.apply_damage(from_int(10), &mut events));
        assert!(!mech.apply_heat(from_int(10), &mut events));

        let deaths = events
            .iter()
            .filter(|e| matches!(e.data, GameEventData::MechDeathEffect { .. }))
            .count();
        assert_eq!(deaths, 1);
    }

    #[test]
    fn test_negative_damage_heals_to_max() {
        let (mut mech, mut events) = alive_mech(SCOUT_MECH);
        mech.apply_damage(from_int(30), &mut events);
        assert_eq!(mech.current_health(), from_int(70));
        mech.apply_damage(from_int(-50), &mut events);
        assert_eq!(mech.current_health(), from_int(100));
    }

    #[test]
    fn test_set_state_is_idempotent() {
        let (mut mech, mut events) = alive_mech(SCOUT_MECH);
        let before = events.len();
        assert!(!mech.set_state(MechState::Alive, &mut events));
        assert_eq!(events.len(), before);
    }

    #[test]
    fn test_inactive_mech_is_immune() {
        let catalog = test_catalog();
        let def = catalog.mech(SCOUT_MECH).unwrap().clone();
        let mut mech = Mech::new(MechId(1), def, &catalog, None, FixedVec3::ZERO, FixedVec3::FORWARD);
        let mut events = EventQueue::new();
        assert!(!mech.apply_damage(from_int(10), &mut events));
        assert!(!mech.apply_heat(from_int(10), &mut events));
        assert_eq!(mech.current_health(), from_int(100));
        assert_eq!(mech.current_heat(), 0);
    }

    #[test]
    fn test_heat_cools_to_zero_then_stops() {
        let (mut mech, mut events) = alive_mech(SCOUT_MECH);
        let config = at_hz(1);

        assert!(mech.apply_heat(from_int(5), &mut events));
        assert!(mech.is_cooling());

        let expected = [4, 3, 2, 1, 0];
        for heat in expected {
            mech.update(&config, &mut events);
            assert_eq!(mech.current_heat(), from_int(heat));
        }
        assert!(!mech.is_cooling());

        mech.update(&config, &mut events);
        assert_eq!(mech.current_heat(), 0);
    }

    #[test]
    fn test_overheat_pins_and_flags() {
        let (mut mech, mut events) = alive_mech(SCOUT_MECH);
        mech.apply_heat(from_int(500), &mut events);
        assert_eq!(mech.current_heat(), mech.definition().max_heat);
        assert!(mech.is_overheated());
        assert!(mech.is_cooling());
        assert!(events.iter().any(|e| matches!(e.data, GameEventData::MechOverheated { .. })));

        // One cooling step drops below max and clears the flag
        mech.update(&at_hz(1), &mut events);
        assert!(!mech.is_overheated());
    }

    #[test]
    fn test_heat_never_negative() {
        let (mut mech, mut events) = alive_mech(SCOUT_MECH);
        mech.apply_heat(from_int(2), &mut events);
        mech.apply_heat(from_int(-10), &mut events);
        assert_eq!(mech.current_heat(), 0);
    }

    #[test]
    fn test_cooling_restarts_from_zero() {
        let (mut mech, mut events) = alive_mech(SCOUT_MECH);
        let config = at_hz(2);

        mech.apply_heat(from_int(1), &mut events);
        mech.update(&config, &mut events);
        mech.update(&config, &mut events);
        assert_eq!(mech.current_heat(), 0);
        assert!(!mech.is_cooling());

        // Fresh process: half a second in, nothing dissipated yet
        mech.apply_heat(from_int(3), &mut events);
        mech.update(&config, &mut events);
        assert_eq!(mech.current_heat(), from_int(3));
        mech.update(&config, &mut events);
        assert_eq!(mech.current_heat(), from_int(2));
    }

    #[test]
    fn test_fire_command_validation() {
        let (mut mech, mut events) = alive_mech(SCOUT_MECH);

        assert!(!mech.commence_fire(-1, &mut events));
        assert!(!mech.commence_fire(2, &mut events));
        assert!(events.is_empty());

        assert!(mech.commence_fire(0, &mut events));
        assert!(matches!(
            events.iter().last().map(|e| &e.data),
            Some(GameEventData::WeaponFireEffect { weapon_index: 0, .. })
        ));

        // Already firing
        assert!(!mech.commence_fire(0, &mut events));
    }

    #[test]
    fn test_empty_slot_rejected() {
        // Heavy mounts a single weapon in slot 0
        let (mut mech, mut events) = alive_mech(HEAVY_MECH);
        assert!(mech.weapon(1).is_none());
        assert!(!mech.commence_fire(1, &mut events));
    }

    #[test]
    fn test_dying_ceases_weapons_and_times_out() {
        let (mut mech, mut events) = alive_mech(SCOUT_MECH);
        let config = at_hz(1);

        // Slot 1 is a chain weapon that stays Firing until released
        assert!(mech.commence_fire(1, &mut events));
        mech.apply_damage(from_int(100), &mut events);
        assert_eq!(mech.weapon(1).map(Weapon::state), Some(WeaponState::OnCooldown));
        assert!(!mech.commence_fire(0, &mut events));

        for _ in 0..4 {
            mech.update(&config, &mut events);
        }
        assert_eq!(mech.state(), MechState::Dying);
        mech.update(&config, &mut events);
        assert_eq!(mech.state(), MechState::Dead);
    }

    #[test]
    fn test_timers_are_exact_at_60hz() {
        let (mut mech, mut events) = alive_mech(SCOUT_MECH);
        let config = SimConfig::default();
        assert_eq!(config.tick_rate.hz(), 60);

        // Cooling steps once per whole second
        mech.apply_heat(from_int(5), &mut events);
        for _ in 0..59 {
            mech.update(&config, &mut events);
        }
        assert_eq!(mech.current_heat(), from_int(5));
        mech.update(&config, &mut events);
        assert_eq!(mech.current_heat(), from_int(4));

        // Five seconds of dying
        mech.apply_damage(from_int(100), &mut events);
        for _ in 0..299 {
            mech.update(&config, &mut events);
        }
        assert_eq!(mech.state(), MechState::Dying);
        mech.update(&config, &mut events);
        assert_eq!(mech.state(), MechState::Dead);
    }

    #[test]
    fn test_wreckage_lifetime() {
        let (mut mech, mut events) = alive_mech(SCOUT_MECH);
        let config = SimConfig { wreckage_lifetime: Some(from_int(2)), ..at_hz(1) };

        mech.apply_damage(from_int(100), &mut events);
        for _ in 0..5 {
            mech.update(&config, &mut events);
        }
        assert_eq!(mech.state(), MechState::Dead);
        assert!(mech.collider().is_some());

        mech.update(&config, &mut events);
        assert_eq!(mech.state(), MechState::Dead);
        mech.update(&config, &mut events);
        assert_eq!(mech.state(), MechState::Despawning);
        assert!(mech.collider().is_none());
    }

    #[test]
    fn test_respawn_request_moves_controller() {
        let catalog = test_catalog();
        let def = catalog.mech(SCOUT_MECH).unwrap().clone();
        let player = PlayerId::new([7; 16]);
        let mut mech = Mech::new(MechId(1), def, &catalog, Some(player), FixedVec3::ZERO, FixedVec3::FORWARD);
        let mut events = EventQueue::new();
        mech.start(&mut events);

        assert_eq!(mech.take_respawn_request(), None);
        mech.apply_damage(from_int(100), &mut events);
        for _ in 0..5 {
            mech.update(&at_hz(1), &mut events);
        }

        assert_eq!(mech.take_respawn_request(), Some(player));
        assert_eq!(mech.controller(), None);
        assert_eq!(mech.take_respawn_request(), None);
    }

    #[test]
    fn test_transform_clamped() {
        let (mut mech, _events) = alive_mech(SCOUT_MECH);
        let max_speed = mech.definition().max_speed;
        assert!(mech.set_transform(FixedVec3::from_ints(1, 0, 1), FixedVec3::from_ints(0, 0, 5), from_int(1000), 0));
        assert_eq!(mech.current_speed(), max_speed);
        assert_eq!(mech.forward(), FixedVec3::FORWARD);

        let (origin, dir) = mech.muzzle();
        assert_eq!(dir, FixedVec3::FORWARD);
        assert_eq!(origin, FixedVec3::from_ints(1, 3, 4));
    }

    #[test]
    fn test_transform_stays_in_world() {
        let (mut mech, _events) = alive_mech(SCOUT_MECH);
        assert!(mech.set_transform(FixedVec3::from_ints(-30_000, 0, 30_000), FixedVec3::FORWARD, 0, 0));
        assert_eq!(mech.position(), FixedVec3::new(-WORLD_EXTENT, 0, WORLD_EXTENT));
    }
}
