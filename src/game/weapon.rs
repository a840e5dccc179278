//! Weapon State Machine
//!
//! One weapon per mount point. The cycle is strictly
//! `Ready → Firing → OnCooldown → Ready`:
//!
//! ```text
//!   commence_fire()          trigger: after one hit check
//!  Ready ────────────► Firing ──────────────────────────► OnCooldown
//!    ▲                  │  │  chain: hit check every         │
//!    │                  │  └─ chain_damage_rate seconds      │
//!    │                  └──── cease_fire() ─────────────────►│
//!    └────────────── cooldown elapsed (timers cleared) ──────┘
//! ```
//!
//! A weapon never touches the world. A hit check yields a `HitCheck`
//! request that the owning mech's tick resolves (spawn a projectile or cast
//! an instant ray).

use std::sync::Arc;

use serde::{Serialize, Deserialize};
use tracing::{debug, warn};

use crate::core::hash::StateHasher;
use crate::core::time::TickRate;
use crate::game::definitions::{FireMethod, HitMethod, WeaponDefinition};
use crate::game::mech::MechId;

/// Weapon mount points per mech.
pub const WEAPON_SLOTS: usize = 2;

/// Weapon life-cycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum WeaponState {
    /// Can be fired
    Ready = 0,
    /// Trigger held / shot in progress
    Firing = 1,
    /// Waiting out the cooldown
    OnCooldown = 2,
}

/// Resolution request produced by one hit check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitCheck {
    /// Spawn and launch a projectile from the muzzle
    SpawnProjectile,
    /// Cast an immediate ray from the muzzle
    InstantRay,
}

/// Runtime state of one mounted weapon.
#[derive(Clone, Debug)]
pub struct Weapon {
    definition: Arc<WeaponDefinition>,
    weapon_index: u8,
    owner: Option<MechId>,
    state: WeaponState,
    // Timers in ticks
    firing_ticks: u32,
    cooldown_ticks: u32,
    // `None` until the first chain hit check of a burst
    ticks_since_hit_check: Option<u32>,
}

impl Weapon {
    /// Mount a weapon in `weapon_index`, starting `Ready`.
    ///
    /// A weapon without an owner still works; its damage is simply not
    /// attributable.
    pub fn new(definition: Arc<WeaponDefinition>, weapon_index: u8, owner: Option<MechId>) -> Self {
        if owner.is_none() {
            warn!(
                weapon = %definition.display_name,
                weapon_index,
                "weapon created without an owning mech"
            );
        }

        let mut weapon = Self {
            definition,
            weapon_index,
            owner,
            state: WeaponState::Ready,
            firing_ticks: 0,
            cooldown_ticks: 0,
            ticks_since_hit_check: None,
        };
        weapon.reset();
        weapon
    }

    /// Return to `Ready` with all timers cleared.
    pub fn reset(&mut self) {
        self.state = WeaponState::Ready;
        self.firing_ticks = 0;
        self.cooldown_ticks = 0;
        self.ticks_since_hit_check = None;
    }

    /// Start firing. Succeeds only from `Ready`.
    pub fn commence_fire(&mut self) -> bool {
        if self.state != WeaponState::Ready {
            debug!(weapon_index = self.weapon_index, state = ?self.state, "commence fire ignored");
            return false;
        }

        self.state = WeaponState::Firing;
        self.firing_ticks = 0;
        // First chain update hit-checks immediately
        self.ticks_since_hit_check = None;

        if self.definition.fire_method == FireMethod::Lock {
            warn!(
                weapon = %self.definition.display_name,
                "lock-on fire method has no hit resolution"
            );
        }

        true
    }

    /// Stop firing. Succeeds only from `Firing`.
    pub fn cease_fire(&mut self) -> bool {
        if self.state != WeaponState::Firing {
            return false;
        }
        self.enter_cooldown();
        true
    }

    /// Decide how this weapon's hit is resolved.
    pub fn perform_hit_check(&self) -> HitCheck {
        let check = match self.definition.hit_method {
            HitMethod::Projectile => HitCheck::SpawnProjectile,
            HitMethod::Instant => HitCheck::InstantRay,
        };
        debug!(weapon_index = self.weapon_index, ?check, "hit check");
        check
    }

    /// Advance by one tick. Returns a hit check to resolve, if any.
    pub fn update(&mut self, rate: TickRate) -> Option<HitCheck> {
        match self.state {
            WeaponState::Ready => None,
            WeaponState::Firing => {
                self.firing_ticks = self.firing_ticks.saturating_add(1);
                match self.definition.fire_method {
                    FireMethod::Trigger => {
                        let check = self.perform_hit_check();
                        self.enter_cooldown();
                        Some(check)
                    }
                    FireMethod::Chain => {
                        let due = match self.ticks_since_hit_check {
                            None => true,
                            Some(ticks) => ticks + 1 >= rate.ticks(self.definition.chain_damage_rate),
                        };
                        if due {
                            self.ticks_since_hit_check = Some(0);
                            Some(self.perform_hit_check())
                        } else {
                            self.ticks_since_hit_check = self.ticks_since_hit_check.map(|t| t + 1);
                            None
                        }
                    }
                    FireMethod::Lock => None,
                }
            }
            WeaponState::OnCooldown => {
                self.cooldown_ticks = self.cooldown_ticks.saturating_add(1);
                if self.cooldown_ticks >= rate.ticks(self.definition.cooldown) {
                    self.reset();
                }
                None
            }
        }
    }

    fn enter_cooldown(&mut self) {
        self.state = WeaponState::OnCooldown;
        self.cooldown_ticks = 0;
    }

    /// Current state.
    pub fn state(&self) -> WeaponState {
        self.state
    }

    /// Mount slot.
    pub fn weapon_index(&self) -> u8 {
        self.weapon_index
    }

    /// Owning mech, if attributed.
    pub fn owner(&self) -> Option<MechId> {
        self.owner
    }

    /// Static definition.
    pub fn definition(&self) -> &Arc<WeaponDefinition> {
        &self.definition
    }

    /// Ticks since firing began.
    pub fn firing_ticks(&self) -> u32 {
        self.firing_ticks
    }

    /// Ticks spent on cooldown so far.
    pub fn cooldown_ticks(&self) -> u32 {
        self.cooldown_ticks
    }

    /// Ticks since the last chain hit check of this burst.
    pub fn ticks_since_hit_check(&self) -> Option<u32> {
        self.ticks_since_hit_check
    }

    /// Hash weapon state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.definition.id);
        hasher.update_u8(self.weapon_index);
        hasher.update_u8(self.state as u8);
        hasher.update_u32(self.firing_ticks);
        hasher.update_u32(self.cooldown_ticks);
        hasher.update_u32(self.ticks_since_hit_check.unwrap_or(u32::MAX));
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{from_int, to_fixed, Fixed};
    use crate::game::test_support::weapon_def;

    const HZ_60: TickRate = TickRate::new(60);
    const HZ_4: TickRate = TickRate::new(4);

    fn weapon(fire_method: FireMethod, cooldown: Fixed) -> Weapon {
        let mut def = weapon_def(1, fire_method, HitMethod::Projectile);
        def.cooldown = cooldown;
        def.chain_damage_rate = to_fixed(0.5);
        Weapon::new(Arc::new(def), 0, Some(MechId(1)))
    }

    #[test]
    fn test_trigger_fires_once_then_cools() {
        let mut w = weapon(FireMethod::Trigger, from_int(2));

        assert!(w.commence_fire());
        assert_eq!(w.state(), WeaponState::Firing);

        assert_eq!(w.update(HZ_60), Some(HitCheck::SpawnProjectile));
        assert_eq!(w.state(), WeaponState::OnCooldown);

        // Second pull during cooldown is rejected
        assert!(!w.commence_fire());
        assert_eq!(w.update(HZ_60), None);
    }

    #[test]
    fn test_cooldown_boundary() {
        let mut w = weapon(FireMethod::Trigger, from_int(2));
        w.commence_fire();
        w.update(HZ_4);
        assert_eq!(w.state(), WeaponState::OnCooldown);

        for _ in 0..7 {
            w.update(HZ_4);
        }
        assert_eq!(w.state(), WeaponState::OnCooldown);
        assert_eq!(w.cooldown_ticks(), 7);

        w.update(HZ_4);
        assert_eq!(w.state(), WeaponState::Ready);
        assert_eq!(w.cooldown_ticks(), 0);
        assert_eq!(w.firing_ticks(), 0);
    }

    #[test]
    fn test_cooldown_is_exact_at_60hz() {
        let mut w = weapon(FireMethod::Trigger, from_int(2));
        w.commence_fire();
        w.update(HZ_60);

        let mut ticks = 0;
        while w.state() != WeaponState::Ready {
            w.update(HZ_60);
            ticks += 1;
            assert!(ticks <= 200, "cooldown never elapsed");
        }
        assert_eq!(ticks, 120);
    }

    #[test]
    fn test_chain_cadence() {
        let mut w = weapon(FireMethod::Chain, from_int(1));
        assert!(w.commence_fire());
        assert_eq!(w.ticks_since_hit_check(), None);

        let checks: Vec<bool> = (0..6).map(|_| w.update(HZ_4).is_some()).collect();
        assert_eq!(checks, vec![true, false, true, false, true, false]);
        assert_eq!(w.state(), WeaponState::Firing);

        assert!(w.cease_fire());
        assert_eq!(w.state(), WeaponState::OnCooldown);
        assert!(!w.cease_fire());
    }

    #[test]
    fn test_chain_cadence_at_60hz() {
        let mut def = weapon_def(1, FireMethod::Chain, HitMethod::Instant);
        def.chain_damage_rate = to_fixed(0.25);
        let mut w = Weapon::new(Arc::new(def), 0, Some(MechId(1)));
        assert!(w.commence_fire());

        // One second of trigger hold: checks on ticks 0, 15, 30, 45 and 60
        let fired: Vec<usize> = (0..=60).filter(|_| w.update(HZ_60).is_some()).collect();
        assert_eq!(fired, vec![0, 15, 30, 45, 60]);
    }

    #[test]
    fn test_lock_has_no_hit_path() {
        let mut w = weapon(FireMethod::Lock, from_int(1));
        assert!(w.commence_fire());
        for _ in 0..10 {
            assert_eq!(w.update(HZ_4), None);
        }
        assert_eq!(w.state(), WeaponState::Firing);
    }

    #[test]
    fn test_cease_fire_only_from_firing() {
        let mut w = weapon(FireMethod::Chain, from_int(1));
        assert!(!w.cease_fire());
        assert_eq!(w.state(), WeaponState::Ready);
    }

    #[test]
    fn test_instant_hit_check() {
        let def = weapon_def(2, FireMethod::Trigger, HitMethod::Instant);
        let mut w = Weapon::new(Arc::new(def), 1, None);
        assert_eq!(w.owner(), None);
        assert!(w.commence_fire());
        assert_eq!(w.update(HZ_60), Some(HitCheck::InstantRay));
    }
}
