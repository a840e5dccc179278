//! Combat Resolution
//!
//! Applies a weapon's payload to the mech registry: primary damage and heat
//! to a directly struck mech, then splash damage and heat to every other
//! mech in the splash radius. Primary and splash are additive.
//!
//! Works on an explicit `BTreeMap` registry so the splash scan is ordered
//! and sees a snapshot taken before any mutation.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::core::fixed::Fixed;
use crate::core::vec3::FixedVec3;
use crate::game::collision::{CollisionProbe, HitTarget, RayQuery};
use crate::game::config::SplashOrigin;
use crate::game::definitions::WeaponDefinition;
use crate::game::events::{EventQueue, GameEventData};
use crate::game::mech::{Mech, MechId};

/// A resolved hit ready for damage application.
#[derive(Clone, Debug)]
pub struct Payload {
    /// Firing mech
    pub shooter: MechId,
    /// Firing weapon slot
    pub weapon_index: u8,
    /// Weapon that produced the hit
    pub definition: Arc<WeaponDefinition>,
    /// What was directly struck
    pub struck: Option<HitTarget>,
    /// Point of impact
    pub impact_point: FixedVec3,
}

/// Apply a payload. Returns true if a mech was directly damaged.
pub fn deliver_payload(
    mechs: &mut BTreeMap<MechId, Mech>,
    payload: &Payload,
    splash_origin: SplashOrigin,
    events: &mut EventQueue,
) -> bool {
    let def = &payload.definition;
    let mut direct = false;

    if let Some(HitTarget::Mech(target)) = payload.struck {
        if let Some(mech) = mechs.get_mut(&target) {
            direct = apply(mech, payload, def.primary_damage, false, events);
        }
    }

    if def.splash_damage > 0 {
        let origin = match splash_origin {
            SplashOrigin::Shooter => mechs.get(&payload.shooter).map(Mech::position),
            SplashOrigin::Impact => Some(payload.impact_point),
        };

        if let Some(origin) = origin {
            // Snapshot victims before mutating anything
            let victims: Vec<MechId> = mechs
                .values()
                .filter(|m| m.id() != payload.shooter)
                .filter(|m| origin.within(splash_anchor(m, splash_origin), def.splash_radius))
                .map(Mech::id)
                .collect();

            for victim in victims {
                if let Some(mech) = mechs.get_mut(&victim) {
                    apply(mech, payload, def.splash_damage, true, events);
                }
            }
        }
    }

    direct
}

/// Point on a mech that splash distance is measured to.
fn splash_anchor(mech: &Mech, splash_origin: SplashOrigin) -> FixedVec3 {
    match splash_origin {
        SplashOrigin::Shooter => mech.position(),
        SplashOrigin::Impact => mech.collider().map_or(mech.position(), |c| c.center),
    }
}

fn apply(mech: &mut Mech, payload: &Payload, damage: Fixed, splash: bool, events: &mut EventQueue) -> bool {
    let heat = payload.definition.heat_damage;
    if !mech.apply_damage(damage, events) {
        return false;
    }
    mech.apply_heat(heat, events);

    events.push(GameEventData::DamageDealt {
        source: payload.shooter,
        weapon_index: payload.weapon_index,
        target: mech.id(),
        damage,
        heat,
        splash,
    });
    true
}

/// Resolve an instant-hit weapon: cast from the shooter's muzzle up to the
/// weapon's range and deliver the payload at the first thing struck.
///
/// Returns true if a mech was hit.
pub fn resolve_instant(
    mechs: &mut BTreeMap<MechId, Mech>,
    shooter: MechId,
    weapon_index: u8,
    definition: &Arc<WeaponDefinition>,
    probe: &dyn CollisionProbe,
    splash_origin: SplashOrigin,
    events: &mut EventQueue,
) -> bool {
    let Some(mech) = mechs.get(&shooter) else {
        return false;
    };

    let (origin, direction) = mech.muzzle();
    let query = RayQuery {
        origin,
        direction,
        max_distance: definition.range,
        mask: definition.projectile.collision_mask,
        ignore: Some(shooter),
    };

    let Some(hit) = probe.cast(&query) else {
        debug!(mech = shooter.0, weapon_index, "instant hit check found nothing");
        return false;
    };

    events.push(GameEventData::BeamImpactEffect {
        mech: shooter,
        weapon_index,
        position: hit.point,
        normal: hit.normal,
    });

    let payload = Payload {
        shooter,
        weapon_index,
        definition: definition.clone(),
        struck: Some(hit.target),
        impact_point: hit.point,
    };
    deliver_payload(mechs, &payload, splash_origin, events);

    matches!(hit.target, HitTarget::Mech(_))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{from_int, to_fixed};
    use crate::game::collision::SceneProbe;
    use crate::game::definitions::{FireMethod, HitMethod};
    use crate::game::mech::MechState;
    use crate::game::test_support::{registry, weapon_def, SCOUT_MECH};

    fn splash_weapon() -> Arc<WeaponDefinition> {
        let mut def = weapon_def(9, FireMethod::Trigger, HitMethod::Projectile);
        def.primary_damage = from_int(20);
        def.splash_damage = from_int(10);
        def.splash_radius = from_int(5);
        def.heat_damage = from_int(2);
        Arc::new(def)
    }

    fn payload(struck: Option<HitTarget>, impact_point: FixedVec3) -> Payload {
        Payload { shooter: MechId(1), weapon_index: 0, definition: splash_weapon(), struck, impact_point }
    }

    #[test]
    fn test_splash_hits_only_mechs_in_radius() {
        let (mut mechs, mut events) = registry(&[
            (SCOUT_MECH, FixedVec3::ZERO),
            (SCOUT_MECH, FixedVec3::from_ints(3, 0, 0)),
            (SCOUT_MECH, FixedVec3::from_ints(0, 0, 4)),
            (SCOUT_MECH, FixedVec3::from_ints(10, 0, 0)),
        ]);

        let direct = deliver_payload(&mut mechs, &payload(None, FixedVec3::ZERO), SplashOrigin::Shooter, &mut events);
        assert!(!direct);

        let health = |id: u32| mechs[&MechId(id)].current_health();
        assert_eq!(health(1), from_int(100));
        assert_eq!(health(2), from_int(90));
        assert_eq!(health(3), from_int(90));
        assert_eq!(health(4), from_int(100));
        assert_eq!(mechs[&MechId(2)].current_heat(), from_int(2));
    }

    #[test]
    fn test_primary_and_splash_are_additive() {
        let (mut mechs, mut events) = registry(&[
            (SCOUT_MECH, FixedVec3::ZERO),
            (SCOUT_MECH, FixedVec3::from_ints(0, 0, 4)),
        ]);

        let direct = deliver_payload(
            &mut mechs,
            &payload(Some(HitTarget::Mech(MechId(2))), FixedVec3::from_ints(0, 3, 2)),
            SplashOrigin::Shooter,
            &mut events,
        );
        assert!(direct);
        assert_eq!(mechs[&MechId(2)].current_health(), from_int(70));
        assert_eq!(mechs[&MechId(2)].current_heat(), from_int(4));

        let damage_events = events
            .iter()
            .filter(|e| matches!(e.data, GameEventData::DamageDealt { .. }))
            .count();
        assert_eq!(damage_events, 2);
    }

    #[test]
    fn test_splash_from_impact_point() {
        let (mut mechs, mut events) = registry(&[
            (SCOUT_MECH, FixedVec3::ZERO),
            (SCOUT_MECH, FixedVec3::from_ints(0, 0, 40)),
        ]);

        // Impact right next to the far mech's torso
        let impact = FixedVec3::from_ints(0, 3, 37);
        deliver_payload(&mut mechs, &payload(None, impact), SplashOrigin::Impact, &mut events);
        assert_eq!(mechs[&MechId(2)].current_health(), from_int(90));

        // Measured from the shooter it would be out of range
        deliver_payload(&mut mechs, &payload(None, impact), SplashOrigin::Shooter, &mut events);
        assert_eq!(mechs[&MechId(2)].current_health(), from_int(90));
    }

    #[test]
    fn test_dead_targets_take_nothing() {
        let (mut mechs, mut events) = registry(&[
            (SCOUT_MECH, FixedVec3::ZERO),
            (SCOUT_MECH, FixedVec3::from_ints(0, 0, 4)),
        ]);
        if let Some(target) = mechs.get_mut(&MechId(2)) {
            target.apply_damage(from_int(100), &mut events);
        }
        let before = events.len();

        let direct = deliver_payload(
            &mut mechs,
            &payload(Some(HitTarget::Mech(MechId(2))), FixedVec3::ZERO),
            SplashOrigin::Shooter,
            &mut events,
        );
        assert!(!direct);
        assert_eq!(mechs[&MechId(2)].state(), MechState::Dying);
        assert_eq!(events.len(), before);
    }

    #[test]
    fn test_instant_ray_hits_mech_ahead() {
        let (mut mechs, mut events) = registry(&[
            (SCOUT_MECH, FixedVec3::ZERO),
            (SCOUT_MECH, FixedVec3::from_ints(0, 0, 20)),
        ]);
        let colliders: Vec<_> = mechs.values().filter_map(Mech::collider).collect();
        let probe = SceneProbe::new(colliders, &[]);

        let mut def = weapon_def(2, FireMethod::Trigger, HitMethod::Instant);
        def.primary_damage = to_fixed(12.5);
        def.range = from_int(50);
        let def = Arc::new(def);

        assert!(resolve_instant(&mut mechs, MechId(1), 0, &def, &probe, SplashOrigin::Shooter, &mut events));
        assert_eq!(mechs[&MechId(2)].current_health(), to_fixed(87.5));
        assert!(events.iter().any(|e| matches!(e.data, GameEventData::BeamImpactEffect { .. })));

        // Out of range
        let mut short = (*def).clone();
        short.range = from_int(10);
        let short = Arc::new(short);
        assert!(!resolve_instant(&mut mechs, MechId(1), 0, &short, &probe, SplashOrigin::Shooter, &mut events));
    }
}
