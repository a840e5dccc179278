//! Shared fixtures for simulation unit tests.

use std::collections::BTreeMap;

use crate::core::fixed::{from_int, to_fixed};
use crate::core::vec3::FixedVec3;
use crate::game::definitions::{
    DefinitionCatalog, FireMethod, HitMethod, MechDefinition, MechTypeId, ProjectileParams,
    WeaponClass, WeaponDefinition, WeaponTypeId,
};
use crate::game::events::EventQueue;
use crate::game::mech::{Mech, MechId};

/// Trigger/projectile autocannon.
pub const CANNON: WeaponTypeId = 1;
/// Chain/instant laser.
pub const LASER: WeaponTypeId = 2;

/// Two-weapon mech: cannon in slot 0, laser in slot 1.
pub const SCOUT_MECH: MechTypeId = 10;
/// Single-weapon mech: cannon in slot 0 only.
pub const HEAVY_MECH: MechTypeId = 20;

pub fn weapon_def(id: WeaponTypeId, fire_method: FireMethod, hit_method: HitMethod) -> WeaponDefinition {
    WeaponDefinition {
        id,
        display_name: format!("weapon-{id}"),
        class: WeaponClass::Ballistic,
        fire_method,
        hit_method,
        primary_damage: from_int(10),
        range: from_int(100),
        chain_damage_rate: to_fixed(0.5),
        splash_damage: 0,
        splash_radius: 0,
        heat_generation: 0,
        heat_damage: 0,
        cooldown: from_int(1),
        projectile: ProjectileParams::default(),
    }
}

pub fn mech_def(id: MechTypeId, weapons: Vec<WeaponTypeId>) -> MechDefinition {
    MechDefinition {
        id,
        display_name: format!("mech-{id}"),
        max_health: from_int(100),
        max_speed: from_int(10),
        max_turn: from_int(90),
        max_turret_angle: from_int(120),
        max_heat: from_int(50),
        cooling_rate: from_int(1),
        weapons,
        collision_radius: to_fixed(2.5),
        torso_height: from_int(3),
        muzzle_distance: from_int(3),
    }
}

pub fn test_catalog() -> DefinitionCatalog {
    let mut cannon = weapon_def(CANNON, FireMethod::Trigger, HitMethod::Projectile);
    cannon.heat_generation = from_int(3);
    let mut laser = weapon_def(LASER, FireMethod::Chain, HitMethod::Instant);
    laser.class = WeaponClass::Beam;
    laser.primary_damage = from_int(2);

    DefinitionCatalog::new(
        vec![cannon, laser],
        vec![
            mech_def(SCOUT_MECH, vec![CANNON, LASER]),
            mech_def(HEAVY_MECH, vec![CANNON]),
        ],
    )
    .expect("test catalog is valid")
}

/// A started mech (id 1) and an empty event queue.
pub fn alive_mech(mech_type: MechTypeId) -> (Mech, EventQueue) {
    let catalog = test_catalog();
    let def = catalog.mech(mech_type).expect("mech type in catalog").clone();
    let mut mech = Mech::new(MechId(1), def, &catalog, None, FixedVec3::ZERO, FixedVec3::FORWARD);
    let mut events = EventQueue::new();
    mech.start(&mut events);
    events.take();
    (mech, events)
}

/// Started mechs with ids 1.. in order, all facing +Z.
pub fn registry(specs: &[(MechTypeId, FixedVec3)]) -> (BTreeMap<MechId, Mech>, EventQueue) {
    let catalog = test_catalog();
    let mut events = EventQueue::new();
    let mut mechs = BTreeMap::new();
    for (i, (mech_type, position)) in specs.iter().enumerate() {
        let id = MechId(i as u32 + 1);
        let def = catalog.mech(*mech_type).expect("mech type in catalog").clone();
        let mut mech = Mech::new(id, def, &catalog, None, *position, FixedVec3::FORWARD);
        mech.start(&mut events);
        mechs.insert(id, mech);
    }
    events.take();
    (mechs, events)
}
