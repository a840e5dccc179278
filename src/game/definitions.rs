//! Mech and Weapon Definitions
//!
//! Static per-type parameters, loaded once from JSON and shared read-only
//! (`Arc`) by every instance of the type. Values are decimal in the file and
//! converted to fixed-point at load time.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::fixed::{
    serde_decimal, Fixed,
    DEFAULT_COLLISION_RADIUS, DEFAULT_LOOK_AHEAD, DEFAULT_MUZZLE_DISTANCE,
    DEFAULT_PROJECTILE_SPEED, DEFAULT_TORSO_HEIGHT,
};
use crate::core::hash::{hash_bytes, StateHash};
use crate::game::collision::CollisionMask;
use crate::game::weapon::WEAPON_SLOTS;

/// Mech type identifier.
pub type MechTypeId = u32;

/// Weapon type identifier.
pub type WeaponTypeId = u32;

// =============================================================================
// ENUMS
// =============================================================================

/// Display class of a weapon. No gameplay effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponClass {
    /// Slug throwers, cannons
    Ballistic,
    /// Lasers
    Beam,
    /// Guided or dumb-fire rockets
    Missile,
}

/// How a trigger pull turns into hit checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FireMethod {
    /// One hit check per trigger pull
    Trigger,
    /// Repeated hit checks at `chain_damage_rate` until released
    Chain,
    /// Missile lock
    Lock,
}

/// How a hit check is resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitMethod {
    /// Immediate ray from the muzzle
    Instant,
    /// Spawned, server-stepped projectile
    Projectile,
}

// =============================================================================
// WEAPON DEFINITION
// =============================================================================

/// Ballistic parameters for projectile weapons.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileParams {
    /// Travel speed (units/sec)
    #[serde(with = "serde_decimal", default = "default_speed")]
    pub speed: Fixed,
    /// Probe length as a multiple of one tick's displacement
    #[serde(with = "serde_decimal", default = "default_look_ahead")]
    pub look_ahead: Fixed,
    /// Seconds to linger after impact before despawning
    #[serde(with = "serde_decimal", default)]
    pub despawn_delay: Fixed,
    /// Layers the projectile collides with
    #[serde(default)]
    pub collision_mask: CollisionMask,
}

fn default_speed() -> Fixed {
    DEFAULT_PROJECTILE_SPEED
}

fn default_look_ahead() -> Fixed {
    DEFAULT_LOOK_AHEAD
}

impl Default for ProjectileParams {
    fn default() -> Self {
        Self {
            speed: DEFAULT_PROJECTILE_SPEED,
            look_ahead: DEFAULT_LOOK_AHEAD,
            despawn_delay: 0,
            collision_mask: CollisionMask::ALL,
        }
    }
}

/// Static parameters of one weapon type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeaponDefinition {
    /// Weapon type id
    pub id: WeaponTypeId,
    /// Human-readable name
    pub display_name: String,
    /// Display class
    pub class: WeaponClass,
    /// Fire method
    pub fire_method: FireMethod,
    /// Hit method
    pub hit_method: HitMethod,
    /// Damage to a directly struck mech
    #[serde(with = "serde_decimal")]
    pub primary_damage: Fixed,
    /// Maximum range (units)
    #[serde(with = "serde_decimal")]
    pub range: Fixed,
    /// Seconds between chain hit checks
    #[serde(with = "serde_decimal", default)]
    pub chain_damage_rate: Fixed,
    /// Damage to every other mech within `splash_radius`
    #[serde(with = "serde_decimal", default)]
    pub splash_damage: Fixed,
    /// Splash radius (units)
    #[serde(with = "serde_decimal", default)]
    pub splash_radius: Fixed,
    /// Heat applied to the shooter per hit check
    #[serde(with = "serde_decimal", default)]
    pub heat_generation: Fixed,
    /// Heat applied to each damaged mech
    #[serde(with = "serde_decimal", default)]
    pub heat_damage: Fixed,
    /// Seconds spent on cooldown after firing
    #[serde(with = "serde_decimal")]
    pub cooldown: Fixed,
    /// Projectile ballistics
    #[serde(default)]
    pub projectile: ProjectileParams,
}

impl WeaponDefinition {
    fn validate(&self) -> Result<(), DefinitionError> {
        let invalid = |field: &'static str, reason: &'static str| DefinitionError::InvalidWeapon {
            id: self.id,
            field,
            reason,
        };

        if self.range <= 0 {
            return Err(invalid("range", "must be positive"));
        }
        if self.cooldown < 0 {
            return Err(invalid("cooldown", "must not be negative"));
        }
        if self.splash_damage < 0 || self.splash_radius < 0 {
            return Err(invalid("splash", "must not be negative"));
        }
        if self.fire_method == FireMethod::Chain && self.chain_damage_rate <= 0 {
            return Err(invalid("chain_damage_rate", "chain weapons need a positive rate"));
        }
        if self.hit_method == HitMethod::Projectile && self.projectile.speed <= 0 {
            return Err(invalid("projectile.speed", "must be positive"));
        }
        if self.projectile.look_ahead <= 0 || self.projectile.despawn_delay < 0 {
            return Err(invalid("projectile", "look-ahead must be positive and delay non-negative"));
        }
        Ok(())
    }
}

// =============================================================================
// MECH DEFINITION
// =============================================================================

/// Static parameters of one mech type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MechDefinition {
    /// Mech type id
    pub id: MechTypeId,
    /// Human-readable name
    pub display_name: String,
    /// Health on spawn
    #[serde(with = "serde_decimal")]
    pub max_health: Fixed,
    /// Speed ceiling for the locomotion collaborator
    #[serde(with = "serde_decimal")]
    pub max_speed: Fixed,
    /// Turn-rate ceiling for the locomotion collaborator
    #[serde(with = "serde_decimal")]
    pub max_turn: Fixed,
    /// Turret traverse limit (degrees), used by the turret collaborator
    #[serde(with = "serde_decimal", default)]
    pub max_turret_angle: Fixed,
    /// Heat ceiling
    #[serde(with = "serde_decimal")]
    pub max_heat: Fixed,
    /// Heat removed per cooling step
    #[serde(with = "serde_decimal")]
    pub cooling_rate: Fixed,
    /// Mounted weapons by slot
    #[serde(default)]
    pub weapons: Vec<WeaponTypeId>,
    /// Collider sphere radius
    #[serde(with = "serde_decimal", default = "default_collision_radius")]
    pub collision_radius: Fixed,
    /// Height of collider centre and muzzles above the origin
    #[serde(with = "serde_decimal", default = "default_torso_height")]
    pub torso_height: Fixed,
    /// Muzzle offset ahead of the origin
    #[serde(with = "serde_decimal", default = "default_muzzle_distance")]
    pub muzzle_distance: Fixed,
}

fn default_collision_radius() -> Fixed {
    DEFAULT_COLLISION_RADIUS
}

fn default_torso_height() -> Fixed {
    DEFAULT_TORSO_HEIGHT
}

fn default_muzzle_distance() -> Fixed {
    DEFAULT_MUZZLE_DISTANCE
}

impl MechDefinition {
    fn validate(&self) -> Result<(), DefinitionError> {
        let invalid = |field: &'static str, reason: &'static str| DefinitionError::InvalidMech {
            id: self.id,
            field,
            reason,
        };

        if self.max_health <= 0 {
            return Err(invalid("max_health", "must be positive"));
        }
        if self.max_heat <= 0 {
            return Err(invalid("max_heat", "must be positive"));
        }
        if self.cooling_rate < 0 {
            return Err(invalid("cooling_rate", "must not be negative"));
        }
        if self.max_speed < 0 || self.max_turn < 0 {
            return Err(invalid("locomotion", "limits must not be negative"));
        }
        if self.collision_radius <= 0 {
            return Err(invalid("collision_radius", "must be positive"));
        }
        if self.weapons.len() > WEAPON_SLOTS {
            return Err(DefinitionError::TooManyWeapons {
                mech: self.id,
                count: self.weapons.len(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// CATALOG
// =============================================================================

/// Errors from loading or validating definitions.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// File could not be read
    #[error("failed to read catalog {path}: {source}")]
    Io {
        /// Path that failed
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// JSON was malformed
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    /// Two weapons share an id
    #[error("duplicate weapon id {0}")]
    DuplicateWeapon(WeaponTypeId),
    /// Two mechs share an id
    #[error("duplicate mech id {0}")]
    DuplicateMech(MechTypeId),
    /// Mech mounts a weapon that is not defined
    #[error("mech {mech} mounts unknown weapon {weapon}")]
    UnknownWeapon {
        /// Mech type
        mech: MechTypeId,
        /// Missing weapon type
        weapon: WeaponTypeId,
    },
    /// Mech mounts more weapons than it has slots
    #[error("mech {mech} mounts {count} weapons, only {} slots", WEAPON_SLOTS)]
    TooManyWeapons {
        /// Mech type
        mech: MechTypeId,
        /// Number configured
        count: usize,
    },
    /// Weapon field out of range
    #[error("weapon {id}: {field} {reason}")]
    InvalidWeapon {
        /// Weapon type
        id: WeaponTypeId,
        /// Offending field
        field: &'static str,
        /// What is wrong
        reason: &'static str,
    },
    /// Mech field out of range
    #[error("mech {id}: {field} {reason}")]
    InvalidMech {
        /// Mech type
        id: MechTypeId,
        /// Offending field
        field: &'static str,
        /// What is wrong
        reason: &'static str,
    },
}

#[derive(Deserialize)]
struct CatalogFile {
    weapons: Vec<WeaponDefinition>,
    mechs: Vec<MechDefinition>,
}

/// All mech and weapon definitions, shared read-only.
#[derive(Clone, Debug)]
pub struct DefinitionCatalog {
    weapons: BTreeMap<WeaponTypeId, Arc<WeaponDefinition>>,
    mechs: BTreeMap<MechTypeId, Arc<MechDefinition>>,
    fingerprint: StateHash,
}

impl DefinitionCatalog {
    /// Build a catalog from definitions, validating cross references.
    pub fn new(
        weapons: Vec<WeaponDefinition>,
        mechs: Vec<MechDefinition>,
    ) -> Result<Self, DefinitionError> {
        let mut weapon_map = BTreeMap::new();
        for weapon in weapons {
            weapon.validate()?;
            let id = weapon.id;
            if weapon_map.insert(id, Arc::new(weapon)).is_some() {
                return Err(DefinitionError::DuplicateWeapon(id));
            }
        }

        let mut mech_map = BTreeMap::new();
        for mech in mechs {
            mech.validate()?;
            if let Some(&weapon) = mech.weapons.iter().find(|w| !weapon_map.contains_key(*w)) {
                return Err(DefinitionError::UnknownWeapon { mech: mech.id, weapon });
            }
            let id = mech.id;
            if mech_map.insert(id, Arc::new(mech)).is_some() {
                return Err(DefinitionError::DuplicateMech(id));
            }
        }

        let fingerprint = fingerprint_of(&weapon_map, &mech_map);
        Ok(Self {
            weapons: weapon_map,
            mechs: mech_map,
            fingerprint,
        })
    }

    /// Parse a catalog from JSON text.
    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.weapons, file.mechs)
    }

    /// Load a catalog from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DefinitionError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| DefinitionError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Look up a weapon definition.
    pub fn weapon(&self, id: WeaponTypeId) -> Option<&Arc<WeaponDefinition>> {
        self.weapons.get(&id)
    }

    /// Look up a mech definition.
    pub fn mech(&self, id: MechTypeId) -> Option<&Arc<MechDefinition>> {
        self.mechs.get(&id)
    }

    /// Mech types in id order.
    pub fn mech_ids(&self) -> impl Iterator<Item = MechTypeId> + '_ {
        self.mechs.keys().copied()
    }

    /// SHA-256 over the canonical catalog, so both ends can confirm they
    /// loaded identical definitions.
    pub fn fingerprint(&self) -> StateHash {
        self.fingerprint
    }
}

fn fingerprint_of(
    weapons: &BTreeMap<WeaponTypeId, Arc<WeaponDefinition>>,
    mechs: &BTreeMap<MechTypeId, Arc<MechDefinition>>,
) -> StateHash {
    // bincode of fixed-point fields is stable across platforms
    let mut bytes = Vec::new();
    for weapon in weapons.values() {
        if let Ok(encoded) = bincode::serialize(weapon.as_ref()) {
            bytes.extend_from_slice(&encoded);
        }
    }
    for mech in mechs.values() {
        if let Ok(encoded) = bincode::serialize(mech.as_ref()) {
            bytes.extend_from_slice(&encoded);
        }
    }
    hash_bytes(&bytes)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{from_int, to_fixed};

    const CATALOG: &str = r#"{
        "weapons": [
            {
                "id": 1, "display_name": "Autocannon", "class": "Ballistic",
                "fire_method": "Trigger", "hit_method": "Projectile",
                "primary_damage": 12, "range": 150, "splash_damage": 4,
                "splash_radius": 5, "heat_generation": 2, "heat_damage": 1,
                "cooldown": 0.5,
                "projectile": { "speed": 120, "despawn_delay": 0.25 }
            },
            {
                "id": 2, "display_name": "Pulse Laser", "class": "Beam",
                "fire_method": "Chain", "hit_method": "Instant",
                "primary_damage": 3, "range": 80, "chain_damage_rate": 0.2,
                "heat_generation": 1, "cooldown": 1
            }
        ],
        "mechs": [
            {
                "id": 10, "display_name": "Atlas", "max_health": 100,
                "max_speed": 8, "max_turn": 90, "max_heat": 50,
                "cooling_rate": 5, "weapons": [1, 2]
            }
        ]
    }"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = DefinitionCatalog::from_json(CATALOG).unwrap();

        let cannon = catalog.weapon(1).unwrap();
        assert_eq!(cannon.cooldown, to_fixed(0.5));
        assert_eq!(cannon.projectile.speed, from_int(120));
        assert_eq!(cannon.projectile.look_ahead, DEFAULT_LOOK_AHEAD);
        assert_eq!(cannon.projectile.despawn_delay, to_fixed(0.25));
        assert_eq!(cannon.projectile.collision_mask, CollisionMask::ALL);

        let laser = catalog.weapon(2).unwrap();
        assert_eq!(laser.fire_method, FireMethod::Chain);
        assert_eq!(laser.splash_damage, 0);

        let atlas = catalog.mech(10).unwrap();
        assert_eq!(atlas.max_health, from_int(100));
        assert_eq!(atlas.collision_radius, DEFAULT_COLLISION_RADIUS);
        assert_eq!(atlas.weapons, vec![1, 2]);
        assert_eq!(catalog.mech_ids().collect::<Vec<_>>(), vec![10]);
    }

    #[test]
    fn test_unknown_weapon_rejected() {
        let json = CATALOG.replace("\"weapons\": [1, 2]", "\"weapons\": [1, 9]");
        let err = DefinitionCatalog::from_json(&json).unwrap_err();
        assert!(matches!(err, DefinitionError::UnknownWeapon { mech: 10, weapon: 9 }));
    }

    #[test]
    fn test_too_many_weapons_rejected() {
        let json = CATALOG.replace("\"weapons\": [1, 2]", "\"weapons\": [1, 2, 1]");
        let err = DefinitionCatalog::from_json(&json).unwrap_err();
        assert!(matches!(err, DefinitionError::TooManyWeapons { mech: 10, count: 3 }));
    }

    #[test]
    fn test_chain_without_rate_rejected() {
        let json = CATALOG.replace("\"chain_damage_rate\": 0.2,", "");
        let err = DefinitionCatalog::from_json(&json).unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidWeapon { id: 2, field: "chain_damage_rate", .. }));
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            DefinitionCatalog::from_json("{ not json"),
            Err(DefinitionError::Parse(_))
        ));
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = DefinitionCatalog::from_json(CATALOG).unwrap();
        let b = DefinitionCatalog::from_json(CATALOG).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());

        let tweaked = CATALOG.replace("\"primary_damage\": 12", "\"primary_damage\": 13");
        let c = DefinitionCatalog::from_json(&tweaked).unwrap();
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_bundled_catalog_loads() {
        let catalog = DefinitionCatalog::from_json(include_str!("../../data/catalog.json")).unwrap();
        assert!(catalog.mech_ids().count() >= 2);
    }
}
